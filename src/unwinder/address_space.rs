//! Component A: the process-wide address-space handle.
//!
//! unwind.c: `init_unwind_addr_space` / `static unw_addr_space_t
//! libunwind_as`. A single instance is created at subsystem init and bound
//! to the ptrace accessor set; failure to create it is fatal (§4.A).
//!
//! `AddressSpace` is a trait, mirroring [`super::cursor::Cursor`]'s
//! real/mock split, so a backend can supply `Unwinder::init` with a handle
//! without every caller (notably `facade`'s unit tests) having to link and
//! call into a real libunwind-ptrace.

pub trait AddressSpace {}

/// The real libunwind-ptrace-backed address space. There is exactly one of
/// these per tracer process; it is read-only after construction and has no
/// explicit teardown beyond process exit (§4.A), so it does not implement
/// `Drop` — matching the original, which never calls
/// `unw_destroy_addr_space`.
pub struct RemoteAddressSpace {
    raw: super::ffi::unw_addr_space_t,
}

// The handle is only ever read after construction (remote cursors borrow
// it immutably); the tracer drives everything from a single control
// thread (spec.md §5), so sharing a raw pointer across `Rc` clones is
// sound without further synchronization.
unsafe impl Send for RemoteAddressSpace {}

impl RemoteAddressSpace {
    /// Creates the address space. Panics (fatal, per §7) if the unwinder
    /// fails to construct one — the subsystem cannot operate without it.
    pub fn new() -> RemoteAddressSpace {
        let raw = unsafe { super::ffi::unw_create_addr_space(&mut super::ffi::_UPT_accessors, 0) };
        if raw.is_null() {
            panic!("failed to create address space for stack tracing");
        }
        log!(crate::log::LogLevel::LogDebug, "created unwinder address space");
        RemoteAddressSpace { raw }
    }

    pub(crate) fn raw(&self) -> super::ffi::unw_addr_space_t {
        self.raw
    }
}

impl AddressSpace for RemoteAddressSpace {}

impl Default for RemoteAddressSpace {
    fn default() -> Self {
        RemoteAddressSpace::new()
    }
}

/// Synthetic [`AddressSpace`] for exercising [`crate::facade::Unwinder`]
/// without a linked libunwind-ptrace (used via
/// [`super::mock::MockBackend`]).
pub mod mock {
    use super::AddressSpace;

    pub struct MockAddressSpace;

    impl MockAddressSpace {
        pub fn new() -> MockAddressSpace {
            MockAddressSpace
        }
    }

    impl Default for MockAddressSpace {
        fn default() -> Self {
            MockAddressSpace::new()
        }
    }

    impl AddressSpace for MockAddressSpace {}
}
