//! The opaque unwinder API the rest of this crate treats as an external
//! collaborator (spec.md §1): an address-space handle, a per-tracee
//! unwind-info handle, and a cursor that can read registers, resolve
//! symbol names, and step to the caller's frame.

pub mod address_space;
pub mod cursor;
mod ffi;
pub mod unwind_info;

pub use address_space::{AddressSpace, RemoteAddressSpace};
pub use cursor::{Cursor, ProcName, StepResult};
pub use unwind_info::{RemoteUnwindInfo, UnwindInfo};

use cursor::RemoteCursor;
use libc::pid_t;

/// Ties an [`AddressSpace`] type and an [`UnwindInfo`] type together with
/// the [`Cursor`] construction that binds them. `facade::Unwinder` and
/// `tracee::TraceeUnwindState` are generic over this trait instead of
/// hardcoding the real libunwind-ptrace types, the same way the walker is
/// parameterized over `Cursor` rather than `RemoteCursor` directly — so
/// `Unwinder`'s own unit tests can run against [`mock::MockBackend`]
/// without linking libunwind-ptrace at all.
pub trait Backend {
    type AddressSpace: AddressSpace;
    type UnwindInfo: UnwindInfo;

    fn create_address_space() -> Self::AddressSpace;
    fn create_unwind_info(pid: pid_t) -> Self::UnwindInfo;
    fn new_cursor<'a>(
        address_space: &'a Self::AddressSpace,
        unwind_info: &'a Self::UnwindInfo,
    ) -> Box<dyn Cursor + 'a>;
}

/// The real libunwind-ptrace-backed backend; what `Unwinder::init()` uses.
pub struct RealBackend;

impl Backend for RealBackend {
    type AddressSpace = RemoteAddressSpace;
    type UnwindInfo = RemoteUnwindInfo;

    fn create_address_space() -> RemoteAddressSpace {
        RemoteAddressSpace::new()
    }

    fn create_unwind_info(pid: pid_t) -> RemoteUnwindInfo {
        RemoteUnwindInfo::new(pid)
    }

    fn new_cursor<'a>(
        address_space: &'a RemoteAddressSpace,
        unwind_info: &'a RemoteUnwindInfo,
    ) -> Box<dyn Cursor + 'a> {
        Box::new(RemoteCursor::new(address_space, unwind_info))
    }
}

/// A synthetic backend for exercising `facade::Unwinder` and
/// `tracee::TraceeUnwindState` without a real tracee process or a linked
/// libunwind-ptrace.
pub mod mock {
    use super::address_space::mock::MockAddressSpace;
    use super::cursor::mock::MockCursor;
    use super::unwind_info::mock::MockUnwindInfo;
    use super::{Backend, Cursor};
    use libc::pid_t;

    pub struct MockBackend;

    impl Backend for MockBackend {
        type AddressSpace = MockAddressSpace;
        type UnwindInfo = MockUnwindInfo;

        fn create_address_space() -> MockAddressSpace {
            MockAddressSpace::new()
        }

        fn create_unwind_info(pid: pid_t) -> MockUnwindInfo {
            MockUnwindInfo::new(pid)
        }

        /// No scripted frames are attached to a `MockUnwindInfo`, so the
        /// returned cursor reports no instruction pointer on first read —
        /// a harmless, immediate "can't walk the stack" per §4.E step 1.
        /// Tests that need an actual walked stack drive `walker::walk`
        /// against `MockCursor` directly, the seam `walker`'s own tests
        /// already use.
        fn new_cursor<'a>(
            _address_space: &'a MockAddressSpace,
            _unwind_info: &'a MockUnwindInfo,
        ) -> Box<dyn Cursor + 'a> {
            Box::new(MockCursor::new(Vec::new()))
        }
    }
}
