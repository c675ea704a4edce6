//! Component B: per-tracee unwind info.
//!
//! unwind.c: `init_libunwind_ui` / `free_libunwind_ui` (`tcp->libunwind_ui =
//! _UPT_create(tcp->pid)`). Created in `tcb_init`, destroyed in `tcb_fin`
//! (§4.B). Failure to create is the "out of memory" fatal class (§7).
//!
//! `UnwindInfo` is a trait, mirroring [`super::cursor::Cursor`]'s real/mock
//! split, so a backend can hand a tracee a per-PID handle without every
//! caller (notably `facade`'s unit tests) having to link and call into a
//! real libunwind-ptrace.

use libc::pid_t;

pub trait UnwindInfo {}

/// The real libunwind-ptrace-backed handle (`_UPT_create`/`_UPT_destroy`).
pub struct RemoteUnwindInfo {
    raw: *mut libc::c_void,
}

unsafe impl Send for RemoteUnwindInfo {}

impl RemoteUnwindInfo {
    /// Asks the unwinder to produce a remote-unwind info object for `pid`.
    /// Panics (fatal, out-of-memory class per §7) if creation fails.
    pub fn new(pid: pid_t) -> RemoteUnwindInfo {
        let raw = unsafe { super::ffi::_UPT_create(pid) };
        if raw.is_null() {
            panic!("out of memory creating unwind info for pid {}", pid);
        }
        RemoteUnwindInfo { raw }
    }

    pub(crate) fn raw(&self) -> *mut libc::c_void {
        self.raw
    }
}

impl UnwindInfo for RemoteUnwindInfo {}

impl Drop for RemoteUnwindInfo {
    fn drop(&mut self) {
        unsafe { super::ffi::_UPT_destroy(self.raw) };
    }
}

/// Synthetic [`UnwindInfo`] for exercising [`crate::facade::Unwinder`] and
/// [`crate::tracee::TraceeUnwindState`] without a real tracee process or a
/// linked libunwind-ptrace (used via [`super::mock::MockBackend`]).
pub mod mock {
    use super::UnwindInfo;
    use libc::pid_t;

    pub struct MockUnwindInfo {
        pid: pid_t,
    }

    impl MockUnwindInfo {
        pub fn new(pid: pid_t) -> MockUnwindInfo {
            MockUnwindInfo { pid }
        }

        pub fn pid(&self) -> pid_t {
            self.pid
        }
    }

    impl UnwindInfo for MockUnwindInfo {}
}
