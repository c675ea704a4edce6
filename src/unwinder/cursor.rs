//! The cursor abstraction the stack walker drives.
//!
//! The real implementation wraps `unw_init_remote`/`unw_get_reg`/
//! `unw_get_proc_name`/`unw_step` (unwind.c's `stacktrace_walk`). A `Cursor`
//! trait sits in front of it so [`crate::walker::walk`] (Component E) can be
//! exercised in its own `#[cfg(test)]` module against a synthetic `MockCursor`
//! without a real tracee — the original C has no such seam, but the spec's
//! "parameterized by callbacks" framing for the walker's *output* side
//! generalizes naturally to the *input* side for testability.

use super::address_space::RemoteAddressSpace;
use super::ffi;
use super::unwind_info::RemoteUnwindInfo;

/// One resolved symbol lookup: a name plus its offset from the start of
/// that symbol, or no name at all ("no symbol" per §4.E step 3).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcName {
    pub name: Option<String>,
    pub offset: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// `unw_step` returned > 0: there is another frame to inspect.
    More,
    /// `unw_step` returned <= 0: the walk ends normally (§4.E step 6).
    Done,
}

/// The per-frame cursor driven by [`crate::walker::walk`]. `ip` returning
/// `None` models a register-read failure (§4.E step 1, §7 non-fatal).
pub trait Cursor {
    fn ip(&mut self) -> Option<u64>;
    fn proc_name(&mut self, initial_buf_size: usize) -> ProcName;
    fn step(&mut self) -> StepResult;
}

/// The real libunwind-ptrace-backed cursor.
pub struct RemoteCursor {
    raw: ffi::unw_cursor_t,
}

impl RemoteCursor {
    /// Initializes a cursor on `address_space` for `unwind_info`. Panics
    /// (fatal per §7) if `unw_init_remote` fails.
    pub fn new(address_space: &RemoteAddressSpace, unwind_info: &RemoteUnwindInfo) -> RemoteCursor {
        let mut raw: ffi::unw_cursor_t = unsafe { std::mem::zeroed() };
        let ret = unsafe {
            ffi::unw_init_remote(&mut raw, address_space.raw(), unwind_info.raw())
        };
        if ret < 0 {
            panic!("can't initiate libunwind");
        }
        RemoteCursor { raw }
    }
}

impl Cursor for RemoteCursor {
    fn ip(&mut self) -> Option<u64> {
        let mut ip: ffi::unw_word_t = 0;
        let ret = unsafe {
            ffi::unw_get_reg(&mut self.raw, ffi::UNW_REG_IP as i32, &mut ip)
        };
        if ret < 0 {
            None
        } else {
            Some(ip as u64)
        }
    }

    fn proc_name(&mut self, initial_buf_size: usize) -> ProcName {
        let mut buf_len = initial_buf_size.max(1);
        loop {
            let mut buf = vec![0u8; buf_len];
            let mut offset: ffi::unw_word_t = 0;
            let ret = unsafe {
                ffi::unw_get_proc_name(
                    &mut self.raw,
                    buf.as_mut_ptr() as *mut libc::c_char,
                    buf.len(),
                    &mut offset,
                )
            };
            if ret == ffi::UNW_ENOMEM {
                buf_len *= 2;
                continue;
            }
            if ret != 0 {
                return ProcName { name: None, offset: 0 };
            }
            let nul = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            if nul == 0 {
                return ProcName { name: None, offset: 0 };
            }
            let name = String::from_utf8_lossy(&buf[..nul]).into_owned();
            return ProcName { name: Some(name), offset: offset as u64 };
        }
    }

    fn step(&mut self) -> StepResult {
        let ret = unsafe { ffi::unw_step(&mut self.raw) };
        if ret > 0 {
            StepResult::More
        } else {
            StepResult::Done
        }
    }
}

/// Synthetic [`Cursor`] implementation for exercising [`crate::walker::walk`]
/// without a real ptrace-attached process.
pub mod mock {
    use super::*;

    /// A single synthetic frame for [`MockCursor`]: the IP the walker
    /// should see, the symbol lookup result for it, and what `step` should
    /// report after this frame is processed.
    pub struct MockFrame {
        pub ip: Option<u64>,
        pub proc_name: ProcName,
        pub step: StepResult,
    }

    impl MockFrame {
        pub fn new(ip: u64, name: Option<&str>, offset: u64, step: StepResult) -> MockFrame {
            MockFrame {
                ip: Some(ip),
                proc_name: ProcName { name: name.map(str::to_owned), offset },
                step,
            }
        }

        pub fn register_read_failure() -> MockFrame {
            MockFrame { ip: None, proc_name: ProcName::default(), step: StepResult::Done }
        }
    }

    /// Drives [`crate::walker::walk`] against a scripted sequence of frames
    /// instead of a real ptrace-attached process.
    pub struct MockCursor {
        frames: std::collections::VecDeque<MockFrame>,
    }

    impl MockCursor {
        pub fn new(frames: Vec<MockFrame>) -> MockCursor {
            MockCursor { frames: frames.into() }
        }
    }

    impl Cursor for MockCursor {
        fn ip(&mut self) -> Option<u64> {
            self.frames.front().and_then(|f| f.ip)
        }

        fn proc_name(&mut self, _initial_buf_size: usize) -> ProcName {
            self.frames
                .front()
                .map(|f| f.proc_name.clone())
                .unwrap_or_default()
        }

        fn step(&mut self) -> StepResult {
            match self.frames.pop_front() {
                Some(f) => f.step,
                None => StepResult::Done,
            }
        }
    }
}
