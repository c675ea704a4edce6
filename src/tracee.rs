//! §3 "Tracee context": the four fields this subsystem attaches to a
//! tracer-owned tracee, and the capture-on-entering tag from the syscall
//! dispatcher (§6 "Syscall-flag bit consumed").

use crate::maps::MapCache;
use crate::queue::DeferredQueue;
use crate::unwinder::{Backend, RealBackend};

bitflags::bitflags! {
    /// Mirrors the single syscall-descriptor bit this subsystem consumes
    /// (§6): syscalls (notably `execve`) that destroy the caller's address
    /// space before their exit stop must have their backtrace captured at
    /// entry and printed at exit.
    pub struct SyscallFlags: u32 {
        const CAPTURE_ON_ENTERING = 1 << 0;
    }
}

/// The four fields the façade attaches to one tracee (§3): unwind-info
/// handle, map cache, cache generation tag (folded into `cache` itself —
/// see [`crate::maps::cache::MapCache::generation`]), and deferred queue.
/// The tracer owns the outer tracee struct; this subsystem owns exactly
/// these four fields and is responsible for releasing them in
/// [`crate::facade::Unwinder::tcb_fin`].
///
/// Generic over [`Backend`] so a tracee can be backed by the real
/// libunwind-ptrace handle (the default, [`RealBackend`]) or a synthetic
/// one in tests — see `facade`'s own `#[cfg(test)]` module.
///
/// Field order is declaration order, which is also Rust's struct-field
/// drop order: `queue`, then `cache`, then `unwind_info`, matching
/// `tcb_fin`'s documented teardown sequence (drain-or-print the queue,
/// drop the cache, then free the libunwind per-tracee handle).
pub struct TraceeUnwindState<B: Backend = RealBackend> {
    pub(crate) pid: libc::pid_t,
    pub(crate) queue: DeferredQueue,
    pub(crate) cache: Option<MapCache>,
    pub(crate) unwind_info: B::UnwindInfo,
}

impl<B: Backend> TraceeUnwindState<B> {
    pub(crate) fn new(pid: libc::pid_t) -> TraceeUnwindState<B> {
        TraceeUnwindState {
            pid,
            queue: DeferredQueue::new(),
            cache: None,
            unwind_info: B::create_unwind_info(pid),
        }
    }

    pub fn pid(&self) -> libc::pid_t {
        self.pid
    }
}
