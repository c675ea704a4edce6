//! Stack-unwinding subsystem for a ptrace-based syscall tracer.
//!
//! This crate owns the part of a tracer that turns a tracee's raw
//! registers and `/proc/<pid>/maps` into printable `" > binary(symbol+0x..)
//! [0x..]"` stack frames: a process-wide libunwind-ptrace address space
//! (Component A), per-tracee unwind info (B), a sorted map cache with a
//! generation-based staleness check (C, D), the stack walker (E), the
//! frame formatter (F), a deferred queue for syscalls that must be
//! captured on entry and printed on exit such as `execve` (G), and the
//! five-entry-point façade callers actually use (H).
//!
//! Start at [`facade::Unwinder`].

#[macro_use]
pub mod log;

pub mod config;
pub mod error;
pub mod facade;
pub mod frame;
pub mod maps;
pub mod queue;
pub mod tracee;
pub mod unwinder;
pub mod walker;

pub use config::UnwindConfig;
pub use error::{Result, UnwindError};
pub use facade::Unwinder;
pub use frame::{Frame, LineSink};
pub use tracee::{SyscallFlags, TraceeUnwindState};
pub use unwinder::{Backend, RealBackend};
