//! Component D: the global generation counter and per-tracee staleness
//! check.
//!
//! unwind.c: `static unsigned int mmap_cache_generation`,
//! `is_mmap_cache_available`. Per Design Notes §9 this is a plain counter
//! compared for equality, not a version clock — no ordering is implied,
//! only "did `invalidate()` run since I last rebuilt".

use std::sync::atomic::{AtomicU32, Ordering};

/// Process-wide monotonic counter (§3 "Global generation"). Bumped once
/// per address-space-mutating syscall observed by the tracer; many
/// invalidations between two walks coalesce into a single rebuild (§4.D).
///
/// Modeled as an atomic rather than a plain `u32` behind `&mut` so a
/// `Generation` can be shared (via `Rc`/`Arc`) across every tracee without
/// the subsystem having to plumb `&mut Generation` through call sites that
/// only read it — the spec notes this counter has a single writer (the
/// tracer thread, §5), so the atomic never actually contends.
#[derive(Debug)]
pub struct Generation(AtomicU32);

impl Generation {
    pub fn new() -> Generation {
        Generation(AtomicU32::new(0))
    }

    pub fn current(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// `cache_invalidate()` — bumps the global generation only; it does
    /// not touch any tracee's cache directly (§4.D, §4.H).
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for Generation {
    fn default() -> Self {
        Generation::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_bumps_and_coalesces() {
        let gen = Generation::new();
        let before = gen.current();
        gen.invalidate();
        gen.invalidate();
        gen.invalidate();
        assert_eq!(gen.current(), before + 3);
    }
}
