//! Component C: the per-tracee map cache, and Component D's coherence
//! check layered on top of it.
//!
//! unwind.c: `build_mmap_cache`, `is_mmap_cache_available`,
//! `delete_mmap_cache`. §4.C (build), §4.D (coherence), §9 REDESIGN FLAGS
//! (binary search shape).

use super::entry::{parse_maps_line, MapEntry};
use super::generation::Generation;
use crate::config::UnwindConfig;
use crate::error::{Result, UnwindError};
use crate::log::LogLevel::LogDebug;
use libc::pid_t;
use std::fs;
use std::io::{BufRead, BufReader};

/// A built, sorted, non-overlapping array of executable map entries for one
/// tracee, stamped with the generation it was built against (§3 "Map
/// cache"). The *absence* of a `MapCache` (modeled by the caller holding
/// `Option<MapCache>`) is the "never built yet" / "dropped as stale" state;
/// a `MapCache` that exists but has zero entries means the maps file
/// opened but contained nothing kept after filtering.
#[derive(Debug)]
pub struct MapCache {
    entries: Vec<MapEntry>,
    generation: u32,
}

impl MapCache {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    /// Binary search for the unique entry containing `ip`
    /// (`entry.start <= ip < entry.end`). Half-open `[lo, hi)` throughout,
    /// per the spec's REDESIGN FLAGS fix of the original's mixed
    /// `upper = mid - 1` / `upper = mid` search — see DESIGN.md.
    pub fn find_containing(&self, ip: u64) -> Option<&MapEntry> {
        let mut lo = 0usize;
        let mut hi = self.entries.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = &self.entries[mid];
            if ip < entry.start_addr {
                hi = mid;
            } else if ip >= entry.end_addr {
                lo = mid + 1;
            } else {
                return Some(entry);
            }
        }
        None
    }

    /// Reads and parses `/proc/<pid>/maps` (§4.C). Non-fatal on open
    /// failure (returns `Err`, caller leaves the cache empty per §4.C).
    fn build(pid: pid_t, generation: u32, config: &UnwindConfig) -> Result<MapCache> {
        let path = format!("/proc/{}/maps", pid);
        Self::build_from_path(pid, &path, generation, config)
    }

    /// Core of [`MapCache::build`], parameterized over the maps file path
    /// so a test can point it at a fixture instead of a real
    /// `/proc/<pid>/maps` while still driving the real open-and-parse path
    /// ([`ensure_fresh_from_path`] uses this the same way).
    fn build_from_path(
        pid: pid_t,
        path: &str,
        generation: u32,
        config: &UnwindConfig,
    ) -> Result<MapCache> {
        let file = fs::File::open(path)
            .map_err(|source| UnwindError::MapsUnavailable { pid, source })?;
        let cache = Self::build_from_reader(BufReader::new(file), path, pid, generation, config);
        log!(
            LogDebug,
            "build: gen={}, pid={}, entries={}",
            generation,
            pid,
            cache.entries.len()
        );
        Ok(cache)
    }

    /// Panics (fatal per §7) on a corrupt maps file: a reversed range (via
    /// [`parse_maps_line`]) or a sortedness/overlap violation. Split out of
    /// [`MapCache::build`] so a test can drive it against a fixture file
    /// without going through `/proc/<pid>/maps`.
    fn build_from_reader(
        reader: impl BufRead,
        path: &str,
        pid: pid_t,
        generation: u32,
        config: &UnwindConfig,
    ) -> MapCache {
        let mut entries = Vec::with_capacity(config.initial_cache_capacity);
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            let entry = match parse_maps_line(&line) {
                Some(e) => e,
                None => continue,
            };
            if let Some(prev) = entries.last() {
                let prev: &MapEntry = prev;
                assert!(
                    prev.start_addr < entry.start_addr && prev.end_addr <= entry.start_addr,
                    "overlapping memory region in {} (pid {}): {:?} then {:?}",
                    path,
                    pid,
                    prev,
                    entry
                );
            }
            entries.push(entry);
        }
        MapCache { entries, generation }
    }
}

/// Ensures `cache` reflects the current `global` generation (§4.D):
///
/// 1. Drop `cache` if it exists but is stale.
/// 2. Build if `cache` is absent.
/// 3. Return whether the (possibly just-rebuilt) cache is usable.
///
/// A build that fails to open `/proc/<pid>/maps` logs and leaves `cache`
/// as `None` (§4.C); the next call will try again.
pub fn ensure_fresh(
    cache: &mut Option<MapCache>,
    pid: pid_t,
    global: &Generation,
    config: &UnwindConfig,
) -> bool {
    let path = format!("/proc/{}/maps", pid);
    ensure_fresh_from_path(cache, pid, &path, global, config)
}

/// Core of [`ensure_fresh`], parameterized over the maps file path so a
/// test can drive the real coherence decision (§4.D, §8 S5) against a
/// fixture instead of a real `/proc/<pid>/maps`.
fn ensure_fresh_from_path(
    cache: &mut Option<MapCache>,
    pid: pid_t,
    path: &str,
    global: &Generation,
    config: &UnwindConfig,
) -> bool {
    if let Some(existing) = cache.as_ref() {
        if existing.generation() != global.current() {
            log!(
                LogDebug,
                "delete: gen={}, GEN={}, pid={}",
                existing.generation(),
                global.current(),
                pid
            );
            *cache = None;
        }
    }

    if cache.is_none() {
        match MapCache::build_from_path(pid, path, global.current(), config) {
            Ok(built) => *cache = Some(built),
            Err(err) => log!(crate::log::LogLevel::LogWarn, "{}", err),
        }
    }

    match cache {
        Some(c) => !c.is_empty(),
        None => false,
    }
}

/// Test-only constructors shared across this crate's test modules (the
/// walker's tests need hand-built caches without a real `/proc` file).
#[cfg(test)]
pub(crate) mod test_support {
    use super::{MapCache, MapEntry};
    use crate::maps::entry::parse_maps_line;

    pub fn from_lines(lines: &[&str], generation: u32) -> MapCache {
        let mut entries: Vec<MapEntry> = Vec::new();
        for line in lines {
            if let Some(entry) = parse_maps_line(line) {
                entries.push(entry);
            }
        }
        MapCache { entries, generation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cache_from_lines(lines: &[&str], generation: u32) -> MapCache {
        test_support::from_lines(lines, generation)
    }

    #[test]
    fn binary_search_finds_unique_containing_entry() {
        let cache = cache_from_lines(
            &[
                "400000-401000 r-xp 00000000 fc:00 1 ./a.out",
                "7f0000-7f1000 r-xp 00001000 fc:00 2 /lib/libc",
            ],
            0,
        );
        let found = cache.find_containing(0x4000ab).unwrap();
        assert_eq!(found.binary_path, "./a.out");
        let found = cache.find_containing(0x7f0100).unwrap();
        assert_eq!(found.binary_path, "/lib/libc");
        assert!(cache.find_containing(0xdead).is_none());
        assert!(cache.find_containing(0x401000).is_none()); // end is exclusive
    }

    #[test]
    fn binary_search_soundness_property() {
        let cache = cache_from_lines(
            &[
                "1000-2000 r-xp 0 00:00 0 /a",
                "3000-4000 r-xp 0 00:00 0 /b",
                "4000-5000 r-xp 0 00:00 0 /c",
                "9000-a000 r-xp 0 00:00 0 /d",
            ],
            0,
        );
        for ip in 0u64..0xb000 {
            let expect = cache
                .entries()
                .iter()
                .find(|e| e.contains(ip));
            let found = cache.find_containing(ip);
            assert_eq!(found, expect);
        }
    }

    #[test]
    fn ensure_fresh_builds_from_real_file_and_filters() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "400000-401000 r-xp 00000000 fc:00 1 ./a.out\n\
             600000-601000 rw-p 00000000 00:00 0 [heap]\n\
             7f0000-7f1000 r--p 00001000 fc:00 2 /lib/libc-2.11.1.so"
        )
        .unwrap();

        // We can't redirect /proc/<pid>/maps, so exercise MapCache::build's
        // inner parsing logic directly via the same entry points ensure_fresh
        // uses, reading the fixture file through the same line-filtering path.
        let file = fs::File::open(tmp.path()).unwrap();
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            if let Some(e) = parse_maps_line(&line.unwrap()) {
                entries.push(e);
            }
        }
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].binary_path, "./a.out");
        assert_eq!(entries[1].binary_path, "/lib/libc-2.11.1.so");
    }

    #[test]
    fn ensure_fresh_rebuilds_only_after_invalidate() {
        // ensure_fresh reads /proc/<pid>/maps, which we can't redirect to a
        // fixture file in a test; drive ensure_fresh_from_path instead —
        // the same coherence function ensure_fresh calls, parameterized
        // over the path — so a regression in the real rebuild decision
        // would actually be caught here (§8 S5).
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "400000-401000 r-xp 00000000 fc:00 1 ./a.out").unwrap();
        let path = tmp.path().to_string_lossy().into_owned();

        let global = Generation::new();
        let config = UnwindConfig::default();
        let mut cache: Option<MapCache> = None;

        let available = ensure_fresh_from_path(&mut cache, -1, &path, &global, &config);
        assert!(available);
        assert_eq!(cache.as_ref().unwrap().entries().len(), 1);
        let generation_after_first_build = cache.as_ref().unwrap().generation();

        // No invalidation yet: appending a new mapping to the fixture must
        // not be picked up — ensure_fresh_from_path must keep the existing
        // cache rather than rebuild it.
        writeln!(tmp, "500000-501000 r-xp 00000000 fc:00 1 ./b.out").unwrap();
        let available = ensure_fresh_from_path(&mut cache, -1, &path, &global, &config);
        assert!(available);
        assert_eq!(
            cache.as_ref().unwrap().entries().len(),
            1,
            "must not rebuild without an intervening invalidate()"
        );
        assert_eq!(cache.as_ref().unwrap().generation(), generation_after_first_build);

        // Now invalidate; §4.D says drop the stale cache and rebuild
        // exactly once, which must pick up the fixture's now-current
        // contents (§8 S5 — invalidate forces a re-read of maps).
        global.invalidate();
        let available = ensure_fresh_from_path(&mut cache, -1, &path, &global, &config);
        assert!(available);
        assert_eq!(cache.as_ref().unwrap().entries().len(), 2);
        assert_eq!(cache.as_ref().unwrap().generation(), global.current());
    }

    #[test]
    fn ensure_fresh_reports_unavailable_when_maps_cannot_be_opened() {
        let mut cache: Option<MapCache> = None;
        let global = Generation::new();
        let config = UnwindConfig::default();
        // pid 1 certainly exists but we don't have permission/namespace
        // access guarantees in a sandbox; instead use a pid that cannot
        // exist to force an open failure deterministically.
        let bogus_pid: pid_t = -1;
        let available = ensure_fresh(&mut cache, bogus_pid, &global, &config);
        assert!(!available);
        assert!(cache.is_none());
    }
}
