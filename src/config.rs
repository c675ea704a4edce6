//! Tunables for the unwind subsystem, in the spirit of the teacher's
//! `Flags` (`flags.rs`) but threaded explicitly into `Unwinder::new`
//! rather than a process-global `lazy_static!` singleton — tests spin up
//! more than one independent `Unwinder` in the same process.

/// Starting capacity of a freshly built [`crate::maps::cache::MapCache`]'s
/// entry array, doubled on fill. unwind.c: `cur_array_size = 10`.
const DEFAULT_INITIAL_CACHE_CAPACITY: usize = 10;

/// Starting size of the symbol-name probe buffer. unwind.c:
/// `symbol_name_size = 40`.
const DEFAULT_INITIAL_SYMBOL_BUF_SIZE: usize = 40;

/// Starting size of a formatted output line. unwind.c: `OUTPUT_LINE_BUFLEN
/// = 128`.
const DEFAULT_INITIAL_LINE_BUF_SIZE: usize = 128;

/// Defense against corrupt unwind info (§4.E step 7). unwind.c:
/// `stack_depth > 255`.
const DEFAULT_MAX_STACK_FRAMES: u32 = 255;

#[derive(Clone, Copy, Debug)]
pub struct UnwindConfig {
    pub initial_cache_capacity: usize,
    pub initial_symbol_buf_size: usize,
    pub initial_line_buf_size: usize,
    pub max_stack_frames: u32,
}

impl Default for UnwindConfig {
    fn default() -> Self {
        UnwindConfig {
            initial_cache_capacity: DEFAULT_INITIAL_CACHE_CAPACITY,
            initial_symbol_buf_size: DEFAULT_INITIAL_SYMBOL_BUF_SIZE,
            initial_line_buf_size: DEFAULT_INITIAL_LINE_BUF_SIZE,
            max_stack_frames: DEFAULT_MAX_STACK_FRAMES,
        }
    }
}
