//! Component E: the stack walker.
//!
//! unwind.c: `stacktrace_walk`. Drives the unwinder cursor; for each frame,
//! resolves IP→(binary, symbol, offsets) via binary search in the map
//! cache (§4.E).

use crate::config::UnwindConfig;
use crate::error::UnwindError;
use crate::frame::{format_line, Frame, LineSink};
use crate::log::LogLevel::LogWarn;
use crate::maps::MapCache;
use crate::queue::DeferredQueue;
use crate::unwinder::{Cursor, ProcName, StepResult};
use libc::pid_t;

/// Where resolved frames go (Design Notes §9: an enum over two variants
/// rather than function pointers + an opaque `void*`, and rather than a
/// heap-allocated dispatch table for just two cases).
pub enum Sink<'a> {
    /// Write each frame straight through the output formatter
    /// (`stacktrace_print`'s non-capture-on-entering path).
    Print(&'a mut dyn LineSink),
    /// Format each frame into a string and push it onto the tracee's
    /// deferred queue (`stacktrace_capture`).
    Queue(&'a mut DeferredQueue),
}

impl<'a> Sink<'a> {
    fn accept(&mut self, frame: &Frame, initial_line_buf_size: usize) {
        match self {
            Sink::Print(line_sink) => {
                let line = format_line(frame, initial_line_buf_size);
                line_sink.emit(line.trim_end_matches('\n'));
                line_sink.end_line();
            }
            Sink::Queue(queue) => {
                queue.push(format_line(frame, initial_line_buf_size));
            }
        }
    }
}

/// Walks `cursor`'s frames against `cache`, feeding each resolved frame or
/// walk error to `sink`, per §4.E's numbered steps. `pid` is used only for
/// logging the non-fatal register-read failure (step 1).
pub fn walk(cursor: &mut dyn Cursor, cache: &MapCache, sink: &mut Sink<'_>, config: &UnwindConfig, pid: pid_t) {
    let mut stack_depth: u32 = 0;

    loop {
        // Step 7: defense against corrupt unwind info (§4.E). Checked
        // before processing another frame so that exactly
        // `max_stack_frames` frame lines are emitted before the guard
        // fires, matching §8 scenario S4.
        if stack_depth >= config.max_stack_frames {
            sink.accept(
                &Frame::Error { message: "too many stack frames", offset: 0 },
                config.initial_line_buf_size,
            );
            break;
        }

        // Step 1: read the instruction pointer. Non-fatal failure stops
        // the walk (§4.E, §7).
        let ip = match cursor.ip() {
            Some(ip) => ip,
            None => {
                log!(LogWarn, "{}", UnwindError::RegisterReadFailed { pid });
                break;
            }
        };

        // Step 2: binary search the cache.
        let entry = match cache.find_containing(ip) {
            Some(entry) => entry,
            None => {
                let offset = if ip == 0 { 0 } else { ip };
                sink.accept(
                    &Frame::Error { message: "backtracing_error", offset },
                    config.initial_line_buf_size,
                );
                break;
            }
        };

        // Step 3: resolve the symbol name via the probe-then-grow loop.
        let ProcName { name, offset: symbol_offset } =
            cursor.proc_name(config.initial_symbol_buf_size);

        // Step 4: compute the true offset.
        let true_offset = entry.true_offset(ip);

        // Step 5: emit the frame, with or without a symbol.
        let frame = match name {
            Some(symbol_name) if !symbol_name.is_empty() => Frame::WithSymbol {
                binary_path: entry.binary_path.clone(),
                symbol_name,
                symbol_offset,
                true_offset,
            },
            _ => Frame::NoSymbol {
                binary_path: entry.binary_path.clone(),
                true_offset,
            },
        };
        sink.accept(&frame, config.initial_line_buf_size);
        stack_depth += 1;

        // Step 6: step the cursor; ret <= 0 ends the walk normally.
        match cursor.step() {
            StepResult::More => continue,
            StepResult::Done => break,
        }
    }
}
