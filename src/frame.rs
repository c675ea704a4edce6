//! Component F: the frame formatter.
//!
//! unwind.c: `STACK_ENTRY_*_FMT`, `sprint_call_or_error`, `print_call`,
//! `print_error`. §4.F's four line shapes, byte-compatible with the
//! `backtrace_symbols`-style stanza (§6).

use std::fmt::Write as _;

/// One resolved stack frame, or a walk error, ready to be rendered (§3
/// "Frame record" — ephemeral, lives only within one walk step).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    WithSymbol {
        binary_path: String,
        symbol_name: String,
        symbol_offset: u64,
        true_offset: u64,
    },
    NoSymbol {
        binary_path: String,
        true_offset: u64,
    },
    Error {
        message: &'static str,
        offset: u64,
    },
}

/// The output formatter this subsystem renders through (§1, §6): an
/// external collaborator pinned to two primitives, `emit` (write text) and
/// `end_line`.
pub trait LineSink {
    fn emit(&mut self, text: &str);
    fn end_line(&mut self);
}

/// Formats `frame` into exactly the line shape §4.F specifies, e.g.:
/// ` > ./a.out(main+0xed) [0x40063d]\n`
/// ` > /lib64/libc.so.6() [0x7fa2f8a5976d]\n`
/// ` > backtracing_error [0x7ffdeadbeef]\n`
///
/// `initial_capacity` seeds the output buffer — the grow-retry starting
/// size of unwind.c's `sprint_call_or_error` (`OUTPUT_LINE_BUFLEN`),
/// collapsed to a plain `String` capacity hint since Rust strings grow
/// themselves; callers pass [`crate::config::UnwindConfig::initial_line_buf_size`].
pub fn format_line(frame: &Frame, initial_capacity: usize) -> String {
    let mut out = String::with_capacity(initial_capacity);
    match frame {
        Frame::WithSymbol {
            binary_path,
            symbol_name,
            symbol_offset,
            true_offset,
        } => {
            let _ = write!(
                out,
                " > {}({}+0x{:x}) [0x{:x}]\n",
                binary_path, symbol_name, symbol_offset, true_offset
            );
        }
        Frame::NoSymbol {
            binary_path,
            true_offset,
        } => {
            let _ = write!(out, " > {}() [0x{:x}]\n", binary_path, true_offset);
        }
        Frame::Error { message, offset } => {
            let _ = write!(out, " > {} [0x{:x}]\n", message, offset);
        }
    }
    out
}

/// Writes `frame` directly through `sink`'s two primitives rather than
/// building an intermediate string — the direct-print path of the sink
/// split described in §4.E / Design Notes §9.
pub fn print_frame(sink: &mut dyn LineSink, frame: &Frame, initial_capacity: usize) {
    let line = format_line(frame, initial_capacity);
    // format_line always produces a trailing '\n'; emit the body and let
    // the sink's own end_line() primitive terminate it, matching the
    // original's tprintf(...) + line_ended() split.
    sink.emit(line.trim_end_matches('\n'));
    sink.end_line();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnwindConfig;

    fn buf_size() -> usize {
        UnwindConfig::default().initial_line_buf_size
    }

    #[test]
    fn formats_with_symbol() {
        let f = Frame::WithSymbol {
            binary_path: "./a.out".into(),
            symbol_name: "main".into(),
            symbol_offset: 0xed,
            true_offset: 0x40063d,
        };
        assert_eq!(format_line(&f, buf_size()), " > ./a.out(main+0xed) [0x40063d]\n");
    }

    #[test]
    fn formats_no_symbol() {
        let f = Frame::NoSymbol {
            binary_path: "./a.out".into(),
            true_offset: 0x400569,
        };
        assert_eq!(format_line(&f, buf_size()), " > ./a.out() [0x400569]\n");
    }

    #[test]
    fn formats_error_with_offset() {
        let f = Frame::Error {
            message: "backtracing_error",
            offset: 0x7ffdeadbeef,
        };
        assert_eq!(format_line(&f, buf_size()), " > backtracing_error [0x7ffdeadbeef]\n");
    }

    #[test]
    fn formats_error_without_offset() {
        let f = Frame::Error {
            message: "too many stack frames",
            offset: 0,
        };
        assert_eq!(format_line(&f, buf_size()), " > too many stack frames [0x0]\n");
    }
}
