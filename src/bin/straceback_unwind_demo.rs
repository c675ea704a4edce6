//! A small command-line driver for the unwind subsystem: attach to a
//! running process's stack by pid and print its frames once, in the style
//! of the teacher's `trace_info_command.rs` (parse options, serialize a
//! result, print it).

use serde::Serialize;
use structopt::StructOpt;

use straceback_unwind::facade::Unwinder;
use straceback_unwind::frame::LineSink;
use straceback_unwind::tracee::SyscallFlags;

#[derive(StructOpt)]
#[structopt(name = "straceback-unwind-demo")]
struct Opt {
    /// pid of the process to unwind
    pid: libc::pid_t,

    /// emit one JSON object per line instead of the plain " > ..." stanza
    #[structopt(long)]
    json: bool,
}

struct TextSink;

impl LineSink for TextSink {
    fn emit(&mut self, text: &str) {
        print!("{}", text);
    }
    fn end_line(&mut self) {
        println!();
    }
}

#[derive(Serialize)]
struct JsonLine {
    line: String,
}

#[derive(Default)]
struct JsonSink {
    current: String,
}

impl LineSink for JsonSink {
    fn emit(&mut self, text: &str) {
        self.current.push_str(text);
    }
    fn end_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        let serialized = serde_json::to_string(&JsonLine { line }).unwrap();
        println!("{}", serialized);
    }
}

fn main() {
    let opt = Opt::from_args();

    let unwinder = Unwinder::init();
    let mut tracee = unwinder.tcb_init(opt.pid);

    if opt.json {
        let mut sink = JsonSink::default();
        unwinder.stacktrace_print(&mut tracee, SyscallFlags::empty(), &mut sink);
    } else {
        let mut sink = TextSink;
        unwinder.stacktrace_print(&mut tracee, SyscallFlags::empty(), &mut sink);
    }

    unwinder.tcb_fin(tracee, SyscallFlags::empty(), &mut TextSink);
}
