//! The `file` class over host-provided storage.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cbot_diagnostic::ErrorCode;
use cbot_registry::{FileAccess, FileHandle, MemoryFileAccess, OpenMode, Registry};
use cbot_value::Value;
use cbotc::{Program, ProgramConfig, RunStatus};
use common::Host;
use pretty_assertions::assert_eq;

#[test]
fn writes_then_reads_lines() {
    let host = Host::new();
    let program = host.run(
        "int main() {
             file out();
             out.open(\"log.txt\", \"w\");
             for (int i = 1; i <= 3; i++) { out.writeln(\"line \" + i); }
             out.close();

             file reader(\"log.txt\");
             reader.open(\"r\");
             int lines = 0;
             while (!reader.eof()) {
                 string l = reader.readln();
                 ASSERT(strleft(l, 4) == \"line\");
                 lines++;
             }
             reader.close();
             return lines;
         }",
    );
    assert_eq!(program.result(), Some(&Value::Int(3)));
    assert_eq!(
        host.files.contents("log.txt").as_deref(),
        Some("line 1\nline 2\nline 3\n")
    );
}

#[test]
fn appends_to_seeded_files() {
    let host = Host::new();
    host.files.insert("notes", "first\n");
    host.run(
        "void main() {
             file f();
             f.open(\"notes\", \"a\");
             f.writeln(\"second\");
             f.close();
             ASSERT(deletefile(\"missing\") == false);
         }",
    );
    assert_eq!(
        host.files.contents("notes").as_deref(),
        Some("first\nsecond\n")
    );
}

#[test]
fn reading_an_unopened_file_raises() {
    let host = Host::new();
    let mut program = host.program();
    program
        .compile("void main() { file f(); string s = f.readln(); }")
        .unwrap();
    program.start("main").unwrap();
    assert_eq!(program.run(), Ok(RunStatus::Error));
    assert_eq!(
        program.error().map(|(code, _)| code),
        Some(ErrorCode::NotOpen.code())
    );
}

#[test]
fn file_errors_can_be_caught() {
    let host = Host::new();
    let program = host.run(
        "int main() {
             file f();
             try { f.open(\"absent\", \"r\"); }
             catch (CBotErrFileOpen) { return 1; }
             return 0;
         }",
    );
    assert_eq!(program.result(), Some(&Value::Int(1)));
}

/// In-memory files that count the handles still alive.
#[derive(Clone, Default)]
struct CountingFiles {
    inner: MemoryFileAccess,
    live: Arc<AtomicUsize>,
}

impl CountingFiles {
    fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn program(&self, source: &str) -> Program {
        let registry = Registry::with_stdlib(Arc::new(self.clone()));
        let mut program = Program::new(ProgramConfig::new(Arc::new(registry)));
        program.compile(source).unwrap();
        program.start("main").unwrap();
        program
    }
}

struct Counted {
    inner: Box<dyn FileHandle>,
    live: Arc<AtomicUsize>,
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FileHandle for Counted {
    fn write(&mut self, text: &str) -> bool {
        self.inner.write(text)
    }

    fn read_line(&mut self) -> Option<String> {
        self.inner.read_line()
    }

    fn is_eof(&mut self) -> bool {
        self.inner.is_eof()
    }
}

impl FileAccess for CountingFiles {
    fn open(&self, name: &str, mode: OpenMode) -> Option<Box<dyn FileHandle>> {
        let inner = self.inner.open(name, mode)?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Some(Box::new(Counted {
            inner,
            live: Arc::clone(&self.live),
        }))
    }

    fn delete(&self, name: &str) -> bool {
        self.inner.delete(name)
    }
}

#[test]
fn unclosed_files_are_released_with_their_instance() {
    let files = CountingFiles::default();
    let mut program = files.program(
        "int main() {
             int n = 0;
             for (int i = 0; i < 200; i++) {
                 file f = new file();
                 f.open(\"x.txt\", \"w\");
                 f.writeln(\"a\");
                 n++;
             }
             return n;
         }",
    );
    while program.run_steps(25) == Ok(RunStatus::Continue) {
        assert!(files.live() <= 2, "{} files open", files.live());
    }
    assert_eq!(program.result(), Some(&Value::Int(200)));
    assert_eq!(files.live(), 0);
}

#[test]
fn stopping_a_run_releases_its_files() {
    let files = CountingFiles::default();
    let mut program = files.program(
        "void main() {
             file f();
             f.open(\"x.txt\", \"w\");
             while (true) { f.writeln(\"a\"); }
         }",
    );
    assert_eq!(program.run_steps(50), Ok(RunStatus::Continue));
    assert_eq!(files.live(), 1);
    program.stop_handle().stop();
    assert_eq!(program.run(), Ok(RunStatus::Error));
    assert_eq!(files.live(), 0);
}

#[test]
fn a_failed_run_releases_its_files() {
    let files = CountingFiles::default();
    let mut program = files.program(
        "void main() {
             file f();
             f.open(\"x.txt\", \"w\");
             throw 77;
         }",
    );
    assert_eq!(program.run(), Ok(RunStatus::Error));
    assert_eq!(program.error().map(|(code, _)| code), Some(77));
    assert_eq!(files.live(), 0);
}
