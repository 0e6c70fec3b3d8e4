//! Host-injected file access.
//!
//! The `file` class and `deletefile` never touch the filesystem directly;
//! they go through the `FileAccess` the host passed to
//! `stdlib::register_file`. `MemoryFileAccess` keeps files in a map (tests,
//! sandboxes); `FsFileAccess` maps names below a root directory.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}

impl OpenMode {
    /// Parse the script-level mode string.
    pub fn parse(mode: &str) -> Option<OpenMode> {
        match mode {
            "r" => Some(OpenMode::Read),
            "w" => Some(OpenMode::Write),
            "a" => Some(OpenMode::Append),
            _ => None,
        }
    }
}

/// An open file.
pub trait FileHandle: Send {
    /// Write text; `false` on failure.
    fn write(&mut self, text: &str) -> bool;

    /// Next line without its terminator; `None` on failure.
    fn read_line(&mut self) -> Option<String>;

    fn is_eof(&mut self) -> bool;
}

/// Capability to open and delete files by script-visible name.
pub trait FileAccess: Send + Sync {
    fn open(&self, name: &str, mode: OpenMode) -> Option<Box<dyn FileHandle>>;

    fn delete(&self, name: &str) -> bool;
}

/// Files held in memory, shared between clones.
#[derive(Clone, Default)]
pub struct MemoryFileAccess {
    files: Arc<Mutex<FxHashMap<String, String>>>,
}

impl MemoryFileAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a file's contents.
    pub fn insert(&self, name: &str, contents: &str) {
        self.files.lock().insert(name.to_owned(), contents.to_owned());
    }

    pub fn contents(&self, name: &str) -> Option<String> {
        self.files.lock().get(name).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }
}

impl FileAccess for MemoryFileAccess {
    fn open(&self, name: &str, mode: OpenMode) -> Option<Box<dyn FileHandle>> {
        let mut files = self.files.lock();
        let text = match mode {
            OpenMode::Read => files.get(name)?.clone(),
            OpenMode::Write => {
                files.insert(name.to_owned(), String::new());
                String::new()
            }
            OpenMode::Append => {
                files.entry(name.to_owned()).or_default();
                String::new()
            }
        };
        Some(Box::new(MemoryFile {
            files: Arc::clone(&self.files),
            name: name.to_owned(),
            mode,
            text,
            pos: 0,
        }))
    }

    fn delete(&self, name: &str) -> bool {
        self.files.lock().remove(name).is_some()
    }
}

struct MemoryFile {
    files: Arc<Mutex<FxHashMap<String, String>>>,
    name: String,
    mode: OpenMode,
    /// Contents at open time, for readers.
    text: String,
    pos: usize,
}

impl FileHandle for MemoryFile {
    fn write(&mut self, text: &str) -> bool {
        if self.mode == OpenMode::Read {
            return false;
        }
        let mut files = self.files.lock();
        files.entry(self.name.clone()).or_default().push_str(text);
        true
    }

    fn read_line(&mut self) -> Option<String> {
        if self.mode != OpenMode::Read {
            return None;
        }
        let rest = self.text.get(self.pos..)?;
        let (line, consumed) = match rest.find('\n') {
            Some(nl) => (&rest[..nl], nl + 1),
            None => (rest, rest.len()),
        };
        let line = line.strip_suffix('\r').unwrap_or(line).to_owned();
        self.pos += consumed;
        Some(line)
    }

    fn is_eof(&mut self) -> bool {
        self.mode != OpenMode::Read || self.pos >= self.text.len()
    }
}

/// Files below a root directory. Names may not escape the root.
#[derive(Clone, Debug)]
pub struct FsFileAccess {
    root: PathBuf,
}

impl FsFileAccess {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsFileAccess { root: root.into() }
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl FileAccess for FsFileAccess {
    fn open(&self, name: &str, mode: OpenMode) -> Option<Box<dyn FileHandle>> {
        let path = self.resolve(name)?;
        match mode {
            OpenMode::Read => {
                let file = File::open(path).ok()?;
                Some(Box::new(FsReader {
                    reader: BufReader::new(file),
                }))
            }
            OpenMode::Write | OpenMode::Append => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(mode == OpenMode::Append)
                    .truncate(mode == OpenMode::Write)
                    .open(path)
                    .ok()?;
                Some(Box::new(FsWriter { file }))
            }
        }
    }

    fn delete(&self, name: &str) -> bool {
        self.resolve(name)
            .is_some_and(|path| fs::remove_file(path).is_ok())
    }
}

struct FsReader {
    reader: BufReader<File>,
}

impl FileHandle for FsReader {
    fn write(&mut self, _text: &str) -> bool {
        false
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line).ok()?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Some(line)
    }

    fn is_eof(&mut self) -> bool {
        self.reader.fill_buf().map_or(true, <[u8]>::is_empty)
    }
}

struct FsWriter {
    file: File,
}

impl FileHandle for FsWriter {
    fn write(&mut self, text: &str) -> bool {
        self.file.write_all(text.as_bytes()).is_ok()
    }

    fn read_line(&mut self) -> Option<String> {
        None
    }

    fn is_eof(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
