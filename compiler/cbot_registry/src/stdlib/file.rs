//! The `file` class and `deletefile`.
//!
//! An instance records its name in the public `filename` field and its
//! open-file number in the private `handle` field; the open files
//! themselves live in a table owned by the registered natives. A closed
//! (or never opened) file has an undefined `handle`.
//!
//! An open file is released when its instance is dropped, even if the
//! script never calls `close()`: the instance carries an [`OpenGuard`]
//! that removes the table entry. Snapshots do not carry guards, so a
//! restored instance's file stays open only while the saved one lives.

use std::sync::Arc;

use cbot_diagnostic::ErrorCode;
use cbot_ir::{TypeDesc, Visibility};
use cbot_value::{InitState, ObjRef, Value, Var, VarCell};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{arg_count, expect_string, FileAccess, FileHandle, NativeCall, OpenMode, Registry};

pub const FILE_CLASS: &str = "file";

struct FileTable {
    access: Arc<dyn FileAccess>,
    open: Mutex<OpenFiles>,
}

#[derive(Default)]
struct OpenFiles {
    next: i64,
    files: FxHashMap<i64, Box<dyn FileHandle>>,
}

/// Removes an open file from the table when the owning instance drops.
struct OpenGuard {
    table: Arc<FileTable>,
    id: i64,
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        if self.table.open.lock().files.remove(&self.id).is_some() {
            debug!(id = self.id, "file released");
        }
    }
}

impl FileTable {
    fn insert(&self, handle: Box<dyn FileHandle>) -> i64 {
        let mut open = self.open.lock();
        open.next += 1;
        let id = open.next;
        open.files.insert(id, handle);
        id
    }

    /// Run `f` on the file `this` has open.
    fn with_open<T>(
        &self,
        this: &ObjRef,
        f: impl FnOnce(&mut dyn FileHandle) -> Result<T, ErrorCode>,
    ) -> Result<T, ErrorCode> {
        let id = handle_of(this)?;
        let mut open = self.open.lock();
        let file = open.files.get_mut(&id).ok_or(ErrorCode::NotOpen)?;
        f(file.as_mut())
    }
}

fn field(this: &ObjRef, name: &str) -> Result<VarCell, ErrorCode> {
    this.borrow()
        .field_named(name)
        .cloned()
        .ok_or(ErrorCode::UndefItem)
}

/// The open-file number, `NotOpen` when the handle is undefined.
fn handle_of(this: &ObjRef) -> Result<i64, ErrorCode> {
    let cell = field(this, "handle")?;
    let var = cell.borrow();
    if var.state() != InitState::Defined {
        return Err(ErrorCode::NotOpen);
    }
    var.get()?.as_int().ok_or(ErrorCode::NotOpen)
}

fn open_file(table: &Arc<FileTable>, call: &NativeCall<'_>) -> Result<(), ErrorCode> {
    let this = call.receiver()?;
    // `open(mode)` reuses the stored name; `open(name[, mode])` replaces it.
    let (name, mode) = match call.args.len() {
        1 => match OpenMode::parse(&call.string(0)?) {
            Some(mode) => {
                let stored = field(this, "filename")?.borrow().get();
                let name = stored.map_err(|_| ErrorCode::FileOpen)?;
                (name.to_text(&TypeDesc::String), mode)
            }
            None => (call.string(0)?, OpenMode::Read),
        },
        2 => {
            let mode = OpenMode::parse(&call.string(1)?).ok_or(ErrorCode::BadParam)?;
            (call.string(0)?, mode)
        }
        0 => return Err(ErrorCode::LowParam),
        _ => return Err(ErrorCode::OverParam),
    };
    field(this, "filename")?
        .borrow_mut()
        .set(Value::from(name.as_str()))?;

    let handle = field(this, "handle")?;
    if handle.borrow().state() == InitState::Defined {
        return Err(ErrorCode::FileOpen);
    }
    let file = table.access.open(&name, mode).ok_or(ErrorCode::FileOpen)?;
    let id = table.insert(file);
    this.borrow_mut().attach(Box::new(OpenGuard {
        table: Arc::clone(table),
        id,
    }));
    handle.borrow_mut().set(Value::Int(id))?;
    debug!(name = name.as_str(), ?mode, id, "file opened");
    Ok(())
}

fn check_open_args(args: &[TypeDesc], min: usize) -> Result<(), ErrorCode> {
    if args.len() < min {
        return Err(ErrorCode::LowParam);
    }
    for i in 0..args.len().min(2) {
        expect_string(args, i)?;
    }
    arg_count(args, min, 2)
}

/// Register the `file` class and `deletefile`.
pub fn register_file(registry: &mut Registry, access: Arc<dyn FileAccess>) {
    let table = Arc::new(FileTable {
        access,
        open: Mutex::new(OpenFiles::default()),
    });
    let class = registry.add_class(FILE_CLASS, None);
    registry.add_field(class, "filename", TypeDesc::String, Visibility::Public);
    registry.add_field(class, "handle", TypeDesc::Int, Visibility::Private);

    // file() / file(name)
    registry.add_method(
        class,
        FILE_CLASS,
        |args| {
            for i in 0..args.len() {
                expect_string(args, i)?;
            }
            arg_count(args, 0, 1)?;
            Ok(TypeDesc::Void)
        },
        |call| {
            if !call.args.is_empty() {
                let name = call.string(0)?;
                field(call.receiver()?, "filename")?
                    .borrow_mut()
                    .set(Value::from(name))?;
            }
            Ok(Value::Void)
        },
    );

    let t = Arc::clone(&table);
    registry.add_method(
        class,
        "open",
        |args| {
            check_open_args(args, 1)?;
            Ok(TypeDesc::Boolean)
        },
        move |call| {
            open_file(&t, call)?;
            Ok(Value::Bool(true))
        },
    );

    let t = Arc::clone(&table);
    registry.add_method(
        class,
        "close",
        |args| {
            arg_count(args, 0, 0)?;
            Ok(TypeDesc::Void)
        },
        move |call| {
            let this = call.receiver()?;
            let id = handle_of(this)?;
            t.open.lock().files.remove(&id).ok_or(ErrorCode::NotOpen)?;
            this.borrow_mut().detach();
            let handle = field(this, "handle")?;
            *handle.borrow_mut() = Var::new(TypeDesc::Int);
            debug!(id, "file closed");
            Ok(Value::Void)
        },
    );

    let t = Arc::clone(&table);
    registry.add_method(
        class,
        "writeln",
        |args| {
            expect_string(args, 0)?;
            arg_count(args, 1, 1)?;
            Ok(TypeDesc::Void)
        },
        move |call| {
            let mut line = call.string(0)?;
            line.push('\n');
            t.with_open(call.receiver()?, |file| {
                if file.write(&line) {
                    Ok(Value::Void)
                } else {
                    Err(ErrorCode::Write)
                }
            })
        },
    );

    let t = Arc::clone(&table);
    registry.add_method(
        class,
        "readln",
        |args| {
            arg_count(args, 0, 0)?;
            Ok(TypeDesc::String)
        },
        move |call| {
            t.with_open(call.receiver()?, |file| {
                file.read_line().map(Value::from).ok_or(ErrorCode::Read)
            })
        },
    );

    let t = Arc::clone(&table);
    registry.add_method(
        class,
        "eof",
        |args| {
            arg_count(args, 0, 0)?;
            Ok(TypeDesc::Boolean)
        },
        move |call| t.with_open(call.receiver()?, |file| Ok(Value::Bool(file.is_eof()))),
    );

    registry.add_function(
        "deletefile",
        |args| {
            expect_string(args, 0)?;
            arg_count(args, 1, 1)?;
            Ok(TypeDesc::Boolean)
        },
        move |call| Ok(Value::Bool(table.access.delete(&call.string(0)?))),
    );
}
