//! Save and restore of a suspended run.
//!
//! The heap reachable from the chain (cells, arrays and instances) is
//! flattened into index-addressed tables, so two holders of one array
//! still share it after a restore. Nodes are stored as ids into the
//! module; restoring therefore needs a module compiled from the same
//! source, which the token signature checks.

use std::fmt;
use std::sync::Arc;

use cbot_diagnostic::RuntimeError;
use cbot_ir::{ClassId, ExprKind, FuncId, MethodImpl, Module, TypeDesc};
use cbot_registry::Registry;
use cbot_value::{
    ArrayData, ArrayRef, InitState, Instance, ObjRef, Value, Var, VarCell, MAX_ARRAY_SIZE,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::machine::{Activation, Outcome};
use crate::step::max_state;
use crate::{build_layouts, Completion, Frame, Machine, MachineConfig, Node, StopHandle};

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"CBOT";
pub const SNAPSHOT_VERSION: u32 = 1;

/// Why a snapshot could not be taken or restored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// Only a running program can be saved.
    NotRunning,
    BadMagic,
    Version(u32),
    /// The snapshot was taken from a different program text.
    Signature { expected: u32, found: u32 },
    /// The entry function no longer exists.
    Entry(String),
    /// A reference or node that does not fit the module.
    Corrupt(&'static str),
    Encode(String),
    Decode(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::NotRunning => f.write_str("no program running"),
            SnapshotError::BadMagic => f.write_str("not a CBOT snapshot"),
            SnapshotError::Version(v) => {
                write!(f, "snapshot version {v}, expected {SNAPSHOT_VERSION}")
            }
            SnapshotError::Signature { expected, found } => write!(
                f,
                "snapshot of another program (signature {found:#010x}, expected {expected:#010x})"
            ),
            SnapshotError::Entry(name) => write!(f, "entry function `{name}` not found"),
            SnapshotError::Corrupt(what) => write!(f, "corrupt snapshot: {what}"),
            SnapshotError::Encode(msg) => write!(f, "cannot encode snapshot: {msg}"),
            SnapshotError::Decode(msg) => write!(f, "cannot decode snapshot: {msg}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum InitData {
    Undefined,
    Default,
    Defined,
}

impl From<InitState> for InitData {
    fn from(state: InitState) -> Self {
        match state {
            InitState::Undefined => InitData::Undefined,
            InitState::Default => InitData::Default,
            InitState::Defined => InitData::Defined,
        }
    }
}

impl From<InitData> for InitState {
    fn from(state: InitData) -> Self {
        match state {
            InitData::Undefined => InitState::Undefined,
            InitData::Default => InitState::Default,
            InitData::Defined => InitState::Defined,
        }
    }
}

/// A value with heap references replaced by table indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum ValueData {
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Nan,
    Null,
    Array(u32),
    Object(u32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum CompletionData {
    Normal,
    Value(ValueData),
    Place(u32),
    Break(Option<String>),
    Continue(Option<String>),
    Return(ValueData),
    Throw(RuntimeError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct CellRecord {
    ty: TypeDesc,
    state: InitData,
    value: ValueData,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ArrayRecord {
    elem: TypeDesc,
    limits: Vec<Option<u32>>,
    items: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ObjectRecord {
    class: ClassId,
    fields: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ActivationRecord {
    func: Option<FuncId>,
    this: Option<u32>,
    locals: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct FrameRecord {
    node: Node,
    state: u32,
    cursor: u32,
    aux: u32,
    values: Vec<ValueData>,
    place: Option<u32>,
    pending: Option<CompletionData>,
    act: u32,
}

/// The complete state of a suspended run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    magic: [u8; 4],
    version: u32,
    signature: u32,
    entry: String,
    cells: Vec<CellRecord>,
    arrays: Vec<ArrayRecord>,
    objects: Vec<ObjectRecord>,
    statics: Vec<Vec<u32>>,
    activations: Vec<ActivationRecord>,
    frames: Vec<FrameRecord>,
    incoming: Option<CompletionData>,
    steps: u64,
}

impl Snapshot {
    /// Token signature of the program the snapshot was taken from.
    pub fn signature(&self) -> u32 {
        self.signature
    }

    /// Name of the function the run started at.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Number of frames on the saved chain.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decode and check the header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Snapshot, SnapshotError> {
        let snapshot: Snapshot =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        if snapshot.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version(snapshot.version));
        }
        Ok(snapshot)
    }
}

enum Queued {
    Cell(VarCell, u32),
    Array(ArrayRef, u32),
    Object(ObjRef, u32),
}

/// Flattens the heap. Handles get an index on first sight and are filled
/// in from a work queue, so cycles and long chains need no recursion.
#[derive(Default)]
struct HeapWriter {
    cells: Vec<CellRecord>,
    arrays: Vec<ArrayRecord>,
    objects: Vec<ObjectRecord>,
    cell_ids: FxHashMap<usize, u32>,
    array_ids: FxHashMap<usize, u32>,
    object_ids: FxHashMap<usize, u32>,
    queue: Vec<Queued>,
}

impl HeapWriter {
    fn cell(&mut self, cell: &VarCell) -> u32 {
        if let Some(&id) = self.cell_ids.get(&cell.addr()) {
            return id;
        }
        let id = self.cells.len() as u32;
        self.cell_ids.insert(cell.addr(), id);
        self.cells.push(CellRecord {
            ty: TypeDesc::Void,
            state: InitData::Undefined,
            value: ValueData::Void,
        });
        self.queue.push(Queued::Cell(cell.clone(), id));
        id
    }

    fn array(&mut self, array: &ArrayRef) -> u32 {
        if let Some(&id) = self.array_ids.get(&array.addr()) {
            return id;
        }
        let id = self.arrays.len() as u32;
        self.array_ids.insert(array.addr(), id);
        self.arrays.push(ArrayRecord {
            elem: TypeDesc::Void,
            limits: Vec::new(),
            items: Vec::new(),
        });
        self.queue.push(Queued::Array(array.clone(), id));
        id
    }

    fn object(&mut self, object: &ObjRef) -> u32 {
        if let Some(&id) = self.object_ids.get(&object.addr()) {
            return id;
        }
        let id = self.objects.len() as u32;
        self.object_ids.insert(object.addr(), id);
        self.objects.push(ObjectRecord {
            class: ClassId::INVALID,
            fields: Vec::new(),
        });
        self.queue.push(Queued::Object(object.clone(), id));
        id
    }

    fn value(&mut self, value: &Value) -> ValueData {
        match value {
            Value::Void => ValueData::Void,
            Value::Bool(b) => ValueData::Bool(*b),
            Value::Int(n) => ValueData::Int(*n),
            Value::Float(x) => ValueData::Float(*x),
            Value::Str(s) => ValueData::Str(s.to_string()),
            Value::Nan => ValueData::Nan,
            Value::Null => ValueData::Null,
            Value::Array(array) => ValueData::Array(self.array(array)),
            Value::Object(object) => ValueData::Object(self.object(object)),
        }
    }

    fn completion(&mut self, completion: &Completion) -> CompletionData {
        match completion {
            Completion::Normal => CompletionData::Normal,
            Completion::Value(v) => CompletionData::Value(self.value(v)),
            Completion::Place(cell) => CompletionData::Place(self.cell(cell)),
            Completion::Break(label) => CompletionData::Break(label.clone()),
            Completion::Continue(label) => CompletionData::Continue(label.clone()),
            Completion::Return(v) => CompletionData::Return(self.value(v)),
            Completion::Throw(error) => CompletionData::Throw(*error),
        }
    }

    /// Fill in every queued handle.
    fn drain(&mut self) {
        while let Some(next) = self.queue.pop() {
            match next {
                Queued::Cell(cell, id) => {
                    let var = cell.borrow();
                    let value = self.value(var.peek());
                    self.cells[id as usize] = CellRecord {
                        ty: var.ty().clone(),
                        state: var.state().into(),
                        value,
                    };
                }
                Queued::Array(array, id) => {
                    let data = array.borrow();
                    let items = data.items().iter().map(|c| self.cell(c)).collect();
                    self.arrays[id as usize] = ArrayRecord {
                        elem: data.elem().clone(),
                        limits: data.limits().to_vec(),
                        items,
                    };
                }
                Queued::Object(object, id) => {
                    let instance = object.borrow();
                    let fields = instance.fields().iter().map(|c| self.cell(c)).collect();
                    self.objects[id as usize] = ObjectRecord {
                        class: instance.class_id(),
                        fields,
                    };
                }
            }
        }
    }
}

/// Rebuilt heap tables, indexed like the snapshot's.
struct HeapReader {
    cells: Vec<VarCell>,
    arrays: Vec<ArrayRef>,
    objects: Vec<ObjRef>,
}

impl HeapReader {
    fn cell(&self, id: u32) -> Result<VarCell, SnapshotError> {
        self.cells
            .get(id as usize)
            .cloned()
            .ok_or(SnapshotError::Corrupt("cell index"))
    }

    fn object(&self, id: u32) -> Result<ObjRef, SnapshotError> {
        self.objects
            .get(id as usize)
            .cloned()
            .ok_or(SnapshotError::Corrupt("object index"))
    }

    fn value(&self, value: &ValueData) -> Result<Value, SnapshotError> {
        Ok(match value {
            ValueData::Void => Value::Void,
            ValueData::Bool(b) => Value::Bool(*b),
            ValueData::Int(n) => Value::Int(*n),
            ValueData::Float(x) => Value::Float(*x),
            ValueData::Str(s) => Value::string(s.as_str()),
            ValueData::Nan => Value::Nan,
            ValueData::Null => Value::Null,
            ValueData::Array(id) => Value::Array(
                self.arrays
                    .get(*id as usize)
                    .cloned()
                    .ok_or(SnapshotError::Corrupt("array index"))?,
            ),
            ValueData::Object(id) => Value::Object(self.object(*id)?),
        })
    }

    fn completion(&self, completion: &CompletionData) -> Result<Completion, SnapshotError> {
        Ok(match completion {
            CompletionData::Normal => Completion::Normal,
            CompletionData::Value(v) => Completion::Value(self.value(v)?),
            CompletionData::Place(id) => Completion::Place(self.cell(*id)?),
            CompletionData::Break(label) => Completion::Break(label.clone()),
            CompletionData::Continue(label) => Completion::Continue(label.clone()),
            CompletionData::Return(v) => Completion::Return(self.value(v)?),
            CompletionData::Throw(error) => Completion::Throw(*error),
        })
    }

    fn cells(&self, ids: &[u32]) -> Result<Vec<VarCell>, SnapshotError> {
        ids.iter().map(|id| self.cell(*id)).collect()
    }
}

/// Nodes a frame running `parent` may push.
fn valid_child(module: &Module, parent: Node, child: Node) -> bool {
    match (parent, child) {
        (Node::Start(entry), Node::Function(func)) => entry == func,
        (Node::Start(_), Node::Expr(expr, _)) => module
            .classes
            .iter()
            .flat_map(|class| &class.statics)
            .any(|field| field.init == Some(expr)),
        (Node::Function(func), Node::Stmt(stmt)) => {
            module.get_function(func).is_some_and(|f| f.body == Some(stmt))
        }
        (Node::FieldInit(class), Node::Expr(expr, _)) => module
            .instance_fields(class)
            .iter()
            .any(|(_, field)| field.init == Some(expr)),
        (Node::Stmt(parent), Node::Stmt(stmt)) => module
            .get_stmt(parent)
            .is_some_and(|s| s.kind.child_stmts().contains(&stmt)),
        (Node::Stmt(parent), Node::Expr(expr, _)) => module
            .get_stmt(parent)
            .is_some_and(|s| s.kind.child_exprs().contains(&expr)),
        (Node::Expr(parent, _), child) => {
            let Some(parent) = module.get_expr(parent) else {
                return false;
            };
            match (&parent.kind, child) {
                (kind, Node::Expr(expr, _)) => kind.children().contains(&expr),
                (ExprKind::Call { func, .. }, Node::Function(target)) => *func == target,
                // Virtual dispatch may land on any override.
                (ExprKind::MethodCall { target, .. }, Node::Function(_)) => {
                    matches!(target, MethodImpl::User(_))
                }
                (ExprKind::New { class, .. }, Node::FieldInit(target)) => *class == target,
                (ExprKind::New { ctor, .. }, Node::Function(target)) => {
                    *ctor == Some(MethodImpl::User(target))
                }
                _ => false,
            }
        }
        _ => false,
    }
}

impl Machine {
    /// Capture the suspended run. `signature` identifies the program text.
    pub fn save(&self, signature: u32) -> Result<Snapshot, SnapshotError> {
        if !matches!(self.outcome, Outcome::Running) {
            return Err(SnapshotError::NotRunning);
        }
        let Some(Node::Start(entry)) = self.frames.first().map(Frame::node) else {
            return Err(SnapshotError::NotRunning);
        };
        let entry = self
            .module
            .get_function(entry)
            .map(|f| f.name.clone())
            .ok_or(SnapshotError::Corrupt("entry function"))?;

        let mut heap = HeapWriter::default();
        let statics = self
            .statics
            .iter()
            .map(|fields| fields.iter().map(|cell| heap.cell(cell)).collect())
            .collect();
        let activations = self
            .activations
            .iter()
            .map(|act| ActivationRecord {
                func: act.func,
                this: act.this.as_ref().map(|this| heap.object(this)),
                locals: act.locals.iter().map(|cell| heap.cell(cell)).collect(),
            })
            .collect();
        let frames = self
            .frames
            .iter()
            .map(|frame| FrameRecord {
                node: frame.node,
                state: frame.state,
                cursor: frame.cursor,
                aux: frame.aux,
                values: frame.values.iter().map(|v| heap.value(v)).collect(),
                place: frame.place.as_ref().map(|cell| heap.cell(cell)),
                pending: frame.pending.as_ref().map(|c| heap.completion(c)),
                act: frame.act,
            })
            .collect();
        let incoming = self.incoming.as_ref().map(|c| heap.completion(c));
        heap.drain();

        debug!(
            frames = self.frames.len(),
            cells = heap.cells.len(),
            arrays = heap.arrays.len(),
            objects = heap.objects.len(),
            "state saved"
        );
        Ok(Snapshot {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            signature,
            entry,
            cells: heap.cells,
            arrays: heap.arrays,
            objects: heap.objects,
            statics,
            activations,
            frames,
            incoming,
            steps: self.steps,
        })
    }

    /// Rebuild a suspended run over `module`, which must be compiled from
    /// the text whose signature is `signature`.
    pub fn restore(
        module: Arc<Module>,
        registry: Arc<Registry>,
        snapshot: &Snapshot,
        signature: u32,
        config: MachineConfig,
    ) -> Result<Machine, SnapshotError> {
        if snapshot.signature != signature {
            return Err(SnapshotError::Signature {
                expected: signature,
                found: snapshot.signature,
            });
        }
        let entry = match snapshot.frames.first().map(|f| f.node) {
            Some(Node::Start(entry)) => entry,
            _ => return Err(SnapshotError::Corrupt("chain root")),
        };
        if module.get_function(entry).map(|f| f.name.as_str()) != Some(snapshot.entry.as_str()) {
            return Err(SnapshotError::Entry(snapshot.entry.clone()));
        }
        let layouts = build_layouts(&module);

        // Handles first, contents second: cells may refer to any array or
        // instance and the other way round.
        let cells: Vec<VarCell> = snapshot
            .cells
            .iter()
            .map(|_| VarCell::new(Var::new(TypeDesc::Void)))
            .collect();
        let arrays = snapshot
            .arrays
            .iter()
            .map(|a| ArrayRef::new(ArrayData::new(a.elem.clone(), a.limits.clone())))
            .collect();
        let mut heap = HeapReader {
            cells,
            arrays,
            objects: Vec::with_capacity(snapshot.objects.len()),
        };
        for record in &snapshot.objects {
            let layout = layouts
                .get(record.class.index())
                .cloned()
                .ok_or(SnapshotError::Corrupt("object class"))?;
            if layout.field_count() != record.fields.len() {
                return Err(SnapshotError::Corrupt("object fields"));
            }
            let fields = heap.cells(&record.fields)?;
            heap.objects
                .push(ObjRef::new(Instance::from_parts(layout, fields)));
        }
        for (record, array) in snapshot.arrays.iter().zip(&heap.arrays) {
            if record.items.len() > MAX_ARRAY_SIZE as usize + 1 {
                return Err(SnapshotError::Corrupt("array size"));
            }
            array.borrow_mut().set_items(heap.cells(&record.items)?);
        }
        for (record, cell) in snapshot.cells.iter().zip(&heap.cells) {
            let value = heap.value(&record.value)?;
            *cell.borrow_mut() = Var::from_parts(record.ty.clone(), value, record.state.into());
        }

        if snapshot.statics.len() != module.classes.len()
            || snapshot
                .statics
                .iter()
                .zip(&module.classes)
                .any(|(saved, class)| saved.len() != class.statics.len())
        {
            return Err(SnapshotError::Corrupt("static fields"));
        }
        let statics = snapshot
            .statics
            .iter()
            .map(|ids| heap.cells(ids))
            .collect::<Result<_, _>>()?;

        let mut activations = Vec::with_capacity(snapshot.activations.len());
        for record in &snapshot.activations {
            if let Some(func) = record.func {
                let def = module
                    .get_function(func)
                    .ok_or(SnapshotError::Corrupt("activation function"))?;
                if def.locals.len() != record.locals.len() {
                    return Err(SnapshotError::Corrupt("activation locals"));
                }
            }
            activations.push(Activation {
                func: record.func,
                this: record.this.map(|id| heap.object(id)).transpose()?,
                locals: heap.cells(&record.locals)?,
            });
        }

        let mut frames: Vec<Frame> = Vec::with_capacity(snapshot.frames.len());
        for record in &snapshot.frames {
            if let Some(parent) = frames.last() {
                if !valid_child(&module, parent.node, record.node) {
                    return Err(SnapshotError::Corrupt("frame node"));
                }
            }
            let max = max_state(&module, record.node).ok_or(SnapshotError::Corrupt("frame node"))?;
            if record.state > max {
                return Err(SnapshotError::Corrupt("frame state"));
            }
            if record.act as usize >= activations.len() {
                return Err(SnapshotError::Corrupt("frame activation"));
            }
            let values = record
                .values
                .iter()
                .map(|v| heap.value(v))
                .collect::<Result<Vec<_>, _>>()?;
            frames.push(Frame {
                node: record.node,
                state: record.state,
                cursor: record.cursor,
                aux: record.aux,
                values,
                place: record.place.map(|id| heap.cell(id)).transpose()?,
                pending: record
                    .pending
                    .as_ref()
                    .map(|c| heap.completion(c))
                    .transpose()?,
                act: record.act,
            });
        }
        let incoming = snapshot
            .incoming
            .as_ref()
            .map(|c| heap.completion(c))
            .transpose()?;

        debug!(frames = frames.len(), steps = snapshot.steps, "state restored");
        Ok(Machine {
            module,
            registry,
            config,
            layouts,
            statics,
            frames,
            activations,
            incoming,
            outcome: Outcome::Running,
            stop: StopHandle::new(),
            steps: snapshot.steps,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
