use super::*;
use cbot_value::Value;
use pretty_assertions::assert_eq;

use crate::test_util::{compile_with, entry, registry};
use crate::RunStatus;

const PROGRAM: &str = "class Acc {
    int total = 0;
    void add(int v) { total += v; }
}
int main() {
    Acc acc = new Acc();
    Acc alias = acc;
    int[] squares;
    int[] view = squares;
    for (int i = 0; i < 20; i++) {
        acc.add(i);
        squares[i] = i * i;
    }
    return alias.total + view[19];
}";

fn started(source: &str) -> (Machine, u32) {
    let registry = registry();
    let (module, signature) = compile_with(source, &registry);
    let main = entry(&module, "main");
    let machine = Machine::start(module, registry, main, MachineConfig::default());
    (machine, signature)
}

/// Encode, decode and rebuild `machine` against a fresh compile.
fn round_trip(machine: &Machine, source: &str) -> Machine {
    let registry = registry();
    let (module, signature) = compile_with(source, &registry);
    let bytes = machine.save(signature).unwrap().to_bytes().unwrap();
    let snapshot = Snapshot::from_bytes(&bytes).unwrap();
    Machine::restore(module, registry, &snapshot, signature, MachineConfig::default()).unwrap()
}

#[test]
fn a_restored_run_finishes_like_the_original() {
    let (mut whole, _) = started(PROGRAM);
    assert_eq!(whole.run(None), RunStatus::Finished);
    assert_eq!(whole.result(), Some(&Value::Int(190 + 361)));

    for pause in [1, 5, 23, 60] {
        let (mut first, _) = started(PROGRAM);
        assert_eq!(first.run(Some(pause)), RunStatus::Continue);
        let mut second = round_trip(&first, PROGRAM);
        assert_eq!(second.steps(), first.steps());
        assert_eq!(second.frames().len(), first.frames().len());
        assert_eq!(second.run(None), RunStatus::Finished);
        assert_eq!(second.result(), whole.result());
        assert_eq!(second.steps(), whole.steps());
    }
}

#[test]
fn restoring_repeatedly_is_harmless() {
    let (mut machine, _) = started(PROGRAM);
    loop {
        match machine.run(Some(3)) {
            RunStatus::Continue => machine = round_trip(&machine, PROGRAM),
            RunStatus::Finished => break,
            RunStatus::Error => panic!("{:?}", machine.error()),
        }
    }
    assert_eq!(machine.result(), Some(&Value::Int(551)));
}

#[test]
fn shared_cells_stay_shared() {
    let (mut machine, _) = started(PROGRAM);
    machine.run(Some(30));
    let snapshot = machine.save(0).unwrap();
    // Two locals hold the same instance, two hold the same array.
    assert!(snapshot.objects.len() <= 1);
    assert!(snapshot.arrays.len() <= 1);
}

#[test]
fn a_suspended_finally_resumes_its_pending_exception() {
    let source = "int main() {
        int r = 0;
        try {
            try { throw 7; }
            finally { for (int i = 0; i < 10; i++) { r += i; } }
        }
        catch (7) { r += 1000; }
        return r;
    }";
    let (mut machine, _) = started(source);
    machine.run(Some(8));
    let mut restored = round_trip(&machine, source);
    assert_eq!(restored.run(None), RunStatus::Finished);
    assert_eq!(restored.result(), Some(&Value::Int(1045)));
}

#[test]
fn another_program_is_rejected() {
    let (mut machine, signature) = started(PROGRAM);
    machine.run(Some(10));
    let snapshot = machine.save(signature).unwrap();

    let registry = registry();
    let other = "int main() { return 1; }";
    let (module, other_signature) = compile_with(other, &registry);
    assert_ne!(signature, other_signature);
    let err = Machine::restore(
        Arc::clone(&module),
        Arc::clone(&registry),
        &snapshot,
        other_signature,
        MachineConfig::default(),
    )
    .err();
    assert_eq!(
        err,
        Some(SnapshotError::Signature {
            expected: other_signature,
            found: signature,
        })
    );
    // Forcing the signature still fails on the frame chain.
    let forced = Machine::restore(
        module,
        registry,
        &snapshot,
        signature,
        MachineConfig::default(),
    );
    assert!(forced.is_err());
}

#[test]
fn headers_are_checked() {
    let (mut machine, signature) = started(PROGRAM);
    machine.run(Some(10));
    let mut bytes = machine.save(signature).unwrap().to_bytes().unwrap();
    bytes[0] = b'X';
    assert_eq!(Snapshot::from_bytes(&bytes).err(), Some(SnapshotError::BadMagic));
    assert!(matches!(
        Snapshot::from_bytes(&bytes[..3]),
        Err(SnapshotError::Decode(_))
    ));
}

#[test]
fn only_running_programs_are_saved() {
    let (mut machine, signature) = started("int main() { return 2; }");
    assert_eq!(machine.run(None), RunStatus::Finished);
    assert_eq!(machine.save(signature).err(), Some(SnapshotError::NotRunning));
}

#[test]
fn corrupt_states_are_rejected() {
    let (mut machine, signature) = started(PROGRAM);
    machine.run(Some(10));
    let mut snapshot = machine.save(signature).unwrap();
    if let Some(top) = snapshot.frames.last_mut() {
        top.state = 99;
    }
    let registry = registry();
    let (module, _) = compile_with(PROGRAM, &registry);
    let err = Machine::restore(module, registry, &snapshot, signature, MachineConfig::default())
        .err();
    assert_eq!(err, Some(SnapshotError::Corrupt("frame state")));
}

#[test]
fn oversized_arrays_are_rejected() {
    let (mut machine, signature) = started(PROGRAM);
    assert_eq!(machine.run(Some(60)), RunStatus::Continue);
    let mut snapshot = machine.save(signature).unwrap();
    assert!(!snapshot.cells.is_empty());
    let array = snapshot.arrays.first_mut().unwrap();
    array.items = vec![0; MAX_ARRAY_SIZE as usize + 2];
    let registry = registry();
    let (module, _) = compile_with(PROGRAM, &registry);
    let err = Machine::restore(module, registry, &snapshot, signature, MachineConfig::default())
        .err();
    assert_eq!(err, Some(SnapshotError::Corrupt("array size")));
}
