//! Suspending, stopping, saving and restoring runs.

mod common;

use std::thread;
use std::time::Duration;

use cbot_diagnostic::ErrorCode;
use cbot_value::Value;
use cbotc::{ProgramError, RunStatus};
use common::Host;
use pretty_assertions::assert_eq;

const WORKER: &str = "
    class Robot {
        int energy = 100;
        int[] trail;
        void walk(int steps) {
            for (int i = 0; i < steps; i++) {
                trail[sizeof(trail)] = energy;
                energy -= 3;
            }
        }
    }
    int main() {
        Robot r = new Robot();
        Robot same = r;
        try {
            r.walk(20);
            throw 77;
        }
        catch (77) { same.walk(5); }
        finally { r.energy += 1000; }
        return r.energy * 100 + sizeof(same.trail);
    }";

fn finished(host: &Host) -> Value {
    host.run(WORKER).result().cloned().unwrap()
}

#[test]
fn one_step_at_a_time_gives_the_same_result() {
    let host = Host::new();
    let expected = finished(&host);
    assert_eq!(expected, Value::Int((100 - 25 * 3 + 1000) * 100 + 25));

    let mut program = host.program();
    program.compile(WORKER).unwrap();
    program.start("main").unwrap();
    let mut slices = 0;
    while program.run_steps(1) == Ok(RunStatus::Continue) {
        slices += 1;
    }
    assert!(slices > 25);
    assert_eq!(program.result(), Some(&expected));
}

#[test]
fn saved_state_resumes_in_a_new_program() {
    let host = Host::new();
    let expected = finished(&host);

    for pause in [3, 25, 60] {
        let mut first = host.program();
        first.compile(WORKER).unwrap();
        first.start("main").unwrap();
        assert_eq!(first.run_steps(pause), Ok(RunStatus::Continue));
        let bytes = first.save_state().unwrap();

        let mut second = host.program();
        second.compile(WORKER).unwrap();
        second.restore_state(&bytes).unwrap();
        assert_eq!(second.steps(), first.steps());
        assert_eq!(second.run(), Ok(RunStatus::Finished));
        assert_eq!(second.result(), Some(&expected));

        // Saving leaves the first program running.
        assert_eq!(first.run(), Ok(RunStatus::Finished));
        assert_eq!(first.result(), Some(&expected));
    }
}

#[test]
fn state_from_other_source_is_refused() {
    let host = Host::new();
    let mut first = host.program();
    first.compile(WORKER).unwrap();
    first.start("main").unwrap();
    first.run_steps(10).unwrap();
    let bytes = first.save_state().unwrap();

    let mut other = host.program();
    other
        .compile(&WORKER.replace("energy -= 3", "energy -= 4"))
        .unwrap();
    assert!(matches!(
        other.restore_state(&bytes),
        Err(ProgramError::Snapshot(_))
    ));
    assert!(!other.is_running());
    assert!(matches!(
        other.restore_state(b"garbage"),
        Err(ProgramError::Snapshot(_))
    ));
}

#[test]
fn nothing_to_save_without_a_run() {
    let host = Host::new();
    let mut program = host.program();
    assert_eq!(program.save_state(), Err(ProgramError::NotCompiled));
    program.compile(WORKER).unwrap();
    assert_eq!(program.save_state(), Err(ProgramError::NotRunning));
    program.start("main").unwrap();
    program.run().unwrap();
    assert!(matches!(
        program.save_state(),
        Err(ProgramError::Snapshot(_))
    ));
}

#[test]
fn a_host_thread_can_stop_an_endless_script() {
    let host = Host::new();
    let mut program = host.program();
    program
        .compile("void main() { int n = 0; while (true) { n++; } }")
        .unwrap();
    program.start("main").unwrap();
    let stop = program.stop_handle();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        stop.stop();
    });
    let status = loop {
        match program.run_steps(1_000) {
            Ok(RunStatus::Continue) => {}
            other => break other,
        }
    };
    stopper.join().unwrap();
    assert_eq!(status, Ok(RunStatus::Error));
    assert_eq!(
        program.error().map(|(code, _)| code),
        Some(ErrorCode::NoRun.code())
    );
}
