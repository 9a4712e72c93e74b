//! Structural deadlock detection tests.

use crate::common::builders::{func, try_run, UnitBuilder};
use pipesim_core::common::error::SimError;
use pipesim_core::units::ProcessorDesc;

#[test]
fn unsatisfiable_read_grant_is_a_deadlock() {
    // Reads happen in D but no unit ever commits writes, so the consumer
    // waits on R1 forever once the producer has drained out.
    let desc = ProcessorDesc::new(
        vec![UnitBuilder::new("F").caps(&["ALU"]).build()],
        vec![func(UnitBuilder::new("W").caps(&["ALU"]).build(), &["D"])],
        vec![],
        vec![func(
            UnitBuilder::new("D").caps(&["ALU"]).read_lock().build(),
            &["F"],
        )],
    );

    let err = try_run(
        &desc,
        &[("ADD", "ALU")],
        &["ADD R1, R2", "ADD R3, R1"],
    )
    .unwrap_err();

    match err {
        SimError::StructuralDeadlock {
            cycle,
            instr,
            reason,
        } => {
            assert_eq!(instr, 1);
            assert!(cycle >= 4, "producer drains before the stall is terminal");
            assert_eq!(reason, "waiting for register R1");
        }
        other => panic!("expected a structural deadlock, got {other:?}"),
    }
}

#[test]
fn deadlock_error_displays_context() {
    let err = SimError::StructuralDeadlock {
        cycle: 5,
        instr: 1,
        reason: "waiting for register R1".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "processor stalled at cycle 5: instruction 1 waiting for register R1"
    );
}
