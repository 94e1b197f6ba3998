mod common;

use common::{Call, RecordingSession, Script};
use rust_product_store::{
    Executor, ExecutorState, FailureClass, NewRecord, OperationKind, Outcome, Record, Statement,
    StorageError, Value,
};

fn widget() -> NewRecord {
    NewRecord::new("Widget", 9.99, 10)
}

#[test]
fn create_commits_and_reports_generated_key() {
    let mut executor = Executor::new(RecordingSession::affecting(1));

    let outcome = executor.create(&widget());

    assert_eq!(
        outcome,
        Outcome::Committed {
            operation: OperationKind::Create,
            id: 42,
            rows: 1,
        }
    );
    assert!(outcome.summary().0);
    assert_eq!(
        executor.session().calls,
        vec![
            Call::Prepare(Statement::Insert),
            Call::Execute(
                Statement::Insert,
                vec![
                    Value::Text("Widget".to_string()),
                    Value::Real(9.99),
                    Value::Integer(10),
                ]
            ),
            Call::Commit,
        ]
    );
    assert_eq!(executor.state(), ExecutorState::Idle);
}

#[test]
fn update_reports_the_requested_key() {
    let mut executor = Executor::new(RecordingSession::affecting(1));

    let outcome = executor.update(&Record::new(3, "Gear", 2.0, 1));

    assert_eq!(
        outcome,
        Outcome::Committed {
            operation: OperationKind::Update,
            id: 3,
            rows: 1,
        }
    );
}

#[test]
fn zero_rows_rolls_back_without_error() {
    let mut executor = Executor::new(RecordingSession::affecting(0));

    let outcome = executor.delete(9999);

    assert_eq!(
        outcome,
        Outcome::NoEffect {
            operation: OperationKind::Delete,
            id: Some(9999),
        }
    );
    assert_eq!(outcome.class(), Some(FailureClass::NoEffect));
    assert_eq!(
        outcome.message(),
        "No product found with ID 9999. Transaction rolled back."
    );
    assert_eq!(executor.session().commits(), 0);
    assert_eq!(executor.session().rollbacks(), 1);
}

#[test]
fn exactly_one_resolution_per_mutation() {
    for affected in [0, 1, 3] {
        let runs: [fn(&mut Executor<RecordingSession>) -> Outcome; 3] = [
            |e| e.create(&widget()),
            |e| e.update(&widget().with_id(1)),
            |e| e.delete(1),
        ];
        for run in runs {
            let mut executor = Executor::new(RecordingSession::affecting(affected));
            run(&mut executor);

            let session = executor.session();
            assert_eq!(session.commits() + session.rollbacks(), 1);
            assert_eq!(session.commits(), usize::from(affected > 0));
            assert_eq!(executor.state(), ExecutorState::Idle);
        }
    }
}

#[test]
fn execute_failure_rolls_back_once() {
    let mut executor = Executor::new(RecordingSession::new(Script {
        fail_execute: true,
        ..Script::default()
    }));

    let outcome = executor.update(&widget().with_id(1));

    assert!(!outcome.is_success());
    assert!(matches!(
        outcome,
        Outcome::Failed {
            operation: OperationKind::Update,
            error: StorageError::Execute { .. },
        }
    ));
    assert_eq!(outcome.class(), Some(FailureClass::Storage));
    assert_eq!(executor.session().commits(), 0);
    assert_eq!(executor.session().rollbacks(), 1);
    assert_eq!(executor.state(), ExecutorState::Idle);
}

#[test]
fn prepare_failure_skips_execute_and_rolls_back() {
    let mut executor = Executor::new(RecordingSession::new(Script {
        fail_prepare: true,
        ..Script::default()
    }));

    let outcome = executor.create(&widget());

    assert!(matches!(
        outcome,
        Outcome::Failed {
            error: StorageError::Prepare { statement: "insert", .. },
            ..
        }
    ));
    assert_eq!(
        executor.session().calls,
        vec![Call::Prepare(Statement::Insert), Call::Rollback]
    );
}

#[test]
fn commit_failure_falls_back_to_rollback() {
    let mut executor = Executor::new(RecordingSession::new(Script {
        affected: 1,
        fail_commit: true,
        ..Script::default()
    }));

    let outcome = executor.delete(5);

    assert!(matches!(
        outcome,
        Outcome::Failed {
            error: StorageError::Commit(_),
            ..
        }
    ));
    let calls = &executor.session().calls;
    assert_eq!(&calls[calls.len() - 2..], &[Call::Commit, Call::Rollback]);
}

#[test]
fn failed_rollback_is_critical_but_not_fatal() {
    let mut executor = Executor::new(RecordingSession::new(Script {
        fail_execute: true,
        fail_rollback: true,
        ..Script::default()
    }));

    let outcome = executor.delete(1);

    assert_eq!(outcome.class(), Some(FailureClass::Critical));
    assert!(matches!(
        outcome,
        Outcome::Critical {
            error: Some(StorageError::Execute { .. }),
            rollback: StorageError::Rollback(_),
            ..
        }
    ));
    assert_eq!(executor.session().rollbacks(), 1);
    assert_eq!(executor.state(), ExecutorState::Idle);

    // The executor still accepts work and the session still closes.
    let again = executor.delete(2);
    assert_eq!(again.class(), Some(FailureClass::Critical));
    executor.close().unwrap();
    assert_eq!(executor.session().count(&Call::Close), 1);
}

#[test]
fn no_effect_with_failed_rollback_is_critical() {
    let mut executor = Executor::new(RecordingSession::new(Script {
        affected: 0,
        fail_rollback: true,
        ..Script::default()
    }));

    let outcome = executor.update(&widget().with_id(8));

    assert!(matches!(outcome, Outcome::Critical { error: None, .. }));
    assert!(outcome.message().contains("Could not execute rollback"));
}

#[test]
fn read_all_never_resolves_a_transaction() {
    let rows = vec![
        Record::new(1, "Widget", 9.99, 10),
        Record::new(2, "Gadget", 19.5, 0),
    ];
    let mut executor = Executor::new(RecordingSession::new(Script {
        rows: rows.clone(),
        ..Script::default()
    }));

    let mut seen = Vec::new();
    let count = executor.read_all(|r| seen.push(r)).unwrap();

    assert_eq!(count, 2);
    assert_eq!(seen, rows);
    assert_eq!(
        executor.session().calls,
        vec![
            Call::Prepare(Statement::SelectAll),
            Call::Query(Statement::SelectAll)
        ]
    );
}

#[test]
fn read_failure_surfaces_without_rollback() {
    let mut executor = Executor::new(RecordingSession::new(Script {
        fail_execute: true,
        ..Script::default()
    }));

    let err = executor.read_all(|_| {}).unwrap_err();

    assert!(matches!(err, StorageError::Execute { statement: "select-all", .. }));
    assert_eq!(executor.session().rollbacks(), 0);
    assert_eq!(executor.state(), ExecutorState::Idle);
}
