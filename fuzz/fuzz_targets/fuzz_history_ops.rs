#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind_runtime::{ActionHistory, CallbackAction, HistoryError, UndoLimit};

#[derive(Debug, Arbitrary)]
enum Op {
    Execute { fail: bool },
    Undo,
    Redo,
    Clear,
    SetLimit(i8),
}

fuzz_target!(|ops: Vec<Op>| {
    let history = ActionHistory::with_limit(UndoLimit::bounded(4));

    for op in ops.into_iter().take(256) {
        let before = (history.undo_buffer_count(), history.redo_buffer_count());
        match op {
            Op::Execute { fail } => {
                let action = CallbackAction::new("fuzz")
                    .with_execute(move || if fail { Err("fail".into()) } else { Ok(()) })
                    .with_undo(|| Ok(()));
                match history.execute_action(action) {
                    Ok(()) => {}
                    Err(HistoryError::ActionFailed { .. }) => {
                        assert!(fail);
                        assert_eq!(
                            (history.undo_buffer_count(), history.redo_buffer_count()),
                            before
                        );
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }
            Op::Undo => match history.undo() {
                Ok(done) => assert!(done.is_done()),
                Err(err) => assert!(matches!(err, HistoryError::NothingToUndo) && before.0 == 0),
            },
            Op::Redo => match history.redo() {
                Ok(done) => assert!(done.is_done()),
                Err(err) => assert!(matches!(err, HistoryError::NothingToRedo) && before.1 == 0),
            },
            Op::Clear => history.clear().unwrap_or_else(|err| panic!("clear refused: {err}")),
            Op::SetLimit(raw) => {
                if history.set_max_undo_actions(i64::from(raw)).is_err() {
                    assert!(raw < -1);
                }
            }
        }

        assert!(!history.is_action_executing());
        if let UndoLimit::Bounded(n) = history.undo_limit() {
            assert!(history.undo_buffer_count() <= n.get());
            assert!(history.redo_buffer_count() <= n.get());
        }
        if history.is_undo_redo_actions_disabled() {
            assert_eq!(history.undo_buffer_count() + history.redo_buffer_count(), 0);
        }
    }
});
