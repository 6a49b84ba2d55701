#![forbid(unsafe_code)]

//! End-to-end scenarios through the facade.

use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use rewind::prelude::*;
use rewind::{ErrorKind, HistoryError};

type Doc = Arc<Mutex<String>>;

/// Appends text to a shared document.
struct Append {
    doc: Doc,
    text: String,
}

impl Append {
    fn new(doc: &Doc, text: &str) -> Self {
        Self {
            doc: Arc::clone(doc),
            text: text.to_string(),
        }
    }
}

impl Action for Append {
    fn description(&self) -> &str {
        &self.text
    }

    fn undo_description(&self) -> &str {
        "Undo typing"
    }

    fn execute(&mut self) -> ActionResult {
        self.doc.lock().unwrap().push_str(&self.text);
        Ok(())
    }

    fn undo(&mut self) -> ActionResult {
        let mut doc = self.doc.lock().unwrap();
        let keep = doc
            .len()
            .checked_sub(self.text.len())
            .ok_or_else(|| ActionError::new("document shorter than insertion"))?;
        doc.truncate(keep);
        Ok(())
    }
}

/// Saves the document once a remote acknowledgement arrives.
struct Save {
    ack: Option<oneshot::Receiver<()>>,
}

impl Action for Save {
    fn description(&self) -> &str {
        "Save"
    }

    fn execute(&mut self) -> ActionResult {
        Ok(())
    }

    fn undo(&mut self) -> ActionResult {
        Ok(())
    }
}

impl AsyncAction for Save {
    fn execute_async(&mut self) -> BoxFuture<'_, ActionResult> {
        let ack = self.ack.take();
        async move {
            match ack {
                Some(ack) => ack.await.map_err(ActionError::from_source),
                None => Ok(()),
            }
        }
        .boxed()
    }

    fn undo_async(&mut self) -> BoxFuture<'_, ActionResult> {
        async { Ok(()) }.boxed()
    }
}

fn text(doc: &Doc) -> String {
    doc.lock().unwrap().clone()
}

#[test]
fn execute_undo_redo_restores_description() {
    let doc = Doc::default();
    let history = ActionHistory::new();

    history.execute_action(Append::new(&doc, "hello")).unwrap();
    assert!(history.undo().unwrap().is_done());
    assert_eq!(text(&doc), "");
    assert!(history.redo().unwrap().is_done());
    assert_eq!(text(&doc), "hello");

    assert_eq!(history.current_undo_description().as_deref(), Some("Undo typing"));
    assert_eq!(history.undo_buffer_count(), 1);
    assert_eq!(history.redo_buffer_count(), 0);
}

#[test]
fn new_branch_discards_redo() {
    let doc = Doc::default();
    let history = ActionHistory::new();
    history.execute_action(Append::new(&doc, "a")).unwrap();
    assert!(history.undo().unwrap().is_done());
    history.execute_action(Append::new(&doc, "b")).unwrap();
    assert_eq!(history.redo_buffer_count(), 0);
    assert_eq!(text(&doc), "b");
}

#[test]
fn unlimited_exceeds_default() {
    let doc = Doc::default();
    let history = ActionHistory::with_max_undo_actions(-1).unwrap();
    let n = rewind::DEFAULT_MAX_UNDO_ACTIONS as usize + 25;
    for _ in 0..n {
        history.execute_action(Append::new(&doc, "x")).unwrap();
    }
    assert_eq!(history.undo_buffer_count(), n);
}

#[test]
fn errors_convert_to_facade_error() -> rewind::Result<()> {
    let history = ActionHistory::new();
    let err: Error = history.undo().unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(err.error_type(), "history");

    let config = HistoryConfig::new(5);
    let history = ActionHistory::from_config(&config)?;
    assert_eq!(history.max_undo_actions(), 5);
    Ok(())
}

#[tokio::test]
async fn async_save_blocks_until_acknowledged() {
    let doc = Doc::default();
    let history = ActionHistory::new();
    let (tx, rx) = oneshot::channel();

    let pending = history.execute_action_async(Save { ack: Some(rx) }).unwrap();
    assert!(history.is_action_executing());
    assert!(history.is_async_action_ongoing());

    let err = history.execute_action(Append::new(&doc, "late")).unwrap_err();
    assert!(matches!(err, HistoryError::Busy { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(text(&doc), "");

    tx.send(()).unwrap();
    pending.await.unwrap();
    assert!(!history.is_action_executing());
    assert_eq!(history.current_undo_description().as_deref(), Some("Save"));
}

#[test]
fn buffer_usable_directly() {
    let mut buf = BoundedCircularBuffer::with_max_capacity(3).unwrap();
    buf.push_range(1..=5);
    assert_eq!(buf.to_vec(), vec![5, 4, 3]);
    assert_eq!(buf.capacity(), Capacity::new(3));
}
