//! Helpers shared across the UI layer: background reloads and panic capture.

use crate::app::{App, AppEvent};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// A panicking background task would otherwise vanish inside the runtime
/// and leave the UI waiting forever.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Reload the snapshot from the configured source in the background.
///
/// The result arrives as [`AppEvent::SnapshotLoaded`]. A second request while
/// one is in flight is ignored.
pub(super) fn spawn_reload(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.loading {
        app.set_status("Reload already in progress");
        return;
    }
    let Some(source) = app.source.as_ref().map(Arc::clone) else {
        app.set_status("No record source to reload from");
        return;
    };

    app.loading = true;
    app.set_status(format!("Reloading from {}...", source));

    let tx = event_tx.clone();
    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(async {
            let result = source.load().await.map_err(|e| e.to_string());
            if let Err(e) = tx.send(AppEvent::SnapshotLoaded(result)).await {
                tracing::warn!(error = %e, event = "SnapshotLoaded", "Channel send failed (receiver dropped)");
            }
        })
        .await
        {
            Ok(()) => {}
            Err(panic_msg) => {
                tracing::error!(task = "reload", error = %panic_msg, "Background task panicked");
                let _ = tx_panic
                    .send(AppEvent::TaskPanicked {
                        task: "reload",
                        error: panic_msg,
                    })
                    .await;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryBrowser;

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_message() {
        let result = catch_task_panic(async {
            if true {
                panic!("boom");
            }
        })
        .await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_reload_without_source() {
        let mut app = App::new(CategoryBrowser::default());
        let (tx, _rx) = mpsc::channel(4);
        spawn_reload(&mut app, &tx);
        assert!(!app.loading);
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_reload_from_snapshot_file() {
        let path = std::env::temp_dir().join(format!("category_tree_reload_{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"id":"1","title":"Shoes"}]"#).unwrap();

        let mut app = App::new(CategoryBrowser::default())
            .with_source(crate::source::RecordSource::File(path.clone()));
        let (tx, mut rx) = mpsc::channel(4);
        spawn_reload(&mut app, &tx);
        assert!(app.loading);

        let event = rx.recv().await.unwrap();
        std::fs::remove_file(&path).ok();
        match event {
            AppEvent::SnapshotLoaded(Ok(records)) => assert_eq!(records[0].title, "Shoes"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
