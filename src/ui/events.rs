//! Background task completion handling.

use crate::app::{App, AppEvent};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::SnapshotLoaded(Ok(records)) => {
            app.loading = false;
            app.replace_snapshot(records);
        }
        AppEvent::SnapshotLoaded(Err(error)) => {
            app.loading = false;
            app.report_error(format!("Reload failed: {}", error));
        }
        AppEvent::TaskPanicked { task, error } => {
            app.loading = false;
            app.report_error(format!("Background task '{}' crashed: {}", task, error));
        }
    }
}
