//! Data bridge — connects the core synchronizers to TUI actions.
//!
//! Runs as a background task: subscribes to the watch channels of the
//! session gate, device lists, and schedule board, forwarding every
//! change as an [`Action`] through the TUI's action channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use lanwarden_core::{BusySet, DeviceLists, ScheduleBoard, SessionGate};

use crate::action::Action;

/// Shared handles to the synchronizers backing the TUI.
#[derive(Clone)]
pub struct Hub {
    pub gate: Arc<SessionGate>,
    pub lists: Arc<DeviceLists>,
    pub board: Arc<ScheduleBoard>,
    pub busy: Arc<BusySet>,
}

/// Spawn the data bridge connecting the synchronizers' reactive state
/// to the TUI.
///
/// Sends initial snapshots so screens have data immediately, then loops
/// forwarding every change until cancelled.
pub async fn spawn_data_bridge(
    hub: Hub,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut session = hub.gate.subscribe();
    let mut approved = hub.lists.subscribe_approved();
    let mut unapproved = hub.lists.subscribe_unapproved();
    let mut scheduled = hub.board.subscribe_scheduled();
    let mut due_count = hub.board.subscribe_due_count();
    let mut busy = hub.busy.subscribe();

    // Initial snapshots
    let _ = action_tx.send(Action::SessionChanged(session.borrow_and_update().clone()));
    let _ = action_tx.send(Action::ApprovedUpdated(approved.borrow_and_update().clone()));
    let _ = action_tx.send(Action::UnapprovedUpdated(
        unapproved.borrow_and_update().clone(),
    ));
    let _ = action_tx.send(Action::ScheduleUpdated(
        scheduled.borrow_and_update().clone(),
    ));
    let _ = action_tx.send(Action::DueCountUpdated(*due_count.borrow_and_update()));

    // Stream loop — forward every change until cancelled
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = session.changed() => {
                let state = session.borrow_and_update().clone();
                let _ = action_tx.send(Action::SessionChanged(state));
            }
            Ok(()) = approved.changed() => {
                let list = approved.borrow_and_update().clone();
                let _ = action_tx.send(Action::ApprovedUpdated(list));
            }
            Ok(()) = unapproved.changed() => {
                let list = unapproved.borrow_and_update().clone();
                let _ = action_tx.send(Action::UnapprovedUpdated(list));
            }
            Ok(()) = scheduled.changed() => {
                let rows = scheduled.borrow_and_update().clone();
                let _ = action_tx.send(Action::ScheduleUpdated(rows));
            }
            Ok(()) = due_count.changed() => {
                let n = *due_count.borrow_and_update();
                let _ = action_tx.send(Action::DueCountUpdated(n));
            }
            Ok(()) = busy.changed() => {
                busy.borrow_and_update();
                let _ = action_tx.send(Action::BusyChanged);
            }
        }
    }

    debug!("data bridge shut down");
}
