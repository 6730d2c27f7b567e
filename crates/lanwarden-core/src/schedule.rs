// ── Schedule synchronizer ──
//
// Holds the planned-scan board: the full schedule list plus a count of
// rows currently due (aggregate badge only, individual due rows are
// not tracked). Row ids are generated client-side and kept stable per
// `(interval, target)` pair across refreshes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use lanwarden_api::ApiClient;

use crate::busy::{BusyKey, BusySet};
use crate::error::CoreError;
use crate::model::PlannedScan;

type ScheduleList = Arc<Vec<PlannedScan>>;

pub struct ScheduleBoard {
    api: Arc<ApiClient>,
    busy: Arc<BusySet>,
    scheduled: watch::Sender<ScheduleList>,
    due_count: watch::Sender<usize>,
    /// `(interval, target)` -> stable client-side row id.
    row_ids: DashMap<(i64, String), Uuid>,
}

impl ScheduleBoard {
    pub fn new(api: Arc<ApiClient>, busy: Arc<BusySet>) -> Self {
        let (scheduled, _) = watch::channel(Arc::new(Vec::new()));
        let (due_count, _) = watch::channel(0);
        Self {
            api,
            busy,
            scheduled,
            due_count,
            row_ids: DashMap::new(),
        }
    }

    pub fn scheduled(&self) -> ScheduleList {
        self.scheduled.borrow().clone()
    }

    pub fn due_count(&self) -> usize {
        *self.due_count.borrow()
    }

    pub fn subscribe_scheduled(&self) -> watch::Receiver<ScheduleList> {
        self.scheduled.subscribe()
    }

    pub fn subscribe_due_count(&self) -> watch::Receiver<usize> {
        self.due_count.subscribe()
    }

    /// Fetch the full schedule and the due subset in parallel.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let (all, due) = tokio::join!(self.api.planned_all(), self.api.planned_due());
        let all = all?;
        let due = due?;

        let rows: Vec<PlannedScan> = all
            .iter()
            .map(|record| {
                let id = self.row_id(record.interval, &record.scan_target);
                PlannedScan::from_record(id, record)
            })
            .collect();
        debug!(rows = rows.len(), due = due.len(), "schedule refreshed");

        self.scheduled.send_replace(Arc::new(rows));
        self.due_count.send_replace(due.len());
        Ok(())
    }

    /// Create a new schedule.
    ///
    /// Validation runs before any network call; a rejected input
    /// leaves local state untouched and sends nothing.
    pub async fn plan_scan(&self, interval: i64, target: &str) -> Result<(), CoreError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "scan target must not be empty".into(),
            });
        }
        if interval <= 0 {
            return Err(CoreError::ValidationFailed {
                message: format!("interval must be positive, got {interval}"),
            });
        }

        let busy_key = BusyKey::Plan {
            interval,
            target: target.to_owned(),
        };
        if !self.busy.try_acquire(busy_key.clone()) {
            return Err(CoreError::Busy { key: busy_key });
        }

        let result = self.api.plan_scan(interval, target).await;
        let outcome = match result {
            Ok(()) => self.refresh().await,
            Err(e) => Err(e.into()),
        };

        self.busy.release(&busy_key);
        outcome
    }

    /// Trigger an immediate scan outside any schedule. `None` scans
    /// the backend's configured default range.
    pub async fn start_adhoc(&self, target: Option<&str>) -> Result<(), CoreError> {
        if let Some(target) = target {
            let target = target.trim();
            if target.is_empty() {
                return Err(CoreError::ValidationFailed {
                    message: "scan target must not be empty".into(),
                });
            }
            self.api.start_scan(Some(target)).await?;
        } else {
            self.api.start_scan(None).await?;
        }
        Ok(())
    }

    /// Run a schedule's scan immediately: trigger the scan, then
    /// advance the row's timestamps, in sequence. A failure between
    /// the two calls leaves the schedule un-advanced; the next refresh
    /// or due check resolves it.
    pub async fn run_now(&self, row: &PlannedScan) -> Result<(), CoreError> {
        self.guarded(BusyKey::Run(row.id), async {
            self.api.start_scan(Some(&row.target)).await?;
            self.api.touch_planned(&row.target).await?;
            Ok(())
        })
        .await
    }

    /// Pause a schedule (the backend nulls its next-scan time).
    pub async fn stop(&self, row: &PlannedScan) -> Result<(), CoreError> {
        self.guarded(BusyKey::Pause(row.id), async {
            self.api.clear_next_scan(&row.target).await?;
            Ok(())
        })
        .await
    }

    /// Delete a schedule. The wire contract keys this by interval, the
    /// only selector the backend offers.
    pub async fn delete(&self, row: &PlannedScan) -> Result<(), CoreError> {
        let outcome = self
            .guarded(BusyKey::Delete(row.id), async {
                self.api.delete_planned(row.interval).await?;
                Ok(())
            })
            .await;
        if outcome.is_ok() {
            self.row_ids.remove(&(row.interval, row.target.clone()));
        }
        outcome
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Acquire `key`, run the remote future, refresh on success, and
    /// release the key on every path.
    async fn guarded(
        &self,
        key: BusyKey,
        remote: impl Future<Output = Result<(), CoreError>>,
    ) -> Result<(), CoreError> {
        if !self.busy.try_acquire(key.clone()) {
            return Err(CoreError::Busy { key });
        }

        let result = remote.await;
        let outcome = match result {
            Ok(()) => self.refresh().await,
            Err(e) => {
                warn!(key = %key, error = %e, "schedule operation failed");
                Err(e)
            }
        };

        self.busy.release(&key);
        outcome
    }

    fn row_id(&self, interval: i64, target: &str) -> Uuid {
        *self
            .row_ids
            .entry((interval, target.to_owned()))
            .or_insert_with(Uuid::new_v4)
    }
}
