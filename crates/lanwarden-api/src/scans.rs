// Scan endpoints: immediate scans and the planned-scan schedule.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    AckResponse, DeletePlannedBody, PlanScanBody, PlannedScanRecord, ScanTargetBody, StartScanBody,
};

impl ApiClient {
    /// Trigger an immediate scan.
    ///
    /// The backend accepts an optional `{scan_target}` body; without one
    /// it scans its configured default range.
    pub async fn start_scan(&self, target: Option<&str>) -> Result<(), Error> {
        let _: Option<AckResponse> = match target {
            Some(scan_target) => {
                self.post("StartScan", &StartScanBody { scan_target }).await?
            }
            None => self.post_empty("StartScan").await?,
        };
        Ok(())
    }

    /// Create a recurring schedule: scan `scan_target` every `interval`
    /// minutes. Validation (non-empty target, positive interval) happens
    /// in `lanwarden-core` before this is called.
    pub async fn plan_scan(&self, interval: i64, scan_target: &str) -> Result<(), Error> {
        let body = PlanScanBody {
            interval,
            scan_target,
        };
        let _: Option<AckResponse> = self.post("planScan", &body).await?;
        Ok(())
    }

    /// Fetch all planned scans.
    pub async fn planned_all(&self) -> Result<Vec<PlannedScanRecord>, Error> {
        Ok(self.get("plannedScans/all").await?.unwrap_or_default())
    }

    /// Fetch the planned scans currently due.
    pub async fn planned_due(&self) -> Result<Vec<PlannedScanRecord>, Error> {
        Ok(self.get("plannedScans/due").await?.unwrap_or_default())
    }

    /// Pause a schedule: the backend sets its `next_scan_at` to NULL.
    pub async fn clear_next_scan(&self, scan_target: &str) -> Result<(), Error> {
        let _: Option<AckResponse> = self
            .put("plannedScans/clearNext", &ScanTargetBody { scan_target })
            .await?;
        Ok(())
    }

    /// Advance a schedule: the backend sets `last_scan_at = now` and
    /// `next_scan_at = now + interval`.
    pub async fn touch_planned(&self, scan_target: &str) -> Result<(), Error> {
        let _: Option<AckResponse> = self
            .put("plannedScans/touch", &ScanTargetBody { scan_target })
            .await?;
        Ok(())
    }

    /// Delete a schedule. The backend keys this by `interval` alone —
    /// the only row selector its contract offers.
    pub async fn delete_planned(&self, interval: i64) -> Result<(), Error> {
        let _: Option<AckResponse> = self
            .delete("plannedScans/delete", &DeletePlannedBody { interval })
            .await?;
        Ok(())
    }
}
