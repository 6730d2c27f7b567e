// ── List synchronizer ──
//
// Holds the approved / unapproved device collections and applies
// optimistic moves: local state changes before the network call, the
// server result either reconciles (refresh) or rolls the snapshot
// back wholesale.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use lanwarden_api::ApiClient;

use crate::busy::{BusyKey, BusySet};
use crate::error::CoreError;
use crate::model::{Device, DeviceKey};

type DeviceList = Arc<Vec<Device>>;

pub struct DeviceLists {
    api: Arc<ApiClient>,
    busy: Arc<BusySet>,
    approved: watch::Sender<DeviceList>,
    unapproved: watch::Sender<DeviceList>,
}

impl DeviceLists {
    pub fn new(api: Arc<ApiClient>, busy: Arc<BusySet>) -> Self {
        let (approved, _) = watch::channel(Arc::new(Vec::new()));
        let (unapproved, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            api,
            busy,
            approved,
            unapproved,
        }
    }

    pub fn approved(&self) -> DeviceList {
        self.approved.borrow().clone()
    }

    pub fn unapproved(&self) -> DeviceList {
        self.unapproved.borrow().clone()
    }

    pub fn subscribe_approved(&self) -> watch::Receiver<DeviceList> {
        self.approved.subscribe()
    }

    pub fn subscribe_unapproved(&self) -> watch::Receiver<DeviceList> {
        self.unapproved.subscribe()
    }

    /// Fetch both lists in parallel and replace local state wholesale.
    ///
    /// Rows with an invalid MAC are dropped with a warning rather than
    /// failing the refresh.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let (approved, unapproved) =
            tokio::join!(self.api.get_approved(), self.api.get_unapproved());

        let approved = Self::into_devices(approved?);
        let unapproved = Self::into_devices(unapproved?);
        debug!(
            approved = approved.len(),
            unapproved = unapproved.len(),
            "device lists refreshed"
        );

        self.approved.send_replace(Arc::new(approved));
        self.unapproved.send_replace(Arc::new(unapproved));
        Ok(())
    }

    /// Move a device from unapproved to approved.
    ///
    /// Optimistic: the local move happens before the network call. On
    /// success the lists are re-fetched; on failure both snapshots are
    /// restored exactly. The device's busy key is held for the whole
    /// span and released on every path.
    pub async fn approve(&self, key: &DeviceKey) -> Result<(), CoreError> {
        let device = self.find(&self.unapproved.borrow(), key)?;
        let busy_key = BusyKey::Device(key.clone());
        if !self.busy.try_acquire(busy_key.clone()) {
            return Err(CoreError::Busy { key: busy_key });
        }

        let approved_snapshot = self.approved.borrow().clone();
        let unapproved_snapshot = self.unapproved.borrow().clone();
        self.apply_move(&device, true);

        let result = self.api.add_approved(&device.to_record()).await;
        let outcome = match result {
            Ok(()) => self.refresh().await,
            Err(e) => {
                warn!(device = %key, error = %e, "approve failed, rolling back");
                self.approved.send_replace(approved_snapshot);
                self.unapproved.send_replace(unapproved_snapshot);
                Err(e.into())
            }
        };

        self.busy.release(&busy_key);
        outcome
    }

    /// Move a device from approved back to unapproved.
    ///
    /// Mirror of [`approve`](Self::approve), but the server side takes
    /// two sequential calls (remove from approved, add to unapproved).
    /// If the second call fails the server is left removed-but-not-
    /// re-added; local state still rolls back wholesale and a later
    /// refresh resolves the divergence.
    pub async fn revoke(&self, key: &DeviceKey) -> Result<(), CoreError> {
        let device = self.find(&self.approved.borrow(), key)?;
        let busy_key = BusyKey::Device(key.clone());
        if !self.busy.try_acquire(busy_key.clone()) {
            return Err(CoreError::Busy { key: busy_key });
        }

        let approved_snapshot = self.approved.borrow().clone();
        let unapproved_snapshot = self.unapproved.borrow().clone();
        self.apply_move(&device, false);

        let result = self.revoke_remote(&device).await;
        let outcome = match result {
            Ok(()) => self.refresh().await,
            Err(e) => {
                warn!(device = %key, error = %e, "revoke failed, rolling back");
                self.approved.send_replace(approved_snapshot);
                self.unapproved.send_replace(unapproved_snapshot);
                Err(e)
            }
        };

        self.busy.release(&busy_key);
        outcome
    }

    /// Trigger an immediate scan of `target`, then refresh the lists.
    ///
    /// An empty target fails validation before any network call. No
    /// optimistic change: scan results only exist server-side.
    pub async fn start_scan(&self, target: &str) -> Result<(), CoreError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "scan target must not be empty".into(),
            });
        }
        self.api.start_scan(Some(target)).await?;
        self.refresh().await
    }

    /// Manually add a device to one of the lists, then refresh.
    pub async fn add_device(&self, device: &Device, approved: bool) -> Result<(), CoreError> {
        let record = device.to_record();
        if approved {
            self.api.add_approved(&record).await?;
        } else {
            self.api.add_unapproved(&record).await?;
        }
        self.refresh().await
    }

    /// Update descriptive fields of a device in place, then refresh.
    pub async fn update_device(&self, device: &Device, approved: bool) -> Result<(), CoreError> {
        let record = device.to_record();
        if approved {
            self.api.update_approved(&record).await?;
        } else {
            self.api.update_unapproved(&record).await?;
        }
        self.refresh().await
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn find(&self, list: &DeviceList, key: &DeviceKey) -> Result<Device, CoreError> {
        list.iter()
            .find(|d| d.key == *key)
            .cloned()
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: key.to_string(),
            })
    }

    /// Apply the optimistic local move: drop the device from its source
    /// list and prepend it to the destination.
    fn apply_move(&self, device: &Device, to_approved: bool) {
        let (from, to) = if to_approved {
            (&self.unapproved, &self.approved)
        } else {
            (&self.approved, &self.unapproved)
        };

        let remaining: Vec<Device> = from
            .borrow()
            .iter()
            .filter(|d| d.key != device.key)
            .cloned()
            .collect();
        from.send_replace(Arc::new(remaining));

        let mut moved = Vec::with_capacity(to.borrow().len() + 1);
        moved.push(device.clone());
        moved.extend(to.borrow().iter().cloned());
        to.send_replace(Arc::new(moved));
    }

    async fn revoke_remote(&self, device: &Device) -> Result<(), CoreError> {
        self.api
            .remove_approved(device.key.mac.as_str(), &device.key.ip)
            .await?;
        self.api.add_unapproved(&device.to_record()).await?;
        Ok(())
    }

    fn into_devices(records: Vec<lanwarden_api::DeviceRecord>) -> Vec<Device> {
        records
            .iter()
            .filter_map(|r| match Device::from_record(r) {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!(mac = %r.mac_address, error = %e, "skipping malformed device row");
                    None
                }
            })
            .collect()
    }
}
