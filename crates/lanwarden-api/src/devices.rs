// Device-list endpoints: the approved / unapproved collections.
//
// The backend models device identity as the (mac_address, ip_address)
// pair; "approve" and "revoke" are add/remove calls against the two
// tables, not a status flip on one row.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AckResponse, DeviceKeyBody, DeviceRecord};

impl ApiClient {
    /// Fetch the approved-device list.
    ///
    /// A non-JSON (empty) success resolves to an empty list.
    pub async fn get_approved(&self) -> Result<Vec<DeviceRecord>, Error> {
        Ok(self.get("getApproved").await?.unwrap_or_default())
    }

    /// Fetch the unapproved-device list.
    pub async fn get_unapproved(&self) -> Result<Vec<DeviceRecord>, Error> {
        Ok(self.get("getUnapproved").await?.unwrap_or_default())
    }

    /// Add (or move) a device to the approved table.
    pub async fn add_approved(&self, device: &DeviceRecord) -> Result<(), Error> {
        let _: Option<AckResponse> = self.post("addApproved", device).await?;
        Ok(())
    }

    /// Add (or move) a device to the unapproved table.
    pub async fn add_unapproved(&self, device: &DeviceRecord) -> Result<(), Error> {
        let _: Option<AckResponse> = self.post("addUnapproved", device).await?;
        Ok(())
    }

    /// Remove a device from the approved table by its identity pair.
    pub async fn remove_approved(&self, mac_address: &str, ip_address: &str) -> Result<(), Error> {
        let body = DeviceKeyBody {
            mac_address,
            ip_address,
        };
        let _: Option<AckResponse> = self.delete("removeApproved", &body).await?;
        Ok(())
    }

    /// Remove a device from the unapproved table by its identity pair.
    pub async fn remove_unapproved(
        &self,
        mac_address: &str,
        ip_address: &str,
    ) -> Result<(), Error> {
        let body = DeviceKeyBody {
            mac_address,
            ip_address,
        };
        let _: Option<AckResponse> = self.delete("removeUnapproved", &body).await?;
        Ok(())
    }

    /// Update descriptive fields of an approved device (keyed by pair).
    pub async fn update_approved(&self, device: &DeviceRecord) -> Result<(), Error> {
        let _: Option<AckResponse> = self.put("updateApproved", device).await?;
        Ok(())
    }

    /// Update descriptive fields of an unapproved device (keyed by pair).
    ///
    /// Path casing (`updateUnApproved`) is the backend's, not ours.
    pub async fn update_unapproved(&self, device: &DeviceRecord) -> Result<(), Error> {
        let _: Option<AckResponse> = self.put("updateUnApproved", device).await?;
        Ok(())
    }
}
