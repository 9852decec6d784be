use reqwest::Method;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{
    Acknowledgement, ActionReceipt, Device, DeviceAction, DeviceStatistics, DeviceUpdate,
    NewDevice,
};

impl ApiClient {
    /// Every device the current user may see. Site-scoped admins only get
    /// their own site's devices, whatever they ask for.
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        self.send(self.request(Method::GET, "/devices/")?).await
    }

    pub async fn list_devices_for_site(&self, site_id: i64) -> Result<Vec<Device>> {
        let request = self
            .request(Method::GET, "/devices/")?
            .query(&[("site_id", site_id)]);
        self.send(request).await
    }

    pub async fn get_device(&self, id: i64) -> Result<Device> {
        self.send(self.request(Method::GET, &format!("/devices/{id}"))?)
            .await
    }

    pub async fn device_statistics(&self) -> Result<DeviceStatistics> {
        self.send(self.request(Method::GET, "/devices/statistics")?)
            .await
    }

    pub async fn device_statistics_for_site(&self, site_id: i64) -> Result<DeviceStatistics> {
        let request = self
            .request(Method::GET, "/devices/statistics")?
            .query(&[("site_id", site_id)]);
        self.send(request).await
    }

    pub async fn create_device(&self, device: &NewDevice) -> Result<Device> {
        let request = self.request(Method::POST, "/devices/")?.json(device);
        self.send(request).await
    }

    pub async fn update_device(&self, id: i64, update: &DeviceUpdate) -> Result<Device> {
        let request = self
            .request(Method::PUT, &format!("/devices/{id}"))?
            .json(update);
        self.send(request).await
    }

    /// Queues a remote playback command; the player picks it up on its next sync.
    pub async fn send_device_action(
        &self,
        device_id: i64,
        action: &DeviceAction,
    ) -> Result<ActionReceipt> {
        let request = self
            .request(Method::POST, &format!("/devices/{device_id}/action"))?
            .json(action);
        self.send(request).await
    }

    pub async fn delete_device(&self, id: i64) -> Result<Acknowledgement> {
        self.send(self.request(Method::DELETE, &format!("/devices/{id}"))?)
            .await
    }
}
