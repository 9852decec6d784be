use reqwest::Method;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Acknowledgement, NewSite, Site, SiteUpdate};

impl ApiClient {
    pub async fn list_sites(&self) -> Result<Vec<Site>> {
        self.send(self.request(Method::GET, "/sites/")?).await
    }

    pub async fn get_site(&self, id: i64) -> Result<Site> {
        self.send(self.request(Method::GET, &format!("/sites/{id}"))?)
            .await
    }

    pub async fn create_site(&self, site: &NewSite) -> Result<Site> {
        let request = self.request(Method::POST, "/sites/")?.json(site);
        self.send(request).await
    }

    pub async fn update_site(&self, id: i64, update: &SiteUpdate) -> Result<Site> {
        let request = self
            .request(Method::PUT, &format!("/sites/{id}"))?
            .json(update);
        self.send(request).await
    }

    pub async fn delete_site(&self, id: i64) -> Result<Acknowledgement> {
        self.send(self.request(Method::DELETE, &format!("/sites/{id}"))?)
            .await
    }
}
