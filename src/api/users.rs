use reqwest::Method;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Acknowledgement, NewUser, User, UserUpdate};

// Account management is reserved to superadmins; admins get a 403.
impl ApiClient {
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.send(self.request(Method::GET, "/users/")?).await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.send(self.request(Method::GET, &format!("/users/{id}"))?)
            .await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        let request = self.request(Method::POST, "/users/")?.json(user);
        self.send(request).await
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User> {
        let request = self
            .request(Method::PUT, &format!("/users/{id}"))?
            .json(update);
        self.send(request).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<Acknowledgement> {
        self.send(self.request(Method::DELETE, &format!("/users/{id}"))?)
            .await
    }
}
