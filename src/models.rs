//! Request and response bodies exchanged with the backend.
//!
//! Every endpoint gets an explicit type so that a response of the wrong
//! shape fails at the boundary with [`Error::Decode`](crate::Error::Decode)
//! instead of leaking half-populated values into the caller.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form JSON object (schedules, system info, action parameters).
pub type JsonObject = Map<String, Value>;

/// Account role. Superadmins manage every site and all user accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Superadmin,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/change-password`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// Body returned by `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Generic `{status}` / `{message}` acknowledgement returned by mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Set by media deletion.
    #[serde(default)]
    pub file: Option<String>,
}

/// A signage player as reported by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    pub id: i64,
    pub site_id: i64,
    pub name: String,
    pub location: String,
    pub enabled: bool,
    pub volume: i32,
    pub screen_on: bool,
    #[serde(default)]
    pub last_seen: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub current_media: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub system_info: Option<JsonObject>,
    #[serde(default)]
    pub schedule: Option<JsonObject>,
    #[serde(default)]
    pub pending_actions: Option<JsonObject>,
}

/// Body of `POST /devices/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDevice {
    pub site_id: i64,
    pub name: String,
    pub location: String,
    pub enabled: bool,
    pub volume: i32,
    pub screen_on: bool,
}

impl NewDevice {
    /// Enabled device with the screen on at half volume.
    pub fn new(site_id: i64, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            site_id,
            name: name.into(),
            location: location.into(),
            enabled: true,
            volume: 50,
            screen_on: true,
        }
    }
}

/// Body of `PUT /devices/{id}`; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<JsonObject>,
}

/// Fleet-wide (or site-wide) counters from `GET /devices/statistics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceStatistics {
    pub total: u32,
    pub online: u32,
    pub offline: u32,
    pub playing: u32,
}

/// Remote command queued for a device (`play`, `stop`, `reboot`, `volume`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceAction {
    pub action: String,
    pub params: Option<JsonObject>,
}

impl DeviceAction {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: JsonObject) -> Self {
        self.params = Some(params);
        self
    }
}

/// Confirmation that an action was queued.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionReceipt {
    pub status: String,
    pub device: String,
    pub action: String,
}

/// One file of a site's media library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaFile {
    pub filename: String,
    pub site_name: String,
}

/// Body of `GET /media/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaList {
    pub files: Vec<MediaFile>,
}

/// A file to push to a site's media library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// MIME type of the file; the transport default is used when absent.
    pub mime_type: Option<String>,
    pub site_name: String,
    /// Overwrite an existing file of the same name instead of failing with 409.
    pub replace: bool,
}

impl MediaUpload {
    pub fn new(
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        site_name: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime_type: None,
            site_name: site_name.into(),
            replace: false,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn replacing(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub status: String,
    pub file_path: String,
}

/// A physical location grouping devices and media.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSite {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// An administrator account; also the body of `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub site_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub site_id: Option<i64>,
}

/// Body of `PUT /users/{id}`; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// `None` leaves the scope alone, `Some(None)` sends `null` and removes it
    /// (promotion to superadmin), `Some(Some(id))` moves the user to a site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
