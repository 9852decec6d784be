//! Base URL configuration.

use std::env;

use url::Url;

use crate::error::{Error, Result};

/// Environment variable selecting the deployment target.
pub const API_URL_VAR: &str = "SIGNAGE_API_URL";

/// Origin a relative base URL (such as `/api`) is resolved against.
pub const ORIGIN_VAR: &str = "SIGNAGE_ORIGIN";

const DEV_API_URL: &str = "http://localhost:3040/api";
const PROD_API_URL: &str = "/api";
const DEFAULT_ORIGIN: &str = "http://localhost";

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
}

impl ApiConfig {
    /// Builds a config from an absolute base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{base_url} cannot be used as a base URL")));
        }

        let path = base_url.path().trim_end_matches('/').to_string();
        base_url.set_path(&path);

        Ok(Self { base_url })
    }

    /// Reads [`API_URL_VAR`] (after loading a `.env` file, if any).
    ///
    /// Debug builds default to the local development backend, release builds
    /// to `/api` on [`ORIGIN_VAR`].
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let configured = env::var(API_URL_VAR).ok().filter(|v| !v.trim().is_empty());
        let origin = env::var(ORIGIN_VAR).ok().filter(|v| !v.trim().is_empty());

        Self::resolve(configured.as_deref(), origin.as_deref())
    }

    fn resolve(configured: Option<&str>, origin: Option<&str>) -> Result<Self> {
        let fallback = if cfg!(debug_assertions) {
            DEV_API_URL
        } else {
            PROD_API_URL
        };
        let base = configured.unwrap_or(fallback).trim();

        if base.starts_with('/') {
            let origin = origin.unwrap_or(DEFAULT_ORIGIN).trim_end_matches('/');
            return Self::new(&format!("{origin}{base}"));
        }

        Self::new(base)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins an endpoint path (`/devices/`, `/auth/login`, ...) onto the base path.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Url::parse(&raw).map_err(|e| Error::Config(format!("invalid endpoint {raw:?}: {e}")))
    }
}
