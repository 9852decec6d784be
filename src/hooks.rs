//! Callbacks into the host application.
//!
//! The console runs inside some UI shell that owns navigation and toasts.
//! These traits are the only way the core talks back to it.

use std::fmt::Debug;

/// Path of the login entry point the host navigates to on invalidation.
pub const LOGIN_PATH: &str = "/login";

/// Forced navigation to the login screen after the backend answered 401.
pub trait LoginRedirect: Debug + Send + Sync {
    fn redirect_to_login(&self, path: &str);
}

/// User-visible notifications (toasts).
pub trait Notifier: Debug + Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Logs the redirect instead of navigating; suitable for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRedirect;

impl LoginRedirect for TracingRedirect {
    fn redirect_to_login(&self, path: &str) {
        tracing::warn!(path, "session invalidated, login required");
    }
}

/// Logs notifications at info/warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!("{message}");
    }
}
