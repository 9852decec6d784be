//! Headless console session against a signage backend.
//!
//! Restores (or opens) an administrator session, prints the fleet status and
//! optionally sends a playback command to one device.
//!
//! # Running the demo
//!
//! ```bash
//! export SIGNAGE_API_URL=http://localhost:3040/api
//! export SIGNAGE_EMAIL=admin@example.com
//! export SIGNAGE_PASSWORD=secret
//! # optional: where the session is persisted between runs
//! export DATABASE_URL=sqlite://signage-console.db?mode=rwc
//!
//! cargo run --example console --features sqlite
//! cargo run --example console --features sqlite -- 3 reboot
//! ```

use std::{env, sync::Arc, time::Duration};

use dotenvy::dotenv;
use sea_orm::{ConnectOptions, Database};
use signage_console_client::migration::{Migrator, MigratorTrait};
use signage_console_client::{
    ApiClient, ApiConfig, AuthState, DeviceAction, SeaOrmStorage, SessionManager,
};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    dotenv().ok();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://signage-console.db?mode=rwc".into());

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;

    let config = ApiConfig::from_env()?;
    info!(base_url = %config.base_url(), "using backend");

    let client = ApiClient::new(config, Arc::new(SeaOrmStorage::new(db)))?;
    let sessions = SessionManager::new(client.clone());

    if sessions.initialize().await == AuthState::Unauthenticated {
        let email = env::var("SIGNAGE_EMAIL")?;
        let password = env::var("SIGNAGE_PASSWORD")?;
        sessions.login(&email, &password).await?;
    }

    let Some(session) = sessions.current().await else {
        warn!("no session, giving up");
        return Ok(());
    };
    info!(email = %session.email, role = ?session.role, expires_at = %session.expires_at, "signed in");

    let (devices, stats) = tokio::join!(client.list_devices(), client.device_statistics());
    let stats = stats?;
    println!(
        "{} devices: {} online, {} offline, {} playing",
        stats.total, stats.online, stats.offline, stats.playing
    );
    for device in devices? {
        println!(
            "#{:<4} {:<20} {:<20} {}",
            device.id,
            device.name,
            device.location,
            if device.is_online { "online" } else { "offline" }
        );
    }

    let mut args = env::args().skip(1);
    if let (Some(id), Some(action)) = (args.next(), args.next()) {
        let receipt = client
            .send_device_action(id.parse()?, &DeviceAction::new(action))
            .await?;
        println!("{} -> {}: {}", receipt.device, receipt.action, receipt.status);
    }

    Ok(())
}
