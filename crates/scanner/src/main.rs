//! Deadline scanner entry point.
//!
//! One-shot by default, for invocation from cron or a systemd timer:
//!
//! ```text
//! shopfloor-scanner          # scan once and exit
//! shopfloor-scanner --watch  # keep scanning on SCAN_INTERVAL_SECS
//! ```

use std::sync::Arc;

use shopfloor_notify::delivery::email::{build_transport, EmailConfig, EmailSink};
use shopfloor_notify::delivery::in_app::InAppSink;
use shopfloor_notify::store::PgStore;
use shopfloor_notify::{
    DeadlineScanner, DispatchConfig, Dispatcher, ScannerConfig, TemplateRegistry,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfloor_scanner=info,shopfloor_notify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = shopfloor_db::create_pool(&database_url).await?;
    shopfloor_db::health_check(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let email_config = EmailConfig::from_env()?;
    let transport = build_transport(&email_config)?;

    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        store.clone(),
        TemplateRegistry::new(),
        InAppSink::new(store.clone()),
        EmailSink::new(transport),
        DispatchConfig::from_env(),
    ));
    let scanner = DeadlineScanner::new(store, dispatcher, ScannerConfig::from_env());

    if std::env::args().any(|arg| arg == "--watch") {
        let cancel = CancellationToken::new();
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received ctrl-c, shutting down");
                signal_cancel.cancel();
            }
        });
        scanner.run(cancel).await;
    } else {
        let summary = scanner.scan_once().await?;
        tracing::info!(
            flagged = summary.projects_flagged,
            dispatched = summary.events_dispatched,
            "Scan finished"
        );
    }

    Ok(())
}
