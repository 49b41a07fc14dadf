pub mod api;
pub mod classifier;
pub mod commands;
pub mod dialect;
pub mod masking;
pub mod rules;
pub mod services;
pub mod synthesizer;

use std::sync::Arc;
use common::config::Settings;
use common::Result;
use services::RemediationService;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use classifier::{Classification, PiiType, RemediationCategory, classify};
pub use dialect::Dialect;
pub use synthesizer::{
    FixScript, FixScriptSynthesizer, ScriptKind, synthesize_batch_script, synthesize_fix_script,
};

/// Runs the remediation HTTP API until the listener fails.
pub async fn serve(settings: Settings) -> Result<()> {
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let service = Arc::new(RemediationService::from_settings(settings)?);

    if service.has_catalog() {
        match service.reload_rules().await {
            Ok(count) => info!(rules = count, "Loaded PII rules from catalog"),
            Err(e) => warn!(error = %e, "Starting without PII rules"),
        }
    }
    let _refresher = service.spawn_rule_refresher();

    let api_router = api::routes(Arc::clone(&service));

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Remediation API server listening");
    axum::serve(listener, api_router).await?;

    Ok(())
}
