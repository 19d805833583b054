use anyhow::Result;
use std::sync::Arc;

use hireflow_core::api::{BackendConfig, SessionApiClient};
use hireflow_core::session::{console, SessionManager};
use hireflow_core::speech::UnsupportedSpeech;
use hireflow_core::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_tracing();

    let backend = Arc::new(SessionApiClient::new(BackendConfig::from_env())?);
    let manager = SessionManager::new(backend, Arc::new(UnsupportedSpeech));
    console::run(manager).await
}
