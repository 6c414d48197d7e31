//! Versioned HelloWorld API
//!
//! Run with: cargo run -p api-doc-demo
//! Then visit: http://127.0.0.1:8080/help

use api_doc_demo::config::DemoConfig;
use api_doc_demo::startup;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = DemoConfig::load()?;
    startup::init_tracing(&config.log);

    let addr = config.address();
    info!(docs = %format!("http://{}/help", addr), "Starting api-doc-demo");

    startup::build_app(&config)
        .run_with_shutdown(&addr, shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
