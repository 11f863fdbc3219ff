//! Chat Widget terminal host
//!
//! Entry point: reads lines from stdin, renders the chat log to stdout.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::{info, warn};

use chat_widget::config::AppConfig;
use chat_widget::host::{self, TerminalView};
use chat_widget::telemetry;
use chat_widget::transport::HttpTransport;
use chat_widget::widget::ChatWidget;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init(config.logging.format);

    let transport = HttpTransport::from_config(&config)?;
    info!(
        name: "chat.config.loaded",
        endpoint = %transport.chat_url(),
        policy = ?config.widget.send_policy,
        "Configuration loaded"
    );

    if config.csrf.bootstrap && transport.csrf_token().is_none() {
        match transport.bootstrap().await {
            Ok(true) => {}
            Ok(false) => warn!(
                name: "chat.csrf.bootstrap",
                cookie = %config.csrf.cookie_name,
                "Server did not issue a CSRF cookie"
            ),
            Err(err) => warn!(
                name: "chat.csrf.bootstrap",
                error = %err,
                "Could not fetch page for CSRF cookie"
            ),
        }
    }

    let view = TerminalView::new(std::io::stdout());
    let mut widget = ChatWidget::new(view, config.widget.send_policy);

    host::run(&mut widget, Arc::new(transport), BufReader::new(tokio::io::stdin()))
        .await
        .context("Failed to read input")?;

    Ok(())
}
