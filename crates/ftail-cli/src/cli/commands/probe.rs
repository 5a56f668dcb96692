//! `ftail probe <url>` – one metadata request, printed.

use anyhow::{Context, Result};
use ftail_core::config::FtailConfig;
use ftail_core::{Tailer, TargetSpec, Transport};
use std::sync::Arc;

pub async fn run_probe(cfg: &FtailConfig, url: &str) -> Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(cfg.transport());
    // Same validation as follow, so `probe` answers "would this URL be accepted".
    let tailer = Tailer::new(&TargetSpec::new(url), Arc::clone(&transport))?;
    let uri = tailer.uri().clone();

    let response = tokio::task::spawn_blocking({
        let uri = uri.clone();
        move || transport.probe(&uri)
    })
    .await
    .context("probe task join")?
    .with_context(|| format!("probing {}", uri))?;

    println!("{:<14} {}", "url:", uri);
    println!("{:<14} {}", "status:", response.status);
    println!("{:<14} {} bytes", "size:", response.content_length);
    println!(
        "{:<14} {}",
        "accept-ranges:",
        if response.accept_ranges { "bytes" } else { "none" }
    );
    if let Some(etag) = &response.etag {
        println!("{:<14} {}", "etag:", etag);
    }
    if let Some(lm) = &response.last_modified {
        println!("{:<14} {}", "last-modified:", lm);
    }
    Ok(())
}
