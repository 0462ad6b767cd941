//! Generate a dashboard, print it as it streams, then file it in history.
//!
//! Point DASHGEN_BASE_URL at a running backend and run:
//!   RUST_LOG=dashgen_stream=debug cargo run --example generate -p dashgen-stream
//!
//! Press Ctrl-C to cancel mid-stream.

use std::io::Write;

use dashgen_state_memory::MemoryHistoryStore;
use dashgen_stream::{ClientConfig, DashboardClient, PreviewBuffer, SessionOutcome};
use dashgen_types::{
    GenerationOptions, GenerationRequest, HistoryEntry, HistoryQuery, HistoryStore,
    StreamObserver, ThemeConfig,
};
use tracing_subscriber::EnvFilter;

/// Echoes deltas to stdout while keeping the preview up to date.
struct Echo(PreviewBuffer);

impl StreamObserver for Echo {
    fn on_chunk(&mut self, delta: &str) {
        self.0.on_chunk(delta);
        print!("{delta}");
        let _ = std::io::stdout().flush();
    }

    fn on_complete(&mut self, output: &str) {
        self.0.on_complete(output);
        println!();
    }

    fn on_error(&mut self, error: &dashgen_types::StreamError) {
        self.0.on_error(error);
        eprintln!("\nstream error: {error}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let client = DashboardClient::http(ClientConfig::from_env()?)?;
    let history = MemoryHistoryStore::new();

    let request = GenerationRequest::new(
        "warehouse",
        "grid",
        ThemeConfig::named("Ocean"),
        vec!["kpi-cards".into(), "inventory-table".into(), "line-chart".into()],
    )
    .purpose_detail("cold-chain storage")
    .focus_metrics("temperature, stock turnover")
    .options(GenerationOptions::default());

    let preview = PreviewBuffer::new(request.components.len());
    let handle = client.generate_dashboard_stream(request.clone(), Echo(preview.clone()));

    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let outcome = handle.join().await?;

    match outcome {
        SessionOutcome::Completed { output } => {
            let mut entry = HistoryEntry::new(request, output);
            if let Some(summary) = preview.summary() {
                eprintln!(
                    "{} lines, {} KiB, {} components",
                    summary.lines_of_code, summary.size_kib, summary.components
                );
                entry = entry.with_summary(summary);
            }
            history.put(entry).await?;
            let page = history.list(HistoryQuery::default()).await?;
            eprintln!("history holds {} dashboard(s)", page.total);
        }
        SessionOutcome::Cancelled => eprintln!("cancelled"),
        SessionOutcome::Failed(err) if err.is_retryable() => eprintln!("failed, worth retrying: {err}"),
        SessionOutcome::Failed(err) => eprintln!("failed: {err}"),
    }

    Ok(())
}
