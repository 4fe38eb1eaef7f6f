//! Bulk export example
//!
//! This example demonstrates the core functionality of cert-desk:
//! - Logging in to the certificate backend
//! - Listing and filtering certificates
//! - Subscribing to export events
//! - Bulk-exporting the selected PDFs with retry and throttling
//! - Re-running only the failed subset

use cert_desk::listing::{ListQuery, SortOrder};
use cert_desk::{ApiClient, BulkExporter, Config, Event};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Build configuration (defaults point at http://localhost:5000/api)
    let config = Config::default();

    // Log in; the session token is kept inside the client
    let client = ApiClient::new(&config.api)?;
    let user = client.login("admin", "your_password").await?;
    println!("Logged in as {} ({:?})", user.username, user.role);

    // Narrow the list the same way the dashboard would
    let certificates = client.list_certificates().await?;
    let query = ListQuery {
        group_code: Some("B1".to_string()),
        sort: SortOrder::Ascending,
        ..ListQuery::default()
    };
    let selected: Vec<_> = query
        .apply(&certificates)
        .into_iter()
        .map(|cert| cert.id.clone())
        .collect();
    println!("Selected {} certificates", selected.len());

    // Wire the exporter to the client and the configured output directory
    let exporter = BulkExporter::for_client(client, config.export)?;

    // Subscribe to events
    let mut events = exporter.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::ItemStarted {
                    id,
                    position,
                    total,
                } => {
                    println!("⬇ Exporting {} ({}/{})", id, position, total);
                }
                Event::ItemRetrying {
                    id,
                    attempt,
                    delay_ms,
                } => {
                    println!("↻ Retrying {} (attempt {}, waiting {delay_ms} ms)", id, attempt);
                }
                Event::Progress { percent, .. } => {
                    println!("  {percent}% complete");
                }
                Event::ItemFailed { id, error, .. } => {
                    println!("✗ Failed {}: {}", id, error);
                }
                _ => {}
            }
        }
    });

    // Run the export; items are processed one at a time on purpose
    let summary = exporter.run(&selected).await?;
    println!(
        "Done: {} exported, {} failed, {} retries taken",
        summary.succeeded, summary.failed, summary.retried
    );

    // Anything that failed permanently can be re-run as-is
    if !summary.failed_ids.is_empty() {
        println!("Retrying {} failed certificates...", summary.failed_ids.len());
        let retry_summary = exporter.run(&summary.failed_ids).await?;
        println!(
            "Retry pass: {} exported, {} still failing",
            retry_summary.succeeded, retry_summary.failed
        );
    }

    Ok(())
}
