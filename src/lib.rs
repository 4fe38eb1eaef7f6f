//! # cert-desk
//!
//! Headless administrative client library for language-course certificate
//! services.
//!
//! ## Design Philosophy
//!
//! cert-desk is designed to be:
//! - **Backend-faithful** - Speaks the certificate service's REST API as-is
//! - **Sensible defaults** - Works out of the box against a local backend
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to export events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use cert_desk::{ApiClient, BulkExporter, Config};
//! use cert_desk::types::CertificateId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     let client = ApiClient::new(&config.api)?;
//!     client.login("admin", "secret").await?;
//!
//!     let exporter = BulkExporter::for_client(client, config.export)?;
//!
//!     // Subscribe to progress events
//!     let mut events = exporter.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let selected = vec![CertificateId::new("64a1f2c9e4b0")];
//!     let summary = exporter.run(&selected).await?;
//!     println!("{} exported, {} failed", summary.succeeded, summary.failed);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Certificate service API client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Bulk PDF export coordination
pub mod export;
/// Roster spreadsheet import
pub mod import;
/// In-memory list filtering, sorting and pagination
pub mod listing;
/// Retry classification and backoff schedule
pub mod retry;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use client::{ApiClient, DeleteOutcome, UserUpdate};
pub use config::{ApiConfig, Config, ExportConfig, ImportConfig};
pub use error::{Error, Result};
pub use export::{ArtifactFetcher, ArtifactSink, BulkExporter, DirectorySink, artifact_filename};
pub use import::{RosterDate, RosterImporter, RosterRow};
pub use listing::{ListQuery, SortOrder, page_slice};
pub use types::{
    Certificate, CertificateDraft, CertificateId, Event, Group, GroupDraft, ImportReport,
    ItemOutcome, Level, Role, RowOutcome, RunSummary, TimeSlot, User,
};
