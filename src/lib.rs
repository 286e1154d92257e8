//! # flood-warnings
//!
//! Retrieval library for the flood warnings the Australian Bureau of
//! Meteorology publishes on its public FTP repository.
//!
//! ## Design
//!
//! - **Cache-first** - Region lists and warning details are served from an
//!   in-memory TTL cache; the repository is only contacted on a miss
//! - **Degrades quietly** - An unreachable repository or a missing document
//!   yields an empty list or "not found", never a crash
//! - **Library-first** - An optional axum REST front end is included
//!
//! ## Quick Start
//!
//! ```no_run
//! use flood_warnings::{Config, FloodWarnings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = FloodWarnings::new(Config::default());
//!
//!     for id in app.list_warnings("VIC").await.iter() {
//!         if let Some(detail) = app.get_warning_detail(id.as_str()).await? {
//!             println!("{id}: {} until {}", detail.info.service, detail.info.expiry_time);
//!         }
//!     }
//!
//!     app.shutdown().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Process-wide wiring
pub mod app;
/// Result cache with TTL expiry
pub mod cache;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Remote repository gateway
pub mod gateway;
/// Background cache hydration
pub mod hydrate;
/// Structured warning document parser
pub mod parser;
/// Region to remote prefix lookup
pub mod region;
/// Retry logic with exponential backoff
pub mod retry;
/// Warning orchestrator
pub mod service;
/// Local artifact reader
pub mod staging;
/// Core types
pub mod types;

// Re-export commonly used types
pub use app::FloodWarnings;
pub use cache::ResultCache;
pub use config::{CacheConfig, Config, RepositoryConfig, RetryConfig};
pub use error::{
    ApiError, Error, ErrorDetail, ParseError, Result, StagingError, ToHttpStatus, TransportError,
};
pub use gateway::{Connector, FtpConnector, RemoteGateway, RemoteSession};
pub use hydrate::HydrationSummary;
pub use parser::FloodWarningParser;
pub use service::WarningService;
pub use types::{RemoteEntry, WarningDetail, WarningId, WarningInfo};

/// Serve the REST API until a termination signal arrives, then shut down.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use flood_warnings::{Config, FloodWarnings, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let app = FloodWarnings::new(Config::default());
///
///     run_with_shutdown(app).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(app: FloodWarnings) -> Result<()> {
    let token = app.cancellation_token();
    tokio::spawn(async move {
        let signal = termination_signal().await;
        tracing::info!(signal, "Stopping flood warning service");
        token.cancel();
    });

    let result = app.serve().await;
    app.shutdown().await;
    result
}

/// Resolve once the process is asked to terminate, naming the signal
#[cfg(unix)]
async fn termination_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let terminate = signal(SignalKind::terminate())
        .inspect_err(|e| tracing::warn!(error = %e, "SIGTERM unavailable for the warning service"));
    let interrupt = signal(SignalKind::interrupt())
        .inspect_err(|e| tracing::warn!(error = %e, "SIGINT unavailable for the warning service"));

    match (terminate, interrupt) {
        (Ok(mut terminate), Ok(mut interrupt)) => tokio::select! {
            _ = terminate.recv() => "SIGTERM",
            _ = interrupt.recv() => "SIGINT",
        },
        (Ok(mut terminate), Err(_)) => {
            terminate.recv().await;
            "SIGTERM"
        }
        (Err(_), Ok(mut interrupt)) => {
            interrupt.recv().await;
            "SIGINT"
        }
        (Err(_), Err(_)) => ctrl_c().await,
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // An unusable ctrl-c handler means no signal can ever arrive
        tracing::error!(error = %e, "No termination signal source, stopping warning service");
    }
    "ctrl-c"
}
