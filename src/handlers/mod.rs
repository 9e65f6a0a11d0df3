// Handler modules
pub mod generate;
pub mod scaffold;

// Re-export all handler functions
pub use generate::{GenerateRequest, generate, handle_generate};
pub use scaffold::{ScaffoldRequest, handle_scaffold, scaffold};

/// Resolves when the user interrupts the process.
pub(crate) async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Unable to listen for interrupts: {}", e);
        std::future::pending::<()>().await;
    }
}
