//! # kubectl-artillery
//!
//! A kubectl plugin that bootstraps [Artillery](https://artillery.io) load
//! testing on Kubernetes.
//!
//! ## Features
//!
//! - **Scaffold**: resolves Service names into the HTTP liveness probe
//!   endpoints of the Pods they select, and writes one test script per Service
//! - **Generate**: packages an existing test script as a Kubernetes Job with a
//!   Kustomize ConfigMap generator
//!
//! ## Example
//!
//! ```rust,no_run
//! use kubectl_artillery::cluster::{KubeAccessor, QueryOptions, do_query};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let accessor = KubeAccessor::connect(None).await?;
//! let names = vec!["checkout".to_string()];
//! let results = do_query(&names, "shop", &accessor, &QueryOptions::default()).await?;
//!
//! for hit in results.liveness_hits() {
//!     let script = kubectl_artillery::artillery::project(hit.selection, hit.endpoints);
//!     println!("{}", serde_yaml::to_string(&script)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod artillery;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod handlers;

pub use error::{KubeArtilleryError, Result};
pub use handlers::*;
use cli::Commands;
use config::types::Config;
use std::path::Path;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run_command(command: Commands, config: &Config, working_dir: &Path) -> Result<()> {
    match command {
        Commands::Scaffold {
            names,
            namespace,
            out,
        } => handlers::handle_scaffold(names, namespace, out, config, working_dir).await,
        Commands::Generate {
            names,
            script,
            namespace,
            out,
            count,
        } => handlers::handle_generate(names, script, namespace, out, count, config, working_dir),
    }
}
