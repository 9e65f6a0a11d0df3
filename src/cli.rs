use crate::config::types::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kubectl-artillery")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bootstrap artillery.io testing on Kubernetes")]
#[command(long_about = "A kubectl plugin that scaffolds Artillery test scripts from the HTTP liveness probes of your Kubernetes Services, and packages test scripts as Kubernetes Jobs.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true, value_name = "NAME", env = "KUBECTL_ARTILLERY_CONTEXT")]
    pub context: Option<String>,

    /// Overall timeout for cluster reads, in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffolds test scripts from K8s services using liveness probe HTTP endpoints
    #[command(after_help = "Examples:\n  kubectl artillery scaffold <k8s-service-name>\n  kubectl artillery scaffold <k8s-service1> <k8s-service2>\n  kubectl artillery scaffold <k8s-service-name> [--namespace ] [--out ]")]
    Scaffold {
        /// Names of the Services to scaffold test scripts for
        #[arg(value_name = "SERVICE")]
        names: Vec<String>,

        /// Namespace of the services
        #[arg(short, long)]
        namespace: Option<String>,

        /// Output path to write the test script files
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Generates a k8s Job packaged with Kustomize to execute a test
    #[command(visible_alias = "gen")]
    #[command(after_help = "Examples:\n  kubectl artillery generate <job-name> --script path/to/test-script\n  kubectl artillery generate <job-name> -s path/to/test-script [--namespace ] [--out ] [--count ]")]
    Generate {
        /// Name of the test Job
        #[arg(value_name = "TEST_NAME")]
        names: Vec<String>,

        /// Path to the Artillery test script file
        #[arg(short, long, value_name = "FILE")]
        script: PathBuf,

        /// Namespace to apply the Job and related manifests to
        #[arg(short, long)]
        namespace: Option<String>,

        /// Output path to write the Job and related manifests
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// How many test workers the Job should run
        #[arg(short, long, default_value_t = 1)]
        count: i32,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }

    /// Let command line flags take precedence over file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(context) = &self.context {
            config.cluster.context = Some(context.clone());
        }
        if let Some(timeout) = self.timeout {
            config.cluster.timeout_secs = timeout;
        }
    }
}
