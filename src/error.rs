use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KubeArtilleryError {
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failures talking to the Kubernetes API. Always fatal to the invocation.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Kubernetes API request failed: {0}")]
    Api(#[from] kube::Error),

    #[error("Failed to infer Kubernetes config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("Failed to read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("Request failed: {0}")]
    Request(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParsingFailed { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, KubeArtilleryError>;
