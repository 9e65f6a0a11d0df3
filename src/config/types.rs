use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cluster: ClusterConfig,
    pub scaffold: ScaffoldConfig,
    pub generate: GenerateConfig,
}

/// Cluster access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Kubeconfig context to use instead of the current one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Namespace used when `--namespace` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Overall deadline for one invocation's cluster reads
    pub timeout_secs: u64,
    /// Maximum number of services looked up at once
    pub concurrency: usize,
}

/// Test script scaffolding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    pub output_dir: String,
}

/// Job manifest generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub output_dir: String,
    pub worker_image: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            context: None,
            namespace: None,
            timeout_secs: 30,
            concurrency: 4,
        }
    }
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            output_dir: crate::artillery::DEFAULT_SCRIPTS_DIR.to_string(),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_dir: crate::artillery::DEFAULT_MANIFEST_DIR.to_string(),
            worker_image: crate::artillery::WORKER_IMAGE.to_string(),
        }
    }
}
