//! Artillery documents: test scripts, test Jobs and their Kustomize packaging.

pub mod generatable;
pub mod job;
pub mod kustomization;
pub mod script;
pub mod validation;

pub use generatable::{Generatable, Generatables, copy_file_to, mkdir_all_target_or_default};
pub use job::{TestJobSpec, new_test_job};
pub use kustomization::Kustomization;
pub use script::{TestScript, project};
pub use validation::dns_subdomain_violations;

/// Default directory for scaffolded test scripts.
pub const DEFAULT_SCRIPTS_DIR: &str = "artillery-scripts";

/// Default directory for generated Job manifests.
pub const DEFAULT_MANIFEST_DIR: &str = "artillery-manifests";

/// Image the test workers run.
pub const WORKER_IMAGE: &str = "artilleryio/artillery:latest";

/// File name of the generated test Job manifest.
pub const TEST_FILENAME: &str = "test-job.yaml";

pub const KUSTOMIZATION_FILENAME: &str = "kustomization.yaml";

/// Value of the `artillery.io/part-of` label.
pub const LABEL_PREFIX: &str = "kubectl-artillery";

pub(crate) const TEST_SCRIPT_VOLUME: &str = "test-script";

/// File name of the scaffolded script for a Service.
pub fn script_file_name(service_name: &str) -> String {
    format!("test-script_{}.yaml", service_name)
}
