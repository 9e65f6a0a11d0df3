//! Kubernetes Job that runs an Artillery test script from a ConfigMap.

use super::{LABEL_PREFIX, TEST_SCRIPT_VOLUME};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, EnvVar, EnvVarSource, ObjectFieldSelector, PodSpec,
    PodTemplateSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

const SCRIPT_MOUNT_PATH: &str = "/data";

/// Everything needed to describe one test run.
#[derive(Debug, Clone)]
pub struct TestJobSpec<'a> {
    pub test_name: &'a str,
    pub namespace: &'a str,
    pub config_map_name: &'a str,
    /// File name of the script inside the ConfigMap
    pub script_file_name: &'a str,
    /// Number of workers; values below 1 run a single worker
    pub count: i32,
    pub worker_image: &'a str,
}

/// Build the `batch/v1` Job for a test.
pub fn new_test_job(spec: &TestJobSpec<'_>) -> Job {
    let workers = spec.count.max(1);

    Job {
        metadata: ObjectMeta {
            name: Some(spec.test_name.to_string()),
            namespace: Some(spec.namespace.to_string()),
            labels: Some(labels(spec.test_name, "test-worker-master")),
            ..Default::default()
        },
        spec: Some(JobSpec {
            parallelism: Some(workers),
            completions: Some(workers),
            backoff_limit: Some(0),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels(spec.test_name, "test-worker")),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![worker_container(spec)],
                    volumes: Some(vec![Volume {
                        name: TEST_SCRIPT_VOLUME.to_string(),
                        config_map: Some(ConfigMapVolumeSource {
                            name: spec.config_map_name.to_string().into(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    restart_policy: Some("Never".to_string()),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn worker_container(spec: &TestJobSpec<'_>) -> Container {
    Container {
        name: spec.test_name.to_string(),
        image: Some(spec.worker_image.to_string()),
        image_pull_policy: Some("Always".to_string()),
        args: Some(vec![
            "run".to_string(),
            format!("{}/{}", SCRIPT_MOUNT_PATH, spec.script_file_name),
        ]),
        // WORKER_ID ties each worker pod to its published metrics
        env: Some(vec![EnvVar {
            name: "WORKER_ID".to_string(),
            value_from: Some(EnvVarSource {
                field_ref: Some(ObjectFieldSelector {
                    field_path: "metadata.name".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: TEST_SCRIPT_VOLUME.to_string(),
            mount_path: SCRIPT_MOUNT_PATH.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// Labels used to scope and select test jobs.
fn labels(test_name: &str, component: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("artillery.io/test-name".to_string(), test_name.to_string()),
        ("artillery.io/component".to_string(), component.to_string()),
        ("artillery.io/part-of".to_string(), LABEL_PREFIX.to_string()),
    ])
}
