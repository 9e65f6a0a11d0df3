use serde::Serialize;
use std::collections::BTreeMap;

/// Kustomize entry point that packages a test Job with its script ConfigMap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kustomization {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub resources: Vec<String>,
    pub config_map_generator: Vec<ConfigMapGenerator>,
    pub generator_options: GeneratorOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigMapGenerator {
    pub name: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// Keeps the generated ConfigMap name stable so the Job can mount it
    pub disable_name_suffix_hash: bool,
    pub labels: BTreeMap<String, String>,
}

impl Kustomization {
    pub fn new(
        job_file_name: &str,
        namespace: &str,
        config_map_name: &str,
        script_file_name: &str,
        part_of: &str,
    ) -> Self {
        Self {
            api_version: "kustomize.config.k8s.io/v1beta1".to_string(),
            kind: "Kustomization".to_string(),
            namespace: namespace.to_string(),
            resources: vec![job_file_name.to_string()],
            config_map_generator: vec![ConfigMapGenerator {
                name: config_map_name.to_string(),
                files: vec![script_file_name.to_string()],
            }],
            generator_options: GeneratorOptions {
                disable_name_suffix_hash: true,
                labels: BTreeMap::from([(
                    "artillery.io/part-of".to_string(),
                    part_of.to_string(),
                )]),
            },
        }
    }
}
