use crate::{
    artillery::{self, Generatable, Generatables, Kustomization, TestJobSpec},
    config::types::Config,
    error::{KubeArtilleryError, Result},
};
use std::io::Write;
use std::path::{Path, PathBuf};

const FALLBACK_NAMESPACE: &str = "default";

/// Inputs of one `generate` invocation, after validation.
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub test_name: &'a str,
    pub script: &'a Path,
    pub namespace: &'a str,
    pub count: i32,
    pub working_dir: &'a Path,
    pub out: Option<&'a Path>,
}

pub fn handle_generate(
    names: Vec<String>,
    script: PathBuf,
    namespace: Option<String>,
    out: Option<PathBuf>,
    count: i32,
    config: &Config,
    working_dir: &Path,
) -> Result<()> {
    let test_name = validate_test(&names)?;
    let script = working_dir.join(script);
    validate_test_script_exists(&script)?;

    let namespace = namespace
        .or_else(|| config.cluster.namespace.clone())
        .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string());

    let request = GenerateRequest {
        test_name,
        script: &script,
        namespace: &namespace,
        count,
        working_dir,
        out: out.as_deref(),
    };

    generate(&request, config, &mut std::io::stdout())
}

/// Copy the script next to a test Job and its Kustomization.
pub fn generate<W: Write>(
    request: &GenerateRequest<'_>,
    config: &Config,
    output: &mut W,
) -> Result<()> {
    let target_dir = artillery::mkdir_all_target_or_default(
        request.working_dir,
        request.out,
        &config.generate.output_dir,
    )?;

    let copied = artillery::copy_file_to(&target_dir, request.script)?;
    let script_file_name = copied
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let config_map_name = format!("{}-test-script", request.test_name);

    let job = artillery::new_test_job(&TestJobSpec {
        test_name: request.test_name,
        namespace: request.namespace,
        config_map_name: &config_map_name,
        script_file_name: &script_file_name,
        count: request.count,
        worker_image: &config.generate.worker_image,
    });
    let kustomization = Kustomization::new(
        artillery::TEST_FILENAME,
        request.namespace,
        &config_map_name,
        &script_file_name,
        artillery::LABEL_PREFIX,
    );

    let msg = Generatables::from_iter([
        Generatable::new(target_dir.join(artillery::TEST_FILENAME), job),
        Generatable::new(
            target_dir.join(artillery::KUSTOMIZATION_FILENAME),
            kustomization,
        ),
    ])
    .generate()?;

    writeln!(output, "{}", msg)?;
    Ok(())
}

fn validate_test(names: &[String]) -> Result<&str> {
    let test_name = match names {
        [] => {
            return Err(KubeArtilleryError::Validation(
                "missing test name".to_string(),
            ));
        }
        [name] => name.as_str(),
        _ => {
            return Err(KubeArtilleryError::Validation(
                "unknown arguments detected".to_string(),
            ));
        }
    };

    let violations = artillery::dns_subdomain_violations(test_name);
    if !violations.is_empty() {
        return Err(KubeArtilleryError::Validation(format!(
            "test name {} must be a valid DNS subdomain name, \n- {}",
            test_name,
            violations.join("\n- ")
        )));
    }

    Ok(test_name)
}

fn validate_test_script_exists(script: &Path) -> Result<()> {
    if !script.is_file() {
        return Err(KubeArtilleryError::Validation(format!(
            "cannot find script file {}",
            script.display()
        )));
    }
    Ok(())
}
