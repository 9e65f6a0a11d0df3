use crate::{
    artillery::{self, Generatable, Generatables},
    cluster::{ClusterAccessor, KubeAccessor, QueryOptions, do_query_until},
    config::types::Config,
    error::{KubeArtilleryError, Result},
};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Inputs of one `scaffold` invocation, after namespace resolution.
#[derive(Debug, Clone)]
pub struct ScaffoldRequest<'a> {
    pub names: &'a [String],
    pub namespace: &'a str,
    pub working_dir: &'a Path,
    pub out: Option<&'a Path>,
}

pub async fn handle_scaffold(
    names: Vec<String>,
    namespace: Option<String>,
    out: Option<PathBuf>,
    config: &Config,
    working_dir: &Path,
) -> Result<()> {
    validate_scaffold(&names)?;

    let accessor = KubeAccessor::connect(config.cluster.context.as_deref()).await?;
    let namespace = namespace
        .or_else(|| config.cluster.namespace.clone())
        .unwrap_or_else(|| accessor.default_namespace().to_string());

    let request = ScaffoldRequest {
        names: &names,
        namespace: &namespace,
        working_dir,
        out: out.as_deref(),
    };

    let mut stdout = std::io::stdout();
    scaffold(&request, config, &accessor, &mut stdout, super::interrupted()).await
}

/// Resolve the requested Services and write one test script per Service that
/// has liveness endpoints. Misses are reported on `output`, not as errors.
pub async fn scaffold<A, W, S>(
    request: &ScaffoldRequest<'_>,
    config: &Config,
    accessor: &A,
    output: &mut W,
    shutdown: S,
) -> Result<()>
where
    A: ClusterAccessor + ?Sized,
    W: Write,
    S: Future<Output = ()>,
{
    let options = QueryOptions {
        concurrency: config.cluster.concurrency,
    };
    let deadline = Duration::from_secs(config.cluster.timeout_secs);

    let results = do_query_until(
        request.names,
        request.namespace,
        accessor,
        &options,
        deadline,
        shutdown,
    )
    .await?;

    for query in results.query_misses() {
        writeln!(output, "services \"{}\" not found", query.name)?;
    }

    if !results.has_query_hits() {
        return Ok(());
    }

    for selection in results.liveness_misses() {
        writeln!(
            output,
            "services \"{}\" has no liveness probe endpoints, or ports mapping to endpoints",
            selection.name
        )?;
    }

    if !results.has_liveness_hits() {
        return Ok(());
    }

    let target_dir = artillery::mkdir_all_target_or_default(
        request.working_dir,
        request.out,
        &config.scaffold.output_dir,
    )?;

    let scripts: Generatables = results
        .liveness_hits()
        .map(|hit| {
            Generatable::new(
                target_dir.join(artillery::script_file_name(&hit.selection.name)),
                artillery::project(hit.selection, hit.endpoints),
            )
        })
        .collect();

    let msg = scripts.generate()?;
    writeln!(output, "{}", msg)?;

    Ok(())
}

fn validate_scaffold(names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(KubeArtilleryError::Validation(
            "missing service name or names".to_string(),
        ));
    }

    for name in names {
        let violations = artillery::dns_subdomain_violations(name);
        if !violations.is_empty() {
            return Err(KubeArtilleryError::Validation(format!(
                "service name {} must be a valid DNS subdomain name, \n- {}",
                name,
                violations.join("\n- ")
            )));
        }
    }

    Ok(())
}
