//! Resolve container HTTP liveness probes into concrete endpoints.

use super::accessor::{ContainerView, HttpGetProbe, PodSpecView, PortReference, ServiceSelection};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    fn from_probe(scheme: Option<&str>) -> Self {
        match scheme {
            Some(s) if s.eq_ignore_ascii_case("https") => Scheme::Https,
            _ => Scheme::Http,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
        }
    }
}

/// A reachable HTTP liveness check. `port` is always a resolved number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeEndpoint {
    pub scheme: Scheme,
    pub port: i32,
    pub path: String,
    /// Container the probe was declared on
    pub container: String,
}

/// Extract every resolvable HTTP liveness endpoint from a pod, in container order.
///
/// Probes whose named port is not declared on their own container are skipped.
/// The Service's ports are not consulted: a probe counts even when its port is
/// not exposed through the Service.
pub fn resolve(pod: &PodSpecView, service: &ServiceSelection) -> Vec<ProbeEndpoint> {
    pod.containers
        .iter()
        .filter_map(|container| {
            let probe = container.liveness_probe.as_ref()?;
            let endpoint = resolve_probe(container, probe);
            if endpoint.is_none() {
                log::debug!(
                    "Skipping liveness probe of {}/{} container {} for service {}: port {:?} is not declared",
                    service.namespace,
                    pod.name,
                    container.name,
                    service.name,
                    probe.port
                );
            }
            endpoint
        })
        .collect()
}

fn resolve_probe(container: &ContainerView, probe: &HttpGetProbe) -> Option<ProbeEndpoint> {
    let port = match &probe.port {
        PortReference::Number(port) => *port,
        PortReference::Name(name) => *container.ports.get(name)?,
    };

    Some(ProbeEndpoint {
        scheme: Scheme::from_probe(probe.scheme.as_deref()),
        port,
        path: normalize_path(probe.path.as_deref()),
        container: container.name.clone(),
    })
}

fn normalize_path(path: Option<&str>) -> String {
    match path.map(str::trim) {
        None | Some("") => "/".to_string(),
        Some(p) if p.starts_with('/') => p.to_string(),
        Some(p) => format!("/{}", p),
    }
}

/// Drop endpoints whose (port, path) was already seen. First occurrence wins.
pub fn dedup_by_port_path<I>(endpoints: I) -> Vec<ProbeEndpoint>
where
    I: IntoIterator<Item = ProbeEndpoint>,
{
    let mut seen = HashSet::new();
    endpoints
        .into_iter()
        .filter(|e| seen.insert((e.port, e.path.clone())))
        .collect()
}
