//! Artillery test script model projected from resolved liveness endpoints.

use crate::cluster::{ProbeEndpoint, ServiceSelection, probe};
use serde::Serialize;

const EXPECTED_STATUS: u16 = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestScript {
    pub config: ScriptConfig,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptConfig {
    /// Base address of the Service inside the cluster
    pub target: String,
    pub phases: Vec<Phase>,
    pub plugins: Plugins,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub duration: u32,
    pub arrival_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Plugins {
    pub expect: ExpectPlugin,
}

/// Enables the `expect` plugin with its default settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExpectPlugin {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub flow: Vec<FlowStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowStep {
    pub get: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub url: String,
    pub expect: Vec<Expectation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectation {
    pub status_code: u16,
}

/// Build a test script that checks each distinct (port, path) endpoint once.
pub fn project(service: &ServiceSelection, endpoints: &[ProbeEndpoint]) -> TestScript {
    let host = service_host(service);

    let target = match service.ports.first() {
        Some(port) => format!("http://{}:{}", host, port.port),
        None => format!("http://{}", host),
    };

    let flow = probe::dedup_by_port_path(endpoints.iter().cloned())
        .into_iter()
        .map(|endpoint| FlowStep {
            get: Request {
                url: format!(
                    "{}://{}:{}{}",
                    endpoint.scheme, host, endpoint.port, endpoint.path
                ),
                expect: vec![Expectation {
                    status_code: EXPECTED_STATUS,
                }],
            },
        })
        .collect();

    TestScript {
        config: ScriptConfig {
            target,
            phases: vec![Phase {
                duration: 1,
                arrival_rate: 1,
            }],
            plugins: Plugins::default(),
        },
        scenarios: vec![Scenario {
            name: format!("liveness probes for {}", service.name),
            flow,
        }],
    }
}

fn service_host(service: &ServiceSelection) -> String {
    format!("{}.{}", service.name, service.namespace)
}
