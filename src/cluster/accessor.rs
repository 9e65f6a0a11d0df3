//! Typed read access to the Kubernetes API.
//!
//! The [`ClusterAccessor`] trait is the only seam between the query engine and
//! a live cluster. [`KubeAccessor`] implements it on top of `kube::Client`;
//! tests substitute an in-memory implementation.

use crate::error::ClusterError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Container, Pod, Probe, Service};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::{
    Client, Config,
    api::{Api, ListParams},
};
use std::collections::BTreeMap;

/// Label key/value pairs a Service uses to select its Pods.
pub type Selector = BTreeMap<String, String>;

/// A port given either as a number or as a container port name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortReference {
    Number(i32),
    Name(String),
}

impl From<&IntOrString> for PortReference {
    fn from(value: &IntOrString) -> Self {
        match value {
            IntOrString::Int(port) => PortReference::Number(*port),
            IntOrString::String(name) => PortReference::Name(name.clone()),
        }
    }
}

/// One entry of a Service's `spec.ports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePortSpec {
    pub name: Option<String>,
    pub port: i32,
    pub target_port: Option<PortReference>,
}

/// A Service that exists in the queried namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSelection {
    /// Name the Service was queried by
    pub name: String,
    pub namespace: String,
    pub selector: Selector,
    pub ports: Vec<ServicePortSpec>,
}

impl ServiceSelection {
    pub fn from_service(name: &str, namespace: &str, service: &Service) -> Self {
        let spec = service.spec.as_ref();

        let selector = spec
            .and_then(|s| s.selector.clone())
            .unwrap_or_default();

        let ports = spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| ServicePortSpec {
                        name: p.name.clone(),
                        port: p.port,
                        target_port: p.target_port.as_ref().map(PortReference::from),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            selector,
            ports,
        }
    }
}

/// The HTTP GET action of a liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGetProbe {
    pub path: Option<String>,
    pub port: PortReference,
    /// `HTTP` or `HTTPS` as written in the pod spec
    pub scheme: Option<String>,
}

/// The parts of a container relevant to probe resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerView {
    pub name: String,
    /// Named container ports, name -> number
    pub ports: BTreeMap<String, i32>,
    /// Present only when the liveness probe is an HTTP GET
    pub liveness_probe: Option<HttpGetProbe>,
}

/// The parts of a Pod relevant to probe resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodSpecView {
    pub name: String,
    pub containers: Vec<ContainerView>,
}

impl From<&Pod> for PodSpecView {
    fn from(pod: &Pod) -> Self {
        let containers = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.iter().map(ContainerView::from).collect())
            .unwrap_or_default();

        Self {
            name: pod.metadata.name.clone().unwrap_or_default(),
            containers,
        }
    }
}

impl From<&Container> for ContainerView {
    fn from(container: &Container) -> Self {
        let ports = container
            .ports
            .iter()
            .flatten()
            .filter_map(|p| p.name.clone().map(|name| (name, p.container_port)))
            .collect();

        Self {
            name: container.name.clone(),
            ports,
            liveness_probe: container.liveness_probe.as_ref().and_then(http_get_probe),
        }
    }
}

fn http_get_probe(probe: &Probe) -> Option<HttpGetProbe> {
    probe.http_get.as_ref().map(|action| HttpGetProbe {
        path: action.path.clone(),
        port: PortReference::from(&action.port),
        scheme: action.scheme.clone(),
    })
}

/// Render a selector as a label selector query string (`k1=v1,k2=v2`).
pub fn selector_string(selector: &Selector) -> String {
    selector
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Read-only view of the cluster used by the query engine.
#[async_trait]
pub trait ClusterAccessor: Send + Sync {
    /// Namespace of the active kubeconfig context.
    fn default_namespace(&self) -> &str;

    /// Look up a Service. `Ok(None)` when it does not exist.
    async fn get_service(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<ServiceSelection>, ClusterError>;

    /// List Pods matching every label in `selector`. An empty result is not an error.
    async fn list_pods_by_selector(
        &self,
        selector: &Selector,
        namespace: &str,
    ) -> Result<Vec<PodSpecView>, ClusterError>;
}

/// [`ClusterAccessor`] backed by the Kubernetes API.
pub struct KubeAccessor {
    client: Client,
}

impl KubeAccessor {
    /// Connect using the inferred configuration, or a specific kubeconfig context.
    pub async fn connect(context: Option<&str>) -> Result<Self, ClusterError> {
        let config = match context {
            Some(context) => {
                let kubeconfig = kube::config::Kubeconfig::read()?;
                Config::from_custom_kubeconfig(
                    kubeconfig,
                    &kube::config::KubeConfigOptions {
                        context: Some(context.to_string()),
                        ..Default::default()
                    },
                )
                .await?
            }
            None => Config::infer().await?,
        };
        let client = Client::try_from(config)?;
        log::debug!(
            "Connected to cluster, default namespace {}",
            client.default_namespace()
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl ClusterAccessor for KubeAccessor {
    fn default_namespace(&self) -> &str {
        self.client.default_namespace()
    }

    async fn get_service(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<ServiceSelection>, ClusterError> {
        log::debug!("Getting service {}/{}", namespace, name);
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let service = services.get_opt(name).await?;
        Ok(service.map(|svc| ServiceSelection::from_service(name, namespace, &svc)))
    }

    async fn list_pods_by_selector(
        &self,
        selector: &Selector,
        namespace: &str,
    ) -> Result<Vec<PodSpecView>, ClusterError> {
        // A Service without a selector does not select any Pods; an empty
        // label query would list every Pod in the namespace instead.
        if selector.is_empty() {
            return Ok(Vec::new());
        }

        let labels = selector_string(selector);
        log::debug!("Listing pods in {} matching {}", namespace, labels);
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods.list(&ListParams::default().labels(&labels)).await?;
        Ok(list.items.iter().map(PodSpecView::from).collect())
    }
}
