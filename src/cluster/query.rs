//! Resolve Service names into liveness probe endpoints.
//!
//! Every queried name produces exactly one [`QueryResult`], and the
//! [`QueryResultSet`] keeps the caller's input order no matter in which order
//! the lookups complete. Missing Services and Services without usable probes
//! are data; only cluster failures are errors.

use super::accessor::{ClusterAccessor, ServiceSelection};
use super::probe::{self, ProbeEndpoint};
use crate::error::{ClusterError, KubeArtilleryError, Result};
use futures_util::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;

/// One queried name and the namespace it was looked up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceQuery {
    pub name: String,
    pub namespace: String,
}

/// Outcome for a single queried name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// No Service with that name exists.
    Miss(ServiceQuery),
    /// The Service exists but no HTTP liveness endpoint could be resolved.
    /// `matched_pods` is zero when the selector matched nothing.
    HitNoProbe {
        selection: ServiceSelection,
        matched_pods: usize,
    },
    /// The Service exists and has at least one endpoint, deduplicated by (port, path).
    HitWithProbes {
        selection: ServiceSelection,
        endpoints: Vec<ProbeEndpoint>,
    },
}

impl QueryResult {
    pub fn queried_name(&self) -> &str {
        match self {
            QueryResult::Miss(query) => &query.name,
            QueryResult::HitNoProbe { selection, .. } => &selection.name,
            QueryResult::HitWithProbes { selection, .. } => &selection.name,
        }
    }

    pub fn is_hit(&self) -> bool {
        match self {
            QueryResult::Miss(_) => false,
            QueryResult::HitNoProbe { .. } | QueryResult::HitWithProbes { .. } => true,
        }
    }
}

/// A Service with resolved endpoints, borrowed from a [`QueryResultSet`].
#[derive(Debug, Clone, Copy)]
pub struct LivenessHit<'a> {
    pub selection: &'a ServiceSelection,
    pub endpoints: &'a [ProbeEndpoint],
}

/// All outcomes of one query, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResultSet {
    results: Vec<QueryResult>,
}

impl QueryResultSet {
    pub fn iter(&self) -> std::slice::Iter<'_, QueryResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Names that did not match any Service.
    pub fn query_misses(&self) -> impl Iterator<Item = &ServiceQuery> {
        self.results.iter().filter_map(|r| match r {
            QueryResult::Miss(query) => Some(query),
            QueryResult::HitNoProbe { .. } | QueryResult::HitWithProbes { .. } => None,
        })
    }

    /// Services found without any resolvable liveness endpoint.
    pub fn liveness_misses(&self) -> impl Iterator<Item = &ServiceSelection> {
        self.results.iter().filter_map(|r| match r {
            QueryResult::HitNoProbe { selection, .. } => Some(selection),
            QueryResult::Miss(_) | QueryResult::HitWithProbes { .. } => None,
        })
    }

    /// Services found with at least one liveness endpoint.
    pub fn liveness_hits(&self) -> impl Iterator<Item = LivenessHit<'_>> {
        self.results.iter().filter_map(|r| match r {
            QueryResult::HitWithProbes {
                selection,
                endpoints,
            } => Some(LivenessHit {
                selection,
                endpoints,
            }),
            QueryResult::Miss(_) | QueryResult::HitNoProbe { .. } => None,
        })
    }

    pub fn has_query_hits(&self) -> bool {
        self.results.iter().any(QueryResult::is_hit)
    }

    pub fn has_liveness_hits(&self) -> bool {
        self.liveness_hits().next().is_some()
    }
}

impl<'a> IntoIterator for &'a QueryResultSet {
    type Item = &'a QueryResult;
    type IntoIter = std::slice::Iter<'a, QueryResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Maximum number of names looked up at the same time
    pub concurrency: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Look up every name in `namespace`.
///
/// The first cluster error aborts the whole query; lookups still in flight are
/// dropped and no partial result set is returned.
pub async fn do_query<A>(
    names: &[String],
    namespace: &str,
    accessor: &A,
    options: &QueryOptions,
) -> std::result::Result<QueryResultSet, ClusterError>
where
    A: ClusterAccessor + ?Sized,
{
    let mut slots: Vec<Option<QueryResult>> = vec![None; names.len()];

    let mut lookups = stream::iter(names.iter().enumerate())
        .map(move |(index, name)| async move {
            query_service(name, namespace, accessor)
                .await
                .map(|result| (index, result))
        })
        .buffer_unordered(options.concurrency.max(1));

    while let Some(lookup) = lookups.next().await {
        let (index, result) = lookup?;
        slots[index] = Some(result);
    }

    let results: Vec<QueryResult> = slots.into_iter().flatten().collect();
    debug_assert_eq!(results.len(), names.len());

    log::info!(
        "Queried {} service(s) in {}: {} not found, {} without liveness endpoints",
        results.len(),
        namespace,
        results
            .iter()
            .filter(|r| matches!(r, QueryResult::Miss(_)))
            .count(),
        results
            .iter()
            .filter(|r| matches!(r, QueryResult::HitNoProbe { .. }))
            .count(),
    );

    Ok(QueryResultSet { results })
}

/// Run [`do_query`] under an overall deadline, aborting early if `shutdown` completes.
pub async fn do_query_until<A, S>(
    names: &[String],
    namespace: &str,
    accessor: &A,
    options: &QueryOptions,
    deadline: Duration,
    shutdown: S,
) -> Result<QueryResultSet>
where
    A: ClusterAccessor + ?Sized,
    S: Future<Output = ()>,
{
    tokio::select! {
        biased;

        _ = shutdown => Err(KubeArtilleryError::Cancelled),
        outcome = tokio::time::timeout(deadline, do_query(names, namespace, accessor, options)) => {
            match outcome {
                Ok(results) => Ok(results?),
                Err(_) => Err(KubeArtilleryError::DeadlineExceeded(deadline)),
            }
        }
    }
}

async fn query_service<A>(
    name: &str,
    namespace: &str,
    accessor: &A,
) -> std::result::Result<QueryResult, ClusterError>
where
    A: ClusterAccessor + ?Sized,
{
    let Some(selection) = accessor.get_service(name, namespace).await? else {
        log::debug!("Service {}/{} not found", namespace, name);
        return Ok(QueryResult::Miss(ServiceQuery {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }));
    };

    let pods = accessor
        .list_pods_by_selector(&selection.selector, namespace)
        .await?;
    log::debug!(
        "Service {}/{} selects {} pod(s)",
        namespace,
        name,
        pods.len()
    );

    let endpoints =
        probe::dedup_by_port_path(pods.iter().flat_map(|pod| probe::resolve(pod, &selection)));

    if endpoints.is_empty() {
        return Ok(QueryResult::HitNoProbe {
            selection,
            matched_pods: pods.len(),
        });
    }

    Ok(QueryResult::HitWithProbes {
        selection,
        endpoints,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cluster::accessor::{
        ContainerView, HttpGetProbe, PodSpecView, PortReference, Selector,
    };
    use crate::cluster::probe::Scheme;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory cluster snapshot for a single namespace.
    #[derive(Default)]
    pub(crate) struct FakeCluster {
        pub services: HashMap<String, Selector>,
        pub pods: Vec<(Selector, PodSpecView)>,
        /// Service lookups that fail with a transport error
        pub failing: Vec<String>,
        /// Service lookups that never complete
        pub hanging: Vec<String>,
        /// Per-name lookup delay, used to reorder completions
        pub delays_ms: HashMap<String, u64>,
        pub lookups: AtomicUsize,
    }

    impl FakeCluster {
        pub fn with_service(mut self, name: &str, app: &str) -> Self {
            self.services.insert(
                name.to_string(),
                BTreeMap::from([("app".to_string(), app.to_string())]),
            );
            self
        }

        pub fn with_pod(mut self, app: &str, pod: PodSpecView) -> Self {
            self.pods
                .push((BTreeMap::from([("app".to_string(), app.to_string())]), pod));
            self
        }
    }

    #[async_trait]
    impl ClusterAccessor for FakeCluster {
        fn default_namespace(&self) -> &str {
            "default"
        }

        async fn get_service(
            &self,
            name: &str,
            namespace: &str,
        ) -> std::result::Result<Option<ServiceSelection>, ClusterError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(ms) = self.delays_ms.get(name) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.hanging.iter().any(|n| n == name) {
                std::future::pending::<()>().await;
            }
            if self.failing.iter().any(|n| n == name) {
                return Err(ClusterError::Request("connection refused".to_string()));
            }
            Ok(self.services.get(name).map(|selector| ServiceSelection {
                name: name.to_string(),
                namespace: namespace.to_string(),
                selector: selector.clone(),
                ports: Vec::new(),
            }))
        }

        async fn list_pods_by_selector(
            &self,
            selector: &Selector,
            _namespace: &str,
        ) -> std::result::Result<Vec<PodSpecView>, ClusterError> {
            Ok(self
                .pods
                .iter()
                .filter(|(labels, _)| {
                    !selector.is_empty()
                        && selector.iter().all(|(k, v)| labels.get(k) == Some(v))
                })
                .map(|(_, pod)| pod.clone())
                .collect())
        }
    }

    pub(crate) fn probed_pod(name: &str, port_name: &str, port: i32, path: &str) -> PodSpecView {
        PodSpecView {
            name: name.to_string(),
            containers: vec![ContainerView {
                name: "app".to_string(),
                ports: BTreeMap::from([(port_name.to_string(), port)]),
                liveness_probe: Some(HttpGetProbe {
                    path: Some(path.to_string()),
                    port: PortReference::Name(port_name.to_string()),
                    scheme: None,
                }),
            }],
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    async fn query(cluster: &FakeCluster, input: &[&str]) -> QueryResultSet {
        do_query(&names(input), "default", cluster, &QueryOptions::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_named_port_probe_is_a_liveness_hit() {
        let cluster = FakeCluster::default()
            .with_service("svc-a", "a")
            .with_pod("a", probed_pod("a-0", "http", 8080, "/health"));

        let results = query(&cluster, &["svc-a"]).await;
        let hits: Vec<_> = results.liveness_hits().collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].selection.name, "svc-a");
        assert_eq!(
            hits[0].endpoints,
            &[ProbeEndpoint {
                scheme: Scheme::Http,
                port: 8080,
                path: "/health".to_string(),
                container: "app".to_string(),
            }]
        );
        assert!(results.has_query_hits());
        assert!(results.has_liveness_hits());
    }

    #[tokio::test]
    async fn test_missing_service_is_a_miss() {
        let cluster = FakeCluster::default();

        let results = query(&cluster, &["missing-svc"]).await;
        assert_eq!(
            results.iter().collect::<Vec<_>>(),
            vec![&QueryResult::Miss(ServiceQuery {
                name: "missing-svc".to_string(),
                namespace: "default".to_string(),
            })]
        );
        assert!(!results.has_query_hits());
        assert!(!results.has_liveness_hits());
    }

    #[tokio::test]
    async fn test_service_without_pods_is_a_liveness_miss() {
        let cluster = FakeCluster::default().with_service("svc-b", "b");

        let results = query(&cluster, &["svc-b"]).await;
        assert!(matches!(
            results.iter().next(),
            Some(QueryResult::HitNoProbe { matched_pods: 0, .. })
        ));
        assert!(results.has_query_hits());
        assert!(!results.has_liveness_hits());
        assert_eq!(
            results.liveness_misses().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["svc-b"]
        );
    }

    #[tokio::test]
    async fn test_pods_without_probes_are_a_liveness_miss() {
        let pod = PodSpecView {
            name: "c-0".to_string(),
            containers: vec![ContainerView {
                name: "app".to_string(),
                ..Default::default()
            }],
        };
        let cluster = FakeCluster::default()
            .with_service("svc-c", "c")
            .with_pod("c", pod);

        let results = query(&cluster, &["svc-c"]).await;
        assert!(matches!(
            results.iter().next(),
            Some(QueryResult::HitNoProbe { matched_pods: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let mut cluster = FakeCluster::default()
            .with_service("svc-a", "a")
            .with_pod("a", probed_pod("a-0", "http", 8080, "/health"));
        // svc-a completes last
        cluster.delays_ms.insert("svc-a".to_string(), 50);

        let results = query(&cluster, &["svc-a", "missing-svc"]).await;
        let outcomes: Vec<_> = results.iter().collect();
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], QueryResult::HitWithProbes { .. }));
        assert_eq!(outcomes[0].queried_name(), "svc-a");
        assert!(matches!(outcomes[1], QueryResult::Miss(_)));
        assert_eq!(outcomes[1].queried_name(), "missing-svc");
    }

    #[tokio::test]
    async fn test_every_name_produces_one_result() {
        let cluster = FakeCluster::default()
            .with_service("svc-a", "a")
            .with_service("svc-b", "b")
            .with_pod("a", probed_pod("a-0", "http", 8080, "/health"));
        let input = ["svc-b", "x", "svc-a", "svc-a", "y", "svc-b"];

        let results = query(&cluster, &input).await;
        let queried: Vec<_> = results.iter().map(QueryResult::queried_name).collect();
        assert_eq!(queried, input);
        assert_eq!(results.query_misses().count(), 2);
        assert_eq!(results.liveness_misses().count(), 2);
        assert_eq!(results.liveness_hits().count(), 2);
    }

    #[tokio::test]
    async fn test_endpoints_are_deduplicated_across_pods() {
        let mut second = probed_pod("a-1", "web", 8080, "/health");
        second.containers[0].name = "other".to_string();
        let cluster = FakeCluster::default()
            .with_service("svc-a", "a")
            .with_pod("a", probed_pod("a-0", "http", 8080, "/health"))
            .with_pod("a", second)
            .with_pod("a", probed_pod("a-2", "http", 8080, "/ready"));

        let results = query(&cluster, &["svc-a"]).await;
        let hit = results.liveness_hits().next().unwrap();
        let summary: Vec<_> = hit
            .endpoints
            .iter()
            .map(|e| (e.port, e.path.as_str(), e.container.as_str()))
            .collect();
        assert_eq!(summary, vec![(8080, "/health", "app"), (8080, "/ready", "app")]);
    }

    #[tokio::test]
    async fn test_same_snapshot_yields_same_results() {
        let cluster = FakeCluster::default()
            .with_service("svc-a", "a")
            .with_service("svc-b", "b")
            .with_pod("a", probed_pod("a-0", "http", 8080, "/health"))
            .with_pod("a", probed_pod("a-1", "http", 8081, "/health"));
        let input = ["svc-a", "svc-b", "nope"];

        let first = query(&cluster, &input).await;
        let second = query(&cluster, &input).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cluster_error_aborts_query() {
        let mut cluster = FakeCluster::default().with_service("svc-a", "a");
        cluster.failing.push("broken".to_string());

        let result = do_query(
            &names(&["svc-a", "broken"]),
            "default",
            &cluster,
            &QueryOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(ClusterError::Request(_))));
    }

    #[tokio::test]
    async fn test_sequential_query_stops_at_first_error() {
        let mut cluster = FakeCluster::default();
        cluster.failing.push("broken".to_string());

        let result = do_query(
            &names(&["broken", "a", "b", "c"]),
            "default",
            &cluster,
            &QueryOptions { concurrency: 1 },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(cluster.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_treated_as_one() {
        let cluster = FakeCluster::default().with_service("svc-a", "a");

        let results = do_query(
            &names(&["svc-a"]),
            "default",
            &cluster,
            &QueryOptions { concurrency: 0 },
        )
        .await
        .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_query() {
        let mut cluster = FakeCluster::default();
        cluster.hanging.push("slow".to_string());

        let result = do_query_until(
            &names(&["slow"]),
            "default",
            &cluster,
            &QueryOptions::default(),
            Duration::from_secs(30),
            async {},
        )
        .await;
        assert!(matches!(result, Err(KubeArtilleryError::Cancelled)));
    }

    #[tokio::test]
    async fn test_deadline_aborts_query() {
        let mut cluster = FakeCluster::default().with_service("svc-a", "a");
        cluster.hanging.push("slow".to_string());

        let result = do_query_until(
            &names(&["svc-a", "slow"]),
            "default",
            &cluster,
            &QueryOptions::default(),
            Duration::from_millis(50),
            std::future::pending(),
        )
        .await;
        assert!(matches!(
            result,
            Err(KubeArtilleryError::DeadlineExceeded(_))
        ));
    }

    #[tokio::test]
    async fn test_query_until_passes_results_through() {
        let cluster = FakeCluster::default().with_service("svc-a", "a");

        let results = do_query_until(
            &names(&["svc-a"]),
            "default",
            &cluster,
            &QueryOptions::default(),
            Duration::from_secs(5),
            std::future::pending(),
        )
        .await
        .unwrap();
        assert!(results.has_query_hits());
    }
}
