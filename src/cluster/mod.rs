//! Kubernetes Service to liveness endpoint resolution.
//!
//! ```text
//! names ──► query ──► accessor.get_service ──► accessor.list_pods_by_selector
//!                                                        │
//!                       QueryResultSet ◄── dedup ◄── probe::resolve (per pod)
//! ```

pub mod accessor;
pub mod probe;
pub mod query;

pub use accessor::{ClusterAccessor, KubeAccessor, PodSpecView, ServiceSelection};
pub use probe::{ProbeEndpoint, Scheme};
pub use query::{
    LivenessHit, QueryOptions, QueryResult, QueryResultSet, ServiceQuery, do_query,
    do_query_until,
};
