#![deny(missing_docs)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Kubernetes-backed discovery of [Eureka](https://github.com/Netflix/eureka) registries and
//! the Prometheus scrape endpoints of the applications registered in them.
//!
//! Discovery runs in two stages:
//!
//! 1. [`ClusterServiceResolver`] lists Kubernetes services matching a label selector and
//!    resolves the `eureka/apps` URL of each registry.
//! 2. After the caller fetches a registry's instances, [`resolve_instance`] turns each
//!    instance into a scrape URL using the `prometheusURI` metadata it publishes.
//!
//! Both stages support two addressing modes. [`AddressingMode::InCluster`] uses cluster IPs
//! and pod addresses directly. [`AddressingMode::OutOfCluster`] routes everything through a
//! `kubectl proxy` listening on `localhost:8001`.
//!
//! # Usage
//!
//! ```ignore
//! use eureka_k8s_discovery::{
//!     AddressingMode, ClusterServiceResolver, KubeServiceLister, ServiceQuery, resolve_instances,
//! };
//!
//! let resolver = ClusterServiceResolver::new(KubeServiceLister::try_default().await?);
//! let query = ServiceQuery::new("app=eureka").mode(AddressingMode::OutOfCluster);
//!
//! for registry in resolver.resolve(&query).await? {
//!     // Fetch the registry's instances with your HTTP client of choice
//!     let instances = fetch_instances(&registry).await?;
//!     for target in resolve_instances(&instances, query.mode) {
//!         println!("{target}");
//!     }
//! }
//! ```

mod instance;
mod k8s;
mod model;

pub use instance::{resolve_instance, resolve_instances};
pub use k8s::{
    ClusterServiceResolver, DEFAULT_LIST_TIMEOUT, KubeServiceLister, ServiceLister, ServiceQuery,
};
pub use model::{
    AddressingMode, Context, Endpoint, InstanceDescriptor, InstancePort, LOCAL_PROXY_BASE,
    METRICS_PATH_KEY, MetadataEntry, ServiceDescriptor,
};
