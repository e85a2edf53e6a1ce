//! Discovery of Eureka registry endpoints from Kubernetes services.
//!
//! This module lists Kubernetes `Service` resources matching a label
//! selector and turns each one into the URL of its Eureka `apps` listing.
//! The cluster API is reached through the [`ServiceLister`] trait so the
//! resolver can run against a real cluster ([`KubeServiceLister`]) or a
//! test double.
//!
//! # How It Works
//!
//! 1. Lists services once, bounded by the query timeout
//! 2. Skips services that have no `ClusterIP` assigned yet
//! 3. Picks the first port of each remaining service
//! 4. Formats an in-cluster or proxied URL depending on the addressing mode
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use eureka_k8s_discovery::{AddressingMode, ClusterServiceResolver, KubeServiceLister, ServiceQuery};
//!
//! let lister = KubeServiceLister::try_default().await?;
//! let resolver = ClusterServiceResolver::new(lister);
//!
//! let query = ServiceQuery::new("app=eureka")
//!     .namespace("platform")
//!     .timeout(Duration::from_secs(5))
//!     .mode(AddressingMode::OutOfCluster);
//!
//! for endpoint in resolver.resolve(&query).await? {
//!     println!("{endpoint}");
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use k8s_openapi::api::core::v1::Service;
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};

use crate::model::{AddressingMode, Context, Endpoint, LOCAL_PROXY_BASE, ServiceDescriptor};

/// Default upper bound for the service list call.
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Lists cluster services matching a namespace and label selector.
pub trait ServiceLister {
    /// Error returned when the cluster API cannot be queried.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lists services in a single call.
    ///
    /// A `namespace` of `None` lists across all namespaces. The label
    /// selector is passed to the cluster API verbatim. The call fails if it
    /// does not complete within `timeout_secs`; `0` disables the deadline.
    fn list_services(
        &self,
        namespace: Option<&str>,
        label_selector: &str,
        timeout_secs: u32,
    ) -> impl Future<Output = Result<Vec<ServiceDescriptor>, Self::Error>> + Send;
}

/// [`ServiceLister`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeServiceLister {
    client: Client,
}

impl KubeServiceLister {
    /// Creates a lister using an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a lister from the in-cluster environment or the local kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable client configuration can be inferred.
    pub async fn try_default() -> Result<Self, kube::Error> {
        Ok(Self::new(Client::try_default().await?))
    }
}

impl ServiceLister for KubeServiceLister {
    type Error = kube::Error;

    async fn list_services(
        &self,
        namespace: Option<&str>,
        label_selector: &str,
        timeout_secs: u32,
    ) -> Result<Vec<ServiceDescriptor>, Self::Error> {
        let services: Api<Service> = match namespace.filter(|ns| !ns.is_empty()) {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };

        let params = ListParams::default().labels(label_selector);

        // Zero means no deadline.
        let list = if timeout_secs == 0 {
            services.list(&params).await?
        } else {
            let deadline = Duration::from_secs(timeout_secs.into());
            tokio::time::timeout(deadline, services.list(&params))
                .await
                .map_err(|elapsed| kube::Error::Service(Box::new(elapsed)))??
        };

        Ok(list.items.iter().map(ServiceDescriptor::from).collect())
    }
}

impl From<&Service> for ServiceDescriptor {
    fn from(service: &Service) -> Self {
        let spec = service.spec.as_ref();

        let cluster_address = spec
            .and_then(|s| s.cluster_ip.as_deref())
            .filter(|ip| !ip.is_empty())
            .map(String::from);

        let ports = spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .filter_map(|p| match u16::try_from(p.port) {
                        Ok(port) => Some(port),
                        Err(_) => {
                            tracing::warn!(
                                namespace = %service.namespace().unwrap_or_default(),
                                name = %service.name_any(),
                                port = p.port,
                                "service port out of range, ignoring"
                            );
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            namespace: service.namespace().unwrap_or_default(),
            name: service.name_any(),
            cluster_address,
            ports,
        }
    }
}

/// Parameters of a cluster service resolution.
#[derive(Clone, Debug)]
pub struct ServiceQuery {
    /// Label selector passed verbatim to the cluster API.
    pub label_selector: String,

    /// Namespace to search. If `None`, all namespaces are searched.
    pub namespace: Option<String>,

    /// Maximum time the list call may take, applied as whole seconds.
    pub timeout: Duration,

    /// How the resulting URLs reach the registries.
    pub mode: AddressingMode,
}

impl ServiceQuery {
    /// Creates a query for all namespaces with the default timeout and
    /// in-cluster addressing.
    #[must_use]
    pub fn new(label_selector: impl Into<String>) -> Self {
        Self {
            label_selector: label_selector.into(),
            namespace: None,
            timeout: DEFAULT_LIST_TIMEOUT,
            mode: AddressingMode::default(),
        }
    }

    /// Restricts the query to a namespace. An empty name means all namespaces.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the list call timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the addressing mode.
    #[must_use]
    pub fn mode(mut self, mode: impl Into<AddressingMode>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Timeout in whole seconds, truncated and saturated to `u32`.
    #[must_use]
    pub fn timeout_secs(&self) -> u32 {
        u32::try_from(self.timeout.as_secs()).unwrap_or(u32::MAX)
    }
}

/// Resolves Eureka registry endpoints from cluster services.
#[derive(Clone, Debug)]
pub struct ClusterServiceResolver<L> {
    lister: L,
}

impl<L: ServiceLister> ClusterServiceResolver<L> {
    /// Creates a resolver that queries the cluster through `lister`.
    #[must_use]
    pub fn new(lister: L) -> Self {
        Self { lister }
    }

    /// Lists matching services and returns one registry endpoint per
    /// usable service, in list order.
    ///
    /// Services without a cluster address are skipped with a warning.
    /// Services with several ports use the first one.
    ///
    /// # Errors
    ///
    /// Returns the lister's error unchanged if the list call fails. No
    /// partial result is returned in that case.
    pub async fn resolve(&self, query: &ServiceQuery) -> Result<Vec<Endpoint>, L::Error> {
        let services = self
            .lister
            .list_services(
                query.namespace.as_deref(),
                &query.label_selector,
                query.timeout_secs(),
            )
            .await?;

        let endpoints: Vec<Endpoint> = services
            .iter()
            .filter_map(|service| service_endpoint(service, query.mode))
            .collect();

        tracing::debug!(
            namespace = query.namespace.as_deref().unwrap_or(""),
            selector = %query.label_selector,
            "resolved {} Eureka endpoints from {} services",
            endpoints.len(),
            services.len()
        );

        Ok(endpoints)
    }
}

/// Builds the registry endpoint for a single service.
///
/// This function is extracted to enable unit testing of the addressing logic.
fn service_endpoint(service: &ServiceDescriptor, mode: AddressingMode) -> Option<Endpoint> {
    let Some(address) = service
        .cluster_address
        .as_deref()
        .filter(|addr| !addr.is_empty())
    else {
        tracing::warn!(
            namespace = %service.namespace,
            name = %service.name,
            "Eureka service has no ClusterIP, skipping"
        );
        return None;
    };

    if service.ports.len() > 1 {
        tracing::warn!(
            namespace = %service.namespace,
            name = %service.name,
            ports = service.ports.len(),
            "Eureka service has multiple ports, first one will be used"
        );
    }

    let port = *service.ports.first()?;
    let url = match mode {
        AddressingMode::InCluster => format!("http://{address}:{port}/eureka/apps"),
        AddressingMode::OutOfCluster => format!(
            "{LOCAL_PROXY_BASE}/api/v1/namespaces/{}/services/{}:{port}/proxy/eureka/apps",
            service.namespace, service.name
        ),
    };

    Some(Endpoint {
        context: Context::service(service.namespace.clone(), service.name.clone()),
        url,
    })
}
