//! Lists the Eureka registries found in the current Kubernetes cluster.
//!
//! Registry contents are not fetched; each resolved `eureka/apps` URL is
//! printed together with the service it came from.
//!
//! # Environment Variables
//!
//! - `EUREKA_NAMESPACE`: namespace to search (default: all namespaces)
//! - `EUREKA_SELECTOR`: service label selector (default: app=eureka)
//! - `LIST_TIMEOUT_SECS`: timeout of the service list call (default: 10)
//! - `IN_CLUSTER`: `true` to use cluster IPs, `false` to go through
//!   `kubectl proxy` on port 8001 (default: false)

use std::env;
use std::time::Duration;

use eureka_k8s_discovery::{ClusterServiceResolver, KubeServiceLister, ServiceQuery};
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let namespace = env::var("EUREKA_NAMESPACE").ok();
    let selector = env::var("EUREKA_SELECTOR").unwrap_or_else(|_| "app=eureka".to_string());
    let timeout_secs: u64 = env::var("LIST_TIMEOUT_SECS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(10);
    let in_cluster = env::var("IN_CLUSTER").is_ok_and(|v| v.eq_ignore_ascii_case("true"));

    let mut query = ServiceQuery::new(&selector)
        .timeout(Duration::from_secs(timeout_secs))
        .mode(in_cluster);
    if let Some(ns) = namespace {
        query = query.namespace(ns);
    }

    info!("Selector: {selector}");
    info!("Addressing mode: {:?}", query.mode);

    let resolver = ClusterServiceResolver::new(KubeServiceLister::try_default().await?);
    let registries = resolver.resolve(&query).await?;

    info!("Found {} Eureka registries", registries.len());
    for registry in &registries {
        println!(
            "{}/{}\t{}",
            registry.context.namespace, registry.context.name, registry
        );
    }

    Ok(())
}
