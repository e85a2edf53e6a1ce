//! Scrape endpoint resolution for registry instances.
//!
//! Each instance reported by a Eureka registry either yields exactly one
//! scrape URL or is excluded. Exclusion is a normal outcome: instances with
//! a disabled port, or without a `prometheusURI` metadata entry, have
//! nothing to scrape.

use crate::model::{AddressingMode, Context, Endpoint, InstanceDescriptor, LOCAL_PROXY_BASE};

/// Resolves the scrape endpoint of a single registry instance.
///
/// Returns `None` when the instance port is disabled or no metrics path is
/// published in its metadata. Both cases are logged at info level.
///
/// In [`AddressingMode::OutOfCluster`] the instance id is used as the pod
/// name, since the registry gives no other way to tell which pod backs the
/// instance.
#[must_use]
pub fn resolve_instance(instance: &InstanceDescriptor, mode: AddressingMode) -> Option<Endpoint> {
    if !instance.port.enabled {
        tracing::info!(
            namespace = %instance.namespace,
            name = %instance.name,
            "insecure port disabled, skipping application"
        );
        return None;
    }

    let Some(metrics_path) = instance.metrics_path() else {
        tracing::info!(
            namespace = %instance.namespace,
            name = %instance.name,
            "no metrics path in instance metadata, skipping"
        );
        return None;
    };

    let port = instance.port.value;
    let url = match mode {
        AddressingMode::InCluster => format!("http://{}:{port}{metrics_path}", instance.address),
        AddressingMode::OutOfCluster => format!(
            "{LOCAL_PROXY_BASE}/api/v1/namespaces/{}/pods/{}:{port}/proxy{metrics_path}",
            instance.namespace, instance.instance_id
        ),
    };

    Some(Endpoint {
        context: Context::instance(
            instance.namespace.clone(),
            instance.name.clone(),
            instance.instance_id.clone(),
        ),
        url,
    })
}

/// Resolves every instance in order, dropping the excluded ones.
#[must_use]
pub fn resolve_instances<'a, I>(instances: I, mode: AddressingMode) -> Vec<Endpoint>
where
    I: IntoIterator<Item = &'a InstanceDescriptor>,
{
    instances
        .into_iter()
        .filter_map(|instance| resolve_instance(instance, mode))
        .collect()
}
