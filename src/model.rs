//! Values exchanged between the cluster API, the Eureka registry and the
//! scrape target consumer.

use std::fmt;

/// Base URL of the local `kubectl proxy` tunnel used in out-of-cluster mode.
pub const LOCAL_PROXY_BASE: &str = "http://localhost:8001";

/// Metadata key under which a registered instance publishes its metrics path.
pub const METRICS_PATH_KEY: &str = "prometheusURI";

/// How resolved endpoints reach their targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// Cluster-internal addresses are directly reachable.
    #[default]
    InCluster,
    /// Targets are reached through the API server proxy via [`LOCAL_PROXY_BASE`].
    OutOfCluster,
}

impl AddressingMode {
    /// Returns `true` for [`AddressingMode::InCluster`].
    #[must_use]
    pub fn is_in_cluster(self) -> bool {
        self == Self::InCluster
    }
}

impl From<bool> for AddressingMode {
    fn from(in_cluster: bool) -> Self {
        if in_cluster {
            Self::InCluster
        } else {
            Self::OutOfCluster
        }
    }
}

/// Logical origin of an [`Endpoint`], carried for labeling only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Context {
    /// Kubernetes namespace.
    pub namespace: String,
    /// Service or application name.
    pub name: String,
    /// Registry instance id. Only set for instance-level endpoints.
    pub instance_id: Option<String>,
}

impl Context {
    /// Creates a service-level context.
    #[must_use]
    pub fn service(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            instance_id: None,
        }
    }

    /// Creates an instance-level context.
    #[must_use]
    pub fn instance(
        namespace: impl Into<String>,
        name: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            instance_id: Some(instance_id.into()),
        }
    }
}

/// A resolved URL together with where it came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Origin of the URL.
    pub context: Context,
    /// Complete `http://` URL.
    pub url: String,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// A cluster service as reported by the cluster API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Namespace of the service.
    pub namespace: String,
    /// Name of the service.
    pub name: String,
    /// Cluster IP, `None` until the orchestrator assigns one.
    pub cluster_address: Option<String>,
    /// Exposed ports in API order.
    pub ports: Vec<u16>,
}

/// Port of a registry instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstancePort {
    /// Port number.
    pub value: u16,
    /// Whether the registry marks the port as enabled.
    pub enabled: bool,
}

/// One metadata key/value pair of a registry instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataEntry {
    /// Metadata key.
    pub key: String,
    /// Metadata value.
    pub value: String,
}

impl MetadataEntry {
    /// Creates a metadata entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the metrics path if this entry carries a non-empty one.
    #[must_use]
    pub fn metrics_path(&self) -> Option<&str> {
        (self.key == METRICS_PATH_KEY && !self.value.is_empty()).then_some(self.value.as_str())
    }
}

/// An application instance as reported by a Eureka registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceDescriptor {
    /// Namespace the registry was discovered in.
    pub namespace: String,
    /// Application name.
    pub name: String,
    /// Registry instance id, expected to match the pod name.
    pub instance_id: String,
    /// Instance IP address.
    pub address: String,
    /// Instance port.
    pub port: InstancePort,
    /// Metadata entries in registry order.
    pub metadata: Vec<MetadataEntry>,
}

impl InstanceDescriptor {
    /// Returns the first metrics path hint in metadata order.
    #[must_use]
    pub fn metrics_path(&self) -> Option<&str> {
        self.metadata.iter().find_map(MetadataEntry::metrics_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance_with(metadata: Vec<MetadataEntry>) -> InstanceDescriptor {
        InstanceDescriptor {
            namespace: "ns".to_string(),
            name: "app".to_string(),
            instance_id: "app-1".to_string(),
            address: "10.0.1.2".to_string(),
            port: InstancePort {
                value: 9100,
                enabled: true,
            },
            metadata,
        }
    }

    #[test]
    fn addressing_mode_from_bool() {
        assert_eq!(AddressingMode::from(true), AddressingMode::InCluster);
        assert_eq!(AddressingMode::from(false), AddressingMode::OutOfCluster);
        assert_eq!(AddressingMode::default(), AddressingMode::InCluster);
        assert!(AddressingMode::InCluster.is_in_cluster());
        assert!(!AddressingMode::OutOfCluster.is_in_cluster());
    }

    #[test]
    fn context_constructors() {
        let svc = Context::service("ns", "eureka");
        assert_eq!(svc.namespace, "ns");
        assert_eq!(svc.name, "eureka");
        assert!(svc.instance_id.is_none());

        let inst = Context::instance("ns", "app", "app-1");
        assert_eq!(inst.instance_id.as_deref(), Some("app-1"));
    }

    #[test]
    fn endpoint_displays_url() {
        let endpoint = Endpoint {
            context: Context::service("ns", "eureka"),
            url: "http://10.0.0.5:8080/eureka/apps".to_string(),
        };

        assert_eq!(endpoint.to_string(), "http://10.0.0.5:8080/eureka/apps");
    }

    #[test]
    fn metadata_entry_metrics_path() {
        assert_eq!(
            MetadataEntry::new(METRICS_PATH_KEY, "/metrics").metrics_path(),
            Some("/metrics")
        );
        assert_eq!(MetadataEntry::new(METRICS_PATH_KEY, "").metrics_path(), None);
        assert_eq!(MetadataEntry::new("zone", "/metrics").metrics_path(), None);
    }

    #[test]
    fn instance_metrics_path_first_match_wins() {
        let instance = instance_with(vec![
            MetadataEntry::new("zone", "a"),
            MetadataEntry::new(METRICS_PATH_KEY, ""),
            MetadataEntry::new(METRICS_PATH_KEY, "/actuator/prometheus"),
            MetadataEntry::new(METRICS_PATH_KEY, "/metrics"),
        ]);

        assert_eq!(instance.metrics_path(), Some("/actuator/prometheus"));
    }

    #[test]
    fn instance_metrics_path_missing() {
        let instance = instance_with(vec![MetadataEntry::new("zone", "a")]);
        assert_eq!(instance.metrics_path(), None);

        let empty = instance_with(Vec::new());
        assert_eq!(empty.metrics_path(), None);
    }
}
