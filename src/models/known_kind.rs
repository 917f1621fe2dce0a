//! Well-known Kubernetes resource kind definitions
//!
//! This module provides a centralized enum for the core resource kinds the
//! relationship engine understands. This eliminates hardcoded strings
//! throughout the codebase and provides type safety for kind references.

use std::fmt;
use std::str::FromStr;

/// Enumeration of the well-known core resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownKind {
    // Workloads
    Pod,
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Job,
    CronJob,
    // Networking
    Service,
    Ingress,
    NetworkPolicy,
    // Configuration
    ConfigMap,
    Secret,
    ServiceAccount,
    // Storage
    PersistentVolumeClaim,
    PersistentVolume,
    StorageClass,
    // Cluster
    Node,
    Namespace,
}

impl KnownKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownKind::Pod => "Pod",
            KnownKind::Deployment => "Deployment",
            KnownKind::StatefulSet => "StatefulSet",
            KnownKind::DaemonSet => "DaemonSet",
            KnownKind::ReplicaSet => "ReplicaSet",
            KnownKind::Job => "Job",
            KnownKind::CronJob => "CronJob",
            KnownKind::Service => "Service",
            KnownKind::Ingress => "Ingress",
            KnownKind::NetworkPolicy => "NetworkPolicy",
            KnownKind::ConfigMap => "ConfigMap",
            KnownKind::Secret => "Secret",
            KnownKind::ServiceAccount => "ServiceAccount",
            KnownKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            KnownKind::PersistentVolume => "PersistentVolume",
            KnownKind::StorageClass => "StorageClass",
            KnownKind::Node => "Node",
            KnownKind::Namespace => "Namespace",
        }
    }

    /// Try to parse a string into a KnownKind, returning None if invalid
    /// Use this when you want Option<Self> instead of Result<Self, String>
    ///
    /// Unknown kinds are a valid outcome: the rule engine falls back to
    /// owner-reference-only analysis for them.
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all well-known resource kinds
    ///
    /// Returns an array of all KnownKind variants.
    /// This is useful for iterating over all resource types dynamically.
    pub fn all() -> &'static [Self] {
        &[
            KnownKind::Pod,
            KnownKind::Deployment,
            KnownKind::StatefulSet,
            KnownKind::DaemonSet,
            KnownKind::ReplicaSet,
            KnownKind::Job,
            KnownKind::CronJob,
            KnownKind::Service,
            KnownKind::Ingress,
            KnownKind::NetworkPolicy,
            KnownKind::ConfigMap,
            KnownKind::Secret,
            KnownKind::ServiceAccount,
            KnownKind::PersistentVolumeClaim,
            KnownKind::PersistentVolume,
            KnownKind::StorageClass,
            KnownKind::Node,
            KnownKind::Namespace,
        ]
    }

    /// Whether this kind is cluster-scoped (no namespace)
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(
            self,
            KnownKind::PersistentVolume
                | KnownKind::StorageClass
                | KnownKind::Node
                | KnownKind::Namespace
        )
    }

    /// Provider kinds: consumed by other resources, eligible for bounded
    /// reverse-edge synthesis ("what consumes me")
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            KnownKind::ConfigMap | KnownKind::Secret | KnownKind::ServiceAccount
        )
    }

    /// API group for this kind ("" for the core group)
    pub fn api_group(&self) -> &'static str {
        match self {
            KnownKind::Deployment
            | KnownKind::StatefulSet
            | KnownKind::DaemonSet
            | KnownKind::ReplicaSet => "apps",
            KnownKind::Job | KnownKind::CronJob => "batch",
            KnownKind::Ingress | KnownKind::NetworkPolicy => "networking.k8s.io",
            KnownKind::StorageClass => "storage.k8s.io",
            _ => "",
        }
    }

    /// Try to parse a string (case-insensitive, accepts plurals and short names)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pod" | "pods" | "po" => Some(KnownKind::Pod),
            "deployment" | "deployments" | "deploy" => Some(KnownKind::Deployment),
            "statefulset" | "statefulsets" | "sts" => Some(KnownKind::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Some(KnownKind::DaemonSet),
            "replicaset" | "replicasets" | "rs" => Some(KnownKind::ReplicaSet),
            "job" | "jobs" => Some(KnownKind::Job),
            "cronjob" | "cronjobs" | "cj" => Some(KnownKind::CronJob),
            "service" | "services" | "svc" => Some(KnownKind::Service),
            "ingress" | "ingresses" | "ing" => Some(KnownKind::Ingress),
            "networkpolicy" | "networkpolicies" | "netpol" => Some(KnownKind::NetworkPolicy),
            "configmap" | "configmaps" | "cm" => Some(KnownKind::ConfigMap),
            "secret" | "secrets" => Some(KnownKind::Secret),
            "serviceaccount" | "serviceaccounts" | "sa" => Some(KnownKind::ServiceAccount),
            "persistentvolumeclaim" | "persistentvolumeclaims" | "pvc" => {
                Some(KnownKind::PersistentVolumeClaim)
            }
            "persistentvolume" | "persistentvolumes" | "pv" => Some(KnownKind::PersistentVolume),
            "storageclass" | "storageclasses" | "sc" => Some(KnownKind::StorageClass),
            "node" | "nodes" | "no" => Some(KnownKind::Node),
            "namespace" | "namespaces" | "ns" => Some(KnownKind::Namespace),
            _ => None,
        }
    }
}

impl fmt::Display for KnownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<KnownKind> for String {
    fn from(kind: KnownKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for KnownKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pod" => Ok(KnownKind::Pod),
            "Deployment" => Ok(KnownKind::Deployment),
            "StatefulSet" => Ok(KnownKind::StatefulSet),
            "DaemonSet" => Ok(KnownKind::DaemonSet),
            "ReplicaSet" => Ok(KnownKind::ReplicaSet),
            "Job" => Ok(KnownKind::Job),
            "CronJob" => Ok(KnownKind::CronJob),
            "Service" => Ok(KnownKind::Service),
            "Ingress" => Ok(KnownKind::Ingress),
            "NetworkPolicy" => Ok(KnownKind::NetworkPolicy),
            "ConfigMap" => Ok(KnownKind::ConfigMap),
            "Secret" => Ok(KnownKind::Secret),
            "ServiceAccount" => Ok(KnownKind::ServiceAccount),
            "PersistentVolumeClaim" => Ok(KnownKind::PersistentVolumeClaim),
            "PersistentVolume" => Ok(KnownKind::PersistentVolume),
            "StorageClass" => Ok(KnownKind::StorageClass),
            "Node" => Ok(KnownKind::Node),
            "Namespace" => Ok(KnownKind::Namespace),
            _ => Err(format!("Unknown resource kind: {}", s)),
        }
    }
}
