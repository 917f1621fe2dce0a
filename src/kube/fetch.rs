//! Resource listing utilities
//!
//! Provides functions for listing cluster objects as JSON values for the
//! relationship engine. A failed listing for one kind is logged and treated
//! as an empty result: the overall computation degrades, it never aborts.

use crate::models::KnownKind;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, Node, PersistentVolume, PersistentVolumeClaim, Pod, Secret, Service,
    ServiceAccount,
};
use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};
use k8s_openapi::api::storage::v1::StorageClass;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Api, Client};
use serde_json::Value;

/// List all resources of a well-known kind as JSON values.
///
/// Typed list items carry no TypeMeta, so the kind is injected into each
/// value before it reaches the rule engine.
pub async fn list_kind(
    client: &Client,
    kind: KnownKind,
    namespace: Option<&str>,
    limit: usize,
) -> Vec<Value> {
    macro_rules! list_resource {
        ($type:ty) => {{
            let api: Api<$type> = match namespace {
                Some(ns) if !kind.is_cluster_scoped() => Api::namespaced(client.clone(), ns),
                _ => Api::all(client.clone()),
            };
            let params = ListParams::default().limit(limit as u32);
            match api.list(&params).await {
                Ok(list) => list
                    .items
                    .iter()
                    .filter_map(|obj| match serde_json::to_value(obj) {
                        Ok(mut value) => {
                            value["kind"] = Value::String(kind.as_str().to_string());
                            Some(value)
                        }
                        Err(e) => {
                            tracing::warn!("Failed to serialize {} object: {}", kind, e);
                            None
                        }
                    })
                    .collect(),
                Err(e) => {
                    tracing::warn!("Failed to list {}: {}", kind, e);
                    Vec::new()
                }
            }
        }};
    }

    // Cluster-scoped kinds never have a namespaced API surface, so the typed
    // `Api::namespaced` constructor does not exist for them. They always list
    // cluster-wide, which is exactly the branch the runtime guard above selects.
    macro_rules! list_cluster_resource {
        ($type:ty) => {{
            let api: Api<$type> = Api::all(client.clone());
            let params = ListParams::default().limit(limit as u32);
            match api.list(&params).await {
                Ok(list) => list
                    .items
                    .iter()
                    .filter_map(|obj| match serde_json::to_value(obj) {
                        Ok(mut value) => {
                            value["kind"] = Value::String(kind.as_str().to_string());
                            Some(value)
                        }
                        Err(e) => {
                            tracing::warn!("Failed to serialize {} object: {}", kind, e);
                            None
                        }
                    })
                    .collect(),
                Err(e) => {
                    tracing::warn!("Failed to list {}: {}", kind, e);
                    Vec::new()
                }
            }
        }};
    }

    match kind {
        KnownKind::Pod => list_resource!(Pod),
        KnownKind::Deployment => list_resource!(Deployment),
        KnownKind::StatefulSet => list_resource!(StatefulSet),
        KnownKind::DaemonSet => list_resource!(DaemonSet),
        KnownKind::ReplicaSet => list_resource!(ReplicaSet),
        KnownKind::Job => list_resource!(Job),
        KnownKind::CronJob => list_resource!(CronJob),
        KnownKind::Service => list_resource!(Service),
        KnownKind::Ingress => list_resource!(Ingress),
        KnownKind::NetworkPolicy => list_resource!(NetworkPolicy),
        KnownKind::ConfigMap => list_resource!(ConfigMap),
        KnownKind::Secret => list_resource!(Secret),
        KnownKind::ServiceAccount => list_resource!(ServiceAccount),
        KnownKind::PersistentVolumeClaim => list_resource!(PersistentVolumeClaim),
        KnownKind::PersistentVolume => list_cluster_resource!(PersistentVolume),
        KnownKind::StorageClass => list_cluster_resource!(StorageClass),
        KnownKind::Node => list_cluster_resource!(Node),
        KnownKind::Namespace => list_cluster_resource!(Namespace),
    }
}

/// Fetch one named resource of a well-known kind
pub async fn get_resource(
    client: &Client,
    kind: KnownKind,
    namespace: Option<&str>,
    name: &str,
) -> anyhow::Result<Value> {
    macro_rules! get_typed {
        ($type:ty) => {{
            let api: Api<$type> = match namespace {
                Some(ns) if !kind.is_cluster_scoped() => Api::namespaced(client.clone(), ns),
                _ => Api::all(client.clone()),
            };
            match api.get(name).await {
                Ok(obj) => {
                    let mut value = serde_json::to_value(&obj)?;
                    value["kind"] = Value::String(kind.as_str().to_string());
                    Ok(value)
                }
                Err(e) => Err(anyhow::anyhow!("Failed to fetch {} {}: {}", kind, name, e)),
            }
        }};
    }

    // Cluster-scoped kinds have no namespaced API surface; always fetch
    // cluster-wide, which is the branch the runtime guard above selects anyway.
    macro_rules! get_cluster_typed {
        ($type:ty) => {{
            let api: Api<$type> = Api::all(client.clone());
            match api.get(name).await {
                Ok(obj) => {
                    let mut value = serde_json::to_value(&obj)?;
                    value["kind"] = Value::String(kind.as_str().to_string());
                    Ok(value)
                }
                Err(e) => Err(anyhow::anyhow!("Failed to fetch {} {}: {}", kind, name, e)),
            }
        }};
    }

    match kind {
        KnownKind::Pod => get_typed!(Pod),
        KnownKind::Deployment => get_typed!(Deployment),
        KnownKind::StatefulSet => get_typed!(StatefulSet),
        KnownKind::DaemonSet => get_typed!(DaemonSet),
        KnownKind::ReplicaSet => get_typed!(ReplicaSet),
        KnownKind::Job => get_typed!(Job),
        KnownKind::CronJob => get_typed!(CronJob),
        KnownKind::Service => get_typed!(Service),
        KnownKind::Ingress => get_typed!(Ingress),
        KnownKind::NetworkPolicy => get_typed!(NetworkPolicy),
        KnownKind::ConfigMap => get_typed!(ConfigMap),
        KnownKind::Secret => get_typed!(Secret),
        KnownKind::ServiceAccount => get_typed!(ServiceAccount),
        KnownKind::PersistentVolumeClaim => get_typed!(PersistentVolumeClaim),
        KnownKind::PersistentVolume => get_cluster_typed!(PersistentVolume),
        KnownKind::StorageClass => get_cluster_typed!(StorageClass),
        KnownKind::Node => get_cluster_typed!(Node),
        KnownKind::Namespace => get_cluster_typed!(Namespace),
    }
}

/// List custom resource definitions as JSON values
pub async fn list_crds(client: &Client, limit: usize) -> Vec<Value> {
    let api: Api<CustomResourceDefinition> = Api::all(client.clone());
    let params = ListParams::default().limit(limit as u32);
    match api.list(&params).await {
        Ok(list) => list
            .items
            .iter()
            .filter_map(|crd| serde_json::to_value(crd).ok())
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to list custom resource definitions: {}", e);
            Vec::new()
        }
    }
}

/// List instances of a custom resource via the dynamic API
pub async fn list_custom_instances(
    client: &Client,
    group: &str,
    version: &str,
    kind: &str,
    plural: &str,
    namespace: Option<&str>,
    limit: usize,
) -> Vec<Value> {
    let gvk = GroupVersionKind::gvk(group, version, kind);
    let mut api_resource = ApiResource::from_gvk(&gvk);
    api_resource.plural = plural.to_string();

    let api: Api<DynamicObject> = match namespace {
        Some(ns) => Api::namespaced_with(client.clone(), ns, &api_resource),
        None => Api::all_with(client.clone(), &api_resource),
    };

    let params = ListParams::default().limit(limit as u32);
    match api.list(&params).await {
        Ok(list) => list
            .items
            .iter()
            .filter_map(|obj| match serde_json::to_value(obj) {
                Ok(mut value) => {
                    value["kind"] = Value::String(kind.to_string());
                    Some(value)
                }
                Err(_) => None,
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to list {} instances: {}", kind, e);
            Vec::new()
        }
    }
}

/// List namespace names, bounded by the governor's namespace cap
pub async fn list_namespace_names(client: &Client, limit: usize) -> Vec<String> {
    let api: Api<Namespace> = Api::all(client.clone());
    let params = ListParams::default().limit(limit as u32);
    match api.list(&params).await {
        Ok(list) => list
            .items
            .iter()
            .filter_map(|ns| ns.metadata.name.clone())
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to list namespaces: {}", e);
            Vec::new()
        }
    }
}
