//! Relationship rule engine
//!
//! Pure functions that inspect one resource object and emit candidate
//! relationship edges. No cluster calls happen here: callers hand in
//! already-fetched objects as JSON values and receive candidates to be
//! canonicalized by the graph builder.

use crate::graph::model::{EdgeStrength, Node, RelationshipType};
use crate::models::KnownKind;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// A candidate edge emitted by a rule, before node canonicalization
#[derive(Debug, Clone)]
pub struct CandidateEdge {
    pub target_kind: String,
    pub target_name: String,
    /// None for cluster-scoped targets
    pub target_namespace: Option<String>,
    pub relationship: RelationshipType,
    pub strength: EdgeStrength,
    /// Field path the relationship was inferred from
    pub field: String,
    /// Human-readable reason
    pub reason: String,
}

/// A label-selector placeholder, resolved in a second pass once all
/// candidate nodes are known (discovery order is unspecified, so a Service
/// may be observed before its backing Pods)
#[derive(Debug, Clone)]
pub struct SelectorPlaceholder {
    /// Node id of the selecting resource
    pub source_id: String,
    /// Namespace the selector applies within
    pub namespace: String,
    /// Raw selector map: every key must match a pod label exactly
    pub selector: BTreeMap<String, String>,
    pub relationship: RelationshipType,
    pub field: String,
}

/// Output of analyzing one resource
#[derive(Debug, Clone, Default)]
pub struct CandidateRelations {
    /// This resource depends on the target
    pub outgoing: Vec<CandidateEdge>,
    /// The target depends on this resource. Only populated for provider
    /// kinds, and only by the service layer via edge inversion; a full
    /// reverse scan per resource would be quadratic.
    pub incoming: Vec<CandidateEdge>,
    /// Weak, selector-based candidates awaiting second-pass resolution
    pub related: Vec<SelectorPlaceholder>,
}

/// Extract the canonical node for a resource object
pub fn extract_node(obj: &Value, default_namespace: &str) -> Result<Node> {
    let kind = obj
        .get("kind")
        .and_then(|k| k.as_str())
        .context("Missing kind")?
        .to_string();

    let metadata = obj
        .get("metadata")
        .and_then(|m| m.as_object())
        .context("Missing metadata")?;

    let name = metadata
        .get("name")
        .and_then(|n| n.as_str())
        .context("Missing name")?
        .to_string();

    let cluster_scoped = KnownKind::parse_optional(&kind)
        .map(|k| k.is_cluster_scoped())
        .unwrap_or(false);

    let namespace = if cluster_scoped {
        None
    } else {
        metadata
            .get("namespace")
            .and_then(|n| n.as_str())
            .or(if default_namespace.is_empty() {
                None
            } else {
                Some(default_namespace)
            })
            .map(|s| s.to_string())
    };

    let labels = metadata
        .get("labels")
        .and_then(|l| l.as_object())
        .map(|l| {
            l.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let creation_timestamp = metadata
        .get("creationTimestamp")
        .and_then(|t| t.as_str())
        .map(|s| s.to_string());

    Ok(Node {
        id: Node::derive_id(&kind, &name, namespace.as_deref()),
        kind,
        name,
        namespace,
        labels,
        creation_timestamp,
        status: extract_status(obj),
    })
}

/// Derive a coarse status string from the object's status field
fn extract_status(obj: &Value) -> String {
    let status = match obj.get("status") {
        Some(s) => s,
        None => return "Unknown".to_string(),
    };

    // Pods and PVs report a phase directly
    if let Some(phase) = status.get("phase").and_then(|p| p.as_str()) {
        return phase.to_string();
    }

    // Workloads: check the Available/Ready condition
    if let Some(conditions) = status.get("conditions").and_then(|c| c.as_array()) {
        for cond in conditions {
            let cond_type = cond.get("type").and_then(|t| t.as_str());
            if matches!(cond_type, Some("Available") | Some("Ready")) {
                let ok = cond.get("status").and_then(|s| s.as_str()) == Some("True");
                return if ok { "Ready" } else { "NotReady" }.to_string();
            }
        }
    }

    if let Some(ready) = status.get("readyReplicas").and_then(|r| r.as_i64()) {
        let desired = obj
            .get("spec")
            .and_then(|s| s.get("replicas"))
            .and_then(|r| r.as_i64())
            .unwrap_or(1);
        return if ready >= desired { "Ready" } else { "NotReady" }.to_string();
    }

    "Active".to_string()
}

/// Analyze one resource object and emit its candidate relationships.
///
/// Dispatches on the resource kind; unknown kinds fall back to
/// owner-reference analysis only. Never fails on a malformed shape: fields
/// that do not parse are skipped, so one odd object cannot poison a batch.
pub fn analyze_resource(obj: &Value, default_namespace: &str) -> Result<CandidateRelations> {
    let node = extract_node(obj, default_namespace)?;
    let namespace = node.namespace.clone().unwrap_or_default();

    let mut relations = CandidateRelations::default();

    // Owner references apply to every kind, known or not
    collect_owner_references(obj, &mut relations.outgoing);

    let Some(kind) = KnownKind::parse_optional(&node.kind) else {
        return Ok(relations);
    };

    match kind {
        KnownKind::Pod => {
            if let Some(pod_spec) = obj.get("spec") {
                analyze_pod_spec(pod_spec, "spec", &mut relations.outgoing);

                // Scheduling: bare Pods only; templates carry intent via affinity
                if let Some(node_name) = pod_spec.get("nodeName").and_then(|n| n.as_str()) {
                    relations.outgoing.push(CandidateEdge {
                        target_kind: KnownKind::Node.as_str().to_string(),
                        target_name: node_name.to_string(),
                        target_namespace: None,
                        relationship: RelationshipType::Scheduling,
                        strength: EdgeStrength::Strong,
                        field: "spec.nodeName".to_string(),
                        reason: format!("scheduled on node {}", node_name),
                    });
                }
            }
        }
        KnownKind::Deployment
        | KnownKind::StatefulSet
        | KnownKind::DaemonSet
        | KnownKind::ReplicaSet
        | KnownKind::Job => {
            if let Some(pod_spec) = obj
                .get("spec")
                .and_then(|s| s.get("template"))
                .and_then(|t| t.get("spec"))
            {
                analyze_pod_spec(pod_spec, "spec.template.spec", &mut relations.outgoing);
            }
        }
        KnownKind::CronJob => {
            if let Some(pod_spec) = obj
                .get("spec")
                .and_then(|s| s.get("jobTemplate"))
                .and_then(|j| j.get("spec"))
                .and_then(|s| s.get("template"))
                .and_then(|t| t.get("spec"))
            {
                analyze_pod_spec(
                    pod_spec,
                    "spec.jobTemplate.spec.template.spec",
                    &mut relations.outgoing,
                );
            }
        }
        KnownKind::Service => {
            if let Some(selector) = extract_selector_map(obj.get("spec").and_then(|s| s.get("selector"))) {
                relations.related.push(SelectorPlaceholder {
                    source_id: node.id.clone(),
                    namespace: namespace.clone(),
                    selector,
                    relationship: RelationshipType::Service,
                    field: "spec.selector".to_string(),
                });
            }
        }
        KnownKind::NetworkPolicy => {
            if let Some(selector) = extract_selector_map(
                obj.get("spec")
                    .and_then(|s| s.get("podSelector"))
                    .and_then(|p| p.get("matchLabels")),
            ) {
                relations.related.push(SelectorPlaceholder {
                    source_id: node.id.clone(),
                    namespace: namespace.clone(),
                    selector,
                    relationship: RelationshipType::Network,
                    field: "spec.podSelector.matchLabels".to_string(),
                });
            }
        }
        KnownKind::PersistentVolumeClaim => {
            collect_claim_references(obj, &mut relations.outgoing);
        }
        KnownKind::Ingress => {
            collect_ingress_backends(obj, &namespace, &mut relations.outgoing);
        }
        _ => {}
    }

    Ok(relations)
}

/// Owner references: one strong edge per entry
fn collect_owner_references(obj: &Value, out: &mut Vec<CandidateEdge>) {
    let Some(owner_refs) = obj
        .get("metadata")
        .and_then(|m| m.get("ownerReferences"))
        .and_then(|o| o.as_array())
    else {
        return;
    };

    let namespace = obj
        .get("metadata")
        .and_then(|m| m.get("namespace"))
        .and_then(|n| n.as_str());

    for owner_ref in owner_refs {
        let (Some(kind), Some(name)) = (
            owner_ref.get("kind").and_then(|k| k.as_str()),
            owner_ref.get("name").and_then(|n| n.as_str()),
        ) else {
            tracing::warn!("Owner reference missing kind or name, skipping");
            continue;
        };

        // Owners share the dependent's namespace; cluster-scoped owners have none
        let owner_cluster_scoped = KnownKind::parse_optional(kind)
            .map(|k| k.is_cluster_scoped())
            .unwrap_or(false);

        out.push(CandidateEdge {
            target_kind: kind.to_string(),
            target_name: name.to_string(),
            target_namespace: if owner_cluster_scoped {
                None
            } else {
                namespace.map(|s| s.to_string())
            },
            relationship: RelationshipType::Owner,
            strength: EdgeStrength::Strong,
            field: "metadata.ownerReferences".to_string(),
            reason: format!("owned by {} {}", kind, name),
        });
    }
}

/// Pod-spec analysis shared by bare Pods and workload templates.
///
/// `field_prefix` is the path to the pod spec within the enclosing object,
/// so edge metadata points at the correct nested field.
fn analyze_pod_spec(pod_spec: &Value, field_prefix: &str, out: &mut Vec<CandidateEdge>) {
    collect_volume_references(pod_spec, field_prefix, out);
    collect_container_env(pod_spec, field_prefix, "containers", out);
    collect_container_env(pod_spec, field_prefix, "initContainers", out);
    collect_image_pull_secrets(pod_spec, field_prefix, out);

    // The implicit "default" service account is not an interesting dependency
    if let Some(sa) = pod_spec.get("serviceAccountName").and_then(|s| s.as_str()) {
        if sa != "default" && !sa.is_empty() {
            out.push(CandidateEdge {
                target_kind: KnownKind::ServiceAccount.as_str().to_string(),
                target_name: sa.to_string(),
                target_namespace: None,
                relationship: RelationshipType::ServiceAccount,
                strength: EdgeStrength::Strong,
                field: format!("{}.serviceAccountName", field_prefix),
                reason: format!("runs as service account {}", sa),
            });
        }
    }
}

/// Volumes referencing a config, secret, or claim
fn collect_volume_references(pod_spec: &Value, field_prefix: &str, out: &mut Vec<CandidateEdge>) {
    let Some(volumes) = pod_spec.get("volumes").and_then(|v| v.as_array()) else {
        return;
    };

    for volume in volumes {
        let volume_name = volume.get("name").and_then(|n| n.as_str()).unwrap_or("");

        if let Some(name) = volume
            .get("configMap")
            .and_then(|c| c.get("name"))
            .and_then(|n| n.as_str())
        {
            out.push(CandidateEdge {
                target_kind: KnownKind::ConfigMap.as_str().to_string(),
                target_name: name.to_string(),
                target_namespace: None,
                relationship: RelationshipType::ConfigMap,
                strength: EdgeStrength::Strong,
                field: format!("{}.volumes", field_prefix),
                reason: format!("volume {} mounts config map {}", volume_name, name),
            });
        }

        if let Some(name) = volume
            .get("secret")
            .and_then(|s| s.get("secretName"))
            .and_then(|n| n.as_str())
        {
            out.push(CandidateEdge {
                target_kind: KnownKind::Secret.as_str().to_string(),
                target_name: name.to_string(),
                target_namespace: None,
                relationship: RelationshipType::Secret,
                strength: EdgeStrength::Strong,
                field: format!("{}.volumes", field_prefix),
                reason: format!("volume {} mounts secret {}", volume_name, name),
            });
        }

        if let Some(name) = volume
            .get("persistentVolumeClaim")
            .and_then(|p| p.get("claimName"))
            .and_then(|n| n.as_str())
        {
            out.push(CandidateEdge {
                target_kind: KnownKind::PersistentVolumeClaim.as_str().to_string(),
                target_name: name.to_string(),
                target_namespace: None,
                relationship: RelationshipType::Volume,
                strength: EdgeStrength::Strong,
                field: format!("{}.volumes", field_prefix),
                reason: format!("volume {} binds claim {}", volume_name, name),
            });
        }
    }
}

/// Container env references: `env[].valueFrom` and `envFrom`.
///
/// Each container/env-index pair is a distinct reason, but duplicate target
/// edges collapse later under the same derived edge id.
fn collect_container_env(
    pod_spec: &Value,
    field_prefix: &str,
    containers_field: &str,
    out: &mut Vec<CandidateEdge>,
) {
    let Some(containers) = pod_spec.get(containers_field).and_then(|c| c.as_array()) else {
        return;
    };

    for container in containers {
        let container_name = container.get("name").and_then(|n| n.as_str()).unwrap_or("");

        if let Some(env) = container.get("env").and_then(|e| e.as_array()) {
            for (idx, env_var) in env.iter().enumerate() {
                let Some(value_from) = env_var.get("valueFrom") else {
                    continue;
                };

                if let Some(name) = value_from
                    .get("configMapKeyRef")
                    .and_then(|r| r.get("name"))
                    .and_then(|n| n.as_str())
                {
                    out.push(CandidateEdge {
                        target_kind: KnownKind::ConfigMap.as_str().to_string(),
                        target_name: name.to_string(),
                        target_namespace: None,
                        relationship: RelationshipType::Environment,
                        strength: EdgeStrength::Strong,
                        field: format!("{}.{}.env", field_prefix, containers_field),
                        reason: format!("container {} env[{}] reads config map {}", container_name, idx, name),
                    });
                }

                if let Some(name) = value_from
                    .get("secretKeyRef")
                    .and_then(|r| r.get("name"))
                    .and_then(|n| n.as_str())
                {
                    out.push(CandidateEdge {
                        target_kind: KnownKind::Secret.as_str().to_string(),
                        target_name: name.to_string(),
                        target_namespace: None,
                        relationship: RelationshipType::Environment,
                        strength: EdgeStrength::Strong,
                        field: format!("{}.{}.env", field_prefix, containers_field),
                        reason: format!("container {} env[{}] reads secret {}", container_name, idx, name),
                    });
                }
            }
        }

        if let Some(env_from) = container.get("envFrom").and_then(|e| e.as_array()) {
            for source in env_from {
                if let Some(name) = source
                    .get("configMapRef")
                    .and_then(|r| r.get("name"))
                    .and_then(|n| n.as_str())
                {
                    out.push(CandidateEdge {
                        target_kind: KnownKind::ConfigMap.as_str().to_string(),
                        target_name: name.to_string(),
                        target_namespace: None,
                        relationship: RelationshipType::Environment,
                        strength: EdgeStrength::Strong,
                        field: format!("{}.{}.envFrom", field_prefix, containers_field),
                        reason: format!("container {} imports config map {}", container_name, name),
                    });
                }

                if let Some(name) = source
                    .get("secretRef")
                    .and_then(|r| r.get("name"))
                    .and_then(|n| n.as_str())
                {
                    out.push(CandidateEdge {
                        target_kind: KnownKind::Secret.as_str().to_string(),
                        target_name: name.to_string(),
                        target_namespace: None,
                        relationship: RelationshipType::Environment,
                        strength: EdgeStrength::Strong,
                        field: format!("{}.{}.envFrom", field_prefix, containers_field),
                        reason: format!("container {} imports secret {}", container_name, name),
                    });
                }
            }
        }
    }
}

fn collect_image_pull_secrets(pod_spec: &Value, field_prefix: &str, out: &mut Vec<CandidateEdge>) {
    let Some(secrets) = pod_spec.get("imagePullSecrets").and_then(|s| s.as_array()) else {
        return;
    };

    for secret in secrets {
        if let Some(name) = secret.get("name").and_then(|n| n.as_str()) {
            out.push(CandidateEdge {
                target_kind: KnownKind::Secret.as_str().to_string(),
                target_name: name.to_string(),
                target_namespace: None,
                relationship: RelationshipType::ImagePullSecret,
                strength: EdgeStrength::Strong,
                field: format!("{}.imagePullSecrets", field_prefix),
                reason: format!("pulls images with secret {}", name),
            });
        }
    }
}

/// Claim references: bound volume and storage class, both cluster-scoped
fn collect_claim_references(obj: &Value, out: &mut Vec<CandidateEdge>) {
    let Some(spec) = obj.get("spec") else {
        return;
    };

    if let Some(volume_name) = spec.get("volumeName").and_then(|v| v.as_str()) {
        if !volume_name.is_empty() {
            out.push(CandidateEdge {
                target_kind: KnownKind::PersistentVolume.as_str().to_string(),
                target_name: volume_name.to_string(),
                target_namespace: None,
                relationship: RelationshipType::Volume,
                strength: EdgeStrength::Strong,
                field: "spec.volumeName".to_string(),
                reason: format!("bound to volume {}", volume_name),
            });
        }
    }

    if let Some(class) = spec.get("storageClassName").and_then(|c| c.as_str()) {
        if !class.is_empty() {
            out.push(CandidateEdge {
                target_kind: KnownKind::StorageClass.as_str().to_string(),
                target_name: class.to_string(),
                target_namespace: None,
                relationship: RelationshipType::Volume,
                strength: EdgeStrength::Strong,
                field: "spec.storageClassName".to_string(),
                reason: format!("provisioned by storage class {}", class),
            });
        }
    }
}

/// Ingress backends: rule paths and the default backend
fn collect_ingress_backends(obj: &Value, _namespace: &str, out: &mut Vec<CandidateEdge>) {
    let Some(spec) = obj.get("spec") else {
        return;
    };

    let mut push_backend = |backend: &Value, field: String| {
        if let Some(name) = backend
            .get("service")
            .and_then(|s| s.get("name"))
            .and_then(|n| n.as_str())
        {
            out.push(CandidateEdge {
                target_kind: KnownKind::Service.as_str().to_string(),
                target_name: name.to_string(),
                target_namespace: None,
                relationship: RelationshipType::Service,
                strength: EdgeStrength::Strong,
                field,
                reason: format!("routes traffic to service {}", name),
            });
        }
    };

    if let Some(backend) = spec.get("defaultBackend") {
        push_backend(backend, "spec.defaultBackend".to_string());
    }

    if let Some(rules) = spec.get("rules").and_then(|r| r.as_array()) {
        for (rule_idx, rule) in rules.iter().enumerate() {
            let Some(paths) = rule
                .get("http")
                .and_then(|h| h.get("paths"))
                .and_then(|p| p.as_array())
            else {
                continue;
            };
            for path in paths {
                if let Some(backend) = path.get("backend") {
                    push_backend(backend, format!("spec.rules[{}].http.paths", rule_idx));
                }
            }
        }
    }
}

/// Extract a selector map where every value is a string.
/// Returns None for absent or empty selectors (headless/ExternalName
/// Services select nothing).
fn extract_selector_map(value: Option<&Value>) -> Option<BTreeMap<String, String>> {
    let map = value?.as_object()?;
    if map.is_empty() {
        return None;
    }
    let selector: BTreeMap<String, String> = map
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
        .collect();
    if selector.is_empty() { None } else { Some(selector) }
}
