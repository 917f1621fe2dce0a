//! Dependency service for graph computations
//!
//! This service abstracts all Kubernetes API interactions away from the
//! HTTP layer. It owns the client, constructs the per-request resource
//! cache, orchestrates the concurrent listing fan-out, and hands the
//! fetched objects to the synchronous assembler.

use crate::config::schema::Config;
use crate::crd::{AnalyzerOptions, ApiGroupInfo, SchemaAnalysis, analyze_crds, api_group_inventory};
use crate::graph::builder::{GraphLimits, assemble_graph};
use crate::graph::model::{DependencyGraph, Edge};
use crate::graph::rules;
use crate::kube::{ResourceCache, fetch};
use crate::models::KnownKind;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Fields that mark a selector-derived edge; used to split "related" from
/// structural dependencies in the single-resource report
const SELECTOR_FIELDS: &[&str] = &["spec.selector", "spec.podSelector.matchLabels"];

/// Single-resource relationship report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReport {
    pub resource: crate::graph::model::Node,
    pub dependencies: ResourceDependencies,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDependencies {
    /// This resource depends on the target
    pub outgoing: Vec<Edge>,
    /// The target depends on this resource (provider kinds only)
    pub incoming: Vec<Edge>,
    /// Selector-derived relationships touching this resource
    pub related: Vec<Edge>,
}

/// Service for computing dependency graphs against a live cluster
pub struct DependencyService {
    client: kube::Client,
    config: Arc<Config>,
}

impl DependencyService {
    pub fn new(client: kube::Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    fn limits(&self, max_nodes: Option<usize>) -> GraphLimits {
        let mut limits = self.config.limits.to_graph_limits();
        limits.max_nodes = max_nodes;
        limits
    }

    /// Compute the canonical graph for a namespace or the whole cluster.
    ///
    /// The cache lives exactly as long as this call; it is cleared on every
    /// return path so no state leaks between requests.
    pub async fn namespace_graph(
        &self,
        namespace: Option<&str>,
        include_custom: bool,
        max_nodes: Option<usize>,
    ) -> Result<DependencyGraph> {
        let mut cache = ResourceCache::new();
        let result = self
            .namespace_graph_with_cache(&mut cache, namespace, include_custom, max_nodes)
            .await;
        cache.clear();
        result
    }

    async fn namespace_graph_with_cache(
        &self,
        cache: &mut ResourceCache,
        namespace: Option<&str>,
        include_custom: bool,
        max_nodes: Option<usize>,
    ) -> Result<DependencyGraph> {
        let limits = self.limits(max_nodes);
        let resources = self
            .fetch_catalog(cache, namespace, &limits)
            .await;

        let (hits, misses) = cache.stats();
        tracing::debug!("Resource cache: {} hits, {} misses", hits, misses);

        let mut extra = Vec::new();
        if include_custom {
            extra = self.fetch_custom_instances(namespace, &limits).await;
        }

        let mut all = resources;
        all.extend(extra);

        tracing::debug!(
            "Assembling graph from {} fetched objects (namespace: {:?})",
            all.len(),
            namespace
        );

        let mut graph = assemble_graph(&all, namespace, &limits);
        graph.metadata.include_custom = include_custom;
        Ok(graph)
    }

    /// Fan out listings for every catalog kind concurrently and join before
    /// analysis proceeds, to bound wall-clock latency
    async fn fetch_catalog(
        &self,
        cache: &mut ResourceCache,
        namespace: Option<&str>,
        limits: &GraphLimits,
    ) -> Vec<Value> {
        let mut cached: Vec<Value> = Vec::new();
        let mut to_fetch: Vec<KnownKind> = Vec::new();

        for kind in KnownKind::all() {
            let scope = if kind.is_cluster_scoped() { None } else { namespace };
            match cache.get(kind.as_str(), scope) {
                Some(hit) => cached.extend(hit.iter().cloned()),
                None => to_fetch.push(*kind),
            }
        }

        let futures: Vec<_> = to_fetch
            .iter()
            .map(|kind| {
                let scope = if kind.is_cluster_scoped() { None } else { namespace };
                fetch::list_kind(&self.client, *kind, scope, limits.max_resources_per_type)
            })
            .collect();
        let listings = futures::future::join_all(futures).await;

        for (kind, listing) in to_fetch.iter().zip(listings) {
            let scope = if kind.is_cluster_scoped() { None } else { namespace };
            cache.insert(kind.as_str(), scope, listing.clone());
            cached.extend(listing);
        }

        cached
    }

    /// Fetch custom resource instances, bounded by the CRD cap
    async fn fetch_custom_instances(
        &self,
        namespace: Option<&str>,
        limits: &GraphLimits,
    ) -> Vec<Value> {
        let crds = fetch::list_crds(&self.client, self.config.limits.max_crds).await;
        let analysis = analyze_crds(
            &crds,
            &AnalyzerOptions {
                max_crds: self.config.limits.max_crds,
                ..AnalyzerOptions::default()
            },
        );

        let mut instances = Vec::new();
        for crd in &analysis.crds {
            let Some(version) = crd.versions.first() else {
                continue;
            };
            if crd.plural.is_empty() {
                continue;
            }
            let listed = fetch::list_custom_instances(
                &self.client,
                &crd.group,
                version,
                &crd.kind,
                &crd.plural,
                namespace,
                limits.max_resources_per_type,
            )
            .await;
            instances.extend(listed);
        }
        instances
    }

    /// Build the relationship report for one named resource
    pub async fn resource_report(
        &self,
        kind_str: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<ResourceReport> {
        let kind = KnownKind::from_str_case_insensitive(kind_str)
            .with_context(|| format!("Unknown resource kind: {}", kind_str))?;

        let scope = if kind.is_cluster_scoped() { None } else { namespace };
        let obj = fetch::get_resource(&self.client, kind, scope, name).await?;

        let default_ns = scope.unwrap_or("");
        let node = rules::extract_node(&obj, default_ns)?;

        // Resolving selectors and finding consumers both need the rest of
        // the namespace, so compute the bounded namespace graph once and
        // slice this resource's edges out of it
        let graph = self.namespace_graph(scope, false, None).await?;

        let mut outgoing = Vec::new();
        let mut incoming = Vec::new();
        let mut related = Vec::new();

        for edge in graph.sorted_edges() {
            let is_selector_edge = SELECTOR_FIELDS.contains(&edge.metadata.field.as_str());
            let is_reverse = edge.id.ends_with(":reverse");

            if is_selector_edge {
                if edge.source == node.id || edge.target == node.id {
                    related.push(edge.clone());
                }
            } else if edge.source == node.id && !is_reverse {
                outgoing.push(edge.clone());
            } else if edge.target == node.id && !is_reverse && kind.is_provider() {
                // Consumers of a provider kind, bounded like reverse synthesis
                if incoming.len() < self.config.limits.max_reverse_edges {
                    incoming.push(edge.clone());
                }
            }
        }

        Ok(ResourceReport {
            resource: node,
            dependencies: ResourceDependencies {
                outgoing,
                incoming,
                related,
            },
        })
    }

    /// Analyze CRD schemas into a schema relationship graph
    pub async fn crd_graph(
        &self,
        options: AnalyzerOptions,
        sample_instances: bool,
    ) -> Result<SchemaAnalysis> {
        // List more than the cap so group filtering happens before capping
        let crds = fetch::list_crds(&self.client, options.max_crds * 4).await;
        let mut analysis = analyze_crds(&crds, &options);

        if sample_instances {
            self.sample_instance_counts(&mut analysis).await;
        }

        Ok(analysis)
    }

    /// Annotate each analyzed CRD node with a sampled instance count.
    ///
    /// Bounded in both directions: one listing per CRD (itself capped) and
    /// namespace attribution limited by the namespace cap.
    async fn sample_instance_counts(&self, analysis: &mut SchemaAnalysis) {
        let limits = self.config.limits.to_graph_limits();

        for crd in &analysis.crds {
            let Some(version) = crd.versions.first() else {
                continue;
            };
            if crd.plural.is_empty() {
                continue;
            }

            let instances = fetch::list_custom_instances(
                &self.client,
                &crd.group,
                version,
                &crd.kind,
                &crd.plural,
                None,
                limits.max_resources_per_type,
            )
            .await;

            let mut namespaces: Vec<&str> = instances
                .iter()
                .filter_map(|i| i.get("metadata")?.get("namespace")?.as_str())
                .collect();
            namespaces.sort_unstable();
            namespaces.dedup();
            namespaces.truncate(limits.max_namespaces);

            let node_id = crate::graph::model::Node::derive_id(&crd.kind, &crd.kind, None);
            if let Some(node) = analysis.graph.nodes.get_mut(&node_id) {
                node.labels
                    .insert("instances".to_string(), instances.len().to_string());
                node.labels
                    .insert("sampledNamespaces".to_string(), namespaces.len().to_string());
            }
        }
    }

    /// Inventory of API groups and their CRD counts/versions
    pub async fn api_groups(&self) -> Result<Vec<ApiGroupInfo>> {
        let crds = fetch::list_crds(&self.client, self.config.limits.max_crds * 4).await;
        Ok(api_group_inventory(&crds))
    }

    pub fn client(&self) -> &kube::Client {
        &self.client
    }
}
