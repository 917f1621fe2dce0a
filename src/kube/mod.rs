//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides a
//! configured client for use throughout the application.
//!
//! Supports HTTP/HTTPS proxy configuration via standard environment variables:
//! - `HTTP_PROXY` / `http_proxy`: HTTP proxy URL
//! - `HTTPS_PROXY` / `https_proxy`: HTTPS proxy URL
//! - `NO_PROXY` / `no_proxy`: Comma-separated list of hosts to bypass proxy
//!
//! Automatically detects internal cluster hosts and adds them to NO_PROXY
//! to prevent proxy issues with corporate environments.

pub mod cache;
pub mod fetch;

pub use cache::ResourceCache;

use anyhow::Result;
use kube::{Client, Config};
use url::Url;

/// Initialize and return a Kubernetes client with automatic proxy support
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer().await?;

    // Extract cluster host for NO_PROXY auto-detection
    let cluster_url_str = config.cluster_url.to_string();
    if let Ok(url) = Url::parse(&cluster_url_str) {
        if let Some(host) = url.host_str() {
            ensure_no_proxy_bypass(host);
        }
    }

    let client = Client::try_from(config)?;
    Ok(client)
}

/// Ensure that a host is included in NO_PROXY for proxy bypass
///
/// Internal Kubernetes API servers should bypass a corporate proxy; this
/// adds the detected cluster host to NO_PROXY when it is not already
/// covered by an existing pattern.
fn ensure_no_proxy_bypass(host: &str) {
    if !is_internal_host(host) {
        return;
    }

    let no_proxy = std::env::var("NO_PROXY").unwrap_or_default();
    let no_proxy_lower = std::env::var("no_proxy").unwrap_or_default();

    // NO_PROXY takes precedence over no_proxy
    let current_no_proxy = if !no_proxy.is_empty() {
        no_proxy
    } else {
        no_proxy_lower
    };

    if no_proxy_contains(&current_no_proxy, host) {
        return;
    }

    let updated_no_proxy = if current_no_proxy.is_empty() {
        host.to_string()
    } else {
        format!("{},{}", current_no_proxy, host)
    };

    // SAFETY: called once during client construction, before any worker
    // threads read the proxy environment
    unsafe {
        // Set both uppercase and lowercase variants for compatibility
        std::env::set_var("NO_PROXY", &updated_no_proxy);
        std::env::set_var("no_proxy", &updated_no_proxy);
    }
}

/// Check if a host looks like an internal/private domain
///
/// Detects private IP ranges, localhost, and common internal TLD patterns
/// (.local, .internal, .cluster.local, corporate dev/test subdomains).
fn is_internal_host(host: &str) -> bool {
    if host.starts_with("10.")
        || host.starts_with("172.")
        || host.starts_with("192.168.")
        || host == "localhost"
        || host == "127.0.0.1"
        || host == "::1"
    {
        return true;
    }

    if host.ends_with(".local")
        || host.ends_with(".internal")
        || host.ends_with(".cluster.local")
        || host.ends_with(".svc.cluster.local")
    {
        return true;
    }

    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        let domain = parts[parts.len() - 2];
        if matches!(domain, "corp" | "internal" | "int" | "local") {
            return true;
        }
        for part in &parts {
            if (part.starts_with("dev")
                || part.starts_with("test")
                || part.starts_with("staging")
                || part.starts_with("qa")
                || part.starts_with("uat")
                || part.starts_with("internal"))
                && part != parts.last().unwrap()
            {
                return true;
            }
        }
    }

    false
}

/// Check if NO_PROXY already contains the host (handles wildcard patterns)
fn no_proxy_contains(no_proxy: &str, host: &str) -> bool {
    if no_proxy.is_empty() {
        return false;
    }

    no_proxy
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .any(|pattern| {
            if pattern == host {
                return true;
            }

            // Wildcard pattern like .example.com matches subdomains
            if let Some(suffix) = pattern.strip_prefix('.') {
                if host == suffix || host.ends_with(&format!(".{}", suffix)) {
                    return true;
                }
            }

            // Pattern like example.com matches both example.com and *.example.com
            if host.ends_with(&format!(".{}", pattern)) {
                return true;
            }

            false
        })
}

/// Get the default namespace scope for graph computations
///
/// NAMESPACE environment variable overrides; empty, "all", or "-A" mean
/// cluster-wide (no namespace filter).
pub fn get_default_namespace() -> Option<String> {
    if let Ok(ns) = std::env::var("NAMESPACE") {
        if ns.is_empty() || ns == "all" || ns == "-A" {
            return None;
        }
        return Some(ns);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_internal_host_private_ips() {
        assert!(is_internal_host("10.0.0.1"));
        assert!(is_internal_host("172.16.0.1"));
        assert!(is_internal_host("192.168.1.1"));
        assert!(is_internal_host("localhost"));
        assert!(is_internal_host("127.0.0.1"));
    }

    #[test]
    fn test_is_internal_host_internal_tlds() {
        assert!(is_internal_host("example.local"));
        assert!(is_internal_host("cluster.internal"));
        assert!(is_internal_host("pod.svc.cluster.local"));
    }

    #[test]
    fn test_is_internal_host_public_domains() {
        assert!(!is_internal_host("example.com"));
        assert!(!is_internal_host("api.github.com"));
        assert!(!is_internal_host("kubernetes.io"));
    }

    #[test]
    fn test_no_proxy_contains_exact_and_wildcard() {
        assert!(no_proxy_contains("example.com", "example.com"));
        assert!(no_proxy_contains(".example.com", "sub.example.com"));
        assert!(no_proxy_contains("example.com", "sub.example.com"));
        assert!(!no_proxy_contains("other.com", "example.com"));
        assert!(!no_proxy_contains("", "example.com"));
    }
}
