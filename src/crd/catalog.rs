//! Static catalogs used by the schema analyzer
//!
//! Read-only tables shared across requests: the well-known core kinds and
//! the field-name suffixes that conventionally mark a reference to another
//! resource.

use crate::graph::model::RelationshipType;
use crate::models::KnownKind;

/// Field-name suffixes that conventionally denote a reference to another
/// resource (`secretRef`, `configMapName`, `podSelector`, ...)
pub const REFERENCE_SUFFIXES: &[&str] = &["Ref", "Name", "Selector", "Template", "Spec"];

/// Map a referenced kind to the relationship type used for its schema edges
pub fn relationship_for_kind(kind: &str) -> RelationshipType {
    match KnownKind::parse_optional(kind) {
        Some(KnownKind::ConfigMap) => RelationshipType::ConfigMap,
        Some(KnownKind::Secret) => RelationshipType::Secret,
        Some(KnownKind::ServiceAccount) => RelationshipType::ServiceAccount,
        Some(KnownKind::Service) | Some(KnownKind::Ingress) => RelationshipType::Service,
        Some(KnownKind::NetworkPolicy) => RelationshipType::Network,
        Some(KnownKind::PersistentVolumeClaim)
        | Some(KnownKind::PersistentVolume)
        | Some(KnownKind::StorageClass) => RelationshipType::Volume,
        Some(KnownKind::Node) => RelationshipType::Scheduling,
        _ => RelationshipType::Custom,
    }
}

/// Does `field_name` lexically reference `kind`?
///
/// Matches the bare kind name or the kind name followed by a conventional
/// reference suffix, case-insensitively on the leading character
/// (`secretRef` and `SecretRef` both match `Secret`).
pub fn field_references_kind(field_name: &str, kind: &str) -> bool {
    let field = field_name.to_lowercase();
    let kind = kind.to_lowercase();

    if field == kind {
        return true;
    }
    for suffix in REFERENCE_SUFFIXES {
        if field == format!("{}{}", kind, suffix.to_lowercase()) {
            return true;
        }
    }
    false
}

/// Does `text` mention `kind` as a whole word, case-insensitively?
///
/// Whole-word matching keeps "Secret" from matching inside "secretless";
/// kind-mention heuristics are noisy enough without substring hits.
pub fn text_mentions_kind(text: &str, kind: &str) -> bool {
    let kind = kind.to_lowercase();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_references_kind() {
        assert!(field_references_kind("secretRef", "Secret"));
        assert!(field_references_kind("configMapName", "ConfigMap"));
        assert!(field_references_kind("podSelector", "Pod"));
        assert!(field_references_kind("serviceAccount", "ServiceAccount"));
        assert!(!field_references_kind("secrets", "Secret"));
        assert!(!field_references_kind("replicas", "ReplicaSet"));
    }

    #[test]
    fn test_text_mentions_kind_whole_word() {
        assert!(text_mentions_kind("Name of the Secret to mount", "Secret"));
        assert!(text_mentions_kind("references a configmap", "ConfigMap"));
        assert!(!text_mentions_kind("a secretless workflow", "Secret"));
        assert!(!text_mentions_kind("", "Secret"));
    }

    #[test]
    fn test_relationship_for_kind() {
        assert_eq!(relationship_for_kind("Secret"), RelationshipType::Secret);
        assert_eq!(relationship_for_kind("StorageClass"), RelationshipType::Volume);
        assert_eq!(relationship_for_kind("SomeCustomKind"), RelationshipType::Custom);
    }
}
