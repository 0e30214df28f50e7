use kube::api::Patch;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Metadata keys a client may change through the patch endpoint
pub const PATCHABLE_FIELDS: [&str; 3] = ["labels", "annotations", "finalizers"];

/// A metadata patch restricted to `PATCHABLE_FIELDS`
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataPatch {
    fields: Map<String, Value>,
}

impl MetadataPatch {
    /// Keep only patchable keys, silently dropping the rest
    ///
    /// Returns `None` when nothing patchable remains.
    pub fn filter(metadata: Map<String, Value>) -> Option<Self> {
        let (fields, dropped): (Map<String, Value>, Map<String, Value>) = metadata
            .into_iter()
            .partition(|(key, _)| PATCHABLE_FIELDS.contains(&key.as_str()));

        if !dropped.is_empty() {
            let keys: Vec<&str> = dropped.keys().map(String::as_str).collect();
            debug!(?keys, "Dropping non-patchable metadata fields");
        }

        (!fields.is_empty()).then_some(Self { fields })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Patch document sent to the API server
    pub fn to_body(&self) -> Value {
        json!({ "metadata": self.fields })
    }

    /// Strategic merge patch, so `finalizers` are merged into the existing list
    /// instead of replacing it
    pub fn to_patch(&self) -> Patch<Value> {
        Patch::Strategic(self.to_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_drops_unknown_fields() {
        let metadata = as_map(json!({
            "labels": {"a": "b"},
            "podSpec": {"containers": []},
        }));

        let patch = MetadataPatch::filter(metadata).unwrap();
        assert_eq!(patch.fields().len(), 1);
        assert_eq!(patch.to_body(), json!({"metadata": {"labels": {"a": "b"}}}));
    }

    #[test]
    fn test_keeps_all_patchable_fields() {
        let metadata = as_map(json!({
            "labels": {"team": "core"},
            "annotations": {"note": "hi"},
            "finalizers": ["example.com/cleanup"],
            "name": "renamed",
        }));

        let patch = MetadataPatch::filter(metadata).unwrap();
        let keys: Vec<&str> = patch.fields().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        for field in PATCHABLE_FIELDS {
            assert!(keys.contains(&field));
        }
    }

    #[test]
    fn test_sent_as_strategic_merge() {
        let metadata = as_map(json!({"finalizers": ["example.com/cleanup"]}));

        let patch = MetadataPatch::filter(metadata).unwrap();
        let Patch::Strategic(body) = patch.to_patch() else {
            panic!("expected strategic merge patch");
        };
        assert_eq!(
            body,
            json!({"metadata": {"finalizers": ["example.com/cleanup"]}})
        );
    }

    #[test]
    fn test_nothing_patchable() {
        assert!(MetadataPatch::filter(as_map(json!({"uid": "123"}))).is_none());
        assert!(MetadataPatch::filter(Map::new()).is_none());
    }
}
