use kubegraph_types::Labels;

/// Check whether `labels` satisfies an equality-based selector
///
/// Every `(key, value)` in the selector must be present in `labels` with an
/// equal value. An empty selector matches everything.
pub fn selector_matches(selector: &Labels, labels: &Labels) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}
