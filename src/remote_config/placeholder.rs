//! Placeholder substitution over JSON trees.

use serde_json::Value;

/// Call `visit` on every string leaf under `value`, depth first.
///
/// Object keys are not visited. Numbers, booleans and null are skipped.
pub fn visit_strings_mut<F>(value: &mut Value, visit: &mut F)
where
    F: FnMut(&mut String),
{
    match value {
        Value::String(s) => visit(s),
        Value::Array(items) => {
            for item in items {
                visit_strings_mut(item, visit);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                visit_strings_mut(item, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// A fixed token and the runtime value it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    token: String,
    replacement: String,
}

impl Placeholder {
    pub fn new(token: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            replacement: replacement.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Replace every occurrence of the token in every string of `value`.
    /// Returns the number of strings changed.
    pub fn apply(&self, value: &mut Value) -> usize {
        if self.token.is_empty() {
            return 0;
        }

        let mut changed = 0;
        visit_strings_mut(value, &mut |s: &mut String| {
            if s.contains(&self.token) {
                *s = s.replace(&self.token, &self.replacement);
                changed += 1;
            }
        });
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file_server() -> Placeholder {
        Placeholder::new("{file_server}", "https://cdn.example.com")
    }

    #[test]
    fn test_replaces_nested_strings() {
        let mut doc = json!({
            "lastUpdatedAt": 7,
            "files": [{
                "name": "a",
                "description": "mirror of {file_server}",
                "versions": { "*": { "location": { "url": "{file_server}/assets/a.json" } } }
            }]
        });

        assert_eq!(file_server().apply(&mut doc), 2);
        assert_eq!(
            doc["files"][0]["versions"]["*"]["location"]["url"],
            json!("https://cdn.example.com/assets/a.json")
        );
        assert_eq!(doc["files"][0]["description"], json!("mirror of https://cdn.example.com"));
        assert_eq!(doc["lastUpdatedAt"], json!(7));
    }

    #[test]
    fn test_document_without_tokens_unchanged() {
        let original = json!({
            "lastUpdatedAt": 1,
            "files": [{ "name": "a", "ok": true, "n": null, "list": ["x", 1.5] }]
        });
        let mut doc = original.clone();

        assert_eq!(file_server().apply(&mut doc), 0);
        assert_eq!(doc, original);
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let mut once = json!({ "a": ["{file_server}/x", { "b": "{file_server}{file_server}" }] });
        file_server().apply(&mut once);
        let mut twice = once.clone();
        file_server().apply(&mut twice);

        assert_eq!(once, twice);
        assert_eq!(once["a"][1]["b"], json!("https://cdn.example.comhttps://cdn.example.com"));
    }

    #[test]
    fn test_keys_are_not_rewritten() {
        let mut doc = json!({ "{file_server}": "{file_server}" });
        file_server().apply(&mut doc);
        assert_eq!(doc, json!({ "{file_server}": "https://cdn.example.com" }));
    }
}
