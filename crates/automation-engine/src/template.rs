//! Listing template variable substitution
//!
//! Templates use double-brace placeholders (`{{title}}`). Extraction feeds
//! the editor's variable hints; rendering fills a template from a value map.
//! Unknown placeholders are left literal so a half-filled template survives
//! a render instead of losing its remaining slots.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static VARIABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

/// Extract the distinct placeholder identifiers from a template.
///
/// Case-sensitive, deduplicated, ordered by first occurrence.
pub fn extract_variables(template: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut variables = Vec::new();
    for caps in VARIABLE_RE.captures_iter(template) {
        let name = &caps[1];
        if seen.insert(name.to_string()) {
            variables.push(name.to_string());
        }
    }
    variables
}

/// Render a template against a value map.
///
/// Every `{{identifier}}` with a matching key is replaced by the string form
/// of its value; identifiers absent from the map stay as-is.
pub fn render(template: &str, values: &HashMap<String, serde_json::Value>) -> String {
    VARIABLE_RE
        .replace_all(template, |caps: &regex::Captures| {
            match values.get(&caps[1]) {
                Some(value) => value_to_string(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// String form of a JSON value: strings render bare, everything else as JSON
fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
