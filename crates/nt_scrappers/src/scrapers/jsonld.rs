use kuchikiki::NodeRef;
use nt_core::Result;
use serde_json::Value;

use crate::toolkit::dom;

/// Extracts authors from JSON-LD metadata under `scope`.
/// Returns a vector of author names, in document order.
pub fn extract_authors(scope: &NodeRef) -> Result<Vec<String>> {
    let mut authors = Vec::new();

    for script in dom::select_all(scope, "script[type='application/ld+json']")? {
        let Ok(json) = serde_json::from_str::<Value>(script.text_contents().trim()) else {
            continue;
        };
        collect_authors(&json, &mut authors);
    }

    authors.dedup();
    Ok(authors)
}

fn collect_authors(json: &Value, authors: &mut Vec<String>) {
    match json {
        // A top-level array or an `@graph` holds several entities.
        Value::Array(items) => items.iter().for_each(|item| collect_authors(item, authors)),
        Value::Object(obj) => {
            if let Some(graph) = obj.get("@graph") {
                collect_authors(graph, authors);
            }
            if let Some(author) = obj.get("author") {
                push_names(author, authors);
            }
        }
        _ => {}
    }
}

fn push_names(author: &Value, authors: &mut Vec<String>) {
    match author {
        Value::Array(arr) => arr.iter().for_each(|a| push_names(a, authors)),
        Value::Object(obj) => {
            if let Some(name) = obj.get("name").and_then(|n| n.as_str()) {
                push_name(name, authors);
            }
        }
        Value::String(s) => push_name(s, authors),
        _ => {}
    }
}

fn push_name(name: &str, authors: &mut Vec<String>) {
    let name = name.trim();
    if !name.is_empty() {
        authors.push(name.to_string());
    }
}
