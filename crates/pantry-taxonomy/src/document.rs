use serde_json::Value;
use tracing::debug;

use pantry_types::Category;

/// Parse the body of the remote taxonomy document.
///
/// The document is expected to be a JSON array of `{id, key, label}`
/// objects. Anything else (invalid JSON, an object, a scalar) yields an empty
/// list rather than an error; callers treat empty as "no usable data".
///
/// Entries are checked one by one: `key` and `label` must be strings and
/// `key` must be non-empty. Bad entries are dropped. A missing or non-string
/// `id` falls back to the key.
pub fn parse_category_document(body: &[u8]) -> Vec<Category> {
    let entries = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            debug!("taxonomy document is not a list");
            return Vec::new();
        }
        Err(e) => {
            debug!(error = %e, "taxonomy document is not valid JSON");
            return Vec::new();
        }
    };

    let total = entries.len();
    let categories: Vec<Category> = entries.iter().filter_map(category_from_entry).collect();
    if categories.len() != total {
        debug!(dropped = total - categories.len(), "dropped malformed taxonomy entries");
    }
    categories
}

fn category_from_entry(entry: &Value) -> Option<Category> {
    let key = entry.get("key")?.as_str()?;
    let label = entry.get("label")?.as_str()?;
    if key.is_empty() {
        return None;
    }
    let id = entry.get("id").and_then(Value::as_str).unwrap_or(key);
    Some(Category::new(id, key, label))
}
