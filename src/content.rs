use serde_json::Value;

use crate::models::{ActionItem, DetailItem, Horizon};

/// Coerce a heterogeneous model-produced list into canonical detail items.
///
/// Accepted element shapes: a bare string (becomes the title), or a keyed
/// record reading the title from `title` or its localized alias `titre` and
/// the description from `description`. Elements whose title is empty after
/// trimming are dropped, not defaulted. Non-list input yields an empty list.
pub fn detail_items(value: &Value) -> Vec<DetailItem> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries.iter().filter_map(coerce_item).collect()
}

/// Same coercion as [`detail_items`], with a horizon tag read from the
/// element's `priority` key and defaulting to `default` when absent or
/// unknown.
pub fn action_items(value: &Value, default: Horizon) -> Vec<ActionItem> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let item = coerce_item(entry)?;
            let priority = entry
                .get("priority")
                .and_then(Value::as_str)
                .and_then(parse_horizon)
                .unwrap_or(default);
            Some(ActionItem {
                title: item.title,
                description: item.description,
                priority,
            })
        })
        .collect()
}

fn coerce_item(entry: &Value) -> Option<DetailItem> {
    let (title, description) = match entry {
        Value::String(s) => (s.clone(), String::new()),
        Value::Object(map) => {
            let title = map
                .get("title")
                .or_else(|| map.get("titre"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let description = map
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (title, description)
        }
        _ => return None,
    };

    let title = title.trim().to_string();
    if title.is_empty() {
        return None;
    }
    Some(DetailItem {
        title,
        description: description.trim().to_string(),
    })
}

fn parse_horizon(raw: &str) -> Option<Horizon> {
    match raw {
        "short_term" => Some(Horizon::ShortTerm),
        "mid_term" => Some(Horizon::MidTerm),
        "long_term" => Some(Horizon::LongTerm),
        _ => None,
    }
}
