use serde_json::Value;
use tracing::debug;

/// Best-effort extraction of a JSON object from a model response.
///
/// Models are asked for raw JSON but routinely wrap it in prose or a
/// markdown fence. The recovery ladder:
///
/// 1. strip a ```json / ``` fence if present,
/// 2. try a direct parse,
/// 3. try the substring between the first `{` and the last `}` (inclusive),
/// 4. give up and return an empty object.
///
/// Callers must treat the empty object exactly like a missing field. The
/// bracket substring is not guaranteed minimal when the text contains
/// several JSON objects; that imprecision is accepted.
pub fn recover_json(raw: &str) -> Value {
    let candidate = strip_fences(raw);

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
        return Value::Object(map);
    }

    let first = candidate.find('{');
    let last = candidate.rfind('}');
    if let (Some(first), Some(last)) = (first, last) {
        if last > first {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&candidate[first..=last])
            {
                return Value::Object(map);
            }
        }
    }

    debug!(len = raw.len(), "no JSON object recovered from model response");
    Value::Object(serde_json::Map::new())
}

fn strip_fences(response: &str) -> &str {
    if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(response)
            .trim()
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(response)
            .trim()
    } else {
        response.trim()
    }
}
