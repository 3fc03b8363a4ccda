use serde_json::Value;

/// Walks a dot-separated path (`customer.address.city`) through nested objects.
///
/// Returns `None` as soon as a segment is missing or the current value cannot
/// be descended into. Numeric segments index into arrays (`lines.0.sku`).
pub fn resolve<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(item, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
        _ => None,
    })
}

/// String form used for search matching and cell rendering.
///
/// `null` and objects have no searchable form.
pub fn searchable_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(n)),
        Value::String(s) => Some(s.clone()),
        Value::Array(list) => Some(
            list.iter()
                .map(|v| searchable_text(v).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
        if f.fract() == 0.0 && f.abs() < 1e15 {
            return format!("{}", f as i64);
        }
    }
    n.to_string()
}
