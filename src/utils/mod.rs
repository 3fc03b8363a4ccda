use std::collections::HashSet;

/// Splits a comma-separated list of field paths, dropping blanks and repeats.
pub fn parse_field_list_csv(value: &str) -> Result<Vec<String>, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("field list is empty".to_string());
    }
    let mut out: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for part in raw.split(',') {
        let item = part.trim().trim_matches('.');
        if item.is_empty() {
            continue;
        }
        if item.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(format!("invalid field path '{item}'"));
        }
        if seen.insert(item.to_string()) {
            out.push(item.to_string());
        }
    }
    if out.is_empty() {
        return Err("field list is empty".to_string());
    }
    Ok(out)
}

pub fn parse_page_number(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err("expected a page number starting at 1".to_string()),
        Ok(n) => Ok(n),
    }
}
