use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug)]
pub enum ItemSource {
    FilePath(String),
    Inline(Vec<Value>),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read items file: {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse items file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("items file '{path}' must hold a list of records (or an object with an \"items\" list)")]
    NotAList { path: String },
}

/// Loads table items from JSON, JSON lines or YAML.
///
/// A top-level object is accepted when it wraps the list under `items`.
pub async fn load_items(source: &ItemSource) -> Result<Vec<Value>, DatasetError> {
    match source {
        ItemSource::Inline(values) => Ok(values.clone()),
        ItemSource::FilePath(path) => {
            let path = crate::config::expand_tilde_string(path);
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| DatasetError::FileRead {
                    path: path.clone(),
                    source: e,
                })?;
            parse_items(&path, &contents)
        }
    }
}

pub fn parse_items(path: &str, contents: &str) -> Result<Vec<Value>, DatasetError> {
    let lower = path.to_lowercase();
    let parsed: Value = if lower.ends_with(".jsonl") || lower.ends_with(".ndjson") {
        let mut items = Vec::new();
        for (i, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let item = serde_json::from_str(line).map_err(|e| DatasetError::Parse {
                path: path.to_string(),
                message: format!("line {}: {e}", i + 1),
            })?;
            items.push(item);
        }
        Value::Array(items)
    } else if lower.ends_with(".yml") || lower.ends_with(".yaml") {
        serde_yaml::from_str(contents).map_err(|e| DatasetError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?
    } else {
        serde_json::from_str(contents).map_err(|e| DatasetError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?
    };

    match parsed {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(DatasetError::NotAList {
                path: path.to_string(),
            }),
        },
        _ => Err(DatasetError::NotAList {
            path: path.to_string(),
        }),
    }
}
