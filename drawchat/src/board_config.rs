//! Loading the board configuration document attached to a link.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key under which the replay hint is stored.
pub const TIMESTAMP_KEY: &str = "timestamp";

#[derive(Debug, thiserror::Error)]
pub enum BoardConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("a timestamp needs the board configuration to be a JSON object")]
    NotAnObject,
}

/// Read a board configuration file, optionally stamping it with the current
/// time in milliseconds.
///
/// With no file and no timestamp there is nothing to attach and `None` is
/// returned.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if a timestamp
/// is requested for a document that is not an object.
pub fn load_board_config(path: Option<&Path>, timestamp: bool) -> Result<Option<Value>, BoardConfigError> {
    let board_config = path.map(read_board_config).transpose()?;
    if timestamp {
        let now = chrono::Utc::now().timestamp_millis();
        return with_timestamp(board_config, now).map(Some);
    }
    Ok(board_config)
}

/// Insert `millis` under [`TIMESTAMP_KEY`], starting from an empty object
/// when there is no document yet. An existing timestamp is replaced.
///
/// # Errors
/// Returns `BoardConfigError::NotAnObject` if the document is not a JSON object.
pub fn with_timestamp(board_config: Option<Value>, millis: i64) -> Result<Value, BoardConfigError> {
    let mut board_config = board_config.unwrap_or_else(|| Value::Object(Map::new()));
    let Value::Object(map) = &mut board_config else {
        return Err(BoardConfigError::NotAnObject);
    };
    map.insert(TIMESTAMP_KEY.to_string(), Value::from(millis));
    Ok(board_config)
}

fn read_board_config(path: &Path) -> Result<Value, BoardConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| BoardConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| BoardConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("drawchat-board-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn timestamp_is_added_to_existing_object() {
        let stamped = with_timestamp(Some(json!({"defaultTool": "pen"})), 1_700_000_000_123).unwrap();
        assert_eq!(stamped, json!({"defaultTool": "pen", "timestamp": 1_700_000_000_123_i64}));
    }

    #[test]
    fn timestamp_without_file_creates_object() {
        let stamped = with_timestamp(None, 42).unwrap();
        assert_eq!(stamped, json!({"timestamp": 42}));
    }

    #[test]
    fn timestamp_replaces_previous_value() {
        let stamped = with_timestamp(Some(json!({"timestamp": 1})), 2).unwrap();
        assert_eq!(stamped, json!({"timestamp": 2}));
    }

    #[test]
    fn timestamp_rejects_non_object_document() {
        for document in [json!(["pen"]), json!("pen"), json!(3), Value::Null] {
            assert!(matches!(
                with_timestamp(Some(document), 1),
                Err(BoardConfigError::NotAnObject)
            ));
        }
    }

    #[test]
    fn load_without_file_or_timestamp_is_none() {
        assert!(load_board_config(None, false).unwrap().is_none());
    }

    #[test]
    fn load_with_timestamp_uses_current_millis() {
        let before = chrono::Utc::now().timestamp_millis();
        let loaded = load_board_config(None, true).unwrap().unwrap();
        let after = chrono::Utc::now().timestamp_millis();
        let stamp = loaded[TIMESTAMP_KEY].as_i64().unwrap();
        assert!((before..=after).contains(&stamp));
    }

    #[test]
    fn load_reads_and_stamps_file() {
        let path = temp_file("stamped.json", r#"{"toolbar": ["pen"]}"#);
        let loaded = load_board_config(Some(&path), true).unwrap().unwrap();
        assert_eq!(loaded["toolbar"], json!(["pen"]));
        assert!(loaded[TIMESTAMP_KEY].is_i64());
    }

    #[test]
    fn load_rejects_array_file_with_timestamp() {
        let path = temp_file("array.json", r#"["pen"]"#);
        assert!(matches!(
            load_board_config(Some(&path), true),
            Err(BoardConfigError::NotAnObject)
        ));
        // Without a timestamp the document is passed through untouched
        assert_eq!(load_board_config(Some(&path), false).unwrap(), Some(json!(["pen"])));
    }

    #[test]
    fn load_reports_invalid_json() {
        let path = temp_file("broken.json", "{not json");
        assert!(matches!(
            load_board_config(Some(&path), false),
            Err(BoardConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let path = Path::new("/nonexistent/drawchat/board.json");
        assert!(matches!(
            load_board_config(Some(path), false),
            Err(BoardConfigError::Io { .. })
        ));
    }
}
