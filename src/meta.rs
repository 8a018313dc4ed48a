use serde::Serialize;
use std::fs;
use std::path::Path;

/// Outcome of one pipeline invocation: exit statuses in segment order, the
/// final segment's status, and wall-clock duration. A non-zero status is
/// information, not an error.
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub pipestatus: Vec<i32>,
    pub exit_code: i32,
    pub elapsed_ms: u64,
}

impl PipelineResult {
    pub fn new(pipestatus: Vec<i32>, elapsed_ms: u64) -> Self {
        let exit_code = pipestatus.last().copied().unwrap_or(0);
        Self {
            pipestatus,
            exit_code,
            elapsed_ms,
        }
    }
}

/// Write the result as JSON. Sidecar failure never fails the pipeline; the
/// caller just reports the string.
pub fn write_meta(path: &str, result: &PipelineResult) -> Result<(), String> {
    let json = serde_json::to_string(result).map_err(|e| format!("json: {}", e))?;
    fs::write(Path::new(path), json).map_err(|e| format!("write: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_tracks_last_segment() {
        let result = PipelineResult::new(vec![1, 0, 42], 5);
        assert_eq!(result.exit_code, 42);
        assert_eq!(result.pipestatus, vec![1, 0, 42]);
    }

    #[test]
    fn test_result_serializable() {
        let result = PipelineResult::new(vec![0], 12);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"pipestatus\":[0]"));
        assert!(json.contains("\"exit_code\":0"));
        assert!(json.contains("\"elapsed_ms\":12"));
    }

    #[test]
    fn test_write_meta_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        let result = PipelineResult::new(vec![1, 0], 3);
        write_meta(path.to_str().unwrap(), &result).unwrap();

        let v: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["pipestatus"], serde_json::json!([1, 0]));
        assert_eq!(v["exit_code"], 0);
    }
}
