//! Cassette loading for replay.

use std::path::Path;

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Load a cassette file and create a replayer.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_cassette(path: &Path) -> Result<CassetteReplayer, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
    let cassette: Cassette = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
    Ok(CassetteReplayer::new(&cassette))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Interaction, CV_PROCESS_METHOD, VISUAL_SERVICE_PORT};
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn load_valid_cassette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.cassette.yaml");

        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions: vec![Interaction {
                seq: 0,
                port: VISUAL_SERVICE_PORT.into(),
                method: CV_PROCESS_METHOD.into(),
                input: json!({}),
                output: json!({"Ok": {"code": 10000}}),
            }],
        };
        std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        let mut replayer = load_cassette(&path).unwrap();
        let i = replayer.next_interaction(VISUAL_SERVICE_PORT, CV_PROCESS_METHOD).unwrap();
        assert_eq!(i.seq, 0);
    }

    #[test]
    fn load_json_flavoured_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.cassette.yaml");
        std::fs::write(
            &path,
            r#"{"name": "flow", "recorded_at": "2026-02-01T00:00:00Z", "commit": "x",
                "interactions": [{"seq": 0, "port": "visual_service", "method": "cv_process",
                                  "input": {}, "output": {"Err": "boom"}}]}"#,
        )
        .unwrap();

        let mut replayer = load_cassette(&path).unwrap();
        let i = replayer.next_interaction(VISUAL_SERVICE_PORT, CV_PROCESS_METHOD).unwrap();
        assert_eq!(i.output, json!({"Err": "boom"}));
    }

    #[test]
    fn load_nonexistent_fails() {
        assert!(load_cassette(Path::new("/nonexistent/cassette.yaml")).is_err());
    }
}
