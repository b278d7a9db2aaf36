//! The single JSON result line handed to the parent process.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

use crate::error::AdapterError;
use crate::generation::OutputArtifact;

/// Request id reported when the upstream did not send one.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultReport {
    /// The image was generated and saved.
    Success(SuccessReport),
    /// Something went wrong.
    Failure(FailureReport),
}

/// Body of a success report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessReport {
    /// Always `true`.
    pub success: bool,
    /// Upstream request id, or `"unknown"`.
    pub original_id: String,
    /// Name of the written file, relative to the output directory.
    pub filename: String,
}

/// Body of a failure report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    /// Human-readable error message.
    pub error: String,
    /// Raw upstream response, when the upstream rejected the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ResultReport {
    /// Success report for a saved artifact.
    #[must_use]
    pub fn success(original_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::Success(SuccessReport {
            success: true,
            original_id: original_id.into(),
            filename: filename.into(),
        })
    }

    /// Failure report for `error`.
    #[must_use]
    pub fn failure(error: &AdapterError) -> Self {
        Self::Failure(FailureReport { error: error.to_string(), details: error.details().cloned() })
    }

    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::Failure(_) => 1,
        }
    }

    /// Render as one line of JSON, spaced the way Python's `json.dumps` does.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        if self.serialize(&mut serializer).is_err() {
            return r#"{"error": "Failed to serialize result"}"#.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Write the JSON line to `out` and flush it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn emit(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.to_json_line())?;
        out.flush()
    }
}

impl From<Result<OutputArtifact, AdapterError>> for ResultReport {
    fn from(result: Result<OutputArtifact, AdapterError>) -> Self {
        match result {
            Ok(artifact) => Self::success(
                artifact.request_id.unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string()),
                artifact.filename,
            ),
            Err(e) => Self::failure(&e),
        }
    }
}

/// Compact JSON with `", "` and `": "` separators and ASCII-only strings.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_arguments_line() {
        let report = ResultReport::failure(&AdapterError::MissingArguments);
        assert_eq!(report.to_json_line(), r#"{"error": "Missing arguments"}"#);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn success_line_key_order() {
        let report = ResultReport::success("req123", "dream_py_1.png");
        assert_eq!(
            report.to_json_line(),
            r#"{"success": true, "original_id": "req123", "filename": "dream_py_1.png"}"#
        );
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn api_failure_includes_details_in_upstream_order() {
        let details = json!({"message": "bad prompt", "code": 50000, "data": null});
        let err = AdapterError::Api { message: "bad prompt".into(), details };
        assert_eq!(
            ResultReport::failure(&err).to_json_line(),
            r#"{"error": "API Error: bad prompt", "details": {"message": "bad prompt", "code": 50000, "data": null}}"#
        );
    }

    #[test]
    fn nested_arrays_are_spaced() {
        let err = AdapterError::Api {
            message: "x".into(),
            details: json!({"list": [1, [2, 3]]}),
        };
        let line = ResultReport::failure(&err).to_json_line();
        assert!(line.ends_with(r#""details": {"list": [1, [2, 3]]}}"#));
    }

    #[test]
    fn non_ascii_is_escaped() {
        let report = ResultReport::failure(&AdapterError::Replay("图片 ok 😀".into()));
        assert_eq!(report.to_json_line(), r#"{"error": "\u56fe\u7247 ok \ud83d\ude00"}"#);
    }

    #[test]
    fn escapes_still_apply() {
        let report = ResultReport::failure(&AdapterError::Replay("line\n\"quoted\"".into()));
        assert_eq!(report.to_json_line(), r#"{"error": "line\n\"quoted\""}"#);
    }

    #[test]
    fn emit_writes_single_line() {
        let mut out = Vec::new();
        ResultReport::success("id", "f.png").emit(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn from_result_defaults_request_id() {
        let artifact = OutputArtifact {
            filename: "dream_py_5.png".into(),
            path: "out/dream_py_5.png".into(),
            request_id: None,
        };
        assert_eq!(
            ResultReport::from(Ok(artifact)),
            ResultReport::success("unknown", "dream_py_5.png")
        );
    }
}
