//! Replaying adapters that serve recorded interactions from cassettes.

pub mod visual_service;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;
use crate::error::AdapterError;

/// Retrieve the next recorded output for a given port and method.
///
/// # Errors
///
/// Returns an error if the cassette has no more interactions for the pair.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, AdapterError> {
    let mut guard =
        replayer.lock().map_err(|e| AdapterError::Replay(format!("Replayer lock poisoned: {e}")))?;
    let interaction = guard.next_interaction(port, method).map_err(AdapterError::Replay)?;
    Ok(interaction.output.clone())
}

/// Deserialize a replayed output as `Result<T, AdapterError>`.
///
/// A recorded `Err` comes back verbatim as the error message.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, AdapterError> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Err(AdapterError::Replay(msg));
    }
    let ok_val = match output.get("Ok").or_else(|| output.get("ok")) {
        Some(v) => v.clone(),
        None => output,
    };
    serde_json::from_value(ok_val)
        .map_err(|e| AdapterError::Replay(format!("Malformed cassette output: {e}")))
}
