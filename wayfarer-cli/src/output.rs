//! JSON envelopes written to stdout.

use std::io::Write;

use serde::Serialize;

use crate::CliError;

/// `{"success": true, "data": ...}` or
/// `{"success": false, "error": ..., "kind": ...}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Envelope<'a, T> {
    Success { success: bool, data: &'a T },
    Failure {
        success: bool,
        error: String,
        kind: &'static str,
    },
}

/// Write the envelope for `outcome` and hand the outcome back.
///
/// A failed outcome is still reported on stdout before its error is
/// returned, so callers exit non-zero after the envelope is flushed.
pub(crate) fn write_outcome<T: Serialize>(
    writer: &mut dyn Write,
    outcome: Result<T, CliError>,
) -> Result<(), CliError> {
    let envelope = match &outcome {
        Ok(data) => Envelope::Success {
            success: true,
            data,
        },
        Err(err) => Envelope::Failure {
            success: false,
            error: err.to_string(),
            kind: err.kind(),
        },
    };
    let payload = serde_json::to_string_pretty(&envelope).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    outcome.map(drop)
}
