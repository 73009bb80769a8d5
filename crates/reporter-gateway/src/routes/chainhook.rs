//! `POST /chainhook` - chainhook delivery intake.

use crate::error::{ApiError, ApiResult, ReportingFailure};
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode};
use chainhook_reporter::PipelineSummary;
use serde_json::Value;
use tracing::{info, warn};

pub const SUCCESS_MESSAGE: &str = "Events processed successfully.";

/// Handle a chainhook delivery.
///
/// `200` when every executed proposal was reported (or there were none),
/// `500` with per-proposal failures otherwise, `400` for a non-JSON body.
pub async fn handle_chainhook(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<(StatusCode, &'static str)> {
    let delivery: Value = serde_json::from_str(&body).map_err(|e| {
        state.metrics.record_rejected_delivery();
        warn!(error = %e, "Rejected chainhook delivery with unparsable body");
        ApiError::BadRequest(format!("Parse error: {e}"))
    })?;

    let result = state
        .reporting
        .handle_webhook(unwrap_envelope(&delivery))
        .await;
    state.metrics.record_delivery(&result);

    let counts = PipelineSummary::from(&result);
    let summary = result
        .into_result()
        .map_err(|err| ApiError::Reporting(ReportingFailure::new(counts, &err)))?;

    info!(
        detected = summary.detected,
        reported = summary.reported,
        skipped = summary.skipped,
        "Chainhook delivery processed"
    );
    Ok((StatusCode::OK, SUCCESS_MESSAGE))
}

/// Accept both `{ "payload": { "chainhook": … } }` and bare `{ "chainhook": … }`.
pub fn unwrap_envelope(delivery: &Value) -> &Value {
    match delivery.get("payload") {
        Some(inner) if inner.get("chainhook").is_some() => inner,
        _ => delivery,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_envelope_is_unwrapped() {
        let delivery = json!({ "payload": { "chainhook": { "blocks": [] } } });
        assert_eq!(
            unwrap_envelope(&delivery),
            &json!({ "chainhook": { "blocks": [] } })
        );
    }

    #[test]
    fn test_bare_form_is_kept() {
        let delivery = json!({ "chainhook": { "blocks": [] } });
        assert_eq!(unwrap_envelope(&delivery), &delivery);
    }

    #[test]
    fn test_unrelated_payload_key_is_kept() {
        let delivery = json!({ "payload": "opaque", "chainhook": { "blocks": [] } });
        assert_eq!(unwrap_envelope(&delivery), &delivery);
    }
}
