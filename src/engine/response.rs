use crate::error::AnalysisError;
use crate::model::AnalysisResult;
use reqwest::StatusCode;
use serde_json::Value;

/// Classify a `/predict` response.
///
/// - 2xx with `success: true` and a well-formed body is a result.
/// - 2xx with `success: false`, or any non-2xx JSON body, is a
///   server-reported failure carrying the optional `error` text.
/// - A body that is not JSON, or a 2xx body without a boolean `success`, is a
///   transport failure.
pub fn interpret_response(
    status: StatusCode,
    body: &[u8],
) -> Result<AnalysisResult, AnalysisError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        AnalysisError::Transport(format!("HTTP {status}: response body is not JSON: {e}"))
    })?;

    if !status.is_success() {
        return Err(AnalysisError::Server(error_text(&value)));
    }

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => return Err(AnalysisError::Server(error_text(&value))),
        None => {
            return Err(AnalysisError::Transport(format!(
                "HTTP {status}: body has no boolean success flag"
            )))
        }
    }

    let result: AnalysisResult = serde_json::from_value(value).map_err(|e| {
        AnalysisError::Transport(format!("HTTP {status}: malformed success body: {e}"))
    })?;

    if result.prediction.trim().is_empty() {
        return Err(AnalysisError::Transport(format!(
            "HTTP {status}: success body has an empty prediction"
        )));
    }

    Ok(result)
}

/// The `error` field, when the body is an object carrying a string there.
fn error_text(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SERVER_FALLBACK_MESSAGE, TRANSPORT_MESSAGE};

    #[test]
    fn full_success_body_parses() {
        let body = br#"{
            "success": true,
            "prediction": "Real Images",
            "confidence": 0.91,
            "percentage": "91.00%",
            "raw_probability": 0.91,
            "details": {"ai_generated_probability": 0.09, "real_image_probability": 0.91}
        }"#;
        let r = interpret_response(StatusCode::OK, body).unwrap();
        assert_eq!(r.prediction, "Real Images");
        assert_eq!(r.confidence, Some(0.91));
        assert_eq!(
            r.details.unwrap().real_image_probability,
            Some(0.91)
        );
    }

    #[test]
    fn error_status_uses_server_message() {
        let err = interpret_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"model unavailable"}"#,
        )
        .unwrap_err();
        assert_eq!(err, AnalysisError::Server(Some("model unavailable".into())));
        assert_eq!(err.user_message(), "model unavailable");
    }

    #[test]
    fn error_status_without_message_uses_fallback() {
        let err = interpret_response(StatusCode::BAD_REQUEST, b"{}").unwrap_err();
        assert_eq!(err.user_message(), SERVER_FALLBACK_MESSAGE);

        let err = interpret_response(StatusCode::BAD_GATEWAY, b"[1,2]").unwrap_err();
        assert_eq!(err, AnalysisError::Server(None));
    }

    #[test]
    fn success_status_with_failure_flag_is_server_error() {
        let err = interpret_response(
            StatusCode::OK,
            br#"{"success":false,"error":"could not decode image"}"#,
        )
        .unwrap_err();
        assert_eq!(err.user_message(), "could not decode image");
    }

    #[test]
    fn undecodable_bodies_are_transport_errors() {
        let html = b"<html>502 Bad Gateway</html>";
        for status in [StatusCode::OK, StatusCode::BAD_GATEWAY] {
            let err = interpret_response(status, html).unwrap_err();
            assert!(matches!(err, AnalysisError::Transport(_)));
            assert_eq!(err.user_message(), TRANSPORT_MESSAGE);
        }
    }

    #[test]
    fn success_status_without_success_flag_is_transport_error() {
        let bodies: [&[u8]; 5] = [
            b"{}",
            b"null",
            br#""ok""#,
            br#"{"prediction":"Real Images","confidence":0.9}"#,
            br#"{"success":"yes","prediction":"Real Images"}"#,
        ];
        for body in bodies {
            let err = interpret_response(StatusCode::OK, body).unwrap_err();
            assert!(matches!(err, AnalysisError::Transport(_)), "{err:?}");
            assert_eq!(err.user_message(), TRANSPORT_MESSAGE);
        }
    }

    #[test]
    fn non_string_error_field_does_not_change_classification() {
        let r = interpret_response(
            StatusCode::OK,
            br#"{"success":true,"prediction":"Real Images","error":{"code":0}}"#,
        )
        .unwrap();
        assert_eq!(r.prediction, "Real Images");

        let err = interpret_response(StatusCode::OK, br#"{"success":false,"error":42}"#)
            .unwrap_err();
        assert_eq!(err, AnalysisError::Server(None));
        assert_eq!(err.user_message(), SERVER_FALLBACK_MESSAGE);
    }

    #[test]
    fn success_flag_without_prediction_is_transport_error() {
        let err = interpret_response(StatusCode::OK, br#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));

        let err = interpret_response(StatusCode::OK, br#"{"success":true,"prediction":""}"#)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
    }
}
