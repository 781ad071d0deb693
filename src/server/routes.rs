use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::classifier::{PipelineContext, PipelineError, Upload};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Reports whether the classifier artifact and embedding network are usable,
/// so the UI can explain a disabled pipeline before anyone uploads.
pub async fn model_status(State(context): State<PipelineContext>) -> impl IntoResponse {
    Json(context.status())
}

/// Accepts a multipart form with an `image` field and runs it through the
/// gate and pipeline. One request, one prediction cycle, no retries.
pub async fn predict(
    State(context): State<PipelineContext>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut upload: Option<Upload> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some(Upload::new(file_name, bytes.to_vec()));
                        break;
                    }
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(serde_json::json!({
                                "error": "bad_request",
                                "message": format!("Failed to read upload: {}", e),
                            })),
                        )
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": "bad_request",
                        "message": format!("Malformed multipart body: {}", e),
                    })),
                )
            }
        }
    }

    let Some(upload) = upload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "bad_request",
                "message": "Missing 'image' field in upload",
            })),
        );
    };

    match context.classify(&upload) {
        Ok(prediction) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "label": prediction.label,
                "scores": prediction.scores,
            })),
        ),
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &PipelineError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        PipelineError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        PipelineError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        PipelineError::ImageDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::ModelUnavailable | PipelineError::EmbedderUnavailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        PipelineError::FeatureExtraction(_) | PipelineError::Prediction(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(serde_json::json!({
            "error": err.kind(),
            "message": err.to_string(),
        })),
    )
}
