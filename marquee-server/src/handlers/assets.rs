use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Accepts one `file` part, stores it under a generated name and returns
/// the public path. The original file name only contributes its extension,
/// and only when that extension is a plain alphanumeric token.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Value>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {}", err)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(sanitized_extension)
            .unwrap_or_else(|| "bin".to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::bad_request(format!("failed to read upload: {}", err)))?;

        if bytes.is_empty() {
            return Err(AppError::bad_request("uploaded file is empty"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::bad_request("uploaded file is too large"));
        }

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = state.config.upload_root.join(&file_name);

        tokio::fs::write(&path, &bytes).await.map_err(|err| {
            tracing::error!(error = %err, path = %path.display(), "asset write failed");
            AppError::internal("failed to store upload")
        })?;

        tracing::info!(file = %file_name, size = bytes.len(), "asset uploaded");
        return Ok((
            StatusCode::CREATED,
            Json(json!({ "url": format!("/uploads/{}", file_name) })),
        ));
    }

    Err(AppError::bad_request("missing file field"))
}

fn sanitized_extension(file_name: &str) -> Option<String> {
    let ext = file_name.rsplit('.').next()?;
    if ext.is_empty()
        || ext.len() > 8
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("poster.png"), Some("png".to_string()));
        assert_eq!(sanitized_extension("a.b.JPEG"), Some("jpeg".to_string()));
        assert_eq!(sanitized_extension("../../etc/passwd"), None);
        assert_eq!(sanitized_extension("noext"), Some("noext".to_string()));
        assert_eq!(sanitized_extension("trailing."), None);
    }
}
