//! Multipart image intake shared by the headshot and blog image endpoints

use axum::extract::Multipart;
use tracing::warn;

use crate::error::{validation_error, ApiError, FieldErrors};

/// Read the `file` part of a multipart body as `(bytes, content_type)`.
pub async fn read_file_field(mut multipart: Multipart) -> Result<(Vec<u8>, String), ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Malformed multipart body");
                return Err(file_error(&format!("Could not read upload: {}", e.body_text())));
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "Upload body could not be read");
            file_error("Could not read upload")
        })?;
        return Ok((bytes.to_vec(), content_type));
    }
    Err(file_error("A file is required"))
}

fn file_error(message: &str) -> ApiError {
    let mut errors = FieldErrors::new();
    errors.add("file", message);
    validation_error(errors)
}
