use actix_multipart::Multipart;
use futures::TryStreamExt;

use crate::{
    errors::{AppError, AppResult},
    services::resource_service::{UploadedFile, MAX_UPLOAD_BYTES},
};

fn multipart_error(err: impl std::fmt::Display) -> AppError {
    AppError::ValidationError(format!("Formulario de carga inválido: {}", err))
}

/// Reads the file sent under `field_name`, ignoring any other part.
pub async fn read_file_field(mut payload: Multipart, field_name: &str) -> AppResult<UploadedFile> {
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) {
            while field.try_next().await.map_err(multipart_error)?.is_some() {}
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                AppError::ValidationError("No se seleccionó ningún archivo".to_string())
            })?;
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::ValidationError(format!(
                    "El archivo es demasiado grande. Máximo: {}MB",
                    MAX_UPLOAD_BYTES / (1024 * 1024)
                )));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    Err(AppError::ValidationError(format!(
        "No se envió ningún archivo en el campo {}",
        field_name
    )))
}
