use std::future::Future;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    entity::files::{ActiveModel as FileActive, Column as FileCol, Entity as Files, Model as FileModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{File, file_from_entity},
    response::{ApiResponse, Meta},
    state::AppState,
    storage::{Storage, StorageError},
};

pub const UPLOAD_DIR: &str = "pet-shop";
/// 10 000 KB.
pub const MAX_UPLOAD_BYTES: usize = 10_000 * 1024;

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// `1536` becomes `1.5 KB`. Steps of 1024, at most two decimals.
pub fn bytes_to_human(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value > 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Mime type for an allowed upload extension.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

pub async fn upload_file(
    state: &AppState,
    user: &AuthUser,
    file_name: String,
    data: Vec<u8>,
) -> AppResult<ApiResponse<File>> {
    if data.is_empty() {
        return Err(AppError::Unprocessable("The file must not be empty".into()));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Unprocessable(
            "The file may not be greater than 10000 kilobytes".into(),
        ));
    }
    let extension = extension_of(&file_name)
        .filter(|ext| mime_for_extension(ext).is_some())
        .ok_or_else(|| {
            AppError::Unprocessable("The file must be a file of type: doc, docx, png, jpeg, jpg, pdf".into())
        })?;
    let mime_type = mime_for_extension(&extension).unwrap_or("application/octet-stream");

    let id = Uuid::new_v4();
    let path = format!("{UPLOAD_DIR}/{id}.{extension}");
    let size = bytes_to_human(data.len() as u64);
    let record = FileActive {
        id: Set(id),
        name: Set(file_name),
        path: Set(path.clone()),
        size: Set(size),
        mime_type: Set(mime_type.to_string()),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    };
    let file = write_then_record(&state.storage, &path, data, async {
        Ok::<_, AppError>(record.insert(&state.orm).await?)
    })
    .await?;

    tracing::info!(file_id = %file.id, user_id = %user.user_id, size = %file.size, "file uploaded");
    Ok(ApiResponse::success("File uploaded", file_from_entity(file), Some(Meta::empty())))
}

/// Store `data` at `path`, then run `record`. When recording fails the blob
/// is removed again so storage holds no file without a row.
pub(crate) async fn write_then_record<T, F>(
    storage: &Storage,
    path: &str,
    data: Vec<u8>,
    record: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    storage.write(path, data).await?;
    match record.await {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Err(cleanup) = storage.delete(path).await {
                tracing::warn!(path = %path, error = %cleanup, "could not remove orphaned upload");
            }
            Err(err)
        }
    }
}

/// The file record together with its stored bytes.
pub async fn read_file(state: &AppState, id: Uuid) -> AppResult<(FileModel, Vec<u8>)> {
    let file = Files::find_by_id(id)
        .filter(FileCol::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("File"))?;

    let data = match state.storage.read(&file.path).await {
        Ok(data) => data,
        Err(StorageError::NotFound(_)) => {
            tracing::warn!(file_id = %file.id, path = %file.path, "file missing from storage");
            return Err(AppError::MissingBlob);
        }
        Err(err) => return Err(err.into()),
    };
    Ok((file, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blob_is_removed_when_the_record_cannot_be_saved() {
        let storage = Storage::memory().unwrap();
        let failing = async { Err(AppError::Internal(anyhow::anyhow!("insert failed"))) };
        let result: AppResult<()> =
            write_then_record(&storage, "pet-shop/a.png", b"png".to_vec(), failing).await;
        assert!(result.is_err());
        assert!(!storage.exists("pet-shop/a.png").await.unwrap());
    }

    #[tokio::test]
    async fn blob_stays_when_the_record_is_saved() {
        let storage = Storage::memory().unwrap();
        let saved = async { Ok::<_, AppError>(7) };
        let id = write_then_record(&storage, "pet-shop/b.png", b"png".to_vec(), saved)
            .await
            .unwrap();
        assert_eq!(id, 7);
        assert_eq!(storage.read("pet-shop/b.png").await.unwrap(), b"png");
    }

    #[test]
    fn sizes_are_humanized_in_1024_steps() {
        assert_eq!(bytes_to_human(0), "0 B");
        assert_eq!(bytes_to_human(512), "512 B");
        assert_eq!(bytes_to_human(1024), "1024 B");
        assert_eq!(bytes_to_human(1536), "1.5 KB");
        assert_eq!(bytes_to_human(1_048_577), "1 MB");
        assert_eq!(bytes_to_human(5 * 1024 * 1024 + 123_456), "5.12 MB");
        assert_eq!(bytes_to_human(u64::MAX), "16384 PB");
    }

    #[test]
    fn only_document_and_image_extensions_are_allowed() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(mime_for_extension("jpg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("pdf"), Some("application/pdf"));
        assert_eq!(mime_for_extension("exe"), None);
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".bashrc"), None);
    }
}
