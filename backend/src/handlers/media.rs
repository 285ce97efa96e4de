//! HTTP handlers for media center endpoints
//!
//! Create and update take multipart form data: a `filename` / `is_active`
//! text field plus an `image` file field.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::media::{
    CreateMediaInput, ListMediaQuery, MediaAsset, MediaService, MediaUpload, UpdateMediaInput,
};
use crate::AppState;

/// Upload an image and create a media asset
pub async fn create_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<MediaAsset>> {
    let form = read_form(multipart).await?;
    let filename = form.filename.ok_or_else(|| AppError::Validation {
        field: "filename".to_string(),
        message: "filename is required".to_string(),
    })?;
    let upload = form.upload.ok_or_else(|| AppError::Validation {
        field: "image".to_string(),
        message: "image file is required".to_string(),
    })?;

    let service = media_service(state);
    let asset = service
        .create_media(CreateMediaInput { filename, upload })
        .await?;
    Ok(Json(asset))
}

/// List media assets
pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<ListMediaQuery>,
) -> AppResult<Json<Vec<MediaAsset>>> {
    let service = media_service(state);
    let assets = service.list_media(query).await?;
    Ok(Json(assets))
}

/// Get a media asset by id
pub async fn get_media(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
) -> AppResult<Json<MediaAsset>> {
    let service = media_service(state);
    let asset = service.get_media(media_id).await?;
    Ok(Json(asset))
}

/// Update a media asset's metadata and optionally replace its image
pub async fn update_media(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<MediaAsset>> {
    let form = read_form(multipart).await?;
    let input = UpdateMediaInput {
        filename: form.filename,
        is_active: form.is_active,
        upload: form.upload,
    };

    let service = media_service(state);
    let asset = service.update_media(media_id, input).await?;
    Ok(Json(asset))
}

/// Delete a media asset by id
pub async fn delete_media(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = media_service(state);
    service.delete_media(media_id).await?;
    Ok(Json(()))
}

fn media_service(state: AppState) -> MediaService {
    match state.media_host {
        Some(host) => MediaService::with_host(state.db, state.cache, host),
        None => MediaService::new(state.db, state.cache),
    }
}

#[derive(Default)]
struct MediaForm {
    filename: Option<String>,
    is_active: Option<bool>,
    upload: Option<MediaUpload>,
}

async fn read_form(mut multipart: Multipart) -> AppResult<MediaForm> {
    let mut form = MediaForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("filename") => {
                form.filename = Some(field.text().await.map_err(bad_multipart)?);
            }
            Some("is_active") => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let value = raw.parse::<bool>().map_err(|_| AppError::Validation {
                    field: "is_active".to_string(),
                    message: "is_active must be true or false".to_string(),
                })?;
                form.is_active = Some(value);
            }
            Some("image") => {
                let content_type = field
                    .content_type()
                    .map(|ct| ct.to_string())
                    .unwrap_or_default();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                form.upload = Some(MediaUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::ValidationError(format!("invalid multipart request: {err}"))
}
