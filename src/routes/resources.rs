use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, post, web, HttpResponse};
use bytes::BytesMut;
use futures_util::StreamExt as _;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::resource::{validate_upload, MAX_UPLOAD_BYTES};
use crate::models::{Resource, ResourceKind};
use crate::storage::ObjectStorage;
use crate::types::CreateResourceRequest;
use crate::AppState;

#[get("")]
pub async fn list_resources(
    app_state: web::Data<Arc<AppState>>,
    user: Option<AuthenticatedUser>,
) -> Result<web::Json<Vec<Resource>>, AppError> {
    let Some(user) = user else {
        return Ok(web::Json(Vec::new()));
    };

    let resources = Resource::list(&app_state.pool, &user.user_id).await?;
    Ok(web::Json(resources))
}

/// Direct entry of a link (or folder) resource. No file is involved.
#[post("")]
pub async fn create_resource(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    web::Json(request): web::Json<CreateResourceRequest>,
) -> Result<web::Json<Resource>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if matches!(request.kind, ResourceKind::Link) && request.url.is_none() {
        return Err(AppError::Validation(
            "A URL is required for link resources".to_string(),
        ));
    }

    let resource = Resource::create(
        &app_state.pool,
        &authenticated_user.user_id,
        &request.title,
        &request.description,
        request.kind,
        request.url.as_deref(),
        None,
        None,
    )
    .await?;

    Ok(web::Json(resource))
}

struct UploadForm {
    title: Option<String>,
    description: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: BytesMut,
}

async fn read_upload_form(mut payload: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        title: None,
        description: String::new(),
        filename: None,
        content_type: None,
        data: BytesMut::new(),
    };

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::Validation(format!("Invalid upload payload: {}", e)))?;
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        if name == "file" {
            form.filename = field
                .content_disposition()
                .get_filename()
                .map(str::to_string);
            form.content_type = field.content_type().map(|mime| mime.to_string());
        }

        let mut value = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::Validation(format!("Invalid upload payload: {}", e)))?;
            if name == "file" && value.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::Validation(
                    "File size must be less than 10MB".to_string(),
                ));
            }
            value.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "title" => form.title = Some(String::from_utf8_lossy(&value).into_owned()),
            "description" => form.description = String::from_utf8_lossy(&value).into_owned(),
            "file" => form.data = value,
            _ => {}
        }
    }

    Ok(form)
}

/// Multipart upload: validates size and MIME type, stores the blob under the
/// user's namespace, then records the resource row.
#[post("/upload")]
pub async fn upload_resource(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    payload: Multipart,
) -> Result<web::Json<Resource>, AppError> {
    let form = read_upload_form(payload).await?;

    let filename = form
        .filename
        .ok_or_else(|| AppError::Validation("A file is required".to_string()))?;
    let content_type = form
        .content_type
        .ok_or_else(|| AppError::Validation("File content type is required".to_string()))?;
    validate_upload(&content_type, form.data.len())?;

    // Default the title to the filename stem, as the picker does.
    let title = form
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| filename.split('.').next().unwrap_or(&filename).to_string());

    let file_size = form.data.len() as i64;
    let key = ObjectStorage::key_for(&authenticated_user.user_id, &filename);
    app_state
        .storage
        .upload(&key, &content_type, form.data.freeze())
        .await?;
    let url = app_state.storage.public_url(&key);

    let resource = Resource::create(
        &app_state.pool,
        &authenticated_user.user_id,
        &title,
        &form.description,
        ResourceKind::Document,
        Some(&url),
        Some(&content_type),
        Some(file_size),
    )
    .await?;

    info!("Uploaded resource {} ({} bytes)", resource.id, file_size);
    Ok(web::Json(resource))
}

#[get("/{resource_id}/download")]
pub async fn download_resource(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    resource_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let resource = Resource::get(
        &app_state.pool,
        resource_id.into_inner(),
        &authenticated_user.user_id,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    let url = resource
        .url
        .as_deref()
        .ok_or_else(|| AppError::Validation("No file available for download".to_string()))?;
    let key = ObjectStorage::key_from_url(url)
        .ok_or_else(|| AppError::Validation("Invalid file path".to_string()))?;

    let data = app_state.storage.download(key).await?;

    let extension = key.rsplit('.').next().unwrap_or("bin");
    let download_name = format!("{}.{}", resource.title, extension);
    let content_type = resource
        .file_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(download_name)],
        })
        .body(data))
}

/// Removes the storage object first (when one exists), then the row. A
/// failed blob delete leaves the row in place.
#[delete("/{resource_id}")]
pub async fn delete_resource(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    resource_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let resource = Resource::get(
        &app_state.pool,
        resource_id.into_inner(),
        &authenticated_user.user_id,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    if matches!(resource.kind, ResourceKind::Document) {
        if let Some(key) = resource.url.as_deref().and_then(ObjectStorage::key_from_url) {
            app_state.storage.delete(key).await?;
        }
    }

    Resource::delete(&app_state.pool, resource.id, &authenticated_user.user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
