use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::entities::image::{self, Entity as ImageEntity, FileExtension};
use crate::error::ApiError;

//ROUTERS
pub fn upload_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    // Leave headroom over the file ceiling for multipart framing.
    let body_limit = config.file_size_limit.saturating_add(64 * 1024);

    Router::new()
        .route("/image", post(upload_image).get(list_images))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(db))
        .layer(Extension(config))
}

//ROUTES
async fn upload_image(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::Validation(format!("Malformed multipart body: {err}")))?
        .ok_or_else(|| ApiError::Validation("No file field in upload".to_string()))?;

    let content_type = field
        .content_type()
        .ok_or_else(|| ApiError::Validation("Content type is not set".to_string()))?
        .to_owned();
    let extension = FileExtension::from_mime(&content_type)
        .ok_or_else(|| ApiError::Validation("Unsupported content type".to_string()))?;

    let file_name = field
        .name()
        .ok_or_else(|| ApiError::Validation("File name is not set".to_string()))?
        .to_owned();
    if !FILE_NAME_REGEX.is_match(&file_name) {
        return Err(ApiError::Validation(
            "Invalid file name. It should contain only Latin letters, numbers, '-', or '_'."
                .to_string(),
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|_| ApiError::PayloadTooLarge)?;
    if data.len() > config.file_size_limit {
        return Err(ApiError::PayloadTooLarge);
    }

    let path_name = Uuid::new_v4().to_string();

    let txn = db.begin().await?;
    let new_image = image::ActiveModel {
        file_name: Set(file_name),
        path_name: Set(path_name.clone()),
        extension: Set(extension),
        ..Default::default()
    };
    let result = ImageEntity::insert(new_image).exec(&txn).await?;

    let dir = config.upload_dir.trim_end_matches('/');
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|err| ApiError::Internal(format!("Failed to create upload dir: {err}")))?;
    if let Err(err) =
        tokio::fs::write(format!("{dir}/{path_name}.{}", extension.as_str()), data).await
    {
        let _ = txn.rollback().await;
        return Err(ApiError::Internal(format!("Failed to store file: {err}")));
    }
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": result.last_insert_id, "message": "File uploaded successfully" })),
    ))
}

async fn list_images(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Query(query): Query<ImagesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = if let Some(query) = query.query {
        let mut condition = Condition::any().add(image::Column::FileName.contains(query.clone()));
        if let Ok(id) = query.parse::<i32>() {
            condition = condition.add(image::Column::Id.eq(id));
        }
        condition
    } else {
        Condition::all()
    };

    let images = ImageEntity::find().filter(filter).all(&*db).await?;
    Ok(Json(images))
}

//Structs
#[derive(Deserialize)]
struct ImagesQuery {
    query: Option<String>,
}

//utils
static FILE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,50}$").unwrap());
