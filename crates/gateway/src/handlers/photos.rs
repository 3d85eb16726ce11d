//! Terrain photo handlers
//!
//! The service stores photo records only; uploading and deleting the
//! blobs themselves is the storage collaborator's job. Delete returns
//! the removed record so the caller can reap the blob afterwards.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use foncier_common::{
    auth::SessionContext,
    db::models::TerrainPhoto,
    db::Repository,
    errors::{AppError, Result},
};

/// Request to register a photo record
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPhotoRequest {
    #[validate(length(min = 1, max = 2000))]
    pub photo_url: String,

    #[validate(length(min = 1, max = 255))]
    pub photo_name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub is_primary: bool,
}

/// Request to act on an existing photo
#[derive(Debug, Deserialize)]
pub struct PhotoActionRequest {
    pub action: String,
}

#[derive(Serialize)]
pub struct PhotoListResponse {
    pub photos: Vec<TerrainPhoto>,
}

#[derive(Serialize)]
pub struct PhotoMutationResponse {
    pub success: bool,
    pub photo: TerrainPhoto,
}

#[derive(Serialize)]
pub struct PhotoActionResponse {
    pub success: bool,
    pub message: String,
}

async fn require_terrain(repo: &Repository, id: &str) -> Result<()> {
    repo.find_terrain_by_id(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::TerrainNotFound { id: id.to_string() })
}

/// A photo id only counts when it belongs to the terrain in the path
async fn require_photo_of_terrain(
    repo: &Repository,
    terrain_id: &str,
    photo_id: i32,
) -> Result<TerrainPhoto> {
    let photo = repo
        .find_photo_by_id(photo_id)
        .await?
        .filter(|p| p.terrain_id == terrain_id)
        .ok_or(AppError::PhotoNotFound {
            id: photo_id.to_string(),
        })?;

    Ok(photo)
}

/// List the photos of a terrain, primary first
pub async fn list_photos(
    State(state): State<AppState>,
    _session: SessionContext,
    Path(terrain_id): Path<String>,
) -> Result<Json<PhotoListResponse>> {
    let repo = Repository::new(state.db.clone());

    require_terrain(&repo, &terrain_id).await?;
    let photos = repo.list_photos(&terrain_id).await?;

    Ok(Json(PhotoListResponse { photos }))
}

/// Register a photo record for a terrain
pub async fn register_photo(
    State(state): State<AppState>,
    session: SessionContext,
    Path(terrain_id): Path<String>,
    Json(request): Json<RegisterPhotoRequest>,
) -> Result<(StatusCode, Json<PhotoMutationResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        errors: e.to_string().lines().map(String::from).collect(),
    })?;

    let repo = Repository::new(state.db.clone());
    require_terrain(&repo, &terrain_id).await?;

    let photo = repo
        .add_photo(
            &terrain_id,
            request.photo_url,
            request.photo_name,
            request.description,
            request.is_primary,
        )
        .await?;

    tracing::info!(
        terrain_id = %terrain_id,
        photo_id = photo.id,
        agent = %session.agent,
        is_primary = photo.is_primary,
        "Photo registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(PhotoMutationResponse {
            success: true,
            photo,
        }),
    ))
}

/// Act on a photo; `setPrimary` is the only recognized action
pub async fn update_photo(
    State(state): State<AppState>,
    session: SessionContext,
    Path((terrain_id, photo_id)): Path<(String, i32)>,
    Json(request): Json<PhotoActionRequest>,
) -> Result<Json<PhotoActionResponse>> {
    if request.action != "setPrimary" {
        return Err(AppError::InvalidFormat {
            message: format!("Action inconnue: {}", request.action),
        });
    }

    let repo = Repository::new(state.db.clone());
    require_photo_of_terrain(&repo, &terrain_id, photo_id).await?;

    repo.set_primary_photo(photo_id, &terrain_id).await?;

    tracing::info!(
        terrain_id = %terrain_id,
        photo_id = photo_id,
        agent = %session.agent,
        "Primary photo changed"
    );

    Ok(Json(PhotoActionResponse {
        success: true,
        message: "Photo principale mise à jour".to_string(),
    }))
}

/// Delete a photo record
pub async fn delete_photo(
    State(state): State<AppState>,
    session: SessionContext,
    Path((terrain_id, photo_id)): Path<(String, i32)>,
) -> Result<Json<PhotoMutationResponse>> {
    let repo = Repository::new(state.db.clone());
    require_photo_of_terrain(&repo, &terrain_id, photo_id).await?;

    let photo = repo
        .delete_photo(photo_id)
        .await?
        .ok_or(AppError::PhotoNotFound {
            id: photo_id.to_string(),
        })?;

    tracing::info!(
        terrain_id = %terrain_id,
        photo_id = photo_id,
        agent = %session.agent,
        "Photo deleted"
    );

    Ok(Json(PhotoMutationResponse {
        success: true,
        photo,
    }))
}
