//! Terrain management handlers
//!
//! The listing endpoint translates the query string into the shared
//! filter/sort/page types; every translation problem is reported as a
//! validation failure, nothing unchecked reaches the query layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use foncier_common::{
    auth::SessionContext,
    db::models::{Statut, Terrain},
    db::query::{
        Page, SortDirection, SortKey, TerrainFilter, TerrainSort, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
    },
    db::Repository,
    errors::{AppError, Result},
    metrics,
    validate::{validate_terrain, TerrainDraft},
};

/// Query string of the listing endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListTerrainsQuery {
    pub ville: Option<String>,
    pub commune: Option<String>,
    pub statut: Option<String>,
    pub superficie_min: Option<i32>,
    pub superficie_max: Option<i32>,
    pub prix_achat_min: Option<i64>,
    pub prix_achat_max: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search_term: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort_key: Option<String>,
    pub sort_direction: Option<String>,
}

/// "all" (and blank) means the filter is not applied
fn effective(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "all")
}

fn parse_query_date(value: Option<String>, label: &str, errors: &mut Vec<String>) -> Option<chrono::NaiveDate> {
    let raw = effective(value)?;
    match chrono::NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(format!("{} invalide", label));
            None
        }
    }
}

impl ListTerrainsQuery {
    /// Translate into the query-layer types, collecting every problem
    fn parse(self) -> Result<(TerrainFilter, Option<TerrainSort>, Page)> {
        let mut errors = Vec::new();

        let statut = match effective(self.statut) {
            None => None,
            Some(s) => {
                let parsed = Statut::parse(&s);
                if parsed.is_none() {
                    errors.push("Statut invalide".to_string());
                }
                parsed
            }
        };

        let date_from = parse_query_date(self.date_from, "Date de début", &mut errors);
        let date_to = parse_query_date(self.date_to, "Date de fin", &mut errors);

        // Unknown sort keys are rejected here, never forwarded to SQL.
        // Sorting only applies when both parameters are present; a lone
        // key or direction falls back to the default order.
        let key = match effective(self.sort_key) {
            None => None,
            Some(raw) => {
                let parsed = SortKey::parse(&raw);
                if parsed.is_none() {
                    errors.push("Clé de tri invalide".to_string());
                }
                parsed
            }
        };
        let direction = match effective(self.sort_direction) {
            None => None,
            Some(raw) => {
                let parsed = SortDirection::parse(&raw);
                if parsed.is_none() {
                    errors.push("Direction de tri invalide".to_string());
                }
                parsed
            }
        };
        let sort = match (key, direction) {
            (Some(key), Some(direction)) => Some(TerrainSort { key, direction }),
            _ => None,
        };

        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            errors.push("Page invalide".to_string());
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 {
            errors.push("Limite invalide".to_string());
        }

        if !errors.is_empty() {
            return Err(AppError::Validation { errors });
        }

        let filter = TerrainFilter {
            ville: effective(self.ville),
            commune: effective(self.commune),
            statut,
            superficie_min: self.superficie_min,
            superficie_max: self.superficie_max,
            prix_achat_min: self.prix_achat_min,
            prix_achat_max: self.prix_achat_max,
            date_from,
            date_to,
            search_term: effective(self.search_term),
        };

        Ok((filter, sort, Page { page, limit }))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Serialize)]
pub struct ListTerrainsResponse {
    pub terrains: Vec<Terrain>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct TerrainMutationResponse {
    pub success: bool,
    pub terrain: Terrain,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// List terrains with filters, sorting, and pagination
pub async fn list_terrains(
    State(state): State<AppState>,
    _session: SessionContext,
    Query(query): Query<ListTerrainsQuery>,
) -> Result<Json<ListTerrainsResponse>> {
    let (filter, sort, page) = query.parse()?;

    let repo = Repository::new(state.db.clone());

    let start = std::time::Instant::now();
    let (terrains, total) = repo.list_terrains(&filter, sort, page).await?;
    metrics::record_listing(start.elapsed().as_secs_f64(), total);

    Ok(Json(ListTerrainsResponse {
        terrains,
        pagination: Pagination {
            page: page.page,
            limit: page.limit,
            total,
            total_pages: total.div_ceil(page.limit),
        },
    }))
}

/// Get a terrain by ID
pub async fn get_terrain(
    State(state): State<AppState>,
    _session: SessionContext,
    Path(id): Path<String>,
) -> Result<Json<Terrain>> {
    let repo = Repository::new(state.db.clone());

    let terrain = repo
        .find_terrain_by_id(&id)
        .await?
        .ok_or(AppError::TerrainNotFound { id })?;

    Ok(Json(terrain))
}

/// Create a new terrain
pub async fn create_terrain(
    State(state): State<AppState>,
    session: SessionContext,
    Json(draft): Json<TerrainDraft>,
) -> Result<(StatusCode, Json<TerrainMutationResponse>)> {
    let valid = validate_terrain(&draft).map_err(|errors| {
        metrics::record_validation_failure("create", errors.len());
        AppError::Validation { errors }
    })?;

    let repo = Repository::new(state.db.clone());
    let terrain = repo.create_terrain(valid).await?;
    metrics::record_terrain_write("create");

    tracing::info!(
        terrain_id = %terrain.id,
        agent = %session.agent,
        ville = %terrain.ville,
        "Terrain created"
    );

    Ok((
        StatusCode::CREATED,
        Json(TerrainMutationResponse {
            success: true,
            terrain,
        }),
    ))
}

/// Merge a partial payload over the stored record. Base fields keep their
/// stored value when absent from the patch; sale fields come from the
/// patch alone, a sold terrain must resend them on every update.
fn merge_patch(existing: &Terrain, patch: TerrainDraft) -> TerrainDraft {
    TerrainDraft {
        ville: patch.ville.or_else(|| Some(existing.ville.clone())),
        commune: patch.commune.or_else(|| Some(existing.commune.clone())),
        quartier: patch.quartier.or_else(|| Some(existing.quartier.clone())),
        superficie: patch.superficie.or(Some(existing.superficie)),
        prix_achat: patch.prix_achat.or(Some(existing.prix_achat)),
        date_achat: patch
            .date_achat
            .or_else(|| Some(existing.date_achat.to_string())),
        vendeur_initial: patch
            .vendeur_initial
            .or_else(|| Some(existing.vendeur_initial.clone())),
        statut: patch.statut.or_else(|| Some(existing.statut.clone())),
        prix_vente: patch.prix_vente,
        date_vente: patch.date_vente,
        acheteur_final: patch.acheteur_final,
    }
}

/// Update an existing terrain; the merged payload goes through the same
/// validation gate as a create.
pub async fn update_terrain(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Json(patch): Json<TerrainDraft>,
) -> Result<Json<TerrainMutationResponse>> {
    let repo = Repository::new(state.db.clone());

    let existing = repo
        .find_terrain_by_id(&id)
        .await?
        .ok_or_else(|| AppError::TerrainNotFound { id: id.clone() })?;

    let merged = merge_patch(&existing, patch);
    let valid = validate_terrain(&merged).map_err(|errors| {
        metrics::record_validation_failure("update", errors.len());
        AppError::Validation { errors }
    })?;

    let terrain = repo.update_terrain(existing, valid).await?;
    metrics::record_terrain_write("update");

    tracing::info!(
        terrain_id = %terrain.id,
        agent = %session.agent,
        statut = %terrain.statut,
        "Terrain updated"
    );

    Ok(Json(TerrainMutationResponse {
        success: true,
        terrain,
    }))
}

/// Delete a terrain; its photo records cascade
pub async fn delete_terrain(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let repo = Repository::new(state.db.clone());

    if !repo.delete_terrain(&id).await? {
        return Err(AppError::TerrainNotFound { id });
    }
    metrics::record_terrain_write("delete");

    tracing::info!(terrain_id = %id, agent = %session.agent, "Terrain deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Terrain supprimé avec succès".to_string(),
    }))
}
