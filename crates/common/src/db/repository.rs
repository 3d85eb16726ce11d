//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::db::models::*;
use crate::db::query::{Page, SortDirection, TerrainFilter, TerrainSort};
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::validate::ValidTerrain;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
    TransactionTrait,
};
use sea_orm::sea_query::Expr;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Terrain Operations
    // ========================================================================

    /// List terrains matching the filter, one page at a time, plus the
    /// total match count ignoring pagination.
    ///
    /// Both queries share the exact same predicate and run concurrently;
    /// they are independent reads.
    pub async fn list_terrains(
        &self,
        filter: &TerrainFilter,
        sort: Option<TerrainSort>,
        page: Page,
    ) -> Result<(Vec<Terrain>, u64)> {
        let condition = filter.condition();

        let mut select = TerrainEntity::find().filter(condition.clone());
        select = match sort {
            Some(sort) => match sort.direction {
                SortDirection::Asc => select.order_by_asc(sort.key.column()),
                SortDirection::Desc => select.order_by_desc(sort.key.column()),
            },
            None => select.order_by_desc(TerrainColumn::CreatedAt),
        };

        let data = select
            .limit(page.limit)
            .offset(page.offset())
            .all(self.read_conn());
        let count = TerrainEntity::find()
            .filter(condition)
            .count(self.read_conn());

        let (terrains, total) = futures::try_join!(data, count)?;

        Ok((terrains, total))
    }

    /// Fetch the entire terrain set (analytics input)
    pub async fn all_terrains(&self) -> Result<Vec<Terrain>> {
        TerrainEntity::find()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find terrain by ID
    pub async fn find_terrain_by_id(&self, id: &str) -> Result<Option<Terrain>> {
        TerrainEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create a new terrain with a server-assigned sequential ID
    pub async fn create_terrain(&self, input: ValidTerrain) -> Result<Terrain> {
        let count = TerrainEntity::find().count(self.write_conn()).await?;
        let id = format!("T{:03}", count + 1);
        let now = chrono::Utc::now();

        let terrain = TerrainActiveModel {
            id: Set(id),
            ville: Set(input.ville),
            commune: Set(input.commune),
            quartier: Set(input.quartier),
            superficie: Set(input.superficie),
            prix_achat: Set(input.prix_achat),
            date_achat: Set(input.date_achat),
            vendeur_initial: Set(input.vendeur_initial),
            statut: Set(input.statut.into()),
            prix_vente: Set(input.prix_vente),
            date_vente: Set(input.date_vente),
            acheteur_final: Set(input.acheteur_final),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        terrain.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Apply a validated, fully-merged payload to an existing terrain.
    /// The ID is immutable; sale fields are overwritten wholesale,
    /// including back to NULL.
    pub async fn update_terrain(
        &self,
        existing: Terrain,
        input: ValidTerrain,
    ) -> Result<Terrain> {
        let mut terrain: TerrainActiveModel = existing.into();

        terrain.ville = Set(input.ville);
        terrain.commune = Set(input.commune);
        terrain.quartier = Set(input.quartier);
        terrain.superficie = Set(input.superficie);
        terrain.prix_achat = Set(input.prix_achat);
        terrain.date_achat = Set(input.date_achat);
        terrain.vendeur_initial = Set(input.vendeur_initial);
        terrain.statut = Set(input.statut.into());
        terrain.prix_vente = Set(input.prix_vente);
        terrain.date_vente = Set(input.date_vente);
        terrain.acheteur_final = Set(input.acheteur_final);
        terrain.updated_at = Set(chrono::Utc::now().into());

        terrain.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete terrain by ID; photos cascade at the storage layer
    pub async fn delete_terrain(&self, id: &str) -> Result<bool> {
        let result = TerrainEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Photo Operations
    // ========================================================================

    /// Get photos for a terrain, primary first, then oldest first
    pub async fn list_photos(&self, terrain_id: &str) -> Result<Vec<TerrainPhoto>> {
        TerrainPhotoEntity::find()
            .filter(TerrainPhotoColumn::TerrainId.eq(terrain_id))
            .order_by_desc(TerrainPhotoColumn::IsPrimary)
            .order_by_asc(TerrainPhotoColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a photo by ID
    pub async fn find_photo_by_id(&self, photo_id: i32) -> Result<Option<TerrainPhoto>> {
        TerrainPhotoEntity::find_by_id(photo_id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Register a photo record. When the new photo is primary, the other
    /// primaries of the terrain are unset inside the same transaction.
    pub async fn add_photo(
        &self,
        terrain_id: &str,
        photo_url: String,
        photo_name: String,
        description: Option<String>,
        is_primary: bool,
    ) -> Result<TerrainPhoto> {
        let txn = self.write_conn().begin().await?;

        if is_primary {
            TerrainPhotoEntity::update_many()
                .col_expr(TerrainPhotoColumn::IsPrimary, Expr::value(false))
                .filter(TerrainPhotoColumn::TerrainId.eq(terrain_id))
                .exec(&txn)
                .await?;
        }

        let photo = TerrainPhotoActiveModel {
            id: NotSet,
            terrain_id: Set(terrain_id.to_string()),
            photo_url: Set(photo_url),
            photo_name: Set(photo_name),
            description: Set(description),
            is_primary: Set(is_primary),
            created_at: Set(chrono::Utc::now().into()),
        };
        let photo = photo.insert(&txn).await?;

        txn.commit().await?;

        Ok(photo)
    }

    /// Delete a photo, returning the deleted record so the caller can
    /// reap the stored blob
    pub async fn delete_photo(&self, photo_id: i32) -> Result<Option<TerrainPhoto>> {
        let photo = TerrainPhotoEntity::find_by_id(photo_id)
            .one(self.write_conn())
            .await?;

        let Some(photo) = photo else {
            return Ok(None);
        };

        TerrainPhotoEntity::delete_by_id(photo_id)
            .exec(self.write_conn())
            .await?;

        Ok(Some(photo))
    }

    /// One statement flips the flag for the whole terrain: true where
    /// `id = $1`, false everywhere else. No window where two photos are
    /// primary or none is.
    fn set_primary_statement(photo_id: i32, terrain_id: &str) -> Statement {
        Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE terrain_photos SET is_primary = (id = $1) WHERE terrain_id = $2",
            vec![photo_id.into(), terrain_id.into()],
        )
    }

    /// Flip the primary flag to one photo of a terrain in a single atomic
    /// statement; every other photo of the terrain loses the flag.
    pub async fn set_primary_photo(&self, photo_id: i32, terrain_id: &str) -> Result<()> {
        let stmt = Self::set_primary_statement(photo_id, terrain_id);

        let result = self.write_conn().execute(stmt).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::PhotoNotFound {
                id: photo_id.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Values;

    #[test]
    fn test_set_primary_is_one_statement_over_the_whole_terrain() {
        let stmt = Repository::set_primary_statement(7, "T001");

        // One UPDATE covers every photo of the terrain: the flag becomes
        // true where id matches and false for all siblings, so exactly
        // one primary remains and no intermediate state is visible.
        assert_eq!(
            stmt.sql,
            "UPDATE terrain_photos SET is_primary = (id = $1) WHERE terrain_id = $2"
        );
        assert_eq!(stmt.values, Some(Values(vec![7.into(), "T001".into()])));
        assert_eq!(stmt.db_backend, DbBackend::Postgres);
    }

    #[test]
    fn test_set_primary_binds_rather_than_splices() {
        let stmt = Repository::set_primary_statement(1, "T001'; DROP TABLE terrains; --");

        assert!(!stmt.sql.contains("DROP TABLE"));
        let values = stmt.values.unwrap();
        assert_eq!(values.0.len(), 2);
    }
}
