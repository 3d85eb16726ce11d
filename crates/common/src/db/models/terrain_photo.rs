//! Terrain photo entity
//!
//! Photos are owned 1:N by a terrain and cascade-deleted with it. At most
//! one photo per terrain carries the primary flag.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "terrain_photos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub terrain_id: String,

    /// Location of the stored blob; upload itself is handled by the
    /// storage collaborator
    #[sea_orm(column_type = "Text")]
    pub photo_url: String,

    pub photo_name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub is_primary: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::terrain::Entity",
        from = "Column::TerrainId",
        to = "super::terrain::Column::Id",
        on_delete = "Cascade"
    )]
    Terrain,
}

impl Related<super::terrain::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Terrain.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
