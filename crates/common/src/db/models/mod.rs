//! SeaORM entity models

mod terrain;
mod terrain_photo;

pub use terrain::{
    Entity as TerrainEntity,
    Model as Terrain,
    ActiveModel as TerrainActiveModel,
    Column as TerrainColumn,
    Statut,
};

pub use terrain_photo::{
    Entity as TerrainPhotoEntity,
    Model as TerrainPhoto,
    ActiveModel as TerrainPhotoActiveModel,
    Column as TerrainPhotoColumn,
};
