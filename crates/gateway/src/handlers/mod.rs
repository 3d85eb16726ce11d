//! API handlers module

pub mod analytics;
pub mod health;
pub mod photos;
pub mod terrains;
