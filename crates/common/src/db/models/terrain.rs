//! Terrain entity - a land parcel transaction record

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a terrain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statut {
    Disponible,
    Vendu,
}

impl Statut {
    /// Parse a status value, rejecting anything outside the two
    /// recognized states.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Disponible" => Some(Statut::Disponible),
            "Vendu" => Some(Statut::Vendu),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Statut::Disponible => "Disponible",
            Statut::Vendu => "Vendu",
        }
    }
}

impl From<Statut> for String {
    fn from(statut: Statut) -> Self {
        statut.as_str().to_string()
    }
}

impl std::fmt::Display for Statut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "terrains")]
pub struct Model {
    /// Short sequential token, e.g. "T001"; immutable after creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub ville: String,

    pub commune: String,

    pub quartier: String,

    /// Area in square meters
    pub superficie: i32,

    /// Purchase price in FCFA
    pub prix_achat: i64,

    pub date_achat: Date,

    pub vendeur_initial: String,

    /// "Disponible" or "Vendu"; checked at the storage layer
    pub statut: String,

    /// Sale price in FCFA, present iff sold
    pub prix_vente: Option<i64>,

    pub date_vente: Option<Date>,

    pub acheteur_final: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the status as an enum; rows bypassing the check constraint
    /// degrade to Disponible.
    pub fn statut_enum(&self) -> Statut {
        Statut::parse(&self.statut).unwrap_or(Statut::Disponible)
    }

    pub fn is_vendu(&self) -> bool {
        self.statut_enum() == Statut::Vendu
    }

    /// Absolute profit for a sold terrain
    pub fn benefice(&self) -> Option<i64> {
        if self.is_vendu() {
            self.prix_vente.map(|pv| pv - self.prix_achat)
        } else {
            None
        }
    }

    /// Profit as a percentage of the purchase price
    pub fn marge(&self) -> Option<f64> {
        self.benefice()
            .map(|b| (b as f64 / self.prix_achat as f64) * 100.0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::terrain_photo::Entity")]
    Photos,
}

impl Related<super::terrain_photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendu_terrain() -> Model {
        let now = chrono::Utc::now().into();
        Model {
            id: "T001".into(),
            ville: "Abidjan".into(),
            commune: "Cocody".into(),
            quartier: "Riviera".into(),
            superficie: 500,
            prix_achat: 25_000_000,
            date_achat: chrono::NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            vendeur_initial: "M. Kouassi".into(),
            statut: "Vendu".into(),
            prix_vente: Some(35_000_000),
            date_vente: chrono::NaiveDate::from_ymd_opt(2023, 9, 15),
            acheteur_final: Some("Famille Diabaté".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_statut_parse() {
        assert_eq!(Statut::parse("Vendu"), Some(Statut::Vendu));
        assert_eq!(Statut::parse("Disponible"), Some(Statut::Disponible));
        assert_eq!(Statut::parse("vendu"), None);
        assert_eq!(Statut::parse("Réservé"), None);
    }

    #[test]
    fn test_benefice_and_marge() {
        let terrain = vendu_terrain();
        assert_eq!(terrain.benefice(), Some(10_000_000));
        assert_eq!(terrain.marge(), Some(40.0));
    }

    #[test]
    fn test_disponible_has_no_benefice() {
        let mut terrain = vendu_terrain();
        terrain.statut = "Disponible".into();
        assert_eq!(terrain.benefice(), None);
        assert_eq!(terrain.marge(), None);
    }
}
