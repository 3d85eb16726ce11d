//! Terrain listing query layer
//!
//! A filter set translates into a single `Condition` that the repository
//! shares verbatim between the page query and the count query, so the
//! `totalPages` arithmetic can never drift from the returned rows.

use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition};

use super::models::{Statut, TerrainColumn};

/// Default page number (1-based)
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Conjunctive filter set for the terrain listing
#[derive(Debug, Clone, Default)]
pub struct TerrainFilter {
    pub ville: Option<String>,
    pub commune: Option<String>,
    pub statut: Option<Statut>,
    pub superficie_min: Option<i32>,
    pub superficie_max: Option<i32>,
    pub prix_achat_min: Option<i64>,
    pub prix_achat_max: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search_term: Option<String>,
}

/// Columns the free-text search matches against, as substrings,
/// case-insensitively.
const SEARCH_COLUMNS: [TerrainColumn; 5] = [
    TerrainColumn::Ville,
    TerrainColumn::Commune,
    TerrainColumn::Quartier,
    TerrainColumn::VendeurInitial,
    TerrainColumn::Id,
];

impl TerrainFilter {
    /// Build the shared WHERE predicate. All filters are AND-combined;
    /// the search term ORs across its five columns before joining the rest.
    pub fn condition(&self) -> Condition {
        let mut cond = Condition::all();

        if let Some(term) = &self.search_term {
            let pattern = format!("%{}%", term.to_lowercase());
            let mut any = Condition::any();
            for col in SEARCH_COLUMNS {
                any = any.add(Expr::expr(Func::lower(Expr::col(col))).like(pattern.clone()));
            }
            cond = cond.add(any);
        }

        if let Some(ville) = &self.ville {
            cond = cond.add(TerrainColumn::Ville.eq(ville.clone()));
        }
        if let Some(commune) = &self.commune {
            cond = cond.add(TerrainColumn::Commune.eq(commune.clone()));
        }
        if let Some(statut) = self.statut {
            cond = cond.add(TerrainColumn::Statut.eq(statut.as_str()));
        }
        if let Some(min) = self.superficie_min {
            cond = cond.add(TerrainColumn::Superficie.gte(min));
        }
        if let Some(max) = self.superficie_max {
            cond = cond.add(TerrainColumn::Superficie.lte(max));
        }
        if let Some(min) = self.prix_achat_min {
            cond = cond.add(TerrainColumn::PrixAchat.gte(min));
        }
        if let Some(max) = self.prix_achat_max {
            cond = cond.add(TerrainColumn::PrixAchat.lte(max));
        }
        if let Some(from) = self.date_from {
            cond = cond.add(TerrainColumn::DateAchat.gte(from));
        }
        if let Some(to) = self.date_to {
            cond = cond.add(TerrainColumn::DateAchat.lte(to));
        }

        cond
    }
}

/// Whitelisted sort keys. Anything else is rejected at parse time and
/// never reaches the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Ville,
    Superficie,
    PrixAchat,
    Statut,
}

impl SortKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "id" => Some(SortKey::Id),
            "ville" => Some(SortKey::Ville),
            "superficie" => Some(SortKey::Superficie),
            "prixAchat" => Some(SortKey::PrixAchat),
            "statut" => Some(SortKey::Statut),
            _ => None,
        }
    }

    pub fn column(&self) -> TerrainColumn {
        match self {
            SortKey::Id => TerrainColumn::Id,
            SortKey::Ville => TerrainColumn::Ville,
            SortKey::Superficie => TerrainColumn::Superficie,
            SortKey::PrixAchat => TerrainColumn::PrixAchat,
            SortKey::Statut => TerrainColumn::Statut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(dir: &str) -> Option<Self> {
        match dir {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Requested ordering; absent sort falls back to `created_at DESC`
#[derive(Debug, Clone, Copy)]
pub struct TerrainSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// 1-based page request
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::TerrainEntity;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn render(filter: &TerrainFilter) -> String {
        TerrainEntity::find()
            .filter(filter.condition())
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let sql = render(&TerrainFilter::default());
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let filter = TerrainFilter {
            ville: Some("Abidjan".into()),
            statut: Some(Statut::Vendu),
            superficie_min: Some(300),
            ..Default::default()
        };
        let sql = render(&filter);
        assert!(sql.contains(r#""ville" = 'Abidjan'"#));
        assert!(sql.contains(r#""statut" = 'Vendu'"#));
        assert!(sql.contains(r#""superficie" >= 300"#));
        assert_eq!(sql.matches(" AND ").count(), 2);
    }

    #[test]
    fn test_search_term_ors_across_five_columns() {
        let filter = TerrainFilter {
            search_term: Some("Riviera".into()),
            ..Default::default()
        };
        let sql = render(&filter);
        assert_eq!(sql.matches("LIKE '%riviera%'").count(), 5);
        assert_eq!(sql.matches(" OR ").count(), 4);
    }

    #[test]
    fn test_search_term_joins_other_filters_with_and() {
        let filter = TerrainFilter {
            commune: Some("Cocody".into()),
            search_term: Some("T00".into()),
            ..Default::default()
        };
        let sql = render(&filter);
        assert!(sql.contains(" OR "));
        assert!(sql.contains(r#""commune" = 'Cocody'"#));
        assert!(sql.contains(" AND "));
    }

    #[test]
    fn test_date_range_targets_purchase_date() {
        let filter = TerrainFilter {
            date_from: NaiveDate::from_ymd_opt(2023, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2023, 12, 31),
            ..Default::default()
        };
        let sql = render(&filter);
        assert!(sql.contains(r#""date_achat" >= '2023-01-01'"#));
        assert!(sql.contains(r#""date_achat" <= '2023-12-31'"#));
    }

    #[test]
    fn test_sort_key_whitelist() {
        assert_eq!(SortKey::parse("prixAchat"), Some(SortKey::PrixAchat));
        assert_eq!(SortKey::parse("id"), Some(SortKey::Id));
        assert_eq!(SortKey::parse("prix_achat"), None);
        assert_eq!(SortKey::parse("created_at; DROP TABLE terrains"), None);
    }

    #[test]
    fn test_sort_key_column_mapping() {
        use sea_orm::IdenStatic;
        // "prixAchat" maps to the stored column name
        assert_eq!(SortKey::PrixAchat.column().as_str(), "prix_achat");
        assert_eq!(SortKey::Ville.column().as_str(), "ville");
    }

    #[test]
    fn test_page_offset() {
        let page = Page { page: 1, limit: 10 };
        assert_eq!(page.offset(), 0);
        let page = Page { page: 3, limit: 25 };
        assert_eq!(page.offset(), 50);
    }
}
