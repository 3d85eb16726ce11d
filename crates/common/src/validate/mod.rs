//! Terrain payload validation gate
//!
//! Candidate payloads arrive as a `TerrainDraft` (every field optional so a
//! create body and an update patch share one shape). The gate checks every
//! rule independently and collects all violations; an empty error list
//! yields a `ValidTerrain` with parsed dates and a typed status.
//!
//! The gate runs on the create path and on the update path (patch merged
//! over the existing record first).

use chrono::NaiveDate;
use serde::Deserialize;

use crate::db::models::Statut;

/// Untyped-ish candidate payload; dates stay strings until the gate
/// parses them so a bad date is reported alongside the other violations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TerrainDraft {
    pub ville: Option<String>,
    pub commune: Option<String>,
    pub quartier: Option<String>,
    pub superficie: Option<i32>,
    pub prix_achat: Option<i64>,
    pub date_achat: Option<String>,
    pub vendeur_initial: Option<String>,
    pub statut: Option<String>,
    pub prix_vente: Option<i64>,
    pub date_vente: Option<String>,
    pub acheteur_final: Option<String>,
}

/// A terrain payload that passed every rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTerrain {
    pub ville: String,
    pub commune: String,
    pub quartier: String,
    pub superficie: i32,
    pub prix_achat: i64,
    pub date_achat: NaiveDate,
    pub vendeur_initial: String,
    pub statut: Statut,
    pub prix_vente: Option<i64>,
    pub date_vente: Option<NaiveDate>,
    pub acheteur_final: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn parse_date(value: &Option<String>) -> Option<NaiveDate> {
    value
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Check a candidate payload against every rule; all errors are collected,
/// never fail-fast.
pub fn validate_terrain(draft: &TerrainDraft) -> Result<ValidTerrain, Vec<String>> {
    let mut errors = Vec::new();

    let ville = non_empty(&draft.ville);
    if ville.is_none() {
        errors.push("Ville requise".to_string());
    }

    let commune = non_empty(&draft.commune);
    if commune.is_none() {
        errors.push("Commune requise".to_string());
    }

    let quartier = non_empty(&draft.quartier);
    if quartier.is_none() {
        errors.push("Quartier requis".to_string());
    }

    let superficie = draft.superficie.filter(|s| *s > 0);
    if superficie.is_none() {
        errors.push("Superficie valide requise".to_string());
    }

    let prix_achat = draft.prix_achat.filter(|p| *p > 0);
    if prix_achat.is_none() {
        errors.push("Prix d'achat valide requis".to_string());
    }

    let date_achat = parse_date(&draft.date_achat);
    if date_achat.is_none() {
        errors.push("Date d'achat valide requise".to_string());
    }

    let vendeur_initial = non_empty(&draft.vendeur_initial);
    if vendeur_initial.is_none() {
        errors.push("Vendeur initial requis".to_string());
    }

    // Absent statut defaults to Disponible (matches the storage default)
    let statut = match draft.statut.as_deref() {
        None => Some(Statut::Disponible),
        Some(s) => {
            let parsed = Statut::parse(s);
            if parsed.is_none() {
                errors.push("Statut invalide".to_string());
            }
            parsed
        }
    };

    let mut prix_vente = None;
    let mut date_vente = None;
    let mut acheteur_final = None;

    if statut == Some(Statut::Vendu) {
        prix_vente = draft.prix_vente.filter(|p| *p > 0);
        if prix_vente.is_none() {
            errors.push("Prix de vente requis pour un terrain vendu".to_string());
        }

        date_vente = parse_date(&draft.date_vente);
        if date_vente.is_none() {
            errors.push("Date de vente requise pour un terrain vendu".to_string());
        }

        acheteur_final = non_empty(&draft.acheteur_final);
        if acheteur_final.is_none() {
            errors.push("Acheteur final requis pour un terrain vendu".to_string());
        }
    }
    // Sale fields on an available terrain are dropped so the stored record
    // keeps the invariant: sale data present iff statut = Vendu.

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidTerrain {
        ville: ville.unwrap(),
        commune: commune.unwrap(),
        quartier: quartier.unwrap(),
        superficie: superficie.unwrap(),
        prix_achat: prix_achat.unwrap(),
        date_achat: date_achat.unwrap(),
        vendeur_initial: vendeur_initial.unwrap(),
        statut: statut.unwrap(),
        prix_vente,
        date_vente,
        acheteur_final,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_draft() -> TerrainDraft {
        TerrainDraft {
            ville: Some("Abidjan".into()),
            commune: Some("Cocody".into()),
            quartier: Some("Riviera".into()),
            superficie: Some(500),
            prix_achat: Some(25_000_000),
            date_achat: Some("2023-01-15".into()),
            vendeur_initial: Some("M. Kouassi".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_disponible_without_sale_fields_is_valid() {
        let valid = validate_terrain(&base_draft()).unwrap();
        assert_eq!(valid.statut, Statut::Disponible);
        assert_eq!(valid.prix_vente, None);
        assert_eq!(valid.date_vente, None);
        assert_eq!(valid.acheteur_final, None);
    }

    #[test]
    fn test_vendu_requires_every_sale_field() {
        let mut draft = base_draft();
        draft.statut = Some("Vendu".into());

        let errors = validate_terrain(&draft).unwrap_err();
        assert!(errors.contains(&"Prix de vente requis pour un terrain vendu".to_string()));
        assert!(errors.contains(&"Date de vente requise pour un terrain vendu".to_string()));
        assert!(errors.contains(&"Acheteur final requis pour un terrain vendu".to_string()));
    }

    #[test]
    fn test_vendu_missing_single_sale_field_rejected() {
        let mut draft = base_draft();
        draft.statut = Some("Vendu".into());
        draft.prix_vente = Some(35_000_000);
        draft.date_vente = Some("2023-09-15".into());
        // acheteur_final deliberately absent

        let errors = validate_terrain(&draft).unwrap_err();
        assert_eq!(
            errors,
            vec!["Acheteur final requis pour un terrain vendu".to_string()]
        );
    }

    #[test]
    fn test_complete_vendu_payload_accepted() {
        let mut draft = base_draft();
        draft.statut = Some("Vendu".into());
        draft.prix_vente = Some(35_000_000);
        draft.date_vente = Some("2023-09-15".into());
        draft.acheteur_final = Some("Famille Diabaté".into());

        let valid = validate_terrain(&draft).unwrap();
        assert_eq!(valid.statut, Statut::Vendu);
        assert_eq!(valid.prix_vente, Some(35_000_000));
        assert_eq!(
            valid.date_vente,
            chrono::NaiveDate::from_ymd_opt(2023, 9, 15)
        );
    }

    #[test]
    fn test_all_errors_collected() {
        let errors = validate_terrain(&TerrainDraft::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Ville requise",
                "Commune requise",
                "Quartier requis",
                "Superficie valide requise",
                "Prix d'achat valide requis",
                "Date d'achat valide requise",
                "Vendeur initial requis",
            ]
        );
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        let mut draft = base_draft();
        draft.superficie = Some(0);
        draft.prix_achat = Some(-5);

        let errors = validate_terrain(&draft).unwrap_err();
        assert!(errors.contains(&"Superficie valide requise".to_string()));
        assert!(errors.contains(&"Prix d'achat valide requis".to_string()));
    }

    #[test]
    fn test_unparseable_date_rejected() {
        let mut draft = base_draft();
        draft.date_achat = Some("15/01/2023".into());

        let errors = validate_terrain(&draft).unwrap_err();
        assert_eq!(errors, vec!["Date d'achat valide requise".to_string()]);
    }

    #[test]
    fn test_unknown_statut_rejected() {
        let mut draft = base_draft();
        draft.statut = Some("Réservé".into());

        let errors = validate_terrain(&draft).unwrap_err();
        assert_eq!(errors, vec!["Statut invalide".to_string()]);
    }

    #[test]
    fn test_whitespace_only_strings_rejected() {
        let mut draft = base_draft();
        draft.ville = Some("   ".into());

        let errors = validate_terrain(&draft).unwrap_err();
        assert_eq!(errors, vec!["Ville requise".to_string()]);
    }

    #[test]
    fn test_sale_fields_dropped_for_disponible() {
        let mut draft = base_draft();
        draft.prix_vente = Some(35_000_000);
        draft.acheteur_final = Some("Quelqu'un".into());

        let valid = validate_terrain(&draft).unwrap();
        assert_eq!(valid.prix_vente, None);
        assert_eq!(valid.acheteur_final, None);
    }
}
