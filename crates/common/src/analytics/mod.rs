//! Portfolio analytics aggregation
//!
//! Computes the KPI block and the chart-ready series over the full terrain
//! set in one pass. Gross profit nets sale totals against the purchase
//! cost of sold terrains only, matching the per-city and per-terrain
//! profit figures. Average margin is the arithmetic mean of per-terrain
//! margin percentages, not a ratio of sums; with zero sold terrains every
//! profit figure is 0 rather than an error.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::db::models::{Statut, Terrain};

/// How many sold terrains the profitability ranking keeps
const TOP_TERRAINS: usize = 5;

/// Portfolio-wide key performance indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_terrains: u64,
    pub terrains_vendus: u64,
    pub terrains_disponibles: u64,
    /// Purchase total across the whole portfolio
    pub total_achats: i64,
    /// Sale total across sold terrains
    pub total_ventes: i64,
    /// Sale total minus the purchase cost of sold terrains
    pub benefice_brut: i64,
    /// Mean of per-terrain margin percentages over sold terrains
    pub marge_moyenne: f64,
}

/// Per-city performance line, ordered by profit descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VillePerformance {
    pub ville: String,
    pub nombre_terrains: u64,
    pub total_achats: i64,
    pub total_ventes: i64,
    pub benefice: i64,
}

/// One month of purchase and sale volume, keyed YYYY-MM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub mois: String,
    pub achats: i64,
    pub ventes: i64,
}

/// One slice of the status distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutSlice {
    pub name: String,
    pub value: u64,
}

/// A sold terrain in the profitability ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTerrain {
    pub id: String,
    pub localisation: String,
    pub benefice: i64,
    pub marge: f64,
}

/// The full analytics payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub kpis: Kpis,
    pub performance_par_ville: Vec<VillePerformance>,
    pub evolution_mensuelle: Vec<MonthlyPoint>,
    pub repartition_statut: Vec<StatutSlice>,
    pub top_terrains: Vec<TopTerrain>,
}

#[derive(Default)]
struct VilleAccumulator {
    nombre_terrains: u64,
    total_achats: i64,
    total_ventes: i64,
    benefice: i64,
}

#[derive(Default)]
struct MonthAccumulator {
    achats: i64,
    ventes: i64,
}

/// Compute the analytics report over the full terrain set
pub fn compute(terrains: &[Terrain]) -> AnalyticsReport {
    let mut vendus: u64 = 0;
    let mut total_achats: i64 = 0;
    let mut total_ventes: i64 = 0;
    let mut achats_vendus: i64 = 0;
    let mut somme_marges: f64 = 0.0;

    let mut villes: HashMap<String, VilleAccumulator> = HashMap::new();
    let mut mois: BTreeMap<String, MonthAccumulator> = BTreeMap::new();
    let mut sold: Vec<&Terrain> = Vec::new();

    for terrain in terrains {
        total_achats += terrain.prix_achat;

        let ville = villes.entry(terrain.ville.clone()).or_default();
        ville.nombre_terrains += 1;
        ville.total_achats += terrain.prix_achat;

        let achat_mois = terrain.date_achat.format("%Y-%m").to_string();
        mois.entry(achat_mois).or_default().achats += terrain.prix_achat;

        if terrain.is_vendu() {
            let prix_vente = terrain.prix_vente.unwrap_or(0);
            let benefice = prix_vente - terrain.prix_achat;

            vendus += 1;
            total_ventes += prix_vente;
            achats_vendus += terrain.prix_achat;
            somme_marges += (benefice as f64 / terrain.prix_achat as f64) * 100.0;

            ville.total_ventes += prix_vente;
            ville.benefice += benefice;

            if let Some(date_vente) = terrain.date_vente {
                let vente_mois = date_vente.format("%Y-%m").to_string();
                mois.entry(vente_mois).or_default().ventes += prix_vente;
            }

            sold.push(terrain);
        }
    }

    let total = terrains.len() as u64;
    let disponibles = total - vendus;

    // Zero sold terrains means zero margin, not NaN
    let marge_moyenne = if vendus > 0 {
        somme_marges / vendus as f64
    } else {
        0.0
    };

    let mut performance_par_ville: Vec<VillePerformance> = villes
        .into_iter()
        .map(|(ville, acc)| VillePerformance {
            ville,
            nombre_terrains: acc.nombre_terrains,
            total_achats: acc.total_achats,
            total_ventes: acc.total_ventes,
            benefice: acc.benefice,
        })
        .collect();
    performance_par_ville.sort_by(|a, b| {
        b.benefice
            .cmp(&a.benefice)
            .then_with(|| a.ville.cmp(&b.ville))
    });

    // BTreeMap keys are YYYY-MM, so key order is chronological order
    let evolution_mensuelle: Vec<MonthlyPoint> = mois
        .into_iter()
        .map(|(mois, acc)| MonthlyPoint {
            mois,
            achats: acc.achats,
            ventes: acc.ventes,
        })
        .collect();

    sold.sort_by(|a, b| {
        let ba = a.benefice().unwrap_or(0);
        let bb = b.benefice().unwrap_or(0);
        bb.cmp(&ba).then_with(|| a.id.cmp(&b.id))
    });
    let top_terrains: Vec<TopTerrain> = sold
        .iter()
        .take(TOP_TERRAINS)
        .map(|t| TopTerrain {
            id: t.id.clone(),
            localisation: format!("{} - {}", t.ville, t.commune),
            benefice: t.benefice().unwrap_or(0),
            marge: t.marge().unwrap_or(0.0),
        })
        .collect();

    AnalyticsReport {
        kpis: Kpis {
            total_terrains: total,
            terrains_vendus: vendus,
            terrains_disponibles: disponibles,
            total_achats,
            total_ventes,
            benefice_brut: total_ventes - achats_vendus,
            marge_moyenne,
        },
        performance_par_ville,
        evolution_mensuelle,
        repartition_statut: vec![
            StatutSlice {
                name: Statut::Disponible.to_string(),
                value: disponibles,
            },
            StatutSlice {
                name: Statut::Vendu.to_string(),
                value: vendus,
            },
        ],
        top_terrains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn terrain(
        id: &str,
        ville: &str,
        prix_achat: i64,
        date_achat: &str,
        vente: Option<(i64, &str)>,
    ) -> Terrain {
        let now = chrono::Utc::now().into();
        Terrain {
            id: id.into(),
            ville: ville.into(),
            commune: format!("{} Centre", ville),
            quartier: "Quartier".into(),
            superficie: 500,
            prix_achat,
            date_achat: NaiveDate::parse_from_str(date_achat, "%Y-%m-%d").unwrap(),
            vendeur_initial: "Vendeur".into(),
            statut: if vente.is_some() { "Vendu" } else { "Disponible" }.into(),
            prix_vente: vente.map(|(p, _)| p),
            date_vente: vente.map(|(_, d)| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            acheteur_final: vente.map(|_| "Acheteur".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reference_scenario() {
        // T001 sold 25M -> 35M, T002 available at 15M
        let terrains = vec![
            terrain("T001", "Abidjan", 25_000_000, "2023-01-15", Some((35_000_000, "2023-09-15"))),
            terrain("T002", "Bouaké", 15_000_000, "2023-03-01", None),
        ];

        let report = compute(&terrains);
        assert_eq!(report.kpis.total_achats, 40_000_000);
        assert_eq!(report.kpis.total_ventes, 35_000_000);
        assert_eq!(report.kpis.terrains_vendus, 1);
        assert_eq!(report.kpis.terrains_disponibles, 1);
        assert_eq!(report.kpis.benefice_brut, 10_000_000);
        assert_eq!(report.kpis.marge_moyenne, 40.0);
    }

    #[test]
    fn test_counts_always_add_up() {
        let terrains = vec![
            terrain("T001", "Abidjan", 10, "2023-01-01", Some((20, "2023-02-01"))),
            terrain("T002", "Abidjan", 10, "2023-01-01", None),
            terrain("T003", "Daloa", 10, "2023-01-01", None),
        ];
        let report = compute(&terrains);
        assert_eq!(
            report.kpis.total_terrains,
            report.kpis.terrains_vendus + report.kpis.terrains_disponibles
        );
    }

    #[test]
    fn test_empty_portfolio_yields_zeroes() {
        let report = compute(&[]);
        assert_eq!(report.kpis.total_terrains, 0);
        assert_eq!(report.kpis.benefice_brut, 0);
        assert_eq!(report.kpis.marge_moyenne, 0.0);
        assert!(report.top_terrains.is_empty());
        assert!(report.evolution_mensuelle.is_empty());
    }

    #[test]
    fn test_no_sold_terrains_means_zero_margin() {
        let terrains = vec![terrain("T001", "Abidjan", 10_000_000, "2023-01-01", None)];
        let report = compute(&terrains);
        assert_eq!(report.kpis.marge_moyenne, 0.0);
        assert_eq!(report.kpis.benefice_brut, 0);
    }

    #[test]
    fn test_average_margin_is_mean_of_percentages() {
        // 100% margin and 20% margin average to 60%, not the 33% a
        // ratio-of-sums would give
        let terrains = vec![
            terrain("T001", "A", 1_000_000, "2023-01-01", Some((2_000_000, "2023-02-01"))),
            terrain("T002", "B", 5_000_000, "2023-01-01", Some((6_000_000, "2023-02-01"))),
        ];
        let report = compute(&terrains);
        assert_eq!(report.kpis.marge_moyenne, 60.0);
    }

    #[test]
    fn test_cities_ordered_by_profit_desc() {
        let terrains = vec![
            terrain("T001", "Abidjan", 100, "2023-01-01", Some((150, "2023-02-01"))),
            terrain("T002", "Bouaké", 100, "2023-01-01", Some((300, "2023-02-01"))),
            terrain("T003", "Daloa", 100, "2023-01-01", None),
        ];
        let report = compute(&terrains);
        let villes: Vec<&str> = report
            .performance_par_ville
            .iter()
            .map(|v| v.ville.as_str())
            .collect();
        assert_eq!(villes, vec!["Bouaké", "Abidjan", "Daloa"]);
    }

    #[test]
    fn test_monthly_series_merges_purchases_and_sales() {
        let terrains = vec![terrain(
            "T001",
            "Abidjan",
            100,
            "2023-01-15",
            Some((150, "2023-03-20")),
        )];
        let report = compute(&terrains);
        assert_eq!(
            report.evolution_mensuelle,
            vec![
                MonthlyPoint { mois: "2023-01".into(), achats: 100, ventes: 0 },
                MonthlyPoint { mois: "2023-03".into(), achats: 0, ventes: 150 },
            ]
        );
    }

    #[test]
    fn test_purchase_and_sale_in_same_month_share_a_point() {
        let terrains = vec![terrain(
            "T001",
            "Abidjan",
            100,
            "2023-05-02",
            Some((150, "2023-05-28")),
        )];
        let report = compute(&terrains);
        assert_eq!(
            report.evolution_mensuelle,
            vec![MonthlyPoint { mois: "2023-05".into(), achats: 100, ventes: 150 }]
        );
    }

    #[test]
    fn test_monthly_series_is_chronological_across_years() {
        let terrains = vec![
            terrain("T001", "A", 100, "2024-02-01", None),
            terrain("T002", "B", 100, "2023-11-01", None),
        ];
        let report = compute(&terrains);
        let months: Vec<&str> = report
            .evolution_mensuelle
            .iter()
            .map(|m| m.mois.as_str())
            .collect();
        assert_eq!(months, vec!["2023-11", "2024-02"]);
    }

    #[test]
    fn test_top_terrains_ranked_by_absolute_profit() {
        let terrains: Vec<Terrain> = (1..=7)
            .map(|i| {
                terrain(
                    &format!("T{:03}", i),
                    "Abidjan",
                    1_000_000,
                    "2023-01-01",
                    Some((1_000_000 + i * 100_000, "2023-06-01")),
                )
            })
            .collect();

        let report = compute(&terrains);
        assert_eq!(report.top_terrains.len(), 5);
        assert_eq!(report.top_terrains[0].id, "T007");
        assert_eq!(report.top_terrains[0].benefice, 700_000);
        assert_eq!(report.top_terrains[4].id, "T003");
        assert!((report.top_terrains[0].marge - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_distribution_has_two_slices() {
        let terrains = vec![
            terrain("T001", "A", 100, "2023-01-01", Some((200, "2023-02-01"))),
            terrain("T002", "B", 100, "2023-01-01", None),
            terrain("T003", "C", 100, "2023-01-01", None),
        ];
        let report = compute(&terrains);
        assert_eq!(
            report.repartition_statut,
            vec![
                StatutSlice { name: "Disponible".into(), value: 2 },
                StatutSlice { name: "Vendu".into(), value: 1 },
            ]
        );
    }
}
