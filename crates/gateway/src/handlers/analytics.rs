//! Portfolio analytics handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use foncier_common::{
    analytics::{self, Kpis, MonthlyPoint, StatutSlice, TopTerrain, VillePerformance},
    auth::SessionContext,
    db::Repository,
    errors::Result,
    metrics,
};

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub kpis: Kpis,
    pub charts: Charts,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub performance_par_ville: Vec<VillePerformance>,
    pub evolution_mensuelle: Vec<MonthlyPoint>,
    pub repartition_statut: Vec<StatutSlice>,
    pub top_terrains: Vec<TopTerrain>,
}

/// Compute the analytics report over the full portfolio
pub async fn get_analytics(
    State(state): State<AppState>,
    _session: SessionContext,
) -> Result<Json<AnalyticsResponse>> {
    let repo = Repository::new(state.db.clone());

    let start = std::time::Instant::now();
    let terrains = repo.all_terrains().await?;
    let report = analytics::compute(&terrains);
    metrics::record_analytics(start.elapsed().as_secs_f64());

    tracing::debug!(
        total = report.kpis.total_terrains,
        vendus = report.kpis.terrains_vendus,
        "Analytics report computed"
    );

    Ok(Json(AnalyticsResponse {
        kpis: report.kpis,
        charts: Charts {
            performance_par_ville: report.performance_par_ville,
            evolution_mensuelle: report.evolution_mensuelle,
            repartition_statut: report.repartition_statut,
            top_terrains: report.top_terrains,
        },
    }))
}
