use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use super::{required, PlayerQuery, RiotIdQuery};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::service::UnitAnalysis;

#[derive(Debug, Serialize)]
pub struct UnitsResponse {
    #[serde(flatten)]
    pub analysis: UnitAnalysis,

    pub tft_set: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub riot_id: Option<String>,
}

/// Blank `unit` values mean "summarize the most-played units".
fn requested_unit(unit: Option<String>) -> Option<String> {
    unit.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

pub async fn analyze_units(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<UnitsResponse>, ApiError> {
    let puuid = required(query.puuid, "puuid")?;
    let unit = requested_unit(query.unit);

    let analysis = state.analyzer.units(&puuid, unit.as_deref()).await?;

    Ok(Json(UnitsResponse {
        analysis,
        tft_set: state.analyzer.set_version(),
        riot_id: None,
    }))
}

pub async fn analyze_units_riot_id(
    State(state): State<AppState>,
    Query(query): Query<RiotIdQuery>,
) -> Result<Json<UnitsResponse>, ApiError> {
    let game_name = required(query.game_name, "gameName")?;
    let tag_line = required(query.tag_line, "tagLine")?;
    let unit = requested_unit(query.unit);

    let puuid = state.analyzer.resolve(&game_name, &tag_line).await?;
    let analysis = state.analyzer.units(&puuid, unit.as_deref()).await?;

    Ok(Json(UnitsResponse {
        analysis,
        tft_set: state.analyzer.set_version(),
        riot_id: Some(format!("{}#{}", game_name, tag_line)),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::build_router;
    use crate::api::routes::testing::{get_json, test_state};
    use crate::fetch::mock::MockMatchSource;
    use crate::reference::NativeTraitIndex;
    use crate::service::testing::{history, PLAYER};

    fn natives() -> NativeTraitIndex {
        NativeTraitIndex::from_entries(vec![
            ("TFT14_Jinx".to_string(), vec!["Marksman".to_string()]),
            ("TFT14_Vi".to_string(), vec!["StreetDemon".to_string()]),
        ])
    }

    #[tokio::test]
    async fn test_single_unit() {
        let app = build_router(test_state(MockMatchSource::with_matches(history()), natives()));
        let (status, _, json) = get_json(
            app,
            &format!("/analyze-units?puuid={}&unit=TFT14_Jinx", PLAYER),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["unit_name"], "TFT14_Jinx");
        assert_eq!(json["games_analyzed"], 12);
        assert_eq!(json["native_traits"][0], "Marksman");
        assert_eq!(json["synergy_traits"][0]["trait"], "StreetDemon");
        assert_eq!(json["item_combinations"][0]["avg_placement"], 4.0);
        assert_eq!(json["tft_set"], 14);
        assert!(json.get("total_games").is_none());
    }

    #[tokio::test]
    async fn test_unit_summary() {
        let app = build_router(test_state(MockMatchSource::with_matches(history()), natives()));
        let (status, _, json) = get_json(app, &format!("/analyze-units?puuid={}&unit=", PLAYER)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_games_analyzed"], 12);
        assert_eq!(json["total_unit_instances"], 24);
        assert_eq!(json["top_units"][0]["unit_name"], "TFT14_Jinx");
        assert_eq!(json["top_units"][0]["total_games"], 12);
        assert_eq!(json["tft_set"], 14);
    }

    #[tokio::test]
    async fn test_unit_not_found() {
        let app = build_router(test_state(MockMatchSource::with_matches(history()), natives()));
        let (status, _, json) = get_json(
            app,
            &format!("/analyze-units?puuid={}&unit=TFT14_Nobody", PLAYER),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_units_riot_id() {
        let source = MockMatchSource::with_matches(history()).with_account("Player", "NA1", PLAYER);
        let app = build_router(test_state(source, natives()));
        let (status, _, json) = get_json(
            app,
            "/analyze-units-riot-id?gameName=Player&tagLine=NA1&unit=TFT14_Vi",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["unit_name"], "TFT14_Vi");
        assert_eq!(json["riot_id"], "Player#NA1");
        assert_eq!(json["item_combinations"].as_array().unwrap().len(), 0);
    }
}
