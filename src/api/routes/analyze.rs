use axum::extract::{Query, State};
use axum::Json;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{required, PlayerQuery, RiotIdQuery};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Dimension, DimensionRanking};

/// `{top_<plural>: [...], bottom_<plural>: [...], tft_set, riot_id?}`
#[derive(Debug)]
pub struct DimensionResponse {
    pub ranking: DimensionRanking,
    pub tft_set: u32,
    pub riot_id: Option<String>,
}

impl Serialize for DimensionResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let dimension = self.ranking.dimension;
        let top: Vec<_> = self.ranking.top.iter().map(|s| s.labeled(dimension)).collect();
        let bottom: Vec<_> = self.ranking.bottom.iter().map(|s| s.labeled(dimension)).collect();

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(&format!("top_{}", dimension.plural()), &top)?;
        map.serialize_entry(&format!("bottom_{}", dimension.plural()), &bottom)?;
        map.serialize_entry("tft_set", &self.tft_set)?;
        if let Some(riot_id) = &self.riot_id {
            map.serialize_entry("riot_id", riot_id)?;
        }
        map.end()
    }
}

async fn rank_by_puuid(
    state: &AppState,
    dimension: Dimension,
    query: PlayerQuery,
) -> Result<Json<DimensionResponse>, ApiError> {
    let puuid = required(query.puuid, "puuid")?;
    let ranking = state.analyzer.rank(&puuid, dimension).await?;

    Ok(Json(DimensionResponse {
        ranking,
        tft_set: state.analyzer.set_version(),
        riot_id: None,
    }))
}

async fn rank_by_riot_id(
    state: &AppState,
    dimension: Dimension,
    query: RiotIdQuery,
) -> Result<Json<DimensionResponse>, ApiError> {
    let game_name = required(query.game_name, "gameName")?;
    let tag_line = required(query.tag_line, "tagLine")?;

    let puuid = state.analyzer.resolve(&game_name, &tag_line).await?;
    let ranking = state.analyzer.rank(&puuid, dimension).await?;

    Ok(Json(DimensionResponse {
        ranking,
        tft_set: state.analyzer.set_version(),
        riot_id: Some(format!("{}#{}", game_name, tag_line)),
    }))
}

pub async fn analyze_traits(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<DimensionResponse>, ApiError> {
    rank_by_puuid(&state, Dimension::Trait, query).await
}

pub async fn analyze_traits_riot_id(
    State(state): State<AppState>,
    Query(query): Query<RiotIdQuery>,
) -> Result<Json<DimensionResponse>, ApiError> {
    rank_by_riot_id(&state, Dimension::Trait, query).await
}

pub async fn analyze_items(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<DimensionResponse>, ApiError> {
    rank_by_puuid(&state, Dimension::Item, query).await
}

pub async fn analyze_items_riot_id(
    State(state): State<AppState>,
    Query(query): Query<RiotIdQuery>,
) -> Result<Json<DimensionResponse>, ApiError> {
    rank_by_riot_id(&state, Dimension::Item, query).await
}

pub async fn analyze_augments(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<DimensionResponse>, ApiError> {
    rank_by_puuid(&state, Dimension::Augment, query).await
}

pub async fn analyze_augments_riot_id(
    State(state): State<AppState>,
    Query(query): Query<RiotIdQuery>,
) -> Result<Json<DimensionResponse>, ApiError> {
    rank_by_riot_id(&state, Dimension::Augment, query).await
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::api::build_router;
    use crate::api::routes::testing::{get_json, test_state};
    use crate::fetch::mock::MockMatchSource;
    use crate::fetch::FetchError;
    use crate::models::DimensionStat;
    use crate::reference::NativeTraitIndex;
    use crate::service::testing::{history, PLAYER};

    fn app(source: MockMatchSource) -> axum::Router {
        build_router(test_state(source, NativeTraitIndex::empty()))
    }

    #[test]
    fn test_dimension_response_shape() {
        let stat = DimensionStat::from_counts("TFT_Item_Bow".to_string(), 3, 1);
        let response = DimensionResponse {
            ranking: DimensionRanking {
                dimension: Dimension::Item,
                top: vec![stat.clone()],
                bottom: vec![stat],
            },
            tft_set: 14,
            riot_id: None,
        };

        let row = json!({"Item": "TFT_Item_Bow", "Top 4 Rate": 0.75, "Bottom 4 Rate": 0.25, "Games Played": 4});
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"top_items": [row.clone()], "bottom_items": [row], "tft_set": 14})
        );
    }

    #[tokio::test]
    async fn test_analyze_traits() {
        let (status, _, json) = get_json(
            app(MockMatchSource::with_matches(history())),
            &format!("/analyze-traits?puuid={}", PLAYER),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tft_set"], 14);
        assert_eq!(json["top_traits"][0]["Trait"], "TFT14_Marksman");
        assert_eq!(json["top_traits"][0]["Games Played"], 12);
        assert_eq!(json["bottom_traits"][0]["Bottom 4 Rate"], 0.5);
        assert!(json.get("riot_id").is_none());
    }

    #[tokio::test]
    async fn test_analyze_items() {
        let (status, _, json) = get_json(
            app(MockMatchSource::with_matches(history())),
            &format!("/analyze-items?puuid={}", PLAYER),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let items: Vec<_> = json["top_items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["Item"].as_str().unwrap())
            .collect();
        assert_eq!(items, vec!["TFT_Item_Rageblade", "TFT_Item_Bow"]);
    }

    #[tokio::test]
    async fn test_analyze_augments_riot_id() {
        let source = MockMatchSource::with_matches(history()).with_account("Player", "NA1", PLAYER);
        let (status, _, json) = get_json(
            app(source),
            "/analyze-augments-riot-id?gameName=Player&tagLine=NA1",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["riot_id"], "Player#NA1");
        assert_eq!(json["top_augments"][0]["Augment"], "Augment_Pandora");
    }

    #[tokio::test]
    async fn test_missing_puuid() {
        let (status, _, json) = get_json(app(MockMatchSource::default()), "/analyze-traits").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "BAD_REQUEST");
        assert_eq!(json["error"], "puuid parameter is required");
    }

    #[tokio::test]
    async fn test_missing_tag_line() {
        let (status, _, json) =
            get_json(app(MockMatchSource::default()), "/analyze-items-riot-id?gameName=Player").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "tagLine parameter is required");
    }

    #[tokio::test]
    async fn test_unknown_riot_id() {
        let (status, _, json) = get_json(
            app(MockMatchSource::default()),
            "/analyze-traits-riot-id?gameName=Nobody&tagLine=NA1",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_empty_history() {
        let (status, _, json) =
            get_json(app(MockMatchSource::default()), "/analyze-traits?puuid=abc").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "INSUFFICIENT_DATA");
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let source = MockMatchSource {
            ids_error: Some(FetchError::RateLimited { retry_after_secs: 15 }),
            ..MockMatchSource::default()
        };
        let (status, headers, json) = get_json(app(source), "/analyze-items?puuid=abc").await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(headers[header::RETRY_AFTER], "15");
        assert_eq!(json["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_upstream_timeout() {
        let source = MockMatchSource {
            ids_error: Some(FetchError::Timeout),
            ..MockMatchSource::default()
        };
        let (status, _, _) = get_json(app(source), "/analyze-augments?puuid=abc").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_invalid_key_is_server_error() {
        let source = MockMatchSource {
            ids_error: Some(FetchError::Unauthorized),
            ..MockMatchSource::default()
        };
        let (status, _, json) = get_json(app(source), "/analyze-traits?puuid=abc").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }
}
