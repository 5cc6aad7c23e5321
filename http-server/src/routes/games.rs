use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tavern::types::{Currency, Game, GameMember, Id, JoinType};
use tavern::validation::CreateGameInput;

use super::{DataResponse, run_blocking};
use crate::{
    AppState,
    error::ApiError,
    middleware::{AuthUser, BearerClaims},
};

// Game response model
#[derive(Serialize)]
pub struct GameResponse {
    pub id: Id,
    pub code: String,
    pub bet: u64,
    pub winning_points: u64,
    pub link: String,
    pub join_type: JoinType,
    pub creator_id: Id,
    pub currency: Currency,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub members: Vec<GameMember>,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        GameResponse {
            id: game.id,
            link: game.code.clone(),
            code: game.code,
            bet: game.bet,
            winning_points: game.winning_points,
            join_type: game.join_type,
            creator_id: game.creator_id,
            currency: game.currency,
            started_at: game.started_at,
            finished_at: game.finished_at,
            members: game.members,
        }
    }
}

// Create game endpoint
pub async fn create_game(
    State(state): State<AppState>,
    BearerClaims(claims): BearerClaims,
    payload: Result<Json<CreateGameInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<GameResponse>>), ApiError> {
    let Json(input) = payload?;

    // Static checks fail fast, before any lookup
    let new_game = input.validate()?;

    let auth = state.auth.clone();
    let games = state.games.clone();
    let game = run_blocking(move || {
        let user = auth.user_for(&claims)?;
        games.create_game(user.id, &new_game)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(GameResponse::from(game))),
    ))
}

// Look up a game by its join code
pub async fn get_game(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(code): Path<String>,
) -> Result<Json<DataResponse<GameResponse>>, ApiError> {
    let games = state.games.clone();
    let game = run_blocking(move || games.find_by_code(&code)).await?;
    Ok(Json(DataResponse::new(GameResponse::from(game))))
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode};
    use serde_json::{Value, json};

    use crate::routes::test_support::{register, send, test_app};

    async fn bronze_id(app: &Router) -> i64 {
        let (_, body) = send(app, "GET", "/api/currencies", None, None).await;
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["slug"] == "bronze")
            .unwrap()["id"]
            .as_i64()
            .unwrap()
    }

    async fn create(app: &Router, token: &str, body: Value) -> (StatusCode, Value) {
        send(app, "POST", "/api/games", Some(token), Some(body)).await
    }

    #[tokio::test]
    async fn test_create_game_with_enough_bronze() {
        let app = test_app();
        let token = register(&app, "alice").await;
        let bronze = bronze_id(&app).await;

        let (status, body) = create(
            &app,
            &token,
            json!({ "currency_id": bronze, "bet": 500, "winning_points": 5000, "join_type": "anyone" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let game = &body["data"];
        assert_eq!(game["bet"], 500);
        assert_eq!(game["winning_points"], 5000);
        assert_eq!(game["join_type"], "anyone");
        assert_eq!(game["currency"]["slug"], "bronze");
        assert_eq!(game["link"], game["code"]);
        assert_eq!(game["members"].as_array().unwrap().len(), 1);

        let code = game["code"].as_str().unwrap();
        let (status, body) =
            send(&app, "GET", &format!("/api/games/{code}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], game["id"]);
    }

    #[tokio::test]
    async fn test_bet_above_balance_is_rejected() {
        let app = test_app();
        let token = register(&app, "alice").await;
        let bronze = bronze_id(&app).await;

        let (status, body) = create(
            &app,
            &token,
            json!({ "currency_id": bronze, "bet": 1500, "winning_points": 5000, "join_type": "anyone" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "insufficient funds: balance 1000, bet 1500");
    }

    #[tokio::test]
    async fn test_static_validation_runs_before_lookups() {
        let app = test_app();
        let token = register(&app, "alice").await;

        // Currency 999 doesn't exist; the range error must win.
        let (status, body) = create(
            &app,
            &token,
            json!({ "currency_id": 999, "bet": 10, "winning_points": 20001, "join_type": "anyone" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "winning_points");

        let (status, body) = create(
            &app,
            &token,
            json!({ "currency_id": 999, "bet": 10, "winning_points": 5000, "join_type": "public" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "join_type");
        assert_eq!(body["message"], "invalid join type public");

        let (status, body) = create(
            &app,
            &token,
            json!({ "currency_id": 999, "winning_points": 5000, "join_type": "link" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "bet");
    }

    #[tokio::test]
    async fn test_unknown_currency_and_missing_balance() {
        let app = test_app();
        let token = register(&app, "alice").await;

        let (status, body) = create(
            &app,
            &token,
            json!({ "currency_id": 999, "bet": 10, "winning_points": 5000, "join_type": "friends" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "currency not found");

        let (_, currencies) = send(&app, "GET", "/api/currencies", None, None).await;
        let gold = currencies["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["slug"] == "gold")
            .unwrap()["id"]
            .clone();
        let (status, body) = create(
            &app,
            &token,
            json!({ "currency_id": gold, "bet": 10, "winning_points": 5000, "join_type": "friends" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "balance not found");
    }

    #[tokio::test]
    async fn test_games_require_auth() {
        let app = test_app();
        let (status, _) = send(
            &app,
            "POST",
            "/api/games",
            None,
            Some(json!({ "currency_id": 1, "bet": 10, "winning_points": 5000, "join_type": "anyone" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/api/games/whatever", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_game_code() {
        let app = test_app();
        let token = register(&app, "alice").await;
        let (status, body) = send(&app, "GET", "/api/games/nope", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "game not found");
    }
}
