//! Request / response bodies of the `/api` routes.

use arcadegen_core::GameRecord;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for `POST /api/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct GenerateRequest {
    /// Free-text description of the game to build, at most 2000 characters.
    #[serde(default)]
    #[validate(length(max = 2000, message = "prompt must be at most 2000 characters"))]
    pub prompt: String,
}

/// A stored game as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    pub title: String,
    pub prompt: String,
    /// Extracted source text, unmodified.
    pub code: String,
    /// RFC 3339 creation time (UTC).
    pub created_at: String,
    pub play_count: u64,
}

impl From<GameRecord> for GameResponse {
    fn from(r: GameRecord) -> Self {
        Self {
            id: r.id,
            title: r.title,
            prompt: r.prompt,
            code: r.code,
            created_at: r.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            play_count: r.play_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameEnvelope {
    pub success: bool,
    pub game: GameResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameListEnvelope {
    pub success: bool,
    /// Newest first.
    pub games: Vec<GameResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    pub error: String,
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn response_uses_camel_case_keys() {
        let created = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let record = GameRecord::new("1700000000123".into(), "pong", "code".into(), created);
        let json = serde_json::to_value(GameResponse::from(record)).unwrap();
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20.123Z");
        assert_eq!(json["playCount"], 0);
        assert_eq!(json["title"], "pong");
    }

    #[test]
    fn overlong_prompt_fails_validation() {
        let req = GenerateRequest {
            prompt: "x".repeat(2001),
        };
        assert!(req.validate().is_err());
        let ok = GenerateRequest {
            prompt: "x".repeat(2000),
        };
        assert!(ok.validate().is_ok());
    }
}
