//! MCP tool request types with JSON Schema for AI parameter generation

use kaiten_api_client::ResourceId;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Identifier accepted as either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IdParam {
    Number(i64),
    Text(String),
}

impl From<IdParam> for ResourceId {
    fn from(id: IdParam) -> Self {
        match id {
            IdParam::Number(n) => ResourceId::from(n),
            IdParam::Text(s) => ResourceId::from(s),
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IdRequest {
    #[schemars(description = "Resource ID (number or string)")]
    pub id: IdParam,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateRequest {
    #[schemars(description = "Fields of the new resource, passed to Kaiten as-is")]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateRequest {
    #[schemars(description = "Resource ID (number or string)")]
    pub id: IdParam,
    #[schemars(description = "Fields to change, passed to Kaiten as-is")]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SpaceRequest {
    #[schemars(description = "Space ID (number or string)")]
    pub space_id: IdParam,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateBoardRequest {
    #[schemars(description = "ID of the space that will contain the board")]
    pub space_id: IdParam,
    #[schemars(description = "Fields of the new board, passed to Kaiten as-is")]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateBoardRequest {
    #[schemars(description = "Board ID (number or string)")]
    pub board_id: IdParam,
    #[schemars(description = "ID of the space containing the board")]
    pub space_id: IdParam,
    #[schemars(description = "Fields to change, passed to Kaiten as-is")]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteBoardRequest {
    #[schemars(description = "Board ID (number or string)")]
    pub board_id: IdParam,
    #[schemars(description = "ID of the space containing the board")]
    pub space_id: IdParam,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_accept_numbers_and_strings() {
        let by_number: IdRequest = serde_json::from_value(json!({ "id": 42 })).unwrap();
        let by_string: IdRequest = serde_json::from_value(json!({ "id": "42" })).unwrap();

        assert_eq!(by_number.id, IdParam::Number(42));
        assert_eq!(
            ResourceId::from(by_number.id),
            ResourceId::from(by_string.id)
        );
    }

    #[test]
    fn update_board_requires_both_ids() {
        let parsed: Result<UpdateBoardRequest, _> =
            serde_json::from_value(json!({ "board_id": 1, "data": {} }));
        assert!(parsed.is_err());
    }

    #[test]
    fn data_must_be_an_object() {
        let parsed: Result<CreateRequest, _> = serde_json::from_value(json!({ "data": [1, 2] }));
        assert!(parsed.is_err());
    }
}
