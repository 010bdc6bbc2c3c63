//! Resource operations for spaces, boards and cards.
//!
//! Each method binds its parameters into a path under [`API_PREFIX`] and
//! delegates to [`ApiClient::execute`]. Payloads and responses are passed
//! through as raw JSON.

use crate::{ApiClient, ApiError, API_PREFIX};
use reqwest::Method;
use serde_json::{json, Value};
use std::fmt;

/// Identifier of a space, board or card.
///
/// Numeric and string identifiers normalize to the same string, so `42` and
/// `"42"` address the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<&String> for ResourceId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

macro_rules! resource_id_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ResourceId {
            fn from(id: $t) -> Self {
                Self(id.to_string())
            }
        })*
    };
}

resource_id_from_int!(i32, i64, u32, u64, usize);

impl ApiClient {
    // Spaces

    pub async fn spaces_list(&self) -> Result<Value, ApiError> {
        self.execute(Method::GET, &format!("{}/spaces", API_PREFIX), None)
            .await
    }

    pub async fn spaces_get(&self, space_id: impl Into<ResourceId>) -> Result<Value, ApiError> {
        let path = format!("{}/spaces/{}", API_PREFIX, space_id.into());
        self.execute(Method::GET, &path, None).await
    }

    pub async fn spaces_create(&self, data: &Value) -> Result<Value, ApiError> {
        self.execute(Method::POST, &format!("{}/spaces", API_PREFIX), Some(data))
            .await
    }

    pub async fn spaces_update(
        &self,
        space_id: impl Into<ResourceId>,
        data: &Value,
    ) -> Result<Value, ApiError> {
        let path = format!("{}/spaces/{}", API_PREFIX, space_id.into());
        self.execute(Method::PATCH, &path, Some(data)).await
    }

    pub async fn spaces_delete(&self, space_id: impl Into<ResourceId>) -> Result<Value, ApiError> {
        let path = format!("{}/spaces/{}", API_PREFIX, space_id.into());
        self.execute(Method::DELETE, &path, None).await
    }

    // Boards

    pub async fn boards_list(&self, space_id: impl Into<ResourceId>) -> Result<Value, ApiError> {
        let path = format!("{}/spaces/{}/boards", API_PREFIX, space_id.into());
        self.execute(Method::GET, &path, None).await
    }

    pub async fn boards_get(&self, board_id: impl Into<ResourceId>) -> Result<Value, ApiError> {
        let path = format!("{}/boards/{}", API_PREFIX, board_id.into());
        self.execute(Method::GET, &path, None).await
    }

    pub async fn boards_create(
        &self,
        space_id: impl Into<ResourceId>,
        data: &Value,
    ) -> Result<Value, ApiError> {
        let path = format!("{}/spaces/{}/boards", API_PREFIX, space_id.into());
        self.execute(Method::POST, &path, Some(data)).await
    }

    pub async fn boards_update(
        &self,
        board_id: impl Into<ResourceId>,
        space_id: impl Into<ResourceId>,
        data: &Value,
    ) -> Result<Value, ApiError> {
        let path = format!(
            "{}/spaces/{}/boards/{}",
            API_PREFIX,
            space_id.into(),
            board_id.into()
        );
        self.execute(Method::PATCH, &path, Some(data)).await
    }

    /// Delete a board. Kaiten requires `{"force": true}` to remove a board
    /// that still has cards.
    pub async fn boards_delete(
        &self,
        board_id: impl Into<ResourceId>,
        space_id: impl Into<ResourceId>,
    ) -> Result<Value, ApiError> {
        let path = format!(
            "{}/spaces/{}/boards/{}",
            API_PREFIX,
            space_id.into(),
            board_id.into()
        );
        self.execute(Method::DELETE, &path, Some(&json!({ "force": true })))
            .await
    }

    // Cards

    pub async fn cards_list(&self) -> Result<Value, ApiError> {
        self.execute(Method::GET, &format!("{}/cards", API_PREFIX), None)
            .await
    }

    pub async fn cards_get(&self, card_id: impl Into<ResourceId>) -> Result<Value, ApiError> {
        let path = format!("{}/cards/{}", API_PREFIX, card_id.into());
        self.execute(Method::GET, &path, None).await
    }

    pub async fn cards_create(&self, data: &Value) -> Result<Value, ApiError> {
        self.execute(Method::POST, &format!("{}/cards", API_PREFIX), Some(data))
            .await
    }

    pub async fn cards_update(
        &self,
        card_id: impl Into<ResourceId>,
        data: &Value,
    ) -> Result<Value, ApiError> {
        let path = format!("{}/cards/{}", API_PREFIX, card_id.into());
        self.execute(Method::PATCH, &path, Some(data)).await
    }

    pub async fn cards_delete(&self, card_id: impl Into<ResourceId>) -> Result<Value, ApiError> {
        let path = format!("{}/cards/{}", API_PREFIX, card_id.into());
        self.execute(Method::DELETE, &path, None).await
    }
}
