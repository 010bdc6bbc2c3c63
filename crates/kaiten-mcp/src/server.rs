//! MCP server using rmcp SDK
//!
//! Exposes Kaiten spaces, boards and cards as MCP tools. Every tool funnels
//! into the shared rate-limited [`ApiClient`] and relays its JSON result or
//! error unchanged.

use crate::tools::*;
use kaiten_api_client::{ApiClient, ApiError, ResourceId};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde_json::Value;
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

const INTERNAL_ERROR: ErrorCode = ErrorCode(-32603);

fn text_content(s: impl Into<String>) -> Content {
    Content {
        raw: RawContent::Text(RawTextContent { text: s.into() }),
        annotations: None,
    }
}

/// Map a client failure to an MCP error, keeping the upstream status.
fn api_error(e: &ApiError) -> ErrorData {
    ErrorData {
        code: INTERNAL_ERROR,
        message: Cow::from(e.to_string()),
        data: e.status().map(|status| serde_json::json!({ "status": status })),
    }
}

fn respond(
    tool: &'static str,
    result: Result<Value, ApiError>,
) -> Result<CallToolResult, ErrorData> {
    let body = result.map_err(|e| {
        tracing::error!(tool, error = %e, "Tool call failed");
        api_error(&e)
    })?;
    let text = serde_json::to_string(&body).map_err(|e| ErrorData {
        code: INTERNAL_ERROR,
        message: Cow::from(e.to_string()),
        data: None,
    })?;
    tracing::info!(tool, "Tool call succeeded");
    Ok(CallToolResult::success(vec![text_content(text)]))
}

#[derive(Debug, Clone)]
pub struct KaitenService {
    api_client: Arc<ApiClient>,
    tool_router: ToolRouter<KaitenService>,
}

#[tool_router]
impl KaitenService {
    pub fn new(api_client: Arc<ApiClient>) -> Self {
        Self {
            api_client,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all spaces")]
    async fn spaces_list(&self) -> Result<CallToolResult, ErrorData> {
        respond("spaces_list", self.api_client.spaces_list().await)
    }

    #[tool(description = "Get a space by ID")]
    async fn spaces_get(
        &self,
        Parameters(req): Parameters<IdRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = ResourceId::from(req.id);
        tracing::debug!(space_id = %id, "spaces_get");
        respond("spaces_get", self.api_client.spaces_get(id).await)
    }

    #[tool(description = "Create a space from the given fields")]
    async fn spaces_create(
        &self,
        Parameters(req): Parameters<CreateRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let data = Value::Object(req.data);
        respond("spaces_create", self.api_client.spaces_create(&data).await)
    }

    #[tool(description = "Update fields of a space")]
    async fn spaces_update(
        &self,
        Parameters(req): Parameters<UpdateRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = ResourceId::from(req.id);
        let data = Value::Object(req.data);
        tracing::debug!(space_id = %id, "spaces_update");
        respond("spaces_update", self.api_client.spaces_update(id, &data).await)
    }

    #[tool(description = "Delete a space by ID")]
    async fn spaces_delete(
        &self,
        Parameters(req): Parameters<IdRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = ResourceId::from(req.id);
        tracing::debug!(space_id = %id, "spaces_delete");
        respond("spaces_delete", self.api_client.spaces_delete(id).await)
    }

    #[tool(description = "List boards in a space")]
    async fn boards_list(
        &self,
        Parameters(req): Parameters<SpaceRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let space_id = ResourceId::from(req.space_id);
        tracing::debug!(space_id = %space_id, "boards_list");
        respond("boards_list", self.api_client.boards_list(space_id).await)
    }

    #[tool(description = "Get a board by ID")]
    async fn boards_get(
        &self,
        Parameters(req): Parameters<IdRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = ResourceId::from(req.id);
        tracing::debug!(board_id = %id, "boards_get");
        respond("boards_get", self.api_client.boards_get(id).await)
    }

    #[tool(description = "Create a board in a space")]
    async fn boards_create(
        &self,
        Parameters(req): Parameters<CreateBoardRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let space_id = ResourceId::from(req.space_id);
        let data = Value::Object(req.data);
        tracing::debug!(space_id = %space_id, "boards_create");
        respond(
            "boards_create",
            self.api_client.boards_create(space_id, &data).await,
        )
    }

    #[tool(description = "Update fields of a board in a space")]
    async fn boards_update(
        &self,
        Parameters(req): Parameters<UpdateBoardRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let board_id = ResourceId::from(req.board_id);
        let space_id = ResourceId::from(req.space_id);
        let data = Value::Object(req.data);
        tracing::debug!(board_id = %board_id, space_id = %space_id, "boards_update");
        respond(
            "boards_update",
            self.api_client
                .boards_update(board_id, space_id, &data)
                .await,
        )
    }

    #[tool(description = "Delete a board from a space, including its cards")]
    async fn boards_delete(
        &self,
        Parameters(req): Parameters<DeleteBoardRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let board_id = ResourceId::from(req.board_id);
        let space_id = ResourceId::from(req.space_id);
        tracing::debug!(board_id = %board_id, space_id = %space_id, "boards_delete");
        respond(
            "boards_delete",
            self.api_client.boards_delete(board_id, space_id).await,
        )
    }

    #[tool(description = "List cards")]
    async fn cards_list(&self) -> Result<CallToolResult, ErrorData> {
        respond("cards_list", self.api_client.cards_list().await)
    }

    #[tool(description = "Get a card by ID")]
    async fn cards_get(
        &self,
        Parameters(req): Parameters<IdRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = ResourceId::from(req.id);
        tracing::debug!(card_id = %id, "cards_get");
        respond("cards_get", self.api_client.cards_get(id).await)
    }

    #[tool(description = "Create a card from the given fields")]
    async fn cards_create(
        &self,
        Parameters(req): Parameters<CreateRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let data = Value::Object(req.data);
        respond("cards_create", self.api_client.cards_create(&data).await)
    }

    #[tool(description = "Update fields of a card")]
    async fn cards_update(
        &self,
        Parameters(req): Parameters<UpdateRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = ResourceId::from(req.id);
        let data = Value::Object(req.data);
        tracing::debug!(card_id = %id, "cards_update");
        respond("cards_update", self.api_client.cards_update(id, &data).await)
    }

    #[tool(description = "Delete a card by ID")]
    async fn cards_delete(
        &self,
        Parameters(req): Parameters<IdRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let id = ResourceId::from(req.id);
        tracing::debug!(card_id = %id, "cards_delete");
        respond("cards_delete", self.api_client.cards_delete(id).await)
    }
}

#[tool_handler]
impl ServerHandler for KaitenService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "kaiten-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "Kaiten MCP: list, get, create, update and delete spaces, boards and cards. \
                 Identifiers may be numbers or strings; data fields are passed to Kaiten as-is."
                    .to_string(),
            ),
        }
    }
}
