/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Runs tool calls against the habit store
/// 3. Writes JSON-RPC responses to stdout

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::domain::{CalendarDate, UserId};
use crate::mcp::protocol::*;
use crate::tools::{self, ToolError};
use crate::{HabitTrackerServer, ServerError};

/// MCP server that handles communication with a client
pub struct McpServer {
    habit_tracker: HabitTrackerServer,
    /// Whether the client has completed the handshake
    initialized: bool,
}

impl McpServer {
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line) {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications, which get no reply.
    pub fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        self.handle_request(request)
    }

    fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let is_notification = request.id.is_null();

        match request.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                if is_notification {
                    None
                } else {
                    Some(JsonRpcResponse::success(request.id, Value::Null))
                }
            }
            method if is_notification && method.starts_with("notifications/") => {
                debug!("Ignoring notification '{}'", method);
                None
            }
            "initialize" => Some(self.handle_initialize(request)),
            "tools/list" => Some(self.handle_tools_list(request)),
            "tools/call" => Some(self.handle_tools_call(request)),
            _ => Some(JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            )),
        }
    }

    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Habit Stats MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond(request.id, &result)
    }

    fn handle_tools_list(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        respond(request.id, &json!({ "tools": tool_definitions() }))
    }

    fn handle_tools_call(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match request.params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let result = self.call_tool(&tool_params.name, tool_params.arguments);
        respond(request.id, &result)
    }

    /// Route a tool call to its implementation
    fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> ToolCallResult {
        let storage = self.habit_tracker.storage();
        let engine = self.habit_tracker.engine();
        let today = CalendarDate::today();

        match name {
            "habit_create" => invoke(arguments, |user, p| tools::create_habit(storage, &user, p)),
            "habit_update" => invoke(arguments, |user, p| tools::update_habit(storage, &user, p)),
            "habit_delete" => invoke(arguments, |user, p| {
                tools::delete_habit(storage, &user, p).map(|()| json!({ "deleted": true }))
            }),
            "habit_log" => invoke(arguments, |user, p| tools::log_habit(storage, &user, p, today)),
            "habit_unlog" => invoke(arguments, |user, p| tools::unlog_habit(storage, &user, p, today)),
            "habit_list" => invoke(arguments, |user, p| tools::list_habits(storage, engine, &user, p, today)),
            "habit_stats" => invoke(arguments, |user, p| tools::habit_stats(storage, engine, &user, p, today)),
            "category_create" => invoke(arguments, |user, p| tools::create_category(storage, &user, p)),
            "category_list" => invoke(arguments, |user, p| tools::list_categories(storage, &user, p)),
            "category_update" => invoke(arguments, |user, p| tools::update_category(storage, &user, p)),
            "category_delete" => invoke(arguments, |user, p| {
                tools::delete_category(storage, &user, p).map(|()| json!({ "deleted": true }))
            }),
            _ => ToolCallResult::error(error_codes::METHOD_NOT_FOUND, format!("Unknown tool: {}", name)),
        }
    }
}

/// Decode the arguments, run the tool and render its output as JSON text
fn invoke<P, R, F>(arguments: Map<String, Value>, tool: F) -> ToolCallResult
where
    P: DeserializeOwned,
    R: Serialize,
    F: FnOnce(UserId, P) -> Result<R, ToolError>,
{
    let request: ToolRequest<P> = match serde_json::from_value(Value::Object(arguments)) {
        Ok(request) => request,
        Err(e) => {
            return ToolCallResult::error(error_codes::INVALID_PARAMS, format!("Invalid arguments: {}", e));
        }
    };

    let user_id = match UserId::from_string(&request.user_id) {
        Ok(id) => id,
        Err(_) => {
            return ToolCallResult::error(
                error_codes::INVALID_PARAMS,
                format!("Invalid user_id '{}'", request.user_id),
            );
        }
    };

    match tool(user_id, request.params) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => ToolCallResult::success(text),
            Err(e) => ToolCallResult::error(error_codes::INTERNAL_ERROR, e.to_string()),
        },
        Err(e) => {
            debug!("Tool call failed: {}", e);
            ToolCallResult::error(tool_error_to_json_rpc_code(&e), e.to_string())
        }
    }
}

fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
    }
}

fn definition<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(ToolRequest<P>);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or(Value::Null),
    }
}

/// Every tool this server exposes
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        definition::<tools::CreateHabitParams>("habit_create", "Create a new daily or weekly habit"),
        definition::<tools::UpdateHabitParams>(
            "habit_update",
            "Change a habit's title, frequency or category",
        ),
        definition::<tools::DeleteHabitParams>(
            "habit_delete",
            "Permanently delete a habit and its completion history",
        ),
        definition::<tools::CompletionParams>(
            "habit_log",
            "Mark a habit as completed on a day (defaults to today)",
        ),
        definition::<tools::CompletionParams>("habit_unlog", "Remove a completion from a habit"),
        definition::<tools::ListHabitsParams>(
            "habit_list",
            "List habits with filters and pagination, each with its last 30 days of statistics",
        ),
        definition::<tools::StatsParams>(
            "habit_stats",
            "Completion statistics for every habit over a date window, plus overall totals",
        ),
        definition::<tools::CreateCategoryParams>("category_create", "Create a category for grouping habits"),
        definition::<tools::ListCategoriesParams>("category_list", "List categories ordered by name"),
        definition::<tools::UpdateCategoryParams>("category_update", "Rename or recolor a category"),
        definition::<tools::CategoryRefParams>(
            "category_delete",
            "Delete a category; its habits become uncategorized",
        ),
    ]
}
