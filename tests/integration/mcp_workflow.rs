/// End-to-end tool calls through the JSON-RPC request handler
use habit_stats_server::mcp::protocol::error_codes;
use habit_stats_server::*;
use serde_json::{json, Value};
use tempfile::TempDir;

struct Harness {
    server: McpServer,
    next_id: u64,
    _dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let tracker = HabitTrackerServer::new(dir.path().join("habits.db"), StatsEngine::default())
            .await
            .expect("Failed to create server");

        Self {
            server: McpServer::new(tracker),
            next_id: 1,
            _dir: dir,
        }
    }

    fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;

        let line = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string();
        let response = self.server.process_line(&line).expect("request gets a response");
        serde_json::to_value(response).unwrap()
    }

    /// Call a tool and return its raw MCP result
    fn call(&mut self, tool: &str, arguments: Value) -> Value {
        let response = self.request("tools/call", json!({ "name": tool, "arguments": arguments }));
        response["result"].clone()
    }

    /// Call a tool that must succeed and decode its JSON payload
    fn ok(&mut self, tool: &str, arguments: Value) -> Value {
        let result = self.call(tool, arguments);
        assert_eq!(result["isError"], false, "{tool} failed: {result}");
        let text = result["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    /// Call a tool that must fail and return its error code
    fn err(&mut self, tool: &str, arguments: Value) -> i64 {
        let result = self.call(tool, arguments);
        assert_eq!(result["isError"], true, "{tool} unexpectedly succeeded: {result}");
        result["errorCode"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_handshake_and_tool_listing() {
    let mut harness = Harness::start().await;

    let init = harness.request("initialize", json!({}));
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(init["result"]["serverInfo"]["name"], "Habit Stats MCP");

    let notification = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string();
    assert!(harness.server.process_line(&notification).is_none());
    assert!(harness.server.is_initialized());

    let listing = harness.request("tools/list", json!({}));
    let names: Vec<&str> = listing["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 11);
    for expected in ["habit_create", "habit_log", "habit_list", "habit_stats", "category_delete"] {
        assert!(names.contains(&expected), "missing {expected}");
    }
}

#[tokio::test]
async fn test_protocol_errors() {
    let mut harness = Harness::start().await;

    let garbage = harness.server.process_line("{not json").unwrap();
    assert_eq!(serde_json::to_value(garbage).unwrap()["error"]["code"], error_codes::PARSE_ERROR);

    let unknown = harness.request("resources/list", json!({}));
    assert_eq!(unknown["error"]["code"], error_codes::METHOD_NOT_FOUND);

    assert!(harness.server.process_line("   ").is_none());

    let missing_user = harness.call("category_list", json!({}));
    assert_eq!(missing_user["errorCode"], error_codes::INVALID_PARAMS);
}

#[tokio::test]
async fn test_habit_lifecycle() {
    let mut harness = Harness::start().await;
    let user = UserId::new().to_string();
    let today = CalendarDate::today();
    let yesterday = today.minus_days(1);

    let category = harness.ok("category_create", json!({ "user_id": user, "name": "Health" }));
    let category_id = category["id"].as_str().unwrap().to_string();
    assert_eq!(category["color"], "#4CAF50");

    let habit = harness.ok(
        "habit_create",
        json!({ "user_id": user, "title": "Run", "category_id": category_id }),
    );
    let habit_id = habit["id"].as_str().unwrap().to_string();
    assert_eq!(habit["frequency"], "daily");

    harness.ok("habit_log", json!({ "user_id": user, "habit_id": habit_id }));
    let logged = harness.ok(
        "habit_log",
        json!({ "user_id": user, "habit_id": habit_id, "date": yesterday.to_string() }),
    );
    assert_eq!(logged["completionDates"].as_array().unwrap().len(), 2);

    let listing = harness.ok("habit_list", json!({ "user_id": user }));
    assert_eq!(listing["pagination"]["total"], 1);
    let stats = &listing["habits"][0]["stats"];
    assert_eq!(stats["total"], 31);
    assert_eq!(stats["completed"], 2);
    assert_eq!(stats["streak"], 2);

    let report = harness.ok(
        "habit_stats",
        json!({ "user_id": user, "start_date": yesterday.to_string() }),
    );
    assert_eq!(report["period"]["start"], yesterday.to_string());
    assert_eq!(report["period"]["end"], today.to_string());
    assert_eq!(report["habits"][0]["stats"]["percentage"], 100);
    assert_eq!(report["total"]["totalHabits"], 1);
    assert_eq!(report["total"]["bestStreak"], 2);

    let future = today.as_naive() + chrono::Duration::days(1);
    let code = harness.err(
        "habit_log",
        json!({ "user_id": user, "habit_id": habit_id, "date": future.format("%Y-%m-%d").to_string() }),
    );
    assert_eq!(code, i64::from(error_codes::VALIDATION_ERROR));

    harness.ok("category_delete", json!({ "user_id": user, "category_id": category_id }));
    let uncategorized = harness.ok("habit_list", json!({ "user_id": user, "category_id": "null" }));
    assert_eq!(uncategorized["habits"][0]["categoryId"], Value::Null);

    harness.ok("habit_delete", json!({ "user_id": user, "habit_id": habit_id }));
    let code = harness.err("habit_log", json!({ "user_id": user, "habit_id": habit_id }));
    assert_eq!(code, i64::from(error_codes::HABIT_NOT_FOUND));
}

#[tokio::test]
async fn test_users_are_isolated() {
    let mut harness = Harness::start().await;
    let owner = UserId::new().to_string();
    let intruder = UserId::new().to_string();

    let habit = harness.ok("habit_create", json!({ "user_id": owner, "title": "Private" }));
    let habit_id = habit["id"].as_str().unwrap().to_string();

    let code = harness.err("habit_delete", json!({ "user_id": intruder, "habit_id": habit_id }));
    assert_eq!(code, i64::from(error_codes::HABIT_NOT_FOUND));

    let listing = harness.ok("habit_list", json!({ "user_id": intruder }));
    assert_eq!(listing["pagination"]["total"], 0);

    harness.ok("category_create", json!({ "user_id": owner, "name": "Work" }));
    let code = harness.err("category_create", json!({ "user_id": owner, "name": "Work" }));
    assert_eq!(code, i64::from(error_codes::DUPLICATE_CATEGORY));
    harness.ok("category_create", json!({ "user_id": intruder, "name": "Work" }));
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let mut harness = Harness::start().await;
    let user = UserId::new().to_string();

    for (title, frequency) in [("Read", "daily"), ("Reading group", "weekly"), ("Swim", "weekly")] {
        harness.ok(
            "habit_create",
            json!({ "user_id": user, "title": title, "frequency": frequency }),
        );
    }

    let weekly = harness.ok("habit_list", json!({ "user_id": user, "frequency": "weekly" }));
    assert_eq!(weekly["pagination"]["total"], 2);

    let search = harness.ok("habit_list", json!({ "user_id": user, "search": "READ" }));
    assert_eq!(search["pagination"]["total"], 2);

    let page = harness.ok("habit_list", json!({ "user_id": user, "page": 2, "limit": 2 }));
    assert_eq!(page["habits"].as_array().unwrap().len(), 1);
    assert_eq!(page["pagination"]["pages"], 2);
    // Newest first, so the first habit created is on the last page
    assert_eq!(page["habits"][0]["title"], "Read");

    let code = harness.err("habit_list", json!({ "user_id": user, "limit": 0 }));
    assert_eq!(code, i64::from(error_codes::VALIDATION_ERROR));
}
