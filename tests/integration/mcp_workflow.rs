/// End-to-end JSON-RPC conversations against an in-memory garden
use std::sync::Arc;

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use habit_garden_mcp::*;
use serde_json::{json, Value};

struct Harness {
    server: McpServer,
    clock: Arc<FixedClock>,
    next_id: u64,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 8, 7, 30, 0).unwrap()));
        let garden = HabitGardenServer::in_memory(FixedOffset::east_opt(0).unwrap())
            .expect("Failed to create server")
            .with_clock(clock.clone());
        Self {
            server: McpServer::new(garden),
            clock,
            next_id: 0,
        }
    }

    async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let line = json!({
            "jsonrpc": "2.0",
            "id": self.next_id,
            "method": method,
            "params": params,
        })
        .to_string();

        let response = self
            .server
            .handle_line(&line)
            .await
            .expect("request should get a response");
        serde_json::to_value(response).expect("response serializes")
    }

    /// Call a tool and return its `result` object
    async fn call(&mut self, tool: &str, arguments: Value) -> Value {
        let response = self
            .request("tools/call", json!({"name": tool, "arguments": arguments}))
            .await;
        assert!(response.get("error").is_none(), "unexpected JSON-RPC error: {}", response);
        response["result"].clone()
    }

    async fn create(&mut self, name: &str) -> String {
        let result = self.call("habit_create", json!({"name": name})).await;
        result["structuredContent"]["habit"]["habit_id"]
            .as_str()
            .expect("habit id")
            .to_string()
    }

    async fn verify_text(&mut self, habit_id: &str) -> Value {
        self.call(
            "habit_verify",
            json!({"habit_id": habit_id, "verification_type": "text", "text": "done"}),
        )
        .await
    }
}

#[tokio::test]
async fn test_initialize_handshake() {
    let mut harness = Harness::new();

    let response = harness
        .request(
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "1.0"}
            }),
        )
        .await;

    assert_eq!(response["result"]["protocolVersion"], json!("2024-11-05"));
    assert_eq!(response["result"]["serverInfo"]["name"], json!("Habit Garden MCP"));
    assert_eq!(response["result"]["capabilities"]["tools"]["listChanged"], json!(false));

    let tools = harness.request("tools/list", json!({})).await;
    let tools = tools["result"]["tools"].as_array().expect("tool array");
    assert_eq!(tools.len(), 8);
    assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
}

#[tokio::test]
async fn test_a_week_of_verifications_grows_a_plant() {
    let mut harness = Harness::new();
    let id = harness.create("Morning run").await;

    let mut last = Value::Null;
    for day in 0..7 {
        last = harness.verify_text(&id).await;
        assert_eq!(last["isError"], json!(false), "day {}: {}", day, last);
        harness.clock.advance(Duration::days(1));
    }

    let data = &last["structuredContent"];
    assert_eq!(data["habit"]["current_streak"], json!(7));
    assert_eq!(data["previous_growth_stage"], json!(1));
    assert_eq!(data["new_growth_stage"], json!(2));
    assert_eq!(data["habit"]["stage_name"], json!("Plant"));

    let logs = harness.call("habit_logs", json!({"habit_id": id, "limit": 3})).await;
    assert_eq!(logs["structuredContent"]["logs"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_second_verification_same_day_is_a_tool_error() {
    let mut harness = Harness::new();
    let id = harness.create("Read").await;

    harness.verify_text(&id).await;
    harness.clock.advance(Duration::hours(3));
    let second = harness.verify_text(&id).await;

    assert_eq!(second["isError"], json!(true));
    assert_eq!(second["structuredContent"]["error"]["code"], json!(-32002));

    let detail = harness.call("habit_get", json!({"habit_id": id})).await;
    assert_eq!(detail["structuredContent"]["habit"]["current_streak"], json!(1));
    assert_eq!(detail["structuredContent"]["total_completions"], json!(1));
}

#[tokio::test]
async fn test_listing_resets_lapsed_streaks() {
    let mut harness = Harness::new();
    let lapsed = harness.create("Piano").await;
    harness.clock.advance(Duration::minutes(1));
    let steady = harness.create("Water").await;

    for _ in 0..4 {
        harness.verify_text(&lapsed).await;
        harness.verify_text(&steady).await;
        harness.clock.advance(Duration::days(1));
    }
    // Skip two days for the piano, keep the water going
    for _ in 0..2 {
        harness.verify_text(&steady).await;
        harness.clock.advance(Duration::days(1));
    }

    let list = harness.call("habit_list", json!({})).await;
    let habits = list["structuredContent"]["habits"].as_array().expect("habits").clone();
    assert_eq!(habits.len(), 2);

    // Newest first
    assert_eq!(habits[0]["habit_id"], json!(steady));
    assert_eq!(habits[0]["current_streak"], json!(6));
    assert_eq!(habits[1]["habit_id"], json!(lapsed));
    assert_eq!(habits[1]["current_streak"], json!(0));
    assert_eq!(habits[1]["longest_streak"], json!(4));
    assert_eq!(habits[1]["growth_stage"], json!(0));
    assert_eq!(habits[1]["streak_broken"], json!(false));

    let refresh = harness.call("habit_refresh", json!({})).await;
    assert_eq!(refresh["structuredContent"]["reset"], json!([]));
}

#[tokio::test]
async fn test_update_and_delete() {
    let mut harness = Harness::new();
    let id = harness.create("Yoga").await;

    let updated = harness
        .call("habit_update", json!({"habit_id": id, "name": "Evening yoga", "description": "20 minutes"}))
        .await;
    assert_eq!(updated["structuredContent"]["habit"]["name"], json!("Evening yoga"));

    let deleted = harness.call("habit_delete", json!({"habit_id": id})).await;
    assert_eq!(deleted["isError"], json!(false));

    let missing = harness.call("habit_get", json!({"habit_id": id})).await;
    assert_eq!(missing["isError"], json!(true));
    assert_eq!(missing["structuredContent"]["error"]["code"], json!(-32001));
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let mut harness = Harness::new();
    let response = harness
        .request("tools/call", json!({"name": "habit_insights", "arguments": {}}))
        .await;
    assert_eq!(response["error"]["code"], json!(-32602));
}

#[test]
fn test_ping_without_runtime_macro() {
    let mut harness = Harness::new();
    let response = tokio_test::block_on(harness.request("ping", json!({})));
    assert_eq!(response["result"], json!({}));
}
