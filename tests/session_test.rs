//! Tests for AgentSession flush semantics
//!
//! Covers:
//! - insertion order survives both wire formats
//! - empty-queue behavior per format
//! - failed flushes keep the queue and re-send the same payload
//! - dry-run rendering agrees with what a flush would send
//! - parse + flush end to end, including script files on disk

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::{json, Value};

use fle_bridge::session::{render_batch, AgentSession, FlushReply, SessionError};
use fle_bridge::transport::{CommandTransport, HttpTransport, TransportError};
use fle_bridge::wire::{ConsoleRenderer, DataType, HttpRenderer};
use fle_bridge::{
    Action, ActionKind, ActionQueue, InventoryType, Position, StepParser, WireFormat,
};

// =============================================================================
// Fake transports
// =============================================================================

fn connection_reset() -> TransportError {
    TransportError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    ))
}

#[derive(Clone, Default)]
struct FakeConsole {
    sent: Rc<RefCell<Vec<String>>>,
    fail: Rc<Cell<bool>>,
}

impl CommandTransport for FakeConsole {
    fn send(&mut self, command: &str) -> Result<String, TransportError> {
        self.sent.borrow_mut().push(command.to_string());
        if self.fail.get() {
            return Err(connection_reset());
        }
        Ok("accepted".to_string())
    }
}

#[derive(Clone, Default)]
struct FakeApi {
    posts: Rc<RefCell<Vec<(String, Value)>>>,
    gets: Rc<RefCell<Vec<String>>>,
    fail: Rc<Cell<bool>>,
}

impl HttpTransport for FakeApi {
    fn post(&mut self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.posts.borrow_mut().push((path.to_string(), body.clone()));
        if self.fail.get() {
            return Err(connection_reset());
        }
        Ok(json!({"message": "ok", "result": "queued"}))
    }

    fn get(&mut self, path: &str) -> Result<Value, TransportError> {
        self.gets.borrow_mut().push(path.to_string());
        Ok(json!({"tick": 42}))
    }
}

fn console_session(agent_id: u32) -> (AgentSession, FakeConsole) {
    let fake = FakeConsole::default();
    let session = AgentSession::console(agent_id, ConsoleRenderer::default(), fake.clone());
    (session, fake)
}

fn http_session(agent_id: u32) -> (AgentSession, FakeApi) {
    let fake = FakeApi::default();
    let session = AgentSession::http(agent_id, HttpRenderer::default(), fake.clone());
    (session, fake)
}

fn queue_sample(session: &mut AgentSession) {
    let queue = session.queue_mut();
    let chest = Position::new(0.5, -7.5);
    queue.research("steel-axe").unwrap();
    queue.take(chest, "coal", 50, InventoryType::Chest).unwrap();
    queue.walk(Position::new(30.0, -20.0)).unwrap();
    queue.mine(Position::new(30.5, -20.5), 121).unwrap();
    queue.wait(60).unwrap();
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_console_flush_preserves_insertion_order() {
    let (mut session, fake) = console_session(1);
    queue_sample(&mut session);

    let reply = session.flush().unwrap();
    assert_eq!(reply, FlushReply::Text("accepted".to_string()));
    assert!(session.queue().is_empty());

    let sent = fake.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        concat!(
            r#"/sc remote.call("FLE", "add_actions", 1, { "#,
            r#"{"research", "steel-axe", cancel = false}, "#,
            r#"{"take", {0.5,-7.5}, "coal", 50, defines.inventory.chest}, "#,
            r#"{"walk", {30,-20}}, "#,
            r#"{"mine", {30.5,-20.5}, 121}, "#,
            r#"{"wait", 60} })"#
        )
    );
}

#[test]
fn test_http_flush_preserves_insertion_order() {
    let (mut session, fake) = http_session(2);
    queue_sample(&mut session);

    let reply = session.flush().unwrap();
    assert_eq!(reply, FlushReply::Json(json!({"message": "ok", "result": "queued"})));

    let posts = fake.posts.borrow();
    assert_eq!(posts.len(), 1);
    let (path, body) = &posts[0];
    assert_eq!(path, "/actions");
    assert_eq!(body["agent_actions"][0]["agent_id"], 2);

    let types: Vec<&str> = body["agent_actions"][0]["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["research", "take", "walk", "mine", "wait"]);
}

// =============================================================================
// Empty queue
// =============================================================================

#[test]
fn test_empty_flush_rejected_over_http() {
    let (mut session, fake) = http_session(1);
    assert!(matches!(session.flush(), Err(SessionError::EmptyQueue)));
    assert!(fake.posts.borrow().is_empty());
}

#[test]
fn test_empty_flush_sends_empty_table_over_console() {
    let (mut session, fake) = console_session(4);
    session.flush().unwrap();
    assert_eq!(
        fake.sent.borrow().as_slice(),
        &[r#"/sc remote.call("FLE", "add_actions", 4, {})"#.to_string()]
    );
}

#[test]
fn test_dry_run_follows_empty_queue_policy() {
    let empty = ActionQueue::new();
    assert!(matches!(
        render_batch(&HttpRenderer::default(), 1, &empty),
        Err(SessionError::EmptyQueue)
    ));
    assert_eq!(
        render_batch(&ConsoleRenderer::default(), 1, &empty).unwrap(),
        r#"/sc remote.call("FLE", "add_actions", 1, {})"#
    );
}

#[test]
fn test_dry_run_matches_flushed_payload() {
    let (mut session, fake) = http_session(5);
    queue_sample(&mut session);
    let preview = render_batch(&HttpRenderer::default(), 5, session.queue()).unwrap();

    session.flush().unwrap();
    assert_eq!(fake.posts.borrow()[0].1, preview);
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn test_failed_console_flush_keeps_queue_and_resends_same_command() {
    let (mut session, fake) = console_session(1);
    queue_sample(&mut session);
    let before = session.queue().clone();

    fake.fail.set(true);
    let err = session.flush().unwrap_err();
    assert!(matches!(err, SessionError::Transport(TransportError::Io(_))));
    assert_eq!(session.queue(), &before);

    fake.fail.set(false);
    session.flush().unwrap();
    assert!(session.queue().is_empty());

    let sent = fake.sent.borrow();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}

#[test]
fn test_failed_http_flush_keeps_queue_and_resends_same_body() {
    let (mut session, fake) = http_session(1);
    session.queue_mut().craft("iron-gear-wheel", 10).unwrap();

    fake.fail.set(true);
    assert!(session.flush().is_err());
    assert_eq!(session.queue().len(), 1);

    fake.fail.set(false);
    session.flush().unwrap();

    let posts = fake.posts.borrow();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0], posts[1]);
}

#[test]
fn test_render_failure_sends_nothing() {
    let (mut session, fake) = console_session(1);
    session.queue_mut().wait(5).unwrap();
    session
        .queue_mut()
        .walk(Position::new(f64::INFINITY, 0.0))
        .unwrap();

    assert!(matches!(session.flush(), Err(SessionError::Render(_))));
    assert!(fake.sent.borrow().is_empty());
    assert_eq!(session.queue().len(), 2);
}

// =============================================================================
// Snapshots and control
// =============================================================================

#[test]
fn test_get_data_on_both_channels() {
    let (mut console, fake_console) = console_session(3);
    console.get_data(DataType::State, 150).unwrap();
    assert_eq!(
        fake_console.sent.borrow()[0],
        r#"/sc remote.call("FLE", "state_data", 3, 150)"#
    );

    let (mut http, fake_api) = http_session(3);
    let reply = http.get_data(DataType::Meta, 150).unwrap();
    assert_eq!(reply, FlushReply::Json(json!({"tick": 42})));
    assert_eq!(fake_api.gets.borrow().as_slice(), &["/data/meta/3".to_string()]);
}

#[test]
fn test_reset_and_execute_are_console_only() {
    let (mut console, fake) = console_session(1);
    console.reset(2).unwrap();
    console.execute().unwrap();
    assert_eq!(
        fake.sent.borrow().as_slice(),
        &[
            r#"/sc remote.call("AICommands", "reset", 2)"#.to_string(),
            r#"/sc remote.call("AICommands", "execute_steps")"#.to_string(),
        ]
    );

    let (mut http, _) = http_session(1);
    assert!(matches!(
        http.reset(2),
        Err(SessionError::Unsupported {
            operation: "reset",
            format: WireFormat::Http
        })
    ));
    assert!(http.execute().is_err());
}

// =============================================================================
// Parse + flush
// =============================================================================

#[test]
fn test_single_walk_line_parses_and_flushes() {
    let (mut session, fake) = console_session(1);
    let script = "-- opening move\n[3] \"walk\", {10.5, -2.25}\n";

    let outcome = StepParser::new().parse(script, &mut session);
    assert_eq!(outcome.report.appended, 1);
    assert!(outcome.flush.is_ok());
    assert_eq!(
        fake.sent.borrow()[0],
        r#"/sc remote.call("FLE", "add_actions", 1, { {"walk", {10.5,-2.25}} })"#
    );
}

#[test]
fn test_unknown_only_script_flushes_nothing_over_http() {
    let (mut session, fake) = http_session(1);
    let outcome = StepParser::new().parse("[1] \"teleport\", {0, 0}", &mut session);

    assert!(outcome.report.is_clean());
    assert_eq!(outcome.report.unknown.len(), 1);
    assert!(matches!(outcome.flush, Err(SessionError::EmptyQueue)));
    assert!(fake.posts.borrow().is_empty());
}

#[test]
fn test_parse_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steps_lab.lua");
    std::fs::write(
        &path,
        r#"-- lab opening
step[1] = {"tech", "automation"}
step[2] = {"take", {0.5, -7.5}, "iron-plate", 100, defines.inventory.chest}
step[3] = {"craft", 10, "iron-gear-wheel"}
step[4] = {"build", {4.5, -3.5}, "lab", defines.direction.north}
step[5] = {"put", {4.5, -3.5}, "automation-science-pack", 10, defines.inventory.input}
step[6] = {"idle", 300}
"#,
    )
    .unwrap();

    let (mut session, fake) = http_session(1);
    let outcome = StepParser::new().parse_file(&path, &mut session).unwrap();
    assert!(outcome.report.is_clean(), "{:?}", outcome.report.errors);
    assert_eq!(outcome.report.appended, 6);
    outcome.flush.unwrap();

    let posts = fake.posts.borrow();
    let actions: Vec<Action> =
        serde_json::from_value(posts[0].1["agent_actions"][0]["actions"].clone()).unwrap();
    let kinds: Vec<ActionKind> = actions.iter().map(Action::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::Research,
            ActionKind::Take,
            ActionKind::Craft,
            ActionKind::Build,
            ActionKind::Put,
            ActionKind::Wait,
        ]
    );
    assert_eq!(
        actions[4],
        Action::put(
            Position::new(4.5, -3.5),
            "automation-science-pack",
            10,
            InventoryType::Input
        )
        .unwrap()
    );
}

#[test]
fn test_parse_file_missing_path() {
    let (mut session, _) = console_session(1);
    let result = StepParser::new().parse_file(
        std::path::Path::new("no/such/steps.lua"),
        &mut session,
    );
    assert!(result.is_err());
}
