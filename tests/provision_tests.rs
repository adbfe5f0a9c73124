use std::sync::Mutex;

use async_trait::async_trait;
use mongo_bootstrap::error::BootstrapError;
use mongo_bootstrap::provision::{plan_users, provision, CreateUserRequest, RoleGrant};
use mongo_bootstrap::session::AdminSession;

/// Session double that records every request it receives and can be told
/// to reject a specific database.
struct RecordingSession {
    issued: Mutex<Vec<(String, CreateUserRequest)>>,
    fail_on: Option<String>,
}

impl RecordingSession {
    fn new() -> Self {
        Self {
            issued: Mutex::new(Vec::new()),
            fail_on: None,
        }
    }

    fn failing_on(database: &str) -> Self {
        Self {
            issued: Mutex::new(Vec::new()),
            fail_on: Some(database.to_string()),
        }
    }

    fn issued(&self) -> Vec<(String, CreateUserRequest)> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdminSession for RecordingSession {
    async fn create_user(
        &self,
        database: &str,
        request: &CreateUserRequest,
    ) -> Result<(), BootstrapError> {
        self.issued
            .lock()
            .unwrap()
            .push((database.to_string(), request.clone()));
        if self.fail_on.as_deref() == Some(database) {
            return Err(BootstrapError::CreateUser {
                database: database.to_string(),
                reason: "simulated server rejection".to_string(),
            });
        }
        Ok(())
    }
}

#[test]
fn test_plan_is_three_ordered_requests() {
    let plan = plan_users("admin", "secret");

    let databases: Vec<&str> = plan.iter().map(|r| r.database()).collect();
    assert_eq!(databases, ["member_db", "chat_db", "streaming_db"]);

    for request in &plan {
        assert_eq!(request.user, "admin");
        assert_eq!(request.pwd, "secret");
        assert_eq!(request.roles.len(), 1);
        assert_eq!(request.roles[0].role, "readWrite");
        assert_eq!(request.roles[0].db, request.database());
    }
}

#[test]
fn test_request_serializes_exact_field_names() {
    let plan = plan_users("admin", "secret");
    let value = serde_json::to_value(&plan[0]).unwrap();

    assert_eq!(value["user"], "admin");
    assert_eq!(value["pwd"], "secret");
    assert_eq!(value["roles"][0]["role"], "readWrite");
    assert_eq!(value["roles"][0]["db"], "member_db");
}

#[test]
fn test_absent_credentials_still_plan_three_requests() {
    let plan = plan_users("", "");

    assert_eq!(plan.len(), 3);
    for request in &plan {
        assert_eq!(request.user, "");
        assert_eq!(request.pwd, "");
        assert_eq!(request.roles.len(), 1);
    }
}

#[test]
fn test_redacted_masks_password_only() {
    let request = &plan_users("admin", "secret")[1];
    let redacted = request.redacted();

    assert_eq!(redacted.user, "admin");
    assert_eq!(redacted.pwd, "********");
    assert_eq!(redacted.roles, request.roles);
}

#[tokio::test]
async fn test_provision_issues_all_three_requests() {
    let session = RecordingSession::new();

    provision(&session, "admin", "secret").await.unwrap();

    let issued = session.issued();
    assert_eq!(issued.len(), 3);
    assert_eq!(issued[0].0, "member_db");
    assert_eq!(issued[1].0, "chat_db");
    assert_eq!(issued[2].0, "streaming_db");
    for (database, request) in &issued {
        assert_eq!(request.user, "admin");
        assert_eq!(request.pwd, "secret");
        assert_eq!(
            request.roles,
            vec![RoleGrant {
                role: "readWrite".to_string(),
                db: database.clone(),
            }]
        );
    }
}

#[tokio::test]
async fn test_failure_on_second_request_halts_run() {
    let session = RecordingSession::failing_on("chat_db");

    let result = provision(&session, "admin", "secret").await;

    match result {
        Err(BootstrapError::CreateUser { database, .. }) => assert_eq!(database, "chat_db"),
        other => panic!("expected CreateUser error, got {:?}", other),
    }

    // streaming_db must never be attempted after the chat_db failure.
    let databases: Vec<String> = session.issued().into_iter().map(|(db, _)| db).collect();
    assert_eq!(databases, ["member_db", "chat_db"]);
}

#[tokio::test]
async fn test_empty_credentials_are_passed_through() {
    let session = RecordingSession::new();

    provision(&session, "", "").await.unwrap();

    let issued = session.issued();
    assert_eq!(issued.len(), 3);
    for (_, request) in &issued {
        assert_eq!(request.user, "");
        assert_eq!(request.pwd, "");
    }
}
