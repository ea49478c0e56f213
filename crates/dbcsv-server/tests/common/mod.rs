//! Shared fixtures for server tests.

#![allow(dead_code)]

use std::fs;
use std::sync::Arc;

use dbcsv_auth::{Account, AccountStore, SessionStore};
use dbcsv_core::Engine;
use dbcsv_server::http::{Request, Response, Router};
use dbcsv_server::{build_router, AppState};
use tempfile::TempDir;

pub const USERNAME: &str = "johndoe";
pub const PASSWORD: &str = "secret123";

const METADATA: &str = r#"{"tables": [
    {"name": "table1", "columns": [
        {"name": "id", "type": "int"},
        {"name": "name", "type": "varchar"},
        {"name": "age", "type": "int"},
        {"name": "email", "type": "varchar"}
    ]},
    {"name": "broken", "columns": [
        {"name": "id", "type": "int"},
        {"name": "joined", "type": "date"}
    ]}
]}"#;

const TABLE1: &str = "\
id,name,age,email
1,John Doe,28,john.doe@example.com
2,Jane Smith,34,jane.smith@example.com
3,Michael Brown,22,michael.brown@example.com
4,Emily Davis,29,
5,Chris Wilson,31,chris.wilson@example.com
";

const BROKEN: &str = "\
id,joined
1,2024-01-15
2,2024-02-01
3,not-a-date
4,2024-03-10
";

/// A data directory with `schema1` and a router serving it.
pub struct TestServer {
    pub dir: TempDir,
    pub state: Arc<AppState>,
    pub router: Router,
}

impl TestServer {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema1");
        fs::create_dir_all(&schema).unwrap();
        fs::write(schema.join("metadata.json"), METADATA).unwrap();
        fs::write(schema.join("table1.csv"), TABLE1).unwrap();
        fs::write(schema.join("broken.csv"), BROKEN).unwrap();

        let engine = Engine::open(dir.path()).unwrap();
        let accounts =
            AccountStore::from_accounts([Account::create(USERNAME, PASSWORD).unwrap()]);
        let state = Arc::new(AppState::new(engine, accounts, SessionStore::default()));
        let router = build_router(state.clone());
        Self { dir, state, router }
    }

    pub async fn send(&self, req: Request) -> Response {
        self.router.handle(req).await
    }

    pub async fn login(&self) -> String {
        let res = self
            .send(Request::post("/auth/connect").body(format!(
                "username={USERNAME}&password={PASSWORD}"
            )))
            .await;
        assert_eq!(res.status, 200, "{:?}", res.body_string());
        let body: serde_json::Value = res.body_json().unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn execute(&self, token: &str, sql: &str) -> Response {
        let body = serde_json::json!({"sql_statement": sql, "schema": "schema1"});
        self.send(
            Request::post("/query/execute")
                .header("Authorization", format!("Bearer {token}"))
                .body(body.to_string()),
        )
        .await
    }

    pub async fn open_cursor(&self, sql: &str) -> String {
        let token = self.login().await;
        let res = self.execute(&token, sql).await;
        assert_eq!(res.status, 200, "{:?}", res.body_string());
        let body: serde_json::Value = res.body_json().unwrap();
        body["cursor_id"].as_str().unwrap().to_string()
    }
}
