//! Drives the client against a real server on a loopback port.

use std::fs;
use std::sync::Arc;

use chrono::Duration;
use dbcsv_auth::{Account, AccountStore, SessionStore};
use dbcsv_client::api::ApiClient;
use dbcsv_client::{connect, connect_with, ConnectOptions, Connection, Error};
use dbcsv_core::{Engine, Value};
use dbcsv_server::{build_router, serve, AppState};
use tempfile::TempDir;
use tokio::net::TcpListener;

const USER: &str = "johndoe";
const PASSWORD: &str = "secret123";

const METADATA: &str = r#"{"tables": [
    {"name": "table1", "columns": [
        {"name": "id", "type": "int"},
        {"name": "name", "type": "varchar"},
        {"name": "age", "type": "int"},
        {"name": "email", "type": "varchar"}
    ]},
    {"name": "table2", "columns": [
        {"name": "id", "type": "int"},
        {"name": "department", "type": "varchar"},
        {"name": "salary", "type": "float"},
        {"name": "active", "type": "bool"}
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

const TABLE2: &str = "\
id,department,salary,active
1,Engineering,75000.5,true
2,Marketing,68000,false
3,Sales,oops,true
4,Support,50000,true
";

struct Server {
    _dir: TempDir,
    state: Arc<AppState>,
    dsn: String,
}

async fn start(token_ttl: Duration) -> Server {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("schema1");
    fs::create_dir_all(&schema).unwrap();
    fs::write(schema.join("metadata.json"), METADATA).unwrap();
    fs::write(schema.join("table1.csv"), TABLE1).unwrap();
    fs::write(schema.join("table2.csv"), TABLE2).unwrap();

    let engine = Engine::open(dir.path()).unwrap();
    let accounts = AccountStore::from_accounts([Account::create(USER, PASSWORD).unwrap()]);
    let state = Arc::new(AppState::new(engine, accounts, SessionStore::new(token_ttl)));
    let router = Arc::new(build_router(state.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, router, std::future::pending()));

    Server {
        _dir: dir,
        state,
        dsn: format!("http://{addr}/schema1"),
    }
}

async fn connected() -> (Server, Connection) {
    let server = start(Duration::minutes(30)).await;
    let conn = connect(&server.dsn, USER, PASSWORD).await.unwrap();
    (server, conn)
}

fn ints(rows: &[Vec<Value>]) -> Vec<i64> {
    rows.iter()
        .map(|row| match row[0] {
            Value::Integer(n) => n,
            ref other => panic!("unexpected {other:?}"),
        })
        .collect()
}

#[tokio::test]
async fn test_fetchmany_pagination() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor.execute("SELECT * FROM table1", None).await.unwrap();
    assert_eq!(cursor.rowcount(), 0);

    assert_eq!(cursor.fetchmany(Some(2)).await.unwrap().len(), 2);
    assert_eq!(cursor.fetchmany(Some(3)).await.unwrap().len(), 3);
    assert_eq!(cursor.fetchmany(Some(1)).await.unwrap().len(), 0);
    assert_eq!(cursor.rowcount(), 5);

    assert!(matches!(
        cursor.fetchmany(Some(0)).await,
        Err(Error::Interface(_))
    ));
}

#[tokio::test]
async fn test_fetchone_past_end() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor
        .execute("SELECT name, age FROM table1 WHERE id = 3", None)
        .await
        .unwrap();

    let row = cursor.fetchone().await.unwrap().unwrap();
    assert_eq!(row, vec![Value::from("Michael Brown"), Value::Integer(22)]);
    for _ in 0..2 {
        assert_eq!(cursor.fetchone().await.unwrap(), None);
        assert_eq!(cursor.rowcount(), 1);
    }
}

#[tokio::test]
async fn test_arraysize_default() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor.execute("SELECT id FROM table1", None).await.unwrap();
    assert_eq!(cursor.fetchmany(None).await.unwrap().len(), 1);
    cursor.arraysize = 3;
    assert_eq!(ints(&cursor.fetchmany(None).await.unwrap()), vec![2, 3, 4]);
}

#[tokio::test]
async fn test_and_binds_tighter_than_or() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor
        .execute(
            "SELECT id FROM table1 WHERE age > 25 OR age < 30 AND name = 'John Doe'",
            None,
        )
        .await
        .unwrap();
    assert_eq!(ints(&cursor.fetchall().await.unwrap()), vec![1, 2, 4, 5]);

    cursor
        .execute(
            "SELECT id FROM table1 WHERE (age > 25 OR age < 30) AND name = 'John Doe'",
            None,
        )
        .await
        .unwrap();
    assert_eq!(ints(&cursor.fetchall().await.unwrap()), vec![1]);
}

#[tokio::test]
async fn test_case_sensitivity() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor
        .execute("SELECT * FROM table1 WHERE name = 'john doe'", None)
        .await
        .unwrap();
    assert!(cursor.fetchall().await.unwrap().is_empty());

    match cursor.execute("SELECT ID FROM table1", None).await {
        Err(Error::Programming(message)) => assert!(message.contains("ID"), "{message}"),
        other => panic!("expected programming error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_statement_errors() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    for sql in [
        "SELECT id,, name FROM table1",
        "SELECT id, FROM table1",
        "SELECT * FROM nowhere",
        "DELETE FROM table1",
    ] {
        assert!(
            matches!(cursor.execute(sql, None).await, Err(Error::Programming(_))),
            "{sql}"
        );
    }
}

#[tokio::test]
async fn test_malformed_row_truncates_result() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor.execute("SELECT * FROM table2", None).await.unwrap();

    let rows = cursor.fetchall().await.unwrap();
    assert_eq!(ints(&rows), vec![1, 2]);
    assert_eq!(rows[0][2], Value::Float(75000.5));
    assert_eq!(rows[1][3], Value::Boolean(false));
    assert_eq!(cursor.rowcount(), 2);
}

#[tokio::test]
async fn test_description() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor
        .execute("SELECT salary, department FROM table2", None)
        .await
        .unwrap();

    let description = cursor.description().unwrap();
    let columns: Vec<_> = description
        .iter()
        .map(|c| (c.name.as_str(), c.type_code.as_str()))
        .collect();
    assert_eq!(columns, [("salary", "float"), ("department", "varchar")]);

    cursor.close().await.unwrap();
    assert!(cursor.description().is_none());
    assert_eq!(cursor.rowcount(), -1);
}

#[tokio::test]
async fn test_execute_closes_previous_cursor() {
    let (server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor.execute("SELECT * FROM table1", None).await.unwrap();
    let first = cursor.cursor_id().unwrap().to_string();

    cursor.execute("SELECT * FROM table2", None).await.unwrap();
    assert_ne!(cursor.cursor_id(), Some(first.as_str()));
    assert_eq!(server.state.registry.len(), 1);

    cursor.close().await.unwrap();
    assert!(server.state.registry.is_empty());
    assert!(matches!(cursor.close().await, Err(Error::Internal(_))));
}

#[tokio::test]
async fn test_cursor_closed_elsewhere() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    cursor.execute("SELECT * FROM table1", None).await.unwrap();

    let api = ApiClient::new(conn.url(), std::time::Duration::from_secs(5)).unwrap();
    api.close(cursor.cursor_id().unwrap()).await.unwrap();

    match cursor.fetchone().await {
        Err(Error::Operational(message)) => assert!(message.contains("not found")),
        other => panic!("expected operational error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_cursors() {
    let (_server, conn) = connected().await;
    let mut first = conn.cursor().unwrap();
    let mut second = conn.cursor().unwrap();
    first.execute("SELECT id FROM table1", None).await.unwrap();
    second.execute("SELECT id FROM table1", None).await.unwrap();

    let (a, b) = tokio::join!(
        async {
            let mut ids = Vec::new();
            while let Some(row) = first.fetchone().await.unwrap() {
                ids.push(row);
            }
            ids
        },
        second.fetchmany(Some(4))
    );
    assert_eq!(ints(&a), vec![1, 2, 3, 4, 5]);
    assert_eq!(ints(&b.unwrap()), vec![1, 2, 3, 4]);
    assert_eq!(first.rowcount(), 5);
    assert_eq!(second.rowcount(), 4);
}

#[tokio::test]
async fn test_connection_lifecycle() {
    let (_server, conn) = connected().await;
    let mut cursor = conn.cursor().unwrap();
    assert!(matches!(cursor.close().await, Err(Error::Internal(_))));
    assert!(matches!(conn.commit(), Err(Error::NotSupported(_))));
    assert!(matches!(conn.rollback(), Err(Error::NotSupported(_))));

    conn.close().unwrap();
    assert!(matches!(
        cursor.execute("SELECT * FROM table1", None).await,
        Err(Error::Internal(_))
    ));
    assert!(matches!(conn.close(), Err(Error::Internal(_))));
    assert!(matches!(conn.cursor(), Err(Error::Internal(_))));
}

#[tokio::test]
async fn test_connect_failures() {
    let server = start(Duration::minutes(30)).await;

    let bad_dsn = server.dsn.replace("/schema1", "/schema1/extra");
    assert!(matches!(
        connect(&bad_dsn, USER, PASSWORD).await,
        Err(Error::Interface(_))
    ));

    let unknown_schema = server.dsn.replace("schema1", "schema9");
    match connect(&unknown_schema, USER, PASSWORD).await {
        Err(Error::Programming(message)) => assert!(message.contains("schema1")),
        other => panic!("expected programming error, got {other:?}"),
    }

    assert!(matches!(
        connect(&server.dsn, USER, "wrong-password").await,
        Err(Error::Authentication(_))
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let unused = listener.local_addr().unwrap();
    drop(listener);
    assert!(matches!(
        connect(&format!("http://{unused}/schema1"), USER, PASSWORD).await,
        Err(Error::Network(_))
    ));
}

#[tokio::test]
async fn test_token_refreshed_near_expiry() {
    let server = start(Duration::seconds(30)).await;
    let options = ConnectOptions {
        refresh_threshold: Duration::seconds(60),
        ..ConnectOptions::default()
    };
    let conn = connect_with(&server.dsn, USER, PASSWORD, options)
        .await
        .unwrap();
    let before = conn.access_token();

    let mut cursor = conn.cursor().unwrap();
    cursor.execute("SELECT * FROM table1", None).await.unwrap();
    assert_ne!(conn.access_token(), before);
    assert_eq!(cursor.fetchall().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_expired_token_requires_new_connection() {
    let server = start(Duration::zero()).await;
    let conn = connect(&server.dsn, USER, PASSWORD).await.unwrap();
    let mut cursor = conn.cursor().unwrap();
    assert!(matches!(
        cursor.execute("SELECT * FROM table1", None).await,
        Err(Error::Authentication(_))
    ));
}
