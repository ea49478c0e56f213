//! Client library for the dbcsv server.
//!
//! Connections log in once and refresh their bearer token shortly before it
//! expires. Cursors open a server-side cursor with `execute` and page
//! through it with `fetchone`, `fetchmany` and `fetchall`.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn run() -> dbcsv_client::Result<()> {
//! let conn = dbcsv_client::connect("http://localhost:8001/schema1", "johndoe", "secret123").await?;
//! let mut cursor = conn.cursor()?;
//!
//! cursor.execute("SELECT id, name FROM table1 WHERE age > 25", None).await?;
//! while let Some(row) = cursor.fetchone().await? {
//!     println!("{row:?}");
//! }
//! cursor.close().await?;
//! conn.close()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod connection;
pub mod cursor;
pub mod dsn;
pub mod error;
pub mod token;

pub use connection::{connect, connect_with, ConnectOptions, Connection};
pub use cursor::Cursor;
pub use dsn::Dsn;
pub use error::{Error, Result};
pub use token::TokenCheck;
