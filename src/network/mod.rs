//! Network Module
//!
//! Byte-stream transport to the server.
//!
//! ## Architecture
//! - DSN parsing (`unix://` and `tcp://`)
//! - Blocking socket connection with read/write timeouts
//! - Session: one outstanding request at a time, no background I/O

mod dsn;
mod connection;
mod session;

pub use dsn::Dsn;
pub use connection::Connection;
pub use session::Session;
