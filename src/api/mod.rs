//! REST API module
//!
//! Provides HTTP access to the token ledger.
//!
//! # Endpoints
//!
//! ## Token
//! - `GET /api/token` - Name, symbol, decimals, total supply
//! - `GET /api/balances/{address}` - Balance of an account
//! - `GET /api/allowance?owner=&spender=` - Remaining allowance
//! - `GET /api/history` - Recent events
//!
//! ## Operations
//! - `POST /api/transfer` - `{from, to, amount}`
//! - `POST /api/approve` - `{owner, spender, amount}`
//! - `POST /api/transferFrom` - `{caller, owner, to, amount}`
//!
//! ## WebSocket
//! - `GET /ws` - Real-time updates (Transfer, Approval)
//!
//! Amounts are decimal strings. Addresses are hex or `@label`.

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::{create_router, serve, ServerConfig};
pub use websocket::WsEvent;
