//! Bourse Exchange Client Base
//!
//! Shared machinery for exchange adapters.
//!
//! # Components
//!
//! - **Ports**: `Transport` (HTTP seam) and `Exchange` (unified interface)
//! - **Error**: Unified error taxonomy with per-kind classification
//! - **Transports**: `ReqwestTransport` for real calls, `StubTransport` for tests
//! - **Cache**: Load-once market/currency snapshot
//! - **Helpers**: Lenient payload accessors, batch filters, precision rounding
//!
//! # Example
//!
//! ```rust,ignore
//! use bourse_exchange::{HttpMethod, StubTransport};
//!
//! let stub = StubTransport::new();
//! stub.respond_json(HttpMethod::Get, "/api/v3/time", json!({"serverTime": 1}));
//! ```

#![warn(clippy::all)]

pub mod cache;
pub mod error;
pub mod http;
pub mod parse;
pub mod ports;
pub mod precision;
pub mod safe;
pub mod stub;

// Re-exports for convenience
pub use cache::{MarketCache, MarketSnapshot};
pub use error::{ErrorKind, ExchangeError, ExchangeResult};
pub use http::ReqwestTransport;
pub use ports::{Exchange, HttpMethod, HttpResponse, SignedRequest, Transport};
pub use precision::{amount_to_precision, decimal_to_precision, price_to_precision, RoundingMode};
pub use stub::StubTransport;
