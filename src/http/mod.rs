//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (middleware stack, drain on shutdown)
//!     → request.rs (request ID)
//!     → [routing layer picks handler]
//!     → middleware/admission.rs (in-flight accounting)
//!     → handlers.rs (cache lookup, simulated work)
//!     → response.rs (JSON bodies, error mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
