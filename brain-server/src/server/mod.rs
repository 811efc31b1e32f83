//! HTTP front controller.

mod docs;
mod dto;
mod error;
mod middleware;
mod router;
mod routes;
mod state;

pub use docs::ApiDoc;
pub use dto::{
    ChatRequestBody, ChatResponseBody, ErrorResponse, HealthResponse, HealthStatus, ResetResponse,
};
pub use error::ServerError;
pub use router::{build_router, serve};
pub use state::ServerState;
