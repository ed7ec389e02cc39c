//! Completion relay API
//!
//! SSE streaming bridge between the browser and the local inference daemon.
//!
//! ## Module Structure
//!
//! - `types`: request validation and SSE event payload types
//! - `utils`: client-address extraction and content normalization
//! - `streaming`: relay orchestration for one session
//! - `handlers`: HTTP entry points (POST + OPTIONS preflight)

mod handlers;
mod streaming;
mod types;
pub(crate) mod utils;

pub use handlers::{completion_preflight, completion_stream};
pub use types::{CompletionRequest, CompletionStreamEvent};
