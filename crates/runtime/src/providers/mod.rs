//! LLM provider adapters.
//!
//! Each provider implements the backend trait for its specific API.

mod cohere;

pub use cohere::{COHERE_API_URL, CohereBackend, CohereBackendBuilder};
