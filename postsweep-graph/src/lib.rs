//! Facebook Graph post search and the flattening of its results.
//!
//! [`GraphApi`] issues the single search call, [`extract`] turns raw posts into
//! [`ExtractedPost`] records, and [`Extractor`] ties the two together.
pub mod client;
pub mod extract;
pub mod extractor;
pub mod types;

pub use client::{GraphApi, PostSearch};
pub use extract::ExtractedPost;
pub use extractor::Extractor;

/// What to search for and the token to search with. Built once per run.
#[derive(Clone)]
pub struct SearchRequest {
    pub query: String,
    pub credential: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            credential: credential.into(),
        }
    }
}

impl std::fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRequest")
            .field("query", &self.query)
            .field("credential", &"<redacted>")
            .finish()
    }
}
