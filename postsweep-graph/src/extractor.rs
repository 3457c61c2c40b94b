use postsweep_common::Result;

use crate::SearchRequest;
use crate::client::PostSearch;
use crate::extract::{ExtractedPost, extract_post, raw_posts};

/// Runs one search and flattens every result, in the order the API returned them.
pub struct Extractor<S> {
    search: S,
}

impl<S: PostSearch> Extractor<S> {
    pub fn new(search: S) -> Self {
        Self { search }
    }

    /// Issue the search and convert each result.
    ///
    /// Every post is logged at `info` with all of its fields before it is
    /// appended. Errors from the search call propagate unchanged.
    pub async fn extract(&self, query: &str, credential: &str) -> Result<Vec<ExtractedPost>> {
        let request = SearchRequest::new(query, credential);
        tracing::info!(query = %request.query, "searching posts");

        let resp = self.search.search_posts(&request).await?;
        let raw = raw_posts(&resp)?;

        let mut extracted = Vec::with_capacity(raw.len());
        for post in raw {
            let post = extract_post(post)?;
            tracing::info!(
                id = %post.id,
                message = ?post.message,
                comments = ?post.comments,
                likes_count = post.likes_count,
                shares_count = post.shares_count,
                "Extracted post data"
            );
            extracted.push(post);
        }

        tracing::info!(count = extracted.len(), "extraction finished");
        Ok(extracted)
    }
}
