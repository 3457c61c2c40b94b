//! The run itself: input, one search, one dataset push.
use postsweep_actor::ActorContext;
use postsweep_common::Result;
use postsweep_graph::{Extractor, PostSearch};
use serde::Deserialize;

/// Actor input record. Both fields may be absent; an absent token is left
/// for the search API to reject.
#[derive(Debug, Default, Deserialize)]
pub struct ActorInput {
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub query: String,
    pub pushed: usize,
}

/// Extract posts for the input query and push them as one batch.
///
/// Nothing reaches the dataset unless every post was extracted.
pub async fn sweep<S: PostSearch>(ctx: ActorContext, search: S) -> Result<RunSummary> {
    let input: ActorInput = ctx.get_input().await?;
    let query = input.search_query.unwrap_or_default();
    let token = input.access_token.unwrap_or_default();
    if token.trim().is_empty() {
        tracing::warn!("input has no access_token; the search will likely be rejected");
    }

    let posts = Extractor::new(search).extract(&query, &token).await?;
    ctx.push_data(&posts).await?;

    Ok(RunSummary {
        query,
        pushed: posts.len(),
    })
}
