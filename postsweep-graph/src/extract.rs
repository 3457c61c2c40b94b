//! Flattening of raw Graph posts into [`ExtractedPost`] records.
use postsweep_common::{Result, SweepError};
use serde::{Deserialize, Serialize};

use crate::types::{RawPost, SearchResponse};

/// One normalized post, as written to the dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedPost {
    pub id: String,
    pub message: Option<String>,
    pub comments: Vec<String>,
    pub likes_count: u64,
    pub shares_count: u64,
}

/// Convert one raw post. Absent optional fields fall back to `None`, `[]` or `0`.
///
/// A post without an `id` is a malformed response: ids are never invented.
pub fn extract_post(raw: &RawPost) -> Result<ExtractedPost> {
    let id = raw
        .id
        .clone()
        .ok_or_else(|| SweepError::Request("search result is missing `id`".into()))?;

    Ok(ExtractedPost {
        id,
        message: raw.message.clone(),
        comments: comment_texts(raw),
        likes_count: likes_count(raw),
        shares_count: shares_count(raw),
    })
}

/// Pull the result list out of a search response and convert it in order.
pub fn extract_posts(resp: &SearchResponse) -> Result<Vec<ExtractedPost>> {
    raw_posts(resp)?.iter().map(extract_post).collect()
}

/// The `data` array of a search response. A response without one is malformed.
pub fn raw_posts(resp: &SearchResponse) -> Result<&[RawPost]> {
    resp.data
        .as_deref()
        .ok_or_else(|| SweepError::Request("search response has no `data` field".into()))
}

// Comments without text (sticker or photo only) keep their slot as "".
fn comment_texts(raw: &RawPost) -> Vec<String> {
    raw.comments
        .as_ref()
        .and_then(|edge| edge.data.as_ref())
        .map(|list| {
            list.iter()
                .map(|c| c.message.clone().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}

fn likes_count(raw: &RawPost) -> u64 {
    raw.likes
        .as_ref()
        .and_then(|l| l.summary.as_ref())
        .and_then(|s| s.total_count)
        .unwrap_or(0)
}

fn shares_count(raw: &RawPost) -> u64 {
    raw.shares.as_ref().and_then(|s| s.count).unwrap_or(0)
}
