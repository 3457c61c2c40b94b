//! Wire shapes of the Graph API `search` edge, as far as the extractor reads them.
//!
//! Every field is optional: the API omits edges a post does not have, and the
//! extractor decides what a missing value means.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Option<Vec<RawPost>>,
    /// Cursor block for the next page. Read for logging only; never followed.
    #[serde(default)]
    pub paging: Option<Paging>,
    /// Some Graph failures come back with a 200 status and an `error` body.
    #[serde(default)]
    pub error: Option<GraphError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub comments: Option<CommentEdge>,
    #[serde(default)]
    pub likes: Option<LikeEdge>,
    #[serde(default)]
    pub shares: Option<Shares>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CommentEdge {
    #[serde(default)]
    pub data: Option<Vec<Comment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LikeEdge {
    #[serde(default)]
    pub summary: Option<LikeSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LikeSummary {
    #[serde(default)]
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Shares {
    #[serde(default)]
    pub count: Option<u64>,
}
