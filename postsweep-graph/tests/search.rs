use std::io;
use std::sync::{Arc, Mutex};

use postsweep_common::SweepError;
use postsweep_graph::client::POST_FIELDS;
use postsweep_graph::{ExtractedPost, Extractor, GraphApi};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn extractor_for(server: &MockServer) -> Extractor<GraphApi> {
    Extractor::new(GraphApi::new(&server.uri(), "v19.0").unwrap())
}

#[tokio::test]
async fn search_sends_one_post_query_and_flattens_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v19.0/search"))
        .and(query_param("type", "post"))
        .and(query_param("q", "rust lang"))
        .and(query_param("fields", POST_FIELDS))
        .and(query_param("access_token", "good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": "1",
                    "message": "hi",
                    "comments": { "data": [ { "message": "a" }, { "message": "b" } ] },
                    "likes": { "summary": { "total_count": 5 } },
                    "shares": { "count": 2 }
                },
                { "id": "2" }
            ],
            "paging": { "next": "https://graph.facebook.com/v19.0/search?after=xyz" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let posts = extractor_for(&server)
        .await
        .extract("rust lang", "good-token")
        .await
        .unwrap();

    assert_eq!(
        posts,
        vec![
            ExtractedPost {
                id: "1".into(),
                message: Some("hi".into()),
                comments: vec!["a".into(), "b".into()],
                likes_count: 5,
                shares_count: 2,
            },
            ExtractedPost {
                id: "2".into(),
                message: None,
                comments: vec![],
                likes_count: 0,
                shares_count: 0,
            },
        ]
    );
}

#[tokio::test]
async fn empty_query_is_sent_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v19.0/search"))
        .and(query_param("q", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let posts = extractor_for(&server).await.extract("", "t").await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn rejected_token_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Invalid OAuth access token - Cannot parse access token",
                "type": "OAuthException",
                "code": 190,
                "fbtrace_id": "A1b2"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = extractor_for(&server)
        .await
        .extract("rust", "bad-token")
        .await
        .unwrap_err();

    assert!(err.is_authentication(), "got {err:?}");
}

#[tokio::test]
async fn missing_token_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("access_token", ""))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "An access token is required to request this resource.",
                "type": "OAuthException",
                "code": 104,
                "fbtrace_id": "C3d4"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = extractor_for(&server)
        .await
        .extract("rust", "")
        .await
        .unwrap_err();

    assert!(err.is_authentication(), "got {err:?}");
}

#[tokio::test]
async fn quota_and_server_failures_are_request_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "message": "(#4) Application request limit reached",
                "type": "OAuthException",
                "code": 4
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = extractor_for(&server)
        .await
        .extract("rust", "t")
        .await
        .unwrap_err();
    assert!(matches!(err, SweepError::Request(_)), "got {err:?}");
}

#[tokio::test]
async fn response_without_data_is_a_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "paging": {} })))
        .mount(&server)
        .await;

    let err = extractor_for(&server)
        .await
        .extract("rust", "t")
        .await
        .unwrap_err();
    assert!(matches!(err, SweepError::Request(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    // Nothing listens on port 9 on loopback.
    let api = GraphApi::new("http://127.0.0.1:9", "v19.0").unwrap();
    let err = Extractor::new(api).extract("rust", "t").await.unwrap_err();
    assert!(matches!(err, SweepError::Request(_)), "got {err:?}");
}

/// Shared in-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn every_post_is_logged_at_info_with_all_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": "1",
                    "message": "hi",
                    "comments": { "data": [ { "message": "a" }, { "message": "b" } ] },
                    "likes": { "summary": { "total_count": 5 } },
                    "shares": { "count": 2 }
                },
                { "id": "2" }
            ]
        })))
        .mount(&server)
        .await;

    let buf = LogBuffer::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing_subscriber::filter::LevelFilter::INFO)
        .with_ansi(false)
        .without_time()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let posts = extractor_for(&server)
        .await
        .extract("rust", "t")
        .await
        .unwrap();
    assert_eq!(posts.len(), 2);

    let logged: Vec<String> = buf
        .lines()
        .into_iter()
        .filter(|l| l.contains("Extracted post data"))
        .collect();
    assert_eq!(logged.len(), 2, "log lines: {logged:?}");

    for line in &logged {
        assert!(line.contains("INFO"), "{line}");
    }
    for field in [
        "id=1",
        r#"message=Some("hi")"#,
        r#"comments=["a", "b"]"#,
        "likes_count=5",
        "shares_count=2",
    ] {
        assert!(logged[0].contains(field), "missing {field} in {}", logged[0]);
    }
    for field in [
        "id=2",
        "message=None",
        "comments=[]",
        "likes_count=0",
        "shares_count=0",
    ] {
        assert!(logged[1].contains(field), "missing {field} in {}", logged[1]);
    }
}
