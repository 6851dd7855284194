//! End-to-end client flows against an in-memory transport.
//!
//! The mock records every call the client makes — URL, payload, session —
//! and answers with canned bodies, so these tests pin down the exact wire
//! behavior of each operation without a running service.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use prism_client::{ClientOptions, PrismClient, RetrieveRequest};
use prism_core::{
    ApiTransport, ContentHash, FileExtension, JobCategory, JobHandle, JobPriority, PrismError,
    PurchaseLife, PurchaseToken, SessionToken,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Json {
        url: String,
        body: Value,
        session: Option<String>,
    },
    File {
        url: String,
        field: String,
        path: PathBuf,
        session: Option<String>,
    },
}

#[derive(Default)]
struct MockTransport {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<Result<Value, PrismError>>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn respond_ok(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    fn respond_err(&self, error: PrismError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<Value, PrismError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no canned response left for request")
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        body: Value,
        session: Option<&SessionToken>,
    ) -> Result<Value, PrismError> {
        self.calls.lock().unwrap().push(Call::Json {
            url: url.to_string(),
            body,
            session: session.map(|t| t.as_str().to_string()),
        });
        self.next_response()
    }

    async fn post_file(
        &self,
        url: &str,
        field: &str,
        path: &Path,
        session: Option<&SessionToken>,
    ) -> Result<Value, PrismError> {
        self.calls.lock().unwrap().push(Call::File {
            url: url.to_string(),
            field: field.to_string(),
            path: path.to_path_buf(),
            session: session.map(|t| t.as_str().to_string()),
        });
        self.next_response()
    }
}

fn connected_client(transport: Arc<MockTransport>) -> PrismClient {
    let opts = ClientOptions::default().with_credentials("alice", "secret");
    let mut client = PrismClient::with_transport(opts, transport).unwrap();
    client.connect(Some("prism.oose.io"), Some(5971));
    client
}

fn authenticated_client(transport: Arc<MockTransport>) -> PrismClient {
    let mut client = connected_client(transport);
    client.set_session(SessionToken::new("tok-1").unwrap());
    client
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_posts_credentials_and_stores_session() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"session": "tok-9"}));

    let mut client = connected_client(transport.clone());
    let token = client.login().await.unwrap();

    assert_eq!(token.as_str(), "tok-9");
    assert!(client.is_authenticated());
    assert_eq!(
        transport.calls(),
        vec![Call::Json {
            url: "https://prism.oose.io:5971/user/login".to_string(),
            body: json!({"username": "alice", "password": "secret"}),
            session: None,
        }]
    );
}

#[tokio::test]
async fn login_without_session_in_response_is_a_user_error() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"welcome": true}));

    let mut client = connected_client(transport);
    let err = client.login().await.unwrap_err();

    assert!(matches!(err, PrismError::MissingField { ref field } if field == "session"));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn login_before_connect_is_rejected_locally() {
    let transport = MockTransport::new();
    let opts = ClientOptions::default().with_credentials("alice", "secret");
    let mut client = PrismClient::with_transport(opts, transport.clone()).unwrap();

    let err = client.login().await.unwrap_err();
    assert!(matches!(err, PrismError::NotConnected));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn login_as_overrides_configured_credentials() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"session": "tok-2"}));

    let mut client = connected_client(transport.clone());
    client.login_as("bob", "hunter2").await.unwrap();

    match &transport.calls()[0] {
        Call::Json { body, .. } => {
            assert_eq!(body, &json!({"username": "bob", "password": "hunter2"}));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn logout_posts_with_session_then_clears_it() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"success": true}));

    let mut client = authenticated_client(transport.clone());
    client.logout().await.unwrap();

    assert!(!client.is_authenticated());
    assert!(client.prepare().is_err());
    assert_eq!(
        transport.calls(),
        vec![Call::Json {
            url: "https://prism.oose.io:5971/user/logout".to_string(),
            body: json!({}),
            session: Some("tok-1".to_string()),
        }]
    );
}

#[tokio::test]
async fn failed_logout_keeps_the_session() {
    let transport = MockTransport::new();
    transport.respond_err(PrismError::Network {
        message: "connection reset".to_string(),
        timeout: true,
    });

    let mut client = authenticated_client(transport);
    assert!(client.logout().await.is_err());
    assert!(client.is_authenticated());
}

// ---------------------------------------------------------------------------
// Content operations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn content_detail_sends_hash_and_decodes_record() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({
        "hash": "abc123",
        "mime_type": "video/mp4",
        "size": 1024,
        "copies": 3
    }));

    let client = authenticated_client(transport.clone());
    let hash = ContentHash::new("abc123").unwrap();
    let detail = client.content_detail(&hash).await.unwrap();

    assert_eq!(detail.hash.as_str(), "abc123");
    assert_eq!(detail.mime_type.as_deref(), Some("video/mp4"));
    assert_eq!(detail.size, Some(1024));
    assert_eq!(detail.extra["copies"], json!(3));
    assert_eq!(
        transport.calls(),
        vec![Call::Json {
            url: "https://prism.oose.io:5971/content/detail".to_string(),
            body: json!({"hash": "abc123"}),
            session: Some("tok-1".to_string()),
        }]
    );
}

#[tokio::test]
async fn content_upload_streams_through_the_file_field() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"hash": "deadbeef", "ext": "mp4", "size": 9000}));

    let client = authenticated_client(transport.clone());
    let entry = client.content_upload("/tmp/clip.mp4").await.unwrap();

    assert_eq!(entry.hash.as_str(), "deadbeef");
    assert_eq!(
        transport.calls(),
        vec![Call::File {
            url: "https://prism.oose.io:5971/content/upload".to_string(),
            field: "file".to_string(),
            path: PathBuf::from("/tmp/clip.mp4"),
            session: Some("tok-1".to_string()),
        }]
    );
}

#[tokio::test]
async fn content_retrieve_derives_extension_from_url() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"hash": "feed01"}));

    let client = authenticated_client(transport.clone());
    let request = RetrieveRequest::new("http://example.com/media/clip.webm?sig=zz");
    client.content_retrieve(request, None).await.unwrap();

    match &transport.calls()[0] {
        Call::Json { url, body, .. } => {
            assert_eq!(url, "https://prism.oose.io:5971/content/retrieve");
            assert_eq!(body["extension"], json!("webm"));
            assert_eq!(body["request"]["url"], json!("http://example.com/media/clip.webm?sig=zz"));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn content_retrieve_explicit_extension_wins() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"hash": "feed02"}));

    let client = authenticated_client(transport.clone());
    let request = RetrieveRequest::new("http://example.com/media/clip.webm");
    let ext = FileExtension::new("mp4").unwrap();
    client.content_retrieve(request, Some(ext)).await.unwrap();

    match &transport.calls()[0] {
        Call::Json { body, .. } => assert_eq!(body["extension"], json!("mp4")),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn content_retrieve_without_any_extension_falls_back_to_bin() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"hash": "feed03"}));

    let client = authenticated_client(transport.clone());
    let request = RetrieveRequest::new("http://example.com/media/clip");
    client.content_retrieve(request, None).await.unwrap();

    match &transport.calls()[0] {
        Call::Json { body, .. } => assert_eq!(body["extension"], json!("bin")),
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn content_purchase_sends_referrers_and_life() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"token": "p-1", "ext": "mp4", "life": 3600}));

    let client = authenticated_client(transport.clone());
    let hash = ContentHash::new("abc123").unwrap();
    let ext = FileExtension::new("mp4").unwrap();
    let referrers = vec!["player.example.com".to_string()];
    let receipt = client
        .content_purchase(&hash, &ext, &referrers, PurchaseLife::from_secs(3600))
        .await
        .unwrap();

    assert_eq!(receipt.token.as_str(), "p-1");
    assert_eq!(receipt.life, Some(3600));
    assert_eq!(
        transport.calls(),
        vec![Call::Json {
            url: "https://prism.oose.io:5971/content/purchase".to_string(),
            body: json!({
                "hash": "abc123",
                "ext": "mp4",
                "referrer": ["player.example.com"],
                "life": 3600
            }),
            session: Some("tok-1".to_string()),
        }]
    );
}

#[tokio::test]
async fn content_purchase_remove_passes_token_through() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"success": true}));

    let client = authenticated_client(transport.clone());
    let token = PurchaseToken::new("p-1").unwrap();
    let body = client.content_purchase_remove(&token).await.unwrap();

    assert_eq!(body, json!({"success": true}));
    match &transport.calls()[0] {
        Call::Json { url, body, .. } => {
            assert_eq!(url, "https://prism.oose.io:5971/content/purchase/remove");
            assert_eq!(body, &json!({"token": "p-1"}));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Job operations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn job_create_defaults_category_to_resource() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"handle": "job-1", "status": "created"}));

    let client = authenticated_client(transport.clone());
    let description = json!({"resource": [{"url": "http://example.com/a.mp4"}]});
    let detail = client.job_create(&description, None, None).await.unwrap();

    assert_eq!(detail.handle.as_str(), "job-1");
    match &transport.calls()[0] {
        Call::Json { url, body, .. } => {
            assert_eq!(url, "https://prism.oose.io:5971/job/create");
            assert_eq!(body["category"], json!("resource"));
            assert!(body.get("priority").is_none());
            // The description travels as a JSON string, not a nested object.
            let sent: Value =
                serde_json::from_str(body["description"].as_str().unwrap()).unwrap();
            assert_eq!(sent, description);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn job_create_sends_explicit_priority_and_category() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"handle": "job-2"}));

    let client = authenticated_client(transport.clone());
    client
        .job_create(
            &json!({"augment": true}),
            Some(JobPriority::new(10)),
            JobCategory::new("augment"),
        )
        .await
        .unwrap();

    match &transport.calls()[0] {
        Call::Json { body, .. } => {
            assert_eq!(body["priority"], json!(10));
            assert_eq!(body["category"], json!("augment"));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn job_lifecycle_operations_post_the_handle() {
    let transport = MockTransport::new();
    let client = authenticated_client(transport.clone());
    let handle = JobHandle::new("job-3").unwrap();

    for _ in 0..4 {
        transport.respond_ok(json!({"handle": "job-3", "status": "ok"}));
    }
    client.job_detail(&handle).await.unwrap();
    client.job_start(&handle).await.unwrap();
    client.job_abort(&handle).await.unwrap();
    client.job_retry(&handle).await.unwrap();

    transport.respond_ok(json!({"removed": true}));
    client.job_remove(&handle).await.unwrap();

    let urls: Vec<String> = transport
        .calls()
        .into_iter()
        .map(|call| match call {
            Call::Json { url, body, .. } => {
                assert_eq!(body["handle"], json!("job-3"));
                url
            }
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://prism.oose.io:5971/job/detail",
            "https://prism.oose.io:5971/job/start",
            "https://prism.oose.io:5971/job/abort",
            "https://prism.oose.io:5971/job/retry",
            "https://prism.oose.io:5971/job/remove",
        ]
    );
}

#[tokio::test]
async fn job_update_nests_changes() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"handle": "job-4", "priority": 5}));

    let client = authenticated_client(transport.clone());
    let handle = JobHandle::new("job-4").unwrap();
    let changes = json!({"priority": 5});
    let detail = client.job_update(&handle, &changes).await.unwrap();

    assert_eq!(detail.priority, Some(5));
    match &transport.calls()[0] {
        Call::Json { body, .. } => {
            assert_eq!(body, &json!({"handle": "job-4", "changes": {"priority": 5}}));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn job_content_exists_unwraps_the_flag() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"exists": true}));
    transport.respond_ok(json!({"exists": false}));

    let client = authenticated_client(transport.clone());
    let handle = JobHandle::new("job-5").unwrap();

    assert!(client.job_content_exists(&handle, "out.mp4").await.unwrap());
    assert!(!client.job_content_exists(&handle, "missing").await.unwrap());

    match &transport.calls()[0] {
        Call::Json { url, body, .. } => {
            assert_eq!(url, "https://prism.oose.io:5971/job/content/exists");
            assert_eq!(body, &json!({"handle": "job-5", "file": "out.mp4"}));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn job_content_exists_without_flag_is_a_user_error() {
    let transport = MockTransport::new();
    transport.respond_ok(json!({"status": "unknown"}));

    let client = authenticated_client(transport);
    let handle = JobHandle::new("job-6").unwrap();
    let err = client
        .job_content_exists(&handle, "out.mp4")
        .await
        .unwrap_err();

    assert!(matches!(err, PrismError::MissingField { ref field } if field == "exists"));
}

// ---------------------------------------------------------------------------
// Failure propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remote_errors_reach_the_caller_unchanged() {
    let transport = MockTransport::new();
    transport.respond_err(PrismError::Remote {
        status: 404,
        message: "no such job".to_string(),
    });

    let client = authenticated_client(transport);
    let handle = JobHandle::new("gone").unwrap();
    let err = client.job_detail(&handle).await.unwrap_err();

    assert!(matches!(err, PrismError::Remote { status: 404, .. }));
}

#[tokio::test]
async fn operations_fail_locally_when_unauthenticated() {
    let transport = MockTransport::new();
    let client = connected_client(transport.clone());
    let hash = ContentHash::new("abc").unwrap();

    let err = client.content_detail(&hash).await.unwrap_err();
    assert!(matches!(err, PrismError::NotAuthenticated));
    assert!(transport.calls().is_empty());
}
