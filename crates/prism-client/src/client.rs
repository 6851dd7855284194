//! The stateful Prism client.
//!
//! Holds connection options, the session token, and the injected transport.
//! Every remote operation follows the same shape: check the prepare guard,
//! issue one POST through the transport, interpret the validated body. State
//! transitions (connect, login, set_session, logout) take `&mut self`, so a
//! login racing a content operation is a compile error rather than a data
//! race.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};

use prism_core::{
    ApiTransport, ContentHash, FileExtension, JobCategory, JobHandle, JobPriority, PrismError,
    PurchaseLife, PurchaseToken, SessionToken,
};

use crate::models::{ContentDetail, ContentEntry, JobDetail, PurchaseReceipt, RetrieveRequest};
use crate::options::{ClientOptions, DEFAULT_PRISM_PORT};
use crate::transport::HttpTransport;
use crate::urls;

/// Resolved Prism endpoint after `connect`.
#[derive(Debug, Clone)]
struct Connection {
    host: String,
    port: u16,
}

/// A session-bound request context produced by [`PrismClient::prepare`].
///
/// Existence of a value proves the client was connected and authenticated at
/// the moment of the call.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    base: String,
    session: SessionToken,
}

impl PreparedRequest {
    /// Full endpoint URL for the given path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// The session token bound to this request context.
    pub fn session(&self) -> &SessionToken {
        &self.session
    }
}

/// Client for the Prism content/job service.
///
/// Construct with [`PrismClient::new`], then [`connect`](Self::connect) and
/// authenticate ([`login`](Self::login) or [`set_session`](Self::set_session))
/// before issuing content or job operations. Each operation issues exactly
/// one HTTP POST and resolves with the interpreted response body.
pub struct PrismClient {
    opts: ClientOptions,
    transport: Arc<dyn ApiTransport>,
    connection: Option<Connection>,
    session: Option<SessionToken>,
}

impl PrismClient {
    /// Builds a client over the default HTTP transport.
    pub fn new(opts: ClientOptions) -> Result<Self, PrismError> {
        let transport = Arc::new(HttpTransport::new()?);
        Self::with_transport(opts, transport)
    }

    /// Builds a client over an injected transport.
    ///
    /// This is the seam tests use to substitute an in-memory transport.
    pub fn with_transport(
        opts: ClientOptions,
        transport: Arc<dyn ApiTransport>,
    ) -> Result<Self, PrismError> {
        opts.validate()?;
        Ok(Self {
            opts,
            transport,
            connection: None,
            session: None,
        })
    }

    /// The options this client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.opts
    }

    /// Whether `connect` has selected a target host.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Whether a session is held (via `login` or `set_session`).
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The current session token, if authenticated.
    pub fn session(&self) -> Option<&SessionToken> {
        self.session.as_ref()
    }

    // -----------------------------------------------------------------------
    // Connection & session management
    // -----------------------------------------------------------------------

    /// Selects the Prism host to talk to and marks the client connected.
    ///
    /// An explicit `host` (and optional `port`) wins; otherwise the options'
    /// `host`/`port` apply, falling back to the configured domain and port
    /// 5971. Returns the resolved host. No network traffic is issued.
    pub fn connect(&mut self, host: Option<&str>, port: Option<u16>) -> String {
        let resolved_host = host
            .map(str::to_string)
            .or_else(|| self.opts.host.clone())
            .unwrap_or_else(|| self.opts.domain.clone());
        let resolved_port = port.or(self.opts.port).unwrap_or(DEFAULT_PRISM_PORT);

        info!(host = %resolved_host, port = resolved_port, "connected to prism");
        self.connection = Some(Connection {
            host: resolved_host.clone(),
            port: resolved_port,
        });
        resolved_host
    }

    /// Logs in with the configured credentials and stores the issued session.
    ///
    /// Fails with [`PrismError::MissingField`] if the service answers without
    /// a session token; the client stays unauthenticated in that case.
    pub async fn login(&mut self) -> Result<SessionToken, PrismError> {
        let username = self.opts.username.clone().ok_or_else(|| PrismError::Config {
            message: "no username configured".to_string(),
        })?;
        let password = self.opts.password.clone().ok_or_else(|| PrismError::Config {
            message: "no password configured".to_string(),
        })?;
        self.login_with(&username, &password).await
    }

    /// Logs in with explicit credentials, storing them for later re-login.
    pub async fn login_as(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, PrismError> {
        self.opts.username = Some(username.to_string());
        self.opts.password = Some(password.to_string());
        self.login_with(username, password).await
    }

    async fn login_with(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, PrismError> {
        let connection = self.connection.as_ref().ok_or(PrismError::NotConnected)?;
        let url = format!(
            "https://{}:{}/user/login",
            connection.host, connection.port
        );
        let body = self
            .transport
            .post_json(
                &url,
                json!({"username": username, "password": password}),
                None,
            )
            .await?;

        let token = body
            .get("session")
            .and_then(Value::as_str)
            .and_then(SessionToken::new)
            .ok_or(PrismError::MissingField {
                field: "session".to_string(),
            })?;

        debug!(token_len = token.as_str().len(), "session established");
        self.session = Some(token.clone());
        Ok(token)
    }

    /// Adopts a previously obtained session without a network round trip.
    pub fn set_session(&mut self, token: SessionToken) {
        self.session = Some(token);
    }

    /// Ends the session on the service, then drops it locally.
    ///
    /// The session is kept if the request fails, so the caller can retry.
    pub async fn logout(&mut self) -> Result<(), PrismError> {
        let prepared = self.prepare()?;
        self.transport
            .post_json(
                &prepared.url("/user/logout"),
                json!({}),
                Some(prepared.session()),
            )
            .await?;
        self.session = None;
        Ok(())
    }

    /// Guard + request-context factory for authenticated operations.
    ///
    /// Fails with [`PrismError::NotConnected`] before `connect` and
    /// [`PrismError::NotAuthenticated`] before `login`/`set_session`.
    pub fn prepare(&self) -> Result<PreparedRequest, PrismError> {
        let connection = self.connection.as_ref().ok_or(PrismError::NotConnected)?;
        let session = self.session.clone().ok_or(PrismError::NotAuthenticated)?;
        Ok(PreparedRequest {
            base: format!("https://{}:{}", connection.host, connection.port),
            session,
        })
    }

    /// One prepared POST: the shape every content/job operation reduces to.
    async fn post(&self, path: &str, body: Value) -> Result<Value, PrismError> {
        let prepared = self.prepare()?;
        self.transport
            .post_json(&prepared.url(path), body, Some(prepared.session()))
            .await
    }

    // -----------------------------------------------------------------------
    // Content operations
    // -----------------------------------------------------------------------

    /// Looks up the stored-content record for `hash`.
    pub async fn content_detail(&self, hash: &ContentHash) -> Result<ContentDetail, PrismError> {
        let body = self.post("/content/detail", json!({"hash": hash})).await?;
        decode(body)
    }

    /// Streams the file at `path` to the service as multipart form data.
    pub async fn content_upload(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ContentEntry, PrismError> {
        let prepared = self.prepare()?;
        let body = self
            .transport
            .post_file(
                &prepared.url("/content/upload"),
                "file",
                path.as_ref(),
                Some(prepared.session()),
            )
            .await?;
        decode(body)
    }

    /// Asks the service to fetch `request.url` itself and store the result.
    ///
    /// When `ext` is omitted it is derived from the request URL, falling back
    /// to `bin`.
    pub async fn content_retrieve(
        &self,
        request: RetrieveRequest,
        ext: Option<FileExtension>,
    ) -> Result<ContentEntry, PrismError> {
        let extension = ext
            .or_else(|| FileExtension::from_url(&request.url))
            .unwrap_or_default();
        let body = self
            .post(
                "/content/retrieve",
                json!({"request": request, "extension": extension}),
            )
            .await?;
        decode(body)
    }

    /// Purchases content for playback, yielding a receipt with the URL token.
    ///
    /// `referrers` limits which sites may embed the playback URL; `life` is
    /// how long the purchase stays valid.
    pub async fn content_purchase(
        &self,
        hash: &ContentHash,
        ext: &FileExtension,
        referrers: &[String],
        life: PurchaseLife,
    ) -> Result<PurchaseReceipt, PrismError> {
        let body = self
            .post(
                "/content/purchase",
                json!({
                    "hash": hash,
                    "ext": ext,
                    "referrer": referrers,
                    "life": life,
                }),
            )
            .await?;
        decode(body)
    }

    /// Revokes a purchase. Returns the raw response body.
    pub async fn content_purchase_remove(
        &self,
        token: &PurchaseToken,
    ) -> Result<Value, PrismError> {
        self.post("/content/purchase/remove", json!({"token": token}))
            .await
    }

    /// Playback URL for a purchase. Pure string building, no network call.
    ///
    /// `name` defaults to `video`; the extension comes from the receipt,
    /// falling back to `bin`.
    pub fn url_purchase(&self, receipt: &PurchaseReceipt, name: Option<&str>) -> String {
        urls::purchase_url(
            &self.opts.cdn_domain(),
            &receipt.token,
            receipt.ext.as_deref(),
            name,
        )
    }

    /// Static-content URL. Pure string building, no network call.
    ///
    /// `name` defaults to `file`, `ext` to `bin`.
    pub fn url_static(
        &self,
        hash: &ContentHash,
        ext: Option<&FileExtension>,
        name: Option<&str>,
    ) -> String {
        urls::static_url(
            &self.opts.cdn_domain(),
            hash,
            ext.map(FileExtension::as_str),
            name,
        )
    }

    // -----------------------------------------------------------------------
    // Job operations
    // -----------------------------------------------------------------------

    /// Creates a job from a description document.
    ///
    /// The description is JSON-serialized into the payload. `category`
    /// defaults to `resource`, the service's general worker pool.
    pub async fn job_create(
        &self,
        description: &Value,
        priority: Option<JobPriority>,
        category: Option<JobCategory>,
    ) -> Result<JobDetail, PrismError> {
        let mut payload = json!({
            "description": serde_json::to_string(description)?,
            "category": category.unwrap_or_default(),
        });
        if let Some(priority) = priority {
            payload["priority"] = json!(priority);
        }
        let body = self.post("/job/create", payload).await?;
        decode(body)
    }

    /// Fetches the current job record.
    pub async fn job_detail(&self, handle: &JobHandle) -> Result<JobDetail, PrismError> {
        let body = self.post("/job/detail", json!({"handle": handle})).await?;
        decode(body)
    }

    /// Applies a partial update to a job.
    pub async fn job_update(
        &self,
        handle: &JobHandle,
        changes: &Value,
    ) -> Result<JobDetail, PrismError> {
        let body = self
            .post("/job/update", json!({"handle": handle, "changes": changes}))
            .await?;
        decode(body)
    }

    /// Queues the job for execution.
    pub async fn job_start(&self, handle: &JobHandle) -> Result<JobDetail, PrismError> {
        let body = self.post("/job/start", json!({"handle": handle})).await?;
        decode(body)
    }

    /// Aborts a running job.
    pub async fn job_abort(&self, handle: &JobHandle) -> Result<JobDetail, PrismError> {
        let body = self.post("/job/abort", json!({"handle": handle})).await?;
        decode(body)
    }

    /// Re-queues a failed job. This is a service-side operation; the SDK
    /// itself never retries requests.
    pub async fn job_retry(&self, handle: &JobHandle) -> Result<JobDetail, PrismError> {
        let body = self.post("/job/retry", json!({"handle": handle})).await?;
        decode(body)
    }

    /// Deletes the job. Returns the raw response body.
    pub async fn job_remove(&self, handle: &JobHandle) -> Result<Value, PrismError> {
        self.post("/job/remove", json!({"handle": handle})).await
    }

    /// Whether the job has produced the named output file.
    pub async fn job_content_exists(
        &self,
        handle: &JobHandle,
        file: &str,
    ) -> Result<bool, PrismError> {
        let body = self
            .post(
                "/job/content/exists",
                json!({"handle": handle, "file": file}),
            )
            .await?;
        body.get("exists")
            .and_then(Value::as_bool)
            .ok_or(PrismError::MissingField {
                field: "exists".to_string(),
            })
    }

    /// Direct download URL for a job output file. Pure string building, but
    /// requires a connection, since the URL targets the connected host.
    pub fn job_content_url(&self, handle: &JobHandle, file: &str) -> Result<String, PrismError> {
        let connection = self.connection.as_ref().ok_or(PrismError::NotConnected)?;
        Ok(urls::job_content_download_url(
            &connection.host,
            connection.port,
            handle,
            file,
        ))
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, PrismError> {
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Transport that panics on use: proves an operation stayed local.
    struct NoNetwork;

    #[async_trait]
    impl ApiTransport for NoNetwork {
        async fn post_json(
            &self,
            url: &str,
            _body: Value,
            _session: Option<&SessionToken>,
        ) -> Result<Value, PrismError> {
            panic!("unexpected request to {url}");
        }

        async fn post_file(
            &self,
            url: &str,
            _field: &str,
            _path: &Path,
            _session: Option<&SessionToken>,
        ) -> Result<Value, PrismError> {
            panic!("unexpected upload to {url}");
        }
    }

    fn offline_client() -> PrismClient {
        PrismClient::with_transport(ClientOptions::default(), Arc::new(NoNetwork)).unwrap()
    }

    #[test]
    fn connect_with_host_resolves_to_that_host() {
        let mut client = offline_client();
        let host = client.connect(Some("prism.example.com"), Some(3000));
        assert_eq!(host, "prism.example.com");
        assert!(client.is_connected());
    }

    #[test]
    fn connect_falls_back_to_domain_and_default_port() {
        let mut client = offline_client();
        let host = client.connect(None, None);
        assert_eq!(host, "oose.io");
        let handle = JobHandle::new("h").unwrap();
        let url = client.job_content_url(&handle, "out.txt").unwrap();
        assert_eq!(url, "https://oose.io:5971/job/content/download/h/out.txt");
    }

    #[test]
    fn connect_prefers_configured_host_over_domain() {
        let opts = ClientOptions::default().with_host("10.0.0.5", 5980);
        let mut client = PrismClient::with_transport(opts, Arc::new(NoNetwork)).unwrap();
        let host = client.connect(None, None);
        assert_eq!(host, "10.0.0.5");
        let handle = JobHandle::new("h").unwrap();
        let url = client.job_content_url(&handle, "f").unwrap();
        assert_eq!(url, "https://10.0.0.5:5980/job/content/download/h/f");
    }

    #[test]
    fn prepare_fails_before_connect() {
        let client = offline_client();
        assert!(matches!(client.prepare(), Err(PrismError::NotConnected)));
    }

    #[test]
    fn prepare_fails_before_authentication() {
        let mut client = offline_client();
        client.connect(None, None);
        assert!(matches!(
            client.prepare(),
            Err(PrismError::NotAuthenticated)
        ));
    }

    #[test]
    fn set_session_authenticates_without_network() {
        let mut client = offline_client();
        client.connect(None, None);
        assert!(!client.is_authenticated());

        client.set_session(SessionToken::new("tok-1").unwrap());
        assert!(client.is_authenticated());

        let prepared = client.prepare().unwrap();
        assert_eq!(prepared.session().as_str(), "tok-1");
        assert_eq!(prepared.url("/content/detail"), "https://oose.io:5971/content/detail");
    }

    #[test]
    fn url_purchase_defaults_and_overrides() {
        let client = offline_client();
        let mut receipt = PurchaseReceipt::from_token(PurchaseToken::new("t").unwrap());
        receipt.ext = Some("mp4".to_string());

        assert_eq!(client.url_purchase(&receipt, None), "//cdn.oose.io/t/video.mp4");
        assert_eq!(client.url_purchase(&receipt, Some("x")), "//cdn.oose.io/t/x.mp4");
    }

    #[test]
    fn url_purchase_without_ext_falls_back_to_bin() {
        let client = offline_client();
        let receipt = PurchaseReceipt::from_token(PurchaseToken::new("t").unwrap());
        assert_eq!(client.url_purchase(&receipt, None), "//cdn.oose.io/t/video.bin");
    }

    #[test]
    fn url_static_defaults_and_overrides() {
        let client = offline_client();
        let hash = ContentHash::new("abc123").unwrap();

        assert_eq!(
            client.url_static(&hash, None, None),
            "//cdn.oose.io/static/abc123/file.bin"
        );
        let jpg = FileExtension::new("jpg").unwrap();
        assert_eq!(
            client.url_static(&hash, Some(&jpg), Some("img")),
            "//cdn.oose.io/static/abc123/img.jpg"
        );
    }

    #[test]
    fn job_content_url_requires_connection() {
        let client = offline_client();
        let handle = JobHandle::new("h1").unwrap();
        assert!(matches!(
            client.job_content_url(&handle, "f.txt"),
            Err(PrismError::NotConnected)
        ));
    }

    #[test]
    fn job_content_url_uses_connected_host() {
        let mut client = offline_client();
        client.connect(Some("example.com"), Some(5971));
        let handle = JobHandle::new("h1").unwrap();
        assert_eq!(
            client.job_content_url(&handle, "f.txt").unwrap(),
            "https://example.com:5971/job/content/download/h1/f.txt"
        );
    }
}
