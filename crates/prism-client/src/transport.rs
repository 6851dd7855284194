//! reqwest-backed implementation of the [`ApiTransport`] port.
//!
//! All wire details live here: header attachment, JSON serialization,
//! multipart streaming, the shared response validation, and the mapping from
//! transport failures to [`PrismError`]. The client layer above never touches
//! reqwest types.

use std::path::Path;

use async_trait::async_trait;
use futures::stream;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::debug;

use prism_core::{ApiTransport, PrismError, RequestId, SessionToken};

/// Header carrying the session token on authenticated requests.
pub const SESSION_HEADER: &str = "X-Prism-Session";

/// Header carrying the client-generated request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Prism-Request";

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// HTTP transport for the Prism service.
///
/// Owns a single [`reqwest::Client`]; connection pooling and TLS come from
/// reqwest's defaults. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Builds the transport with the SDK user agent.
    pub fn new() -> Result<Self, PrismError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("prism-sdk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| PrismError::Config {
                message: error.to_string(),
            })?;
        Ok(Self { http })
    }

    /// Wraps an existing [`reqwest::Client`], keeping its settings.
    pub fn from_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: Value,
        session: Option<&SessionToken>,
    ) -> Result<Value, PrismError> {
        let request_id = RequestId::new_random();
        debug!(%request_id, url, "issuing request");

        let mut request = self
            .http
            .post(url)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(&body);
        if let Some(token) = session {
            request = request.header(SESSION_HEADER, token.as_str());
        }

        let response = request.send().await.map_err(map_transport_error)?;
        validate(response).await
    }

    async fn post_file(
        &self,
        url: &str,
        field: &str,
        path: &Path,
        session: Option<&SessionToken>,
    ) -> Result<Value, PrismError> {
        let request_id = RequestId::new_random();
        debug!(%request_id, url, path = %path.display(), "issuing upload");

        let file = tokio::fs::File::open(path).await.map_err(|error| {
            PrismError::Upload {
                message: format!("cannot open {}: {}", path.display(), error),
            }
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|error| PrismError::Upload {
                message: format!("cannot stat {}: {}", path.display(), error),
            })?
            .len();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let body = reqwest::Body::wrap_stream(chunk_stream(file));
        let part = reqwest::multipart::Part::stream_with_length(body, length)
            .file_name(file_name);
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        let mut request = self
            .http
            .post(url)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .multipart(form);
        if let Some(token) = session {
            request = request.header(SESSION_HEADER, token.as_str());
        }

        let response = request.send().await.map_err(map_transport_error)?;
        validate(response).await
    }
}

/// Reads the file in fixed-size chunks for the multipart body.
fn chunk_stream(
    file: tokio::fs::File,
) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> + Send {
    stream::try_unfold(file, |mut file| async move {
        let mut chunk = vec![0u8; UPLOAD_CHUNK_SIZE];
        let read = file.read(&mut chunk).await?;
        if read == 0 {
            return Ok(None);
        }
        chunk.truncate(read);
        Ok(Some((chunk, file)))
    })
}

/// Shared response validation.
///
/// Success requires a 2xx status, a JSON body, and no `error` field. Error
/// bodies and non-2xx statuses map to [`PrismError::Remote`]; unparseable
/// 2xx bodies map to [`PrismError::InvalidResponse`].
async fn validate(response: reqwest::Response) -> Result<Value, PrismError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_transport_error)?;

    let body: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(PrismError::Remote {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }
        Err(error) => {
            return Err(PrismError::InvalidResponse {
                message: error.to_string(),
            });
        }
    };

    if let Some(error) = body.get("error") {
        return Err(PrismError::Remote {
            status: status.as_u16(),
            message: remote_message(error),
        });
    }
    if !status.is_success() {
        return Err(PrismError::Remote {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }

    Ok(body)
}

/// Pulls a readable message out of an `error` body field.
fn remote_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

fn map_transport_error(error: reqwest::Error) -> PrismError {
    PrismError::Network {
        timeout: error.is_timeout() || error.is_connect(),
        message: error.to_string(),
    }
}
