use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::models::{AskReply, AskRequest, Exchange, UploadReply};

/// Multipart field the upload endpoint reads the document from.
const FILE_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The two backend operations a chat session depends on.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Post `file` as the `file` field of a multipart form. `None` sends an
    /// empty part, the way a browser form does when nothing is picked.
    async fn upload_pdf(&self, file: Option<&Path>) -> Result<UploadReply, ClientError>;

    /// Ask `question` with the full prior history as context.
    async fn ask_question(&self, question: &str, history: &[Exchange]) -> Result<AskReply, ClientError>;
}

pub struct PdfChatClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl PdfChatClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            config,
            client: builder.build()?,
        })
    }

    async fn file_part(file: Option<&Path>) -> Result<Part, ClientError> {
        let Some(path) = file else {
            return Ok(Part::bytes(Vec::new())
                .file_name(String::new())
                .mime_str("application/octet-stream")?);
        };

        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string();

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        let mime_type = if is_pdf { "application/pdf" } else { "application/octet-stream" };

        debug!("Prepared {} ({} bytes, {})", file_name, bytes.len(), mime_type);

        Ok(Part::bytes(bytes).file_name(file_name).mime_str(mime_type)?)
    }
}

#[async_trait]
impl ChatBackend for PdfChatClient {
    async fn upload_pdf(&self, file: Option<&Path>) -> Result<UploadReply, ClientError> {
        let form = Form::new().part(FILE_FIELD, Self::file_part(file).await?);

        debug!("Uploading document to {}", self.config.upload_url);

        let response = self
            .client
            .post(self.config.upload_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Upload endpoint answered {}: {}", status, body);

        if !status.is_success() {
            // The backend reports rejections as {"error": "..."}
            let detail = serde_json::from_str::<UploadReply>(&body)
                .ok()
                .and_then(|reply| reply.error)
                .unwrap_or_else(|| body.clone());
            error!("Upload failed with {}: {}", status, detail);
            return Err(ClientError::Status { status, body: detail });
        }

        let reply: UploadReply = serde_json::from_str(&body)?;
        if reply.message.is_none() {
            warn!("Upload response has no message field");
        }

        Ok(reply)
    }

    async fn ask_question(&self, question: &str, history: &[Exchange]) -> Result<AskReply, ClientError> {
        let request_body = AskRequest {
            question,
            chat_history: history,
        };

        debug!("Sending question to {}: {}", self.config.ask_url, serde_json::to_string(&request_body)?);

        let response = self
            .client
            .post(self.config.ask_url.clone())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Ask endpoint answered {}: {}", status, body);

        if !status.is_success() {
            error!("Question failed with {}: {}", status, body);
            return Err(ClientError::Status { status, body });
        }

        let reply: AskReply = serde_json::from_str(&body)?;
        if reply.response.is_none() {
            warn!("Ask response has no response field");
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Json, Multipart, State};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::Router;
    use serde_json::{json, Value};
    use url::Url;

    use super::*;

    #[derive(Debug, Default, Clone)]
    struct ReceivedPart {
        name: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    }

    #[derive(Clone, Default)]
    struct Recorded {
        parts: Arc<Mutex<Vec<ReceivedPart>>>,
        questions: Arc<Mutex<Vec<Value>>>,
    }

    async fn upload_handler(State(recorded): State<Recorded>, mut multipart: Multipart) -> (AxumStatus, Json<Value>) {
        let mut has_file = false;
        while let Some(field) = multipart.next_field().await.unwrap() {
            let part = ReceivedPart {
                name: field.name().map(str::to_string),
                file_name: field.file_name().map(str::to_string),
                content_type: field.content_type().map(str::to_string),
                bytes: Vec::new(),
            };
            let bytes = field.bytes().await.unwrap().to_vec();
            has_file |= !bytes.is_empty();
            recorded.parts.lock().unwrap().push(ReceivedPart { bytes, ..part });
        }

        if has_file {
            (AxumStatus::OK, Json(json!({"message": "PDF uploaded successfully"})))
        } else {
            (AxumStatus::BAD_REQUEST, Json(json!({"error": "No file provided"})))
        }
    }

    async fn ask_handler(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
        let question = body["question"].as_str().unwrap_or_default().to_string();
        recorded.questions.lock().unwrap().push(body);
        Json(json!({"response": format!("You asked: {}", question), "chat_history": []}))
    }

    async fn spawn_backend(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    async fn client_for(router: Router) -> PdfChatClient {
        let base = spawn_backend(router).await;
        let config = ClientConfig::new(
            base.join("upload-pdf").unwrap(),
            base.join("ask-question").unwrap(),
            Some(5),
        )
        .unwrap();
        PdfChatClient::new(config).unwrap()
    }

    fn backend(recorded: Recorded) -> Router {
        Router::new()
            .route("/upload-pdf", post(upload_handler))
            .route("/ask-question", post(ask_handler))
            .with_state(recorded)
    }

    #[tokio::test]
    async fn test_upload_sends_file_field() {
        let recorded = Recorded::default();
        let client = client_for(backend(recorded.clone())).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();

        let reply = client.upload_pdf(Some(&path)).await.unwrap();
        assert!(reply.is_accepted());

        let parts = recorded.parts.lock().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name.as_deref(), Some("file"));
        assert_eq!(parts[0].file_name.as_deref(), Some("notes.pdf"));
        assert_eq!(parts[0].content_type.as_deref(), Some("application/pdf"));
        assert_eq!(parts[0].bytes, b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_upload_without_file_sends_empty_part() {
        let recorded = Recorded::default();
        let client = client_for(backend(recorded.clone())).await;

        let err = client.upload_pdf(None).await.unwrap_err();
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body, "No file provided");
            }
            other => panic!("unexpected error: {other}"),
        }

        let parts = recorded.parts.lock().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name.as_deref(), Some("file"));
        assert!(parts[0].bytes.is_empty());
    }

    #[tokio::test]
    async fn test_upload_of_missing_file_is_read_error() {
        let client = client_for(backend(Recorded::default())).await;
        let err = client
            .upload_pdf(Some(Path::new("/definitely/not/here.pdf")))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ReadFile { .. }));
    }

    #[tokio::test]
    async fn test_ask_posts_question_and_history() {
        let recorded = Recorded::default();
        let client = client_for(backend(recorded.clone())).await;

        let history = vec![Exchange::human("first"), Exchange::bot("one")];
        let reply = client.ask_question("second", &history).await.unwrap();
        assert_eq!(reply.response.as_deref(), Some("You asked: second"));

        let questions = recorded.questions.lock().unwrap();
        assert_eq!(
            questions[0],
            json!({
                "question": "second",
                "chat_history": [
                    {"type": "human", "message": "first"},
                    {"type": "bot", "message": "one"}
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_ask_server_error_is_status_error() {
        let router = Router::new().route(
            "/ask-question",
            post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = client_for(router).await;

        let err = client.ask_question("anything", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_ask_non_json_body_is_decode_error() {
        let router = Router::new().route("/ask-question", post(|| async { "not json" }));
        let client = client_for(router).await;

        let err = client.ask_question("anything", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{}/", addr)).unwrap();
        let config = ClientConfig::new(base.join("u").unwrap(), base.join("q").unwrap(), Some(2)).unwrap();
        let client = PdfChatClient::new(config).unwrap();

        let err = client.ask_question("hello", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
