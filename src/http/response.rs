//! HTTP response building module
//!
//! Handlers describe their answer with a [`ResponseDescriptor`]; the dispatcher turns
//! it into a hyper response exactly once.

use bytes::Bytes;
use futures::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use std::io;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Content type used when a descriptor does not name one
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Body type of every response the server emits
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Response payload
#[derive(Debug)]
pub enum Payload {
    Empty,
    Text(String),
    /// Opened file, streamed to the client chunk by chunk until EOF
    File(File),
}

impl Payload {
    #[cfg(test)]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Empty | Self::File(_) => None,
        }
    }

    /// Byte length when known without reading the payload; `None` for files
    pub fn known_len(&self) -> Option<usize> {
        match self {
            Self::Empty => Some(0),
            Self::Text(text) => Some(text.len()),
            Self::File(_) => None,
        }
    }

    fn into_body(self) -> ResponseBody {
        match self {
            Self::Empty => Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync(),
            Self::Text(text) => Full::new(Bytes::from(text))
                .map_err(|never| match never {})
                .boxed_unsync(),
            Self::File(file) => {
                StreamBody::new(ReaderStream::new(file).map_ok(Frame::data)).boxed_unsync()
            }
        }
    }
}

/// Uniform handler output: body, status and content type
#[derive(Debug)]
pub struct ResponseDescriptor {
    pub body: Payload,
    pub status: StatusCode,
    /// `None` falls back to [`DEFAULT_CONTENT_TYPE`]
    pub content_type: Option<String>,
}

impl Default for ResponseDescriptor {
    fn default() -> Self {
        Self {
            body: Payload::Empty,
            status: StatusCode::OK,
            content_type: None,
        }
    }
}

impl ResponseDescriptor {
    /// Bodiless response with the given status
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn no_content() -> Self {
        Self::status(StatusCode::NO_CONTENT)
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            body: Payload::Text(body.into()),
            status,
            content_type: None,
        }
    }

    /// 200 response streaming `file` to its end
    pub fn file(file: File, content_type: Option<String>) -> Self {
        Self {
            body: Payload::File(file),
            status: StatusCode::OK,
            content_type,
        }
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Emit the final hyper response
    pub fn into_response(self) -> Response<ResponseBody> {
        let content_type = self.content_type().to_string();
        let status = self.status;

        // File streams carry no length; hyper frames them with chunked encoding
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, content_type)
            .body(self.body.into_body())
            .unwrap_or_else(|e| {
                log_build_error(status, &e);
                let mut fallback = Response::new(Payload::Empty.into_body());
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_response_defaults_to_plain_text() {
        let resp = ResponseDescriptor::text(StatusCode::NOT_FOUND, "File not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"File not found");
    }

    #[tokio::test]
    async fn test_no_content_has_empty_body() {
        let resp = ResponseDescriptor::no_content().into_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_file_payload_streams_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let contents: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();
        std::fs::write(&path, &contents).unwrap();

        let file = File::open(&path).await.unwrap();
        let descriptor = ResponseDescriptor::file(file, Some("application/octet-stream".to_string()));
        assert_eq!(descriptor.body.known_len(), None);

        let resp = descriptor.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/octet-stream");
        assert!(!resp.headers().contains_key(hyper::header::CONTENT_LENGTH));

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.len(), contents.len());
        assert_eq!(&body[..], &contents[..]);
    }
}
