//! Request error taxonomy
//!
//! Every handler returns `Result<ResponseDescriptor, RequestError>`. Variants that
//! carry an explicit HTTP status are sent verbatim; the rest are unclassified and
//! become a 500 whose body is the error's text.

use http_body_util::LengthLimitError;
use hyper::StatusCode;
use std::io;
use thiserror::Error;

use crate::http::response::ResponseDescriptor;

/// Boxed error used for request body streams
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RequestError {
    /// Resolved path escapes the root directory
    #[error("Forbidden")]
    Forbidden,

    #[error("File not found")]
    NotFound,

    #[error("Method {0} not allowed.")]
    MethodNotAllowed(String),

    /// Upload exceeds `http.max_body_size`
    #[error("Payload Too Large")]
    PayloadTooLarge,

    #[error("URIError: malformed request path: {0}")]
    MalformedPath(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("request body error: {0}")]
    Body(BoxError),
}

impl RequestError {
    /// Classify an error raised by the request body stream.
    pub fn from_body_error(err: BoxError) -> Self {
        if err.is::<LengthLimitError>() {
            Self::PayloadTooLarge
        } else {
            Self::Body(err)
        }
    }

    /// Explicit status carried by this error, `None` for unclassified failures
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Forbidden => Some(StatusCode::FORBIDDEN),
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::MethodNotAllowed(_) => Some(StatusCode::METHOD_NOT_ALLOWED),
            Self::PayloadTooLarge => Some(StatusCode::PAYLOAD_TOO_LARGE),
            Self::MalformedPath(_) | Self::Io(_) | Self::Body(_) => None,
        }
    }

    /// Turn the failure into the descriptor the dispatcher will emit.
    pub fn into_descriptor(self) -> ResponseDescriptor {
        let status = self.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ResponseDescriptor::text(status, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_statuses_keep_their_body() {
        let resp = RequestError::Forbidden.into_descriptor();
        assert_eq!(resp.status, StatusCode::FORBIDDEN);
        assert_eq!(resp.body.as_text(), Some("Forbidden"));

        let resp = RequestError::MethodNotAllowed("PATCH".to_string()).into_descriptor();
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.body.as_text(), Some("Method PATCH not allowed."));
    }

    #[test]
    fn test_unclassified_errors_become_500() {
        let err = RequestError::from(io::Error::other("disk on fire"));
        assert!(err.status().is_none());

        let resp = err.into_descriptor();
        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.body.as_text(), Some("disk on fire"));
    }

    #[tokio::test]
    async fn test_length_limit_maps_to_413() {
        use http_body_util::{BodyExt, Full, Limited};
        use hyper::body::Bytes;

        let overflow = Limited::new(Full::new(Bytes::from_static(b"abcdef")), 2)
            .collect()
            .await
            .unwrap_err();
        let err = RequestError::from_body_error(overflow);
        assert!(matches!(err, RequestError::PayloadTooLarge));

        let other: BoxError = "connection reset".into();
        assert!(matches!(RequestError::from_body_error(other), RequestError::Body(_)));
    }
}
