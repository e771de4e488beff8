//! Request dispatch module
//!
//! Entry point for HTTP request processing: selects the handler registered for the
//! request method, awaits it, normalizes failures and emits the response.

use futures::future::{FutureExt, LocalBoxFuture};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::{Method, Request, Response};
use std::collections::HashMap;
use std::sync::Arc;

use super::methods;
use super::resolver::RootDir;
use crate::error::{BoxError, RequestError};
use crate::http::{ResponseBody, ResponseDescriptor};
use crate::logger;

/// Request body as seen by the handlers, independent of the transport
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// Outcome of a method handler
pub type HandlerResult = Result<ResponseDescriptor, RequestError>;

/// A method handler: an async function of the request and the served root
pub type Handler = fn(Request<RequestBody>, Arc<RootDir>) -> LocalBoxFuture<'static, HandlerResult>;

/// Immutable mapping from method name to handler, built once at startup
#[derive(Clone, Default)]
pub struct MethodTable {
    handlers: HashMap<&'static str, Handler>,
}

impl MethodTable {
    /// GET, PUT, DELETE and MKCOL
    pub fn standard() -> Self {
        Self::default()
            .with("GET", |req, root| async move { methods::get(req, &root).await }.boxed_local())
            .with("PUT", |req, root| async move { methods::put(req, &root).await }.boxed_local())
            .with("DELETE", |req, root| {
                async move { methods::delete(req, &root).await }.boxed_local()
            })
            .with("MKCOL", |req, root| {
                async move { methods::mkcol(req, &root).await }.boxed_local()
            })
    }

    /// Register `handler` for `method`, replacing any earlier entry
    #[must_use]
    pub fn with(mut self, method: &'static str, handler: Handler) -> Self {
        self.handlers.insert(method, handler);
        self
    }

    pub fn get(&self, method: &Method) -> Option<Handler> {
        self.handlers.get(method.as_str()).copied()
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Routes requests to method handlers and turns their results into responses
pub struct Dispatcher {
    methods: MethodTable,
    root: Arc<RootDir>,
    max_body_size: Option<u64>,
}

impl Dispatcher {
    pub fn new(methods: MethodTable, root: RootDir) -> Self {
        Self {
            methods,
            root: Arc::new(root),
            max_body_size: None,
        }
    }

    /// Reject request bodies larger than `limit` bytes with 413
    #[must_use]
    pub const fn with_max_body_size(mut self, limit: Option<u64>) -> Self {
        self.max_body_size = limit;
        self
    }

    pub fn root(&self) -> &RootDir {
        &self.root
    }

    pub const fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// Run the matching handler and collapse any failure into a descriptor
    pub async fn dispatch<B>(&self, req: Request<B>) -> ResponseDescriptor
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        match self.run(req).await {
            Ok(descriptor) => descriptor,
            Err(err) => {
                match err.status() {
                    Some(status) => logger::log_request_rejected(status, &err),
                    None => logger::log_error(&format!("Request failed: {err}")),
                }
                err.into_descriptor()
            }
        }
    }

    /// Dispatch and emit the final hyper response
    pub async fn handle<B>(&self, req: Request<B>) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        self.dispatch(req).await.into_response()
    }

    async fn run<B>(&self, req: Request<B>) -> Result<ResponseDescriptor, RequestError>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let Some(handler) = self.methods.get(req.method()) else {
            return Err(RequestError::MethodNotAllowed(req.method().to_string()));
        };

        self.check_body_size(&req)?;
        let req = req.map(|body| self.box_body(body));

        handler(req, Arc::clone(&self.root)).await
    }

    /// Validate Content-Length header against the configured limit
    fn check_body_size<B>(&self, req: &Request<B>) -> Result<(), RequestError> {
        let (Some(limit), Some(content_length)) =
            (self.max_body_size, req.headers().get(CONTENT_LENGTH))
        else {
            return Ok(());
        };

        match content_length.to_str().ok().and_then(|v| v.parse::<u64>().ok()) {
            Some(size) if size > limit => Err(RequestError::PayloadTooLarge),
            Some(_) => Ok(()),
            None => {
                logger::log_warning("Invalid Content-Length header, skipping size check");
                Ok(())
            }
        }
    }

    fn box_body<B>(&self, body: B) -> RequestBody
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        match self.max_body_size {
            Some(limit) => {
                Limited::new(body, usize::try_from(limit).unwrap_or(usize::MAX)).boxed_unsync()
            }
            None => body.map_err(Into::into).boxed_unsync(),
        }
    }
}
