//! Request routing and per-exchange relay logic.
//!
//! The two chat-completion routes are augmented and their responses
//! transformed; every other path is relayed verbatim.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::{Request, Response};
use axum::routing::any;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;

use crate::cache::ReasoningStore;
use crate::config::Provider;
use crate::proxy::augment::RequestAugmenter;
use crate::proxy::error::{ErrorResponse, ProxyError};
use crate::proxy::stream::{ReasoningStream, StreamRewriter};
use crate::proxy::transform::BlockingTransformer;
use crate::proxy::upstream::{client_ip, forward_headers, response_headers, UpstreamClient};
use crate::sse::is_event_stream;

pub const CHAT_COMPLETIONS_PATHS: [&str; 2] = ["/v1/chat/completions", "/chat/completions"];

/// Shared handler state. Cheap to clone; holds no per-request data.
#[derive(Clone)]
pub struct RouterEngine {
    upstream: Arc<UpstreamClient>,
    provider: Provider,
    cache: Arc<dyn ReasoningStore>,
    augmenter: Arc<RequestAugmenter>,
    blocking: Arc<BlockingTransformer>,
}

impl RouterEngine {
    pub fn new(upstream: UpstreamClient, provider: Provider, cache: Arc<dyn ReasoningStore>) -> Self {
        Self {
            upstream: Arc::new(upstream),
            augmenter: Arc::new(RequestAugmenter::new(provider.clone(), cache.clone())),
            blocking: Arc::new(BlockingTransformer::new(provider.clone(), cache.clone())),
            provider,
            cache,
        }
    }

    async fn relay_chat_completions(&self, req: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = req.into_parts();
        tracing::info!(
            method = %parts.method,
            path = %parts.uri.path(),
            "Handling chat completions request"
        );

        let body = read_body(body).await?;
        let mut request: Value =
            serde_json::from_slice(&body).map_err(ProxyError::MalformedRequest)?;
        let stats = self.augmenter.augment(&mut request);
        if stats.changed() {
            tracing::debug!(
                injected = stats.injected,
                effort_remapped = stats.effort_remapped,
                "Augmented request"
            );
        }
        let body = serde_json::to_vec(&request).map_err(ProxyError::Encode)?;

        let upstream = self.send(&parts, body.into()).await?;

        let content_type = upstream
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        tracing::debug!(
            status = upstream.status().as_u16(),
            content_type = %content_type,
            "Received response"
        );

        if is_event_stream(&content_type) {
            self.streaming_response(upstream)
        } else {
            self.blocking_response(upstream).await
        }
    }

    async fn relay_passthrough(&self, req: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = req.into_parts();
        tracing::debug!(method = %parts.method, path = %parts.uri.path(), "Passing request through");

        let body = read_body(body).await?;
        let upstream = self.send(&parts, body).await?;

        let builder = response_builder(&upstream);
        Ok(builder.body(Body::from_stream(upstream.bytes_stream()))?)
    }

    async fn send(&self, parts: &Parts, body: axum::body::Bytes) -> Result<reqwest::Response, ProxyError> {
        let url = self.upstream.target_url(&parts.uri)?;
        tracing::debug!(url = %url, "Proxying request to target");

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let headers = forward_headers(&parts.headers, client_ip(&parts.headers, peer));

        self.upstream
            .send(parts.method.clone(), url, headers, body)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to proxy request"))
    }

    async fn blocking_response(&self, upstream: reqwest::Response) -> Result<Response<Body>, ProxyError> {
        tracing::debug!("Handling blocking response");
        let builder = response_builder(&upstream);
        let target = self.upstream.target().to_string();

        let body = upstream
            .bytes()
            .await
            .map_err(|e| ProxyError::ConnectionError { target, source: e })?;
        let mut response: Value =
            serde_json::from_slice(&body).map_err(ProxyError::MalformedResponse)?;

        self.blocking.transform(&mut response);

        let body = serde_json::to_vec(&response).map_err(ProxyError::Encode)?;
        Ok(builder.body(Body::from(body))?)
    }

    fn streaming_response(&self, upstream: reqwest::Response) -> Result<Response<Body>, ProxyError> {
        let builder = response_builder(&upstream);

        tracing::debug!("Handling streaming response");
        let rewriter = StreamRewriter::new(self.provider.clone(), self.cache.clone());
        let stream = ReasoningStream::new(Box::pin(upstream.bytes_stream()), rewriter);
        Ok(builder.body(Body::from_stream(stream))?)
    }
}

async fn read_body(body: Body) -> Result<axum::body::Bytes, ProxyError> {
    body.collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| ProxyError::BodyRead(e.to_string()))
}

fn response_builder(upstream: &reqwest::Response) -> axum::http::response::Builder {
    let mut builder = Response::builder().status(upstream.status());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(response_headers(upstream.headers()));
    }
    builder
}

fn render(result: Result<Response<Body>, ProxyError>) -> Response<Body> {
    result.unwrap_or_else(|err| {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::error!(request_id = %request_id, error = %err, "Request failed");
        ErrorResponse::from_error(&err, &request_id)
    })
}

async fn chat_completions_handler(
    State(engine): State<RouterEngine>,
    req: Request<Body>,
) -> Response<Body> {
    render(engine.relay_chat_completions(req).await)
}

async fn passthrough_handler(State(engine): State<RouterEngine>, req: Request<Body>) -> Response<Body> {
    render(engine.relay_passthrough(req).await)
}

pub fn build_router(engine: RouterEngine) -> Router {
    let mut router = Router::new();
    for path in CHAT_COMPLETIONS_PATHS {
        router = router.route(path, any(chat_completions_handler));
    }
    router.fallback(passthrough_handler).with_state(engine)
}
