use std::net::IpAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::{ACCEPT_ENCODING, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use reqwest::{Client, Url};

use crate::config::UpstreamConfig;
use crate::proxy::error::ProxyError;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// HTTP client bound to one backend base URL.
pub struct UpstreamClient {
    client: Client,
    target: String,
}

impl UpstreamClient {
    /// Build a client for `config.target`.
    ///
    /// Only a connect timeout is applied: event streams stay open for as
    /// long as the backend keeps producing.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds.into()))
            .build()?;

        Ok(Self {
            client,
            target: config.target.clone(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Backend URL for an inbound request: target base path joined with
    /// the request path, query string preserved.
    pub fn target_url(&self, uri: &Uri) -> Result<Url, ProxyError> {
        let mut url = Url::parse(&self.target).map_err(|e| ProxyError::InvalidTarget {
            target: self.target.clone(),
            reason: e.to_string(),
        })?;

        let path = format!("{}{}", url.path().trim_end_matches('/'), uri.path());
        url.set_path(&path);
        url.set_query(uri.query());
        Ok(url)
    }

    /// Send a request to the backend and return its response headers; the
    /// body is left for the caller to consume.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<reqwest::Response, ProxyError> {
        self.client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| ProxyError::ConnectionError {
                target: self.target.clone(),
                source: e,
            })
    }
}

/// Headers to send upstream.
///
/// Drops `Host`, `Accept-Encoding` (bodies must arrive uncompressed to be
/// rewritten) and the framing headers of the original body. Adds
/// `X-Forwarded-For` when the client did not send one.
pub fn forward_headers(inbound: &HeaderMap, client_ip: Option<IpAddr>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound {
        if name == HOST || name == ACCEPT_ENCODING || name == CONTENT_LENGTH || name == TRANSFER_ENCODING
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if !headers.contains_key(&X_FORWARDED_FOR) {
        if let Some(value) = client_ip.and_then(|ip| HeaderValue::from_str(&ip.to_string()).ok())
        {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }
    headers
}

/// Headers to return to the client.
///
/// `Content-Length` is dropped because the body may be rewritten;
/// `Transfer-Encoding` is re-framed by the server.
pub fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if name == CONTENT_LENGTH || name == TRANSFER_ENCODING {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Client address for `X-Forwarded-For`: `X-Real-IP` if present and valid,
/// otherwise the peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get(&X_REAL_IP)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .or(peer)
}
