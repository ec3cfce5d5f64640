//! Forwarding of requests to the fixed upstream.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the upstream base URL
//! - Rewrite `Host` to the upstream authority
//! - Strip hop-by-hop headers in both directions
//! - Stream the upstream response back without buffering
//! - Map connect/timeout failures to gateway errors
//!
//! # Design Decisions
//! - One attempt per request; no retries
//! - Pooled `hyper_util` client shared across requests
//! - Dropping the returned future (caller went away) drops the upstream request

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header::{CONNECTION, HOST},
        uri::{Authority, PathAndQuery, Scheme},
        HeaderMap, HeaderName, HeaderValue, Request, Response, Uri, Version,
    },
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;

/// Headers that describe a single transport hop and are never relayed.
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Sends a request somewhere and hands back the response.
///
/// The HTTP handler only knows this trait, so the transport can be replaced
/// (e.g. by an in-memory stub in tests) without touching the CORS layer.
pub trait Forwarder: Send + Sync + 'static {
    fn forward(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>, ProxyError>> + Send;
}

/// The parsed upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
    /// Base path without trailing slash; empty for a root URL.
    base_path: String,
}

impl UpstreamTarget {
    pub fn parse(url: &str) -> Result<Self, ProxyError> {
        let invalid = |reason: String| ProxyError::InvalidUpstreamUri(format!("{url}: {reason}"));

        let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        let scheme = Scheme::try_from(parsed.scheme()).map_err(|e| invalid(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;

        // `Url::port` is None when the port is the scheme default.
        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let host_header = HeaderValue::from_str(&authority).map_err(|e| invalid(e.to_string()))?;
        let authority = Authority::try_from(authority.as_str()).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            scheme,
            authority,
            host_header,
            base_path: parsed.path().trim_end_matches('/').to_string(),
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Value sent as `Host` on every forwarded request.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Build `<base URL><path+query>` for an inbound request target.
    ///
    /// Only the path and query of the inbound URI are used; an absolute-form
    /// target naming another host still lands on this upstream.
    pub fn uri_for(&self, path_and_query: Option<&PathAndQuery>) -> Result<Uri, ProxyError> {
        let pq = path_and_query.map(PathAndQuery::as_str).unwrap_or("/");
        let joined = if pq.starts_with('/') {
            format!("{}{}", self.base_path, pq)
        } else {
            format!("{}/{}", self.base_path, pq)
        };

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(joined)
            .build()
            .map_err(|e| ProxyError::InvalidUpstreamUri(e.to_string()))
    }
}

impl std::fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)
    }
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// Production [`Forwarder`] backed by a pooled hyper client.
#[derive(Clone)]
pub struct UpstreamForwarder {
    client: Client<HttpConnector, Body>,
    target: Arc<UpstreamTarget>,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl UpstreamForwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProxyError> {
        let target = UpstreamTarget::parse(&config.url)?;
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build(connector);

        Ok(Self {
            client,
            target: Arc::new(target),
            connect_timeout,
            response_timeout: Duration::from_secs(config.response_timeout_secs),
        })
    }
}

/// Map a client failure onto a gateway error.
///
/// Any `io::ErrorKind::TimedOut` in the source chain (the connector's connect
/// timeout) becomes [`ProxyError::UpstreamTimeout`]; everything else is
/// [`ProxyError::UpstreamUnreachable`] carrying the whole chain as text.
pub fn classify_error(err: &(dyn StdError + 'static), connect_timeout: Duration) -> ProxyError {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    let mut chain = Vec::new();
    let mut timed_out = false;

    while let Some(cause) = current {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            timed_out |= io.kind() == std::io::ErrorKind::TimedOut;
        }
        chain.push(cause.to_string());
        current = cause.source();
    }

    if timed_out {
        ProxyError::UpstreamTimeout(connect_timeout)
    } else {
        ProxyError::UpstreamUnreachable(chain.join(": "))
    }
}

impl Forwarder for UpstreamForwarder {
    async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let (mut parts, body) = request.into_parts();

        parts.uri = self.target.uri_for(parts.uri.path_and_query())?;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        parts.headers.insert(HOST, self.target.host_header().clone());

        tracing::trace!(uri = %parts.uri, "Sending upstream request");

        let outbound = Request::from_parts(parts, body);
        let response = match tokio::time::timeout(self.response_timeout, self.client.request(outbound)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(classify_error(&e, self.connect_timeout)),
            Err(_) => return Err(ProxyError::UpstreamTimeout(self.response_timeout)),
        };

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
