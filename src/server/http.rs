//! HTTP surface.
//!
//! - `GET /`: greeting
//! - `OPTIONS *`: CORS preflight, 204
//! - `POST <endpoint>`: `{"sender": "0x..", "data": "0x.."}` in,
//!   `{"data": "0x.."}` out, signed for the endpoint's resolver
//!
//! Failures answer `{"message": ..}` without internal detail.

use super::config::GatewayConfig;
use crate::base::context::RequestResultExt;
use crate::base::GatewayError;
use crate::ccip::{CcipSigner, Envelope};
use crate::dispatch::Dispatcher;
use alloy_primitives::Address;
use bytes::Bytes;
use http::{header, HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1 << 20;

#[derive(Debug, Deserialize)]
struct CcipRequest {
    sender: String,
    data: String,
}

/// Request handling shared by every connection.
pub struct Gateway {
    dispatcher: Dispatcher,
    signer: CcipSigner,
    endpoints: BTreeMap<String, Address>,
    signature_ttl: Duration,
    greeting: String,
}

impl Gateway {
    pub fn new(dispatcher: Dispatcher, signer: CcipSigner, endpoints: BTreeMap<String, Address>) -> Self {
        let defaults = GatewayConfig::default();
        Self {
            dispatcher,
            signer,
            endpoints,
            signature_ttl: defaults.signature_ttl(),
            greeting: defaults.greeting,
        }
    }

    pub fn with_signature_ttl(mut self, ttl: Duration) -> Self {
        self.signature_ttl = ttl;
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn signer(&self) -> &CcipSigner {
        &self.signer
    }

    pub fn endpoints(&self) -> &BTreeMap<String, Address> {
        &self.endpoints
    }

    /// Dispatch `request` and sign the answer for `resolver`.
    pub async fn answer(&self, resolver: Address, request: &[u8]) -> Result<Vec<u8>, GatewayError> {
        let (result, history) = self.dispatcher.handle(request).await;
        tracing::info!(resolver = %resolver, "{}", history);
        let result = result?;
        let envelope = Envelope::seal(&self.signer, resolver, request, result, self.signature_ttl)?;
        Ok(envelope.encode())
    }

    /// Answer one HTTP request. Never fails; errors become JSON responses.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        match self.route(req).await {
            Ok(resp) => resp,
            Err(e) => {
                let status = e.status();
                if status.is_server_error() {
                    tracing::warn!(error = %e, "request failed");
                } else {
                    tracing::debug!(error = %e, "request rejected");
                }
                json_response(status, &json!({ "message": e.client_message() }))
            }
        }
    }

    async fn route<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, GatewayError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        match method {
            Method::OPTIONS => Ok(preflight()),
            Method::GET if path == "/" => Ok(text_response(StatusCode::OK, self.greeting.clone())),
            Method::GET => Err(GatewayError::UnknownEndpoint(path)),
            Method::POST => {
                let resolver = *self
                    .endpoints
                    .get(&path)
                    .ok_or_else(|| GatewayError::UnknownEndpoint(path.clone()))?;
                let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
                    .collect()
                    .await
                    .request_context("body")?
                    .to_bytes();
                let request: CcipRequest = serde_json::from_slice(&body).request_context("json")?;
                let sender = Address::from_str(request.sender.trim()).request_context("sender")?;
                let data = parse_hex(&request.data)?;
                tracing::debug!(path = %path, sender = %sender, bytes = data.len(), "ccip request");

                let encoded = self.answer(resolver, &data).await?;
                Ok(json_response(
                    StatusCode::OK,
                    &json!({ "data": format!("0x{}", hex::encode(encoded)) }),
                ))
            }
            other => Err(GatewayError::UnsupportedHttpMethod(other.to_string())),
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("signer", &self.signer)
            .field("endpoints", &self.endpoints)
            .field("signature_ttl", &self.signature_ttl)
            .finish()
    }
}

fn parse_hex(data: &str) -> Result<Vec<u8>, GatewayError> {
    let data = data.trim();
    let hex = data
        .strip_prefix("0x")
        .ok_or_else(|| GatewayError::MalformedRequest("data: missing 0x prefix".to_string()))?;
    hex::decode(hex).request_context("data")
}

fn with_cors(mut resp: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    resp.headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    resp
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(body.to_string())));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(resp)
}

fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    with_cors(resp)
}

fn preflight() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = StatusCode::NO_CONTENT;
    let headers = resp.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, OPTIONS"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    with_cors(resp)
}

/// Accept connections until `shutdown` resolves.
pub async fn serve<F>(gateway: Arc<Gateway>, listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let (stream, peer) = tokio::select! {
            result = listener.accept() => result?,
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                return Ok(());
            }
        };

        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let gateway = Arc::clone(&gateway);
                async move { Ok::<_, std::convert::Infallible>(gateway.handle(req).await) }
            });
            if let Err(e) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                tracing::debug!(peer = %peer, error = %e, "connection closed with error");
            }
        });
    }
}
