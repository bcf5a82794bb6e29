//! Outbound HTTP seam for `register_document` dispatch.
//!
//! Kept as a trait rather than a bare hyper call site so coordinator tests
//! can swap in a scripted stub responder instead of a live server.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use ratatoskr_types::prelude::*;
use serde::Serialize;
use std::fmt::Debug;

/// Outcome of one `POST {server_url}/api/v1/documents` attempt, already
/// folded down to the cases the coordinator's HTTP status mapping cares
/// about. 409 and 2xx both surface as `Success` — the idempotency-collision
/// design note says to assume a prior attempt registered the document.
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
	Success,
	Unauthorized,
	/// Any other 4xx/5xx. `message` is the `message` field from the JSON body
	/// when the body parsed, `None` otherwise.
	OtherFailure { message: Option<String> },
	/// The request never reached a response (DNS, connect, TLS, timeout...).
	NetworkError { message: String },
}

#[derive(Serialize)]
struct RegisterDocumentBody<'a> {
	id: &'a str,
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	doc_type: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	expires_at: Option<Timestamp>,
}

#[async_trait]
pub trait RegistrationClient: Debug + Send + Sync {
	async fn register_document(&self, server_url: &str, token: &str, document_id: &str, payload: &OperationPayload) -> RegistrationOutcome;
}

/// Hyper-backed implementation of [`RegistrationClient`] for talking to a
/// real HTTPS registration endpoint.
#[derive(Debug)]
pub struct HyperRegistrationClient {
	client: Client<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>, Full<Bytes>>,
}

impl HyperRegistrationClient {
	pub fn new() -> SyncResult<Self> {
		let connector = HttpsConnectorBuilder::new()
			.with_native_roots()
			.map_err(|e| Error::Network(format!("TLS setup failed: {e}")))?
			.https_only()
			.enable_http1()
			.enable_http2()
			.build();
		let client = Client::builder(TokioExecutor::new()).build(connector);
		Ok(Self { client })
	}
}

#[async_trait]
impl RegistrationClient for HyperRegistrationClient {
	async fn register_document(&self, server_url: &str, token: &str, document_id: &str, payload: &OperationPayload) -> RegistrationOutcome {
		let body = RegisterDocumentBody { id: document_id, doc_type: payload.doc_type.as_deref(), expires_at: payload.expires_at };
		let body_bytes = match serde_json::to_vec(&body) {
			Ok(bytes) => bytes,
			Err(e) => return RegistrationOutcome::NetworkError { message: format!("payload serialization failed: {e}") },
		};

		let uri = format!("{}/api/v1/documents", server_url.trim_end_matches('/'));
		let request = match hyper::Request::builder()
			.method(hyper::Method::POST)
			.uri(&uri)
			.header("Content-Type", "application/json")
			.header("Authorization", format!("Bearer {token}"))
			.body(Full::new(Bytes::from(body_bytes)))
		{
			Ok(request) => request,
			Err(e) => return RegistrationOutcome::NetworkError { message: format!("request build failed: {e}") },
		};

		let response = match self.client.request(request).await {
			Ok(response) => response,
			Err(e) => return RegistrationOutcome::NetworkError { message: e.to_string() },
		};

		let status = response.status();
		if status.is_success() {
			return RegistrationOutcome::Success;
		}
		if status == hyper::StatusCode::CONFLICT {
			return RegistrationOutcome::Success;
		}
		if status == hyper::StatusCode::UNAUTHORIZED {
			return RegistrationOutcome::Unauthorized;
		}

		let body_bytes = response.into_body().collect().await.ok().map(|b| b.to_bytes());
		let message = body_bytes
			.as_ref()
			.and_then(|b| serde_json::from_slice::<serde_json::Value>(b).ok())
			.and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
		RegistrationOutcome::OtherFailure { message }
	}
}

// vim: ts=4
