//! Request tracing for calls to the data store.

use std::time::Instant;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next, Result};

/// Middleware that emits a `tracing` event for every outbound data store request.
///
/// Only the method and URL path are recorded. Request and response bodies
/// (which may hold secrets) are never logged.
pub struct TracingMiddleware;

#[async_trait::async_trait]
impl Middleware for TracingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let path = req.url().path().to_string();
        let started = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => tracing::debug!(
                %method,
                path = %path,
                status = response.status().as_u16(),
                elapsed_ms,
                "data store request completed"
            ),
            Err(e) => tracing::warn!(
                %method,
                path = %path,
                elapsed_ms,
                "data store request failed: {}",
                e
            ),
        }

        result
    }
}

/// Wrap a plain `reqwest` client with the data store middleware stack.
pub(crate) fn build_client(client: reqwest::Client) -> ClientWithMiddleware {
    ClientBuilder::new(client).with(TracingMiddleware).build()
}
