//! Optional hooks run around every call.
//!
//! The bearer-token hook is built into the client; interceptors cover the
//! remaining cross-cutting concerns such as logging or auditing.

use crate::error::RequestError;
use crate::transport::{TransportRequest, TransportResponse};
use tracing::{debug, warn};

/// Hooks invoked in registration order.
pub trait Interceptor: Send + Sync {
    /// Runs after the authorization header is applied, before sending.
    fn on_request(&self, _req: &mut TransportRequest) {}

    /// Runs after a 2xx response has been decoded.
    fn on_response(&self, _req: &TransportRequest, _resp: &TransportResponse) {}

    /// Runs once the error for a failed call has been built.
    fn on_error(&self, _req: &TransportRequest, _err: &RequestError) {}
}

/// Logs every call through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

impl Interceptor for TracingInterceptor {
    fn on_request(&self, req: &mut TransportRequest) {
        debug!(method = %req.method, url = %req.url, "sending request");
    }

    fn on_response(&self, req: &TransportRequest, resp: &TransportResponse) {
        debug!(
            method = %req.method,
            url = %req.url,
            status = resp.status,
            "request succeeded"
        );
    }

    fn on_error(&self, req: &TransportRequest, err: &RequestError) {
        warn!(
            method = %req.method,
            url = %req.url,
            status = err.status(),
            message = err.message(),
            "request failed"
        );
    }
}
