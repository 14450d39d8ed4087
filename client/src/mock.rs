//! In-memory transport for exercising the client without a server.

use std::convert::Infallible;
use std::future::{Ready, ready};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tonic::body::Body;
use tower::Service;

use crate::error::{ClientError, Result};
use crate::options::DialOption;
use crate::transport::{Connection, Transport};

/// gRPC status code `UNIMPLEMENTED`.
const GRPC_UNIMPLEMENTED: &str = "12";

#[derive(Debug, Default)]
pub(crate) struct MockState {
    /// Request paths in the order the connection received them.
    pub calls: Mutex<Vec<String>>,
    pub closes: AtomicUsize,
}

impl MockState {
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    pub dials: Mutex<Vec<(String, Vec<DialOption>)>>,
    pub state: Arc<MockState>,
    fail_with: Option<String>,
}

impl MockTransport {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn dial_count(&self) -> usize {
        self.dials.lock().len()
    }

    pub fn last_options(&self) -> Vec<DialOption> {
        self.dials
            .lock()
            .last()
            .map(|(_, options)| options.clone())
            .unwrap_or_default()
    }
}

impl Transport for MockTransport {
    type Connection = MockConnection;

    fn dial(&self, target: &str, options: &[DialOption]) -> Result<MockConnection> {
        self.dials.lock().push((target.to_string(), options.to_vec()));
        if let Some(message) = &self.fail_with {
            return Err(ClientError::Dial(message.clone().into()));
        }
        Ok(MockConnection {
            state: self.state.clone(),
        })
    }
}

/// Answers every call with `UNIMPLEMENTED` and records its path.
#[derive(Debug, Clone)]
pub(crate) struct MockConnection {
    state: Arc<MockState>,
}

impl Service<http::Request<Body>> for MockConnection {
    type Response = http::Response<Body>;
    type Error = Infallible;
    type Future = Ready<std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Body>) -> Self::Future {
        self.state.calls.lock().push(request.uri().path().to_string());

        let response = http::Response::builder()
            .header("content-type", "application/grpc")
            .header("grpc-status", GRPC_UNIMPLEMENTED)
            .body(Body::empty())
            .unwrap();
        ready(Ok(response))
    }
}

impl Connection for MockConnection {
    fn close(self) -> Result<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
