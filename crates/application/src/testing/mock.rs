//! In-memory `HttpClient` for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use assay_domain::request::{Headers, RequestSpec};
use assay_domain::response::ResponseSpec;

use crate::ports::{HttpClient, HttpClientError};

type Reply = (Result<ResponseSpec, HttpClientError>, Duration);
type Responder = dyn Fn(&RequestSpec) -> Reply + Send + Sync;

/// Records every request and answers with a canned reply, optionally after
/// a delay.
#[derive(Clone)]
pub struct MockHttpClient {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<RequestSpec>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl MockHttpClient {
    pub fn with_responder(
        responder: impl Fn(&RequestSpec) -> Reply + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            requests: Arc::default(),
            in_flight: Arc::default(),
            peak: Arc::default(),
        }
    }

    pub fn ok(status: u16, body: &'static str) -> Self {
        Self::with_responder(move |_| {
            (
                Ok(ResponseSpec::new(
                    status,
                    Headers::new().with("Content-Type", "application/json"),
                    body.as_bytes(),
                    Duration::from_millis(50),
                )),
                Duration::ZERO,
            )
        })
    }

    pub fn failing(error: HttpClientError) -> Self {
        Self::with_responder(move |_| (Err(error.clone()), Duration::ZERO))
    }

    #[allow(clippy::unwrap_used)]
    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest number of requests that were in flight at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    #[allow(clippy::unwrap_used)]
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        let (reply, delay) = (self.responder)(request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}
