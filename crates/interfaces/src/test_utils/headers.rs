use crate::p2p::{
    error::{PeerRequestResult, RequestError},
    headers::{HeadersClient, HeadersRequest},
};
use basalt_primitives::{Header, PeerId, WithPeerId};
use parking_lot::Mutex;
use std::{collections::VecDeque, future::Future, pin::Pin, sync::Arc};

type TestHeadersFut = Pin<Box<dyn Future<Output = PeerRequestResult<Vec<Header>>> + Send + Sync>>;

/// A scripted response of the [`TestHeadersClient`].
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Answer with the given headers.
    Headers(Vec<Header>),
    /// Fail the request.
    Error(RequestError),
    /// Never resolve, letting the caller's timeout fire.
    Hang,
}

/// A test client that answers header requests from a script.
///
/// Each request pops the next scripted response; responses are attributed to
/// a fresh peer id per request so callers can exercise peer avoidance. An
/// exhausted script answers with [`RequestError::Timeout`].
#[derive(Debug, Default, Clone)]
pub struct TestHeadersClient {
    responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    requests: Arc<Mutex<Vec<(HeadersRequest, Option<PeerId>)>>>,
}

// === impl TestHeadersClient ===

impl TestHeadersClient {
    /// Queues a headers response.
    pub fn queue_headers(&self, headers: Vec<Header>) {
        self.responses.lock().push_back(ScriptedResponse::Headers(headers));
    }

    /// Queues the same headers response `times` times.
    pub fn queue_headers_repeated(&self, headers: Vec<Header>, times: usize) {
        let mut lock = self.responses.lock();
        for _ in 0..times {
            lock.push_back(ScriptedResponse::Headers(headers.clone()));
        }
    }

    /// Queues a request error.
    pub fn queue_error(&self, error: RequestError) {
        self.responses.lock().push_back(ScriptedResponse::Error(error));
    }

    /// Queues a response that never arrives.
    pub fn queue_hang(&self) {
        self.responses.lock().push_back(ScriptedResponse::Hang);
    }

    /// The number of requests the client has served so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// The recorded requests along with the peer each caller asked to avoid.
    pub fn requests(&self) -> Vec<(HeadersRequest, Option<PeerId>)> {
        self.requests.lock().clone()
    }

    /// The peer id attributed to the response of request `index`.
    pub fn peer_for_request(index: usize) -> PeerId {
        let mut raw = [0u8; 64];
        raw[0] = index as u8;
        PeerId::from(raw)
    }
}

impl HeadersClient for TestHeadersClient {
    type Output = TestHeadersFut;

    fn get_headers(&self, request: HeadersRequest, avoid: Option<PeerId>) -> Self::Output {
        let index = {
            let mut requests = self.requests.lock();
            requests.push((request, avoid));
            requests.len() - 1
        };
        let response = self.responses.lock().pop_front();

        Box::pin(async move {
            match response {
                Some(ScriptedResponse::Headers(headers)) => {
                    Ok(WithPeerId::new(Self::peer_for_request(index), headers))
                }
                Some(ScriptedResponse::Error(error)) => Err(error),
                Some(ScriptedResponse::Hang) => std::future::pending().await,
                None => Err(RequestError::Timeout),
            }
        })
    }
}
