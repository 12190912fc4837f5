//! In-memory transport that records requests and replays scripted outcomes.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;

use super::adapter::{
    RestBytes, RestError, RestErrorKind, RestFuture, RestRequest, RestResponse, RestResult,
    RestTransport,
};

#[derive(Clone, Debug, Default)]
pub enum MockBehavior {
    #[default]
    Pass,
    ConnectError(String),
    SendError(String),
    ReceiveError(String),
    TimeoutError(String),
    InternalError(String),
    /// Surfaces immediately as a timeout error, without waiting.
    Drop,
}

impl MockBehavior {
    pub fn pass() -> Self {
        Self::Pass
    }

    pub fn connect_error(reason: impl Into<String>) -> Self {
        Self::ConnectError(reason.into())
    }

    pub fn send_error(reason: impl Into<String>) -> Self {
        Self::SendError(reason.into())
    }

    pub fn receive_error(reason: impl Into<String>) -> Self {
        Self::ReceiveError(reason.into())
    }

    pub fn timeout_error(reason: impl Into<String>) -> Self {
        Self::TimeoutError(reason.into())
    }

    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self::InternalError(reason.into())
    }

    pub fn drop_response() -> Self {
        Self::Drop
    }

    fn into_error(self) -> Option<RestError> {
        let (kind, reason) = match self {
            Self::Pass => return None,
            Self::Drop => (
                RestErrorKind::Timeout,
                "mock transport dropped response".to_string(),
            ),
            Self::ConnectError(reason) => (RestErrorKind::Connect, reason),
            Self::SendError(reason) => (RestErrorKind::Send, reason),
            Self::ReceiveError(reason) => (RestErrorKind::Receive, reason),
            Self::TimeoutError(reason) => (RestErrorKind::Timeout, reason),
            Self::InternalError(reason) => (RestErrorKind::Internal, reason),
        };
        Some(RestError::new(kind, None, reason))
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockBehaviorPlan {
    request: VecDeque<MockBehavior>,
}

impl MockBehaviorPlan {
    pub fn push(&mut self, behavior: MockBehavior) -> &mut Self {
        self.request.push_back(behavior);
        self
    }

    fn pop(&mut self) -> MockBehavior {
        self.request.pop_front().unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, RestBytes)>,
    pub body: RestBytes,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<RestBytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<RestBytes>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body.into())
    }

    pub fn json<T: Serialize>(status: u16, payload: &T) -> RestResult<Self> {
        let body = sonic_rs::to_vec(payload)?;
        Ok(Self::new(status, body))
    }
}

#[derive(Clone, Debug)]
pub struct MockRestStateSnapshot {
    pub request_count: usize,
    pub last_url: Option<String>,
    pub last_status: Option<u16>,
    pub last_error: Option<String>,
    pub behavior_remaining: usize,
    pub response_queue_len: usize,
    pub elapsed_total: Duration,
}

#[derive(Debug, Default)]
struct MockRestAdapterState {
    request_count: usize,
    last_url: Option<String>,
    last_status: Option<u16>,
    last_error: Option<String>,
    behavior_plan: MockBehaviorPlan,
    default_response_queue: VecDeque<MockResponse>,
    route_response_queues: HashMap<(Method, String), VecDeque<MockResponse>>,
    outbound_log: Vec<RestRequest>,
    elapsed_total: Duration,
}

impl MockRestAdapterState {
    fn snapshot(&self) -> MockRestStateSnapshot {
        MockRestStateSnapshot {
            request_count: self.request_count,
            last_url: self.last_url.clone(),
            last_status: self.last_status,
            last_error: self.last_error.clone(),
            behavior_remaining: self.behavior_plan.request.len(),
            response_queue_len: self.default_response_queue.len()
                + self
                    .route_response_queues
                    .values()
                    .map(VecDeque::len)
                    .sum::<usize>(),
            elapsed_total: self.elapsed_total,
        }
    }

    fn next_response(&mut self, request: &RestRequest) -> Option<MockResponse> {
        let route_key = (request.method.clone(), request.url.clone());
        if let Some(response) = self
            .route_response_queues
            .get_mut(&route_key)
            .and_then(VecDeque::pop_front)
        {
            return Some(response);
        }
        self.default_response_queue.pop_front()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockRestAdapter {
    state: Arc<Mutex<MockRestAdapterState>>,
}

impl MockRestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior_plan(behavior_plan: MockBehaviorPlan) -> Self {
        let state = MockRestAdapterState {
            behavior_plan,
            ..MockRestAdapterState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Shorthand for a plan with a single behavior.
    pub fn failing_with(behavior: MockBehavior) -> Self {
        let mut plan = MockBehaviorPlan::default();
        plan.push(behavior);
        Self::with_behavior_plan(plan)
    }

    fn lock(&self, context: &str) -> MutexGuard<'_, MockRestAdapterState> {
        self.state
            .lock()
            .unwrap_or_else(|_| panic!("mock-restapi mutex poisoned while {context}"))
    }

    pub fn snapshot(&self) -> MockRestStateSnapshot {
        self.lock("taking snapshot").snapshot()
    }

    pub fn queue_response(&self, response: MockResponse) {
        self.lock("queueing response")
            .default_response_queue
            .push_back(response);
    }

    pub fn queue_response_for(
        &self,
        method: Method,
        url: impl Into<String>,
        response: MockResponse,
    ) {
        self.lock("queueing response by route")
            .route_response_queues
            .entry((method, url.into()))
            .or_default()
            .push_back(response);
    }

    pub fn queue_post_response(&self, url: impl Into<String>, response: MockResponse) {
        self.queue_response_for(Method::POST, url, response);
    }

    pub fn queue_get_response(&self, url: impl Into<String>, response: MockResponse) {
        self.queue_response_for(Method::GET, url, response);
    }

    /// Every request seen so far, in arrival order.
    pub fn outbound_requests(&self) -> Vec<RestRequest> {
        self.lock("reading outbound log").outbound_log.clone()
    }

    pub fn outbound_count(&self) -> usize {
        self.lock("reading outbound count").outbound_log.len()
    }
}

impl RestTransport for MockRestAdapter {
    fn execute(&self, request: RestRequest) -> RestFuture<RestResult<RestResponse>> {
        let adapter = self.clone();
        Box::pin(async move {
            let start = Instant::now();
            let mut state = adapter.lock("executing request");
            state.request_count += 1;
            state.last_url = Some(request.url.clone());
            state.last_error = None;
            state.outbound_log.push(request.clone());

            if let Some(error) = state.behavior_plan.pop().into_error() {
                state.last_error = Some(error.message.clone());
                state.last_status = None;
                return Err(error);
            }

            let response = match state.next_response(&request) {
                Some(mocked) => RestResponse {
                    status: mocked.status,
                    headers: mocked.headers,
                    body: mocked.body,
                    elapsed: start.elapsed(),
                },
                None => RestResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: Bytes::new(),
                    elapsed: start.elapsed(),
                },
            };
            state.last_status = Some(response.status);
            state.elapsed_total += response.elapsed;
            Ok(response)
        })
    }
}
