//! Engine bridge: the call contract to the external engine.

use parking_lot::Mutex;
use std::collections::VecDeque;
use viewstore_protocol::{ActionRequest, Batch, EngineError, EngineResult};

/// The call adapter to the external authoritative engine.
///
/// The engine owns true state and executes business logic for each
/// action; one call produces the batch of path updates for that action.
/// Calls run on the store's queue worker, never on the thread issuing
/// `emit`, and the queue guarantees exactly one call is in flight at a
/// time. Implementations perform no implicit retry: retry policy, if
/// any, belongs to the caller.
pub trait Engine: Send + Sync {
    /// Executes one action to completion.
    fn call(&self, request: &ActionRequest) -> EngineResult<Batch>;
}

/// A scripted engine for testing.
///
/// Responses are served in push order; calling with no scripted
/// response left is a transport error. Every received request is
/// recorded.
#[derive(Default)]
pub struct MockEngine {
    responses: Mutex<VecDeque<EngineResult<Batch>>>,
    calls: Mutex<Vec<ActionRequest>>,
}

impl MockEngine {
    /// Creates a mock engine with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next response.
    pub fn push_response(&self, response: EngineResult<Batch>) {
        self.responses.lock().push_back(response);
    }

    /// Scripts an empty-batch success response.
    pub fn push_empty(&self) {
        self.push_response(Ok(Batch::empty()));
    }

    /// Returns all requests received so far, in call order.
    pub fn calls(&self) -> Vec<ActionRequest> {
        self.calls.lock().clone()
    }

    /// Returns the names of all requests received so far, in call order.
    pub fn call_names(&self) -> Vec<String> {
        self.calls.lock().iter().map(|r| r.name.clone()).collect()
    }
}

impl Engine for MockEngine {
    fn call(&self, request: &ActionRequest) -> EngineResult<Batch> {
        self.calls.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::transport("no scripted response set")))
    }
}
