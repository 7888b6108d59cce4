//! In-memory bus binding for unit tests
//!
//! Records every object acquisition, close and call in order, and answers
//! calls from a queue of scripted replies (falling back to an empty reply
//! of the right shape).

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use problems_core::ports::bus::{
    BusFault, BusReply, BusRequest, IBusBinding, IBusInterface, IBusObject,
    ERROR_SERVICE_UNKNOWN,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    GetObject { name: String, path: String },
    Interface(String),
    /// Close of the object with this id (ids start at 1)
    Close(usize),
    Call(&'static str),
}

#[derive(Default)]
struct MockState {
    events: Vec<BusEvent>,
    requests: Vec<BusRequest>,
    replies: VecDeque<Result<BusReply, BusFault>>,
    get_object_fault: Option<BusFault>,
    service_down: bool,
    get_object_attempts: usize,
    interface_fault: Option<BusFault>,
    created: usize,
    closed: usize,
}

#[derive(Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<MockState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binding(&self) -> Arc<dyn IBusBinding> {
        Arc::new(self.clone())
    }

    /// Makes the next `get_object` fail
    pub fn fail_get_object(&self, fault: BusFault) {
        self.state.lock().unwrap().get_object_fault = Some(fault);
    }

    /// While down, every `get_object` fails with `ServiceUnknown`
    pub fn set_service_down(&self, down: bool) {
        self.state.lock().unwrap().service_down = down;
    }

    /// Makes the next `interface` fail
    pub fn fail_interface(&self, fault: BusFault) {
        self.state.lock().unwrap().interface_fault = Some(fault);
    }

    pub fn push_reply(&self, reply: Result<BusReply, BusFault>) {
        self.state.lock().unwrap().replies.push_back(reply);
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().unwrap().events.clear();
    }

    pub fn requests(&self) -> Vec<BusRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Every `get_object` call, successful or not
    pub fn get_object_attempts(&self) -> usize {
        self.state.lock().unwrap().get_object_attempts
    }

    /// Objects successfully handed out so far
    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().created
    }

    /// Objects handed out and not yet closed
    pub fn open_objects(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.created - state.closed
    }
}

#[async_trait::async_trait]
impl IBusBinding for MockBus {
    async fn get_object(&self, name: &str, path: &str) -> Result<Box<dyn IBusObject>, BusFault> {
        let mut state = self.state.lock().unwrap();
        state.events.push(BusEvent::GetObject {
            name: name.to_string(),
            path: path.to_string(),
        });
        state.get_object_attempts += 1;
        if let Some(fault) = state.get_object_fault.take() {
            return Err(fault);
        }
        if state.service_down {
            return Err(BusFault::named(ERROR_SERVICE_UNKNOWN, "service is down"));
        }
        state.created += 1;
        Ok(Box::new(MockObject {
            id: state.created,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockObject {
    id: usize,
    state: Arc<Mutex<MockState>>,
}

#[async_trait::async_trait]
impl IBusObject for MockObject {
    async fn interface(&self, name: &str) -> Result<Box<dyn IBusInterface>, BusFault> {
        let mut state = self.state.lock().unwrap();
        state.events.push(BusEvent::Interface(name.to_string()));
        if let Some(fault) = state.interface_fault.take() {
            return Err(fault);
        }
        Ok(Box::new(MockInterface {
            state: Arc::clone(&self.state),
        }))
    }

    async fn close(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.events.push(BusEvent::Close(self.id));
        state.closed += 1;
    }
}

struct MockInterface {
    state: Arc<Mutex<MockState>>,
}

#[async_trait::async_trait]
impl IBusInterface for MockInterface {
    async fn call(&self, request: &BusRequest) -> Result<BusReply, BusFault> {
        let mut state = self.state.lock().unwrap();
        state.events.push(BusEvent::Call(request.method()));
        state.requests.push(request.clone());
        state
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(default_reply(request)))
    }
}

fn default_reply(request: &BusRequest) -> BusReply {
    match request {
        BusRequest::GetInfo { .. } => BusReply::Info(HashMap::new()),
        BusRequest::NewProblem { .. } => BusReply::Handle("/var/tmp/abrt/mock".to_string()),
        BusRequest::GetProblems | BusRequest::GetAllProblems => BusReply::Handles(Vec::new()),
        _ => BusReply::Unit,
    }
}
