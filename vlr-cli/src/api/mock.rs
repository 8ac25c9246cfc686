//! Scripted backend for tests

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::forms::Submission;

use super::backend::{Backend, Route};

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Get(Route, Vec<(String, String)>),
    PostForm(Route, Submission),
    PostJson(Route, Value),
}

/// Returns queued responses in order and records every call
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<Value, String>>>,
    calls: Mutex<Vec<Recorded>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: Recorded) -> Result<Value> {
        self.calls.lock().unwrap().push(call);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("no scripted response left")),
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn get(&self, route: &Route, params: &[(String, String)]) -> Result<Value> {
        self.next(Recorded::Get(route.clone(), params.to_vec()))
    }

    async fn post_form(&self, route: &Route, submission: &Submission) -> Result<Value> {
        self.next(Recorded::PostForm(route.clone(), submission.clone()))
    }

    async fn post_json(&self, route: &Route, body: &Value) -> Result<Value> {
        self.next(Recorded::PostJson(route.clone(), body.clone()))
    }
}
