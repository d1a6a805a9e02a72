//! Scripted transport for client tests.

use super::error::{ErrorKind, Result};
use super::{Response, Transport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request as the client made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Request {
    pub method: &'static str,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl Request {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// Replays canned responses in order and records every request.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, method: &'static str, url: &str, params: &[(&str, String)]) -> Result<Response> {
        self.requests.lock().unwrap().push(Request {
            method,
            url: url.to_string(),
            params: params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => Ok(response),
            None => exn::bail!(ErrorKind::Transport),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        self.next("GET", url, query)
    }

    async fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<Response> {
        self.next("POST", url, form)
    }
}

pub(crate) fn ok(url: &str, body: impl Into<String>) -> Response {
    Response {
        url: url.to_string(),
        status: 200,
        headers: Vec::new(),
        body: body.into(),
    }
}
