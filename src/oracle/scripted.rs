use super::{ChatMessage, Oracle, ResponseFormat};
use crate::error::{Error, Result};
use std::cell::RefCell;

/// Deterministic oracle driven by substring rules.
///
/// Each rule pairs a needle with a canned response. A request is answered by the first
/// rule whose needle occurs in the request's last message; requests that match no rule
/// fail. Every request is recorded so callers can inspect what was asked.
///
/// Useful for offline runs and tests; it never touches the network.
#[derive(Default)]
pub struct ScriptedOracle {
    rules: Vec<Rule>,
    requests: RefCell<Vec<Vec<ChatMessage>>>,
}

struct Rule {
    needle: String,
    response: Option<String>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers requests mentioning `needle` with `response`.
    pub fn respond_when(mut self, needle: &str, response: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            response: Some(response.to_string()),
        });
        self
    }

    /// Fails requests mentioning `needle`.
    pub fn fail_when(mut self, needle: &str) -> Self {
        self.rules.push(Rule { needle: needle.to_string(), response: None });
        self
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.borrow().clone()
    }
}

impl Oracle for ScriptedOracle {
    fn complete(&self, messages: &[ChatMessage], _format: ResponseFormat) -> Result<String> {
        self.requests.borrow_mut().push(messages.to_vec());

        let haystack = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        let rule = self
            .rules
            .iter()
            .find(|rule| haystack.contains(&rule.needle))
            .ok_or_else(|| Error::OracleError("no scripted response matches request".to_string()))?;

        rule.response
            .clone()
            .ok_or_else(|| Error::OracleError(format!("scripted failure for '{}'", rule.needle)))
    }
}
