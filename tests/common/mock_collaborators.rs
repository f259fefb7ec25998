//! Scripted collaborators that record what they were asked
//!
//! Unlike the static stand-ins shipped with the crate, these keep a log of
//! every call so tests can assert on prompts, pairs and shared context.

use async_trait::async_trait;
use conceptmap::collaborator::TextModel;
use conceptmap::{CollaboratorError, Judgment, RelationshipJudge};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Text model that replays queued replies in order.
///
/// Once the queue is empty every call fails as unavailable.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn then_reply(self, reply: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
        self
    }

    pub fn then_fail(self, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(CollaboratorError::InvocationFailed(message)),
            None => Err(CollaboratorError::Unavailable("script exhausted".to_string())),
        }
    }
}

/// One recorded judge call.
#[derive(Debug, Clone)]
pub struct JudgeCall {
    pub a: String,
    pub b: String,
    pub context: String,
}

/// Judge that declares `parent` the parent of `child` and records every call.
pub struct RecordingJudge {
    parent: String,
    child: String,
    calls: Mutex<Vec<JudgeCall>>,
}

impl RecordingJudge {
    pub fn new(parent: &str, child: &str) -> Self {
        Self {
            parent: parent.to_lowercase(),
            child: child.to_lowercase(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<JudgeCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelationshipJudge for RecordingJudge {
    async fn judge(&self, a: &str, b: &str, context: &str) -> Result<Judgment, CollaboratorError> {
        self.calls.lock().unwrap().push(JudgeCall {
            a: a.to_string(),
            b: b.to_string(),
            context: context.to_string(),
        });
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        if a == self.parent && b == self.child {
            Ok(Judgment::ParentChild)
        } else if b == self.parent && a == self.child {
            Ok(Judgment::ChildParent)
        } else {
            Ok(Judgment::Unrelated)
        }
    }
}
