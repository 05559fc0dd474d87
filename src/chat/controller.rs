//! Chat controller: one question at a time against an analysed batch

use crate::api::AnalysisApi;
use crate::error::ApiError;
use crate::session::{AnalysisSession, ChatTurn, Phase};
use log::{debug, info, warn};
use std::sync::Arc;

pub const CHAT_READY_MESSAGE: &str = "You can now ask questions about all uploaded resumes.";
pub const CHAT_FALLBACK_MESSAGE: &str = "Sorry, I ran into an error. Please try again.";

/// A question that has been recorded and is waiting on the Chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAsk {
    request_id: u64,
    session_id: String,
    question: String,
}

impl PendingAsk {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginAsk {
    /// Blank question or no session id. Nothing recorded.
    Ignored,
    /// Another question is still in flight. Nothing recorded.
    Busy,
    Started(PendingAsk),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    Ignored,
    Busy,
    Answered,
    /// The request failed and the apology turn was recorded instead.
    Fallback,
    /// The response did not belong to the in-flight request and was dropped.
    Stale,
}

pub struct ChatController {
    session: AnalysisSession,
    api: Arc<dyn AnalysisApi>,
    in_flight: Option<u64>,
    next_request_id: u64,
}

impl ChatController {
    /// Takes ownership of the results-side session. A ready session with an id
    /// gets the availability greeting as its first turn.
    pub fn new(mut session: AnalysisSession, api: Arc<dyn AnalysisApi>) -> Self {
        if session.phase() == Phase::Ready && session.session_id().is_some() {
            if let Err(e) = session.append_turn(ChatTurn::bot(CHAT_READY_MESSAGE)) {
                warn!("Could not seed chat transcript: {}", e);
            }
        }
        Self {
            session,
            api,
            in_flight: None,
            next_request_id: 1,
        }
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        self.session.chat_transcript()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Record the user's turn and claim the single in-flight slot.
    pub fn begin_ask(&mut self, question: &str) -> BeginAsk {
        let Some(session_id) = self.session.session_id().map(str::to_string) else {
            return BeginAsk::Ignored;
        };
        if question.trim().is_empty() {
            return BeginAsk::Ignored;
        }
        if let Some(request_id) = self.in_flight {
            debug!("Chat busy with request {}; dropping new question", request_id);
            return BeginAsk::Busy;
        }

        if let Err(e) = self.session.append_turn(ChatTurn::user(question)) {
            warn!("Chat unavailable: {}", e);
            return BeginAsk::Ignored;
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(request_id);

        BeginAsk::Started(PendingAsk {
            request_id,
            session_id,
            question: question.to_string(),
        })
    }

    /// Apply the Chat endpoint's reply for `request_id`. Replies for any id other
    /// than the one in flight are discarded.
    pub fn complete_ask(&mut self, request_id: u64, reply: Result<String, ApiError>) -> AskOutcome {
        if self.in_flight != Some(request_id) {
            warn!(
                "Discarding stale chat response {} (in flight: {:?})",
                request_id, self.in_flight
            );
            return AskOutcome::Stale;
        }
        self.in_flight = None;

        let (turn, outcome) = match reply {
            Ok(answer) => (ChatTurn::bot(answer), AskOutcome::Answered),
            Err(e) => {
                warn!("Chat API error: {}", e);
                (ChatTurn::bot(CHAT_FALLBACK_MESSAGE), AskOutcome::Fallback)
            }
        };

        if let Err(e) = self.session.append_turn(turn) {
            warn!("Could not record chat reply: {}", e);
        }
        outcome
    }

    /// Ask one question and wait for the reply. Never retries.
    pub async fn ask(&mut self, question: &str) -> AskOutcome {
        let pending = match self.begin_ask(question) {
            BeginAsk::Started(pending) => pending,
            BeginAsk::Ignored => return AskOutcome::Ignored,
            BeginAsk::Busy => return AskOutcome::Busy,
        };

        info!("Asking question {} for session {}", pending.request_id, pending.session_id);
        let reply = self.api.chat(&pending.session_id, &pending.question).await;
        self.complete_ask(pending.request_id, reply)
    }
}
