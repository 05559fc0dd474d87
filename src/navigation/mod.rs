//! Handoff of a completed session from the upload screen to the results screen
//!
//! The upload side serialises a [`SessionSnapshot`] into an opaque
//! [`NavigationPayload`]; the results side decodes it again. The two screens
//! never share a mutable session.

use crate::error::Result;
use crate::session::{AnalysisSession, Phase, ResumeResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable copy of a ready session as carried across screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    #[serde(default)]
    pub job_description: String,
    pub results: Vec<ResumeResult>,
}

impl SessionSnapshot {
    /// Only sessions in `Ready` have something to hand over.
    pub fn from_session(session: &AnalysisSession) -> Option<Self> {
        if session.phase() != Phase::Ready {
            return None;
        }
        Some(Self {
            session_id: session.session_id()?.to_string(),
            job_description: session.job_description().trim().to_string(),
            results: session.ranked_results().to_vec(),
        })
    }

    pub fn into_session(self) -> AnalysisSession {
        AnalysisSession::ready(self.session_id, self.job_description, self.results)
    }
}

/// Opaque state attached to a navigation event.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationPayload(Value);

impl NavigationPayload {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Start,
    Results(Option<NavigationPayload>),
}

/// What the results screen should do with the payload it was given.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsRoute {
    Render(SessionSnapshot),
    RedirectToStart,
}

pub fn handoff(snapshot: &SessionSnapshot) -> Result<NavigationPayload> {
    let data = serde_json::to_value(snapshot)?;
    Ok(NavigationPayload(serde_json::json!({ "data": data })))
}

/// Absent or malformed payloads mean "no session"; the caller goes back to start.
pub fn resolve(payload: Option<&NavigationPayload>) -> ResultsRoute {
    let Some(payload) = payload else {
        debug!("Results screen opened without a session payload");
        return ResultsRoute::RedirectToStart;
    };

    let Some(data) = payload.0.get("data") else {
        warn!("Navigation payload has no data section");
        return ResultsRoute::RedirectToStart;
    };
    if !data.get("results").map(Value::is_array).unwrap_or(false) {
        warn!("Navigation payload has no results");
        return ResultsRoute::RedirectToStart;
    }

    match serde_json::from_value::<SessionSnapshot>(data.clone()) {
        Ok(snapshot) if !snapshot.session_id.trim().is_empty() => ResultsRoute::Render(snapshot),
        Ok(_) => {
            warn!("Navigation payload has an empty session id");
            ResultsRoute::RedirectToStart
        }
        Err(e) => {
            warn!("Navigation payload could not be decoded: {}", e);
            ResultsRoute::RedirectToStart
        }
    }
}
