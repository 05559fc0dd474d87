//! Report structure for the ranked results screen

use crate::results::{EntryView, ResultsPresenter};
use crate::session::AnalysisSession;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a formatter needs to draw the results screen once.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsReport {
    pub generated_at: DateTime<Utc>,
    pub session_id: String,
    pub job_description: String,
    pub entries: Vec<EntryView>,
}

impl ResultsReport {
    pub fn build(session: &AnalysisSession, presenter: &ResultsPresenter) -> Self {
        Self {
            generated_at: Utc::now(),
            session_id: session.session_id().unwrap_or_default().to_string(),
            job_description: session.job_description().to_string(),
            entries: presenter.render(session.ranked_results()),
        }
    }

    /// First line of the job description, for report headers.
    pub fn job_title(&self) -> &str {
        self.job_description
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("Untitled position")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ResultId, ResumeResult};

    #[test]
    fn test_build_reflects_presenter_state() {
        let session = AnalysisSession::ready(
            "s1".to_string(),
            "\n  Senior backend engineer\nGo, Postgres".to_string(),
            vec![ResumeResult {
                id: ResultId::Number(1),
                filename: "a.pdf".to_string(),
                match_percentage: 82.6,
                summary: None,
                strengths: vec![],
                weaknesses: vec![],
            }],
        );
        let mut presenter = ResultsPresenter::new(1);
        presenter.toggle(0).unwrap();

        let report = ResultsReport::build(&session, &presenter);
        assert_eq!(report.session_id, "s1");
        assert_eq!(report.job_title(), "Senior backend engineer");
        assert_eq!(report.entries[0].label, "83%");
        assert!(report.entries[0].details.is_some());
    }
}
