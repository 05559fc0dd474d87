//! Results presenter: view model for the ranked resume list

use crate::error::{Result, ScreenerError};
use crate::session::ResumeResult;
use serde::Serialize;

pub const NO_SUMMARY: &str = "No summary available.";
pub const NO_STRENGTHS: &str = "No strengths identified.";
pub const NO_WEAKNESSES: &str = "No weaknesses identified.";

/// Round to the nearest whole percent, halves away from zero.
pub fn display_percentage(match_percentage: f64) -> i64 {
    if match_percentage.is_finite() {
        match_percentage.round() as i64
    } else {
        0
    }
}

/// Fill fraction of a progress bar scaled linearly over [0, 100].
pub fn progress_fraction(match_percentage: f64) -> f64 {
    if match_percentage.is_finite() {
        (match_percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// One rendered entry in the ranked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub position: usize,
    pub id: String,
    pub filename: String,
    pub percentage: i64,
    pub label: String,
    pub progress: f64,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<EntryDetails>,
}

/// Body of an expanded entry with fallback text already applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryDetails {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl EntryDetails {
    pub fn from_result(result: &ResumeResult) -> Self {
        let summary = result
            .summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(NO_SUMMARY)
            .to_string();

        Self {
            summary,
            strengths: or_fallback(&result.strengths, NO_STRENGTHS),
            weaknesses: or_fallback(&result.weaknesses, NO_WEAKNESSES),
        }
    }
}

fn or_fallback(items: &[String], fallback: &str) -> Vec<String> {
    if items.is_empty() {
        vec![fallback.to_string()]
    } else {
        items.to_vec()
    }
}

/// Expand/collapse flags for the list. Results themselves are never stored
/// or reordered here; they are passed in on every render.
#[derive(Debug, Clone, Default)]
pub struct ResultsPresenter {
    expanded: Vec<bool>,
}

impl ResultsPresenter {
    /// Every entry starts collapsed.
    pub fn new(entry_count: usize) -> Self {
        Self {
            expanded: vec![false; entry_count],
        }
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    /// Flip one entry and return its new state.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let flag = self.expanded.get_mut(index).ok_or_else(|| {
            ScreenerError::InvalidInput(format!("no result at position {}", index + 1))
        })?;
        *flag = !*flag;
        Ok(*flag)
    }

    pub fn expand_all(&mut self) {
        self.expanded.iter_mut().for_each(|flag| *flag = true);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.iter_mut().for_each(|flag| *flag = false);
    }

    pub fn render(&self, results: &[ResumeResult]) -> Vec<EntryView> {
        results
            .iter()
            .enumerate()
            .map(|(index, result)| {
                let expanded = self.is_expanded(index);
                let percentage = display_percentage(result.match_percentage);
                EntryView {
                    position: index + 1,
                    id: result.id.to_string(),
                    filename: result.filename.clone(),
                    percentage,
                    label: format!("{}%", percentage),
                    progress: progress_fraction(result.match_percentage),
                    expanded,
                    details: expanded.then(|| EntryDetails::from_result(result)),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ResultId;

    fn result(id: i64, filename: &str, pct: f64) -> ResumeResult {
        ResumeResult {
            id: ResultId::Number(id),
            filename: filename.to_string(),
            match_percentage: pct,
            summary: None,
            strengths: vec![],
            weaknesses: vec![],
        }
    }

    #[test]
    fn test_display_percentage_rounding() {
        assert_eq!(display_percentage(82.6), 83);
        assert_eq!(display_percentage(82.4), 82);
        assert_eq!(display_percentage(77.5), 78);
        assert_eq!(display_percentage(100.0), 100);
        assert_eq!(display_percentage(f64::NAN), 0);
    }

    #[test]
    fn test_progress_fraction_is_linear_and_clamped() {
        assert!((progress_fraction(50.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(progress_fraction(0.0), 0.0);
        assert_eq!(progress_fraction(130.0), 1.0);
        assert_eq!(progress_fraction(-4.0), 0.0);
    }

    #[test]
    fn test_entries_start_collapsed_in_given_order() {
        let results = vec![result(1, "a.pdf", 91.2), result(2, "b.docx", 77.5)];
        let presenter = ResultsPresenter::new(results.len());
        let entries = presenter.render(&results);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, "a.pdf");
        assert_eq!(entries[0].label, "91%");
        assert_eq!(entries[1].filename, "b.docx");
        assert_eq!(entries[1].label, "78%");
        assert!(entries.iter().all(|e| !e.expanded && e.details.is_none()));
    }

    #[test]
    fn test_toggle_flips_only_one_entry() {
        let results = vec![result(1, "a.pdf", 60.0), result(2, "b.pdf", 70.0), result(3, "c.pdf", 80.0)];
        let mut presenter = ResultsPresenter::new(results.len());

        assert!(presenter.toggle(1).unwrap());
        let entries = presenter.render(&results);
        assert!(!entries[0].expanded);
        assert!(entries[1].expanded);
        assert!(!entries[2].expanded);

        assert!(!presenter.toggle(1).unwrap());
        assert!(presenter.toggle(7).is_err());
    }

    #[test]
    fn test_expanded_entry_uses_fallback_text() {
        let results = vec![result(1, "a.pdf", 50.0)];
        let mut presenter = ResultsPresenter::new(1);
        presenter.toggle(0).unwrap();

        let details = presenter.render(&results)[0].details.clone().unwrap();
        assert_eq!(details.summary, NO_SUMMARY);
        assert_eq!(details.strengths, vec![NO_STRENGTHS]);
        assert_eq!(details.weaknesses, vec![NO_WEAKNESSES]);
    }

    #[test]
    fn test_blank_summary_falls_back() {
        let mut r = result(1, "a.pdf", 50.0);
        r.summary = Some("  ".to_string());
        r.strengths = vec!["Kubernetes".to_string(), "Go".to_string()];
        let details = EntryDetails::from_result(&r);
        assert_eq!(details.summary, NO_SUMMARY);
        assert_eq!(details.strengths, vec!["Kubernetes", "Go"]);
    }

    #[test]
    fn test_render_does_not_touch_results() {
        let results = vec![result(2, "low.pdf", 10.0), result(1, "high.pdf", 99.0)];
        let before = results.clone();
        let mut presenter = ResultsPresenter::new(results.len());
        presenter.expand_all();
        let entries = presenter.render(&results);

        assert_eq!(results, before);
        assert_eq!(entries[0].filename, "low.pdf");
        presenter.collapse_all();
        assert!(!presenter.is_expanded(0));
    }
}
