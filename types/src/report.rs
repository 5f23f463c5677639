//! Report records produced by analyzer modules.
//!
//! The engine defines the shape of these records; rendering them is left to
//! the consumer (the CLI prints them as text or JSON).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Grading
// ─────────────────────────────────────────────────────────────────────────────

/// Qualitative grade attached to guide entries and checklist items.
///
/// Variants are ordered worst to best so `min` yields the lowest grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitativePerformance {
    Fail,
    Ok,
    Good,
    Perfect,
}

impl QualitativePerformance {
    /// Lowest grade in `perfs`, or `Perfect` when there is nothing to grade.
    pub fn lowest<I>(perfs: I) -> Self
    where
        I: IntoIterator<Item = QualitativePerformance>,
    {
        perfs.into_iter().min().unwrap_or(Self::Perfect)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Ok => "ok",
            Self::Good => "good",
            Self::Perfect => "perfect",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statistics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub value: f64,
}

/// A labelled number with an optional breakdown list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticRecord {
    pub label: String,
    pub value: f64,
    /// `value` is a 0..=1 fraction meant to be shown as a percentage
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ratio: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<BreakdownEntry>,
}

impl StatisticRecord {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            ratio: false,
            breakdown: Vec::new(),
        }
    }

    pub fn ratio(label: impl Into<String>, value: f64) -> Self {
        Self {
            ratio: true,
            ..Self::new(label, value)
        }
    }

    pub fn with_breakdown(mut self, label: impl Into<String>, value: f64) -> Self {
        self.breakdown.push(BreakdownEntry {
            label: label.into(),
            value,
        });
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Guide
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    pub performance: QualitativePerformance,
    pub details: String,
}

/// One graded occurrence (e.g. a single cooldown use)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideEntry {
    /// Event timestamp of the occurrence, in replay milliseconds
    pub timestamp: i64,
    pub header: String,
    /// Lowest grade among `checklist`
    pub performance: QualitativePerformance,
    pub checklist: Vec<ChecklistItem>,
}

impl GuideEntry {
    /// Build an entry graded by its worst checklist item.
    pub fn from_checklist(
        timestamp: i64,
        header: impl Into<String>,
        checklist: Vec<ChecklistItem>,
    ) -> Self {
        let performance = QualitativePerformance::lowest(checklist.iter().map(|c| c.performance));
        Self {
            timestamp,
            header: header.into(),
            performance,
            checklist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideRecord {
    pub explanation: String,
    pub entries: Vec<GuideEntry>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Module / run level records
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a finalized module contributes to the report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleOutput {
    pub statistics: Vec<StatisticRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide: Option<GuideRecord>,
}

impl ModuleOutput {
    pub fn statistic(&self, label: &str) -> Option<&StatisticRecord> {
        self.statistics.iter().find(|s| s.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: String,
    pub output: ModuleOutput,
}

/// A module that was excluded from the report because it failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleFailure {
    pub module: String,
    /// Stream index of the event being delivered when the failure happened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Event missing a field its kind requires; skipped for linking
    MalformedEvent,
    /// Attribution walk revisited an event and was cut short
    AttributionCycle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub message: String,
}

/// Result of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub fight_start: i64,
    pub fight_end: i64,
    pub event_count: usize,
    pub relation_count: usize,
    /// Finalized output of every active module that did not fail
    pub modules: Vec<ModuleReport>,
    /// Modules whose activation predicate did not hold
    pub dormant: Vec<String>,
    pub failures: Vec<ModuleFailure>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    pub fn module(&self, name: &str) -> Option<&ModuleOutput> {
        self.modules.iter().find(|m| m.module == name).map(|m| &m.output)
    }

    pub fn failed(&self, name: &str) -> bool {
        self.failures.iter().any(|f| f.module == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_performance_wins() {
        let perfs = [
            QualitativePerformance::Good,
            QualitativePerformance::Ok,
            QualitativePerformance::Perfect,
        ];
        assert_eq!(QualitativePerformance::lowest(perfs), QualitativePerformance::Ok);
        assert_eq!(QualitativePerformance::lowest([]), QualitativePerformance::Perfect);
    }

    #[test]
    fn guide_entry_grades_by_worst_item() {
        let entry = GuideEntry::from_checklist(
            1_000,
            "cast",
            vec![
                ChecklistItem {
                    label: "a".into(),
                    performance: QualitativePerformance::Good,
                    details: String::new(),
                },
                ChecklistItem {
                    label: "b".into(),
                    performance: QualitativePerformance::Fail,
                    details: String::new(),
                },
            ],
        );
        assert_eq!(entry.performance, QualitativePerformance::Fail);
    }

    #[test]
    fn empty_breakdown_and_guide_are_omitted_from_json() {
        let output = ModuleOutput {
            statistics: vec![StatisticRecord::new("Healing", 12.0)],
            guide: None,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("guide").is_none());
        assert!(json["statistics"][0].get("breakdown").is_none());
        assert!(json["statistics"][0].get("ratio").is_none());
        assert_eq!(json["statistics"][0]["label"], "Healing");
    }

    #[test]
    fn ratio_statistics_carry_their_flag_through_json() {
        let stat = StatisticRecord::ratio("Share of healing", 0.25);
        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(json["ratio"], true);

        let back: StatisticRecord = serde_json::from_value(json).unwrap();
        assert!(back.ratio);
        assert!(!StatisticRecord::new("Healing", 1.0).ratio);
    }
}
