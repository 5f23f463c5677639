//! Shared types for the linkcast workspace.
//!
//! Everything in here crosses the boundary between the analysis engine and
//! whatever renders its results, so it stays free of engine internals.

pub mod formatting;
mod report;

pub use report::{
    AnalysisReport, BreakdownEntry, ChecklistItem, Diagnostic, DiagnosticKind, GuideEntry,
    GuideRecord, ModuleFailure, ModuleOutput, ModuleReport, QualitativePerformance,
    StatisticRecord,
};
