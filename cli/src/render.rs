//! Plain-text rendering of reports and rule lists

use std::fmt::Write;

use linkcast_core::normalizer::{EventMatcher, LinkRule, TargetScope};
use linkcast_types::formatting::{format_duration, format_pct, format_timestamp, format_value};
use linkcast_types::{AnalysisReport, DiagnosticKind, ModuleOutput, StatisticRecord};

/// Text report. `european` swaps decimal and thousands separators.
pub fn report(report: &AnalysisReport, european: bool) -> String {
    let mut out = String::new();
    let at = |ts: i64| format_timestamp(ts, report.fight_start);

    let _ = writeln!(
        out,
        "Fight {} ({} events, {} relations)",
        format_duration(report.fight_end.saturating_sub(report.fight_start) / 1_000),
        report.event_count,
        report.relation_count,
    );

    for module in &report.modules {
        let _ = writeln!(out, "\n== {} ==", module.module);
        module_output(&mut out, &module.output, european);
    }

    if !report.dormant.is_empty() {
        let _ = writeln!(out, "\nDormant: {}", report.dormant.join(", "));
    }

    if !report.failures.is_empty() {
        let _ = writeln!(out, "\nFailed:");
        for failure in &report.failures {
            let location = match (failure.event_index, failure.timestamp) {
                (Some(idx), Some(ts)) => format!(" at event #{idx} ({})", at(ts)),
                _ => " during construction".to_string(),
            };
            let _ = writeln!(out, "  {}{location}: {}", failure.module, failure.message);
        }
    }

    if !report.diagnostics.is_empty() {
        let _ = writeln!(out, "\nDiagnostics:");
        for diag in &report.diagnostics {
            let kind = match diag.kind {
                DiagnosticKind::MalformedEvent => "malformed event",
                DiagnosticKind::AttributionCycle => "attribution cycle",
            };
            let index = diag.event_index.map(|i| format!(" #{i}")).unwrap_or_default();
            let time = diag.timestamp.map(|ts| format!(" @ {}", at(ts))).unwrap_or_default();
            let _ = writeln!(out, "  {kind}{index}{time}: {}", diag.message);
        }
    }

    out.trim_end().to_string()
}

fn statistic_value(stat: &StatisticRecord, european: bool) -> String {
    if stat.ratio {
        format_pct(stat.value * 100.0, european)
    } else {
        format_value(stat.value, european)
    }
}

fn module_output(out: &mut String, output: &ModuleOutput, european: bool) {
    for stat in &output.statistics {
        let _ = writeln!(out, "  {}: {}", stat.label, statistic_value(stat, european));
        for entry in &stat.breakdown {
            let _ = writeln!(out, "    {}: {}", entry.label, format_value(entry.value, european));
        }
    }

    let Some(guide) = &output.guide else {
        return;
    };
    let _ = writeln!(out, "\n  {}", guide.explanation);
    for entry in &guide.entries {
        let _ = writeln!(out, "\n  [{}] {}", entry.performance.label(), entry.header);
        for item in &entry.checklist {
            let grade = item.performance.label();
            let _ = writeln!(out, "    [{grade}] {}: {}", item.label, item.details);
        }
    }
}

fn matcher(m: &EventMatcher) -> String {
    let kinds = if m.kinds.is_empty() {
        "*".to_string()
    } else {
        m.kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join("|")
    };
    if m.abilities.is_empty() {
        kinds
    } else {
        let abilities: Vec<String> = m.abilities.iter().map(i64::to_string).collect();
        format!("{kinds}[{}]", abilities.join(","))
    }
}

pub fn rules(rules: &[LinkRule], modules: &[&str], disabled: &[bool]) -> String {
    let mut out = String::from("Link rules (declaration order):\n");
    for (idx, rule) in rules.iter().enumerate() {
        let scope = match rule.scope {
            TargetScope::SameTarget => "same target",
            TargetScope::AnyTarget => "any target",
        };
        let _ = write!(
            out,
            "  {}. {} -> {} as {} (-{}ms/+{}ms, {scope}",
            idx + 1,
            matcher(&rule.linking),
            matcher(&rule.referenced),
            rule.link_relation,
            rule.backward_buffer_ms,
            rule.forward_buffer_ms,
        );
        if rule.condition.is_some() {
            out.push_str(", conditional");
        }
        out.push(')');
        if let Some(reverse) = &rule.reverse_link_relation {
            let _ = write!(out, ", reverse {reverse}");
        }
        out.push('\n');
    }

    out.push_str("\nAnalyzers (construction order):\n");
    for (idx, name) in modules.iter().enumerate() {
        let off = if disabled.get(idx).copied().unwrap_or(false) { " (disabled)" } else { "" };
        let _ = writeln!(out, "  {name}{off}");
    }
    out.trim_end().to_string()
}
