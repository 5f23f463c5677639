//! Tests for relation resolution
//!
//! Graphs are wired by hand with `EventStream::link` so each case isolates
//! one precedence step.

use super::{AttributionRules, AttributionScope, resolve, resolve_traced};
use linkcast_types::DiagnosticKind;

use crate::combat_log::{CombatEvent, EventId, EventKind, EventStream};

fn rules() -> AttributionRules {
    AttributionRules::new("Direct")
        .indirect(["ProcA", "ProcB"])
        .duplicate("Dup")
        .transfer("Transfer")
}

fn stream_of(timestamps: &[i64]) -> EventStream {
    EventStream::ingest(
        timestamps
            .iter()
            .enumerate()
            .map(|(i, ts)| CombatEvent::new(EventKind::ApplyBuff, *ts, 1, Some(i as i64), 100))
            .collect(),
    )
}

#[test]
fn direct_relation_attributes() {
    let mut stream = stream_of(&[0, 10]);
    stream.link(EventId(1), "Direct", EventId(0));
    let scope = AttributionScope::new();
    assert!(resolve(&stream, &rules(), &scope, EventId(1)));
    assert!(!resolve(&stream, &rules(), &scope, EventId(0)));
}

#[test]
fn indirect_overrides_direct() {
    let mut stream = stream_of(&[0, 10, 20]);
    stream.link(EventId(2), "Direct", EventId(0));
    stream.link(EventId(2), "ProcB", EventId(1));
    let scope = AttributionScope::new();
    assert!(!resolve(&stream, &rules(), &scope, EventId(2)));
}

#[test]
fn indirect_is_checked_before_dedup_marks_the_timestamp() {
    let mut stream = stream_of(&[50, 50]);
    stream.link(EventId(0), "Dup", EventId(1));
    stream.link(EventId(0), "ProcA", EventId(1));
    stream.link(EventId(1), "Dup", EventId(0));
    stream.link(EventId(1), "Direct", EventId(0));
    let scope = AttributionScope::new();

    assert!(!resolve(&stream, &rules(), &scope, EventId(0)));
    assert_eq!(scope.seen_count(), 0);
    assert!(resolve(&stream, &rules(), &scope, EventId(1)));
}

#[test]
fn duplicate_pair_attributes_only_once() {
    let mut stream = stream_of(&[3000, 3000]);
    for (a, b) in [(0, 1), (1, 0)] {
        stream.link(EventId(a), "Dup", EventId(b));
        stream.link(EventId(a), "Direct", EventId(b));
    }
    let scope = AttributionScope::new();
    let outcomes = [
        resolve(&stream, &rules(), &scope, EventId(0)),
        resolve(&stream, &rules(), &scope, EventId(1)),
    ];
    assert_eq!(outcomes, [true, false]);
}

#[test]
fn dedup_suppresses_unrelated_pair_sharing_timestamp() {
    // Two independent duplicate pairs that happen to land on the same
    // millisecond. Dedup keys on timestamp only, so the second pair loses
    // its first (legitimate) attribution as well.
    let mut stream = stream_of(&[500, 500, 500, 500]);
    for (a, b) in [(0, 1), (1, 0), (2, 3), (3, 2)] {
        stream.link(EventId(a), "Dup", EventId(b));
        stream.link(EventId(a), "Direct", EventId(b));
    }
    let scope = AttributionScope::new();
    let outcomes: Vec<bool> = (0..4)
        .map(|i| resolve(&stream, &rules(), &scope, EventId(i)))
        .collect();
    assert_eq!(outcomes, vec![true, false, false, false]);
}

#[test]
fn fresh_scope_forgets_seen_timestamps() {
    let mut stream = stream_of(&[7, 7]);
    stream.link(EventId(0), "Dup", EventId(1));
    stream.link(EventId(0), "Direct", EventId(1));

    let first = AttributionScope::new();
    assert!(resolve(&stream, &rules(), &first, EventId(0)));
    assert!(!resolve(&stream, &rules(), &first, EventId(0)));

    let second = AttributionScope::new();
    assert!(resolve(&stream, &rules(), &second, EventId(0)));
}

#[test]
fn transfer_follows_nearest_ancestor() {
    // 0: far ancestor with a direct link, 2: near ancestor without one
    let mut stream = stream_of(&[0, 5, 90, 100]);
    stream.link(EventId(0), "Direct", EventId(1));
    stream.link(EventId(3), "Transfer", EventId(0));
    stream.link(EventId(3), "Transfer", EventId(2));
    let scope = AttributionScope::new();

    let traced = resolve_traced(&stream, &rules(), &scope, EventId(3));
    assert!(!traced.attributed);
    assert_eq!(traced.path, vec![EventId(3), EventId(2)]);
}

#[test]
fn transfer_tie_prefers_earlier_stream_position() {
    let mut stream = stream_of(&[90, 100, 110]);
    stream.link(EventId(0), "Direct", EventId(0));
    stream.link(EventId(1), "Transfer", EventId(2));
    stream.link(EventId(1), "Transfer", EventId(0));
    let scope = AttributionScope::new();

    let traced = resolve_traced(&stream, &rules(), &scope, EventId(1));
    assert_eq!(traced.path, vec![EventId(1), EventId(0)]);
    assert!(traced.attributed);
}

#[test]
fn chain_of_n_events_takes_at_most_n_steps() {
    let n = 50;
    let timestamps: Vec<i64> = (0..n).map(|i| i * 10).collect();
    let mut stream = stream_of(&timestamps);
    stream.link(EventId(0), "Direct", EventId(0));
    for i in 1..n as usize {
        stream.link(EventId(i), "Transfer", EventId(i - 1));
    }
    let scope = AttributionScope::new();

    let traced = resolve_traced(&stream, &rules(), &scope, EventId(n as usize - 1));
    assert!(traced.attributed);
    assert_eq!(traced.path.len(), n as usize);
}

#[test]
fn cycles_terminate_with_a_diagnostic() {
    let mut stream = stream_of(&[100, 100]);
    stream.link(EventId(0), "Transfer", EventId(1));
    stream.link(EventId(1), "Transfer", EventId(0));
    let scope = AttributionScope::new();

    let traced = resolve_traced(&stream, &rules(), &scope, EventId(0));
    assert!(!traced.attributed);
    assert_eq!(traced.path, vec![EventId(0), EventId(1)]);

    let diagnostics = scope.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::AttributionCycle);
    assert!(scope.take_diagnostics().is_empty());
}

#[test]
fn unknown_event_is_unattributed() {
    let stream = stream_of(&[0]);
    let scope = AttributionScope::new();
    assert!(!resolve(&stream, &rules(), &scope, EventId(9)));
}
