//! Final observation assembly: ordering, ids and warning aggregation.

use crate::extraction::types::{Observation, ObservationGroup, Warning};

/// Build the output rows for one text.
///
/// Groups are ordered by the minimum start offset of their members (stable on
/// discovery order); `obs_id` is `text_id * 1000` plus the 0-based rank. A
/// total score that disagrees with the sum of its parts is flagged, never
/// rejected.
#[must_use]
pub fn assemble(text_id: i64, mut groups: Vec<ObservationGroup>) -> Vec<Observation> {
    groups.sort_by_key(|group| (group.start, group.stop));
    groups
        .into_iter()
        .enumerate()
        .map(|(rank, group)| {
            let mut warnings = group.warnings;
            if let (Some(a), Some(b), Some(c)) = (group.scores.a, group.scores.b, group.scores.c) {
                if a + b != c {
                    warnings.push(Warning::ScoreMismatch);
                }
            }
            Observation {
                text_id,
                obs_id: text_id * 1000 + rank as i64,
                a: group.scores.a,
                b: group.scores.b,
                t: group.scores.t,
                c: group.scores.c,
                start: group.start,
                stop: group.stop,
                match_type: group.label,
                warning: render_warnings(&warnings),
            }
        })
        .collect()
}

/// Join distinct warnings in first-appearance order.
fn render_warnings(warnings: &[Warning]) -> Option<String> {
    let mut distinct: Vec<Warning> = Vec::new();
    for warning in warnings {
        if !distinct.contains(warning) {
            distinct.push(*warning);
        }
    }
    if distinct.is_empty() {
        None
    } else {
        Some(
            distinct
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("||"),
        )
    }
}
