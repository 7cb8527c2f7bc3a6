//! Grouping loose components into observations.
//!
//! Components that arrived grouped by one compound match alternative pass
//! through unchanged. The remaining single-kind components are scanned, in
//! appearance order, against an ordered list of allowed templates; the first
//! template and repetition count that fit a contiguous run consume it. Group
//! formation depends only on the sequence of kinds encountered, never on the
//! character distance between them — a known, accepted approximation.

use std::iter::repeat_n;

use crate::error::{Error, Result};
use crate::extraction::types::{
    ComponentKind, ObservationGroup, ParsedComponent, ScoreSet, Warning,
};

/// An ordered run of component kinds that may form one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(Vec<ComponentKind>);

impl Template {
    /// Parse a template from kind letters, e.g. `"cab"`.
    ///
    /// # Errors
    /// Returns an error when the string is empty or holds an unknown letter.
    pub fn parse(s: &str) -> Result<Self> {
        let kinds: Option<Vec<ComponentKind>> = s.chars().map(ComponentKind::from_char).collect();
        match kinds {
            Some(kinds) if !kinds.is_empty() => Ok(Self(kinds)),
            _ => Err(Error::InvalidTemplate(s.to_string())),
        }
    }

    /// The kinds of this template, in required order.
    #[must_use]
    pub fn kinds(&self) -> &[ComponentKind] {
        &self.0
    }
}

/// Allowed combinations in priority order, most specific first. An element
/// that fits none of these is reported alone.
#[must_use]
pub fn default_templates() -> Vec<String> {
    ["cabt", "cab", "cba", "abtc", "abc", "bac", "abt", "ab"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Group a text's parsed components into observations.
#[must_use]
pub fn combine(
    components: &[ParsedComponent],
    templates: &[Template],
    max_repeats: usize,
) -> Vec<ObservationGroup> {
    let mut groups = Vec::new();
    let mut singles: Vec<&ParsedComponent> = Vec::new();

    // pass-through: one group per compound match alternative
    let mut idx = 0;
    while idx < components.len() {
        let component = &components[idx];
        if component.match_type.is_compound() {
            let key = (component.source, component.alt);
            let mut end = idx + 1;
            while end < components.len()
                && (components[end].source, components[end].alt) == key
            {
                end += 1;
            }
            groups.push(passthrough_group(&components[idx..end]));
            idx = end;
        } else {
            singles.push(component);
            idx += 1;
        }
    }

    groups.extend(scan_singles(&singles, templates, max_repeats));
    groups
}

/// One group for components that a compound match already tied together.
fn passthrough_group(members: &[ParsedComponent]) -> ObservationGroup {
    let mut scores = ScoreSet::default();
    let mut warnings = Vec::new();
    for member in members {
        if let Some(value) = member.value {
            scores.fill(member.kind, value);
        }
        if let Some(warning) = member.warning {
            warnings.push(warning);
        }
    }
    ObservationGroup {
        text_id: members[0].text_id,
        scores,
        start: members.iter().map(|m| m.start).min().unwrap_or_default(),
        stop: members.iter().map(|m| m.stop).max().unwrap_or_default(),
        label: members[0].match_type.as_str().to_string(),
        warnings,
    }
}

/// Scan ungrouped single-kind components against the template list.
fn scan_singles(
    singles: &[&ParsedComponent],
    templates: &[Template],
    max_repeats: usize,
) -> Vec<ObservationGroup> {
    let mut groups = Vec::new();
    let mut pos = 0;
    while pos < singles.len() {
        if let Some((template, repeats)) = find_fit(&singles[pos..], templates, max_repeats) {
            let len = template.kinds().len() * repeats;
            groups.push(combined_group(&singles[pos..pos + len], template, repeats));
            pos += len;
        } else {
            groups.push(lone_group(singles[pos]));
            pos += 1;
        }
    }
    groups
}

/// First template and repetition count fitting the run at the scan position.
/// Templates are tried in priority order, repetition counts largest first.
fn find_fit<'t>(
    rest: &[&ParsedComponent],
    templates: &'t [Template],
    max_repeats: usize,
) -> Option<(&'t Template, usize)> {
    for template in templates {
        for repeats in (1..=max_repeats).rev() {
            let len = template.kinds().len() * repeats;
            if len > rest.len() {
                continue;
            }
            let fits = template
                .kinds()
                .iter()
                .flat_map(|kind| repeat_n(*kind, repeats))
                .zip(&rest[..len])
                .all(|(kind, component)| component.kind == kind);
            if fits {
                return Some((template, repeats));
            }
        }
    }
    None
}

/// Build one group from a consumed run. Repeated values of one kind must
/// agree; when they do not, the first occurrence wins and the group is
/// flagged.
fn combined_group(
    members: &[&ParsedComponent],
    template: &Template,
    repeats: usize,
) -> ObservationGroup {
    let mut scores = ScoreSet::default();
    let mut warnings: Vec<Warning> = members.iter().filter_map(|m| m.warning).collect();

    for (i, kind) in template.kinds().iter().enumerate() {
        let run = &members[i * repeats..(i + 1) * repeats];
        if let Some(first) = run.iter().find_map(|m| m.value) {
            scores.fill(*kind, first);
            let disagrees = run
                .iter()
                .any(|m| m.value.is_some() && m.value != Some(first));
            if disagrees {
                warnings.push(Warning::InconsistentRepeat(*kind));
            }
        }
    }

    ObservationGroup {
        text_id: members[0].text_id,
        scores,
        start: members.iter().map(|m| m.start).min().unwrap_or_default(),
        stop: members.iter().map(|m| m.stop).max().unwrap_or_default(),
        label: members.iter().map(|m| m.kind.as_str()).collect(),
        warnings,
    }
}

/// A component that fit no template becomes its own flagged group.
fn lone_group(member: &ParsedComponent) -> ObservationGroup {
    let mut scores = ScoreSet::default();
    if let Some(value) = member.value {
        scores.fill(member.kind, value);
    }
    let mut warnings = Vec::new();
    if let Some(warning) = member.warning {
        warnings.push(warning);
    }
    warnings.push(Warning::UngroupedComponent);
    ObservationGroup {
        text_id: member.text_id,
        scores,
        start: member.start,
        stop: member.stop,
        label: member.kind.as_str().to_string(),
        warnings,
    }
}
