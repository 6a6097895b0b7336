//! Match analysis: merging, grouping and ranking candidate interpretations.
//!
//! Recognizers produce overlapping, partially redundant [`TermMatch`]es.
//! The functions here reduce them to a minimal covering set, decide whether
//! the input was fully explained, cluster competing interpretations and pick
//! between alternative explanations of the same input.

use super::language;
use super::term_match::TermMatch;

/// True if `a` makes `b` redundant.
///
/// Same-span matches with different values are alternatives rather than
/// duplicates, and a self reference never hides a value.
fn subsumes(a: &TermMatch, b: &TermMatch) -> bool {
    if a.is_field_reference() && !b.is_field_reference() {
        return false;
    }
    a.covers(b) && (!a.same_span(b) || a.value == b.value)
}

fn sort_matches(matches: &mut [TermMatch]) {
    matches.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.end().cmp(&b.end()))
            .then(a.is_null().cmp(&b.is_null()))
    });
}

fn gap<'a>(input: &'a str, from: usize, to: usize) -> &'a str {
    input.get(from..to).unwrap_or("")
}

/// Resolves overlapping matches into a minimal covering set.
///
/// Matches are taken in (start, end, null last) order. Each one is dropped if
/// another match subsumes it, or if it is null and overlaps a non-null match.
/// Otherwise it absorbs following matches separated only by punctuation or
/// whitespace when they carry the same value or either side is a self
/// reference. Self references are never returned on their own.
pub fn coalesce(matches: impl IntoIterator<Item = TermMatch>, input: &str) -> Vec<TermMatch> {
    let mut pending: Vec<TermMatch> = matches.into_iter().collect();
    sort_matches(&mut pending);
    let mut done: Vec<TermMatch> = Vec::new();

    while !pending.is_empty() {
        let mut current = pending.remove(0);

        if pending
            .iter()
            .chain(done.iter())
            .any(|other| subsumes(other, &current))
        {
            continue;
        }
        if current.is_null()
            && pending
                .iter()
                .chain(done.iter())
                .any(|other| !other.is_null() && !other.is_field_reference() && other.overlaps(&current))
        {
            continue;
        }

        let mut i = 0;
        while i < pending.len() {
            let next = &pending[i];
            if next.start < current.end() {
                i += 1;
                continue;
            }
            if !language::non_word(gap(input, current.end(), next.start)) {
                break;
            }
            if current.value == next.value || current.is_field_reference() || next.is_field_reference() {
                let next = pending.remove(i);
                let end = current.end().max(next.end());
                current.length = end - current.start;
                current.confidence = current.confidence.max(next.confidence);
                if current.is_field_reference() {
                    current.value = next.value;
                }
                continue;
            }
            i += 1;
        }

        if !current.is_null() && !current.is_field_reference() {
            // A merged span can reach nulls that were emitted before it grew.
            pending.retain(|other| !(other.is_null() && other.overlaps(&current)));
            done.retain(|other| !(other.is_null() && other.overlaps(&current)));
        }
        if current.is_field_reference() {
            continue;
        }
        pending.retain(|other| !subsumes(&current, other));
        done.retain(|other| !subsumes(&current, other));
        done.push(current);
    }

    sort_matches(&mut done);
    done
}

/// True if `matches` explain every non-ignorable character of `input` with
/// at least `threshold` confidence.
///
/// Coverage is measured after [`coalesce`], so a self reference only counts
/// once it has merged into a value and nulls hidden by values do not count.
pub fn is_full_match(input: &str, matches: &[TermMatch], threshold: f64) -> bool {
    let coalesced = coalesce(matches.iter().cloned(), input);
    if coalesced.is_empty() {
        return false;
    }
    let mut covered_to = 0;
    for m in &coalesced {
        if m.confidence < threshold {
            return false;
        }
        if m.start > covered_to && !language::non_word(gap(input, covered_to, m.start)) {
            return false;
        }
        covered_to = covered_to.max(m.end());
    }
    language::non_word(input.get(covered_to..).unwrap_or(""))
}

/// A cluster of matches whose spans overlap contiguously.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchGroup {
    pub matches: Vec<TermMatch>,
}

impl MatchGroup {
    pub fn first(&self) -> Option<&TermMatch> {
        self.matches.first()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// More than one distinct non-null value competes for this span.
    pub fn is_ambiguous(&self) -> bool {
        let mut seen = Vec::new();
        for m in self.matches.iter().filter(|m| !m.is_null()) {
            if !seen.contains(&&m.value) {
                seen.push(&m.value);
            }
        }
        seen.len() > 1
    }
}

/// Partitions matches into clusters of contiguously overlapping spans.
pub fn grouped_matches(matches: &[TermMatch]) -> Vec<MatchGroup> {
    let mut sorted = matches.to_vec();
    sort_matches(&mut sorted);
    let mut groups: Vec<MatchGroup> = Vec::new();
    let mut group_end = 0;
    for m in sorted {
        match groups.last_mut() {
            Some(group) if m.start < group_end || group.matches.iter().any(|g| g.overlaps(&m)) => {
                group_end = group_end.max(m.end());
                group.matches.push(m);
            }
            _ => {
                group_end = m.end();
                groups.push(MatchGroup { matches: vec![m] });
            }
        }
    }
    groups
}

fn coverage(matches: &[TermMatch]) -> usize {
    grouped_matches(matches)
        .iter()
        .filter_map(|group| group.first().map(|m| m.length))
        .sum()
}

fn min_confidence(matches: &[TermMatch]) -> f64 {
    matches
        .iter()
        .map(|m| m.confidence)
        .fold(f64::INFINITY, f64::min)
}

/// Picks the candidate set that best explains the input.
///
/// Larger coverage wins; equal coverage goes to the higher minimum
/// confidence, then to the earlier set. Returns `None` only for no sets.
pub fn best_matches(sets: &[&[TermMatch]]) -> Option<usize> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (index, set) in sets.iter().enumerate() {
        let covered = coverage(set);
        let confidence = if set.is_empty() { 0.0 } else { min_confidence(set) };
        let better = match best {
            None => true,
            Some((_, best_covered, best_confidence)) => {
                covered > best_covered || (covered == best_covered && confidence > best_confidence)
            }
        };
        if better {
            best = Some((index, covered, confidence));
        }
    }
    best.map(|(index, _, _)| index)
}

/// The matches carrying the highest confidence.
pub fn highest_confidence(matches: &[TermMatch]) -> Vec<TermMatch> {
    let top = matches
        .iter()
        .map(|m| m.confidence)
        .fold(f64::NEG_INFINITY, f64::max);
    matches
        .iter()
        .filter(|m| m.confidence >= top)
        .cloned()
        .collect()
}

/// Fragments of `input` not covered by any match.
pub fn unmatched(input: &str, matches: &[TermMatch]) -> Vec<String> {
    let mut covered = vec![false; input.len()];
    for m in matches {
        for flag in covered.iter_mut().take(m.end().min(input.len())).skip(m.start) {
            *flag = true;
        }
    }
    let mut fragments = Vec::new();
    let mut current = String::new();
    for (offset, ch) in input.char_indices() {
        if covered[offset] {
            if !current.trim().is_empty() {
                fragments.push(current.trim().to_string());
            }
            current.clear();
        } else {
            current.push(ch);
        }
    }
    if !current.trim().is_empty() {
        fragments.push(current.trim().to_string());
    }
    fragments
}
