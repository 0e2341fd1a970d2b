//! Re-sequencing of the manual recipe order.
//!
//! Submitted names that exist take positions 1..=k in submitted order; unknown
//! names are skipped and a repeated name keeps its last position, as if each
//! submitted index were applied in turn. Every other row follows
//! from k+1 in its current order (`sort_order`, then insertion `id`). The
//! result assigns a unique position to every existing row.

use std::collections::HashSet;

use crate::recipes::models::OrderedRow;

pub fn reconcile_order(existing: &[OrderedRow], submitted: &[String]) -> Vec<(String, i64)> {
    let known: HashSet<&str> = existing.iter().map(|r| r.name.as_str()).collect();
    // Walk backwards so the last occurrence of a repeated name is the one kept.
    let mut placed: HashSet<&str> = HashSet::new();
    let mut listed: Vec<&str> = submitted
        .iter()
        .rev()
        .map(String::as_str)
        .filter(|name| known.contains(name) && placed.insert(*name))
        .collect();
    listed.reverse();

    let mut plan: Vec<(String, i64)> = Vec::with_capacity(existing.len());
    for name in listed {
        plan.push((name.to_string(), plan.len() as i64 + 1));
    }

    let mut rest: Vec<&OrderedRow> = existing
        .iter()
        .filter(|r| !placed.contains(r.name.as_str()))
        .collect();
    rest.sort_by_key(|r| (r.sort_order, r.id));
    for row in rest {
        plan.push((row.name.clone(), plan.len() as i64 + 1));
    }

    plan
}
