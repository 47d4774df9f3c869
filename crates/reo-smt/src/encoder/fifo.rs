//! Buffered channels: capacity `n`, optional preload emitted first.

use super::variables::PortRef;
use crate::terms::{conjunction, SmtTerm};

/// Timing of a FIFO with `capacity` slots holding `preloaded` items at
/// start: item i leaves as sink event i + m, strictly after it entered, and
/// the source may not run more than `capacity` items ahead of the sink.
pub(super) fn timing(s: PortRef, k: PortRef, capacity: usize, preloaded: usize, bound: usize) -> Vec<SmtTerm> {
    let mut parts = Vec::new();
    for i in 0..bound.saturating_sub(preloaded) {
        parts.push(s.t(i).lt(k.t(i + preloaded)));
    }
    for i in 0..bound {
        if i + preloaded >= capacity {
            parts.push(s.t(i).gt(k.t(i + preloaded - capacity)));
        }
    }
    if capacity > 1 {
        for i in 1..bound {
            parts.push(k.t(i).gt(k.t(i - 1)));
        }
    }
    parts
}

/// Preloaded values occupy the first sink indices; source item i is then
/// emitted as sink item i + m.
pub(super) fn data(s: PortRef, k: PortRef, preload: &[i64], bound: usize) -> Vec<SmtTerm> {
    let m = preload.len();
    let mut parts: Vec<SmtTerm> = preload
        .iter()
        .take(bound)
        .enumerate()
        .map(|(i, v)| k.d(i).eq(SmtTerm::int(*v)))
        .collect();
    for i in 0..bound.saturating_sub(m) {
        parts.push(s.d(i).eq(k.d(i + m)));
    }
    parts
}

pub(super) fn fifo(s: PortRef, k: PortRef, capacity: usize, preload: &[i64], bound: usize) -> SmtTerm {
    let mut parts = data(s, k, preload, bound);
    parts.extend(timing(s, k, capacity, preload.len(), bound));
    conjunction(parts)
}
