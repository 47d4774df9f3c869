//! Lock-step channels: every index of one end pairs with the same index of
//! the other.

use super::variables::PortRef;
use crate::terms::{conjunction, disjunction, SmtTerm};

pub(super) fn copy_event(s: PortRef, i: usize, k: PortRef, j: usize) -> Vec<SmtTerm> {
    vec![s.d(i).eq(k.d(j)), s.t(i).eq(k.t(j))]
}

pub(super) fn sync(s: PortRef, k: PortRef, bound: usize) -> SmtTerm {
    conjunction((0..bound).flat_map(|i| copy_event(s, i, k, i)).collect())
}

/// SyncDrain and SyncSpout: both ends fire together, no data flows.
pub(super) fn synchronized(a: PortRef, b: PortRef, bound: usize) -> SmtTerm {
    conjunction((0..bound).map(|i| a.t(i).eq(b.t(i))).collect())
}

pub(super) fn producer(s: PortRef, k: PortRef, values: &[i64], bound: usize) -> SmtTerm {
    conjunction(
        (0..bound)
            .flat_map(|i| {
                let choice = disjunction(values.iter().map(|v| k.d(i).eq(SmtTerm::int(*v))).collect());
                [choice, s.t(i).eq(k.t(i))]
            })
            .collect(),
    )
}

pub(super) fn replicator(s: PortRef, sinks: &[PortRef], bound: usize) -> SmtTerm {
    conjunction(
        sinks
            .iter()
            .flat_map(|k| (0..bound).flat_map(move |i| copy_event(s, i, *k, i)))
            .collect(),
    )
}
