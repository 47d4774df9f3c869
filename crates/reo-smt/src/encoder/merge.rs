//! Interleaving channels: merges and the asynchronous drain/spout pair.

use super::variables::PortRef;
use crate::terms::{conjunction, SmtTerm};

/// Two-source merge. Sink index `i + j` takes the earlier of the two pending
/// source items.
pub(super) fn merger(a: PortRef, b: PortRef, k: PortRef, i: usize, j: usize, bound: usize) -> SmtTerm {
    if i + j >= bound {
        return SmtTerm::bool(true);
    }
    let from_a = SmtTerm::and(vec![
        a.d(i).eq(k.d(i + j)),
        a.t(i).eq(k.t(i + j)),
        a.t(i).lt(b.t(j)),
        merger(a, b, k, i + 1, j, bound),
    ]);
    let from_b = SmtTerm::and(vec![
        b.d(j).eq(k.d(i + j)),
        b.t(j).eq(k.t(i + j)),
        b.t(j).lt(a.t(i)),
        merger(a, b, k, i, j + 1, bound),
    ]);
    SmtTerm::or(vec![from_a, from_b])
}

/// k-source merge over a per-source index vector.
pub(super) fn multi_merger(sources: &[PortRef], k: PortRef, idx: &mut [usize], bound: usize) -> SmtTerm {
    let out: usize = idx.iter().sum();
    if out >= bound {
        return SmtTerm::bool(true);
    }
    let mut branches = Vec::with_capacity(sources.len());
    for (m, src) in sources.iter().enumerate() {
        let im = idx[m];
        let mut parts = vec![src.d(im).eq(k.d(out)), src.t(im).eq(k.t(out))];
        for (l, other) in sources.iter().enumerate() {
            if l != m {
                parts.push(src.t(im).lt(other.t(idx[l])));
            }
        }
        idx[m] += 1;
        parts.push(multi_merger(sources, k, idx, bound));
        idx[m] -= 1;
        branches.push(SmtTerm::and(parts));
    }
    SmtTerm::or(branches)
}

/// AsynDrain and AsynSpout: the two ends never fire at the same instant.
/// Walks both time sequences in merged order, consuming the earlier one.
pub(super) fn asynchronous(a: PortRef, b: PortRef, i: usize, j: usize, bound: usize) -> SmtTerm {
    if i >= bound || j >= bound {
        return SmtTerm::bool(true);
    }
    SmtTerm::or(vec![
        conjunction(vec![a.t(i).lt(b.t(j)), asynchronous(a, b, i + 1, j, bound)]),
        conjunction(vec![a.t(i).gt(b.t(j)), asynchronous(a, b, i, j + 1, bound)]),
    ])
}
