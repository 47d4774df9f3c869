//! Channels that may skip source items. Recursion runs over the source
//! index `i` and the next free sink index `j`.

use super::basic::copy_event;
use super::variables::PortRef;
use crate::terms::{disjunction, SmtTerm};

/// Each source item is either dropped (its time differs from the pending
/// sink event) or transmitted to sink index `j`.
pub(super) fn lossy_sync(s: PortRef, k: PortRef, i: usize, j: usize, bound: usize) -> SmtTerm {
    if i >= bound || j >= bound {
        return SmtTerm::bool(true);
    }
    SmtTerm::or(vec![drop_item(s, k, i, j, bound), transmit(s, k, i, j, bound)])
}

fn drop_item(s: PortRef, k: PortRef, i: usize, j: usize, bound: usize) -> SmtTerm {
    SmtTerm::and(vec![s.t(i).ne(k.t(j)), lossy_sync(s, k, i + 1, j, bound)])
}

fn transmit(s: PortRef, k: PortRef, i: usize, j: usize, bound: usize) -> SmtTerm {
    let mut parts = copy_event(s, i, k, j);
    parts.push(lossy_sync(s, k, i + 1, j + 1, bound));
    SmtTerm::and(parts)
}

/// Lossy recursion with every branch fixed in advance: `drops[i]` decides
/// the fate of source item i.
pub(super) fn scripted_lossy(s: PortRef, k: PortRef, drops: &[bool], i: usize, j: usize, bound: usize) -> SmtTerm {
    if i >= bound || j >= bound {
        return SmtTerm::bool(true);
    }
    if drops.get(i).copied().unwrap_or(false) {
        SmtTerm::and(vec![s.t(i).ne(k.t(j)), scripted_lossy(s, k, drops, i + 1, j, bound)])
    } else {
        let mut parts = copy_event(s, i, k, j);
        parts.push(scripted_lossy(s, k, drops, i + 1, j + 1, bound));
        SmtTerm::and(parts)
    }
}

/// Items whose value lies in `accept` pass through to the next sink index;
/// all others are discarded.
pub(super) fn filter(s: PortRef, k: PortRef, accept: &[i64], i: usize, j: usize, bound: usize) -> SmtTerm {
    if i >= bound || j >= bound {
        return SmtTerm::bool(true);
    }
    let accepted = disjunction(accept.iter().map(|p| s.d(i).eq(SmtTerm::int(*p))).collect());

    let mut pass = vec![accepted.clone()];
    pass.extend(copy_event(s, i, k, j));
    pass.push(filter(s, k, accept, i + 1, j + 1, bound));

    let discard = SmtTerm::and(vec![accepted.not(), filter(s, k, accept, i + 1, j, bound)]);
    SmtTerm::or(vec![SmtTerm::and(pass), discard])
}
