//! Probabilistic channels. Each source index gets one Bernoulli draw taken
//! while the formula is built, so the result encodes a single sampled run.

use rand::Rng;
use reo_core::Marker;

use super::fifo;
use super::lossy::scripted_lossy;
use super::variables::PortRef;
use crate::terms::{conjunction, SmtTerm};

/// One draw per source index, in index order.
pub(super) fn draw<R: Rng + ?Sized>(rng: &mut R, p: f64, bound: usize) -> Vec<bool> {
    (0..bound).map(|_| rng.gen_bool(p)).collect()
}

fn corrupted() -> SmtTerm {
    SmtTerm::int(Marker::Corrupted.value())
}

pub(super) fn cpt_sync(s: PortRef, k: PortRef, hits: &[bool]) -> SmtTerm {
    conjunction(
        hits.iter()
            .enumerate()
            .flat_map(|(i, hit)| {
                let data = if *hit { k.d(i).eq(corrupted()) } else { s.d(i).eq(k.d(i)) };
                [s.t(i).eq(k.t(i)), data]
            })
            .collect(),
    )
}

pub(super) fn rdm_sync(s: PortRef, k: PortRef, hits: &[bool]) -> SmtTerm {
    conjunction(
        hits.iter()
            .enumerate()
            .flat_map(|(i, hit)| {
                let data = if *hit { k.d(i).ne(s.d(i)) } else { s.d(i).eq(k.d(i)) };
                [s.t(i).eq(k.t(i)), data]
            })
            .collect(),
    )
}

pub(super) fn prob_lossy(s: PortRef, k: PortRef, drops: &[bool]) -> SmtTerm {
    scripted_lossy(s, k, drops, 0, 0, drops.len())
}

pub(super) fn faulty_fifo1(s: PortRef, k: PortRef, hits: &[bool]) -> SmtTerm {
    let bound = hits.len();
    let mut parts: Vec<SmtTerm> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| if *hit { k.d(i).eq(corrupted()) } else { s.d(i).eq(k.d(i)) })
        .collect();
    parts.extend(fifo::timing(s, k, 1, 0, bound));
    conjunction(parts)
}
