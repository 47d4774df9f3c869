//! Channel semantics library.
//!
//! Each channel kind maps the symbolic sequences of its endpoints, up to the
//! bound, to a formula over their time and data variables. Recursive
//! encodings bottom out in `true` once an index reaches the bound; they never
//! decide consistency themselves.

mod basic;
mod fifo;
mod lossy;
mod merge;
mod sampled;
mod timer;
pub mod variables;

use rand::Rng;
use reo_core::{Channel, ChannelKind, Connector};
use tracing::debug;

use crate::sorts::SmtSort;
use crate::terms::{conjunction, SmtTerm};
use timer::Control;
use variables::{Binding, PortRef, PortTable};

/// Formula for one channel instance over `bound` events per port.
///
/// `rng` is consulted only by sampled kinds, once per source index.
pub fn encode_channel<R: Rng + ?Sized>(channel: &Channel, bound: usize, rng: &mut R) -> SmtTerm {
    let ends: Vec<PortRef> = channel.endpoints().iter().map(|e| PortRef::new(e)).collect();
    let (s, k) = (ends[0], ends[ends.len() - 1]);
    match channel.kind() {
        ChannelKind::Sync => basic::sync(s, k, bound),
        ChannelKind::SyncDrain | ChannelKind::SyncSpout => basic::synchronized(s, k, bound),
        ChannelKind::AsynDrain | ChannelKind::AsynSpout => merge::asynchronous(s, k, 0, 0, bound),
        ChannelKind::Fifo1 => fifo::fifo(s, k, 1, &[], bound),
        ChannelKind::Fifo { capacity } => fifo::fifo(s, k, *capacity, &[], bound),
        ChannelKind::Fifo1e { preload } => fifo::fifo(s, k, 1, &[*preload], bound),
        ChannelKind::FifoPreloaded { capacity, preload } => fifo::fifo(s, k, *capacity, preload, bound),
        ChannelKind::LossySync => lossy::lossy_sync(s, k, 0, 0, bound),
        ChannelKind::Filter { accept } => lossy::filter(s, k, accept, 0, 0, bound),
        ChannelKind::Producer { values } => basic::producer(s, k, values, bound),
        ChannelKind::Merger => merge::merger(ends[0], ends[1], k, 0, 0, bound),
        ChannelKind::MultiMerger { sources } => {
            let mut idx = vec![0; *sources];
            merge::multi_merger(&ends[..*sources], k, &mut idx, bound)
        }
        ChannelKind::Replicator { .. } => basic::replicator(s, &ends[1..], bound),
        ChannelKind::Timer { duration } => timer::timer(s, k, *duration, bound),
        ChannelKind::OffTimer { duration } => timer::control_timer(s, k, Control::Off, *duration, 0, 0, bound),
        ChannelKind::ResetTimer { duration } => {
            timer::control_timer(s, k, Control::Reset, *duration, 0, 0, bound)
        }
        ChannelKind::ExpireTimer { duration } => {
            timer::control_timer(s, k, Control::Expire, *duration, 0, 0, bound)
        }
        ChannelKind::CptSync { p } => sampled::cpt_sync(s, k, &sampled::draw(rng, *p, bound)),
        ChannelKind::RdmSync { p } => sampled::rdm_sync(s, k, &sampled::draw(rng, *p, bound)),
        ChannelKind::ProbLossy { p } => sampled::prob_lossy(s, k, &sampled::draw(rng, *p, bound)),
        ChannelKind::FaultyFifo1 { p } => sampled::faulty_fifo1(s, k, &sampled::draw(rng, *p, bound)),
    }
}

/// Conjunction of every channel formula of `connector`, in channel order.
pub fn encode_channels<R: Rng + ?Sized>(connector: &Connector, bound: usize, rng: &mut R) -> SmtTerm {
    conjunction(
        connector
            .channels()
            .iter()
            .map(|chan| encode_channel(chan, bound, rng))
            .collect(),
    )
}

/// Allocate every port of `connector` with `binding`, skipping ports the
/// table already holds. Returns the names of the freshly allocated ports.
pub fn allocate_ports(table: &mut PortTable, connector: &Connector, binding: Binding) -> Vec<String> {
    let marked = connector.marker_ports();
    connector
        .ports()
        .into_iter()
        .filter(|port| table.allocate(port, binding, marked.contains(*port)))
        .map(str::to_string)
        .collect()
}

/// Variables and assertions describing all behaviours of one connector.
#[derive(Debug, Clone)]
pub struct ConnectorEncoding {
    /// Variable declarations: (name, sort).
    pub declarations: Vec<(String, SmtSort)>,
    /// Channel formulas followed by the port invariants.
    pub assertions: Vec<SmtTerm>,
    /// Names of variables to extract for a witness.
    pub model_vars: Vec<(String, SmtSort)>,
}

/// Encode a single connector with every port free.
pub fn encode_connector<R: Rng + ?Sized>(connector: &Connector, bound: usize, rng: &mut R) -> ConnectorEncoding {
    let mut table = PortTable::new(bound);
    allocate_ports(&mut table, connector, Binding::Free);
    debug!(ports = table.len(), bound, "allocated connector ports");

    let mut assertions: Vec<SmtTerm> = connector
        .channels()
        .iter()
        .map(|chan| encode_channel(chan, bound, rng))
        .collect();
    assertions.push(table.invariants(Binding::Free));

    let declarations = table.free_variables();
    ConnectorEncoding {
        model_vars: declarations.clone(),
        declarations,
        assertions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::z3_backend::Z3Solver;
    use crate::solver::{SatResult, SmtSolver};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn conn(lines: &[&str]) -> Connector {
        Connector::from_lines(lines).unwrap()
    }

    fn solve(encoding: &ConnectorEncoding, extra: &[SmtTerm]) -> Result<SatResult, Box<dyn std::error::Error>> {
        let mut solver = Z3Solver::new();
        for (name, sort) in &encoding.declarations {
            solver.declare_var(name, sort)?;
        }
        for a in encoding.assertions.iter().chain(extra) {
            solver.assert(a)?;
        }
        Ok(solver.check_sat()?)
    }

    #[test]
    fn every_kind_is_satisfiable_at_bound_one() -> TestResult {
        let lines = [
            "Sync A B",
            "SyncDrain A B",
            "SyncSpout A B",
            "AsynDrain A B",
            "AsynSpout A B",
            "Fifo1 A B",
            "Fifo(3) A B",
            "Fifo1e(1) A B",
            "Fifone(2, 1, 2) A B",
            "LossySync A B",
            "Filter(1, 2) A B",
            "Filter A B",
            "Producer(1, 2) A B",
            "Merger A B C",
            "MultiMerger A B C D",
            "Replicator A B C",
            "Timer(2) A B",
            "OFFTimer(2) A B",
            "RSTTimer(2) A B",
            "EXPTimer(2) A B",
            "CptSync(1) A B",
            "RdmSync(1) A B",
            "ProbLossy(1) A B",
            "FaultyFifo1(1) A B",
        ];
        let mut rng = StdRng::seed_from_u64(7);
        for line in lines {
            let encoding = encode_connector(&conn(&[line]), 1, &mut rng);
            assert_eq!(solve(&encoding, &[])?, SatResult::Sat, "{line} should be satisfiable");
        }
        Ok(())
    }

    #[test]
    fn sync_forces_equal_times() -> TestResult {
        let encoding = encode_connector(&conn(&["Sync A B"]), 2, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        assert_eq!(solve(&encoding, &[a.t(1).ne(b.t(1))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn fifo1_delays_and_alternates() -> TestResult {
        let encoding = encode_connector(&conn(&["Fifo1 A B"]), 2, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        assert_eq!(solve(&encoding, &[a.t(0).eq(b.t(0))])?, SatResult::Unsat);
        // The second write must wait for the first read.
        assert_eq!(solve(&encoding, &[a.t(1).lt(b.t(0))])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[a.d(1).eq(SmtTerm::int(5)), b.d(1).eq(SmtTerm::int(5))])?, SatResult::Sat);
        Ok(())
    }

    #[test]
    fn preloaded_fifo_emits_preload_first() -> TestResult {
        let encoding = encode_connector(&conn(&["Fifone(2, 3, 4) A B"]), 3, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        assert_eq!(solve(&encoding, &[b.d(0).ne(SmtTerm::int(3))])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[b.d(1).ne(SmtTerm::int(4))])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[b.d(2).ne(a.d(0))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn payload_cannot_alias_markers_on_plain_ports() -> TestResult {
        let encoding = encode_connector(&conn(&["Sync A B"]), 1, &mut StdRng::seed_from_u64(0));
        let b = PortRef::new("B");
        assert_eq!(solve(&encoding, &[b.d(0).eq(SmtTerm::int(15))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn timer_emits_timeout_after_duration() -> TestResult {
        let encoding = encode_connector(&conn(&["Timer(3) A B"]), 2, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        let timeout = SmtTerm::int(reo_core::Marker::Timeout.value());
        assert_eq!(solve(&encoding, &[b.d(0).ne(timeout)])?, SatResult::Unsat);
        assert_eq!(
            solve(&encoding, &[a.t(0).eq(SmtTerm::real(1)), b.t(0).ne(SmtTerm::real(4))])?,
            SatResult::Unsat
        );
        // A second start before the first timeout would overlap.
        assert_eq!(
            solve(&encoding, &[a.t(0).eq(SmtTerm::real(0)), a.t(1).eq(SmtTerm::real(1))])?,
            SatResult::Unsat
        );
        Ok(())
    }

    #[test]
    fn off_timer_can_be_cancelled() -> TestResult {
        let encoding = encode_connector(&conn(&["OFFTimer(5) S T"]), 3, &mut StdRng::seed_from_u64(0));
        let s = PortRef::new("S");
        let t = PortRef::new("T");
        let off = SmtTerm::int(reo_core::Marker::Off.value());
        // Cancelled at time 1, restarted at 2: first timeout is at 7.
        let script = [
            s.t(0).eq(SmtTerm::real(0)),
            s.d(1).eq(off),
            s.t(1).eq(SmtTerm::real(1)),
            s.t(2).eq(SmtTerm::real(2)),
            t.t(0).eq(SmtTerm::real(7)),
        ];
        assert_eq!(solve(&encoding, &script)?, SatResult::Sat);
        // The cancelled deadline at 5 never fires.
        let mut cancelled = script.to_vec();
        cancelled[4] = t.t(0).eq(SmtTerm::real(5));
        assert_eq!(solve(&encoding, &cancelled)?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn fifo_n_bounds_occupancy_by_capacity() -> TestResult {
        let encoding = encode_connector(&conn(&["Fifo(2) A B"]), 3, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        // Two items may be buffered before the first read ...
        assert_eq!(solve(&encoding, &[a.t(1).lt(b.t(0))])?, SatResult::Sat);
        // ... but not a third.
        assert_eq!(solve(&encoding, &[a.t(2).lt(b.t(0))])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[a.d(1).ne(b.d(1))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn producer_emits_only_its_values() -> TestResult {
        let encoding = encode_connector(&conn(&["Producer(1, 2) A B"]), 2, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        assert_eq!(solve(&encoding, &[b.d(1).eq(SmtTerm::int(3))])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[b.t(0).ne(a.t(0))])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[b.d(0).eq(SmtTerm::int(2))])?, SatResult::Sat);
        Ok(())
    }

    #[test]
    fn certain_random_sync_changes_data() -> TestResult {
        let encoding = encode_connector(&conn(&["RdmSync(1) A B"]), 2, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        assert_eq!(solve(&encoding, &[b.d(1).eq(a.d(1))])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[b.t(0).ne(a.t(0))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn prob_lossy_follows_its_draws() -> TestResult {
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        let always = encode_connector(&conn(&["ProbLossy(1) A B"]), 2, &mut StdRng::seed_from_u64(0));
        assert_eq!(solve(&always, &[b.t(0).eq(a.t(0))])?, SatResult::Unsat);
        assert_eq!(solve(&always, &[b.t(0).eq(a.t(1))])?, SatResult::Unsat);
        let never = encode_connector(&conn(&["ProbLossy(0) A B"]), 2, &mut StdRng::seed_from_u64(0));
        assert_eq!(solve(&never, &[b.t(1).ne(a.t(1))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn certain_faulty_fifo_corrupts_with_fifo_timing() -> TestResult {
        let encoding = encode_connector(&conn(&["FaultyFifo1(1) A B"]), 2, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        let corrupted = SmtTerm::int(reo_core::Marker::Corrupted.value());
        assert_eq!(solve(&encoding, &[b.d(0).ne(corrupted)])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[b.t(0).le(a.t(0))])?, SatResult::Unsat);
        assert_eq!(solve(&encoding, &[a.t(1).lt(b.t(0))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let c = conn(&["CptSync(0.5) A B", "ProbLossy(0.5) B C"]);
        let first = encode_connector(&c, 4, &mut StdRng::seed_from_u64(42));
        let second = encode_connector(&c, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(first.assertions, second.assertions);
    }

    #[test]
    fn certain_corruption_overwrites_data() -> TestResult {
        let encoding = encode_connector(&conn(&["CptSync(1) A B"]), 2, &mut StdRng::seed_from_u64(0));
        let b = PortRef::new("B");
        let corrupted = SmtTerm::int(reo_core::Marker::Corrupted.value());
        assert_eq!(solve(&encoding, &[b.d(1).ne(corrupted)])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn asyn_drain_rejects_shared_instants() -> TestResult {
        let encoding = encode_connector(&conn(&["AsynDrain A B"]), 3, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        assert_eq!(solve(&encoding, &[a.t(2).eq(b.t(1))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn filter_forwards_only_accepted_values() -> TestResult {
        let encoding = encode_connector(&conn(&["Filter(1) A B"]), 2, &mut StdRng::seed_from_u64(0));
        let a = PortRef::new("A");
        let b = PortRef::new("B");
        let script = [
            a.d(0).eq(SmtTerm::int(2)),
            a.d(1).eq(SmtTerm::int(1)),
            b.t(0).ne(a.t(1)),
        ];
        assert_eq!(solve(&encoding, &script)?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn replicator_copies_to_every_sink() -> TestResult {
        let encoding = encode_connector(&conn(&["Replicator A B C"]), 2, &mut StdRng::seed_from_u64(0));
        let b = PortRef::new("B");
        let c = PortRef::new("C");
        assert_eq!(solve(&encoding, &[b.d(1).ne(c.d(1))])?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn multi_merger_fires_the_earliest_source() -> TestResult {
        let encoding = encode_connector(&conn(&["MultiMerger A B C K"]), 2, &mut StdRng::seed_from_u64(0));
        let (a, b, c, k) = (PortRef::new("A"), PortRef::new("B"), PortRef::new("C"), PortRef::new("K"));
        let script = [
            a.t(0).eq(SmtTerm::real(3)),
            b.t(0).eq(SmtTerm::real(1)),
            c.t(0).eq(SmtTerm::real(2)),
            k.t(0).ne(SmtTerm::real(1)),
        ];
        assert_eq!(solve(&encoding, &script)?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn bound_zero_encodes_to_true() {
        let mut rng = StdRng::seed_from_u64(0);
        let encoding = encode_connector(&conn(&["LossySync A B", "Merger A B C"]), 0, &mut rng);
        assert!(encoding.declarations.is_empty());
        assert!(encoding.assertions.iter().all(|a| *a == SmtTerm::bool(true)));
    }
}
