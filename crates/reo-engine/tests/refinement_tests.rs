//! End-to-end refinement checks over small connectors.

use reo_core::proptest_generators::{arb_connector, arb_sync_chain, sync_chain};
use reo_core::Connector;
use reo_engine::{check_equivalence, check_refinement, format_witness, RefinementOptions, Refines, Verdict};

use proptest::prelude::*;

fn conn(lines: &[&str]) -> Connector {
    Connector::from_lines(lines).unwrap()
}

fn opts(bound: usize) -> RefinementOptions {
    RefinementOptions {
        bound,
        seed: Some(11),
        ..RefinementOptions::default()
    }
}

#[test]
fn sync_is_a_refinement_of_itself() {
    for bound in 1..=3 {
        let sync = conn(&["Sync A B"]);
        let report = check_refinement(&sync, &sync, &opts(bound)).unwrap();
        assert!(report.holds(), "bound {bound}");
        assert!(report.counterexample().is_none());
    }
}

#[test]
fn sync_and_fifo1_refine_in_neither_direction() {
    let sync = conn(&["Sync A B"]);
    let fifo = conn(&["Fifo1 A B"]);

    let report = check_refinement(&fifo, &sync, &opts(10)).unwrap();
    let witness = report.counterexample().expect("Fifo1 delays, Sync does not");
    let a = &witness.port("A").unwrap().events[0];
    let b = &witness.port("B").unwrap().events[0];
    assert!(a.time.is_some() && a.time < b.time, "{}", format_witness(witness));

    let report = check_refinement(&sync, &fifo, &opts(10)).unwrap();
    let witness = report.counterexample().expect("Sync never delays");
    let a = &witness.port("A").unwrap().events[0];
    let b = &witness.port("B").unwrap().events[0];
    assert!(a.time.is_some());
    assert_eq!(a.time, b.time);
}

#[test]
fn sync_refines_lossy_sync_but_not_conversely() {
    let sync = conn(&["Sync A B"]);
    let lossy = conn(&["LossySync A B"]);
    assert!(check_refinement(&sync, &lossy, &opts(4)).unwrap().holds());
    assert!(check_refinement(&lossy, &lossy, &opts(4)).unwrap().holds());
    assert!(matches!(
        check_refinement(&lossy, &sync, &opts(4)).unwrap().verdict,
        Verdict::Counterexample(_)
    ));
}

#[test]
fn independent_fifo_outputs_do_not_refine_a_synchronised_pair() {
    let concrete = conn(&["Sync A E", "Fifo1 E C", "Fifo1 E D"]);
    let abstraction = conn(&["Fifo1 A B", "Sync B C", "Sync B D"]);
    let report = check_refinement(&concrete, &abstraction, &opts(2)).unwrap();
    assert_eq!(report.quantified_ports, vec!["B"]);
    let witness = report.counterexample().expect("C and D may fire apart");
    assert!(witness.port("E").is_some());
}

#[test]
fn drained_fifo_pair_refines_a_single_buffer() {
    let concrete = conn(&[
        "Sync A E",
        "Fifo1 E F",
        "Fifo1 E G",
        "Sync F B",
        "Sync G C",
        "SyncDrain F G",
    ]);
    let abstraction = conn(&["Fifo1 A D", "Sync D B", "Sync D C"]);
    let report = check_refinement(&concrete, &abstraction, &opts(2)).unwrap();
    assert_eq!(report.quantified_ports, vec!["D"]);
    assert!(report.holds(), "{:?}", report.verdict);
}

#[test]
fn delayed_timeout_is_not_an_exact_timeout() {
    let concrete = conn(&[
        "Fifo1 A C",
        "Timert(1) A D",
        "Fifo1 D E",
        "SyncDrain C E",
        "Sync C B",
    ]);
    let abstraction = conn(&["Fifo1 A F", "Timert(1) A G", "SyncDrain F G", "Sync F B"]);
    let report = check_refinement(&concrete, &abstraction, &opts(2)).unwrap();
    assert_eq!(report.quantified_ports, vec!["F", "G"]);
    assert!(matches!(report.verdict, Verdict::Counterexample(_)));
}

#[test]
fn sync_chain_and_direct_sync_are_equivalent() {
    let chain = sync_chain(3);
    let direct = conn(&["Sync A B"]);
    let report = check_equivalence(&chain, &direct, &opts(2)).unwrap();
    assert!(report.forward.holds());
    assert!(report.backward.holds());
    assert!(report.holds());
    assert_eq!(report.backward.quantified_ports, vec!["X1", "X2"]);
}

#[test]
fn fixed_seed_reproduces_the_sampled_query() {
    let concrete = conn(&["RdmSync A E", "Fifo1 E D", "Timert(1) E C", "SyncDrain D C", "Sync D B"]);
    let abstraction = conn(&["Fifo1 A D", "Timert(1) A C", "SyncDrain D C", "Sync D E", "RdmSync E B"]);
    let first = check_refinement(&concrete, &abstraction, &opts(2)).unwrap();
    let second = check_refinement(&concrete, &abstraction, &opts(2)).unwrap();
    assert_eq!(first.smt2, second.smt2);
    assert_eq!(first.verdict.label(), second.verdict.label());
}

#[test]
fn refines_trait_reports_holds_witness_and_diagnostic() {
    let sync = conn(&["Sync A B"]);
    let lossy = conn(&["LossySync A B"]);

    let outcome = sync.is_refinement_of(&lossy, 3).unwrap();
    assert!(outcome.holds);
    assert!(outcome.counterexample.is_none());
    assert!(outcome.unknown.is_none());
    assert!(outcome.diagnostic.ends_with("(check-sat)\n"));

    let outcome = lossy.is_refinement_of(&sync, 3).unwrap();
    assert!(!outcome.holds);
    assert!(outcome.counterexample.is_some());
}

#[test]
fn report_json_names_the_verdict() {
    let sync = conn(&["Sync A B"]);
    let fifo = conn(&["Fifo1 A B"]);
    let json = check_refinement(&fifo, &sync, &opts(2)).unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["verdict"], "counterexample");
    assert_eq!(value["ports"][0]["port"], "A");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn every_connector_refines_itself(conn in arb_connector(3)) {
        let report = check_refinement(&conn, &conn, &opts(2)).unwrap();
        prop_assert!(report.holds(), "{} did not refine itself: {:?}", conn, report.verdict);
    }

    #[test]
    fn sync_chains_refine_a_direct_sync(chain in arb_sync_chain(4)) {
        let direct = Connector::from_lines(["Sync A B"]).unwrap();
        prop_assert!(check_refinement(&chain, &direct, &opts(2)).unwrap().holds());
        prop_assert!(check_refinement(&direct, &chain, &opts(2)).unwrap().holds());
    }
}
