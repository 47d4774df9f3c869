//! Randomized properties of connector encodings.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reo_core::proptest_generators::{arb_binary_channel, arb_connector};
use reo_core::Connector;
use reo_smt::backends::z3_backend::Z3Solver;
use reo_smt::encoder::encode_connector;
use reo_smt::solver::{SatResult, SmtSolver};
use reo_smt::sorts::SmtSort;

fn satisfiable(conn: &Connector, bound: usize) -> SatResult {
    let encoding = encode_connector(conn, bound, &mut StdRng::seed_from_u64(0));
    let mut solver = Z3Solver::new();
    for (name, sort) in &encoding.declarations {
        solver.declare_var(name, sort).unwrap();
    }
    for a in &encoding.assertions {
        solver.assert(a).unwrap();
    }
    solver.check_sat().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_port_gets_one_time_and_one_data_variable_per_event(
        conn in arb_connector(4),
        bound in 0..4usize,
    ) {
        let encoding = encode_connector(&conn, bound, &mut StdRng::seed_from_u64(1));
        let ports = conn.ports().len();
        prop_assert_eq!(encoding.declarations.len(), 2 * ports * bound);
        let reals = encoding
            .declarations
            .iter()
            .filter(|(_, sort)| *sort == SmtSort::Real)
            .count();
        prop_assert_eq!(reals, ports * bound);
        prop_assert_eq!(encoding.assertions.len(), conn.channels().len() + 1);
    }

    #[test]
    fn every_single_channel_has_a_behaviour(chan in arb_binary_channel(), bound in 1..4usize) {
        let mut conn = Connector::new();
        conn.push(chan);
        prop_assert_eq!(satisfiable(&conn, bound), SatResult::Sat);
    }
}
