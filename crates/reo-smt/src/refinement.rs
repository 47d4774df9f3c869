//! Bounded refinement query: does every behaviour of a concrete connector
//! satisfy an abstract one?
//!
//! Concrete ports are free. Ports only the abstraction names are universally
//! quantified, so the abstraction may constrain them however it likes. The
//! query asserts the concrete behaviour together with
//! `forall q. not (Ia and Phi_a)`; a model is a concrete run no choice of
//! hidden abstract behaviour can explain.

use rand::Rng;
use reo_core::Connector;
use tracing::{debug, info};

use crate::backends::smtlib_printer::to_smtlib_script;
use crate::encoder::variables::{Binding, PortTable};
use crate::encoder::{allocate_ports, encode_channels};
use crate::solver::{Model, SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Declarations and assertions for one refinement query.
#[derive(Debug, Clone)]
pub struct RefinementEncoding {
    pub bound: usize,
    /// Free variables (concrete ports), in port allocation order.
    pub declarations: Vec<(String, SmtSort)>,
    /// Concrete channel formulas, concrete invariants, then the violation.
    pub assertions: Vec<SmtTerm>,
    pub concrete_ports: Vec<String>,
    /// Ports named only by the abstraction.
    pub quantified_ports: Vec<String>,
}

impl RefinementEncoding {
    /// Self-contained SMT-LIB2 rendering of the query.
    pub fn to_smtlib_script(&self) -> String {
        to_smtlib_script(&self.declarations, &self.assertions)
    }
}

/// Outcome of a refinement query.
#[derive(Debug, Clone)]
pub enum RefinementResult {
    /// No concrete behaviour violates the abstraction within the bound.
    Refines,
    /// A concrete behaviour outside the abstraction.
    Counterexample { model: Model },
    /// The solver could not decide.
    Unknown { reason: String },
}

pub fn encode_refinement<R: Rng + ?Sized>(
    concrete: &Connector,
    abstraction: &Connector,
    bound: usize,
    rng: &mut R,
) -> RefinementEncoding {
    let mut table = PortTable::new(bound);
    let concrete_ports = allocate_ports(&mut table, concrete, Binding::Free);
    let quantified_ports = allocate_ports(&mut table, abstraction, Binding::Quantified);
    debug!(
        concrete = concrete_ports.len(),
        quantified = quantified_ports.len(),
        bound,
        "allocated refinement ports"
    );

    let phi_c = encode_channels(concrete, bound, rng);
    let inv_c = table.invariants(Binding::Free);
    let phi_a = encode_channels(abstraction, bound, rng);
    let inv_a = table.invariants(Binding::Quantified);

    let violation = SmtTerm::and(vec![inv_a, phi_a]).not();
    let qvars = table.quantified_variables();
    let violation = if qvars.is_empty() {
        violation
    } else {
        SmtTerm::forall(qvars, violation)
    };

    RefinementEncoding {
        bound,
        declarations: table.free_variables(),
        assertions: vec![phi_c, inv_c, violation],
        concrete_ports,
        quantified_ports,
    }
}

/// Submit `encoding` to `solver` and interpret the answer.
pub fn run_refinement<S: SmtSolver>(
    solver: &mut S,
    encoding: &RefinementEncoding,
) -> Result<RefinementResult, S::Error> {
    info!(bound = encoding.bound, "Refinement: checking");
    solver.reset()?;

    for (name, sort) in &encoding.declarations {
        solver.declare_var(name, sort)?;
    }
    for assertion in &encoding.assertions {
        solver.assert(assertion)?;
    }
    debug!(
        declarations = encoding.declarations.len(),
        assertions = encoding.assertions.len(),
        "query submitted"
    );

    let var_refs: Vec<(&str, &SmtSort)> = encoding
        .declarations
        .iter()
        .map(|(n, s)| (n.as_str(), s))
        .collect();

    match solver.check_sat_with_model(&var_refs)? {
        (SatResult::Unsat, _) => Ok(RefinementResult::Refines),
        (SatResult::Sat, Some(model)) => Ok(RefinementResult::Counterexample { model }),
        (SatResult::Sat, None) => Ok(RefinementResult::Unknown {
            reason: "solver reported sat without a model".into(),
        }),
        (SatResult::Unknown(reason), _) => Ok(RefinementResult::Unknown { reason }),
    }
}
