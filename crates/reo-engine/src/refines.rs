use reo_core::Connector;

use crate::counterexample::Witness;
use crate::pipeline::{check_refinement, EngineError, RefinementOptions};
use crate::result::Verdict;

/// Result of [`Refines::is_refinement_of`].
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    /// True only when refinement was proved within the bound.
    pub holds: bool,
    pub counterexample: Option<Witness>,
    /// SMT-LIB2 text of the query.
    pub diagnostic: String,
    /// Solver explanation when the query was left undecided.
    pub unknown: Option<String>,
}

/// Refinement checking as a method on connectors, using Z3 and default
/// options apart from the bound.
pub trait Refines {
    fn is_refinement_of(&self, abstraction: &Connector, bound: usize) -> Result<RefinementOutcome, EngineError>;
}

impl Refines for Connector {
    fn is_refinement_of(&self, abstraction: &Connector, bound: usize) -> Result<RefinementOutcome, EngineError> {
        let report = check_refinement(self, abstraction, &RefinementOptions::with_bound(bound))?;
        let holds = report.holds();
        let (counterexample, unknown) = match report.verdict {
            Verdict::Refines => (None, None),
            Verdict::Counterexample(witness) => (Some(witness), None),
            Verdict::Unknown { reason } => (None, Some(reason)),
        };
        Ok(RefinementOutcome {
            holds,
            counterexample,
            diagnostic: report.smt2,
            unknown,
        })
    }
}
