use serde::Serialize;

use crate::counterexample::Witness;

/// Answer to a single refinement query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Refines,
    Counterexample(Witness),
    /// Neither proved nor refuted; carries the solver's reason.
    Unknown { reason: String },
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Refines => "refines",
            Verdict::Counterexample(_) => "counterexample",
            Verdict::Unknown { .. } => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefinementReport {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub bound: usize,
    pub concrete_ports: Vec<String>,
    pub quantified_ports: Vec<String>,
    /// Number of top-level assertions in the query.
    pub assertions: usize,
    /// SMT-LIB2 text of the query.
    #[serde(skip_serializing)]
    pub smt2: String,
}

impl RefinementReport {
    /// True only when refinement was proved within the bound.
    pub fn holds(&self) -> bool {
        matches!(self.verdict, Verdict::Refines)
    }

    pub fn counterexample(&self) -> Option<&Witness> {
        match &self.verdict {
            Verdict::Counterexample(w) => Some(w),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Refinement checked in both directions.
#[derive(Debug, Clone, Serialize)]
pub struct EquivalenceReport {
    pub forward: RefinementReport,
    pub backward: RefinementReport,
}

impl EquivalenceReport {
    pub fn holds(&self) -> bool {
        self.forward.holds() && self.backward.holds()
    }
}
