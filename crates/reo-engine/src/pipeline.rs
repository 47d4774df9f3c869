use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, warn};

use reo_core::Connector;
use reo_smt::backends::cvc5_backend::Cvc5Solver;
use reo_smt::backends::z3_backend::Z3Solver;
use reo_smt::refinement::{encode_refinement, run_refinement, RefinementEncoding, RefinementResult};

use crate::counterexample::extract_witness;
use crate::result::{EquivalenceReport, RefinementReport, Verdict};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid bound {0}: at least one event per port is required")]
    InvalidBound(usize),
    #[error("Solver error: {0}")]
    Solver(String),
    #[error("Could not write SMT dump to {path}: {source}")]
    Dump {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which solver backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverChoice {
    #[default]
    Z3,
    Cvc5,
}

/// Options for a refinement check.
#[derive(Debug, Clone)]
pub struct RefinementOptions {
    /// Events considered per port.
    pub bound: usize,
    pub solver: SolverChoice,
    /// Per-query solver timeout; 0 waits indefinitely.
    pub timeout_secs: u64,
    /// Seed for sampling probabilistic channels. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Write the SMT-LIB2 query to this path before solving.
    pub dump_smt: Option<String>,
}

impl Default for RefinementOptions {
    fn default() -> Self {
        Self {
            bound: 10,
            solver: SolverChoice::Z3,
            timeout_secs: 0,
            seed: None,
            dump_smt: None,
        }
    }
}

impl RefinementOptions {
    pub fn with_bound(bound: usize) -> Self {
        Self {
            bound,
            ..Self::default()
        }
    }
}

fn sampler(options: &RefinementOptions, connectors: [&Connector; 2]) -> StdRng {
    match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            let sampled = connectors
                .iter()
                .flat_map(|c| c.channels())
                .any(|chan| chan.kind().is_sampled());
            if sampled {
                warn!("sampling probabilistic channels without a fixed seed; the query is not reproducible");
            }
            StdRng::from_entropy()
        }
    }
}

fn dump_smt_to_file(path: &str, smt2: &str) -> Result<(), EngineError> {
    std::fs::write(path, smt2).map_err(|source| EngineError::Dump {
        path: path.to_string(),
        source,
    })?;
    info!("SMT dump written to {path}");
    Ok(())
}

fn solve(encoding: &RefinementEncoding, options: &RefinementOptions) -> Result<RefinementResult, EngineError> {
    match options.solver {
        SolverChoice::Z3 => {
            let mut solver = Z3Solver::with_timeout_secs(options.timeout_secs);
            run_refinement(&mut solver, encoding).map_err(|e| EngineError::Solver(e.to_string()))
        }
        SolverChoice::Cvc5 => {
            let mut solver = Cvc5Solver::with_timeout_secs(options.timeout_secs)
                .map_err(|e| EngineError::Solver(e.to_string()))?;
            run_refinement(&mut solver, encoding).map_err(|e| EngineError::Solver(e.to_string()))
        }
    }
}

/// Check whether every behaviour of `concrete` within `options.bound`
/// events per port is allowed by `abstraction`.
pub fn check_refinement(
    concrete: &Connector,
    abstraction: &Connector,
    options: &RefinementOptions,
) -> Result<RefinementReport, EngineError> {
    let bound = options.bound;
    if bound == 0 {
        return Err(EngineError::InvalidBound(bound));
    }
    info!(
        bound,
        concrete_channels = concrete.channels().len(),
        abstract_channels = abstraction.channels().len(),
        "Refinement check: start"
    );

    let mut rng = sampler(options, [concrete, abstraction]);
    let encoding = encode_refinement(concrete, abstraction, bound, &mut rng);
    let smt2 = encoding.to_smtlib_script();
    if let Some(path) = &options.dump_smt {
        dump_smt_to_file(path, &smt2)?;
    }

    let verdict = match solve(&encoding, options)? {
        RefinementResult::Refines => Verdict::Refines,
        RefinementResult::Counterexample { model } => {
            Verdict::Counterexample(extract_witness(&model, &encoding.concrete_ports, bound))
        }
        RefinementResult::Unknown { reason } => {
            warn!(%reason, "solver could not decide refinement");
            Verdict::Unknown { reason }
        }
    };
    info!(verdict = verdict.label(), "Refinement check: done");

    Ok(RefinementReport {
        verdict,
        bound,
        concrete_ports: encoding.concrete_ports,
        quantified_ports: encoding.quantified_ports,
        assertions: encoding.assertions.len(),
        smt2,
    })
}

/// Check refinement in both directions.
pub fn check_equivalence(
    left: &Connector,
    right: &Connector,
    options: &RefinementOptions,
) -> Result<EquivalenceReport, EngineError> {
    Ok(EquivalenceReport {
        forward: check_refinement(left, right, options)?,
        backward: check_refinement(right, left, options)?,
    })
}
