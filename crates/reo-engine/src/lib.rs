#![doc = include_str!("../README.md")]

//! Reo refinement engine.
//!
//! This crate runs bounded refinement queries between connectors: it picks
//! the solver backend, seeds probabilistic sampling, optionally dumps the
//! query, and turns models into readable witnesses.

pub mod counterexample;
pub mod pipeline;
pub mod refines;
pub mod result;

pub use counterexample::{format_witness, Witness};
pub use pipeline::{check_equivalence, check_refinement, EngineError, RefinementOptions, SolverChoice};
pub use refines::{RefinementOutcome, Refines};
pub use result::{EquivalenceReport, RefinementReport, Verdict};
