#![doc = include_str!("../README.md")]

//! SMT encoding and solver integration for Reo connectors.
//!
//! This crate turns channel instances into linear real/integer arithmetic
//! over per-port time and data sequences, and phrases bounded refinement
//! between two connectors as a single quantified satisfiability query with
//! pluggable Z3 and cvc5 backends.

pub mod backends;
pub mod encoder;
pub mod refinement;
pub mod solver;
pub mod sorts;
pub mod terms;
