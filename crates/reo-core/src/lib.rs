#![doc = include_str!("../README.md")]

//! Reo connector data model.
//!
//! This crate defines the closed set of channel kinds, validated channel
//! instances, the `Connector` builder, the channel-line syntax, and the
//! reserved control-marker band shared by every encoding.

pub mod channel;
pub mod connector;
pub mod errors;
pub mod markers;
pub mod parse;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;

pub use channel::{Channel, ChannelKind};
pub use connector::Connector;
pub use errors::ConnectorError;
pub use markers::{Marker, RESERVED_BAND};
