//! Channel kinds and validated channel instances.
//!
//! Every kind has a fixed endpoint arity. Endpoints are ordered with the
//! source end(s) first and the sink end last; drains and spouts simply have
//! two ends of the same polarity.

use serde::Serialize;
use std::fmt;

use crate::errors::ConnectorError;
use crate::markers::is_reserved;

/// Probability used when a sampled channel is written without one.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Closed set of channel kinds, each carrying its own parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelKind {
    Sync,
    SyncDrain,
    SyncSpout,
    AsynDrain,
    AsynSpout,
    Fifo1,
    /// Buffer of `capacity` slots.
    Fifo { capacity: usize },
    /// One-slot buffer holding `preload` initially.
    Fifo1e { preload: i64 },
    /// Buffer of `capacity` slots initially holding `preload` (front first).
    FifoPreloaded { capacity: usize, preload: Vec<i64> },
    LossySync,
    /// Forwards items whose value is in `accept`, drops the rest.
    Filter { accept: Vec<i64> },
    /// Emits values drawn from `values`, paced by the source end.
    Producer { values: Vec<i64> },
    Merger,
    MultiMerger { sources: usize },
    Replicator { sinks: usize },
    Timer { duration: u32 },
    OffTimer { duration: u32 },
    ResetTimer { duration: u32 },
    ExpireTimer { duration: u32 },
    /// Sync whose data is replaced by CORRUPTED with probability `p`.
    CptSync { p: f64 },
    /// Sync whose data is replaced by a different value with probability `p`.
    RdmSync { p: f64 },
    /// LossySync dropping each item with probability `p`.
    ProbLossy { p: f64 },
    /// Fifo1 corrupting each item with probability `p`.
    FaultyFifo1 { p: f64 },
}

impl ChannelKind {
    /// Number of endpoints this kind connects.
    pub fn arity(&self) -> usize {
        match self {
            ChannelKind::Merger => 3,
            ChannelKind::MultiMerger { sources } => sources + 1,
            ChannelKind::Replicator { sinks } => sinks + 1,
            _ => 2,
        }
    }

    /// Canonical kind name, as accepted by the channel-line parser.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelKind::Sync => "Sync",
            ChannelKind::SyncDrain => "SyncDrain",
            ChannelKind::SyncSpout => "SyncSpout",
            ChannelKind::AsynDrain => "AsynDrain",
            ChannelKind::AsynSpout => "AsynSpout",
            ChannelKind::Fifo1 => "Fifo1",
            ChannelKind::Fifo { .. } => "Fifo",
            ChannelKind::Fifo1e { .. } => "Fifo1e",
            ChannelKind::FifoPreloaded { .. } => "Fifone",
            ChannelKind::LossySync => "LossySync",
            ChannelKind::Filter { .. } => "Filter",
            ChannelKind::Producer { .. } => "Producer",
            ChannelKind::Merger => "Merger",
            ChannelKind::MultiMerger { .. } => "MultiMerger",
            ChannelKind::Replicator { .. } => "Replicator",
            ChannelKind::Timer { .. } => "Timer",
            ChannelKind::OffTimer { .. } => "OFFTimer",
            ChannelKind::ResetTimer { .. } => "RSTTimer",
            ChannelKind::ExpireTimer { .. } => "EXPTimer",
            ChannelKind::CptSync { .. } => "CptSync",
            ChannelKind::RdmSync { .. } => "RdmSync",
            ChannelKind::ProbLossy { .. } => "ProbLossy",
            ChannelKind::FaultyFifo1 { .. } => "FaultyFifo1",
        }
    }

    /// True for kinds whose formula depends on a random draw.
    pub fn is_sampled(&self) -> bool {
        matches!(
            self,
            ChannelKind::CptSync { .. }
                | ChannelKind::RdmSync { .. }
                | ChannelKind::ProbLossy { .. }
                | ChannelKind::FaultyFifo1 { .. }
        )
    }

    /// Endpoint pairs whose data values are copied from one to the other.
    pub fn data_links(&self) -> Vec<(usize, usize)> {
        match self {
            ChannelKind::Sync
            | ChannelKind::Fifo1
            | ChannelKind::Fifo { .. }
            | ChannelKind::Fifo1e { .. }
            | ChannelKind::FifoPreloaded { .. }
            | ChannelKind::LossySync
            | ChannelKind::Filter { .. }
            | ChannelKind::CptSync { .. }
            | ChannelKind::RdmSync { .. }
            | ChannelKind::ProbLossy { .. }
            | ChannelKind::FaultyFifo1 { .. } => vec![(0, 1)],
            ChannelKind::Merger => vec![(0, 2), (1, 2)],
            ChannelKind::MultiMerger { sources } => (0..*sources).map(|s| (s, *sources)).collect(),
            ChannelKind::Replicator { sinks } => (1..=*sinks).map(|k| (0, k)).collect(),
            ChannelKind::SyncDrain
            | ChannelKind::SyncSpout
            | ChannelKind::AsynDrain
            | ChannelKind::AsynSpout
            | ChannelKind::Producer { .. }
            | ChannelKind::Timer { .. }
            | ChannelKind::OffTimer { .. }
            | ChannelKind::ResetTimer { .. }
            | ChannelKind::ExpireTimer { .. } => Vec::new(),
        }
    }

    /// Endpoints this kind may write a control marker to (or read one from).
    pub fn marker_endpoints(&self) -> &'static [usize] {
        match self {
            ChannelKind::Timer { .. } | ChannelKind::CptSync { .. } | ChannelKind::FaultyFifo1 { .. } => &[1],
            ChannelKind::OffTimer { .. }
            | ChannelKind::ResetTimer { .. }
            | ChannelKind::ExpireTimer { .. } => &[0, 1],
            _ => &[],
        }
    }

    fn validate(&self) -> Result<(), ConnectorError> {
        let invalid = |reason: String| ConnectorError::InvalidParameter {
            kind: self.name().to_string(),
            reason,
        };
        let reserved = |value: i64| ConnectorError::ReservedValue {
            kind: self.name().to_string(),
            value,
        };
        match self {
            ChannelKind::Fifo { capacity } if *capacity == 0 => {
                Err(invalid("capacity must be at least 1".into()))
            }
            ChannelKind::Fifo1e { preload } if is_reserved(*preload) => Err(reserved(*preload)),
            ChannelKind::FifoPreloaded { capacity, preload } => {
                if *capacity == 0 {
                    return Err(invalid("capacity must be at least 1".into()));
                }
                if preload.len() > *capacity {
                    return Err(invalid(format!(
                        "{} preloaded items exceed capacity {capacity}",
                        preload.len()
                    )));
                }
                match preload.iter().find(|v| is_reserved(**v)) {
                    Some(v) => Err(reserved(*v)),
                    None => Ok(()),
                }
            }
            ChannelKind::Producer { values } => {
                if values.is_empty() {
                    return Err(invalid("value set must not be empty".into()));
                }
                match values.iter().find(|v| is_reserved(**v)) {
                    Some(v) => Err(reserved(*v)),
                    None => Ok(()),
                }
            }
            ChannelKind::MultiMerger { sources } if *sources < 2 => {
                Err(invalid(format!("needs at least 2 sources, got {sources}")))
            }
            ChannelKind::Replicator { sinks } if *sinks < 2 => {
                Err(invalid(format!("needs at least 2 sinks, got {sinks}")))
            }
            ChannelKind::Timer { duration }
            | ChannelKind::OffTimer { duration }
            | ChannelKind::ResetTimer { duration }
            | ChannelKind::ExpireTimer { duration }
                if *duration == 0 =>
            {
                Err(invalid("duration must be at least 1".into()))
            }
            ChannelKind::CptSync { p }
            | ChannelKind::RdmSync { p }
            | ChannelKind::ProbLossy { p }
            | ChannelKind::FaultyFifo1 { p }
                if !(0.0..=1.0).contains(p) =>
            {
                Err(invalid(format!("probability {p} is outside [0, 1]")))
            }
            _ => Ok(()),
        }
    }
}

fn join_values(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            ChannelKind::Fifo { capacity } => write!(f, "{name}({capacity})"),
            ChannelKind::Fifo1e { preload } => write!(f, "{name}({preload})"),
            ChannelKind::FifoPreloaded { capacity, preload } if preload.is_empty() => {
                write!(f, "{name}({capacity})")
            }
            ChannelKind::FifoPreloaded { capacity, preload } => {
                write!(f, "{name}({capacity}, {})", join_values(preload))
            }
            ChannelKind::Filter { accept: values } | ChannelKind::Producer { values } => {
                write!(f, "{name}({})", join_values(values))
            }
            ChannelKind::MultiMerger { sources: n } | ChannelKind::Replicator { sinks: n } => {
                write!(f, "{name}({n})")
            }
            ChannelKind::Timer { duration }
            | ChannelKind::OffTimer { duration }
            | ChannelKind::ResetTimer { duration }
            | ChannelKind::ExpireTimer { duration } => write!(f, "{name}({duration})"),
            ChannelKind::CptSync { p }
            | ChannelKind::RdmSync { p }
            | ChannelKind::ProbLossy { p }
            | ChannelKind::FaultyFifo1 { p } => write!(f, "{name}({p})"),
            _ => f.write_str(name),
        }
    }
}

/// A channel instance: a kind bound to its ordered endpoint ports.
///
/// Construction validates arity, parameters and port names, so downstream
/// encoders can index endpoints without further checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    kind: ChannelKind,
    endpoints: Vec<String>,
}

impl Channel {
    pub fn new<I, S>(kind: ChannelKind, endpoints: I) -> Result<Self, ConnectorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints: Vec<String> = endpoints.into_iter().map(Into::into).collect();
        kind.validate()?;
        if endpoints.len() != kind.arity() {
            return Err(ConnectorError::ArityMismatch {
                kind: kind.name().to_string(),
                expected: kind.arity(),
                found: endpoints.len(),
            });
        }
        if let Some(bad) = endpoints.iter().find(|p| !is_valid_port_name(p)) {
            return Err(ConnectorError::InvalidPortName(bad.clone()));
        }
        Ok(Self { kind, endpoints })
    }

    pub fn kind(&self) -> &ChannelKind {
        &self.kind
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.endpoints.join(" "))
    }
}

/// Port names become SMT-LIB simple symbols, which may not start with a digit.
pub fn is_valid_port_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
