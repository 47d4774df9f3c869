use miette::Diagnostic;
use thiserror::Error;

/// Malformed connector definitions. All variants are caller errors raised
/// while a channel or connector is being built; none are retried.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ConnectorError {
    #[error("Unknown channel kind '{0}'")]
    #[diagnostic(
        code(reo::connector::unknown_kind),
        help("known kinds: Sync, SyncDrain, SyncSpout, AsynDrain, AsynSpout, Fifo1, Fifo(n), Fifo1e(e), Fifone(n, e..), LossySync, Filter(p..), Producer(p..), Merger, MultiMerger, Replicator, Timer(t), OFFTimer(t), RSTTimer(t), EXPTimer(t), CptSync(p), RdmSync(p), ProbLossy(p), FaultyFifo1(p)")
    )]
    UnknownChannelKind(String),

    #[error("{kind} expects {expected} endpoints, found {found}")]
    #[diagnostic(code(reo::connector::arity))]
    ArityMismatch {
        kind: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid parameter for {kind}: {reason}")]
    #[diagnostic(code(reo::connector::parameter))]
    InvalidParameter { kind: String, reason: String },

    #[error("{kind} uses value {value}, which lies in the reserved control band")]
    #[diagnostic(
        code(reo::connector::reserved_value),
        help("payload constants must lie outside [10, 20]")
    )]
    ReservedValue { kind: String, value: i64 },

    #[error("Invalid port name '{0}'")]
    #[diagnostic(
        code(reo::connector::port_name),
        help("port names start with an ASCII letter or '_' and continue with letters, digits or '_'")
    )]
    InvalidPortName(String),

    #[error("Malformed channel line: {0}")]
    #[diagnostic(code(reo::connector::parse))]
    Parse(String),
}
