//! Channel-line syntax: `Kind[(args)] port port ...`.
//!
//! Examples: `Sync A B`, `Fifo1e(1) F G`, `Fifone(3, 1, 2) A B`,
//! `MultiMerger B D E C`, `Timert(1) A D`, `RdmSync A E`.

use std::str::FromStr;

use crate::channel::{Channel, ChannelKind, DEFAULT_PROBABILITY};
use crate::errors::ConnectorError;

impl FromStr for Channel {
    type Err = ConnectorError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let name_end = line
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(line.len());
        let name = &line[..name_end];
        if name.is_empty() {
            return Err(ConnectorError::Parse(format!("missing channel kind in '{line}'")));
        }

        let rest = &line[name_end..];
        let (args, rest) = match rest.strip_prefix('(') {
            Some(inner) => {
                let close = inner
                    .find(')')
                    .ok_or_else(|| ConnectorError::Parse(format!("unclosed '(' in '{line}'")))?;
                (Some(&inner[..close]), &inner[close + 1..])
            }
            None => (None, rest),
        };
        let ports: Vec<&str> = rest.split_whitespace().collect();
        let args = args.map(split_args).unwrap_or_default();

        let kind = resolve_kind(name, &args, ports.len())?;
        Channel::new(kind, ports)
    }
}

fn split_args(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect()
}

fn resolve_kind(name: &str, args: &[&str], port_count: usize) -> Result<ChannelKind, ConnectorError> {
    let kind = match name {
        "Sync" | "FlowThrough" => no_args(name, args, ChannelKind::Sync)?,
        "SyncDrain" => no_args(name, args, ChannelKind::SyncDrain)?,
        "SyncSpout" => no_args(name, args, ChannelKind::SyncSpout)?,
        "AsynDrain" => no_args(name, args, ChannelKind::AsynDrain)?,
        "AsynSpout" => no_args(name, args, ChannelKind::AsynSpout)?,
        "Fifo1" => no_args(name, args, ChannelKind::Fifo1)?,
        "LossySync" => no_args(name, args, ChannelKind::LossySync)?,
        "Merger" => no_args(name, args, ChannelKind::Merger)?,
        "Fifo" | "Fifon" => ChannelKind::Fifo {
            capacity: single(name, args, parse_usize)?,
        },
        "Fifo1e" => ChannelKind::Fifo1e {
            preload: single(name, args, parse_i64)?,
        },
        "Fifone" => {
            let (first, preload) = args
                .split_first()
                .ok_or_else(|| missing(name, "capacity"))?;
            ChannelKind::FifoPreloaded {
                capacity: parse_usize(name, first)?,
                preload: preload
                    .iter()
                    .map(|a| parse_i64(name, a))
                    .collect::<Result<_, _>>()?,
            }
        }
        "Filter" | "Filterp" => ChannelKind::Filter {
            accept: all_i64(name, args)?,
        },
        "Producer" | "Producerp" => ChannelKind::Producer {
            values: all_i64(name, args)?,
        },
        "MultiMerger" => ChannelKind::MultiMerger {
            sources: optional(name, args, parse_usize)?.unwrap_or(port_count.saturating_sub(1)),
        },
        "Replicator" | "MultiReplicator" => ChannelKind::Replicator {
            sinks: optional(name, args, parse_usize)?.unwrap_or(port_count.saturating_sub(1)),
        },
        "Timer" | "Timert" => ChannelKind::Timer {
            duration: single(name, args, parse_u32)?,
        },
        "OFFTimer" | "OFFTimert" | "OffTimer" => ChannelKind::OffTimer {
            duration: single(name, args, parse_u32)?,
        },
        "RSTTimer" | "RSTTimert" | "ResetTimer" => ChannelKind::ResetTimer {
            duration: single(name, args, parse_u32)?,
        },
        "EXPTimer" | "EXPTimert" | "ExpireTimer" => ChannelKind::ExpireTimer {
            duration: single(name, args, parse_u32)?,
        },
        "CptSync" => ChannelKind::CptSync {
            p: probability(name, args)?,
        },
        "RdmSync" => ChannelKind::RdmSync {
            p: probability(name, args)?,
        },
        "ProbLossy" => ChannelKind::ProbLossy {
            p: probability(name, args)?,
        },
        "FaultyFifo1" => ChannelKind::FaultyFifo1 {
            p: probability(name, args)?,
        },
        other => return Err(ConnectorError::UnknownChannelKind(other.to_string())),
    };
    Ok(kind)
}

fn invalid(kind: &str, reason: String) -> ConnectorError {
    ConnectorError::InvalidParameter {
        kind: kind.to_string(),
        reason,
    }
}

fn missing(kind: &str, what: &str) -> ConnectorError {
    invalid(kind, format!("missing {what}"))
}

fn no_args(name: &str, args: &[&str], kind: ChannelKind) -> Result<ChannelKind, ConnectorError> {
    if args.is_empty() {
        Ok(kind)
    } else {
        Err(invalid(name, format!("takes no parameters, got {}", args.len())))
    }
}

fn optional<T>(
    name: &str,
    args: &[&str],
    parse: fn(&str, &str) -> Result<T, ConnectorError>,
) -> Result<Option<T>, ConnectorError> {
    match args {
        [] => Ok(None),
        [one] => parse(name, one).map(Some),
        _ => Err(invalid(name, format!("expects one parameter, got {}", args.len()))),
    }
}

fn single<T>(
    name: &str,
    args: &[&str],
    parse: fn(&str, &str) -> Result<T, ConnectorError>,
) -> Result<T, ConnectorError> {
    optional(name, args, parse)?.ok_or_else(|| missing(name, "parameter"))
}

fn all_i64(name: &str, args: &[&str]) -> Result<Vec<i64>, ConnectorError> {
    args.iter().map(|a| parse_i64(name, a)).collect()
}

fn probability(name: &str, args: &[&str]) -> Result<f64, ConnectorError> {
    Ok(optional(name, args, parse_f64)?.unwrap_or(DEFAULT_PROBABILITY))
}

fn parse_i64(name: &str, raw: &str) -> Result<i64, ConnectorError> {
    raw.parse()
        .map_err(|_| invalid(name, format!("'{raw}' is not an integer")))
}

fn parse_usize(name: &str, raw: &str) -> Result<usize, ConnectorError> {
    raw.parse()
        .map_err(|_| invalid(name, format!("'{raw}' is not a non-negative integer")))
}

fn parse_u32(name: &str, raw: &str) -> Result<u32, ConnectorError> {
    raw.parse()
        .map_err(|_| invalid(name, format!("'{raw}' is not a duration")))
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, ConnectorError> {
    raw.parse()
        .map_err(|_| invalid(name, format!("'{raw}' is not a probability")))
}
