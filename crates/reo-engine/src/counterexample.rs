use serde::Serialize;

use reo_core::Marker;
use reo_smt::encoder::variables::{data_var, time_var};
use reo_smt::solver::{Model, Rational};

/// A concrete connector run that the abstraction does not allow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Witness {
    pub ports: Vec<PortTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortTrace {
    pub port: String,
    pub events: Vec<PortEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortEvent {
    pub index: usize,
    /// `None` when the model has no value for this variable.
    pub time: Option<Rational>,
    pub data: Option<i64>,
    /// Set when `data` is a control marker code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

impl Witness {
    pub fn port(&self, name: &str) -> Option<&PortTrace> {
        self.ports.iter().find(|p| p.port == name)
    }
}

/// Extract the events of `ports` from a SAT model.
pub fn extract_witness(model: &Model, ports: &[String], bound: usize) -> Witness {
    let ports = ports
        .iter()
        .map(|port| {
            let events = (0..bound)
                .map(|i| {
                    let data = model.get_int(&data_var(port, i));
                    PortEvent {
                        index: i,
                        time: model.get_real(&time_var(port, i)),
                        data,
                        marker: data.and_then(Marker::from_value),
                    }
                })
                .collect();
            PortTrace {
                port: port.clone(),
                events,
            }
        })
        .collect();
    Witness { ports }
}

/// Format a witness as human-readable text.
pub fn format_witness(witness: &Witness) -> String {
    let mut out = String::new();
    out.push_str("Counterexample witness:\n");
    for trace in &witness.ports {
        out.push_str(&format!("  {}:\n", trace.port));
        for ev in &trace.events {
            let time = ev.time.map_or_else(|| "?".to_string(), |t| t.to_string());
            let data = match (ev.marker, ev.data) {
                (Some(marker), _) => marker.to_string(),
                (None, Some(d)) => d.to_string(),
                (None, None) => "?".to_string(),
            };
            out.push_str(&format!("    [{}] t={time} d={data}\n", ev.index));
        }
    }
    out
}
