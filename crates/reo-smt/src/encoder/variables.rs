//! Per-port symbolic sequences and the query-owned port table.
//!
//! Variable naming conventions:
//! - `<port>_t_<i>` (Real): time of the i-th event at `port`
//! - `<port>_d_<i>` (Int): data of the i-th event at `port`

use indexmap::IndexMap;

use reo_core::markers::{Marker, RESERVED_BAND};

use crate::sorts::SmtSort;
use crate::terms::{conjunction, disjunction, SmtTerm};

pub fn time_var(port: &str, i: usize) -> String {
    format!("{port}_t_{i}")
}

pub fn data_var(port: &str, i: usize) -> String {
    format!("{port}_d_{i}")
}

/// Term-level view of one port, used by the channel encoders.
#[derive(Debug, Clone, Copy)]
pub struct PortRef<'a>(&'a str);

impl<'a> PortRef<'a> {
    pub fn new(name: &'a str) -> Self {
        PortRef(name)
    }

    pub fn t(&self, i: usize) -> SmtTerm {
        SmtTerm::var(time_var(self.0, i))
    }

    pub fn d(&self, i: usize) -> SmtTerm {
        SmtTerm::var(data_var(self.0, i))
    }
}

/// How a port's variables enter the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Declared to the solver; part of any counterexample.
    Free,
    /// Bound by the universal quantifier of the refinement obligation.
    Quantified,
}

#[derive(Debug, Clone)]
pub struct PortVars {
    name: String,
    binding: Binding,
    carries_markers: bool,
}

impl PortVars {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn carries_markers(&self) -> bool {
        self.carries_markers
    }

    /// Time and data variables, interleaved per index.
    pub fn variables(&self, bound: usize) -> Vec<(String, SmtSort)> {
        (0..bound)
            .flat_map(|i| {
                [
                    (time_var(&self.name, i), SmtSort::Real),
                    (data_var(&self.name, i), SmtSort::Int),
                ]
            })
            .collect()
    }

    /// Structural invariant: non-negative, strictly increasing times and
    /// data outside the reserved band unless it is a control marker this
    /// port may carry.
    pub fn invariant(&self, bound: usize) -> SmtTerm {
        let port = PortRef::new(&self.name);
        let mut parts = Vec::with_capacity(bound * 2 + 1);
        if bound > 0 {
            parts.push(port.t(0).ge(SmtTerm::real(0)));
        }
        for i in 1..bound {
            parts.push(port.t(i - 1).lt(port.t(i)));
        }
        for i in 0..bound {
            let d = port.d(i);
            let mut allowed = vec![
                d.clone().lt(SmtTerm::int(*RESERVED_BAND.start())),
                d.clone().gt(SmtTerm::int(*RESERVED_BAND.end())),
            ];
            if self.carries_markers {
                allowed.extend(Marker::ALL.iter().map(|m| d.clone().eq(SmtTerm::int(m.value()))));
            }
            parts.push(disjunction(allowed));
        }
        conjunction(parts)
    }
}

/// Insertion-ordered port allocation for a single query.
///
/// The first allocation of a name wins: later requests for the same port
/// reuse its variables and binding.
#[derive(Debug, Clone)]
pub struct PortTable {
    bound: usize,
    ports: IndexMap<String, PortVars>,
}

impl PortTable {
    pub fn new(bound: usize) -> Self {
        Self {
            bound,
            ports: IndexMap::new(),
        }
    }

    /// Allocate `name` unless already present. Returns true on a fresh
    /// allocation.
    pub fn allocate(&mut self, name: &str, binding: Binding, carries_markers: bool) -> bool {
        if self.ports.contains_key(name) {
            return false;
        }
        self.ports.insert(
            name.to_string(),
            PortVars {
                name: name.to_string(),
                binding,
                carries_markers,
            },
        );
        true
    }

    #[cfg(test)]
    fn get(&self, name: &str) -> Option<&PortVars> {
        self.ports.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn with_binding(&self, binding: Binding) -> impl Iterator<Item = &PortVars> {
        self.ports.values().filter(move |p| p.binding == binding)
    }

    /// Solver declarations for every free port.
    pub fn free_variables(&self) -> Vec<(String, SmtSort)> {
        self.with_binding(Binding::Free)
            .flat_map(|p| p.variables(self.bound))
            .collect()
    }

    /// Quantifier bindings for every quantified port.
    pub fn quantified_variables(&self) -> Vec<(String, SmtSort)> {
        self.with_binding(Binding::Quantified)
            .flat_map(|p| p.variables(self.bound))
            .collect()
    }

    /// Conjunction of the invariants of ports with the given binding.
    pub fn invariants(&self, binding: Binding) -> SmtTerm {
        if self.bound == 0 {
            return SmtTerm::bool(true);
        }
        conjunction(
            self.with_binding(binding)
                .map(|p| p.invariant(self.bound))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_names_follow_port_and_index() {
        assert_eq!(time_var("A", 3), "A_t_3");
        assert_eq!(data_var("in_1", 0), "in_1_d_0");
        assert_eq!(PortRef::new("B").t(2), SmtTerm::var("B_t_2"));
    }

    #[test]
    fn first_allocation_wins() {
        let mut table = PortTable::new(2);
        assert!(table.allocate("A", Binding::Free, false));
        assert!(!table.allocate("A", Binding::Quantified, true));
        assert!(table.allocate("X", Binding::Quantified, false));

        let a = table.get("A").unwrap();
        assert_eq!(a.binding(), Binding::Free);
        assert!(!a.carries_markers());
        assert_eq!(
            table.free_variables(),
            vec![
                ("A_t_0".to_string(), SmtSort::Real),
                ("A_d_0".to_string(), SmtSort::Int),
                ("A_t_1".to_string(), SmtSort::Real),
                ("A_d_1".to_string(), SmtSort::Int),
            ]
        );
        assert_eq!(table.quantified_variables().len(), 4);
    }

    #[test]
    fn invariant_shape_depends_on_marker_permission() {
        let mut table = PortTable::new(1);
        table.allocate("P", Binding::Free, false);
        table.allocate("M", Binding::Free, true);
        let plain = table.get("P").unwrap().invariant(1);
        let marked = table.get("M").unwrap().invariant(1);
        // t >= 0 plus one data disjunction
        match (&plain, &marked) {
            (SmtTerm::And(p), SmtTerm::And(m)) => {
                assert_eq!(p.len(), 2);
                assert!(matches!(&p[1], SmtTerm::Or(ds) if ds.len() == 2));
                assert!(matches!(&m[1], SmtTerm::Or(ds) if ds.len() == 2 + Marker::ALL.len()));
            }
            other => panic!("unexpected invariant shape: {other:?}"),
        }
    }

    #[test]
    fn zero_bound_has_no_variables() {
        let mut table = PortTable::new(0);
        table.allocate("A", Binding::Free, false);
        assert!(table.free_variables().is_empty());
        assert_eq!(table.invariants(Binding::Free), SmtTerm::bool(true));
    }
}
