//! Connectors: ordered channel lists whose shared port names form the topology.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::channel::{Channel, ChannelKind};
use crate::errors::ConnectorError;

/// An ordered collection of channel instances.
///
/// Ports are introduced implicitly by the first channel that names them.
/// Two channels naming the same port share it; there is no other notion of
/// adjacency.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Connector {
    channels: Vec<Channel>,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fluent builder: validates and appends one channel.
    ///
    /// ```
    /// use reo_core::{ChannelKind, Connector};
    ///
    /// let conn = Connector::new()
    ///     .connect(ChannelKind::Sync, ["A", "B"])?
    ///     .connect(ChannelKind::Fifo1, ["B", "C"])?;
    /// assert_eq!(conn.ports(), vec!["A", "B", "C"]);
    /// # Ok::<(), reo_core::ConnectorError>(())
    /// ```
    pub fn connect<I, S>(mut self, kind: ChannelKind, endpoints: I) -> Result<Self, ConnectorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels.push(Channel::new(kind, endpoints)?);
        Ok(self)
    }

    pub fn push(&mut self, channel: Channel) {
        self.channels.push(channel);
    }

    /// Build a connector from channel lines such as `"Fifo1e(1) F G"`.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ConnectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut conn = Connector::new();
        for line in lines {
            conn.push(line.as_ref().parse()?);
        }
        Ok(conn)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Distinct port names in order of first reference.
    pub fn ports(&self) -> Vec<&str> {
        let mut seen = IndexSet::new();
        for chan in &self.channels {
            for port in chan.endpoints() {
                seen.insert(port.as_str());
            }
        }
        seen.into_iter().collect()
    }

    /// Ports that may legitimately hold a control marker.
    ///
    /// A port qualifies when some channel writes markers to it, or when it is
    /// data-linked (through any chain of data-copying channels) to such a port.
    pub fn marker_ports(&self) -> IndexSet<String> {
        let mut index: IndexMap<&str, usize> = IndexMap::new();
        for port in self.ports() {
            let next = index.len();
            index.insert(port, next);
        }
        let mut classes = DisjointSets::new(index.len());
        let mut seeds = Vec::new();

        for chan in &self.channels {
            let ends = chan.endpoints();
            for (a, b) in chan.kind().data_links() {
                classes.union(index[ends[a].as_str()], index[ends[b].as_str()]);
            }
            for &e in chan.kind().marker_endpoints() {
                seeds.push(index[ends[e].as_str()]);
            }
        }

        let marked: IndexSet<usize> = seeds.into_iter().map(|s| classes.find(s)).collect();
        index
            .iter()
            .filter(|(_, &id)| marked.contains(&classes.find(id)))
            .map(|(name, _)| (*name).to_string())
            .collect()
    }
}

impl FromStr for Connector {
    type Err = ConnectorError;

    /// One channel per line (or per `;`); blank lines and `#` comments are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Connector::from_lines(
            s.lines()
                .flat_map(|line| line.split(';'))
                .map(|line| line.split('#').next().unwrap_or("").trim())
                .filter(|line| !line.is_empty()),
        )
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chan) in self.channels.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{chan}")?;
        }
        Ok(())
    }
}

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}
