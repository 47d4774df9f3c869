//! Proptest strategies for generating well-formed connectors.

use proptest::prelude::*;

use crate::channel::{Channel, ChannelKind};
use crate::connector::Connector;

const PORTS: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Strategy for one of a small, fixed pool of port names.
pub fn arb_port() -> impl Strategy<Value = String> {
    proptest::sample::select(PORTS.to_vec()).prop_map(str::to_string)
}

/// Strategy for the deterministic two-ended kinds.
pub fn arb_binary_kind() -> impl Strategy<Value = ChannelKind> {
    prop_oneof![
        Just(ChannelKind::Sync),
        Just(ChannelKind::Fifo1),
        Just(ChannelKind::LossySync),
        Just(ChannelKind::SyncDrain),
        (1..=3usize).prop_map(|capacity| ChannelKind::Fifo { capacity }),
        (1..=3u32).prop_map(|duration| ChannelKind::Timer { duration }),
    ]
}

/// Strategy for a channel with two distinct endpoints.
pub fn arb_binary_channel() -> impl Strategy<Value = Channel> {
    (arb_binary_kind(), arb_port(), arb_port())
        .prop_filter("endpoints must differ", |(_, a, b)| a != b)
        .prop_filter_map("channel must validate", |(kind, a, b)| {
            Channel::new(kind, [a, b]).ok()
        })
}

/// Strategy for a connector of 1..=`max_channels` deterministic channels.
pub fn arb_connector(max_channels: usize) -> impl Strategy<Value = Connector> {
    proptest::collection::vec(arb_binary_channel(), 1..=max_channels.max(1)).prop_map(|chans| {
        let mut conn = Connector::new();
        for chan in chans {
            conn.push(chan);
        }
        conn
    })
}

/// Strategy for a Sync chain `A -> X1 -> ... -> B` with `1..=max_hops` hops.
pub fn arb_sync_chain(max_hops: usize) -> impl Strategy<Value = Connector> {
    (1..=max_hops.max(1)).prop_map(sync_chain)
}

/// A Sync chain from `A` to `B` through `hops - 1` intermediate ports.
pub fn sync_chain(hops: usize) -> Connector {
    let mut names = vec!["A".to_string()];
    names.extend((1..hops).map(|i| format!("X{i}")));
    names.push("B".to_string());
    let mut conn = Connector::new();
    for pair in names.windows(2) {
        if let Ok(chan) = Channel::new(ChannelKind::Sync, [pair[0].clone(), pair[1].clone()]) {
            conn.push(chan);
        }
    }
    conn
}
