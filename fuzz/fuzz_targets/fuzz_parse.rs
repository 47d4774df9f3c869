#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Neither parser may panic on any input.
        let _ = s.parse::<reo_core::Channel>();
        if let Ok(conn) = s.parse::<reo_core::Connector>() {
            // Rendered connectors must parse back to the same channels.
            let again: reo_core::Connector = conn
                .to_string()
                .parse()
                .expect("rendered connector should parse");
            assert_eq!(conn, again);
            let _ = conn.marker_ports();
        }
    }
});
