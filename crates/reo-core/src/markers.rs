//! Reserved data band and the control markers that live inside it.

use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// Data values in this closed interval never carry ordinary payload.
pub const RESERVED_BAND: RangeInclusive<i64> = 10..=20;

/// Control markers produced by timer and fault channels instead of payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Marker {
    #[serde(rename = "CORRUPTED")]
    Corrupted,
    #[serde(rename = "TIMEOUT")]
    Timeout,
    #[serde(rename = "OFF")]
    Off,
    #[serde(rename = "RESET")]
    Reset,
    #[serde(rename = "EXPIRE")]
    Expire,
}

impl Marker {
    pub const ALL: [Marker; 5] = [
        Marker::Corrupted,
        Marker::Timeout,
        Marker::Off,
        Marker::Reset,
        Marker::Expire,
    ];

    /// The integer code this marker occupies inside [`RESERVED_BAND`].
    pub const fn value(self) -> i64 {
        match self {
            Marker::Corrupted => 10,
            Marker::Timeout => 11,
            Marker::Off => 12,
            Marker::Reset => 13,
            Marker::Expire => 14,
        }
    }

    pub fn from_value(value: i64) -> Option<Marker> {
        Marker::ALL.into_iter().find(|m| m.value() == value)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Marker::Corrupted => "CORRUPTED",
            Marker::Timeout => "TIMEOUT",
            Marker::Off => "OFF",
            Marker::Reset => "RESET",
            Marker::Expire => "EXPIRE",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_reserved(value: i64) -> bool {
    RESERVED_BAND.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_live_inside_the_reserved_band() {
        for marker in Marker::ALL {
            assert!(is_reserved(marker.value()), "{marker} escapes the band");
        }
    }

    #[test]
    fn marker_codes_are_distinct_and_decodable() {
        for marker in Marker::ALL {
            assert_eq!(Marker::from_value(marker.value()), Some(marker));
        }
        assert_eq!(Marker::from_value(20), None);
        assert_eq!(Marker::from_value(3), None);
    }

    #[test]
    fn band_edges_are_inclusive() {
        assert!(is_reserved(10));
        assert!(is_reserved(20));
        assert!(!is_reserved(9));
        assert!(!is_reserved(21));
    }
}
