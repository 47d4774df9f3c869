//! Timers emit TIMEOUT a fixed delay after their source event. The control
//! variants additionally react to OFF, RESET or EXPIRE markers arriving on
//! the source before the deadline.

use reo_core::Marker;

use super::variables::PortRef;
use crate::terms::{conjunction, SmtTerm};

fn timeout() -> SmtTerm {
    SmtTerm::int(Marker::Timeout.value())
}

fn deadline(s: PortRef, i: usize, duration: u32) -> SmtTerm {
    s.t(i).add(SmtTerm::real(i64::from(duration)))
}

pub(super) fn timer(s: PortRef, k: PortRef, duration: u32, bound: usize) -> SmtTerm {
    let mut parts = Vec::with_capacity(bound * 3);
    for i in 0..bound {
        parts.push(k.d(i).eq(timeout()));
        parts.push(k.t(i).eq(deadline(s, i, duration)));
        if i + 1 < bound {
            // No new timer starts before the running one fires.
            parts.push(s.t(i + 1).ge(k.t(i)));
        }
    }
    conjunction(parts)
}

/// How a control timer reacts to its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Control {
    /// Cancel the running timer.
    Off,
    /// Restart the timer from the reset event.
    Reset,
    /// Fire immediately at the expire event.
    Expire,
}

impl Control {
    fn marker(self) -> Marker {
        match self {
            Control::Off => Marker::Off,
            Control::Reset => Marker::Reset,
            Control::Expire => Marker::Expire,
        }
    }
}

/// Timer started by source event `i`, next output at sink index `j`.
pub(super) fn control_timer(
    s: PortRef,
    k: PortRef,
    control: Control,
    duration: u32,
    i: usize,
    j: usize,
    bound: usize,
) -> SmtTerm {
    if i >= bound || j >= bound {
        return SmtTerm::bool(true);
    }

    let mut fire = vec![k.d(j).eq(timeout()), k.t(j).eq(deadline(s, i, duration))];
    if i + 1 < bound {
        fire.push(deadline(s, i, duration).le(s.t(i + 1)));
    }
    fire.push(control_timer(s, k, control, duration, i + 1, j + 1, bound));
    let fire = SmtTerm::and(fire);

    if i + 1 >= bound {
        return fire;
    }

    let mut interrupt = vec![
        s.d(i + 1).eq(SmtTerm::int(control.marker().value())),
        s.t(i + 1).lt(deadline(s, i, duration)),
    ];
    match control {
        Control::Off => interrupt.push(control_timer(s, k, control, duration, i + 2, j, bound)),
        Control::Reset => interrupt.push(control_timer(s, k, control, duration, i + 1, j, bound)),
        Control::Expire => {
            interrupt.push(k.d(j).eq(timeout()));
            interrupt.push(k.t(j).eq(s.t(i + 1)));
            interrupt.push(control_timer(s, k, control, duration, i + 2, j + 1, bound));
        }
    }
    SmtTerm::or(vec![fire, SmtTerm::and(interrupt)])
}
