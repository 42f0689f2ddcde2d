//! Header shrink on scroll.
//!
//! Past the threshold the header, jump links, search box and body all carry
//! the `navhide` class; at or below it they carry none.

use crate::dom::Dom;
use crate::error::DomError;
use tracing::debug;

pub const SHRINK_THRESHOLD: i64 = 94;
pub const SHRINK_CLASS: &str = "navhide";

/// `home` comes first: its class is the one read back as the current state.
pub const TRACKED_IDS: [&str; 4] = ["home", "jumplinks", "search", "body"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Expanded,
    Shrunk,
}

impl NavState {
    pub fn for_offset(offset: i64, threshold: i64) -> Self {
        if offset > threshold {
            NavState::Shrunk
        } else {
            NavState::Expanded
        }
    }

    fn class(self) -> &'static str {
        match self {
            NavState::Shrunk => SHRINK_CLASS,
            NavState::Expanded => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed(NavState),
    Unchanged(NavState),
}

impl Transition {
    pub fn state(self) -> NavState {
        match self {
            Transition::Changed(s) | Transition::Unchanged(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScrollShrink {
    threshold: i64,
}

impl Default for ScrollShrink {
    fn default() -> Self {
        Self::new(SHRINK_THRESHOLD)
    }
}

impl ScrollShrink {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    pub fn current_state(&self, dom: &impl Dom) -> Result<NavState, DomError> {
        let class = dom.class_name(TRACKED_IDS[0])?;
        Ok(if class == SHRINK_CLASS {
            NavState::Shrunk
        } else {
            NavState::Expanded
        })
    }

    /// Handles one scroll event. Writes only when the state flips, and only
    /// once every tracked element is known to exist.
    pub fn on_scroll(&self, dom: &mut impl Dom, offset: i64) -> Result<Transition, DomError> {
        let target = NavState::for_offset(offset, self.threshold);
        if self.current_state(&*dom)? == target {
            return Ok(Transition::Unchanged(target));
        }

        for id in &TRACKED_IDS[1..] {
            dom.class_name(id)?;
        }

        debug!(offset, state = ?target, "nav state change");
        for id in TRACKED_IDS {
            dom.set_class_name(id, target.class())?;
        }
        Ok(Transition::Changed(target))
    }
}
