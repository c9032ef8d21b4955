//! Remaining-time bookkeeping for one attempt.

/// What a single tick did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub remaining_secs: u32,
    /// The warning flag went from unset to set on this tick.
    pub warning_crossed: bool,
    /// The countdown reached zero on this tick.
    pub expired: bool,
}

/// Counts down whole seconds and latches a low-time warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u32,
    warning_threshold_secs: u32,
    warning: bool,
}

impl Countdown {
    /// Starts already warned when the duration is at or below the threshold.
    pub fn new(duration_secs: u32, warning_threshold_secs: u32) -> Self {
        Self {
            remaining_secs: duration_secs,
            warning_threshold_secs,
            warning: duration_secs <= warning_threshold_secs,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Once set, stays set for the rest of the attempt.
    pub fn warning(&self) -> bool {
        self.warning
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Remove one second, clamping at zero.
    pub fn tick(&mut self) -> TickOutcome {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        let warning_crossed = !self.warning && self.remaining_secs <= self.warning_threshold_secs;
        if warning_crossed {
            self.warning = true;
        }

        TickOutcome {
            remaining_secs: self.remaining_secs,
            warning_crossed,
            expired: self.remaining_secs == 0,
        }
    }
}

/// `MM:SS` with seconds always two digits. Minutes are not wrapped into hours.
pub fn format_remaining(remaining_secs: u32) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}
