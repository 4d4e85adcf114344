//! Threshold alarm evaluator.
//!
//! Runs after every recorded reading and decides, per variable, whether
//! the value crossed into or out of an alarm condition.  Each variable
//! keeps a `(low_active, high_active)` pair so the same alarm is never
//! raised twice in a row.
//!
//! ## Transition rules (per variable, in order)
//!
//! 1. `v < lo` and low inactive → raise LOW.
//! 2. else `v > hi` and high inactive → raise HIGH.
//! 3. `v > lo + hyst` and low active → clear low; NORMAL if high inactive.
//! 4. else `v < hi - hyst` and high active → clear high; NORMAL if low
//!    inactive.
//!
//! ```text
//!            v < lo                       v > lo + hyst
//!  Normal ────────────▶ Low ───────────────────────────▶ Normal
//!    │                                                      ▲
//!    │ v > hi                       v < hi - hyst           │
//!    └──────────────▶ High ─────────────────────────────────┘
//! ```
//!
//! Clearing needs the value to overshoot the bound by the hysteresis
//! margin, so a reading hovering at the bound does not flap.

use core::fmt;

use log::{info, warn};

use crate::profile::{ThresholdProfile, Thresholds};
use crate::reading_log::Reading;

/// The two monitored variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Temperature,
    Humidity,
}

impl Variable {
    pub const ALL: [Variable; 2] = [Variable::Temperature, Variable::Humidity];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    Low,
    High,
    Normal,
}

/// One alarm transition, fanned out to every recipient by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmEvent {
    pub variable: Variable,
    pub kind: AlarmKind,
}

/// Per-variable alarm flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmState {
    pub low_active: bool,
    pub high_active: bool,
}

impl AlarmState {
    pub fn is_active(&self) -> bool {
        self.low_active || self.high_active
    }
}

/// Alarm flags for both variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmStates {
    pub temperature: AlarmState,
    pub humidity: AlarmState,
}

impl AlarmStates {
    pub fn get(&self, variable: Variable) -> &AlarmState {
        match variable {
            Variable::Temperature => &self.temperature,
            Variable::Humidity => &self.humidity,
        }
    }

    fn get_mut(&mut self, variable: Variable) -> &mut AlarmState {
        match variable {
            Variable::Temperature => &mut self.temperature,
            Variable::Humidity => &mut self.humidity,
        }
    }
}

/// Apply the four transition rules to one variable.
///
/// At most one event can come out of a single call: entering an alarm
/// leaves that flag set, which suppresses the NORMAL of the opposite
/// exit rule.
pub fn evaluate_variable(value: f32, th: &Thresholds, state: &mut AlarmState) -> Option<AlarmKind> {
    let lo = th.min as f32;
    let hi = th.max as f32;
    let hyst = th.hysteresis as f32;
    let mut event = None;

    if value < lo && !state.low_active {
        state.low_active = true;
        event = Some(AlarmKind::Low);
    } else if value > hi && !state.high_active {
        state.high_active = true;
        event = Some(AlarmKind::High);
    }

    if value > lo + hyst && state.low_active {
        state.low_active = false;
        if !state.high_active {
            event = Some(AlarmKind::Normal);
        }
    } else if value < hi - hyst && state.high_active {
        state.high_active = false;
        if !state.low_active {
            event = Some(AlarmKind::Normal);
        }
    }

    event
}

/// Exit rules only, without the hysteresis margin.
pub fn recheck_variable(value: f32, th: &Thresholds, state: &mut AlarmState) -> Option<AlarmKind> {
    let lo = th.min as f32;
    let hi = th.max as f32;

    if value > lo && state.low_active {
        state.low_active = false;
        (!state.high_active).then_some(AlarmKind::Normal)
    } else if value < hi && state.high_active {
        state.high_active = false;
        (!state.low_active).then_some(AlarmKind::Normal)
    } else {
        None
    }
}

/// Alarm evaluator.  Owns the only mutable copy of the alarm flags.
#[derive(Debug, Default)]
pub struct AlarmEvaluator {
    states: AlarmStates,
}

impl AlarmEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a freshly recorded reading.
    ///
    /// Without a profile nothing is evaluated and no flags change.
    pub fn evaluate(
        &mut self,
        reading: &Reading,
        profile: Option<&ThresholdProfile>,
    ) -> Vec<AlarmEvent> {
        let Some(profile) = profile else {
            return Vec::new();
        };
        self.run(reading, profile, evaluate_variable)
    }

    /// Clear alarms the latest reading no longer justifies, ignoring the
    /// hysteresis band.  Never raises a new alarm.
    pub fn recheck(
        &mut self,
        latest: Option<&Reading>,
        profile: Option<&ThresholdProfile>,
    ) -> Vec<AlarmEvent> {
        match (latest, profile) {
            (Some(reading), Some(profile)) => self.run(reading, profile, recheck_variable),
            _ => Vec::new(),
        }
    }

    /// Current flags.  Pure read.
    pub fn states(&self) -> &AlarmStates {
        &self.states
    }

    fn run(
        &mut self,
        reading: &Reading,
        profile: &ThresholdProfile,
        rule: fn(f32, &Thresholds, &mut AlarmState) -> Option<AlarmKind>,
    ) -> Vec<AlarmEvent> {
        let mut events = Vec::new();
        for variable in Variable::ALL {
            let value = reading.value(variable);
            let state = self.states.get_mut(variable);
            if let Some(kind) = rule(value, profile.thresholds(variable), state) {
                match kind {
                    AlarmKind::Low | AlarmKind::High => {
                        warn!("ALARM SET: {kind:?} {variable} ({value:.2})");
                    }
                    AlarmKind::Normal => info!("ALARM CLEARED: {variable} ({value:.2})"),
                }
                events.push(AlarmEvent { variable, kind });
            }
        }
        events
    }
}
