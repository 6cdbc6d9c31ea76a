use std::time::Duration;

/// Emission phase of one scheduler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadencePhase {
    /// Slow, minutes-scale cadence while the cluster looks healthy.
    Normal,
    /// Fast, seconds-scale cadence while any host looks unhealthy.
    Alert,
}

/// Outcome of one tick evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceDecision {
    /// Phase in effect for this tick's emission.
    pub phase: CadencePhase,
    /// Wait before the next tick.
    pub next_wait: Duration,
}

/// Two-phase cadence state machine with hysteresis.
///
/// - `Normal`: an unhealthy tick switches to `Alert` immediately; the same
///   tick already emits and the next wait uses the fast interval.
/// - `Alert`: leaving requires `hysteresis_intervals` *consecutive* clean
///   ticks; any unhealthy tick resets the streak to zero. The transition
///   fires on the final clean tick itself.
///
/// Pure state, no timers: the async loop owns the actual waiting.
#[derive(Debug)]
pub struct CadenceController {
    normal_interval: Duration,
    alert_interval: Duration,
    hysteresis_intervals: u32,
    phase: CadencePhase,
    clean_streak: u32,
}

impl CadenceController {
    pub fn new(
        normal_interval: Duration,
        alert_interval: Duration,
        hysteresis_intervals: u32,
    ) -> Self {
        Self {
            normal_interval,
            alert_interval,
            // at least one clean tick is required to leave Alert
            hysteresis_intervals: hysteresis_intervals.max(1),
            phase: CadencePhase::Normal,
            clean_streak: 0,
        }
    }

    pub fn phase(&self) -> CadencePhase {
        self.phase
    }

    pub fn clean_streak(&self) -> u32 {
        self.clean_streak
    }

    /// Wait interval of the current phase, without evaluating a tick.
    ///
    /// Used when a tick is skipped (tracker unavailable) and the previous
    /// cadence must be retained.
    pub fn current_wait(&self) -> Duration {
        match self.phase {
            CadencePhase::Normal => self.normal_interval,
            CadencePhase::Alert => self.alert_interval,
        }
    }

    /// Evaluates one tick's health observation and returns the phase to emit
    /// under plus the wait before the next tick.
    pub fn observe_tick(&mut self, unhealthy: bool) -> CadenceDecision {
        match self.phase {
            CadencePhase::Normal => {
                if unhealthy {
                    self.phase = CadencePhase::Alert;
                    self.clean_streak = 0;
                }
            }
            CadencePhase::Alert => {
                if unhealthy {
                    self.clean_streak = 0;
                } else {
                    self.clean_streak += 1;
                    if self.clean_streak >= self.hysteresis_intervals {
                        self.phase = CadencePhase::Normal;
                        self.clean_streak = 0;
                    }
                }
            }
        }

        CadenceDecision {
            phase: self.phase,
            next_wait: self.current_wait(),
        }
    }
}
