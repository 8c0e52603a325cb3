use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PomodoroError {
    #[error("{0} duration must be > 0")]
    ZeroDuration(Phase),

    #[error("sessions before a long break must be > 0")]
    ZeroSessionsBeforeLongBreak,
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Phase lengths and the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    work: Duration,
    short_break: Duration,
    long_break: Duration,
    sessions_before_long_break: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work: Duration::from_secs(25 * 60),
            short_break: Duration::from_secs(5 * 60),
            long_break: Duration::from_secs(15 * 60),
            sessions_before_long_break: 4,
        }
    }
}

impl PomodoroConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `PomodoroError` if any duration or the long-break cadence is zero.
    pub fn new(
        work: Duration,
        short_break: Duration,
        long_break: Duration,
        sessions_before_long_break: u32,
    ) -> Result<Self, PomodoroError> {
        if work.is_zero() {
            return Err(PomodoroError::ZeroDuration(Phase::Work));
        }
        if short_break.is_zero() {
            return Err(PomodoroError::ZeroDuration(Phase::ShortBreak));
        }
        if long_break.is_zero() {
            return Err(PomodoroError::ZeroDuration(Phase::LongBreak));
        }
        if sessions_before_long_break == 0 {
            return Err(PomodoroError::ZeroSessionsBeforeLongBreak);
        }
        Ok(Self {
            work,
            short_break,
            long_break,
            sessions_before_long_break,
        })
    }

    #[must_use]
    pub fn work(&self) -> Duration {
        self.work
    }

    #[must_use]
    pub fn short_break(&self) -> Duration {
        self.short_break
    }

    #[must_use]
    pub fn long_break(&self) -> Duration {
        self.long_break
    }

    #[must_use]
    pub fn sessions_before_long_break(&self) -> u32 {
        self.sessions_before_long_break
    }

    #[must_use]
    pub fn duration_of(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Work => self.work,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
    }
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::ShortBreak => "short break",
            Phase::LongBreak => "long break",
        }
    }

    #[must_use]
    pub fn is_break(self) -> bool {
        !matches!(self, Phase::Work)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Emitted by [`Pomodoro::tick`] when a phase runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseCompleted {
    pub finished: Phase,
    pub next: Phase,
    pub completed_sessions: u32,
}

//
// ─── TIMER ─────────────────────────────────────────────────────────────────────
//

/// Work / break cycle driven by externally supplied ticks.
///
/// The timer owns no clock. A caller feeds elapsed time through [`tick`],
/// usually once per second while running.
///
/// [`tick`]: Pomodoro::tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pomodoro {
    config: PomodoroConfig,
    phase: Phase,
    remaining: Duration,
    running: bool,
    completed_sessions: u32,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new(PomodoroConfig::default())
    }
}

impl Pomodoro {
    #[must_use]
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            config,
            phase: Phase::Work,
            remaining: config.work,
            running: false,
            completed_sessions: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PomodoroConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    /// Work sessions finished in the current long-break cycle.
    #[must_use]
    pub fn completed_in_cycle(&self) -> u32 {
        self.completed_sessions % self.config.sessions_before_long_break
    }

    #[must_use]
    pub fn phase_duration(&self) -> Duration {
        self.config.duration_of(self.phase)
    }

    /// Elapsed share of the current phase in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let total = self.phase_duration();
        if total.is_zero() {
            return 0.0;
        }
        1.0 - self.remaining.as_secs_f64() / total.as_secs_f64()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Halt and rewind to a fresh work phase with no completed sessions.
    pub fn stop(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        self.remaining = self.config.work;
        self.completed_sessions = 0;
    }

    /// Jump to the next phase without counting the current one as done.
    pub fn skip_phase(&mut self) {
        self.advance_phase();
    }

    /// Replace the phase lengths and restart from a work phase.
    ///
    /// The completed-session count and the running flag are kept.
    pub fn update_config(&mut self, config: PomodoroConfig) {
        self.config = config;
        self.phase = Phase::Work;
        self.remaining = config.work;
    }

    /// Feed elapsed time into a running timer.
    ///
    /// Time is taken off the remaining duration. A tick that arrives once the
    /// phase is already at zero completes it and moves to the next phase.
    /// Ticks on a paused timer are ignored.
    pub fn tick(&mut self, elapsed: Duration) -> Option<PhaseCompleted> {
        if !self.running {
            return None;
        }
        if self.remaining.is_zero() {
            return Some(self.complete_phase());
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        None
    }

    fn complete_phase(&mut self) -> PhaseCompleted {
        let finished = self.phase;
        if finished == Phase::Work {
            self.completed_sessions = self.completed_sessions.saturating_add(1);
        }
        self.advance_phase();
        PhaseCompleted {
            finished,
            next: self.phase,
            completed_sessions: self.completed_sessions,
        }
    }

    fn advance_phase(&mut self) {
        self.phase = match self.phase {
            Phase::Work
                if self.completed_sessions > 0
                    && self.completed_sessions % self.config.sessions_before_long_break == 0 =>
            {
                Phase::LongBreak
            }
            Phase::Work => Phase::ShortBreak,
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };
        self.remaining = self.phase_duration();
    }
}

/// Render a countdown as `MM:SS`, or `H:MM:SS` from one hour up.
#[must_use]
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    fn short_config() -> PomodoroConfig {
        PomodoroConfig::new(
            Duration::from_secs(3),
            Duration::from_secs(1),
            Duration::from_secs(2),
            2,
        )
        .unwrap()
    }

    /// Tick one second at a time until a phase completes.
    fn run_phase(timer: &mut Pomodoro) -> PhaseCompleted {
        for _ in 0..10_000 {
            if let Some(done) = timer.tick(SECOND) {
                return done;
            }
        }
        panic!("phase never completed");
    }

    #[test]
    fn config_rejects_zero_values() {
        let err = PomodoroConfig::new(Duration::ZERO, SECOND, SECOND, 4).unwrap_err();
        assert_eq!(err, PomodoroError::ZeroDuration(Phase::Work));
        let err = PomodoroConfig::new(SECOND, SECOND, SECOND, 0).unwrap_err();
        assert_eq!(err, PomodoroError::ZeroSessionsBeforeLongBreak);
    }

    #[test]
    fn paused_timer_ignores_ticks() {
        let mut timer = Pomodoro::default();
        assert_eq!(timer.tick(SECOND), None);
        assert_eq!(timer.remaining(), Duration::from_secs(25 * 60));
        timer.toggle();
        assert!(timer.is_running());
        timer.tick(SECOND);
        assert_eq!(timer.remaining(), Duration::from_secs(25 * 60 - 1));
    }

    #[test]
    fn phase_completes_on_the_tick_after_zero() {
        let mut timer = Pomodoro::new(short_config());
        timer.start();
        for _ in 0..3 {
            assert_eq!(timer.tick(SECOND), None);
        }
        assert!(timer.remaining().is_zero());
        assert_eq!(timer.progress(), 1.0);
        let done = timer.tick(SECOND).unwrap();
        assert_eq!(done.finished, Phase::Work);
        assert_eq!(done.next, Phase::ShortBreak);
        assert_eq!(done.completed_sessions, 1);
        assert_eq!(timer.remaining(), Duration::from_secs(1));
    }

    #[test]
    fn long_break_after_configured_sessions() {
        let mut timer = Pomodoro::new(short_config());
        timer.start();
        let phases: Vec<Phase> = (0..6).map(|_| run_phase(&mut timer).next).collect();
        assert_eq!(
            phases,
            vec![
                Phase::ShortBreak,
                Phase::Work,
                Phase::LongBreak,
                Phase::Work,
                Phase::ShortBreak,
                Phase::Work,
            ]
        );
        assert_eq!(timer.completed_sessions(), 3);
        assert_eq!(timer.completed_in_cycle(), 1);
    }

    #[test]
    fn skip_does_not_count_work() {
        let mut timer = Pomodoro::new(short_config());
        timer.skip_phase();
        assert_eq!(timer.phase(), Phase::ShortBreak);
        assert_eq!(timer.completed_sessions(), 0);
        timer.skip_phase();
        assert_eq!(timer.phase(), Phase::Work);
    }

    #[test]
    fn stop_resets_everything() {
        let mut timer = Pomodoro::new(short_config());
        timer.start();
        run_phase(&mut timer);
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.completed_sessions(), 0);
        assert_eq!(timer.remaining(), Duration::from_secs(3));
    }

    #[test]
    fn update_config_restarts_work_phase() {
        let mut timer = Pomodoro::default();
        timer.skip_phase();
        timer.update_config(short_config());
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.remaining(), Duration::from_secs(3));
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(Duration::from_secs(25 * 60)), "25:00");
        assert_eq!(format_clock(Duration::from_secs(59)), "00:59");
        assert_eq!(format_clock(Duration::from_secs(3600 + 62)), "1:01:02");
    }
}
