//! Daily scheduler driving the alert cycle
//!
//! The loop is an explicit state machine:
//! `WaitingForSchedule -> Running -> Cooldown -> WaitingForSchedule`, ending in `Stopped`
//! when looping is disabled. Time is read and slept through [`Clock`] so the machine does
//! not depend on a particular runtime.

use crate::config::Config;
use crate::error::{ConfigError, CycleError};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime, TimeZone, Timelike};
use cron::Schedule;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

const ONE_DAY: Duration = Duration::from_secs(86_400);

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// One unit of scheduled work.
#[async_trait]
pub trait CycleJob: Send + Sync {
    async fn run_cycle(&self) -> Result<(), CycleError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleMode {
    /// Run as soon as the previous run finishes.
    Immediate,
    /// Run once a day at this wall-clock time.
    Daily(NaiveTime),
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub mode: ScheduleMode,
    pub loop_forever: bool,
    /// Pause after a daily run so the same target minute does not fire twice.
    pub cooldown: Duration,
}

impl SchedulerConfig {
    pub fn from_config(config: &Config) -> Self {
        let mode = if config.use_timer {
            ScheduleMode::Daily(config.schedule_time)
        } else {
            ScheduleMode::Immediate
        };
        Self {
            mode,
            loop_forever: config.loop_forever,
            cooldown: config.cooldown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    WaitingForSchedule,
    Running,
    Cooldown,
    Stopped,
}

/// Next occurrence of a fixed time of day.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    time: NaiveTime,
    schedule: Schedule,
}

impl DailySchedule {
    pub fn new(time: NaiveTime) -> Result<Self, ConfigError> {
        // sec min hour day-of-month month day-of-week
        let expr = format!("{} {} {} * * *", time.second(), time.minute(), time.hour());
        let schedule = Schedule::from_str(&expr).map_err(|e| ConfigError::Invalid {
            key: "SCHEDULE_TIME",
            value: time.format("%H:%M").to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { time, schedule })
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// First occurrence strictly after `now`; a time already reached today rolls to tomorrow.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(now).next()
    }

    pub fn delay_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        self.next_after(now)
            .and_then(|next| (next - now.clone()).to_std().ok())
            .unwrap_or(ONE_DAY)
    }
}

pub struct Scheduler<C: Clock = SystemClock> {
    config: SchedulerConfig,
    daily: Option<DailySchedule>,
    clock: C,
}

impl Scheduler<SystemClock> {
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn with_clock(config: SchedulerConfig, clock: C) -> Result<Self, ConfigError> {
        let daily = match config.mode {
            ScheduleMode::Daily(time) => Some(DailySchedule::new(time)?),
            ScheduleMode::Immediate => None,
        };
        Ok(Self {
            config,
            daily,
            clock,
        })
    }

    /// Transition after finishing the work of `state`. A failed run moves on exactly like a
    /// successful one.
    pub fn next_state(&self, state: SchedulerState) -> SchedulerState {
        match state {
            SchedulerState::WaitingForSchedule => SchedulerState::Running,
            SchedulerState::Running if !self.config.loop_forever => SchedulerState::Stopped,
            SchedulerState::Running if self.daily.is_some() => SchedulerState::Cooldown,
            SchedulerState::Running => SchedulerState::WaitingForSchedule,
            SchedulerState::Cooldown => SchedulerState::WaitingForSchedule,
            SchedulerState::Stopped => SchedulerState::Stopped,
        }
    }

    /// Drive `job` until the machine stops. Returns the number of runs; with looping
    /// enabled this never returns.
    pub async fn run<J: CycleJob + ?Sized>(&self, job: &J) -> u64 {
        let mut state = SchedulerState::WaitingForSchedule;
        let mut runs = 0u64;

        info!(
            mode = ?self.config.mode,
            loop_forever = self.config.loop_forever,
            "scheduler started"
        );

        loop {
            match state {
                SchedulerState::WaitingForSchedule => self.wait_for_schedule().await,
                SchedulerState::Running => {
                    runs += 1;
                    self.run_guarded(job).await;
                }
                SchedulerState::Cooldown => {
                    debug!(seconds = self.config.cooldown.as_secs(), "cooling down");
                    self.clock.sleep(self.config.cooldown).await;
                }
                SchedulerState::Stopped => break,
            }
            state = self.next_state(state);
        }

        info!(runs = runs, "scheduler stopped");
        runs
    }

    async fn wait_for_schedule(&self) {
        let Some(daily) = &self.daily else {
            return;
        };

        let delay = daily.delay_from(&self.clock.now());
        let secs = delay.as_secs_f64();
        info!(
            delay_seconds = secs,
            "waiting {:.2} seconds or {:.2} hours until next run at {}",
            secs,
            secs / 3600.0,
            daily.time().format("%H:%M")
        );
        self.clock.sleep(delay).await;
    }

    async fn run_guarded<J: CycleJob + ?Sized>(&self, job: &J) {
        match AssertUnwindSafe(job.run_cycle()).catch_unwind().await {
            Ok(Ok(())) => info!("cycle completed"),
            Ok(Err(e)) => error!(error = %e, "error during execution: {}", e),
            Err(panic) => {
                let e = CycleError::Panicked(panic_message(panic.as_ref()));
                error!(error = %e, "error during execution: {}", e);
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
