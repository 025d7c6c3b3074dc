//! Unit tests for the daily scheduler

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use rsiwatch::core::scheduler::{
    Clock, CycleJob, DailySchedule, ScheduleMode, Scheduler, SchedulerConfig, SchedulerState,
};
use rsiwatch::error::CycleError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn target() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 46, 0).unwrap()
}

fn local(hour: u32, minute: u32) -> DateTime<Local> {
    let naive = NaiveDate::from_ymd_opt(2024, 3, 8)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap();
    Local.from_local_datetime(&naive).single().unwrap()
}

/// Frozen clock that records requested sleeps instead of sleeping.
#[derive(Clone)]
struct FakeClock {
    now: DateTime<Local>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl FakeClock {
    fn at(now: DateTime<Local>) -> Self {
        Self {
            now,
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        self.now
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

enum Behaviour {
    Succeed,
    Fail,
    Panic,
}

struct CountingJob {
    runs: AtomicUsize,
    behaviour: Behaviour,
}

impl CountingJob {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            runs: AtomicUsize::new(0),
            behaviour,
        }
    }
}

#[async_trait]
impl CycleJob for CountingJob {
    async fn run_cycle(&self) -> Result<(), CycleError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => Err(CycleError::Panicked("simulated failure".to_string())),
            Behaviour::Panic => panic!("boom"),
        }
    }
}

fn config(mode: ScheduleMode, loop_forever: bool) -> SchedulerConfig {
    SchedulerConfig {
        mode,
        loop_forever,
        cooldown: Duration::from_secs(60),
    }
}

#[test]
fn test_delay_rolls_to_tomorrow_when_target_passed() {
    let schedule = DailySchedule::new(target()).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 8, 10, 0, 0).unwrap();

    let next = schedule.next_after(&now).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 9, 9, 46, 0).unwrap());
    assert_eq!(schedule.delay_from(&now), Duration::from_secs(23 * 3600 + 46 * 60));
}

#[test]
fn test_delay_targets_later_today() {
    let schedule = DailySchedule::new(target()).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap();

    let next = schedule.next_after(&now).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 8, 9, 46, 0).unwrap());
    assert_eq!(schedule.delay_from(&now), Duration::from_secs(46 * 60));
}

#[test]
fn test_delay_at_exact_target_waits_a_full_day() {
    let schedule = DailySchedule::new(target()).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 8, 9, 46, 0).unwrap();
    assert_eq!(schedule.delay_from(&now), Duration::from_secs(86_400));
}

#[test]
fn test_delay_within_target_minute_rolls_over() {
    let schedule = DailySchedule::new(target()).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 8, 9, 46, 30).unwrap();
    assert_eq!(schedule.delay_from(&now), Duration::from_secs(86_400 - 30));
}

#[test]
fn test_transitions_daily_looping() {
    let clock = FakeClock::at(local(10, 0));
    let scheduler = Scheduler::with_clock(config(ScheduleMode::Daily(target()), true), clock.clone()).unwrap();

    assert_eq!(scheduler.next_state(SchedulerState::WaitingForSchedule), SchedulerState::Running);
    assert_eq!(scheduler.next_state(SchedulerState::Running), SchedulerState::Cooldown);
    assert_eq!(scheduler.next_state(SchedulerState::Cooldown), SchedulerState::WaitingForSchedule);
}

#[test]
fn test_transitions_immediate_looping_skip_cooldown() {
    let clock = FakeClock::at(local(10, 0));
    let scheduler = Scheduler::with_clock(config(ScheduleMode::Immediate, true), clock.clone()).unwrap();
    assert_eq!(scheduler.next_state(SchedulerState::Running), SchedulerState::WaitingForSchedule);
}

#[test]
fn test_transitions_without_loop_stop_after_run() {
    let clock = FakeClock::at(local(10, 0));
    for mode in [ScheduleMode::Immediate, ScheduleMode::Daily(target())] {
        let scheduler = Scheduler::with_clock(config(mode, false), clock.clone()).unwrap();
        assert_eq!(scheduler.next_state(SchedulerState::Running), SchedulerState::Stopped);
        assert_eq!(scheduler.next_state(SchedulerState::Stopped), SchedulerState::Stopped);
    }
}

#[tokio::test]
async fn test_immediate_run_once() {
    let clock = FakeClock::at(local(10, 0));
    let scheduler = Scheduler::with_clock(config(ScheduleMode::Immediate, false), clock.clone()).unwrap();
    let job = CountingJob::new(Behaviour::Succeed);

    let runs = scheduler.run(&job).await;

    assert_eq!(runs, 1);
    assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_daily_run_once_waits_for_target() {
    let clock = FakeClock::at(local(9, 0));
    let scheduler = Scheduler::with_clock(config(ScheduleMode::Daily(target()), false), clock.clone()).unwrap();
    let job = CountingJob::new(Behaviour::Succeed);

    let runs = scheduler.run(&job).await;

    assert_eq!(runs, 1);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(46 * 60)]);
}

#[tokio::test]
async fn test_failing_cycle_does_not_escape() {
    let clock = FakeClock::at(local(10, 0));
    let scheduler = Scheduler::with_clock(config(ScheduleMode::Daily(target()), false), clock.clone()).unwrap();
    let job = CountingJob::new(Behaviour::Fail);

    assert_eq!(scheduler.run(&job).await, 1);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(23 * 3600 + 46 * 60)]);
}

#[tokio::test]
async fn test_panicking_cycle_is_caught() {
    let clock = FakeClock::at(local(10, 0));
    let scheduler = Scheduler::with_clock(config(ScheduleMode::Immediate, false), clock.clone()).unwrap();
    let job = CountingJob::new(Behaviour::Panic);

    assert_eq!(scheduler.run(&job).await, 1);
    assert_eq!(job.runs.load(Ordering::SeqCst), 1);
}

/// Like `FakeClock`, but yields on every sleep so a looping scheduler can be cut off.
#[derive(Clone)]
struct YieldingClock(FakeClock);

#[async_trait]
impl Clock for YieldingClock {
    fn now(&self) -> DateTime<Local> {
        self.0.now()
    }

    async fn sleep(&self, duration: Duration) {
        self.0.sleep(duration).await;
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_failing_cycles_keep_the_daily_loop_running() {
    let clock = FakeClock::at(local(10, 0));
    let scheduler = Scheduler::with_clock(
        config(ScheduleMode::Daily(target()), true),
        YieldingClock(clock.clone()),
    )
    .unwrap();
    let job = CountingJob::new(Behaviour::Fail);

    let outcome = tokio::time::timeout(Duration::from_millis(100), scheduler.run(&job)).await;

    assert!(outcome.is_err(), "looping scheduler should never return");
    assert!(job.runs.load(Ordering::SeqCst) > 1);

    let sleeps = clock.sleeps();
    assert!(sleeps.len() >= 4);
    let wait = Duration::from_secs(23 * 3600 + 46 * 60);
    let cooldown = Duration::from_secs(60);
    for (i, slept) in sleeps.iter().enumerate() {
        let expected = if i % 2 == 0 { wait } else { cooldown };
        assert_eq!(*slept, expected, "sleep #{}", i);
    }
}

#[tokio::test]
async fn test_panicking_cycles_keep_the_daily_loop_running() {
    let clock = FakeClock::at(local(10, 0));
    let scheduler = Scheduler::with_clock(
        config(ScheduleMode::Daily(target()), true),
        YieldingClock(clock.clone()),
    )
    .unwrap();
    let job = CountingJob::new(Behaviour::Panic);

    let outcome = tokio::time::timeout(Duration::from_millis(100), scheduler.run(&job)).await;

    assert!(outcome.is_err());
    assert!(job.runs.load(Ordering::SeqCst) > 1);
    assert!(clock.sleeps().contains(&Duration::from_secs(60)));
}
