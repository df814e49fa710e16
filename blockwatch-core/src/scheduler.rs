use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::PollingConfig;
use crate::error::{BlockwatchError, BlockwatchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEvent {
    /// Time to run a refresh cycle.
    Refresh,
    /// Display tick carrying the new value of the monotonic tick counter.
    Tick(u64),
}

/// Owns the refresh timer and the display tick timer.
///
/// The two timers are independent: a slow refresh never delays ticks.
/// Events go out over an unbounded channel so timers never block on the
/// consumer.
pub struct Scheduler {
    refresh_interval: Duration,
    tick_interval: Duration,
    events: mpsc::UnboundedSender<ScheduleEvent>,
    ticks: Arc<AtomicU64>,
    shutdown_tx: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(
        refresh_interval: Duration,
        tick_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ScheduleEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            refresh_interval,
            tick_interval,
            events,
            ticks: Arc::new(AtomicU64::new(0)),
            shutdown_tx: None,
            tasks: Vec::new(),
        };
        (scheduler, rx)
    }

    pub fn from_config(config: &PollingConfig) -> (Self, mpsc::UnboundedReceiver<ScheduleEvent>) {
        Self::new(config.refresh_interval(), config.tick_interval())
    }

    /// Spawns both timers. The first event of each fires one full period
    /// after start.
    pub fn start(&mut self) -> BlockwatchResult<()> {
        if self.is_running() {
            return Err(BlockwatchError::SchedulerAlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let refresh_events = self.events.clone();
        self.tasks.push(tokio::spawn(run_timer(
            self.refresh_interval,
            shutdown_rx.clone(),
            move || refresh_events.send(ScheduleEvent::Refresh).is_ok(),
        )));

        let tick_events = self.events.clone();
        let ticks = self.ticks.clone();
        self.tasks.push(tokio::spawn(run_timer(
            self.tick_interval,
            shutdown_rx,
            move || {
                let n = ticks.fetch_add(1, Ordering::SeqCst) + 1;
                tick_events.send(ScheduleEvent::Tick(n)).is_ok()
            },
        )));

        self.shutdown_tx = Some(shutdown_tx);
        info!(
            "Scheduler started (refresh every {:?}, tick every {:?})",
            self.refresh_interval, self.tick_interval
        );
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
            info!("Scheduler stopped");
        }
        self.tasks.clear();
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Emits a refresh event immediately, independent of the timer.
    pub fn fire_refresh(&self) -> bool {
        self.events.send(ScheduleEvent::Refresh).is_ok()
    }

    /// Advances the tick counter and emits the tick immediately.
    pub fn fire_tick(&self) -> u64 {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.events.send(ScheduleEvent::Tick(n));
        n
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Calls `fire` every `period` until shutdown or until `fire` reports the
/// receiver is gone.
async fn run_timer<F>(period: Duration, mut shutdown_rx: watch::Receiver<bool>, mut fire: F)
where
    F: FnMut() -> bool + Send + 'static,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !fire() {
                    debug!("Scheduler receiver dropped, timer exiting");
                    break;
                }
            }
            _ = shutdown_rx.changed() => {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<ScheduleEvent>) -> Vec<ScheduleEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_manual_ticks_without_runtime_timers() {
        let (scheduler, mut rx) =
            Scheduler::new(Duration::from_millis(2000), Duration::from_millis(1000));

        assert!(scheduler.fire_refresh());
        assert_eq!(scheduler.fire_tick(), 1);
        assert_eq!(scheduler.fire_tick(), 2);

        assert_eq!(
            drain(&mut rx),
            vec![
                ScheduleEvent::Refresh,
                ScheduleEvent::Tick(1),
                ScheduleEvent::Tick(2)
            ]
        );
        assert_eq!(scheduler.ticks(), 2);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_fire_independently() {
        let (mut scheduler, mut rx) =
            Scheduler::new(Duration::from_millis(2000), Duration::from_millis(1000));
        scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_millis(4500)).await;
        scheduler.stop();

        let events = drain(&mut rx);
        let refreshes = events
            .iter()
            .filter(|e| **e == ScheduleEvent::Refresh)
            .count();
        let ticks: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                ScheduleEvent::Tick(n) => Some(*n),
                _ => None,
            })
            .collect();

        assert_eq!(refreshes, 2);
        assert_eq!(ticks, vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_timers() {
        let (mut scheduler, mut rx) =
            Scheduler::new(Duration::from_millis(100), Duration::from_millis(100));
        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        scheduler.stop();
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(drain(&mut rx).is_empty());
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_fails_and_restart_works() {
        let (mut scheduler, _rx) = Scheduler::new(Duration::from_secs(2), Duration::from_secs(1));
        scheduler.start().unwrap();
        assert!(matches!(
            scheduler.start(),
            Err(BlockwatchError::SchedulerAlreadyRunning)
        ));

        scheduler.stop();
        assert!(scheduler.start().is_ok());
        assert!(scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_and_timer_ticks_share_counter() {
        let (mut scheduler, mut rx) =
            Scheduler::new(Duration::from_secs(60), Duration::from_millis(1000));
        assert_eq!(scheduler.fire_tick(), 1);
        scheduler.start().unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        scheduler.stop();

        assert_eq!(
            drain(&mut rx),
            vec![ScheduleEvent::Tick(1), ScheduleEvent::Tick(2)]
        );
    }
}
