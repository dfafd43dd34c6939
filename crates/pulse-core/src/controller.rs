//! The generator control state machine.
//!
//! [`GeneratorController`] owns the generation state, the scheduling timer,
//! and the random source for payload synthesis. Commands mutate state under
//! a single lock; observer notification and broker publishing always happen
//! after the lock is released.
//!
//! # Timer lifecycle
//!
//! At most one timer task is armed at a time. Each armed timer carries an
//! epoch and a child [`CancellationToken`] of the controller's shutdown
//! token. Disarming cancels the token and clears the slot; a timer re-checks
//! that its epoch is still the armed one (under the lock) before it begins
//! a tick, so once `pause`, `stop`, or `set_interval` returns, no tick from
//! the previous timer can start. A tick that already passed the check runs
//! to completion, and its closing snapshot is taken after publishing, so it
//! reflects whatever state the controller is in by then.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pulse_types::{GeneratedMessage, GenerationError, GeneratorState, ObserverEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::notify::EventSink;
use crate::publish::{BrokerPublisher, PublishError};
use crate::synth;

/// Construction parameters for a [`GeneratorController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Interval used for the initial state and for starts without one.
    pub default_interval_ms: u64,
    /// Broker topic every tick publishes to.
    pub topic: String,
    /// Seed for payload synthesis. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl From<&GeneratorConfig> for ControllerSettings {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            default_interval_ms: config.default_interval_ms,
            topic: config.topic.clone(),
            seed: config.seed,
        }
    }
}

/// Drives periodic message generation and reports every change to an
/// [`EventSink`].
pub struct GeneratorController {
    inner: Arc<Inner>,
}

struct Inner {
    core: Mutex<Core>,
    publisher: Arc<dyn BrokerPublisher>,
    sink: Arc<dyn EventSink>,
    topic: String,
    default_interval_ms: u64,
    shutdown: CancellationToken,
}

/// Everything guarded by the controller lock.
struct Core {
    state: GeneratorState,
    epoch: u64,
    timer: Option<Timer>,
    rng: StdRng,
}

struct Timer {
    epoch: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl GeneratorController {
    /// Create a stopped controller.
    pub fn new(
        settings: ControllerSettings,
        publisher: Arc<dyn BrokerPublisher>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let rng = settings
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let core = Core {
            state: GeneratorState::new(settings.default_interval_ms),
            epoch: 0,
            timer: None,
            rng,
        };
        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(core),
                publisher,
                sink,
                topic: settings.topic,
                default_interval_ms: settings.default_interval_ms,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Interval applied when a start command carries none.
    pub fn default_interval_ms(&self) -> u64 {
        self.inner.default_interval_ms
    }

    /// Broker topic ticks publish to.
    pub fn topic(&self) -> &str {
        &self.inner.topic
    }

    /// Start generating every `interval_ms` milliseconds.
    ///
    /// No-op when already running. Otherwise arms the timer, emits
    /// `generator:started` and a snapshot, and performs one tick right away:
    /// that tick's counter increment is visible in the returned state, while
    /// its publish completes in the background.
    pub async fn start(&self, interval_ms: u64) -> GeneratorState {
        let (started, current, first, release) = {
            let mut core = self.inner.core.lock().await;
            if core.state.is_running {
                info!(interval_ms = core.state.interval_ms, "Generator already running");
                return core.state.clone();
            }
            if self.inner.shutdown.is_cancelled() {
                warn!("Start ignored: controller is closed");
                return core.state.clone();
            }

            core.state.is_running = true;
            core.state.interval_ms = interval_ms;
            core.state.last_message_time = Some(Utc::now());
            let started = core.state.clone();

            let first = core.next_message();
            let (release, gate) = oneshot::channel();
            self.inner.arm(&mut core, Some(gate));
            (started, core.state.clone(), first, release)
        };

        info!(interval_ms, "Generator started");
        self.inner.sink.emit(ObserverEvent::GeneratorStarted { interval_ms });
        self.inner
            .sink
            .emit(ObserverEvent::StateUpdated { state: started });
        // The timer task holds the first message until now, so observers
        // always see it after the start notification.
        if release.send(first).is_err() {
            debug!("Timer finished before the first tick was released");
        }
        current
    }

    /// Cancel the timer, keeping the counter and interval.
    pub async fn pause(&self) -> GeneratorState {
        let snapshot = {
            let mut core = self.inner.core.lock().await;
            if !core.state.is_running {
                debug!("Pause ignored: generator not running");
                return core.state.clone();
            }
            core.disarm();
            core.state.is_running = false;
            core.state.clone()
        };

        info!(message_count = snapshot.message_count, "Generator paused");
        self.inner.sink.emit(ObserverEvent::GeneratorPaused {});
        self.inner.sink.emit(ObserverEvent::StateUpdated {
            state: snapshot.clone(),
        });
        snapshot
    }

    /// Re-arm the timer with the stored interval.
    ///
    /// Unlike [`start`](Self::start) this does not tick immediately; the
    /// next message arrives one full interval later.
    pub async fn resume(&self) -> GeneratorState {
        let snapshot = {
            let mut core = self.inner.core.lock().await;
            if core.state.is_running {
                debug!("Resume ignored: generator already running");
                return core.state.clone();
            }
            if self.inner.shutdown.is_cancelled() {
                warn!("Resume ignored: controller is closed");
                return core.state.clone();
            }
            core.state.is_running = true;
            core.state.last_message_time = Some(Utc::now());
            self.inner.arm(&mut core, None);
            core.state.clone()
        };

        info!(interval_ms = snapshot.interval_ms, "Generator resumed");
        self.inner.sink.emit(ObserverEvent::GeneratorResumed {});
        self.inner.sink.emit(ObserverEvent::StateUpdated {
            state: snapshot.clone(),
        });
        snapshot
    }

    /// Cancel the timer and reset the counter. Always succeeds.
    pub async fn stop(&self) -> GeneratorState {
        let (snapshot, _) = self.halt(false).await;
        snapshot
    }

    /// Change the tick period.
    ///
    /// While running, the old timer is cancelled and a new one armed in the
    /// same critical section, so the next tick lands `interval_ms` after
    /// this call. Observers see the same events a pause followed by a resume
    /// would produce. Otherwise only the stored interval changes.
    pub async fn set_interval(&self, interval_ms: u64) -> GeneratorState {
        let (snapshot, rearmed) = {
            let mut core = self.inner.core.lock().await;
            core.state.interval_ms = interval_ms;
            let rearmed = core.state.is_running;
            if rearmed {
                core.disarm();
                core.state.last_message_time = Some(Utc::now());
                self.inner.arm(&mut core, None);
            }
            (core.state.clone(), rearmed)
        };

        info!(interval_ms, rearmed, "Generator interval updated");
        if rearmed {
            let paused = GeneratorState {
                is_running: false,
                ..snapshot.clone()
            };
            self.inner.sink.emit(ObserverEvent::GeneratorPaused {});
            self.inner
                .sink
                .emit(ObserverEvent::StateUpdated { state: paused });
            self.inner.sink.emit(ObserverEvent::GeneratorResumed {});
        }
        self.inner.sink.emit(ObserverEvent::StateUpdated {
            state: snapshot.clone(),
        });
        snapshot
    }

    /// Copy of the current state. Never waits on the timer or a publish.
    pub async fn get_state(&self) -> GeneratorState {
        self.inner.core.lock().await.state.clone()
    }

    /// Stop generating and wait for the timer task to exit.
    ///
    /// After `close`, start and resume are ignored.
    pub async fn close(&self) {
        let (_, task) = self.halt(true).await;
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Generator timer task ended abnormally: {e}");
            }
        }
        info!("Generator controller closed");
    }

    /// Shared body of [`stop`](Self::stop) and [`close`](Self::close).
    ///
    /// When `closing`, the shutdown token is cancelled while the lock is
    /// held, so no start or resume can slip in between the halt and the
    /// cancellation.
    async fn halt(&self, closing: bool) -> (GeneratorState, Option<JoinHandle<()>>) {
        let (snapshot, task) = {
            let mut core = self.inner.core.lock().await;
            if closing {
                self.inner.shutdown.cancel();
            }
            let task = core.disarm();
            core.state.is_running = false;
            core.state.message_count = 0;
            core.state.last_message_time = None;
            (core.state.clone(), task)
        };

        info!("Generator stopped");
        self.inner.sink.emit(ObserverEvent::GeneratorStopped {});
        self.inner.sink.emit(ObserverEvent::StateUpdated {
            state: snapshot.clone(),
        });
        (snapshot, task)
    }
}

impl Drop for GeneratorController {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

impl core::fmt::Debug for GeneratorController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeneratorController")
            .field("topic", &self.inner.topic)
            .field("default_interval_ms", &self.inner.default_interval_ms)
            .finish_non_exhaustive()
    }
}

impl Core {
    /// Advance the counter and synthesize the message for this tick.
    fn next_message(&mut self) -> GeneratedMessage {
        let now = Utc::now();
        self.state.message_count = self.state.message_count.saturating_add(1);
        self.state.last_message_time = Some(now);
        synth::synthesize(&mut self.rng, self.state.message_count, now)
    }

    /// Cancel the armed timer, if any.
    ///
    /// The task is not aborted: a tick already in flight finishes. The
    /// returned handle may be awaited or dropped to detach.
    fn disarm(&mut self) -> Option<JoinHandle<()>> {
        let timer = self.timer.take()?;
        timer.cancel.cancel();
        Some(timer.task)
    }
}

impl Inner {
    /// Spawn a timer for the current interval under a fresh epoch.
    ///
    /// `first`, when present, carries a message to publish before the
    /// periodic schedule begins.
    fn arm(
        self: &Arc<Self>,
        core: &mut Core,
        first: Option<oneshot::Receiver<GeneratedMessage>>,
    ) {
        core.epoch = core.epoch.wrapping_add(1);
        let epoch = core.epoch;
        let cancel = self.shutdown.child_token();
        // tokio intervals panic on a zero period.
        let period = Duration::from_millis(core.state.interval_ms.max(1));
        let task = tokio::spawn(Arc::clone(self).run_timer(epoch, period, cancel.clone(), first));
        debug!(epoch, period_ms = core.state.interval_ms, "Timer armed");
        core.timer = Some(Timer {
            epoch,
            cancel,
            task,
        });
    }

    async fn run_timer(
        self: Arc<Self>,
        epoch: u64,
        period: Duration,
        cancel: CancellationToken,
        first: Option<oneshot::Receiver<GeneratedMessage>>,
    ) {
        let now = Instant::now();
        let mut ticker = interval_at(now.checked_add(period).unwrap_or(now), period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if let Some(gate) = first {
            if let Ok(message) = gate.await {
                self.complete_tick(message).await;
            }
        }

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let Some(message) = self.begin_tick(epoch).await else {
                break;
            };
            self.complete_tick(message).await;
        }
        debug!(epoch, "Timer exited");
    }

    /// Claim a tick for `epoch`, or `None` if that timer is no longer armed.
    async fn begin_tick(&self, epoch: u64) -> Option<GeneratedMessage> {
        let mut core = self.core.lock().await;
        let armed = core.timer.as_ref().is_some_and(|t| t.epoch == epoch);
        if !core.state.is_running || !armed {
            return None;
        }
        Some(core.next_message())
    }

    /// Publish a claimed message and report the outcome.
    async fn complete_tick(&self, message: GeneratedMessage) {
        let message_id = message.id;
        let result = match serde_json::to_vec(&message) {
            Ok(payload) => self.publisher.publish(&self.topic, payload).await,
            Err(e) => Err(PublishError::Encode(e.to_string())),
        };

        match result {
            Ok(()) => {
                debug!(
                    message_id,
                    event_type = %message.event_type(),
                    topic = %self.topic,
                    "Message published"
                );
                self.sink.emit(ObserverEvent::MessageGenerated { message });
            }
            Err(e) => {
                warn!(message_id, topic = %self.topic, "Failed to publish message: {e}");
                self.sink.emit(ObserverEvent::ErrorOccurred {
                    error: GenerationError::publish_failed(message_id, e.to_string()),
                });
            }
        }

        let state = self.core.lock().await.state.clone();
        self.sink.emit(ObserverEvent::StateUpdated { state });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use futures::future::BoxFuture;
    use pulse_types::ErrorKind;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        events: std::sync::Mutex<Vec<ObserverEvent>>,
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: ObserverEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl RecordingSink {
        fn events(&self) -> Vec<ObserverEvent> {
            self.events.lock().unwrap().clone()
        }

        fn names(&self) -> Vec<&'static str> {
            self.events().iter().map(ObserverEvent::name).collect()
        }

        fn generated_ids(&self) -> Vec<u64> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    ObserverEvent::MessageGenerated { message } => Some(message.id),
                    _ => None,
                })
                .collect()
        }

        fn errors(&self) -> Vec<GenerationError> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    ObserverEvent::ErrorOccurred { error } => Some(error),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, name: &str) -> usize {
            self.names().iter().filter(|n| **n == name).count()
        }

        fn clear(&self) {
            self.events.lock().unwrap().clear();
        }
    }

    /// Publisher that optionally delays and fails one specific call.
    #[derive(Default)]
    struct FakePublisher {
        calls: AtomicU64,
        fail_on_call: Option<u64>,
        delay: Duration,
    }

    impl BrokerPublisher for FakePublisher {
        fn publish<'a>(
            &'a self,
            topic: &'a str,
            _payload: Vec<u8>,
        ) -> BoxFuture<'a, Result<(), PublishError>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst).saturating_add(1);
            let fail = self.fail_on_call == Some(call);
            let delay = self.delay;
            Box::pin(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if fail {
                    Err(PublishError::Rejected {
                        topic: topic.to_owned(),
                        reason: "broker down".to_owned(),
                    })
                } else {
                    Ok(())
                }
            })
        }
    }

    fn controller_with(publisher: FakePublisher) -> (GeneratorController, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let settings = ControllerSettings {
            default_interval_ms: 5000,
            topic: "my-topic".to_owned(),
            seed: Some(42),
        };
        let controller = GeneratorController::new(settings, Arc::new(publisher), sink.clone());
        (controller, sink)
    }

    fn controller() -> (GeneratorController, Arc<RecordingSink>) {
        controller_with(FakePublisher::default())
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn initial_state_uses_default_interval() {
        let (controller, _) = controller();
        let state = controller.get_state().await;
        assert!(!state.is_running);
        assert_eq!(state.interval_ms, 5000);
        assert_eq!(state.message_count, 0);
        assert!(state.last_message_time.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn start_ticks_immediately() {
        let (controller, _) = controller();
        let returned = controller.start(1000).await;
        assert!(returned.is_running);
        assert_eq!(returned.message_count, 1);
        assert_eq!(controller.get_state().await.message_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_notifies_before_first_message() {
        let (controller, sink) = controller();
        controller.start(1000).await;
        advance(10).await;
        assert_eq!(
            sink.names(),
            [
                "generator:started",
                "generator:stateUpdated",
                "message:generated",
                "generator:stateUpdated",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_for_three_and_a_half_intervals_then_stop() {
        let (controller, sink) = controller();
        controller.start(1000).await;
        advance(3500).await;

        assert_eq!(sink.generated_ids(), [1, 2, 3, 4]);
        assert_eq!(controller.get_state().await.message_count, 4);

        let stopped = controller.stop().await;
        assert!(!stopped.is_running);
        assert_eq!(stopped.message_count, 0);
        assert!(stopped.last_message_time.is_none());

        advance(3000).await;
        assert_eq!(sink.generated_ids().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let (controller, sink) = controller();
        controller.start(1000).await;
        let first = controller.stop().await;
        let second = controller.stop().await;
        assert_eq!(first, second);
        assert_eq!(second.message_count, 0);
        assert!(!second.is_running);
        assert_eq!(sink.count("generator:stopped"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_is_a_no_op() {
        let (controller, sink) = controller();
        controller.start(1000).await;
        let again = controller.start(200).await;
        assert_eq!(again.interval_ms, 1000);
        assert_eq!(sink.count("generator:started"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn racing_starts_arm_a_single_timer() {
        let (controller, sink) = controller();
        tokio::join!(
            controller.start(1000),
            controller.start(1000),
            controller.start(1000),
        );
        advance(2500).await;
        assert_eq!(sink.count("generator:started"), 1);
        assert_eq!(sink.generated_ids(), [1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_halts_ticks_and_keeps_count() {
        let (controller, sink) = controller();
        controller.start(500).await;
        advance(1200).await;
        let paused = controller.pause().await;
        assert!(!paused.is_running);
        assert_eq!(paused.message_count, 3);

        advance(3000).await;
        assert_eq!(sink.generated_ids().len(), 3);
        assert_eq!(controller.get_state().await.message_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_when_stopped_is_a_no_op() {
        let (controller, sink) = controller();
        let state = controller.pause().await;
        assert!(!state.is_running);
        assert!(sink.names().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn resume_waits_a_full_interval() {
        let (controller, sink) = controller();
        controller.start(1000).await;
        advance(1500).await;
        controller.pause().await;
        advance(5000).await;

        let resumed = controller.resume().await;
        assert!(resumed.is_running);
        assert_eq!(resumed.message_count, 2);

        advance(900).await;
        assert_eq!(controller.get_state().await.message_count, 2);
        advance(200).await;
        assert_eq!(controller.get_state().await.message_count, 3);
        assert_eq!(sink.generated_ids(), [1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_from_stopped_runs_without_immediate_tick() {
        let (controller, sink) = controller();
        let resumed = controller.resume().await;
        assert!(resumed.is_running);
        assert_eq!(resumed.interval_ms, 5000);
        assert_eq!(resumed.message_count, 0);
        advance(5100).await;
        assert_eq!(sink.generated_ids(), [1]);
    }

    #[tokio::test(start_paused = true)]
    async fn set_interval_reschedules_next_tick() {
        let (controller, sink) = controller();
        controller.start(1000).await;
        advance(500).await;
        sink.clear();

        let state = controller.set_interval(3000).await;
        assert!(state.is_running);
        assert_eq!(state.interval_ms, 3000);
        assert_eq!(
            sink.names(),
            [
                "generator:paused",
                "generator:stateUpdated",
                "generator:resumed",
                "generator:stateUpdated",
            ]
        );

        advance(2900).await;
        assert_eq!(controller.get_state().await.message_count, 1);
        advance(200).await;
        assert_eq!(controller.get_state().await.message_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn set_interval_while_stopped_only_stores() {
        let (controller, sink) = controller();
        let state = controller.set_interval(2000).await;
        assert!(!state.is_running);
        assert_eq!(state.interval_ms, 2000);
        assert_eq!(sink.names(), ["generator:stateUpdated"]);

        advance(5000).await;
        assert!(sink.generated_ids().is_empty());
        assert_eq!(controller.resume().await.interval_ms, 2000);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_publish_reports_error_and_generation_continues() {
        let (controller, sink) = controller_with(FakePublisher {
            fail_on_call: Some(2),
            ..FakePublisher::default()
        });
        controller.start(1000).await;
        advance(2500).await;

        assert_eq!(sink.generated_ids(), [1, 3]);
        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        let error = errors.first().unwrap();
        assert_eq!(error.kind, ErrorKind::MessageGenerationError);
        assert_eq!(error.message_id, Some(2));
        assert_eq!(controller.get_state().await.message_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_tick_finishes_with_post_stop_snapshot() {
        let (controller, sink) = controller_with(FakePublisher {
            delay: Duration::from_millis(500),
            ..FakePublisher::default()
        });
        controller.start(1000).await;
        advance(100).await;
        controller.stop().await;
        advance(2000).await;

        assert_eq!(sink.generated_ids(), [1]);
        let state = match sink.events().pop() {
            Some(ObserverEvent::StateUpdated { state }) => Some(state),
            _ => None,
        }
        .unwrap();
        assert!(!state.is_running);
        assert_eq!(state.message_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_does_not_panic() {
        let (controller, sink) = controller();
        controller.start(0).await;
        advance(3).await;
        controller.stop().await;
        assert!(!sink.generated_ids().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn close_stops_and_rejects_restart() {
        let (controller, sink) = controller();
        controller.start(1000).await;
        controller.close().await;

        let state = controller.start(1000).await;
        assert!(!state.is_running);
        assert_eq!(state.message_count, 0);
        assert_eq!(sink.count("generator:started"), 1);
        assert!(!controller.resume().await.is_running);
    }

    /// Sink that blocks the emitting thread once `generator:stopped` fires.
    struct StallOnStopSink {
        reached: tokio::sync::mpsc::UnboundedSender<()>,
        stall: Duration,
    }

    impl EventSink for StallOnStopSink {
        fn emit(&self, event: ObserverEvent) {
            if matches!(event, ObserverEvent::GeneratorStopped {}) {
                let _ = self.reached.send(());
                std::thread::sleep(self.stall);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn start_during_close_is_ignored() {
        let (reached, mut stopping) = tokio::sync::mpsc::unbounded_channel();
        let sink = Arc::new(StallOnStopSink {
            reached,
            stall: Duration::from_millis(200),
        });
        let settings = ControllerSettings {
            default_interval_ms: 5000,
            topic: "my-topic".to_owned(),
            seed: Some(7),
        };
        let controller = Arc::new(GeneratorController::new(
            settings,
            Arc::new(FakePublisher::default()),
            sink,
        ));

        let closing = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.close().await }
        });
        // close() has halted and is still notifying observers.
        stopping.recv().await.unwrap();

        let raced = controller.start(100).await;
        assert!(!raced.is_running);

        closing.await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let state = controller.get_state().await;
        assert!(!state.is_running);
        assert_eq!(state.message_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_are_copies() {
        let (controller, _) = controller();
        let before = controller.get_state().await;
        controller.start(1000).await;
        assert!(!before.is_running);
        assert_eq!(before.message_count, 0);
    }
}
