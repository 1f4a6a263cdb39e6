//! Hold-to-confirm controller
//!
//! Turns a sustained press into exactly one completion callback. Two
//! independent mechanisms drive completion: a progress ticker that
//! animates toward 1.0 over the configured duration, and a safety
//! timer armed slightly past it. Platform animation callbacks have
//! been observed to not fire; the timer covers that case, and the
//! session latch guarantees the two mechanisms never both win.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::feedback::{FeedbackKind, FeedbackSink};

use super::session::{HoldKind, HoldPhase, HoldSession};

/// Timing parameters for one controller
#[derive(Debug, Clone, Copy)]
pub struct HoldTimings {
    /// How long the press must be held
    pub duration: Duration,
    /// Safety timer fires at duration + margin
    pub safety_margin: Duration,
    /// Progress update interval
    pub tick: Duration,
    /// Progress decay time after an early release
    pub decay: Duration,
}

impl HoldTimings {
    pub fn from_millis(duration_ms: u64, safety_margin_ms: u64, tick_ms: u64, decay_ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(duration_ms),
            safety_margin: Duration::from_millis(safety_margin_ms),
            tick: Duration::from_millis(tick_ms),
            decay: Duration::from_millis(decay_ms),
        }
    }
}

impl Default for HoldTimings {
    fn default() -> Self {
        Self::from_millis(3000, 100, 16, 200)
    }
}

type CompletionFn = Box<dyn FnOnce() + Send + 'static>;

struct Inner {
    session: Option<HoldSession>,
    on_complete: Option<CompletionFn>,
    tasks: Vec<JoinHandle<()>>,
    /// Bumped on every start(); stale tasks check it and stand down
    generation: u64,
}

/// Press-hold/animate/confirm/cancel state machine for one action
///
/// Illegal calls (start while pressing, cancel while idle) are no-ops,
/// matching the forgiving nature of a touch gesture.
pub struct HoldToConfirmController {
    kind: HoldKind,
    timings: HoldTimings,
    feedback: Arc<dyn FeedbackSink>,
    inner: Arc<Mutex<Inner>>,
    progress: Arc<watch::Sender<f64>>,
}

impl HoldToConfirmController {
    pub fn new(kind: HoldKind, timings: HoldTimings, feedback: Arc<dyn FeedbackSink>) -> Self {
        let (progress, _rx) = watch::channel(0.0);
        Self {
            kind,
            timings,
            feedback,
            inner: Arc::new(Mutex::new(Inner {
                session: None,
                on_complete: None,
                tasks: Vec::new(),
                generation: 0,
            })),
            progress: Arc::new(progress),
        }
    }

    pub fn kind(&self) -> HoldKind {
        self.kind
    }

    /// Current session phase; Idle when no gesture is in progress
    pub fn phase(&self) -> HoldPhase {
        self.inner
            .lock()
            .map(|inner| inner.session.as_ref().map(|s| s.phase()).unwrap_or(HoldPhase::Idle))
            .unwrap_or(HoldPhase::Idle)
    }

    pub fn is_pressing(&self) -> bool {
        matches!(self.phase(), HoldPhase::Pressing)
    }

    /// Progress snapshot in [0, 1]
    pub fn progress(&self) -> f64 {
        *self.progress.borrow()
    }

    /// Watch channel for driving a progress indicator
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.progress.subscribe()
    }

    /// Begin a new hold session
    ///
    /// No-op if a session is already pressing (the UI shows the button
    /// as held). `on_complete` fires exactly once, from whichever of
    /// the ticker or the safety timer claims the session first.
    pub fn start<F>(&self, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let Ok(mut inner) = self.inner.lock() else { return };
            if inner.session.as_ref().is_some_and(|s| s.is_active()) {
                debug!(kind = %self.kind, "start ignored: session already active");
                return;
            }

            for task in inner.tasks.drain(..) {
                task.abort();
            }
            inner.generation += 1;
            let generation = inner.generation;
            inner.session = Some(HoldSession::new(self.kind));
            inner.on_complete = Some(Box::new(on_complete));
            self.progress.send_replace(0.0);

            let ticker = tokio::spawn(Self::animate(
                self.inner.clone(),
                self.progress.clone(),
                self.feedback.clone(),
                self.timings,
                generation,
            ));
            let safety = tokio::spawn(Self::safety_timer(
                self.inner.clone(),
                self.progress.clone(),
                self.feedback.clone(),
                self.timings,
                generation,
            ));
            inner.tasks.push(ticker);
            inner.tasks.push(safety);
        }

        debug!(kind = %self.kind, duration_ms = self.timings.duration.as_millis() as u64, "hold started");
        self.feedback.pulse(FeedbackKind::Started);
    }

    /// Release the press before completion
    ///
    /// Idempotent; does nothing once the session has completed. Emits
    /// a cancelled pulse only if progress had actually moved.
    pub fn cancel(&self) {
        let (progressed, generation) = {
            let Ok(mut inner) = self.inner.lock() else { return };
            let Some(session) = inner.session.as_mut() else { return };
            if !session.cancel() {
                return;
            }
            for task in inner.tasks.drain(..) {
                task.abort();
            }
            inner.on_complete = None;
            (*self.progress.borrow(), inner.generation)
        };

        debug!(kind = %self.kind, progressed, "hold cancelled");

        if progressed > 0.0 {
            self.feedback.pulse(FeedbackKind::Cancelled);
            let decay = tokio::spawn(Self::decay(
                self.inner.clone(),
                self.progress.clone(),
                self.timings,
                generation,
                progressed,
            ));
            if let Ok(mut inner) = self.inner.lock() {
                inner.tasks.push(decay);
            }
        } else {
            self.progress.send_replace(0.0);
        }
    }

    /// Drive progress toward 1.0, claiming completion when it arrives
    async fn animate(
        inner: Arc<Mutex<Inner>>,
        progress: Arc<watch::Sender<f64>>,
        feedback: Arc<dyn FeedbackSink>,
        timings: HoldTimings,
        generation: u64,
    ) {
        let started = Instant::now();
        loop {
            tokio::time::sleep(timings.tick).await;
            let value = (started.elapsed().as_secs_f64() / timings.duration.as_secs_f64()).min(1.0);

            let finished = {
                let Ok(guard) = inner.lock() else { return };
                if guard.generation != generation {
                    return;
                }
                let Some(session) = guard.session.as_ref() else { return };
                if !session.is_active() {
                    return;
                }
                progress.send_replace(value);
                value >= 1.0
            };

            if finished {
                Self::claim(&inner, &progress, &feedback, generation);
                return;
            }
        }
    }

    /// Fallback against the ticker's completion never arriving
    async fn safety_timer(
        inner: Arc<Mutex<Inner>>,
        progress: Arc<watch::Sender<f64>>,
        feedback: Arc<dyn FeedbackSink>,
        timings: HoldTimings,
        generation: u64,
    ) {
        tokio::time::sleep(timings.duration + timings.safety_margin).await;
        debug!("hold safety timer fired");
        Self::claim(&inner, &progress, &feedback, generation);
    }

    /// Claim completion; the session latch makes this first-wins
    fn claim(
        inner: &Arc<Mutex<Inner>>,
        progress: &Arc<watch::Sender<f64>>,
        feedback: &Arc<dyn FeedbackSink>,
        generation: u64,
    ) {
        let callback = {
            let Ok(mut guard) = inner.lock() else { return };
            if guard.generation != generation {
                return;
            }
            let Some(session) = guard.session.as_mut() else { return };
            if !session.try_complete() {
                debug!("completion already claimed; ignoring");
                return;
            }
            progress.send_replace(1.0);
            guard.on_complete.take()
        };

        feedback.pulse(FeedbackKind::Success);
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Animate progress back to zero after an early release
    async fn decay(
        inner: Arc<Mutex<Inner>>,
        progress: Arc<watch::Sender<f64>>,
        timings: HoldTimings,
        generation: u64,
        from: f64,
    ) {
        const STEPS: u32 = 8;
        let step = timings.decay / STEPS;
        for i in 1..=STEPS {
            tokio::time::sleep(step).await;
            let Ok(guard) = inner.lock() else { return };
            if guard.generation != generation {
                return;
            }
            let remaining = from * (1.0 - f64::from(i) / f64::from(STEPS));
            progress.send_replace(remaining.max(0.0));
            drop(guard);
        }
    }
}
