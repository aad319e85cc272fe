//! The canonical submission cycle.
//!
//! One orchestrator instance owns the mode registry, the generation counter,
//! the timer, and the renderer; collaborators never mutate shared state
//! themselves. The in-flight network call is never aborted: supersession
//! (a new submission, or a mode switch) bumps the generation token and the
//! stale result is discarded when it finally resolves.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use log::{debug, error, info};
use tokio::sync::mpsc;

use crate::core::generation::GenerationCounter;
use crate::features::dispatch::{Query, QueryDispatcher, RequestOutcome};
use crate::features::modes::{Mode, ModeRegistry};
use crate::features::timer::{ElapsedTimer, TimerHandle};
use crate::features::typewriter::{Playback, TypewriterRenderer};

use super::state::{OrchestrationState, OrchestratorError};

type Subscriber = Arc<dyn Fn(&OrchestrationState) + Send + Sync>;

struct Inner {
    registry: ModeRegistry,
    state: OrchestrationState,
    subscribers: Vec<Subscriber>,
    timer_handle: Option<TimerHandle>,
}

/// State machine driving one submission at a time from `Idle` through
/// `Pending`, `Rendering`, and `Done`.
pub struct QueryOrchestrator {
    inner: Mutex<Inner>,
    /// Held across every token check, state write, and the subscriber
    /// delivery that follows it. The `inner` guard alone is not enough: it
    /// drops before `notify`, and in that window a tick snapshot taken for
    /// a superseded generation could be delivered after the newer
    /// generation's own snapshot.
    publish_order: Mutex<()>,
    generation: GenerationCounter,
    timer: ElapsedTimer,
    renderer: TypewriterRenderer,
    dispatcher: Arc<dyn QueryDispatcher>,
    ms_per_char: u64,
}

impl QueryOrchestrator {
    pub fn new(
        registry: ModeRegistry,
        dispatcher: Arc<dyn QueryDispatcher>,
        ms_per_char: u64,
    ) -> Self {
        let generation = GenerationCounter::new();
        QueryOrchestrator {
            inner: Mutex::new(Inner {
                registry,
                state: OrchestrationState::Idle,
                subscribers: Vec::new(),
                timer_handle: None,
            }),
            publish_order: Mutex::new(()),
            renderer: TypewriterRenderer::new(generation.clone()),
            generation,
            timer: ElapsedTimer::new(),
            dispatcher,
            ms_per_char,
        }
    }

    /// Attach a read-only subscriber. No replay: a subscriber attached
    /// mid-cycle only sees states from that point forward.
    ///
    /// Subscribers are invoked synchronously while publication is
    /// serialized; they may read (`state`, `modes`, `active_mode`) but must
    /// not call back into `submit` or `set_mode`.
    pub fn subscribe(&self, subscriber: impl Fn(&OrchestrationState) + Send + Sync + 'static) {
        self.lock().subscribers.push(Arc::new(subscriber));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> OrchestrationState {
        self.lock().state.clone()
    }

    /// The startup mode catalog, in order.
    pub fn modes(&self) -> Vec<Mode> {
        self.lock().registry.list().to_vec()
    }

    pub fn active_mode(&self) -> Mode {
        self.lock().registry.active().clone()
    }

    /// Switch the active mode and reset to `Idle`.
    ///
    /// An in-flight request is not cancelled, only detached: the generation
    /// bump makes its eventual result (and any running timer or render)
    /// silently discard itself.
    pub fn set_mode(&self, index: usize) -> Result<(), OrchestratorError> {
        let _order = self.order();
        let snapshot = {
            let mut inner = self.lock();
            inner.registry.set_active(index)?;
            self.generation.bump();
            if let Some(handle) = inner.timer_handle.take() {
                self.timer.stop(&handle);
            }
            inner.state = OrchestrationState::Idle;
            info!("Switched to mode '{}'", inner.registry.active().id);
            (inner.state.clone(), inner.subscribers.clone())
        };
        Self::notify(&snapshot.0, &snapshot.1);
        Ok(())
    }

    /// Run one full submission cycle: validate, dispatch against the active
    /// mode, and play back the result. Resolves once the cycle reaches
    /// `Done` (or its result was discarded because a newer generation took
    /// over in the meantime).
    pub async fn submit(self: &Arc<Self>, text: &str) -> Result<(), OrchestratorError> {
        let query = Query::new(text).ok_or(OrchestratorError::EmptyQuery)?;

        let (mode, token, handle, mut ticks) = {
            let _order = self.order();
            let mut inner = self.lock();
            if matches!(inner.state, OrchestrationState::Pending { .. }) {
                return Err(OrchestratorError::RequestInFlight);
            }
            let (tx, rx) = mpsc::unbounded_channel();
            let handle = self.timer.start(tx)?;
            let token = self.generation.bump();
            inner.timer_handle = Some(handle.clone());
            inner.state = OrchestrationState::Pending {
                started_at: Utc::now(),
                elapsed_seconds: 0,
            };
            let mode = inner.registry.active().clone();
            let snapshot = (inner.state.clone(), inner.subscribers.clone());
            drop(inner);
            Self::notify(&snapshot.0, &snapshot.1);
            (mode, token, handle, rx)
        };

        // Ticks update the pending state for as long as this generation is
        // live; the loop ends when the timer task drops its sender.
        let tick_sink = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(tick) = ticks.recv().await {
                tick_sink.on_tick(token, tick);
            }
        });

        info!("Dispatching '{}' query (generation {token})", mode.id);
        let outcome = self.dispatcher.dispatch(&mode, &query).await;
        self.release_timer(&handle);

        if !self.generation.is_current(token) {
            debug!("Discarding result of superseded generation {token}");
            return Ok(());
        }

        match outcome {
            RequestOutcome::Success { ref text, .. } => {
                let full_text = text.clone();
                self.transition_if_current(
                    token,
                    OrchestrationState::Rendering {
                        full_text: full_text.clone(),
                        revealed_prefix_len: 0,
                    },
                );
                let playback = self
                    .renderer
                    .play(&full_text, self.ms_per_char, token, |revealed, _| {
                        self.reveal(token, revealed);
                    })
                    .await;
                if playback == Playback::Completed {
                    info!("Query resolved and rendered (generation {token})");
                    self.transition_if_current(token, OrchestrationState::Done { outcome });
                }
            }
            RequestOutcome::Failure(ref failure) => {
                error!("Dispatch failed: {}", failure.message);
                self.transition_if_current(token, OrchestrationState::Done { outcome });
            }
        }

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn order(&self) -> MutexGuard<'_, ()> {
        self.publish_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(state: &OrchestrationState, subscribers: &[Subscriber]) {
        for subscriber in subscribers {
            subscriber(state);
        }
    }

    /// Replace the state and publish, unless a newer generation owns it.
    fn transition_if_current(&self, token: u64, next: OrchestrationState) {
        let _order = self.order();
        let snapshot = {
            let mut inner = self.lock();
            if !self.generation.is_current(token) {
                return;
            }
            inner.state = next;
            (inner.state.clone(), inner.subscribers.clone())
        };
        Self::notify(&snapshot.0, &snapshot.1);
    }

    fn on_tick(&self, token: u64, tick: u64) {
        let _order = self.order();
        let snapshot = {
            let mut inner = self.lock();
            if !self.generation.is_current(token) {
                return;
            }
            match &mut inner.state {
                OrchestrationState::Pending {
                    elapsed_seconds, ..
                } => *elapsed_seconds = tick + 1,
                _ => return,
            }
            (inner.state.clone(), inner.subscribers.clone())
        };
        Self::notify(&snapshot.0, &snapshot.1);
    }

    fn reveal(&self, token: u64, revealed: usize) {
        let _order = self.order();
        let snapshot = {
            let mut inner = self.lock();
            if !self.generation.is_current(token) {
                return;
            }
            match &mut inner.state {
                OrchestrationState::Rendering {
                    revealed_prefix_len,
                    ..
                } => *revealed_prefix_len = revealed,
                _ => return,
            }
            (inner.state.clone(), inner.subscribers.clone())
        };
        Self::notify(&snapshot.0, &snapshot.1);
    }

    fn release_timer(&self, handle: &TimerHandle) {
        self.timer.stop(handle);
        let mut inner = self.lock();
        if inner
            .timer_handle
            .as_ref()
            .is_some_and(|current| current.same_as(handle))
        {
            inner.timer_handle = None;
        }
    }
}
