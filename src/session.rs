use crate::errors::TrackError;
use crate::lifecycle::{PageLifecycle, LEAVE_WARNING};
use crate::models::{AbandonReason, Direction, TrackingEvent, TrackingReply, TrackingRequest};
use crate::progress::{render_progress, NoProgress, ProgressIndicator};
use crate::state::{SessionSnapshot, SessionState};
use crate::transport::Transport;
use chrono::Local;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// What the unload handler did on one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnloadOutcome {
    pub abandonment_sent: bool,
    pub confirmation_requested: bool,
}

/// Tracks one questionnaire response for the lifetime of a page view.
///
/// Cloning is cheap and every clone drives the same session, so handlers can
/// each hold their own copy. Several operations may be in flight at once; each
/// applies its own update when its reply arrives, so the last reply wins.
#[derive(Clone)]
pub struct TrackingSession {
    response_id: Arc<str>,
    auth_token: Arc<str>,
    transport: Arc<dyn Transport>,
    lifecycle: Arc<dyn PageLifecycle>,
    progress: Arc<dyn ProgressIndicator>,
    state: Arc<Mutex<SessionState>>,
}

impl TrackingSession {
    /// Creates the session and arms its unload handler.
    pub fn new(
        response_id: impl Into<String>,
        auth_token: impl Into<String>,
        transport: Arc<dyn Transport>,
        lifecycle: Arc<dyn PageLifecycle>,
    ) -> Self {
        lifecycle.arm_unload();
        Self {
            response_id: Arc::from(response_id.into()),
            auth_token: Arc::from(auth_token.into()),
            transport,
            lifecycle,
            progress: Arc::new(NoProgress),
            state: Arc::new(Mutex::new(SessionState::armed())),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressIndicator>) -> Self {
        self.progress = progress;
        self
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state().snapshot()
    }

    pub async fn start(&self) {
        let already_started = self.state().started;
        if already_started {
            debug!(response_id = %self.response_id, "start already acknowledged");
            return;
        }

        match self.send(TrackingEvent::Start).await {
            Ok(reply) => {
                let percentage = {
                    let mut state = self.state();
                    state.started = true;
                    state.started_at.get_or_insert_with(Local::now);
                    apply_progress(&mut state, &reply);
                    state.completion_percentage
                };
                self.refresh_progress(percentage);
                info!(response_id = %self.response_id, percentage, "tracking started");
            }
            Err(err) => warn!(response_id = %self.response_id, "failed to track start: {err}"),
        }
    }

    pub async fn record_answer(&self, question_id: &str) {
        let question_id = question_id.trim();
        if question_id.is_empty() {
            warn!(response_id = %self.response_id, "answer without a question id ignored");
            return;
        }
        if !self.accepts_progress_events("answer") {
            return;
        }

        let event = TrackingEvent::Answer {
            question_id: question_id.to_string(),
        };
        let reply = match self.send(event).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(response_id = %self.response_id, question_id, "failed to track answer: {err}");
                return;
            }
        };

        let (percentage, finish) = {
            let mut state = self.state();
            apply_progress(&mut state, &reply);
            let finish = reply.is_completed && !state.completed && !state.auto_completion_fired;
            if finish {
                state.auto_completion_fired = true;
            }
            (state.completion_percentage, finish)
        };
        self.refresh_progress(percentage);
        info!(response_id = %self.response_id, question_id, percentage, "answer tracked");

        if finish {
            self.complete().await;
        }
    }

    pub async fn record_navigation(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        direction: Option<Direction>,
    ) {
        if !self.accepts_progress_events("navigation") {
            return;
        }

        let event = TrackingEvent::Navigation {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            direction: direction.unwrap_or_default(),
        };
        match self.send(event).await {
            Ok(_) => {
                self.state().current_question_id = to.map(str::to_string);
                debug!(response_id = %self.response_id, ?from, ?to, "navigation tracked");
            }
            Err(err) => warn!(response_id = %self.response_id, "failed to track navigation: {err}"),
        }
    }

    /// Marks the response finished. At most one completion call is in flight,
    /// and nothing is sent once completion has been acknowledged.
    pub async fn complete(&self) {
        {
            let mut state = self.state();
            if state.completed || state.completion_in_flight {
                debug!(response_id = %self.response_id, "completion already tracked or pending");
                return;
            }
            if !state.started {
                debug!(response_id = %self.response_id, "completion before start ignored");
                return;
            }
            state.completion_in_flight = true;
        }

        let result = self.send(TrackingEvent::Completion).await;

        let mut state = self.state();
        state.completion_in_flight = false;
        match result {
            Ok(reply) => {
                let now = Local::now();
                state.completed = true;
                state.completed_at = Some(now);
                state.unload_armed = false;
                let time_spent = reply.time_spent.clone().or_else(|| {
                    state
                        .started_at
                        .map(|started| format!("{}s", (now - started).num_seconds()))
                });
                drop(state);

                self.lifecycle.disarm_unload();
                info!(response_id = %self.response_id, ?time_spent, "completion tracked");
            }
            Err(err) => {
                drop(state);
                warn!(response_id = %self.response_id, "failed to track completion: {err}");
            }
        }
    }

    /// Queues an abandonment signal if the questionnaire was started and not
    /// finished. Delivery is best-effort; returns whether anything was queued.
    pub fn record_abandonment(&self, reason: AbandonReason) -> bool {
        let eligible = {
            let state = self.state();
            state.started && !state.completed
        };
        if !eligible {
            debug!(response_id = %self.response_id, %reason, "abandonment not applicable");
            return false;
        }

        self.transport.send_best_effort(self.request(TrackingEvent::Abandonment {
            reason: reason.clone(),
        }));
        info!(response_id = %self.response_id, %reason, "abandonment queued");
        true
    }

    /// The page-unload handler. Does nothing once detached.
    pub fn handle_unload(&self) -> UnloadOutcome {
        let (armed, confirm) = {
            let state = self.state();
            (state.unload_armed, state.wants_confirmation())
        };
        if !armed {
            return UnloadOutcome::default();
        }

        let abandonment_sent = self.record_abandonment(AbandonReason::PageClose);
        if confirm {
            self.lifecycle.request_confirmation(LEAVE_WARNING);
        }

        UnloadOutcome {
            abandonment_sent,
            confirmation_requested: confirm,
        }
    }

    /// Page teardown: detaches the unload handler.
    pub fn destroy(&self) {
        let was_armed = std::mem::replace(&mut self.state().unload_armed, false);
        if was_armed {
            self.lifecycle.disarm_unload();
        }
    }

    fn accepts_progress_events(&self, kind: &str) -> bool {
        let accepted = self.state().accepts_progress_events();
        if !accepted {
            debug!(response_id = %self.response_id, kind, "session not in progress, event skipped");
        }
        accepted
    }

    async fn send(&self, event: TrackingEvent) -> Result<TrackingReply, TrackError> {
        let request = self.request(event);
        self.transport.send(&request).await
    }

    fn request(&self, event: TrackingEvent) -> TrackingRequest {
        TrackingRequest {
            response_id: self.response_id.to_string(),
            auth_token: self.auth_token.to_string(),
            event,
        }
    }

    fn refresh_progress(&self, percentage: f64) {
        self.progress.update(&render_progress(percentage));
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply_progress(state: &mut SessionState, reply: &TrackingReply) {
    if let Some(percentage) = reply.percentage() {
        state.completion_percentage = percentage;
    }
    if reply.answers_provided.is_some() {
        state.answers_provided = reply.answers_provided;
    }
    if reply.answers_required.is_some() {
        state.answers_required = reply.answers_required;
    }
}
