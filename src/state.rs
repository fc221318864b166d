use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Started,
    Completed,
}

/// Mutable per-page tracking state. Only touched between network awaits.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub started: bool,
    pub completed: bool,
    pub current_question_id: Option<String>,
    pub completion_percentage: f64,
    pub answers_provided: Option<u32>,
    pub answers_required: Option<u32>,
    pub started_at: Option<DateTime<Local>>,
    pub completed_at: Option<DateTime<Local>>,
    pub(crate) completion_in_flight: bool,
    pub(crate) auto_completion_fired: bool,
    pub(crate) unload_armed: bool,
}

impl SessionState {
    pub fn armed() -> Self {
        Self {
            unload_armed: true,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.started, self.completed) {
            (_, true) => Phase::Completed,
            (true, false) => Phase::Started,
            (false, false) => Phase::NotStarted,
        }
    }

    /// Answer and navigation events are only meaningful mid-questionnaire.
    pub fn accepts_progress_events(&self) -> bool {
        self.phase() == Phase::Started
    }

    pub fn wants_confirmation(&self) -> bool {
        self.started && !self.completed && self.completion_percentage > 0.0
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            started: self.started,
            completed: self.completed,
            current_question_id: self.current_question_id.clone(),
            completion_percentage: self.completion_percentage,
            answers_provided: self.answers_provided,
            answers_required: self.answers_required,
            completed_at: self.completed_at,
            unload_armed: self.unload_armed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub started: bool,
    pub completed: bool,
    pub current_question_id: Option<String>,
    pub completion_percentage: f64,
    pub answers_provided: Option<u32>,
    pub answers_required: Option<u32>,
    pub completed_at: Option<DateTime<Local>>,
    pub unload_armed: bool,
}
