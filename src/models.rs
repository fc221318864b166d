use crate::errors::TrackError;
use serde::Deserialize;
use std::fmt;

/// Direction of travel between two questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }

    /// Lenient parse of a markup attribute; anything unrecognised is forward.
    pub fn parse_or_forward(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("backward") => Direction::Backward,
            _ => Direction::Forward,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbandonReason {
    PageClose,
    Timeout,
    Other(String),
}

impl AbandonReason {
    pub fn as_str(&self) -> &str {
        match self {
            AbandonReason::PageClose => "page_close",
            AbandonReason::Timeout => "timeout",
            AbandonReason::Other(reason) => reason,
        }
    }
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackingEvent {
    Start,
    Answer {
        question_id: String,
    },
    Navigation {
        from: Option<String>,
        to: Option<String>,
        direction: Direction,
    },
    Completion,
    Abandonment {
        reason: AbandonReason,
    },
}

impl TrackingEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TrackingEvent::Start => "start",
            TrackingEvent::Answer { .. } => "answer",
            TrackingEvent::Navigation { .. } => "navigation",
            TrackingEvent::Completion => "completion",
            TrackingEvent::Abandonment { .. } => "abandonment",
        }
    }
}

/// One outbound tracking call, addressed to a single response.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingRequest {
    pub response_id: String,
    pub auth_token: String,
    pub event: TrackingEvent,
}

impl TrackingRequest {
    pub const TOKEN_HEADER: &'static str = "X-CSRFToken";
    pub const TOKEN_FIELD: &'static str = "csrfmiddlewaretoken";

    /// Unencoded path segments below the site root; the path ends with a slash.
    pub fn path_segments(&self) -> Vec<&str> {
        let mut segments = vec!["responses", self.response_id.as_str(), "track", self.event.kind()];
        if let TrackingEvent::Answer { question_id } = &self.event {
            segments.push(question_id.as_str());
        }
        segments
    }

    /// Query parameters; missing question ids are sent as empty values.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match &self.event {
            TrackingEvent::Navigation {
                from,
                to,
                direction,
            } => vec![
                ("current", from.clone().unwrap_or_default()),
                ("next", to.clone().unwrap_or_default()),
                ("direction", direction.as_str().to_string()),
            ],
            TrackingEvent::Abandonment { reason } => vec![("reason", reason.to_string())],
            _ => Vec::new(),
        }
    }

    /// Form body for the fire-and-forget path, which cannot carry headers.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![(Self::TOKEN_FIELD, self.auth_token.clone())]
    }
}

/// Server acknowledgement. Extra fields the server adds are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrackingReply {
    pub success: bool,
    pub completion_percentage: Option<f64>,
    #[serde(default)]
    pub is_completed: bool,
    pub answers_provided: Option<u32>,
    pub answers_required: Option<u32>,
    pub time_spent: Option<String>,
}

impl TrackingReply {
    pub fn acknowledged(percentage: f64) -> Self {
        Self {
            success: true,
            completion_percentage: Some(percentage),
            ..Self::default()
        }
    }

    /// Application-level check: `success: false` and out-of-domain numbers are failures.
    pub fn into_result(self) -> Result<Self, TrackError> {
        if !self.success {
            return Err(TrackError::Rejected);
        }
        if let Some(value) = self.completion_percentage {
            if !value.is_finite() {
                return Err(TrackError::Malformed(format!(
                    "completion_percentage is not a number: {value}"
                )));
            }
        }
        Ok(self)
    }

    pub fn percentage(&self) -> Option<f64> {
        self.completion_percentage.map(|value| value.clamp(0.0, 100.0))
    }
}
