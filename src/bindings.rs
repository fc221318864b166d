use crate::models::Direction;
use crate::session::{TrackingSession, UnloadOutcome};
use tracing::debug;

/// Valid `type` values other than text, checkbox and radio.
const NON_TEXT_INPUT_TYPES: &[&str] = &[
    "button", "color", "date", "datetime-local", "email", "file", "hidden", "image", "month",
    "number", "password", "range", "reset", "search", "submit", "tel", "time", "url", "week",
];

/// Form controls the tracker listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Checkbox,
    Radio,
    Text,
    TextArea,
    Select,
    Other,
}

impl InputKind {
    /// Maps a tag name plus its `type` attribute. Like the DOM, an input with
    /// a missing or unknown `type` is a text input.
    pub fn from_element(tag: &str, input_type: Option<&str>) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "textarea" => InputKind::TextArea,
            "select" => InputKind::Select,
            "input" => {
                let input_type = input_type.map(|t| t.trim().to_ascii_lowercase());
                match input_type.as_deref() {
                    Some("checkbox") => InputKind::Checkbox,
                    Some("radio") => InputKind::Radio,
                    Some(t) if NON_TEXT_INPUT_TYPES.contains(&t) => InputKind::Other,
                    _ => InputKind::Text,
                }
            }
            _ => InputKind::Other,
        }
    }

    fn answers_on_change(self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::Radio)
    }

    fn answers_on_blur(self) -> bool {
        matches!(self, InputKind::Text | InputKind::TextArea | InputKind::Select)
    }
}

/// Interaction on the questionnaire page. `question_id` is the id of the
/// nearest enclosing question container, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    FormSubmitted {
        question_id: String,
    },
    InputChanged {
        kind: InputKind,
        question_id: Option<String>,
    },
    InputBlurred {
        kind: InputKind,
        question_id: Option<String>,
    },
    NavigationClicked {
        direction: Option<String>,
        current: Option<String>,
        next: Option<String>,
    },
    Unload,
}

/// Routes one page event to the session. Returns the unload outcome for
/// `PageEvent::Unload`, `None` otherwise.
pub async fn dispatch(session: &TrackingSession, event: PageEvent) -> Option<UnloadOutcome> {
    match event {
        PageEvent::FormSubmitted { question_id } => session.record_answer(&question_id).await,
        PageEvent::InputChanged {
            kind,
            question_id: Some(question_id),
        } if kind.answers_on_change() => session.record_answer(&question_id).await,
        PageEvent::InputBlurred {
            kind,
            question_id: Some(question_id),
        } if kind.answers_on_blur() => session.record_answer(&question_id).await,
        PageEvent::NavigationClicked {
            direction,
            current,
            next,
        } => {
            let direction = Direction::parse_or_forward(direction.as_deref());
            session
                .record_navigation(current.as_deref(), next.as_deref(), Some(direction))
                .await
        }
        PageEvent::Unload => return Some(session.handle_unload()),
        other => debug!(?other, "event not tracked"),
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackingEvent;
    use crate::session::tests::fixture;

    #[test]
    fn input_kinds_follow_tag_and_type() {
        assert_eq!(InputKind::from_element("INPUT", Some("Radio")), InputKind::Radio);
        assert_eq!(InputKind::from_element("textarea", None), InputKind::TextArea);
        assert_eq!(InputKind::from_element("input", Some("email")), InputKind::Other);
        assert_eq!(InputKind::from_element("input", Some("hidden")), InputKind::Other);
        assert_eq!(InputKind::from_element("input", None), InputKind::Text);
        assert_eq!(InputKind::from_element("input", Some("bogus")), InputKind::Text);
        assert_eq!(InputKind::from_element("div", None), InputKind::Other);
    }

    #[tokio::test]
    async fn untyped_input_blur_records_answer() {
        let (session, transport, _) = fixture();
        transport.ok("start", 0.0);
        transport.ok("answer", 10.0);
        session.start().await;

        dispatch(
            &session,
            PageEvent::InputBlurred {
                kind: InputKind::from_element("input", None),
                question_id: Some("7".into()),
            },
        )
        .await;

        assert_eq!(transport.sent_kinds(), vec!["start", "answer"]);
    }

    #[tokio::test]
    async fn change_and_blur_answer_only_for_matching_controls() {
        let (session, transport, _) = fixture();
        transport.ok("start", 0.0);
        session.start().await;
        for _ in 0..3 {
            transport.ok("answer", 10.0);
        }

        let events = vec![
            PageEvent::InputChanged {
                kind: InputKind::Checkbox,
                question_id: Some("1".into()),
            },
            PageEvent::InputChanged {
                kind: InputKind::Text,
                question_id: Some("2".into()),
            },
            PageEvent::InputBlurred {
                kind: InputKind::Select,
                question_id: Some("3".into()),
            },
            PageEvent::InputBlurred {
                kind: InputKind::Radio,
                question_id: Some("4".into()),
            },
            PageEvent::InputChanged {
                kind: InputKind::Radio,
                question_id: None,
            },
            PageEvent::FormSubmitted {
                question_id: "5".into(),
            },
        ];
        for event in events {
            assert_eq!(dispatch(&session, event).await, None);
        }

        assert_eq!(
            transport.sent_kinds(),
            vec!["start", "answer", "answer", "answer"]
        );
    }

    #[tokio::test]
    async fn navigation_click_defaults_direction() {
        let (session, transport, _) = fixture();
        transport.ok("start", 0.0);
        transport.ok("navigation", 0.0);
        session.start().await;

        dispatch(
            &session,
            PageEvent::NavigationClicked {
                direction: Some("up".into()),
                current: Some("1".into()),
                next: Some("2".into()),
            },
        )
        .await;

        assert_eq!(session.snapshot().current_question_id.as_deref(), Some("2"));
        let sent = transport.sent();
        assert_eq!(
            sent[1].event,
            TrackingEvent::Navigation {
                from: Some("1".into()),
                to: Some("2".into()),
                direction: Direction::Forward,
            }
        );
    }

    #[tokio::test]
    async fn unload_event_reports_outcome() {
        let (session, transport, _) = fixture();
        transport.ok("start", 25.0);
        session.start().await;

        let outcome = dispatch(&session, PageEvent::Unload).await.expect("outcome");
        assert!(outcome.abandonment_sent);
        assert!(outcome.confirmation_requested);
    }
}
