use crate::bindings::{InputKind, PageEvent};
use crate::lifecycle::PageLifecycle;
use crate::models::AbandonReason;
use crate::page::PageContext;
use crate::progress::{NoProgress, ProgressIndicator};
use crate::session::TrackingSession;
use crate::transport::Transport;
use std::sync::Arc;
use tracing::debug;

/// Page-load bootstrap: builds a session for the page and sends the start
/// event. Pages without a response id or token get no session.
pub async fn attach(
    markup: &str,
    transport: Arc<dyn Transport>,
    lifecycle: Arc<dyn PageLifecycle>,
    progress: Arc<dyn ProgressIndicator>,
) -> Option<TrackingSession> {
    let Some(context) = PageContext::from_markup(markup) else {
        debug!("page has no response to track");
        return None;
    };

    let progress: Arc<dyn ProgressIndicator> = if context.has_progress_indicator() {
        progress
    } else {
        Arc::new(NoProgress)
    };
    let session = TrackingSession::new(context.response_id, context.auth_token, transport, lifecycle)
        .with_progress(progress);
    session.start().await;
    Some(session)
}

/// A line of input for the headless host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(PageEvent),
    Complete,
    Abandon(AbandonReason),
}

/// Parses `submit <q>`, `change|blur <kind> <q>`, `nav <direction> [current] [next]`,
/// `complete`, `abandon [reason]` and `unload`. `-` stands for an absent id.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let command = match verb {
        "submit" => Command::Event(PageEvent::FormSubmitted {
            question_id: parts.next()?.to_string(),
        }),
        "change" | "blur" => {
            let kind = parse_kind(parts.next()?);
            let question_id = optional_id(parts.next());
            Command::Event(if verb == "change" {
                PageEvent::InputChanged { kind, question_id }
            } else {
                PageEvent::InputBlurred { kind, question_id }
            })
        }
        "nav" => Command::Event(PageEvent::NavigationClicked {
            direction: parts.next().map(str::to_string),
            current: optional_id(parts.next()),
            next: optional_id(parts.next()),
        }),
        "complete" => Command::Complete,
        "abandon" => Command::Abandon(match parts.next() {
            None | Some("page_close") => AbandonReason::PageClose,
            Some("timeout") => AbandonReason::Timeout,
            Some(other) => AbandonReason::Other(other.to_string()),
        }),
        "unload" => Command::Event(PageEvent::Unload),
        _ => return None,
    };
    Some(command)
}

fn parse_kind(token: &str) -> InputKind {
    match token {
        "textarea" | "select" => InputKind::from_element(token, None),
        other => InputKind::from_element("input", Some(other)),
    }
}

fn optional_id(token: Option<&str>) -> Option<String> {
    token.filter(|t| *t != "-").map(str::to_string)
}
