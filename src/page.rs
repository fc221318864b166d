use once_cell::sync::Lazy;
use regex::Regex;

// Attribute values may be double-quoted, single-quoted or bare.
static RESPONSE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|\s)data-response-id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("response id pattern")
});
static INPUT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<input\b[^>]*>").expect("input tag pattern"));
static TOKEN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:^|\s)name\s*=\s*(?:"csrfmiddlewaretoken"|'csrfmiddlewaretoken'|csrfmiddlewaretoken(?:[\s/>]|$))"#,
    )
    .expect("token name pattern")
});
static VALUE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|\s)value\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("value pattern")
});
static PROGRESS_BAR: Lazy<Regex> = Lazy::new(|| class_pattern("completion-progress-bar"));
static PROGRESS_TEXT: Lazy<Regex> = Lazy::new(|| class_pattern("completion-progress-text"));

fn class_pattern(class: &str) -> Regex {
    let pattern = format!(
        r#"(?:^|\s)class\s*=\s*(?:"(?:[^"]*\s)?|'(?:[^']*\s)?|){class}(?:[\s"'/>]|$)"#
    );
    Regex::new(&pattern).expect("class pattern")
}

fn attribute_value<'a>(caps: &regex::Captures<'a>) -> Option<&'a str> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|value| value.as_str())
}

/// Values the questionnaire page hands to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub response_id: String,
    pub auth_token: String,
    pub has_progress_bar: bool,
    pub has_progress_text: bool,
}

impl PageContext {
    /// `None` unless the page carries both a response id and an auth token.
    pub fn from_markup(markup: &str) -> Option<Self> {
        let response_id = RESPONSE_ID
            .captures(markup)
            .and_then(|caps| attribute_value(&caps).map(|id| id.trim().to_string()))
            .filter(|id| !id.is_empty())?;
        let auth_token = find_token(markup)?;

        Some(Self {
            response_id,
            auth_token,
            has_progress_bar: PROGRESS_BAR.is_match(markup),
            has_progress_text: PROGRESS_TEXT.is_match(markup),
        })
    }

    pub fn has_progress_indicator(&self) -> bool {
        self.has_progress_bar || self.has_progress_text
    }
}

fn find_token(markup: &str) -> Option<String> {
    INPUT_TAG
        .find_iter(markup)
        .map(|tag| tag.as_str())
        .filter(|tag| TOKEN_NAME.is_match(tag))
        .find_map(|tag| {
            VALUE_ATTR
                .captures(tag)
                .and_then(|caps| attribute_value(&caps).map(str::to_string))
        })
}
