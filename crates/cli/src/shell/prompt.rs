use super::context::CurrentClass;
use super::view::shorten_fqn;
use nu_ansi_term::Color;
use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};
use std::borrow::Cow;

const MAX_LOCATION: usize = 30;

/// `<snapshot>:<class> > ` on the left, index size on the right.
pub struct RefdocPrompt {
    snapshot: String,
    current: Option<CurrentClass>,
    types: Option<usize>,
}

impl RefdocPrompt {
    /// `types` is `None` while the session has no ready index.
    pub fn new(snapshot: &str, current: Option<CurrentClass>, types: Option<usize>) -> Self {
        Self {
            snapshot: snapshot.to_string(),
            current,
            types,
        }
    }

    fn location(&self) -> String {
        match &self.current {
            Some(class) if class.name.len() > MAX_LOCATION => shorten_fqn(&class.name),
            Some(class) => class.name.clone(),
            None => "/".to_string(),
        }
    }
}

impl Prompt for RefdocPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "{}:{} > ",
            Color::LightBlue.bold().paint(&self.snapshot),
            Color::Yellow.paint(self.location())
        ))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        let status = match self.types {
            Some(types) => Color::DarkGray.paint(format!("{} types", types)),
            None => Color::Red.paint("not indexed"),
        };
        Cow::Owned(status.to_string())
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("::: ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({}history: {}) ", prefix, history_search.term))
    }
}
