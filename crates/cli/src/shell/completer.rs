use super::command::ShellCommand;
use super::context::ShellContext;
use reedline::{Completer, Span, Suggestion};

/// Cap on class-name suggestions per keystroke.
const CLASS_SUGGESTION_LIMIT: usize = 20;

pub struct RefdocCompleter {
    pub commands: Vec<String>,
    pub context: ShellContext,
}

impl RefdocCompleter {
    pub fn new(commands: Vec<String>, context: ShellContext) -> Self {
        Self { commands, context }
    }
}

fn suggestion(value: String, description: Option<String>, start: usize, end: usize) -> Suggestion {
    Suggestion {
        value,
        description,
        style: None,
        extra: None,
        span: Span { start, end },
        append_whitespace: true,
        match_indices: None,
    }
}

impl Completer for RefdocCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line = &line[..pos];
        let trimmed = line.trim_start();

        // Command name at the start of the line
        if !trimmed.contains(' ') {
            return self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(trimmed))
                .map(|cmd| suggestion(cmd.clone(), None, pos - trimmed.len(), pos))
                .collect();
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let Some(cmd) = parts.first() else {
            return vec![];
        };
        if !ShellCommand::takes_class(cmd) {
            return vec![];
        }

        let last_word = if line.ends_with(' ') {
            ""
        } else {
            parts.last().copied().unwrap_or("")
        };
        // Listing every class on an empty tab is not useful
        if last_word.is_empty() || last_word.starts_with('-') {
            return vec![];
        }

        let mut suggestions: Vec<Suggestion> = self
            .context
            .class_names(last_word, CLASS_SUGGESTION_LIMIT)
            .into_iter()
            .map(|fqn| suggestion(fqn, Some("class".to_string()), pos - last_word.len(), pos))
            .collect();
        suggestions.sort_by(|a, b| a.value.len().cmp(&b.value.len()).then(a.value.cmp(&b.value)));
        suggestions
    }
}
