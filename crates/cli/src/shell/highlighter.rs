use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

pub struct RefdocHighlighter {
    commands: Vec<String>,
}

impl RefdocHighlighter {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    fn style_for(&self, word: &str, first: bool) -> Style {
        if first {
            if self.commands.iter().any(|c| c == word) {
                Style::new().fg(Color::LightGreen).bold()
            } else {
                Style::new().fg(Color::Red)
            }
        } else if word.starts_with('-') {
            Style::new().fg(Color::Cyan)
        } else if word.contains('=') || word.starts_with('{') {
            Style::new().fg(Color::Magenta)
        } else if word.contains('.') || word.chars().all(|c| c.is_ascii_digit()) {
            Style::new().fg(Color::Yellow)
        } else {
            Style::new()
        }
    }
}

impl Highlighter for RefdocHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();
        let mut seen_word = false;

        for word in line.split_inclusive(char::is_whitespace) {
            let trimmed = word.trim();
            if trimmed.is_empty() {
                styled_text.push((Style::new(), word.to_string()));
                continue;
            }
            let style = self.style_for(trimmed, !seen_word);
            seen_word = true;
            styled_text.push((style, word.to_string()));
        }

        styled_text
    }
}
