pub(crate) mod command;
mod completer;
mod context;
mod highlighter;
mod prompt;
pub(crate) mod view;

use reedline::{
    ColumnarMenu, DefaultHinter, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder,
    Reedline, ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use refdoc_api::DocumentationService;
use refdoc_core::SessionHandle;
use refdoc_core::config::RefdocConfig;
use std::path::PathBuf;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{error, info};

use self::command::{ShellCommand, parse_shell_command};
use self::completer::RefdocCompleter;
use self::context::ShellContext;
use self::highlighter::RefdocHighlighter;
use self::prompt::RefdocPrompt;

const SHELL_HISTORY_SIZE: usize = 500;

pub struct ReplServer {
    context: ShellContext,
    snapshot_path: PathBuf,
}

impl ReplServer {
    pub fn new(handle: SessionHandle, rt: &Runtime, snapshot_path: PathBuf) -> Self {
        Self {
            context: ShellContext::new(handle, rt.handle().clone()),
            snapshot_path,
        }
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        println!("Snapshot: {}", self.snapshot_path.display());

        self.initialize_index()?;

        println!("Type 'help' for commands.");

        let line_editor = self.setup_line_editor()?;
        self.run_loop(line_editor)
    }

    fn initialize_index(&self) -> Result<(), Box<dyn std::error::Error>> {
        let handle = &self.context.handle;
        let start = Instant::now();

        let stats = self.context.rt_handle.block_on(handle.prepare())?;
        if stats.loaded_from_cache {
            println!(
                "Index loaded from disk in {:?}. Types: {}, Edges: {}",
                start.elapsed(),
                stats.types,
                stats.edges
            );
        } else {
            println!(
                "Indexed in {:?}. Types: {}, Edges: {}",
                start.elapsed(),
                stats.types,
                stats.edges
            );
            // A failed save only costs the next start its head start
            if let Err(e) = self.context.save() {
                error!("Failed to save index: {}", e);
            } else {
                info!("Index saved.");
            }
        }
        for warning in &stats.warnings {
            println!("warning: {}", warning);
        }
        Ok(())
    }

    fn setup_line_editor(&self) -> Result<Reedline, Box<dyn std::error::Error>> {
        let commands = ShellCommand::command_names();

        let completer = Box::new(RefdocCompleter::new(commands.clone(), self.context.clone()));

        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let history_file = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".refdoc")
            .join("shell");
        let _ = std::fs::create_dir_all(&history_file);
        let history_file = history_file.join("history");

        let history = match FileBackedHistory::with_file(SHELL_HISTORY_SIZE, history_file) {
            Ok(history) => history,
            Err(e) => {
                error!("Failed to open shell history: {}", e);
                FileBackedHistory::new(SHELL_HISTORY_SIZE)?
            }
        };

        let highlighter = Box::new(RefdocHighlighter::new(commands));

        Ok(Reedline::create()
            .with_history(Box::new(history))
            .with_completer(completer)
            .with_highlighter(highlighter)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_hinter(Box::new(
                DefaultHinter::default().with_style(
                    nu_ansi_term::Style::new()
                        .italic()
                        .fg(nu_ansi_term::Color::LightGray),
                ),
            ))
            .with_edit_mode(Box::new(Emacs::new(keybindings))))
    }

    fn handle(&self, cmd: &ShellCommand) -> Result<String, Box<dyn std::error::Error>> {
        match cmd {
            ShellCommand::Cd { target } => self.context.change_class(target),
            ShellCommand::Pwd => Ok(self
                .context
                .current()
                .map(|c| format!("{} (id {})", c.name, c.id))
                .unwrap_or_else(|| "/".to_string())),
            ShellCommand::Save => {
                self.context.save()?;
                Ok("Index saved.".to_string())
            }
            ShellCommand::Clear => Ok(String::new()),
            _ => {
                let current = self.context.current();
                let query = cmd
                    .to_doc_query(current.as_ref())?
                    .ok_or("command has no query")?;
                let result = self.context.execute(&query)?;
                Ok(view::render(&result))
            }
        }
    }

    fn run_loop(&self, mut line_editor: Reedline) -> Result<(), Box<dyn std::error::Error>> {
        let label = self
            .snapshot_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "refdoc".to_string());
        loop {
            let prompt = RefdocPrompt::new(&label, self.context.current(), self.context.type_count());
            let sig = line_editor.read_line(&prompt);

            match sig {
                Ok(Signal::Success(buffer)) => {
                    let trimmed = buffer.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if trimmed == "exit" || trimmed == "quit" {
                        break;
                    }

                    match parse_shell_command(trimmed) {
                        Ok(Some(cmd)) => match self.handle(&cmd) {
                            Ok(output) => {
                                if !output.is_empty() {
                                    println!("{}", output);
                                }
                                if matches!(cmd, ShellCommand::Clear) {
                                    let _ = line_editor.clear_screen();
                                }
                            }
                            Err(e) => eprintln!("Error: {}", e),
                        },
                        Ok(None) => {} // Help or handled by Clap
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                    println!("Bye!");
                    break;
                }
                x => println!("Event: {:?}", x),
            }
        }
        Ok(())
    }
}

pub fn run(
    rt: &Runtime,
    snapshot: PathBuf,
    config: RefdocConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = SessionHandle::open(&snapshot, config)?;
    let server = ReplServer::new(handle, rt, snapshot);
    server.run()
}
