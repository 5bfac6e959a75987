use super::context::CurrentClass;
use clap::Parser;
use clap::error::ErrorKind;
use refdoc_api::{DocQuery, QueryExpr, RelationKind, SearchParams};

/// Helper struct for Clap parsing within the shell
#[derive(Parser, Clone, Debug)]
#[command(no_binary_name = true)]
pub enum ShellCommand {
    /// Search with a flat query, e.g. `name=List&exact=true`
    Search {
        /// `key=value` terms joined by `&`
        query: String,
    },
    /// Search with a JSON query expression
    Expr {
        /// e.g. `{"and":[{"term":{"key":"package","value":"java.util"}}]}`
        expr: String,
        /// Turn every term into an exclusion
        #[arg(long)]
        exclusive: bool,
        /// Whole-value, case-sensitive comparison
        #[arg(long)]
        exact: bool,
    },
    /// Show class details
    Show {
        /// Class name or type id (optional, defaults to current class)
        target: Option<String>,
    },
    /// List fields, inherited ones included
    Fields {
        /// Class name or type id (optional, defaults to current class)
        target: Option<String>,
        /// Only fields declared by the class itself
        #[arg(short, long)]
        shallow: bool,
    },
    /// List methods, inherited ones included
    Methods {
        /// Class name or type id (optional, defaults to current class)
        target: Option<String>,
        /// Only methods declared by the class itself
        #[arg(short, long)]
        shallow: bool,
    },
    /// List constructors
    Ctors {
        /// Class name or type id (optional, defaults to current class)
        target: Option<String>,
    },
    /// Super class, interfaces and other directly related classes
    Related {
        /// Class name or type id (optional, defaults to current class)
        target: Option<String>,
    },
    /// Query the relationship graph
    Relations {
        /// Class name or type id (optional, defaults to current class)
        target: Option<String>,
        /// Relation kind, e.g. subclass, field-type-of, inherited-by
        #[arg(long)]
        kind: Option<RelationKind>,
    },
    /// Classes grouped under the configured event base classes
    Events,
    /// Named bindings carried by the snapshot
    Bindings,
    /// Index statistics
    Stats,
    /// Run a raw JSON query, e.g. `{"command":"fields","target":"java.util.List"}`
    Json {
        query: String,
    },
    /// Change the current class
    Cd {
        /// Class name or type id; `..` or `/` clears the current class
        target: String,
    },
    /// Print the current class
    Pwd,
    /// Persist the index next to the other stored indices
    Save,
    /// Clear the screen
    Clear,
}

impl ShellCommand {
    /// Automatically generates the list of available command names from the enum.
    pub fn command_names() -> Vec<String> {
        use clap::CommandFactory;
        let cmd = Self::command();
        let mut names = vec!["help".to_string(), "exit".to_string(), "quit".to_string()];
        names.extend(cmd.get_subcommands().map(|s| s.get_name().to_string()));
        names
    }

    /// Commands whose first positional argument is a class.
    pub fn takes_class(name: &str) -> bool {
        matches!(
            name,
            "show" | "fields" | "methods" | "ctors" | "related" | "relations" | "cd"
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShellCommand::Search { .. } => "search",
            ShellCommand::Expr { .. } => "expr",
            ShellCommand::Show { .. } => "show",
            ShellCommand::Fields { .. } => "fields",
            ShellCommand::Methods { .. } => "methods",
            ShellCommand::Ctors { .. } => "ctors",
            ShellCommand::Related { .. } => "related",
            ShellCommand::Relations { .. } => "relations",
            ShellCommand::Events => "events",
            ShellCommand::Bindings => "bindings",
            ShellCommand::Stats => "stats",
            ShellCommand::Json { .. } => "json",
            ShellCommand::Cd { .. } => "cd",
            ShellCommand::Pwd => "pwd",
            ShellCommand::Save => "save",
            ShellCommand::Clear => "clear",
        }
    }

    /// Builds the query this command runs. Shell-internal commands
    /// (`cd`, `pwd`, `save`, `clear`) yield `None`.
    pub fn to_doc_query(
        &self,
        current: Option<&CurrentClass>,
    ) -> Result<Option<DocQuery>, Box<dyn std::error::Error>> {
        let target = |explicit: &Option<String>| -> Result<String, Box<dyn std::error::Error>> {
            explicit
                .clone()
                .or_else(|| current.map(|c| c.id.to_string()))
                .ok_or_else(|| "No class given and no current class".into())
        };

        let query = match self {
            ShellCommand::Search { query } => DocQuery::Search {
                params: SearchParams::parse(query),
            },
            ShellCommand::Expr {
                expr,
                exclusive,
                exact,
            } => DocQuery::SearchExpr {
                expr: serde_json::from_str::<QueryExpr>(expr)?,
                inclusive: !exclusive,
                exact: *exact,
            },
            ShellCommand::Show { target: t } => DocQuery::Show { target: target(t)? },
            ShellCommand::Fields { target: t, shallow } => DocQuery::Fields {
                target: target(t)?,
                shallow: *shallow,
            },
            ShellCommand::Methods { target: t, shallow } => DocQuery::Methods {
                target: target(t)?,
                shallow: *shallow,
            },
            ShellCommand::Ctors { target: t } => DocQuery::Constructors { target: target(t)? },
            ShellCommand::Related { target: t } => DocQuery::Related { target: target(t)? },
            ShellCommand::Relations { target: t, kind } => DocQuery::Relations {
                target: target(t)?,
                kind: *kind,
            },
            ShellCommand::Events => DocQuery::Events,
            ShellCommand::Bindings => DocQuery::Bindings,
            ShellCommand::Stats => DocQuery::Stats,
            ShellCommand::Json { query } => serde_json::from_str(query)?,
            ShellCommand::Cd { .. }
            | ShellCommand::Pwd
            | ShellCommand::Save
            | ShellCommand::Clear => return Ok(None),
        };
        Ok(Some(query))
    }
}

pub fn parse_command_args(
    args: Vec<String>,
) -> Result<Option<ShellCommand>, Box<dyn std::error::Error>> {
    match ShellCommand::try_parse_from(args) {
        Ok(c) => Ok(Some(c)),
        Err(e) => {
            // Help is printed, not reported
            if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion {
                println!("{}", e);
                return Ok(None);
            }
            Err(Box::new(e))
        }
    }
}

pub fn parse_shell_command(
    input: &str,
) -> Result<Option<ShellCommand>, Box<dyn std::error::Error>> {
    // Use shlex to split arguments while respecting quotes
    let args = shlex::split(input).ok_or("Invalid quoting")?;
    parse_command_args(args)
}
