use crate::shell::command::parse_command_args;
use crate::shell::view;
use refdoc_api::DocumentationService;
use refdoc_core::SessionHandle;
use refdoc_core::config::RefdocConfig;
use std::path::PathBuf;
use tracing::debug;

/// One-shot form of a shell command.
pub async fn run(
    path: PathBuf,
    config: RefdocConfig,
    args: Vec<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = parse_command_args(args)? else {
        return Ok(());
    };
    let query = command
        .to_doc_query(None)?
        .ok_or_else(|| format!("'{}' only works inside the shell", command.name()))?;

    let handle = SessionHandle::open(&path, config)?;
    let stats = handle.prepare().await?;
    debug!(
        "Prepared {} types (from cache: {})",
        stats.types, stats.loaded_from_cache
    );

    let result = match handle.query(&query).await {
        Ok(result) => result,
        Err(e) if json => {
            println!("{}", serde_json::to_string_pretty(&e.to_json())?);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", view::render(&result));
    }
    Ok(())
}
