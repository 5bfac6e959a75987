use refdoc_core::SessionHandle;
use refdoc_core::config::RefdocConfig;
use refdoc_core::session::storage;
use std::path::PathBuf;
use tracing::info;

pub async fn run(
    path: Option<PathBuf>,
    config: RefdocConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = path {
        let handle = SessionHandle::open(&path, config)?;
        info!("Clearing index for snapshot at: {}...", path.display());
        handle.session().clear_saved_index().await?;
        println!("Index for {} cleared.", path.display());
    } else {
        let dir = config.index_dir();
        info!("Clearing all indices at: {}...", dir.display());
        storage::clear_all(&dir)?;
        println!("All indices under {} cleared.", dir.display());
    }
    Ok(())
}
