use crate::shell::view;
use refdoc_api::{DocumentationService, QueryResult};
use refdoc_core::SessionHandle;
use refdoc_core::config::RefdocConfig;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

pub async fn run(path: PathBuf, config: RefdocConfig) -> Result<(), Box<dyn std::error::Error>> {
    let handle = SessionHandle::open(&path, config)?;

    info!("Indexing snapshot at: {}...", path.display());
    let start = Instant::now();

    let stats = handle.prepare().await?;
    if !stats.loaded_from_cache {
        handle.save().await?;
    }

    info!("Indexing complete in {:?}", start.elapsed());
    println!(
        "{} {} in {:?}",
        if stats.loaded_from_cache {
            "Loaded stored index for"
        } else {
            "Indexed"
        },
        path.display(),
        start.elapsed()
    );
    if let Some(stored) = handle.session().index_path() {
        println!("Index file: {}", stored.display());
    }
    println!("{}", view::render(&QueryResult::Stats(stats)));

    Ok(())
}
