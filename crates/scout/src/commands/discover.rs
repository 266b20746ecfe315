use anyhow::Result;
use scout_runtime::{DiscoveryConfig, Discoverer, ManifestLoader};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Run one discovery and print the dictionary (and optionally roots) as JSON
pub async fn execute(config: DiscoveryConfig, sync: bool, show_roots: bool) -> Result<()> {
    let discoverer = Discoverer::new(Arc::new(ManifestLoader::new()));
    let mut session = discoverer.session(config);

    if sync {
        session.run_sync()?;
    } else {
        session.run().await?;
    }

    info!(
        plugins = session.dictionary().len(),
        paths = %session.paths().joined(),
        "Discovery finished"
    );

    let output = if show_roots {
        json!({
            "dictionary": session.dictionary(),
            "roots": session.roots(),
        })
    } else {
        serde_json::to_value(session.dictionary())?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
