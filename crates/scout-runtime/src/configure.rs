use std::sync::Arc;

use anyhow::Result;

use crate::error::DiscoveryError;
use crate::export::Export;

/// Post-load hook invoked once per plugin with `(key, imported, root)`.
///
/// `key` is `None` under the custom strategy, where the hook owns storage.
pub trait Configurer: Send + Sync {
    fn configure(&self, key: Option<&str>, imported: &Export, root: &Export) -> Result<()>;
}

impl<F> Configurer for F
where
    F: Fn(Option<&str>, &Export, &Export) -> Result<()> + Send + Sync,
{
    fn configure(&self, key: Option<&str>, imported: &Export, root: &Export) -> Result<()> {
        self(key, imported, root)
    }
}

/// Name reported when a replacement hook fails.
pub const CONFIGURE_HOOK: &str = "configure";

/// Run the configured hook, or fan out to every named configurer in order.
pub(crate) fn run_configure(
    configure: Option<&Arc<dyn Configurer>>,
    configurers: &[(String, Arc<dyn Configurer>)],
    key: Option<&str>,
    imported: &Export,
    root: &Export,
) -> std::result::Result<(), DiscoveryError> {
    if let Some(hook) = configure {
        return hook
            .configure(key, imported, root)
            .map_err(|source| DiscoveryError::Configure {
                name: CONFIGURE_HOOK.to_string(),
                source,
            });
    }

    for (name, configurer) in configurers {
        configurer
            .configure(key, imported, root)
            .map_err(|source| DiscoveryError::Configure {
                name: name.clone(),
                source,
            })?;
    }

    Ok(())
}
