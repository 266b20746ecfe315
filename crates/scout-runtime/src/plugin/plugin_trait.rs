//! Native plugin ABI, defined here in scout-runtime so the FFI bridge can reference it
//! without circular dependencies. Re-exported by scout-plugin-sdk for plugin authors.

use crate::export::Export;

/// Plugin trait implemented by native plugin libraries.
///
/// Plugin authors implement this trait and use `declare_plugin!` to export it.
pub trait Plugin: Send + Sync {
    /// Plugin name (usually the `<prefix>-*` directory name)
    fn name(&self) -> &str;

    /// Plugin version (semver)
    fn version(&self) -> &str;

    /// API version this plugin was built against
    fn api_version(&self) -> u32;

    /// Root export of the module
    fn exports(&self) -> Export;
}
