//! plugscout Plugin SDK
//!
//! Re-exports the runtime types needed for native plugin development.
//! Plugin authors implement the `Plugin` trait and export it with `declare_plugin!`.

pub use anyhow::Result;
pub use serde_json::{json, Value};

// Re-export core types from runtime
pub use scout_runtime::export::{Export, ExportFn};
pub use scout_runtime::plugin::manifest::CURRENT_API_VERSION as API_VERSION;
pub use scout_runtime::plugin::Plugin;

/// Macro for plugin entry point. Use in a `cdylib` plugin crate:
/// ```ignore
/// use scout_plugin_sdk::*;
///
/// #[derive(Default)]
/// struct BaconMaker;
/// impl Plugin for BaconMaker { ... }
///
/// declare_plugin!(BaconMaker);
/// ```
///
/// The host reads back a double-boxed `Box<dyn Plugin>` through a thin pointer.
#[macro_export]
macro_rules! declare_plugin {
    ($plugin_type:ty) => {
        #[no_mangle]
        pub extern "C" fn _plugin_create() -> *mut ::std::ffi::c_void {
            let plugin: ::std::boxed::Box<dyn $crate::Plugin> =
                ::std::boxed::Box::new(<$plugin_type>::default());
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(plugin)) as *mut ::std::ffi::c_void
        }
    };
}
