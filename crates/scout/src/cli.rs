use clap::{Args, Parser, Subcommand, ValueEnum};
use scout_runtime::KeyStrategy;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum StrategyArg {
    /// Raw module name
    ModuleName,
    /// Module name without "<prefix>-"
    StripPrefix,
    /// Value of --key-property on the imported export
    Property,
    /// Result of calling --key-property on the imported export
    Method,
    /// Leave storage to configure hooks (prints an empty dictionary)
    Custom,
}

impl From<StrategyArg> for KeyStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::ModuleName => KeyStrategy::ModuleName,
            StrategyArg::StripPrefix => KeyStrategy::StripPrefix,
            StrategyArg::Property => KeyStrategy::Property,
            StrategyArg::Method => KeyStrategy::Method,
            StrategyArg::Custom => KeyStrategy::Custom,
        }
    }
}

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "plugscout - convention-based plugin discovery", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct DiscoverArgs {
    /// Plugin name prefix (a trailing dash is ignored)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Dictionary key strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Property read (or called) by the property/method strategies
    #[arg(long)]
    pub key_property: Option<String>,

    /// Extra directory to scan (repeatable)
    #[arg(long = "search-path")]
    pub search_paths: Vec<String>,

    /// Skip <cwd>/<modules_dir>
    #[arg(long)]
    pub no_cwd: bool,

    /// Skip the package manager's global directory
    #[arg(long)]
    pub no_global: bool,

    /// Import this named export from every plugin
    #[arg(long)]
    pub import_named: Option<String>,

    /// Export used when the named export is missing
    #[arg(long)]
    pub named_fallback: Option<String>,

    /// Run the blocking discovery path
    #[arg(long)]
    pub sync: bool,

    /// Also print root exports
    #[arg(long)]
    pub roots: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "scout.toml")]
        path: PathBuf,
    },
    /// Discover plugins and print the resulting dictionary as JSON
    Discover(DiscoverArgs),
}
