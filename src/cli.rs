//! Clap adapter for command-line overrides.
//!
//! Compiled only with the `clap` Cargo feature (on by default). The core has
//! no dependency on clap: [`OverrideArgs::into_overrides`] produces the same
//! dotted `(key, value)` pairs that
//! [`ScopeRegistry::register_command_line`](crate::ScopeRegistry::register_command_line)
//! accepts from any other source.

use clap::Args;
use toml::Value;

use crate::error::ScopefigError;
use crate::overrides;

/// Repeatable `--set KEY=VALUE` flags for the command-line override scope.
///
/// Embed this into your app's clap derive:
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     overrides: OverrideArgs,
/// }
/// ```
#[derive(Debug, Default, Args)]
pub struct OverrideArgs {
    /// Override a configuration key for every variant (e.g. "promote.commit=false").
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl OverrideArgs {
    /// Parse every `--set` into a dotted key and a typed value.
    ///
    /// Values go through the same bool, integer, float, string heuristic as
    /// [`overrides::parse_value`]. Later flags for the same key win.
    pub fn into_overrides(self) -> Result<Vec<(String, Value)>, ScopefigError> {
        self.set
            .iter()
            .map(|raw| overrides::parse_assignment(raw))
            .collect()
    }
}
