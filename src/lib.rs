// Home screen library entry point
// Exposes the Jump Back In and Top Sites data layer so the browser shell can
// drive it and each piece can be tested independently.

use env_logger::{Builder, Env};

// Core modules
pub mod icon_manager;
pub mod settings;

// Shared state
pub mod state;

// Pure logic modules
pub mod modules;

#[cfg(test)]
pub(crate) mod testing;

pub use icon_manager::{IconProvider, SiteImageHelper};
pub use modules::jump_back_in::{JumpBackInList, JumpBackInViewModel};
pub use modules::top_sites::HomeTopSite;
pub use settings::Settings;

const ENV_LOG: &str = "HOMESCREEN_LOG";
const ENV_LOG_STYLE: &str = "HOMESCREEN_LOG_STYLE";

/// Install the env_logger backend, `info` unless `HOMESCREEN_LOG` says otherwise.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = Builder::from_env(Env::new().filter_or(ENV_LOG, "info").write_style(ENV_LOG_STYLE)).try_init();
}
