//! Log configuration.
//!
//! Log messages describe what the simulator is doing; they are separate from the counts it
//! reports. The usual `log` macros are re-exported here. Nothing is logged until a level is
//! set, either with `--log-level` on the command line or from code:
//!
//! ```rust
//! use flusim::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! set_log_level(LevelFilter::Info);
//! // Trace the counts of every tick, but keep the rest at `info`.
//! set_module_filter("flusim::engine", LevelFilter::Trace);
//! ```
//!
//! With the `logging` feature, messages go to stderr through `log4rs`. Without it only the
//! maximum level of the `log` facade is set.
#[cfg(all(feature = "logging", feature = "progress_bar"))]
mod clear_line;
#[cfg(feature = "logging")]
mod console;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use crate::error::SimError;

/// A global level plus per-module overrides, keyed by module path (`"flusim::engine"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSpec {
    pub level: LevelFilter,
    pub modules: BTreeMap<String, LevelFilter>,
}

impl Default for LogSpec {
    fn default() -> Self {
        LogSpec {
            level: LevelFilter::Off,
            modules: BTreeMap::new(),
        }
    }
}

impl LogSpec {
    /// The most verbose level any module may log at.
    #[must_use]
    pub fn max_level(&self) -> LevelFilter {
        self.modules
            .values()
            .copied()
            .fold(self.level, Ord::max)
    }
}

/// Parses a `--log-level` argument: either a bare level (`info`) or comma separated
/// `module=level` pairs, which leave other modules at `error`. The last bare level wins.
impl FromStr for LogSpec {
    type Err = SimError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let level = |name: &str| {
            LevelFilter::from_str(name.trim())
                .map_err(|_| SimError::SimError(format!("unknown log level: {}", name.trim())))
        };

        let mut spec = LogSpec {
            level: LevelFilter::Error,
            modules: BTreeMap::new(),
        };
        for part in text.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            if let Some((module, name)) = part.split_once('=') {
                spec.modules.insert(module.trim().to_string(), level(name)?);
            } else {
                spec.level = level(part)?;
            }
        }
        Ok(spec)
    }
}

/// The installed configuration. `log4rs` can be initialized once per process, so later
/// changes go through the handle it returns.
#[derive(Default)]
struct ActiveLog {
    spec: LogSpec,
    #[cfg(feature = "logging")]
    handle: Option<log4rs::Handle>,
}

#[cfg(not(feature = "logging"))]
impl ActiveLog {
    fn install(&mut self) {
        log::set_max_level(self.spec.max_level());
    }
}

static ACTIVE_LOG: LazyLock<Mutex<ActiveLog>> = LazyLock::new(Mutex::default);

fn active_log() -> MutexGuard<'static, ActiveLog> {
    ACTIVE_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

fn update(change: impl FnOnce(&mut LogSpec)) {
    let mut active = active_log();
    let before = active.spec.clone();
    change(&mut active.spec);
    if active.spec != before {
        active.install();
    }
}

/// The configuration currently in effect.
#[must_use]
pub fn current_spec() -> LogSpec {
    active_log().spec.clone()
}

/// Sets the level for modules without their own filter. `LevelFilter::Off` silences them.
pub fn set_log_level(level: LevelFilter) {
    update(|spec| spec.level = level);
}

pub fn set_module_filter(module: &str, level: LevelFilter) {
    update(|spec| {
        spec.modules.insert(module.to_string(), level);
    });
}

/// Returns `module` to the global level.
pub fn remove_module_filter(module: &str) {
    update(|spec| {
        spec.modules.remove(module);
    });
}

/// Replaces the configuration with one parsed from a `--log-level` argument.
///
/// # Errors
///
/// Returns an error if a level name is not recognized.
pub fn apply_log_spec(text: &str) -> Result<(), SimError> {
    let parsed: LogSpec = text.parse()?;
    let modules: Vec<String> = parsed.modules.keys().cloned().collect();
    update(|spec| *spec = parsed);
    for module in modules {
        info!("module filter set for {}", module);
    }
    Ok(())
}
