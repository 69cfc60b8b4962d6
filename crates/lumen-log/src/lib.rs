//! Structured logging for Lumen scene builds.
//!
//! Scene construction never aborts on bad input; it degrades (error texture,
//! skipped sub-mesh, missing object) and reports every degradation through
//! `tracing`. This crate installs the subscriber that makes those reports
//! visible.
//!
//! A bare level in `debug.log_level` (`"debug"`) applies to the Lumen crates
//! only; dependencies stay at `warn`. A full directive string
//! (`"info,lumen_scene=trace"`) is used as given, and `RUST_LOG` wins over
//! both.

use lumen_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Targets that log through this subscriber. `lumen_config` reaches it via
/// the `log` bridge.
const LUMEN_TARGETS: &[&str] = &[
    "lumen_config",
    "lumen_host",
    "lumen_texture",
    "lumen_shader",
    "lumen_mesh",
    "lumen_scene",
    "lumen_demo",
];

/// Level for everything outside [`LUMEN_TARGETS`].
const DEPENDENCY_LEVEL: &str = "warn";

const DEFAULT_LEVEL: &str = "info";

const LOG_FILE: &str = "lumen.log";

/// Install the global subscriber.
///
/// Console output carries uptime, target and the thread name, so messages
/// from a render job (thread `lumen-render`) stand apart from scene
/// construction. Debug builds with a `log_dir` also write JSON lines to
/// `<log_dir>/lumen.log`.
///
/// ```no_run
/// use lumen_config::Config;
///
/// let config = Config::default();
/// lumen_log::init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let log_file = log_dir.filter(|_| debug_build).and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        std::fs::File::create(dir.join(LOG_FILE)).ok()
    });
    match log_file {
        Some(file) => {
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::uptime())
                .json();
            subscriber.with(file_layer).init();
        }
        None => subscriber.init(),
    }
}

/// Filter used when neither `RUST_LOG` nor a config is given.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(lumen_directives(DEFAULT_LEVEL))
}

/// `warn` for dependencies, `level` for every Lumen crate.
fn lumen_directives(level: &str) -> String {
    LUMEN_TARGETS
        .iter()
        .fold(DEPENDENCY_LEVEL.to_string(), |mut directives, target| {
            directives.push_str(&format!(",{target}={level}"));
            directives
        })
}

fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LEVEL);
    if level.contains(['=', ',']) {
        level.to_string()
    } else {
        lumen_directives(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_targets_lumen_crates() {
        let filter = default_env_filter().to_string();
        assert!(filter.contains("lumen_scene=info"));
        assert!(filter.contains("lumen_texture=info"));
        assert!(filter.starts_with("warn"));
    }

    #[test]
    fn test_bare_level_applies_to_lumen_crates_only() {
        let mut config = Config::default();
        config.debug.log_level = "debug".to_string();
        let directives = filter_directives(Some(&config));
        assert!(directives.starts_with("warn,"));
        for target in LUMEN_TARGETS {
            assert!(directives.contains(&format!("{target}=debug")));
        }
    }

    #[test]
    fn test_full_directive_is_used_verbatim() {
        let mut config = Config::default();
        config.debug.log_level = "info,lumen_scene=trace".to_string();
        assert_eq!(filter_directives(Some(&config)), "info,lumen_scene=trace");
    }

    #[test]
    fn test_empty_level_falls_back_to_default() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directives(Some(&config)), lumen_directives(DEFAULT_LEVEL));
        assert_eq!(filter_directives(None), lumen_directives(DEFAULT_LEVEL));
    }

    #[test]
    fn test_directives_parse() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(lumen_directives(level)).is_ok());
        }
    }
}
