use log::LevelFilter;

use crate::config::Settings;

/// Console filter implied by the diagnostic flags. `RUST_LOG` still wins.
pub fn filter_for(settings: &Settings) -> LevelFilter {
    if settings.quiet {
        LevelFilter::Error
    } else if settings.debug && settings.level >= 3 {
        LevelFilter::Trace
    } else if settings.debug {
        LevelFilter::Debug
    } else if settings.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

pub fn init(settings: &Settings) {
    // A second init (tests, repeated runs) keeps the first logger
    let _ = env_logger::Builder::new()
        .filter_level(filter_for(settings))
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_levels() {
        let base = Settings::default();
        assert_eq!(filter_for(&base), LevelFilter::Warn);

        let verbose = Settings {
            verbose: true,
            ..base.clone()
        };
        assert_eq!(filter_for(&verbose), LevelFilter::Info);

        let debug = Settings {
            debug: true,
            ..verbose.clone()
        };
        assert_eq!(filter_for(&debug), LevelFilter::Debug);

        let trace = Settings {
            level: 4,
            ..debug.clone()
        };
        assert_eq!(filter_for(&trace), LevelFilter::Trace);

        let quiet = Settings {
            quiet: true,
            ..trace
        };
        assert_eq!(filter_for(&quiet), LevelFilter::Error);
    }
}
