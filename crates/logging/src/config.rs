//! Verbosity configuration derived from repeated `-v` flags.

use tracing::level_filters::LevelFilter;

/// How much the archive commands report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerbosityConfig {
    verbose: u8,
    show_targets: bool,
}

impl VerbosityConfig {
    /// Maps a `-v` count onto a level: warnings by default, then info,
    /// debug, and trace. Counts above three stay at trace.
    ///
    /// ```
    /// use logging::VerbosityConfig;
    /// use tracing::level_filters::LevelFilter;
    ///
    /// assert_eq!(VerbosityConfig::from_verbose_level(0).level(), LevelFilter::WARN);
    /// assert_eq!(VerbosityConfig::from_verbose_level(2).level(), LevelFilter::DEBUG);
    /// ```
    #[must_use]
    pub const fn from_verbose_level(level: u8) -> Self {
        Self {
            verbose: level,
            show_targets: level >= 2,
        }
    }

    /// Number of `-v` flags this configuration was built from.
    #[must_use]
    pub const fn verbose_level(&self) -> u8 {
        self.verbose
    }

    /// Most verbose level that is emitted.
    #[must_use]
    pub const fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Whether log lines name the event target (`archive::restart` and so on).
    #[must_use]
    pub const fn shows_targets(&self) -> bool {
        self.show_targets
    }

    /// Overrides whether targets are printed.
    #[must_use]
    pub const fn with_targets(mut self, show: bool) -> Self {
        self.show_targets = show;
        self
    }

    /// Filter directive equivalent to this configuration.
    #[must_use]
    pub fn directive(&self) -> String {
        self.level().to_string().to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_increase_with_each_flag() {
        let levels: Vec<LevelFilter> = (0..=4)
            .map(|count| VerbosityConfig::from_verbose_level(count).level())
            .collect();
        assert_eq!(
            levels,
            vec![
                LevelFilter::WARN,
                LevelFilter::INFO,
                LevelFilter::DEBUG,
                LevelFilter::TRACE,
                LevelFilter::TRACE,
            ]
        );
    }

    #[test]
    fn targets_appear_from_debug_upwards() {
        assert!(!VerbosityConfig::from_verbose_level(1).shows_targets());
        assert!(VerbosityConfig::from_verbose_level(2).shows_targets());
        assert!(
            !VerbosityConfig::from_verbose_level(3)
                .with_targets(false)
                .shows_targets()
        );
    }

    #[test]
    fn directive_is_lowercase() {
        assert_eq!(VerbosityConfig::default().directive(), "warn");
        assert_eq!(VerbosityConfig::from_verbose_level(1).directive(), "info");
    }
}
