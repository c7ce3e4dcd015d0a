//! Insert retry configuration for write contention.

use backon::ConstantBuilder;
use std::time::Duration;

/// Configuration for retrying inserts that hit a locked database.
///
/// The backoff is constant, not exponential: a locked SQLite writer clears
/// in one bounded step, and the service contract fixes the schedule at
/// 3 attempts total with a 1-second pause between them.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total insert attempts, including the first one.
    pub max_attempts: usize,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Creates a RetryConfig from environment variables.
    ///
    /// Environment variables:
    /// - `NEXUM_RETRY_MAX_ATTEMPTS`: Total insert attempts (default: 3)
    /// - `NEXUM_RETRY_DELAY_MS`: Delay between attempts in ms (default: 1000)
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_attempts: std::env::var("NEXUM_RETRY_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(default.max_attempts),
            delay: std::env::var("NEXUM_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default.delay),
        }
    }

    /// Creates the constant backoff builder.
    ///
    /// `max_times` counts retries after the first attempt, hence the -1.
    pub fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The from_env tests mutate shared process environment; serialize them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay, Duration::from_secs(1));
    }

    #[test]
    fn test_from_env_with_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("NEXUM_RETRY_MAX_ATTEMPTS");
        std::env::remove_var("NEXUM_RETRY_DELAY_MS");

        let config = RetryConfig::from_env();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay, Duration::from_secs(1));
    }

    #[test]
    fn test_from_env_with_custom_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("NEXUM_RETRY_MAX_ATTEMPTS", "5");
        std::env::set_var("NEXUM_RETRY_DELAY_MS", "250");

        let config = RetryConfig::from_env();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.delay, Duration::from_millis(250));

        std::env::remove_var("NEXUM_RETRY_MAX_ATTEMPTS");
        std::env::remove_var("NEXUM_RETRY_DELAY_MS");
    }

    #[test]
    fn test_from_env_ignores_invalid_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("NEXUM_RETRY_MAX_ATTEMPTS", "0");
        std::env::set_var("NEXUM_RETRY_DELAY_MS", "not_a_number");

        let config = RetryConfig::from_env();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay, Duration::from_secs(1));

        std::env::remove_var("NEXUM_RETRY_MAX_ATTEMPTS");
        std::env::remove_var("NEXUM_RETRY_DELAY_MS");
    }
}
