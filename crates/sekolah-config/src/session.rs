use std::env;

use crate::parse_or;

pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Lifetime of sessions issued at login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub ttl_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_days: DEFAULT_SESSION_TTL_DAYS,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl_days = parse_or(&lookup, "SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS);

        Self {
            ttl_days: if ttl_days > 0 {
                ttl_days
            } else {
                DEFAULT_SESSION_TTL_DAYS
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_seven_days() {
        assert_eq!(SessionConfig::from_lookup(|_| None).ttl_days, 7);
    }

    #[test]
    fn test_non_positive_ttl_is_ignored() {
        let config =
            SessionConfig::from_lookup(|key| (key == "SESSION_TTL_DAYS").then(|| "0".into()));
        assert_eq!(config.ttl_days, 7);
    }

    #[test]
    fn test_custom_ttl() {
        let config =
            SessionConfig::from_lookup(|key| (key == "SESSION_TTL_DAYS").then(|| "30".into()));
        assert_eq!(config.ttl_days, 30);
    }
}
