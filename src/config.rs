use crate::rules::StreakPolicy;
use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub port: u16,
    pub streak_policy: StreakPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let data_dir = lookup("HABIT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|err| format!("invalid PORT '{value}': {err}"))?,
            None => 8080,
        };

        let streak_policy = match lookup("HABIT_STREAK_POLICY") {
            Some(value) => value.parse()?,
            None => StreakPolicy::default(),
        };

        Ok(Self {
            data_dir,
            port,
            streak_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.streak_policy, StreakPolicy::Cadence);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("HABIT_DATA_DIR", "/tmp/habits"),
            ("PORT", "9090"),
            ("HABIT_STREAK_POLICY", "counter"),
        ])
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/habits"));
        assert_eq!(config.port, 9090);
        assert_eq!(config.streak_policy, StreakPolicy::Counter);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("PORT", "http")]).is_err());
        assert!(config(&[("HABIT_STREAK_POLICY", "strict")]).is_err());
    }
}
