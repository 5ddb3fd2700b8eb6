use crate::errors::{AppError, AppResult};
use regex::Regex;

/// Recognises shard table names: the configured prefix followed by exactly six digits.
#[derive(Debug, Clone)]
pub struct ShardPattern {
    re: Regex,
}

impl ShardPattern {
    pub fn new(prefix: &str) -> AppResult<Self> {
        let re = Regex::new(&format!(r"^{}[0-9]{{6}}$", regex::escape(prefix)))
            .map_err(|e| AppError::Config(format!("invalid shard prefix '{}': {}", prefix, e)))?;
        Ok(Self { re })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.re.is_match(name)
    }

    /// Quoted identifier for a shard, refusing anything that is not a shard name.
    /// Shard names are interpolated into SQL, so this is the only way they get there.
    pub fn quoted(&self, name: &str) -> AppResult<String> {
        if !self.matches(name) {
            return Err(AppError::InvalidShard(name.to_string()));
        }
        Ok(format!("\"{}\"", name))
    }
}
