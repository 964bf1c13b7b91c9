use log::warn;
use std::env;
use std::str::FromStr;

use crate::blockchain::{BASE_REWARD, DEFAULT_DIFFICULTY, HASH_MODULO, MAX_BLOCK_REWARD};

/// Runtime settings, read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub difficulty: u64,
    pub block_reward: u64,
    pub recent_blocks: usize,
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            difficulty: DEFAULT_DIFFICULTY,
            block_reward: BASE_REWARD,
            recent_blocks: 5,
            event_capacity: 1000,
        }
    }
}

impl Config {
    /// Build from environment variables (after `dotenv()`), keeping defaults
    /// for anything unset or malformed.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let difficulty = parse_var("BABY_DIFFICULTY", defaults.difficulty);
        let difficulty = if difficulty > HASH_MODULO {
            warn!(
                "BABY_DIFFICULTY={} exceeds hash modulo {}, using {}",
                difficulty, HASH_MODULO, defaults.difficulty
            );
            defaults.difficulty
        } else {
            difficulty
        };

        let block_reward = parse_var("BABY_BLOCK_REWARD", defaults.block_reward);
        let block_reward = if block_reward > MAX_BLOCK_REWARD {
            warn!(
                "BABY_BLOCK_REWARD={} exceeds {}, using {}",
                block_reward, MAX_BLOCK_REWARD, defaults.block_reward
            );
            defaults.block_reward
        } else {
            block_reward
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port),
            difficulty,
            block_reward,
            recent_blocks: parse_var("BABY_RECENT_BLOCKS", defaults.recent_blocks),
            event_capacity: parse_var("BABY_EVENT_CAPACITY", defaults.event_capacity),
        }
    }
}

fn parse_var<T: FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{key}={raw:?} is not valid, using {default}");
            default
        }),
        Err(_) => default,
    }
}
