use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{domain::ChatId, errors::Error, Result};

/// Telegram rejects forum topic names longer than this.
pub const TELEGRAM_TOPIC_NAME_LIMIT: usize = 128;

/// Typed configuration for the relay bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// JSON file backing the mapping store.
    pub database_path: PathBuf,

    /// Max characters in a created topic name.
    pub topic_name_limit: usize,

    /// Destination used only while the store has none bound yet.
    pub seed_admin_group: Option<ChatId>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let token_file = env_path("BOT_TOKEN_FILE").unwrap_or_else(|| PathBuf::from("api"));
        let telegram_bot_token = match env_str("TELEGRAM_BOT_TOKEN").and_then(non_empty) {
            Some(t) => t.trim().to_string(),
            None => read_token_file(&token_file)?.ok_or_else(|| {
                Error::Config(format!(
                    "TELEGRAM_BOT_TOKEN is not set and no token found in '{}'",
                    token_file.display()
                ))
            })?,
        };

        let database_path = env_path("RELAY_DATABASE_PATH")
            .unwrap_or_else(|| PathBuf::from("bot_database.json"));

        let topic_name_limit = env_usize("TOPIC_NAME_LIMIT")
            .unwrap_or(TELEGRAM_TOPIC_NAME_LIMIT)
            .clamp(1, TELEGRAM_TOPIC_NAME_LIMIT);

        let seed_admin_group = env_str("ADMIN_GROUP_ID")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(ChatId);

        Ok(Self {
            telegram_bot_token,
            database_path,
            topic_name_limit,
            seed_admin_group,
        })
    }
}

/// First non-empty line of the token file. A missing file is not an error.
fn read_token_file(path: &Path) -> Result<Option<String>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(contents
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Apply `KEY=value` lines from `path` without overriding variables already set.
fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };
    for (key, val) in dotenv_entries(&contents) {
        if env::var_os(key).is_none() {
            env::set_var(key, val);
        }
    }
}

/// Every value here is a token, a path, or a number, so quotes are kept verbatim.
fn dotenv_entries(contents: &str) -> impl Iterator<Item = (&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
