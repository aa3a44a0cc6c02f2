// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::query::{
    DEFAULT_API_LIMIT, DEFAULT_DISPLAY_LIMIT, DISPLAY_LIMITS, MAX_API_LIMIT, QueryState,
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const ENV_API_URL: &str = "FINLEDGER_API_URL";
pub const ENV_API_TOKEN: &str = "FINLEDGER_API_TOKEN";

pub const KEYS: [&str; 5] = ["source", "api_url", "api_token", "api_limit", "display_limit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub source: SourceKind,
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub api_limit: u32,
    pub display_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source: SourceKind::Local,
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            api_limit: DEFAULT_API_LIMIT,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

impl Settings {
    /// Stored settings only, defaults for anything unset.
    pub fn from_store(conn: &Connection) -> Result<Self> {
        let mut s = Settings::default();
        for key in KEYS {
            if let Some(v) = get_setting(conn, key)? {
                s.apply(key, &v)?;
            }
        }
        Ok(s)
    }

    /// Stored settings with environment overrides applied.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Settings::from_store(conn)?;
        if let Ok(url) = std::env::var(ENV_API_URL) {
            s.apply("api_url", &url)?;
        }
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            s.apply("api_token", &token)?;
        }
        Ok(s)
    }

    pub fn initial_query(&self) -> QueryState {
        QueryState::new(self.api_limit, self.display_limit)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "source" => {
                self.source = match value.to_lowercase().as_str() {
                    "local" => SourceKind::Local,
                    "remote" => SourceKind::Remote,
                    other => bail!("Invalid source '{}' (use local|remote)", other),
                }
            }
            "api_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    bail!("Invalid api_url '{}', expected http(s)://...", value);
                }
                self.api_url = value.to_string();
            }
            "api_token" => {
                self.api_token = Some(value.to_string()).filter(|t| !t.is_empty());
            }
            "api_limit" => {
                let n: u32 = value
                    .parse()
                    .map_err(|_| anyhow!("Invalid api_limit '{}'", value))?;
                if n == 0 || n > MAX_API_LIMIT {
                    bail!("api_limit must be between 1 and {}", MAX_API_LIMIT);
                }
                self.api_limit = n;
            }
            "display_limit" => {
                let n: u32 = value
                    .parse()
                    .map_err(|_| anyhow!("Invalid display_limit '{}'", value))?;
                if !DISPLAY_LIMITS.contains(&n) {
                    bail!("display_limit must be one of {:?}", DISPLAY_LIMITS);
                }
                self.display_limit = n;
            }
            other => bail!("Unknown setting '{}' (known: {})", other, KEYS.join(", ")),
        }
        Ok(())
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

/// Validates and stores one setting.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    Settings::default().apply(key, value)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value.trim()],
    )?;
    Ok(())
}
