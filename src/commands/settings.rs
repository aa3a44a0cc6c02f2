// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{Settings, set_setting};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap();
            set_setting(conn, key, value)?;
            println!("Set {}", key);
        }
        Some(("show", _)) | None => {
            let s = Settings::load(conn)?;
            let rows = vec![
                vec!["source".into(), format!("{:?}", s.source).to_lowercase()],
                vec!["api_url".into(), s.api_url.clone()],
                vec![
                    "api_token".into(),
                    if s.api_token.is_some() { "(set)" } else { "(unset)" }.into(),
                ],
                vec!["api_limit".into(), s.api_limit.to_string()],
                vec!["display_limit".into(), s.display_limit.to_string()],
            ];
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
