// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use finledger::config::Settings;
use finledger::{cli, commands, db};

fn main() -> Result<()> {
    env_logger::init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("tx", sub)) => {
            let settings = Settings::load(&conn)?;
            let source = commands::open_source(&conn, &settings)?;
            commands::transactions::handle(source.as_ref(), &settings, sub)?;
        }
        Some(("account", sub)) => {
            let settings = Settings::load(&conn)?;
            let source = commands::open_source(&conn, &settings)?;
            commands::accounts::handle(source.as_ref(), sub)?;
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
