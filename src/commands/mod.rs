// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod settings;
pub mod transactions;

use anyhow::Result;
use rusqlite::Connection;

use crate::config::{Settings, SourceKind};
use crate::local::SqliteLedger;
use crate::remote::RemoteLedger;
use crate::source::LedgerSource;

/// The ledger source selected by `settings`.
pub fn open_source<'a>(
    conn: &'a Connection,
    settings: &Settings,
) -> Result<Box<dyn LedgerSource + 'a>> {
    Ok(match settings.source {
        SourceKind::Local => Box::new(SqliteLedger::new(conn)),
        SourceKind::Remote => {
            log::debug!("using remote ledger at {}", settings.api_url);
            Box::new(RemoteLedger::new(
                &settings.api_url,
                settings.api_token.clone(),
            )?)
        }
    })
}
