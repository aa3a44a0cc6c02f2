// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::form::TransferForm;
use crate::source::LedgerSource;
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(source: &dyn LedgerSource, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let typ = sub.get_one::<String>("type").unwrap();
            let account = source.create_account(name, typ)?;
            println!("Added account '{}' ({}, id {})", account.name, typ, account.id);
        }
        Some(("list", _)) => {
            let data: Vec<Vec<String>> = source
                .list_accounts()?
                .into_iter()
                .map(|a| {
                    vec![
                        a.id,
                        a.name,
                        a.r#type.unwrap_or_default(),
                        a.balance.map(|b| b.round_dp(2).to_string()).unwrap_or_default(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Id", "Name", "Type", "Balance"], data));
        }
        Some(("transfer", sub)) => {
            let form = TransferForm {
                from_account: sub.get_one::<String>("from").unwrap().clone(),
                to_account: sub.get_one::<String>("to").unwrap().clone(),
                amount: sub.get_one::<String>("amount").unwrap().clone(),
            };
            let request = form.validate()?;
            source.transfer(&request)?;
            println!(
                "Transferred {} from {} to {}",
                request.amount, request.from_account_id, request.to_account_id
            );
        }
        _ => {}
    }
    Ok(())
}
