// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command, crate_version, value_parser};

use crate::models::Category;
use crate::query::SortField;

fn type_arg(required: bool) -> Arg {
    Arg::new("type")
        .long("type")
        .help("income or expense")
        .required(required)
        .value_parser(["income", "expense"])
}

fn division_arg() -> Arg {
    Arg::new("division")
        .long("division")
        .help("personal or office")
        .value_parser(["personal", "office"])
}

fn category_arg() -> Arg {
    Arg::new("category")
        .long("category")
        .value_parser(PossibleValuesParser::new(Category::ALL.map(|c| c.as_str())))
}

fn filter_args(cmd: Command) -> Command {
    cmd.arg(type_arg(false))
        .arg(division_arg())
        .arg(category_arg())
        .arg(
            Arg::new("search")
                .long("search")
                .help("Substring of the description"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .help("Start date YYYY-MM-DD (inclusive)"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .help("End date YYYY-MM-DD (inclusive)"),
        )
}

fn limit_arg() -> Arg {
    Arg::new("limit")
        .long("limit")
        .help("Rows per page: 20, 50 or 100")
        .value_parser(value_parser!(u32))
}

fn form_args(cmd: Command, creating: bool) -> Command {
    cmd.arg(
        Arg::new("amount")
            .long("amount")
            .required(creating)
            .allow_hyphen_values(true),
    )
    .arg(Arg::new("description").long("description").required(creating))
    .arg(type_arg(false))
    .arg(category_arg())
    .arg(division_arg())
    .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
    .arg(Arg::new("time").long("time").help("HH:MM, blank means midnight"))
    .arg(
        Arg::new("account")
            .long("account")
            .help("Account id (or name for the local ledger)")
            .required(creating),
    )
}

pub fn build_cli() -> Command {
    Command::new("finledger")
        .version(crate_version!())
        .about("Income/expense ledger client with filtered, paginated transaction views")
        .subcommand(Command::new("init").about("Initialize the local store"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(
                    filter_args(Command::new("list"))
                        .arg(
                            Arg::new("sort")
                                .long("sort")
                                .value_parser(PossibleValuesParser::new(
                                    SortField::ALL.map(|f| f.as_str()),
                                )),
                        )
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .value_parser(["asc", "desc"]),
                        )
                        .arg(
                            Arg::new("page")
                                .long("page")
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(limit_arg())
                        .arg(Arg::new("json").long("json").action(ArgAction::SetTrue))
                        .arg(
                            Arg::new("jsonl")
                                .long("jsonl")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("json"),
                        )
                        .arg(
                            Arg::new("csv")
                                .long("csv")
                                .action(ArgAction::SetTrue)
                                .conflicts_with_all(["json", "jsonl"]),
                        ),
                )
                .subcommand(
                    Command::new("browse")
                        .about("Interactive paging session (type 'help' inside)")
                        .arg(limit_arg()),
                )
                .subcommand(form_args(Command::new("add"), true))
                .subcommand(form_args(
                    Command::new("edit")
                        .about("Edit a transaction (only within 12 hours of creation)")
                        .arg(Arg::new("id").long("id").required(true)),
                    false,
                ))
                .subcommand(
                    Command::new("rm").arg(Arg::new("id").long("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Accounts")
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("type").long("type").default_value("bank")),
                )
                .subcommand(
                    Command::new("transfer")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                ),
        )
}
