// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Record id")
}

fn txn_fields(cmd: Command, required: bool) -> Command {
    let field = |name, help| if required { req(name, help) } else { opt(name, help) };
    cmd.arg(field("date", "YYYY-MM-DD or DD/MM/YYYY"))
        .arg(field("amount", "Positive amount"))
        .arg(field("type", "income | expense"))
        .arg(field("account", "Account id"))
        .arg(opt("category", "Category (defaults to Other)"))
        .arg(opt("description", "Description"))
        .arg(opt("notes", "Free-form notes"))
        .arg(opt("vehicle", "Vehicle id, for a Fuel expense"))
        .arg(opt("liters", "Liters filled").requires("vehicle"))
        .arg(
            opt("odometer", "Odometer reading")
                .requires("vehicle")
                .value_parser(value_parser!(u32)),
        )
        .arg(opt("investment", "Investment id, for a Savings/Investment row"))
        .arg(opt("units", "Units bought").requires("investment"))
        .arg(opt("price", "Price per unit").requires("investment"))
}

pub fn build_cli() -> Command {
    command!()
        .about("Personal finance tracker with statement import")
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Account name"))
                        .arg(opt("bank", "Bank name").default_value(""))
                        .arg(
                            opt("type", "checking | savings | credit_card | wallet | investment")
                                .default_value("savings"),
                        )
                        .arg(opt("balance", "Opening balance").default_value("0"))
                        .arg(opt("currency", "Currency code"))
                        .arg(opt("credit-limit", "Credit limit (cards)"))
                        .arg(opt("due-date", "Payment due date (cards)")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and review transactions")
                .subcommand(txn_fields(Command::new("add"), true))
                .subcommand(txn_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("month", "YYYY-MM"))
                        .arg(opt("account", "Account id"))
                        .arg(opt("category", "Category"))
                        .arg(opt("limit", "Max rows").value_parser(value_parser!(usize))),
                )),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly category budgets")
                .subcommand(
                    Command::new("set")
                        .arg(req("category", "Category"))
                        .arg(req("limit", "Monthly limit")),
                )
                .subcommand(Command::new("rm").arg(req("category", "Category")))
                .subcommand(json_flags(
                    Command::new("report").arg(opt("month", "YYYY-MM, defaults to this month")),
                )),
        )
        .subcommand(
            Command::new("category")
                .about("Custom categories")
                .subcommand(Command::new("add").arg(Arg::new("name").required(true)))
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("vehicle")
                .about("Vehicles")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Display name"))
                        .arg(opt("make", "Make").default_value(""))
                        .arg(opt("model", "Model").default_value(""))
                        .arg(opt("year", "Model year").value_parser(value_parser!(i32)))
                        .arg(opt("plate", "License plate").default_value(""))
                        .arg(opt("type", "car | bike | ...").default_value("car"))
                        .arg(
                            opt("mileage", "Current odometer")
                                .value_parser(value_parser!(u32))
                                .default_value("0"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("fuel")
                .about("Fuel logs")
                .subcommand(
                    Command::new("add")
                        .arg(req("vehicle", "Vehicle id"))
                        .arg(opt("account", "Account the fill was paid from"))
                        .arg(req("date", "Fill date"))
                        .arg(req("liters", "Liters"))
                        .arg(req("cost", "Total cost"))
                        .arg(
                            req("mileage", "Odometer at fill")
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(opt("vehicle", "Vehicle id")),
                )),
        )
        .subcommand(
            Command::new("investment")
                .about("Investment holdings")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Holding name"))
                        .arg(
                            opt("type", "stocks | funds | bonds | gold | fd | crypto | other")
                                .default_value("other"),
                        )
                        .arg(req("invested", "Amount invested"))
                        .arg(opt("current", "Current value, defaults to invested"))
                        .arg(opt("quantity", "Units held"))
                        .arg(opt("date", "Purchase date")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("import")
                .about("Import bank statements")
                .subcommand(json_flags(
                    Command::new("csv")
                        .arg(req("path", "CSV file"))
                        .arg(opt("date-col", "Date column").default_value("date"))
                        .arg(opt("desc-col", "Description column").default_value("description"))
                        .arg(opt("amount-col", "Amount column"))
                        .arg(opt("debit-col", "Debit column"))
                        .arg(opt("credit-col", "Credit column"))
                        .arg(opt("type-col", "Direction column"))
                        .arg(opt("category-col", "Category column"))
                        .arg(opt("account-col", "Account name column"))
                        .arg(opt("account", "Import every row into this account id")),
                ))
                .subcommand(json_flags(
                    Command::new("pdf")
                        .arg(req("path", "PDF statement"))
                        .arg(opt("password", "Statement password"))
                        .arg(
                            Arg::new("create-detected")
                                .long("create-detected")
                                .action(ArgAction::SetTrue)
                                .help("Create accounts the statement mentions"),
                        )
                        .arg(opt("default-account", "Fallback account id"))
                        .arg(
                            Arg::new("dry-run")
                                .long("dry-run")
                                .action(ArgAction::SetTrue)
                                .help("Show the extracted rows without importing"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("inbox")
                        .arg(req("path", "Text file of messages, separated by blank lines"))
                        .arg(req("account", "Account id for every parsed transaction")),
                )),
        )
        .subcommand(
            Command::new("insights")
                .about("Spending advice for recent activity")
                .arg(
                    opt("recent", "How many recent transactions to send")
                        .value_parser(value_parser!(usize))
                        .default_value("50"),
                ),
        )
}
