/**
 * Message Format CLI - msgc
 *
 * Compile, pack, inspect and format message tables
 */
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};
use message_format_cli as cli;

fn command() -> Command {
    Command::new("msgc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile, pack, inspect and format message tables")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log debug output to stderr"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .help("Path to a JSON engine configuration"),
        )
        .subcommand(
            Command::new("pack")
                .about("Compile a JSON message table into a pack")
                .arg(
                    Arg::new("table")
                        .required(true)
                        .value_name("TABLE")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .required(true)
                        .value_name("PATH")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Output pack file"),
                )
                .arg(
                    Arg::new("compress")
                        .long("compress")
                        .action(ArgAction::SetTrue)
                        .help("Gzip the pack body"),
                ),
        )
        .subcommand(
            Command::new("unpack")
                .about("List codes, locales and parameters of a pack")
                .arg(
                    Arg::new("pack")
                        .required(true)
                        .value_name("PACK")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("format")
                .about("Format one message of a table or pack")
                .arg(
                    Arg::new("source")
                        .required(true)
                        .value_name("TABLE|PACK")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(Arg::new("code").required(true).value_name("CODE"))
                .arg(
                    Arg::new("locale")
                        .short('l')
                        .long("locale")
                        .value_name("TAG")
                        .help("Locale to format for"),
                )
                .arg(
                    Arg::new("param")
                        .short('p')
                        .long("param")
                        .value_name("NAME=VALUE")
                        .action(ArgAction::Append)
                        .help("Parameter value, repeatable"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse every template of a JSON table and report all errors")
                .arg(
                    Arg::new("table")
                        .required(true)
                        .value_name("TABLE")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn path<'a>(matches: &'a ArgMatches, id: &str) -> &'a Path {
    matches
        .get_one::<PathBuf>(id)
        .map(PathBuf::as_path)
        .unwrap_or_else(|| Path::new(""))
}

fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    let context = cli::load_context(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("pack", sub)) => {
            let output = path(sub, "output");
            let count = cli::pack_table(&context, path(sub, "table"), output, sub.get_flag("compress"))?;
            println!("packed {count} messages into {}", output.display());
        }
        Some(("unpack", sub)) => {
            cli::describe_pack(&context, path(sub, "pack"), &mut io::stdout().lock())?;
        }
        Some(("format", sub)) => {
            let bundle = cli::load_bundle(&context, path(sub, "source"))?;
            let code = sub.get_one::<String>("code").map(String::as_str).unwrap_or_default();
            let assignments: Vec<String> = sub
                .get_many::<String>("param")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();

            let text = cli::format_message(
                &context,
                &bundle,
                code,
                sub.get_one::<String>("locale").map(String::as_str),
                &assignments,
            )?;
            println!("{text}");
        }
        Some(("check", sub)) => {
            let table = path(sub, "table");
            let rows = cli::read_table(table)?;
            let errors = cli::check_table(&context, &rows);
            for error in &errors {
                eprintln!("{error}");
            }
            if !errors.is_empty() {
                eprintln!("{}: {} invalid templates", table.display(), errors.len());
                return Ok(false);
            }
            println!("{}: {} templates ok", table.display(), rows.len());
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(true)
}

fn main() {
    let matches = command().get_matches();
    cli::init_logging(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
