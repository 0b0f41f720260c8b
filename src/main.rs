//! cellgrid - a live-recalculating cell grid driven from the command line

mod commands;
mod config;
mod error;
mod logger;

use anyhow::Context;
use cellgrid_core::{SheetConfig, Spreadsheet};
use std::env;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use commands::{Command, execute, parse_command};

fn print_usage() {
    eprintln!("Usage: cellgrid [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMDS>      Run ';'-separated commands and exit");
    eprintln!("  --config <FILE>           Read configuration from FILE");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  --rows <N>                Initial number of rows");
    eprintln!("  --cols <N>                Initial number of columns");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("{}", commands::HELP);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut command: Option<String> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut no_config = false;
    let mut rows: Option<usize> = None;
    let mut cols: Option<usize> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a value");
                    std::process::exit(1);
                }
                command = Some(args[i].to_string());
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            "--no-config" => no_config = true,
            flag @ ("--rows" | "--cols") => {
                i += 1;
                let Some(value) = args.get(i).and_then(|v| v.parse::<usize>().ok()) else {
                    eprintln!("Error: {} requires a number", flag);
                    std::process::exit(1);
                };
                if flag == "--rows" {
                    rows = Some(value);
                } else {
                    cols = Some(value);
                }
            }
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (config, warnings) = if no_config {
        (config::AppConfig::default(), Vec::new())
    } else {
        config::load_config(config_file.as_ref())
    };
    logger::init_logging(config.log_level.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let sheet_config = SheetConfig {
        rows: rows.unwrap_or(config.sheet.rows),
        columns: cols.unwrap_or(config.sheet.columns),
    };
    let mut sheet = Spreadsheet::new(sheet_config);

    let result = match command {
        Some(script) => run_commands(&mut sheet, &script),
        None => run_interactive(&mut sheet),
    };
    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Run `;`-separated commands. Returns false if any of them failed.
fn run_commands(sheet: &mut Spreadsheet, script: &str) -> anyhow::Result<bool> {
    let mut stdout = std::io::stdout().lock();
    let mut ok = true;
    for line in script.split(';') {
        match parse_command(line).and_then(|c| c.map(|c| execute(sheet, c)).transpose()) {
            Ok(Some(output)) if !output.is_empty() => {
                writeln!(stdout, "{}", output).context("writing output")?
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                ok = false;
            }
        }
    }
    Ok(ok)
}

/// Read commands from stdin until EOF or `quit`.
fn run_interactive(sheet: &mut Spreadsheet) -> anyhow::Result<bool> {
    let stdin = std::io::stdin();
    let prompt = stdin.is_terminal();
    let mut stdout = std::io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        if prompt {
            write!(stdout, "> ").context("writing prompt")?;
            stdout.flush().context("flushing prompt")?;
        }
        let Some(line) = lines.next() else {
            return Ok(true);
        };
        let line = line.context("reading command")?;
        match parse_command(&line) {
            Ok(Some(Command::Quit)) => return Ok(true),
            Ok(Some(command)) => match execute(sheet, command) {
                Ok(output) if !output.is_empty() => {
                    writeln!(stdout, "{}", output).context("writing output")?
                }
                Ok(_) => {}
                Err(e) => eprintln!("Error: {}", e),
            },
            Ok(None) => {}
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}
