//! Line-oriented commands driving a [`Spreadsheet`].

use cellgrid_core::{CellId, Spreadsheet};
use cellgrid_engine::engine::CellRef;

use crate::error::{CliError, Result};

pub const HELP: &str = "\
Commands:
  set <ADDR> [TEXT]          Set a cell's raw input (omit TEXT to clear)
  get <ADDR>                 Print the computed value
  edit <ADDR>                Print the edit text (formulas with current addresses)
  error <ADDR>               Print the cell's error message, if any
  insert-row <ADDR|N>        Insert a row below ADDR's row (or below row N, 0 = top)
  insert-col <ADDR|N>        Insert a column right of ADDR's column (or column N, 0 = left)
  delete-row <ADDR|N>        Delete ADDR's row (or row N)
  delete-col <ADDR|N>        Delete ADDR's column (or column N)
  sort <COL> <START> <END> [asc|desc]
                             Sort rows START..END by the numbers in COL
  show                       Print the grid
  help                       Print this help
  quit                       Leave the shell";

#[derive(Debug, PartialEq)]
pub enum Command {
    Set { address: String, text: String },
    Get(String),
    Edit(String),
    Error(String),
    InsertRow(Target),
    InsertColumn(Target),
    DeleteRow(Target),
    DeleteColumn(Target),
    Sort {
        column: String,
        start: usize,
        end: usize,
        descending: bool,
    },
    Show,
    Help,
    Quit,
}

/// Where a structural command applies: a cell's row/column or an index.
#[derive(Debug, PartialEq)]
pub enum Target {
    Anchor(String),
    Index(usize),
}

/// Parse one command line. Blank lines give `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match name.to_ascii_lowercase().as_str() {
        "set" => {
            let (address, text) = match rest.split_once(char::is_whitespace) {
                Some((address, text)) => (address, text),
                None if !rest.is_empty() => (rest, ""),
                None => return Err(CliError::Usage("set <ADDR> [TEXT]")),
            };
            Command::Set {
                address: address.to_string(),
                text: text.to_string(),
            }
        }
        "get" => Command::Get(one_arg(&args, "get <ADDR>")?),
        "edit" => Command::Edit(one_arg(&args, "edit <ADDR>")?),
        "error" => Command::Error(one_arg(&args, "error <ADDR>")?),
        "insert-row" => Command::InsertRow(target(&args, "insert-row <ADDR|N>")?),
        "insert-col" => Command::InsertColumn(target(&args, "insert-col <ADDR|N>")?),
        "delete-row" => Command::DeleteRow(target(&args, "delete-row <ADDR|N>")?),
        "delete-col" => Command::DeleteColumn(target(&args, "delete-col <ADDR|N>")?),
        "sort" => {
            const USAGE: &str = "sort <COL> <START> <END> [asc|desc]";
            let descending = match args.get(3).map(|s| s.to_ascii_lowercase()) {
                None => false,
                Some(order) if order == "asc" => false,
                Some(order) if order == "desc" => true,
                Some(_) => return Err(CliError::Usage(USAGE)),
            };
            if args.len() < 3 || args.len() > 4 {
                return Err(CliError::Usage(USAGE));
            }
            Command::Sort {
                column: args[0].to_string(),
                start: number(args[1])?,
                end: number(args[2])?,
                descending,
            }
        }
        "show" => Command::Show,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CliError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn one_arg(args: &[&str], usage: &'static str) -> Result<String> {
    match args {
        [arg] => Ok(arg.to_string()),
        _ => Err(CliError::Usage(usage)),
    }
}

fn target(args: &[&str], usage: &'static str) -> Result<Target> {
    let arg = one_arg(args, usage)?;
    Ok(match arg.parse::<usize>() {
        Ok(index) => Target::Index(index),
        Err(_) => Target::Anchor(arg),
    })
}

fn number(text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| CliError::InvalidNumber(text.to_string()))
}

/// Run a command and return what it prints.
pub fn execute(sheet: &mut Spreadsheet, command: Command) -> Result<String> {
    let output = match command {
        Command::Set { address, text } => {
            let id = sheet.resolve_address(&address)?;
            sheet.set_raw_input(id, &text)?;
            String::new()
        }
        Command::Get(address) => {
            let id = sheet.resolve_address(&address)?;
            display_value(sheet, id)
        }
        Command::Edit(address) => {
            let id = sheet.resolve_address(&address)?;
            sheet.edit_text(id)
        }
        Command::Error(address) => {
            let id = sheet.resolve_address(&address)?;
            sheet.error(id).map(|e| e.to_string()).unwrap_or_default()
        }
        Command::InsertRow(target) => {
            match target {
                Target::Index(row) => sheet.insert_row_after(row)?,
                Target::Anchor(address) => sheet.insert_row(sheet.resolve_address(&address)?)?,
            }
            String::new()
        }
        Command::InsertColumn(target) => {
            match target {
                Target::Index(col) => sheet.insert_column_after(col)?,
                Target::Anchor(address) => {
                    sheet.insert_column(sheet.resolve_address(&address)?)?
                }
            }
            String::new()
        }
        Command::DeleteRow(target) => {
            match target {
                Target::Index(row) => sheet.remove_row_at(row)?,
                Target::Anchor(address) => sheet.remove_row(sheet.resolve_address(&address)?)?,
            }
            String::new()
        }
        Command::DeleteColumn(target) => {
            match target {
                Target::Index(col) => sheet.remove_column_at(col)?,
                Target::Anchor(address) => {
                    sheet.remove_column(sheet.resolve_address(&address)?)?
                }
            }
            String::new()
        }
        Command::Sort {
            column,
            start,
            end,
            descending,
        } => {
            sheet.sort_rows(&column, start, end, descending)?;
            String::new()
        }
        Command::Show => render_table(sheet),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(output)
}

fn display_value(sheet: &Spreadsheet, id: CellId) -> String {
    sheet
        .computed_value(id)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Render the grid as a text table with row and column headings.
pub fn render_table(sheet: &Spreadsheet) -> String {
    let grid = sheet.grid();
    let rows = grid.row_count();
    let cols = grid.column_count();

    let mut table: Vec<Vec<String>> = Vec::with_capacity(rows + 1);
    let mut header = vec![String::new()];
    header.extend((1..=cols).map(|c| grid.column_label(c).unwrap_or_default().to_string()));
    table.push(header);
    for r in 1..=rows {
        let mut line = vec![grid.row_label(r).unwrap_or_default().to_string()];
        for c in 1..=cols {
            let text = grid
                .get(CellRef::new(c, r))
                .map(|id| display_value(sheet, id))
                .unwrap_or_default();
            line.push(text);
        }
        table.push(line);
    }

    let widths: Vec<usize> = (0..=cols)
        .map(|c| {
            table
                .iter()
                .map(|line| line[c].chars().count())
                .max()
                .unwrap_or(0)
                .max(1)
        })
        .collect();

    table
        .iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(text, width)| format!("{:>width$}", text, width = width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::SheetConfig;

    fn run(sheet: &mut Spreadsheet, line: &str) -> Result<String> {
        match parse_command(line)? {
            Some(command) => execute(sheet, command),
            None => Ok(String::new()),
        }
    }

    #[test]
    fn parse_set_keeps_text_verbatim() {
        assert_eq!(
            parse_command("set A1 = a2 + 1").unwrap(),
            Some(Command::Set {
                address: "A1".into(),
                text: "= a2 + 1".into()
            })
        );
        assert_eq!(
            parse_command("set B2").unwrap(),
            Some(Command::Set {
                address: "B2".into(),
                text: String::new()
            })
        );
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn parse_sort_and_targets() {
        assert_eq!(
            parse_command("sort a 5 1 desc").unwrap(),
            Some(Command::Sort {
                column: "a".into(),
                start: 5,
                end: 1,
                descending: true
            })
        );
        assert_eq!(
            parse_command("insert-row 0").unwrap(),
            Some(Command::InsertRow(Target::Index(0)))
        );
        assert_eq!(
            parse_command("delete-col B3").unwrap(),
            Some(Command::DeleteColumn(Target::Anchor("B3".into())))
        );
        assert!(matches!(parse_command("sort A x 2"), Err(CliError::InvalidNumber(_))));
        assert!(matches!(parse_command("sort A 1 2 up"), Err(CliError::Usage(_))));
        assert!(matches!(parse_command("frobnicate"), Err(CliError::UnknownCommand(_))));
    }

    #[test]
    fn execute_round_trip() {
        let mut sheet = Spreadsheet::default();
        run(&mut sheet, "set A1 5").unwrap();
        run(&mut sheet, "set B1 =a1*2").unwrap();
        assert_eq!(run(&mut sheet, "get B1").unwrap(), "10");
        assert_eq!(run(&mut sheet, "edit B1").unwrap(), "=A1*2");
        assert_eq!(run(&mut sheet, "error B1").unwrap(), "");
        run(&mut sheet, "delete-row 1").unwrap();
        assert_eq!(run(&mut sheet, "get A1").unwrap(), "");
    }

    #[test]
    fn render_table_has_headings() {
        let mut sheet = Spreadsheet::new(SheetConfig { rows: 2, columns: 2 });
        run(&mut sheet, "set A1 1").unwrap();
        run(&mut sheet, "set B2 =A1+1.5").unwrap();
        assert_eq!(render_table(&sheet), "  | A |   B\n1 | 1 |\n2 |   | 2.5");
    }
}
