//! Console front end: prompts for a selection and its arguments, hands the
//! request to a [`Dispatcher`] and renders the response.
use std::io::{self, BufRead, Write};

use crate::dispatch::{Dispatcher, Request, Response, Selection};
use crate::error::InputError;
use crate::record::Record;
use crate::session::Session;

const RULE: &str = "---------------------------------------------------------------";

pub fn show_menu<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "==================================")?;
    writeln!(writer, "      Product CRUD Menu")?;
    writeln!(writer, "==================================")?;
    for selection in Selection::ALL {
        writeln!(writer, "{}. {}", selection.key(), selection.label())?;
    }
    write!(writer, "Enter your choice: ")?;
    writer.flush()
}

/// Print `label` and read one line. `None` at end of input.
fn ask<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(writer, "{label}")?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

macro_rules! ask {
    ($reader:expr, $writer:expr, $label:expr) => {
        match ask($reader, $writer, $label)? {
            Some(line) => line,
            None => return Ok(None),
        }
    };
}

/// Show the menu and collect one request.
///
/// Returns `Ok(None)` when input ends, and `Some(Err(_))` for an unknown
/// menu choice.
pub fn prompt<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> io::Result<Option<Result<Request, InputError>>> {
    show_menu(writer)?;
    let choice = ask!(reader, writer, "");
    let selection = match choice.parse::<Selection>() {
        Ok(selection) => selection,
        Err(e) => return Ok(Some(Err(e))),
    };

    let request = match selection {
        Selection::Create => {
            writeln!(writer, "\n--- Create New Product ---")?;
            Request::Create {
                name: ask!(reader, writer, "Enter Product Name: "),
                price: ask!(reader, writer, "Enter Price: "),
                quantity: ask!(reader, writer, "Enter Quantity: "),
            }
        }
        Selection::ReadAll => Request::ReadAll,
        Selection::Update => {
            writeln!(writer, "\n--- Update Product ---")?;
            Request::Update {
                id: ask!(reader, writer, "Enter Product ID to update: "),
                name: ask!(reader, writer, "Enter New Product Name: "),
                price: ask!(reader, writer, "Enter New Price: "),
                quantity: ask!(reader, writer, "Enter New Quantity: "),
            }
        }
        Selection::Delete => {
            writeln!(writer, "\n--- Delete Product ---")?;
            Request::Delete {
                id: ask!(reader, writer, "Enter Product ID to delete: "),
            }
        }
        Selection::Exit => Request::Exit,
    };
    Ok(Some(Ok(request)))
}

fn render_records<W: Write>(writer: &mut W, records: &[Record]) -> io::Result<()> {
    writeln!(writer, "\n--- All Products in Database ---")?;
    if records.is_empty() {
        return writeln!(writer, "No products found.");
    }

    writeln!(writer, "{RULE}")?;
    writeln!(
        writer,
        "{:<10} | {:<25} | {:<10} | {:<10}",
        "ID", "Name", "Price", "Quantity"
    )?;
    writeln!(writer, "{RULE}")?;
    for r in records {
        writeln!(
            writer,
            "{:<10} | {:<25} | ${:<9.2} | {:<10}",
            r.id, r.name, r.unit_price, r.quantity
        )?;
    }
    writeln!(writer, "{RULE}")
}

pub fn render<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    match response {
        Response::Records(records) => render_records(writer, records)?,
        Response::Mutation(outcome) if outcome.is_success() => {
            writeln!(writer, "[SUCCESS] {}", outcome.message())?
        }
        Response::Exit => writeln!(writer, "Exiting application. Goodbye!")?,
        other => {
            if let Some(report) = other.report() {
                writeln!(writer, "{report}")?;
            }
        }
    }
    writer.flush()
}

/// Prompt, dispatch and render until the user exits or input ends.
pub fn run<S, R, W>(
    dispatcher: &mut Dispatcher<S>,
    mut reader: R,
    mut writer: W,
) -> io::Result<()>
where
    S: Session,
    R: BufRead,
    W: Write,
{
    loop {
        let request = match prompt(&mut reader, &mut writer)? {
            None => break,
            Some(Ok(request)) => request,
            Some(Err(error)) => {
                render(&mut writer, &Response::Rejected(error))?;
                continue;
            }
        };

        let response = dispatcher.dispatch(request);
        render(&mut writer, &response)?;
        if response.is_exit() {
            break;
        }
    }
    Ok(())
}
