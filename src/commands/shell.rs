//! The interactive `invoice shell` command: a line-oriented stand-in for the invoice form.

use crate::args::{AddItemArgs, ExportArgs, SetTaxArgs};
use crate::commands::{invoice, Out};
use crate::error::{ErrorType, IntoResult};
use crate::export::Renderer;
use crate::{utils, Config, DisplayMode, Result, Session};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  name <text>       Set the client's name
  address <text>    Set the client's address
  phone <text>      Set the client's phone number
  number <text>     Set the invoice number (0001 when blank)
  add <product> | <grade> | <unit price> | <quantity>
                    Add a line item, at most 5
  tax <amount>      Set the tax amount
  rows              List the line items
  totals            Show the subtotal, tax and total
  preview           Show the invoice
  back              Go back to editing
  export [dir]      Save the previewed invoice as a PDF
  help              Show this message
  quit              Leave without saving anything";

/// Runs the shell on stdin and stdout until `quit` or the end of input.
pub async fn shell(config: Config) -> Result<Out<()>> {
    let renderer = config.renderer();
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();
    run(&config, &renderer, input, output, utils::today).await?;
    Ok("Closed the invoice shell, nothing was saved".into())
}

/// Reads commands from `input` and writes their outcomes to `output`. `today` supplies the
/// invoice date whenever the preview is opened.
pub(crate) async fn run<R, W>(
    config: &Config,
    renderer: &dyn Renderer,
    input: R,
    mut output: W,
    today: fn() -> NaiveDate,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = Session::new(config.session_settings());
    let mut lines = input.lines();
    let greeting = format!(
        "{} invoice builder, type 'help' for commands",
        config.business_name()
    );
    write(&mut output, &greeting).await?;

    loop {
        let prompt = match session.mode() {
            DisplayMode::Editing => "> ",
            DisplayMode::Previewing => "preview> ",
        };
        output
            .write_all(prompt.as_bytes())
            .await
            .pub_result(ErrorType::Io)?;
        output.flush().await.pub_result(ErrorType::Io)?;

        let Some(line) = lines.next_line().await.pub_result(ErrorType::Io)? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!("Shell command '{command}'");

        let message = match command {
            "name" | "address" | "phone" | "number" => {
                let mut client = session.client().clone();
                let field = match command {
                    "name" => &mut client.name,
                    "address" => &mut client.address,
                    "phone" => &mut client.phone,
                    _ => &mut client.invoice_number,
                };
                *field = rest.to_string();
                outcome(invoice::set_client(&mut session, client))
            }
            "add" => match rest.parse::<AddItemArgs>() {
                Ok(args) => outcome(invoice::add_item(config, &mut session, &args)),
                Err(e) => format!("Error: {e}"),
            },
            "tax" => {
                let args = SetTaxArgs {
                    tax: rest.to_string(),
                };
                outcome(invoice::set_tax(config, &mut session, &args))
            }
            "rows" => outcome(invoice::list_items(config, &session)),
            "totals" => outcome(invoice::totals(config, &session)),
            "preview" => outcome(invoice::preview(config, &mut session, today())),
            "back" => outcome(invoice::back(&mut session)),
            "export" => {
                let args = ExportArgs {
                    directory: (!rest.is_empty()).then(|| PathBuf::from(rest)),
                };
                outcome(invoice::export_invoice(config, &mut session, renderer, &args).await)
            }
            "help" => HELP.to_string(),
            "quit" | "exit" => break,
            other => format!("Unknown command '{other}', type 'help' for the list of commands"),
        };
        write(&mut output, &message).await?;
    }
    Ok(())
}

fn outcome<T>(result: Result<Out<T>>) -> String
where
    T: Serialize + Clone + Debug,
{
    match result {
        Ok(out) => out.message().to_string(),
        Err(e) => format!("Error: {e:#}"),
    }
}

async fn write<W>(output: &mut W, message: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output
        .write_all(format!("{message}\n").as_bytes())
        .await
        .pub_result(ErrorType::Io)
}
