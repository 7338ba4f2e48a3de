//! Parsing of command-line and edit input.

use crate::error::{Error, Result};
use crate::state::Action;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Turn a `:`-command into an action.
///
/// ```text
/// :ign <name>        set the in-game name used in listings
/// :divine <chaos>    set chaos per divine
/// :league <id>       switch league
/// :pay <divines>     divines the buyer pays with
/// :export            write the listing to disk
/// :q                 quit
/// ```
pub fn parse_command(input: &str) -> Result<Action> {
    let input = input.trim().trim_start_matches(':');
    let (name, arg) = match input.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (input, ""),
    };

    match name {
        "ign" => {
            if arg.is_empty() {
                return Err(Error::validation("usage: :ign <name>"));
            }
            Ok(Action::SetDisplayName(arg.to_string()))
        }
        "divine" => match parse_price(arg)? {
            Some(price) if price > Decimal::ZERO => Ok(Action::SetDivinePrice(price)),
            _ => Err(Error::validation("usage: :divine <chaos per divine>")),
        },
        "league" => {
            if arg.is_empty() {
                return Err(Error::validation("usage: :league <id>"));
            }
            Ok(Action::SelectLeague(arg.to_string()))
        }
        "pay" => arg
            .parse::<u32>()
            .map(Action::SetPayment)
            .map_err(|_| Error::validation("usage: :pay <divines>")),
        "export" => Ok(Action::ExportListing),
        "q" | "quit" => Ok(Action::Quit),
        "" => Err(Error::validation("empty command")),
        other => Err(Error::validation(format!("unknown command ':{other}'"))),
    }
}

/// A price edit: empty clears the custom price.
pub fn parse_price(input: &str) -> Result<Option<Decimal>> {
    let input = input.trim().trim_end_matches(['c', 'C']);
    if input.is_empty() {
        return Ok(None);
    }
    let price = Decimal::from_str(input)
        .map_err(|_| Error::validation(format!("'{input}' is not a price")))?;
    if price < Decimal::ZERO {
        return Err(Error::validation("price cannot be negative"));
    }
    Ok(Some(price))
}

/// A quantity edit: empty restores the fetched quantity.
pub fn parse_quantity(input: &str) -> Result<Option<u32>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::validation(format!(
            "'{input}' is not a quantity of at least 1"
        ))),
        Ok(n) => Ok(Some(n)),
    }
}
