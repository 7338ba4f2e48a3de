//! Event handling for compass-trader.
//!
//! Terminal input is turned into [`Action`](crate::state::Action)s here;
//! nothing in this module touches state directly.

mod command;
mod handler;
mod input;

pub use command::{parse_command, parse_price, parse_quantity};
pub use handler::EventHandler;
pub use input::{KeyAction, KeyBinding, Keymap};
