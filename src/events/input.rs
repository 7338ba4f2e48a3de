//! Key bindings.
//!
//! Bindings are written in the config file as strings such as `q`,
//! `Enter`, `Ctrl+c` or `F5`, and parsed once at startup into a
//! [`Keymap`].

use crate::config::KeyBindings;
use crate::error::{Error, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::str::FromStr;

/// A single parsed key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    code: KeyCode,
    ctrl: bool,
    alt: bool,
}

impl KeyBinding {
    /// Whether `event` triggers this binding.
    ///
    /// Shift is not compared: for characters it is already part of the
    /// character (`?` vs `/`).
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.code == self.code
            && event.modifiers.contains(KeyModifiers::CONTROL) == self.ctrl
            && event.modifiers.contains(KeyModifiers::ALT) == self.alt
    }
}

impl FromStr for KeyBinding {
    type Err = Error;

    fn from_str(binding: &str) -> Result<Self> {
        let mut ctrl = false;
        let mut alt = false;
        let mut key = None;

        // A lone "+" is the plus key, not a separator.
        let parts: Vec<&str> = if binding == "+" {
            vec!["+"]
        } else {
            binding.split('+').collect()
        };

        for part in parts {
            match part.to_lowercase().as_str() {
                "ctrl" => ctrl = true,
                "alt" => alt = true,
                "shift" => {}
                _ if key.is_none() => key = Some(part),
                _ => return Err(Error::config(format!("key binding '{binding}' names two keys"))),
            }
        }

        let key = key.ok_or_else(|| Error::config(format!("key binding '{binding}' has no key")))?;
        let code = match key.to_lowercase().as_str() {
            "enter" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "tab" => KeyCode::Tab,
            "space" => KeyCode::Char(' '),
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            s if s.len() > 1 && s.starts_with('f') && s[1..].parse::<u8>().is_ok() => {
                KeyCode::F(s[1..].parse().unwrap_or_default())
            }
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    // Ctrl+C arrives as Char('c').
                    (Some(c), None) if ctrl => KeyCode::Char(c.to_ascii_lowercase()),
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(Error::config(format!("unknown key '{key}' in binding '{binding}'"))),
                }
            }
        };

        Ok(Self { code, ctrl, alt })
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::Esc => write!(f, "Esc"),
            KeyCode::PageUp => write!(f, "PgUp"),
            KeyCode::PageDown => write!(f, "PgDn"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Things a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Quit,
    Help,
    Up,
    Down,
    Select,
    Refresh,
    Fetch,
    CancelFetch,
    TabsView,
    ItemsView,
    ListingView,
    Search,
    Command,
    EditValue,
    EditQuantity,
    ClearValue,
    SortName,
    SortQuantity,
    SortPrice,
    SortTotal,
    GenerateListing,
}

impl KeyAction {
    pub const ALL: [KeyAction; 21] = [
        Self::Quit,
        Self::Help,
        Self::Up,
        Self::Down,
        Self::Select,
        Self::Refresh,
        Self::Fetch,
        Self::CancelFetch,
        Self::TabsView,
        Self::ItemsView,
        Self::ListingView,
        Self::Search,
        Self::Command,
        Self::EditValue,
        Self::EditQuantity,
        Self::ClearValue,
        Self::SortName,
        Self::SortQuantity,
        Self::SortPrice,
        Self::SortTotal,
        Self::GenerateListing,
    ];

    fn configured(self, bindings: &KeyBindings) -> &str {
        match self {
            Self::Quit => &bindings.quit,
            Self::Help => &bindings.help,
            Self::Up => &bindings.up,
            Self::Down => &bindings.down,
            Self::Select => &bindings.select,
            Self::Refresh => &bindings.refresh,
            Self::Fetch => &bindings.fetch,
            Self::CancelFetch => &bindings.cancel_fetch,
            Self::TabsView => &bindings.tabs_view,
            Self::ItemsView => &bindings.items_view,
            Self::ListingView => &bindings.listing_view,
            Self::Search => &bindings.search,
            Self::Command => &bindings.command,
            Self::EditValue => &bindings.edit_value,
            Self::EditQuantity => &bindings.edit_quantity,
            Self::ClearValue => &bindings.clear_value,
            Self::SortName => &bindings.sort_name,
            Self::SortQuantity => &bindings.sort_quantity,
            Self::SortPrice => &bindings.sort_price,
            Self::SortTotal => &bindings.sort_total,
            Self::GenerateListing => &bindings.generate_listing,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::Help => "Toggle help",
            Self::Up => "Move up",
            Self::Down => "Move down",
            Self::Select => "Select tab / row",
            Self::Refresh => "Reload leagues and tabs",
            Self::Fetch => "Fetch and price selected tabs",
            Self::CancelFetch => "Cancel running fetch",
            Self::TabsView => "Tabs view",
            Self::ItemsView => "Items view",
            Self::ListingView => "Listing view",
            Self::Search => "Search rows",
            Self::Command => "Command (:ign, :divine, :league, :pay, :export)",
            Self::EditValue => "Edit price",
            Self::EditQuantity => "Edit quantity",
            Self::ClearValue => "Clear custom price",
            Self::SortName => "Sort by name",
            Self::SortQuantity => "Sort by quantity",
            Self::SortPrice => "Sort by price",
            Self::SortTotal => "Sort by total",
            Self::GenerateListing => "Generate listing",
        }
    }
}

/// Parsed key bindings.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(KeyAction, KeyBinding)>,
}

impl Keymap {
    /// Parse every configured binding; the first bad one is an error.
    pub fn from_config(bindings: &KeyBindings) -> Result<Self> {
        let bindings = KeyAction::ALL
            .iter()
            .map(|&action| Ok((action, action.configured(bindings).parse()?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bindings })
    }

    /// The action bound to `event`, if any. Earlier actions win on conflicts.
    pub fn lookup(&self, event: &KeyEvent) -> Option<KeyAction> {
        self.bindings
            .iter()
            .find(|(_, binding)| binding.matches(event))
            .map(|(action, _)| *action)
    }

    pub fn binding(&self, action: KeyAction) -> Option<&KeyBinding> {
        self.bindings
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, binding)| binding)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(KeyAction, KeyBinding)> {
        self.bindings.iter()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeyBindings::default()).unwrap_or(Self {
            bindings: Vec::new(),
        })
    }
}
