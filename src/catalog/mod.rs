//! Static lookup tables.
//!
//! Compasses carry no name of their own; what identifies them is the
//! enchant text of the sextant that charged them. [`Catalog`] maps that
//! text to the canonical name used by the price feed.

mod tables;

use std::collections::HashMap;
use std::sync::LazyLock;

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| Catalog::from_pairs(tables::COMPASSES));

static TAB_ICONS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| tables::TAB_ICONS.iter().copied().collect());

/// Case-insensitive mapping from modifier signature to canonical name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Lowercased signature -> display name.
    names: HashMap<String, String>,
}

impl Catalog {
    /// The compass table shipped with the binary.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Build a catalog from `(signature, name)` pairs.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let names = pairs
            .iter()
            .map(|(key, name)| (key.as_ref().to_lowercase(), name.as_ref().to_string()))
            .collect();
        Self { names }
    }

    /// Join modifier lines the way signatures are keyed.
    pub fn signature(mods: &[String]) -> String {
        mods.join(" ")
    }

    /// Look up the canonical name for an item's enchant mods.
    pub fn classify(&self, mods: &[String]) -> Option<&str> {
        self.lookup(&Self::signature(mods))
    }

    /// Look up a joined signature.
    pub fn lookup(&self, signature: &str) -> Option<&str> {
        self.names
            .get(&signature.to_lowercase())
            .map(String::as_str)
    }

    /// Whether the signature is known.
    pub fn is_known(&self, signature: &str) -> bool {
        self.lookup(signature).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Icon URL for a stash tab type, if one is known.
pub fn tab_icon(kind: &str) -> Option<&'static str> {
    TAB_ICONS.get(kind).copied()
}
