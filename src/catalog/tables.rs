//! Built-in lookup data.

/// Sextant enchant text -> canonical compass name as used by the price feed.
pub(super) const COMPASSES: &[(&str, &str)] = &[
    ("Your Maps contain Alva", "Alva"),
    ("Your Maps contain Einhar", "Einhar"),
    ("Your Maps contain Niko", "Niko"),
    ("Your Maps contain Jun", "Jun"),
    ("Your Maps contain an additional Abyss", "Abyss"),
    ("Your Maps contain an additional Breach", "Breach"),
    ("Your Maps contain an additional Harbinger", "Harbinger"),
    ("Your Maps contain an additional Legion Encounter", "Legion"),
    ("Your Maps contain a Blight Encounter", "Blight"),
    ("Your Maps contain a Mirror of Delirium", "Delirium Mirror"),
    ("Your Maps contain an Expedition Encounter", "Expedition"),
    ("Your Maps contain an Ultimatum Encounter", "Ultimatum"),
    ("Your Maps contain Ritual Altars", "Ritual"),
    ("Your Maps contain an additional Essence", "Essence"),
    ("Your Maps contain an additional Shrine", "Shrine"),
    ("Your Maps contain an additional Strongbox", "Strongbox"),
    ("Your Maps contain an additional Rogue Exile", "Rogue Exile"),
    ("Your Maps contain an additional Tormented Spirit", "Tormented Spirit"),
    ("Your Maps contain an additional Gloom Shrine", "Gloom Shrine"),
    ("Your Maps contain an additional Resonating Shrine", "Resonating Shrine"),
    ("Your Maps are haunted by an additional Tormented Spirit", "Haunted"),
    ("Your Maps contain The Sacred Grove", "Harvest"),
    ("Your Maps have 25% increased Pack size", "Pack Size"),
    ("Your Maps have 20% increased quantity of Items found", "Item Quantity"),
    (
        "Your Maps contain an additional Map Boss Map Boss drops an additional Conqueror Map",
        "Conqueror Map",
    ),
    (
        "Your Maps contain an additional Map Boss Map Boss drops an additional Elder Guardian Map",
        "Elder Guardian Map",
    ),
    (
        "Your Maps contain an additional Map Boss Map Boss drops an additional Shaper Guardian Map",
        "Shaper Guardian Map",
    ),
    (
        "Unique Bosses in your Maps drop additional Currency Items",
        "Boss Drops Currency",
    ),
    (
        "Strongboxes in your Maps are Corrupted Strongboxes in your Maps are at least Rare",
        "Corrupted Strongbox",
    ),
    (
        "Your Maps contain an additional Breach Breaches in your Maps contain 3 additional Magic Monsters",
        "Breach Magic Monsters",
    ),
    (
        "Your Maps contain 3 additional packs of Beasts",
        "Beasts",
    ),
    (
        "Your Maps have +1% chance to contain an Atlas Boss Fragment",
        "Maven Witness",
    ),
];

/// Stash tab type -> tab icon.
pub(super) const TAB_ICONS: &[(&str, &str)] = &[
    (
        "MapStash",
        "https://web.poecdn.com/protected/image/layout/stash/map-tab-icon.png",
    ),
    (
        "QuadStash",
        "https://web.poecdn.com/protected/image/layout/stash/quad-tab-icon.png",
    ),
    (
        "PremiumStash",
        "https://web.poecdn.com/protected/image/layout/stash/premium-tab-icon.png",
    ),
    (
        "CurrencyStash",
        "https://web.poecdn.com/protected/image/layout/stash/currency-tab-icon.png",
    ),
    (
        "EssenceStash",
        "https://web.poecdn.com/protected/image/layout/stash/essence-tab-icon.png",
    ),
    (
        "DivinationCardStash",
        "https://web.poecdn.com/protected/image/layout/stash/divination-tab-icon.png",
    ),
    (
        "FragmentStash",
        "https://web.poecdn.com/protected/image/layout/stash/fragment-tab-icon.png",
    ),
];
