use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Restores fullness.
    Food,
    /// Restores happiness.
    Gift,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Food => f.write_str("food"),
            ItemKind::Gift => f.write_str("gift"),
        }
    }
}

/// An item is identified by its name and effect value together.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub value: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

const DEFAULT_FOOD: [(&str, u32, u32); 4] = [
    ("Apple", 5, 4),
    ("Smoothie", 10, 3),
    ("Taco", 20, 2),
    ("Ramen", 30, 1),
];
const DEFAULT_GIFTS: [(&str, u32, u32); 4] = [
    ("Ball", 5, 4),
    ("Cards", 10, 3),
    ("Flowers", 20, 2),
    ("Hat", 30, 1),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    food: BTreeMap<Item, u32>,
    gifts: BTreeMap<Item, u32>,
}

impl Default for Inventory {
    /// The starter kit every new player receives.
    fn default() -> Self {
        let mut inv = Self::empty();
        for (name, value, qty) in DEFAULT_FOOD {
            inv.add(ItemKind::Food, Item::new(name, value), qty);
        }
        for (name, value, qty) in DEFAULT_GIFTS {
            inv.add(ItemKind::Gift, Item::new(name, value), qty);
        }
        inv
    }
}

impl Inventory {
    pub fn empty() -> Self {
        Self {
            food: BTreeMap::new(),
            gifts: BTreeMap::new(),
        }
    }

    fn shelf(&self, kind: ItemKind) -> &BTreeMap<Item, u32> {
        match kind {
            ItemKind::Food => &self.food,
            ItemKind::Gift => &self.gifts,
        }
    }

    fn shelf_mut(&mut self, kind: ItemKind) -> &mut BTreeMap<Item, u32> {
        match kind {
            ItemKind::Food => &mut self.food,
            ItemKind::Gift => &mut self.gifts,
        }
    }

    /// Adds stock, saturating at `u32::MAX`.
    pub fn add(&mut self, kind: ItemKind, item: Item, quantity: u32) {
        let slot = self.shelf_mut(kind).entry(item).or_insert(0);
        *slot = slot.saturating_add(quantity);
    }

    /// Removes one unit; false (and no change) when none are left.
    pub fn take_one(&mut self, kind: ItemKind, item: &Item) -> bool {
        match self.shelf_mut(kind).get_mut(item) {
            Some(qty) if *qty > 0 => {
                *qty -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn quantity(&self, kind: ItemKind, item: &Item) -> u32 {
        self.shelf(kind).get(item).copied().unwrap_or(0)
    }

    /// First item of this kind with the given name (case-insensitive).
    pub fn find(&self, kind: ItemKind, name: &str) -> Option<&Item> {
        self.shelf(kind)
            .keys()
            .find(|it| it.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn items(&self, kind: ItemKind) -> impl Iterator<Item = (&Item, u32)> + '_ {
        self.shelf(kind).iter().map(|(it, qty)| (it, *qty))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopEntry {
    pub kind: ItemKind,
    pub item: Item,
    pub price: i32,
}

/// What the in-game shop sells, and for how many points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shop {
    entries: Vec<ShopEntry>,
}

impl Default for Shop {
    fn default() -> Self {
        let food = [("Apple", 5, 10), ("Smoothie", 10, 20), ("Taco", 20, 40), ("Ramen", 30, 60)];
        let gifts = [("Ball", 5, 10), ("Cards", 10, 20), ("Flowers", 20, 40), ("Hat", 30, 60)];
        let mut entries = Vec::with_capacity(food.len() + gifts.len());
        for (kind, list) in [(ItemKind::Food, food), (ItemKind::Gift, gifts)] {
            for (name, value, price) in list {
                entries.push(ShopEntry {
                    kind,
                    item: Item::new(name, value),
                    price,
                });
            }
        }
        Self { entries }
    }
}

impl Shop {
    pub fn entries(&self) -> &[ShopEntry] {
        &self.entries
    }

    pub fn find(&self, kind: ItemKind, name: &str) -> Option<&ShopEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.item.name.eq_ignore_ascii_case(name.trim()))
    }
}
