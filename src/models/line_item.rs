use std::fmt;

use rust_decimal::Decimal;

/// Identifier handed out by a ledger when an item is added. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: ItemId,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: u32,
    pub description: Option<String>,
}

impl LineItem {
    /// Price times quantity, with an unset price counting as zero.
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub fn total(&self) -> Decimal {
        self.price
            .unwrap_or(Decimal::ZERO)
            .saturating_mul(Decimal::from(self.quantity))
    }
}

// Editable text fields of a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Price,
    Description,
}

impl ItemField {
    pub fn next(self) -> Option<ItemField> {
        match self {
            ItemField::Name => Some(ItemField::Price),
            ItemField::Price => Some(ItemField::Description),
            ItemField::Description => None,
        }
    }
}

/// Partial line item used to seed a new ledger row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub description: Option<String>,
}
