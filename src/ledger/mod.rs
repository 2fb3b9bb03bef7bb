mod command;
mod totals;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::{ItemDraft, ItemField, ItemId, LineItem};

pub use command::{Applied, LedgerCommand};
pub use totals::{format_money, Totals};

pub const DEFAULT_TAX_PERCENTAGE: u32 = 4;

/// Fixed settings a ledger is created with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerSettings {
    pub tax_percentage: Decimal,
    pub discount_enabled: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            tax_percentage: Decimal::from(DEFAULT_TAX_PERCENTAGE),
            discount_enabled: false,
        }
    }
}

// Whether the next item interaction edits or removes the item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    Normal,
    RemovalPending,
}

/// In-memory model of the invoice: line items in display order plus the
/// settings needed to derive totals.
#[derive(Debug, Clone)]
pub struct Ledger {
    items: Vec<LineItem>,
    settings: LedgerSettings,
    discount: Decimal,
    mode: RemovalMode,
    next_id: u64,
}

impl Ledger {
    pub fn new(settings: LedgerSettings) -> Self {
        Self {
            items: Vec::new(),
            settings,
            discount: Decimal::ZERO,
            mode: RemovalMode::Normal,
            next_id: 1,
        }
    }

    /// Build a ledger seeded with `drafts`, in order.
    pub fn seeded<I>(settings: LedgerSettings, drafts: I) -> Self
    where
        I: IntoIterator<Item = ItemDraft>,
    {
        let mut ledger = Self::new(settings);
        for draft in drafts {
            ledger.add_item(draft);
        }
        ledger
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn add_item(&mut self, draft: ItemDraft) -> ItemId {
        if self.is_removal_pending() {
            self.toggle_removal();
        }

        let id = ItemId(self.next_id);
        self.next_id += 1;

        self.items.push(LineItem {
            id,
            name: draft.name,
            price: draft.price.map(|price| price.max(Decimal::ZERO)),
            quantity: clamp_quantity(draft.quantity.unwrap_or(1)),
            description: draft.description,
        });
        tracing::debug!(%id, count = self.items.len(), "item added");

        id
    }

    /// Remove an item, keeping at least one row in the ledger.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        if self.items.len() <= 1 {
            tracing::debug!(%id, "refusing to remove the last item");
            return false;
        }

        match self.items.iter().position(|item| item.id == id) {
            Some(index) => {
                self.items.remove(index);
                tracing::debug!(%id, count = self.items.len(), "item removed");
                true
            }
            None => false,
        }
    }

    pub fn set_item_quantity(&mut self, id: ItemId, quantity: i64) {
        if let Some(item) = self.item_mut(id) {
            item.quantity = clamp_quantity(quantity);
        }
    }

    pub fn increment_quantity(&mut self, id: ItemId) {
        if let Some(item) = self.item_mut(id) {
            item.quantity = item.quantity.saturating_add(1);
        }
    }

    pub fn decrement_quantity(&mut self, id: ItemId) {
        if let Some(item) = self.item_mut(id) {
            if item.quantity >= 2 {
                item.quantity -= 1;
            }
        }
    }

    pub fn set_item_field(&mut self, id: ItemId, field: ItemField, value: &str) {
        let Some(item) = self.item_mut(id) else {
            return;
        };

        match field {
            ItemField::Name => item.name = non_empty(value),
            ItemField::Description => item.description = non_empty(value),
            ItemField::Price => {
                item.price = parse_amount(value);
                if item.price.is_none() && !value.trim().is_empty() {
                    tracing::warn!(
                        %id,
                        value,
                        "price is not a non-negative number, counting it as zero"
                    );
                }
            }
        }
    }

    pub fn discount(&self) -> Decimal {
        if self.settings.discount_enabled {
            self.discount
        } else {
            Decimal::ZERO
        }
    }

    /// Set the discount from user text. Anything unparsable counts as zero.
    pub fn set_discount(&mut self, value: &str) {
        if !self.settings.discount_enabled {
            return;
        }
        self.discount = parse_amount(value).unwrap_or(Decimal::ZERO);
    }

    pub fn item_total(&self, id: ItemId) -> Option<Decimal> {
        self.item(id).map(LineItem::total)
    }

    pub fn compute_totals(&self) -> Totals {
        let subtotal = self
            .items
            .iter()
            .map(LineItem::total)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        Totals::new(subtotal, self.discount(), self.settings.tax_percentage)
    }

    pub fn mode(&self) -> RemovalMode {
        self.mode
    }

    pub fn is_removal_pending(&self) -> bool {
        self.mode == RemovalMode::RemovalPending
    }

    pub fn toggle_removal(&mut self) {
        self.mode = match self.mode {
            RemovalMode::Normal => RemovalMode::RemovalPending,
            RemovalMode::RemovalPending => RemovalMode::Normal,
        };
        tracing::debug!(mode = ?self.mode, "removal mode toggled");
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    quantity.clamp(1, i64::from(u32::MAX)) as u32
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a non-negative decimal amount as typed into a price field.
///
/// A dangling decimal point on either side is tolerated ("5.", ".5").
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.trim();
    let value = value.strip_suffix('.').unwrap_or(value);
    if value.is_empty() {
        return None;
    }

    let amount = if value.starts_with('.') {
        Decimal::from_str(&format!("0{}", value))
    } else {
        Decimal::from_str(value)
    };

    amount.ok().filter(|amount| !amount.is_sign_negative())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(price: i64, quantity: i64) -> ItemDraft {
        ItemDraft {
            price: Some(Decimal::from(price)),
            quantity: Some(quantity),
            ..ItemDraft::default()
        }
    }

    #[test]
    fn add_item_hands_out_unique_ids() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        let ids: Vec<ItemId> = (0..25).map(|_| ledger.add_item(ItemDraft::default())).collect();

        assert_eq!(ledger.item_count(), 25);
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
        assert!(ledger.items().iter().all(|item| item.quantity == 1));
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        let first = ledger.add_item(ItemDraft::default());
        let second = ledger.add_item(ItemDraft::default());
        assert!(ledger.remove_item(second));

        let third = ledger.add_item(ItemDraft::default());
        assert_ne!(third, second);
        assert_ne!(third, first);
    }

    #[test]
    fn removal_never_drops_below_one_item() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        let a = ledger.add_item(ItemDraft::default());
        let b = ledger.add_item(ItemDraft::default());

        assert!(ledger.remove_item(a));
        assert!(!ledger.remove_item(b));
        assert_eq!(ledger.item_count(), 1);
    }

    #[test]
    fn removal_preserves_order_and_ignores_unknown_ids() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        let ids: Vec<ItemId> = (0..4).map(|_| ledger.add_item(ItemDraft::default())).collect();

        assert!(!ledger.remove_item(ItemId(999)));
        assert!(ledger.remove_item(ids[1]));

        let remaining: Vec<ItemId> = ledger.items().iter().map(|item| item.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn quantity_is_clamped_to_one() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        let id = ledger.add_item(ItemDraft::default());

        for q in [-10, -1, 0, 1, 2, 37] {
            ledger.set_item_quantity(id, q);
            assert_eq!(i64::from(ledger.item(id).unwrap().quantity), q.max(1));
        }
    }

    #[test]
    fn decrement_stops_at_one() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        let id = ledger.add_item(ItemDraft::default());

        ledger.increment_quantity(id);
        assert_eq!(ledger.item(id).unwrap().quantity, 2);
        ledger.decrement_quantity(id);
        ledger.decrement_quantity(id);
        assert_eq!(ledger.item(id).unwrap().quantity, 1);

        // unknown ids are tolerated
        ledger.increment_quantity(ItemId(42));
        ledger.set_item_field(ItemId(42), ItemField::Name, "ghost");
    }

    #[test]
    fn set_item_field_updates_text_and_price() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        let id = ledger.add_item(ItemDraft::default());

        ledger.set_item_field(id, ItemField::Name, "Consulting");
        ledger.set_item_field(id, ItemField::Description, "March retainer");
        ledger.set_item_field(id, ItemField::Price, "12.50");

        let item = ledger.item(id).unwrap();
        assert_eq!(item.name.as_deref(), Some("Consulting"));
        assert_eq!(item.description.as_deref(), Some("March retainer"));
        assert_eq!(item.price, Some(Decimal::new(1250, 2)));

        ledger.set_item_field(id, ItemField::Name, "");
        ledger.set_item_field(id, ItemField::Price, "abc");
        let item = ledger.item(id).unwrap();
        assert_eq!(item.name, None);
        assert_eq!(item.price, None);
    }

    #[test]
    fn parse_amount_tolerates_partial_input() {
        assert_eq!(parse_amount("5."), Some(Decimal::from(5)));
        assert_eq!(parse_amount(".5"), Some(Decimal::new(5, 1)));
        assert_eq!(parse_amount("."), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-3"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn single_item_totals() {
        let ledger = Ledger::seeded(LedgerSettings::default(), vec![priced(10, 1)]);
        let totals = ledger.compute_totals();

        assert_eq!(totals.subtotal, Decimal::from(10));
        assert_eq!(totals.tax, Decimal::new(40, 2));
        assert_eq!(totals.discount, Decimal::ZERO);
    }

    #[test]
    fn totals_follow_every_mutation() {
        let mut ledger = Ledger::seeded(LedgerSettings::default(), vec![priced(10, 1)]);
        let first = ledger.items()[0].id;

        ledger.add_item(priced(20, 2));
        let totals = ledger.compute_totals();
        assert_eq!(totals.subtotal, Decimal::from(50));
        assert_eq!(totals.tax, Decimal::new(200, 2));

        ledger.increment_quantity(first);
        ledger.increment_quantity(first);
        assert_eq!(ledger.compute_totals().subtotal, Decimal::from(70));
        assert_eq!(ledger.item_total(first), Some(Decimal::from(30)));
    }

    #[test]
    fn unset_prices_count_as_zero() {
        let mut ledger = Ledger::seeded(LedgerSettings::default(), vec![priced(10, 3)]);
        ledger.add_item(ItemDraft::default());

        assert_eq!(ledger.compute_totals().subtotal, Decimal::from(30));
    }

    #[test]
    fn last_item_cannot_be_removed() {
        let mut ledger = Ledger::seeded(LedgerSettings::default(), vec![ItemDraft::default()]);
        let only = ledger.items()[0].id;

        assert!(!ledger.remove_item(only));
        assert_eq!(ledger.item_count(), 1);
    }

    #[test]
    fn discount_reduces_taxable_amount() {
        let settings = LedgerSettings {
            discount_enabled: true,
            ..LedgerSettings::default()
        };
        let mut ledger = Ledger::seeded(settings, vec![priced(10, 1), priced(20, 2)]);
        ledger.set_discount("10");

        let totals = ledger.compute_totals();
        assert_eq!(totals.subtotal, Decimal::from(50));
        assert_eq!(totals.discount, Decimal::from(10));
        assert_eq!(totals.taxable, Decimal::from(40));
        assert_eq!(totals.tax, Decimal::new(160, 2));
        assert_eq!(totals.grand_total, Decimal::from(40));

        ledger.set_discount("oops");
        assert_eq!(ledger.compute_totals().discount, Decimal::ZERO);
    }

    #[test]
    fn discount_is_ignored_when_disabled() {
        let mut ledger = Ledger::seeded(LedgerSettings::default(), vec![priced(10, 1)]);
        ledger.set_discount("5");

        assert_eq!(ledger.discount(), Decimal::ZERO);
        assert_eq!(ledger.compute_totals().grand_total, Decimal::from(10));
    }

    #[test]
    fn toggling_removal_twice_is_a_no_op() {
        let drafts = vec![ItemDraft::default(), ItemDraft::default()];
        let mut ledger = Ledger::seeded(LedgerSettings::default(), drafts);

        ledger.toggle_removal();
        assert!(ledger.is_removal_pending());
        ledger.toggle_removal();
        assert_eq!(ledger.mode(), RemovalMode::Normal);
        assert_eq!(ledger.item_count(), 2);
    }

    #[test]
    fn adding_leaves_removal_mode() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        ledger.toggle_removal();
        ledger.add_item(ItemDraft::default());

        assert!(!ledger.is_removal_pending());
    }

    #[test]
    fn seeded_quantities_are_clamped() {
        let ledger = Ledger::seeded(LedgerSettings::default(), vec![priced(4, 0), priced(4, 3)]);
        let quantities: Vec<u32> = ledger.items().iter().map(|item| item.quantity).collect();
        assert_eq!(quantities, vec![1, 3]);
    }

    #[test]
    fn huge_price_times_quantity_saturates() {
        let mut ledger = Ledger::new(LedgerSettings::default());
        let id = ledger.add_item(ItemDraft::default());
        ledger.set_item_field(id, ItemField::Price, "50000000000000000000000000000");
        ledger.increment_quantity(id);

        assert_eq!(ledger.item_total(id), Some(Decimal::MAX));
        let totals = ledger.compute_totals();
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.grand_total, Decimal::MAX);
    }

    #[test]
    fn huge_seeded_items_do_not_overflow_the_subtotal() {
        let big = ItemDraft {
            price: Some(Decimal::from_str("100000000000000000000").unwrap()),
            quantity: Some(i64::from(u32::MAX)),
            ..ItemDraft::default()
        };
        let ledger = Ledger::seeded(LedgerSettings::default(), vec![big.clone(), big]);

        assert_eq!(ledger.compute_totals().subtotal, Decimal::MAX);
    }
}
