use crate::models::{ItemDraft, ItemField, ItemId};

use super::Ledger;

/// A user gesture translated into a ledger operation.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    AddItem(ItemDraft),
    ToggleRemoval,
    /// The user picked an item; removes it while removal is pending.
    ItemClicked(ItemId),
    IncrementQuantity(ItemId),
    DecrementQuantity(ItemId),
    SetQuantity(ItemId, i64),
    EditField(ItemId, ItemField, String),
    SetDiscount(String),
}

// What applying a command did to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Added(ItemId),
    Removed(ItemId),
    Changed,
    Ignored,
}

impl Ledger {
    pub fn apply(&mut self, command: LedgerCommand) -> Applied {
        match command {
            LedgerCommand::AddItem(draft) => Applied::Added(self.add_item(draft)),
            LedgerCommand::ToggleRemoval => {
                self.toggle_removal();
                Applied::Changed
            }
            LedgerCommand::ItemClicked(id) => {
                if self.is_removal_pending() && self.remove_item(id) {
                    Applied::Removed(id)
                } else {
                    Applied::Ignored
                }
            }
            LedgerCommand::IncrementQuantity(id) => {
                self.touch(id, |ledger| ledger.increment_quantity(id))
            }
            LedgerCommand::DecrementQuantity(id) => {
                self.touch(id, |ledger| ledger.decrement_quantity(id))
            }
            LedgerCommand::SetQuantity(id, quantity) => {
                self.touch(id, |ledger| ledger.set_item_quantity(id, quantity))
            }
            LedgerCommand::EditField(id, field, value) => {
                self.touch(id, |ledger| ledger.set_item_field(id, field, &value))
            }
            LedgerCommand::SetDiscount(value) => {
                if self.settings().discount_enabled {
                    self.set_discount(&value);
                    Applied::Changed
                } else {
                    Applied::Ignored
                }
            }
        }
    }

    fn touch(&mut self, id: ItemId, f: impl FnOnce(&mut Ledger)) -> Applied {
        if self.item(id).is_none() {
            return Applied::Ignored;
        }
        f(self);
        Applied::Changed
    }
}
