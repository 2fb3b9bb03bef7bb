use rust_decimal::{Decimal, RoundingStrategy};

/// Figures derived from the ledger on demand.
///
/// `grand_total` is the taxable amount; tax is shown next to it rather than
/// added on top. Amounts too large for a `Decimal` saturate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxable: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}

impl Totals {
    pub fn new(subtotal: Decimal, discount: Decimal, tax_percentage: Decimal) -> Self {
        let taxable = subtotal.saturating_sub(discount);
        let tax = taxable.saturating_mul(tax_percentage) / Decimal::ONE_HUNDRED;

        Self {
            subtotal,
            discount,
            taxable,
            tax,
            grand_total: taxable,
        }
    }
}

/// Format an amount the way the invoice displays money.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${:.2}", rounded)
}
