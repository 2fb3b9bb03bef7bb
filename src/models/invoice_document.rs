use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::{ClientDetails, ItemDraft};

/// Invoice data as served by a document data source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDocument {
    pub client_details: ClientDetails,
    pub items: Vec<DocumentItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentItem {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: Option<i64>,
    pub description: Option<String>,
}

// Quantities show up as integers, floats or numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawQuantity {
    fn into_count(self) -> Option<i64> {
        match self {
            RawQuantity::Integer(n) => Some(n),
            RawQuantity::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            RawQuantity::Float(_) => None,
            RawQuantity::Text(text) => {
                let text = text.trim();
                match text.parse::<i64>() {
                    Ok(n) => Some(n),
                    Err(_) => text
                        .parse::<f64>()
                        .ok()
                        .and_then(|f| RawQuantity::Float(f).into_count()),
                }
            }
        }
    }
}

/// Accept any numeric-looking quantity; anything else falls back to the default.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawQuantity>::deserialize(deserializer)?;
    let count = raw.and_then(RawQuantity::into_count);
    if count.is_none() {
        tracing::debug!("document item quantity is not a number, using the default");
    }
    Ok(count)
}

impl From<DocumentItem> for ItemDraft {
    fn from(item: DocumentItem) -> Self {
        ItemDraft {
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            description: item.description,
        }
    }
}
