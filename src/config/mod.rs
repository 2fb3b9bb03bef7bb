use anyhow::Result;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ledger::DEFAULT_TAX_PERCENTAGE;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Path or http(s) URL of an invoice document to seed the ledger from.
    /// When unset, the invoice is filled in by hand.
    pub data_source: Option<String>,

    /// Tax applied to the taxable amount, in percent
    #[serde(default = "default_tax_percentage")]
    pub tax_percentage: Decimal,

    /// Where log output goes while the terminal is in use
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_tax_percentage() -> Decimal {
    Decimal::from(DEFAULT_TAX_PERCENTAGE)
}

fn default_log_file() -> String {
    "invoice-builder.log".to_string()
}

impl Config {
    /// Load configuration from `INVOICE_`-prefixed environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed("INVOICE_").from_env::<Config>()?;

        Ok(config)
    }

    /// Apply command line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        data_source: Option<String>,
        tax_percentage: Option<Decimal>,
    ) -> Self {
        if data_source.is_some() {
            self.data_source = data_source;
        }
        if let Some(tax) = tax_percentage {
            self.tax_percentage = tax;
        }
        self
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
