use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TERMS: &str =
    "Payment is due within 30 days. Late payment subject to fees as per our terms and conditions.";
pub const DEFAULT_TAX_RATE: &str = "9";
const DEFAULT_DUE_DAYS: u64 = 30;

/// Issuer block. Prefilled from `company.toml` when present.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CompanyDetails {
    pub name: String,
    pub address: String,
    pub gstin: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ClientDetails {
    pub name: String,
    pub address: String,
    pub gstin: String,
}

/// One billable row. `amount` is derived from quantity and rate by the form
/// and is never set on its own.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

impl Default for InvoiceItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: 1.0,
            rate: 0.0,
            amount: 0.0,
        }
    }
}

/// The whole invoice as the user is editing it.
///
/// Tax rates and surcharges are kept as the raw text typed into the form;
/// the calculation functions parse them on every read.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InvoiceRecord {
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub company: CompanyDetails,
    pub client: ClientDetails,
    pub items: Vec<InvoiceItem>,
    pub cgst_rate: String,
    pub sgst_rate: String,
    pub pf_charge: String,
    pub delivery_charge: String,
    pub notes: String,
    pub terms: String,
}

impl InvoiceRecord {
    /// A fresh record dated `today`, due thirty days later.
    pub fn new_dated(today: NaiveDate) -> Self {
        Self {
            invoice_number: String::new(),
            invoice_date: Some(today),
            due_date: today.checked_add_days(Days::new(DEFAULT_DUE_DAYS)),
            company: CompanyDetails::default(),
            client: ClientDetails::default(),
            items: vec![InvoiceItem::default()],
            cgst_rate: DEFAULT_TAX_RATE.to_string(),
            sgst_rate: DEFAULT_TAX_RATE.to_string(),
            pf_charge: String::new(),
            delivery_charge: String::new(),
            notes: String::new(),
            terms: DEFAULT_TERMS.to_string(),
        }
    }
}

impl Default for InvoiceRecord {
    fn default() -> Self {
        Self::new_dated(Local::now().date_naive())
    }
}
