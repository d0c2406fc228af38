//! The editable invoice held for the length of one session.

use chrono::NaiveDate;
use log::debug;

use crate::calc::{self, DeliveryCharge, Totals, line_amount, parse_or_zero};
use crate::model::{CompanyDetails, InvoiceItem, InvoiceRecord};

/// Editable column of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    Quantity,
    Rate,
}

/// Scalar fields of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    CompanyName,
    CompanyAddress,
    CompanyGstin,
    CompanyPhone,
    CompanyEmail,
    ClientName,
    ClientAddress,
    ClientGstin,
    CgstRate,
    SgstRate,
    PfCharge,
    DeliveryCharge,
    Notes,
    Terms,
}

/// Owns the record and keeps every item's amount in step with its quantity
/// and rate. There is always at least one item.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceForm {
    record: InvoiceRecord,
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self::new(InvoiceRecord::default())
    }
}

impl InvoiceForm {
    /// Takes over a record, e.g. one read from a draft file. Amounts are
    /// recomputed and an empty item list gets a blank row.
    pub fn new(mut record: InvoiceRecord) -> Self {
        if record.items.is_empty() {
            record.items.push(InvoiceItem::default());
        }
        for item in &mut record.items {
            item.amount = line_amount(item.quantity, item.rate);
        }
        Self { record }
    }

    pub fn with_company(mut self, company: CompanyDetails) -> Self {
        self.record.company = company;
        self
    }

    pub fn record(&self) -> &InvoiceRecord {
        &self.record
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.record.items
    }

    pub fn set_field(&mut self, field: InvoiceField, value: &str) {
        let record = &mut self.record;
        let target = match field {
            InvoiceField::InvoiceDate => {
                record.invoice_date = parse_date(value);
                return;
            }
            InvoiceField::DueDate => {
                record.due_date = parse_date(value);
                return;
            }
            InvoiceField::InvoiceNumber => &mut record.invoice_number,
            InvoiceField::CompanyName => &mut record.company.name,
            InvoiceField::CompanyAddress => &mut record.company.address,
            InvoiceField::CompanyGstin => &mut record.company.gstin,
            InvoiceField::CompanyPhone => &mut record.company.phone,
            InvoiceField::CompanyEmail => &mut record.company.email,
            InvoiceField::ClientName => &mut record.client.name,
            InvoiceField::ClientAddress => &mut record.client.address,
            InvoiceField::ClientGstin => &mut record.client.gstin,
            InvoiceField::CgstRate => &mut record.cgst_rate,
            InvoiceField::SgstRate => &mut record.sgst_rate,
            InvoiceField::PfCharge => &mut record.pf_charge,
            InvoiceField::DeliveryCharge => &mut record.delivery_charge,
            InvoiceField::Notes => &mut record.notes,
            InvoiceField::Terms => &mut record.terms,
        };
        *target = value.to_string();
    }

    pub fn set_date(&mut self, field: InvoiceField, date: Option<NaiveDate>) {
        match field {
            InvoiceField::InvoiceDate => self.record.invoice_date = date,
            InvoiceField::DueDate => self.record.due_date = date,
            other => debug!("{:?} is not a date field, ignoring", other),
        }
    }

    /// Updates one column of item `index`. Quantity and rate are parsed
    /// (anything unreadable becomes 0) and the amount recomputed before
    /// returning. Unknown indexes are ignored.
    pub fn set_item_field(&mut self, index: usize, field: ItemField, value: &str) {
        let Some(current) = self.record.items.get(index) else {
            debug!("no item at index {}, ignoring {:?} edit", index, field);
            return;
        };

        let mut item = current.clone();
        match field {
            ItemField::Description => item.description = value.to_string(),
            ItemField::Quantity => {
                item.quantity = parse_or_zero(value);
                item.amount = line_amount(item.quantity, item.rate);
            }
            ItemField::Rate => {
                item.rate = parse_or_zero(value);
                item.amount = line_amount(item.quantity, item.rate);
            }
        }
        self.record.items[index] = item;
    }

    /// Appends a blank row (quantity 1, rate 0) and returns its index.
    pub fn add_item(&mut self) -> usize {
        self.record.items.push(InvoiceItem::default());
        self.record.items.len() - 1
    }

    /// Removes item `index` unless it is the last one left.
    pub fn remove_item(&mut self, index: usize) {
        if self.record.items.len() <= 1 || index >= self.record.items.len() {
            return;
        }
        self.record.items.remove(index);
    }

    pub fn subtotal(&self) -> f64 {
        calc::subtotal(&self.record)
    }

    pub fn cgst(&self) -> f64 {
        calc::cgst(&self.record)
    }

    pub fn sgst(&self) -> f64 {
        calc::sgst(&self.record)
    }

    pub fn pf_charge(&self) -> f64 {
        calc::pf_charge(&self.record)
    }

    pub fn delivery_charge(&self) -> DeliveryCharge {
        calc::delivery_charge(&self.record)
    }

    pub fn total(&self) -> f64 {
        calc::total(&self.record)
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.record)
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
