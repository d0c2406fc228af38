use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::calc::{DeliveryCharge, Totals};
use crate::format::{format_currency, format_date, format_quantity};
use crate::model::{ClientDetails, CompanyDetails, InvoiceRecord};

pub const DRAFT_FILENAME: &str = "Invoice-draft.pdf";

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("filename pattern"));

/// `Invoice-<number>.pdf`, or `Invoice-draft.pdf` while unnumbered.
///
/// Path separators and characters not allowed in file names become `-`, so
/// series numbers like `GST/2024-25/001` stay a single file in the output
/// directory.
pub fn export_filename(invoice_number: &str) -> String {
    if invoice_number.is_empty() {
        DRAFT_FILENAME.to_string()
    } else {
        let safe = UNSAFE_FILENAME_CHARS.replace_all(invoice_number, "-");
        format!("Invoice-{}.pdf", safe)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotItem {
    pub position: usize,
    pub description: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

/// The invoice with every derived value worked out and formatted, as it
/// will appear on paper.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSnapshot {
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub company: CompanyDetails,
    pub client: ClientDetails,
    pub items: Vec<SnapshotItem>,
    pub subtotal: String,
    pub cgst_label: String,
    pub cgst: String,
    pub sgst_label: String,
    pub sgst: String,
    pub show_pf_charge: bool,
    pub pf_charge: String,
    pub show_delivery_charge: bool,
    pub delivery_charge: String,
    pub total: String,
    pub notes: String,
    pub terms: String,
    pub filename: String,
    pub totals: Totals,
}

impl InvoiceSnapshot {
    pub fn capture(record: &InvoiceRecord) -> Self {
        let totals = Totals::of(record);

        let items = record
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| SnapshotItem {
                position: i + 1,
                description: item.description.clone(),
                quantity: format_quantity(item.quantity),
                rate: format_currency(item.rate),
                amount: format_currency(item.amount),
            })
            .collect();

        Self {
            invoice_number: record.invoice_number.clone(),
            invoice_date: format_date(record.invoice_date),
            due_date: format_date(record.due_date),
            company: record.company.clone(),
            client: record.client.clone(),
            items,
            subtotal: format_currency(totals.subtotal),
            cgst_label: format!("CGST ({}%)", record.cgst_rate),
            cgst: format_currency(totals.cgst),
            sgst_label: format!("SGST ({}%)", record.sgst_rate),
            sgst: format_currency(totals.sgst),
            show_pf_charge: totals.pf_charge > 0.0,
            pf_charge: format_currency(totals.pf_charge),
            show_delivery_charge: totals.delivery_charge != DeliveryCharge::None,
            delivery_charge: totals.delivery_charge.display(),
            total: format_currency(totals.total),
            notes: record.notes.clone(),
            terms: record.terms.clone(),
            filename: export_filename(&record.invoice_number),
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{InvoiceField, InvoiceForm, ItemField};
    use chrono::NaiveDate;

    fn sample_form() -> InvoiceForm {
        let mut form = InvoiceForm::new(InvoiceRecord::new_dated(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        ));
        form.set_item_field(0, ItemField::Description, "Steel rods");
        form.set_item_field(0, ItemField::Quantity, "2");
        form.set_item_field(0, ItemField::Rate, "100");
        form
    }

    #[test]
    fn filename_falls_back_to_draft() {
        assert_eq!(export_filename("INV-001"), "Invoice-INV-001.pdf");
        assert_eq!(export_filename(""), "Invoice-draft.pdf");
    }

    #[test]
    fn filename_flattens_series_numbers() {
        assert_eq!(
            export_filename("GST/2024-25/001"),
            "Invoice-GST-2024-25-001.pdf"
        );
        assert_eq!(export_filename(r"A\B:C*D?"), "Invoice-A-B-C-D-.pdf");
        assert_eq!(export_filename("../../etc"), "Invoice-..-..-etc.pdf");
        assert!(!export_filename("x/../y").contains('/'));
    }

    #[test]
    fn snapshot_formats_the_worked_example() {
        let snapshot = InvoiceSnapshot::capture(sample_form().record());

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].position, 1);
        assert_eq!(snapshot.items[0].quantity, "2");
        assert_eq!(snapshot.items[0].rate, "₹100.00");
        assert_eq!(snapshot.items[0].amount, "₹200.00");
        assert_eq!(snapshot.subtotal, "₹200.00");
        assert_eq!(snapshot.cgst_label, "CGST (9%)");
        assert_eq!(snapshot.cgst, "₹18.00");
        assert_eq!(snapshot.sgst, "₹18.00");
        assert_eq!(snapshot.total, "₹236.00");
        assert_eq!(snapshot.totals.total, 236.0);
        assert_eq!(snapshot.invoice_date, "01/04/2024");
        assert_eq!(snapshot.due_date, "01/05/2024");
        assert_eq!(snapshot.filename, "Invoice-draft.pdf");
    }

    #[test]
    fn optional_charge_rows_only_when_present() {
        let mut form = sample_form();
        let snapshot = InvoiceSnapshot::capture(form.record());
        assert!(!snapshot.show_pf_charge);
        assert!(!snapshot.show_delivery_charge);
        assert_eq!(snapshot.delivery_charge, "No Delivery Charge");

        form.set_field(InvoiceField::PfCharge, "50");
        form.set_field(InvoiceField::DeliveryCharge, "Pending");
        let snapshot = InvoiceSnapshot::capture(form.record());
        assert!(snapshot.show_pf_charge);
        assert_eq!(snapshot.pf_charge, "₹50.00");
        assert!(snapshot.show_delivery_charge);
        assert_eq!(snapshot.delivery_charge, "Pending");
        assert_eq!(snapshot.total, "₹286.00");
    }

    #[test]
    fn snapshot_serializes_for_json_output() {
        let snapshot = InvoiceSnapshot::capture(sample_form().record());
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["total"], "₹236.00");
        assert_eq!(json["totals"]["subtotal"], 200.0);
        assert_eq!(json["totals"]["delivery_charge"]["kind"], "none");
    }
}
