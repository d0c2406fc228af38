use std::fs;

use gst_invoice::{
    BackendError, CommandBackend, DocumentBackend, ExportError, Exporter, InvoiceField,
    InvoiceForm, InvoiceRecord, InvoiceRenderer, InvoiceSession, InvoiceSnapshot, ItemField,
    PageFormat, RenderedInvoice,
};

const DRAFT: &str = r#"
invoice_number = "INV-2024-018"
invoice_date = "2024-04-01"
due_date = "2024-05-01"
pf_charge = "150"
delivery_charge = "500 flat fee"
notes = "Goods once sold will not be taken back."

[company]
name = "Sharma Steel Works"
address = "Plot 12, MIDC\nPune 411019"
gstin = "27ABCDE1234F1Z5"
phone = "+91 98765 43210"

[client]
name = "Patel Constructions"
gstin = "24PQRSX5678K1Z2"

[[items]]
description = "TMT bars 12mm"
quantity = 10.0
rate = 650.0

[[items]]
description = "Binding wire"
quantity = 2.5
rate = 120.0
amount = 99999.0
"#;

/// Returns the HTML it was given as the "PDF".
struct EchoBackend;

impl DocumentBackend for EchoBackend {
    fn render(&self, invoice: &RenderedInvoice, _: PageFormat) -> Result<Vec<u8>, BackendError> {
        Ok(invoice.html.clone().into_bytes())
    }
}

fn draft_form() -> InvoiceForm {
    let record: InvoiceRecord = toml::from_str(DRAFT).unwrap();
    InvoiceForm::new(record)
}

#[test]
fn draft_file_totals() {
    let form = draft_form();

    // Stored amounts in the draft are ignored in favour of quantity x rate.
    assert_eq!(form.items()[1].amount, 300.0);
    assert_eq!(form.subtotal(), 6800.0);
    assert_eq!(form.cgst(), 612.0);
    assert_eq!(form.sgst(), 612.0);
    assert_eq!(form.pf_charge(), 150.0);
    assert_eq!(form.delivery_charge().amount(), 500.0);
    assert_eq!(form.total(), 6800.0 + 612.0 + 612.0 + 150.0 + 500.0);

    let snapshot = InvoiceSnapshot::capture(form.record());
    assert_eq!(snapshot.total, "₹8,674.00");
    assert_eq!(snapshot.delivery_charge, "₹500.00");
    assert_eq!(snapshot.filename, "Invoice-INV-2024-018.pdf");
}

#[test]
fn draft_exports_to_named_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = InvoiceSession::new(
        draft_form(),
        InvoiceRenderer::new().unwrap(),
        Exporter::new(EchoBackend, dir.path()),
    );

    session.open_preview().unwrap();
    let path = session.export().unwrap();

    assert_eq!(path, dir.path().join("Invoice-INV-2024-018.pdf"));
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("Sharma Steel Works"));
    assert!(written.contains("Patel Constructions"));
    assert!(written.contains("P&amp;F Charge"));
    assert!(written.contains("₹8,674.00"));
    assert!(written.contains("Goods once sold will not be taken back."));
}

#[test]
fn text_delivery_charge_shows_on_invoice_but_not_in_total() {
    let dir = tempfile::tempdir().unwrap();
    let mut form = draft_form();
    form.set_field(InvoiceField::DeliveryCharge, "Pending");
    form.set_field(InvoiceField::InvoiceNumber, "");

    let mut session = InvoiceSession::new(
        form,
        InvoiceRenderer::new().unwrap(),
        Exporter::new(EchoBackend, dir.path()),
    );
    session.open_preview().unwrap();
    let path = session.export().unwrap();

    assert_eq!(path.file_name().unwrap(), "Invoice-draft.pdf");
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("Pending"));
    assert!(written.contains("₹8,174.00"));
}

#[test]
fn editing_items_between_preview_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = InvoiceSession::new(
        draft_form(),
        InvoiceRenderer::new().unwrap(),
        Exporter::new(EchoBackend, dir.path()),
    );
    session.open_preview().unwrap();

    let form = session.form_mut();
    form.remove_item(1);
    form.set_item_field(0, ItemField::Quantity, "1");
    form.set_field(InvoiceField::PfCharge, "");
    form.set_field(InvoiceField::DeliveryCharge, "");
    assert_eq!(session.form().total(), 767.0);

    let written = fs::read_to_string(session.export().unwrap()).unwrap();
    assert!(!written.contains("Binding wire"));
    assert!(!written.contains("Delivery Charge"));
}

#[cfg(unix)]
#[test]
fn command_backend_runs_external_renderer() {
    // `sh -c` receives --print-to-pdf=<out> as $0 and the HTML path as $1.
    let backend = CommandBackend::new(
        "sh",
        vec!["-c".into(), r#"cp "$1" "${0#--print-to-pdf=}""#.into()],
    );
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(backend, dir.path());

    let rendered = InvoiceRenderer::new()
        .unwrap()
        .render(&InvoiceSnapshot::capture(draft_form().record()))
        .unwrap();
    let path = exporter.export(&rendered).unwrap();

    assert_eq!(fs::read_to_string(path).unwrap(), rendered.html);
}

#[cfg(unix)]
#[test]
fn failing_renderer_leaves_no_file() {
    let backend = CommandBackend::new("sh", vec!["-c".into(), "echo boom >&2; exit 3".into()]);
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(backend, dir.path());

    let rendered = InvoiceRenderer::new()
        .unwrap()
        .render(&InvoiceSnapshot::capture(draft_form().record()))
        .unwrap();
    let err = exporter.export(&rendered).unwrap_err();

    match &err {
        ExportError::Backend(BackendError::Failed { stderr, .. }) => assert_eq!(stderr, "boom"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "Failed to generate PDF. Please try again.");
    assert!(!exporter.is_busy());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
