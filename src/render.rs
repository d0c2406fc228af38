use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use tera::{Context, Tera};

use crate::snapshot::InvoiceSnapshot;

pub const TEMPLATE_NAME: &str = "invoice.html";

// Embed template at compile time to ensure availability
const DEFAULT_TEMPLATE: &str = include_str!("../templates/invoice.html");

/// Physical page the invoice is laid out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PageFormat {
    #[default]
    A4,
}

impl PageFormat {
    pub fn width_mm(self) -> u32 {
        match self {
            PageFormat::A4 => 210,
        }
    }

    pub fn height_mm(self) -> u32 {
        match self {
            PageFormat::A4 => 297,
        }
    }
}

/// A rendered invoice page, ready to hand to a [`crate::export::DocumentBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedInvoice {
    pub filename: String,
    pub html: String,
    pub page: PageFormat,
}

pub struct InvoiceRenderer {
    tera: Tera,
    page: PageFormat,
}

impl InvoiceRenderer {
    /// Renderer using the built-in template.
    pub fn new() -> tera::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, DEFAULT_TEMPLATE)?;
        Ok(Self {
            tera,
            page: PageFormat::default(),
        })
    }

    /// Uses `invoice.html` from `dir` when the user has put one there,
    /// otherwise the built-in template.
    pub fn with_template_dir(dir: &Path) -> tera::Result<Self> {
        let mut renderer = Self::new()?;
        let custom = dir.join(TEMPLATE_NAME);
        if custom.is_file() {
            info!("using invoice template {}", custom.display());
            renderer
                .tera
                .add_template_file(&custom, Some(TEMPLATE_NAME))?;
        }
        Ok(renderer)
    }

    pub fn page(&self) -> PageFormat {
        self.page
    }

    pub fn render(&self, snapshot: &InvoiceSnapshot) -> tera::Result<RenderedInvoice> {
        let mut context = Context::from_serialize(snapshot)?;
        context.insert("page_width_mm", &self.page.width_mm());
        context.insert("page_height_mm", &self.page.height_mm());

        let html = self.tera.render(TEMPLATE_NAME, &context)?;
        debug!("rendered {} ({} bytes)", snapshot.filename, html.len());

        Ok(RenderedInvoice {
            filename: snapshot.filename.clone(),
            html,
            page: self.page,
        })
    }
}

/// Writes the built-in template into `dir` for the user to customise.
/// An existing file is left alone.
pub fn install_default_template(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(TEMPLATE_NAME);
    if !path.exists() {
        info!("installing default template at {}", path.display());
        fs::write(&path, DEFAULT_TEMPLATE)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{InvoiceField, InvoiceForm, ItemField};
    use crate::model::InvoiceRecord;
    use chrono::NaiveDate;

    fn sample_form() -> InvoiceForm {
        let mut form = InvoiceForm::new(InvoiceRecord::new_dated(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        ));
        form.set_field(InvoiceField::InvoiceNumber, "INV-001");
        form.set_field(InvoiceField::CompanyName, "Sharma Steel Works");
        form.set_field(InvoiceField::CompanyGstin, "27ABCDE1234F1Z5");
        form.set_field(InvoiceField::ClientName, "Patel & Sons");
        form.set_item_field(0, ItemField::Description, "TMT bars <12mm>");
        form.set_item_field(0, ItemField::Quantity, "2");
        form.set_item_field(0, ItemField::Rate, "100");
        form
    }

    fn render(form: &InvoiceForm) -> RenderedInvoice {
        InvoiceRenderer::new()
            .unwrap()
            .render(&InvoiceSnapshot::capture(form.record()))
            .unwrap()
    }

    #[test]
    fn renders_header_parties_and_totals() {
        let rendered = render(&sample_form());

        assert_eq!(rendered.filename, "Invoice-INV-001.pdf");
        assert_eq!(rendered.page, PageFormat::A4);
        assert!(rendered.html.contains("TAX INVOICE"));
        assert!(rendered.html.contains("INV-001"));
        assert!(rendered.html.contains("01/04/2024"));
        assert!(rendered.html.contains("GSTIN:</span> 27ABCDE1234F1Z5"));
        assert!(rendered.html.contains("CGST (9%)"));
        assert!(rendered.html.contains("₹236.00"));
        assert!(rendered.html.contains("size: 210mm 297mm"));
    }

    #[test]
    fn user_text_is_escaped() {
        let rendered = render(&sample_form());

        assert!(rendered.html.contains("Patel &amp; Sons"));
        assert!(rendered.html.contains("TMT bars &lt;12mm&gt;"));
        assert!(!rendered.html.contains("<12mm>"));
    }

    #[test]
    fn delivery_text_is_echoed_in_summary() {
        let mut form = sample_form();
        form.set_field(InvoiceField::DeliveryCharge, "Pending");
        let rendered = render(&form);

        assert!(rendered.html.contains("Delivery Charge"));
        assert!(rendered.html.contains("Pending"));
        assert!(rendered.html.contains("₹236.00"));
    }

    #[test]
    fn empty_optional_sections_are_left_out() {
        let mut form = sample_form();
        form.set_field(InvoiceField::Terms, "");
        form.set_field(InvoiceField::DueDate, "");
        let rendered = render(&form);

        assert!(!rendered.html.contains("Delivery Charge"));
        assert!(!rendered.html.contains("P&amp;F Charge"));
        assert!(!rendered.html.contains("Due Date"));
        assert!(!rendered.html.contains("Terms &amp; Conditions"));
        assert!(!rendered.html.contains("Phone:"));
    }

    #[test]
    fn template_dir_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TEMPLATE_NAME), "custom {{ total }}").unwrap();

        let renderer = InvoiceRenderer::with_template_dir(dir.path()).unwrap();
        let rendered = renderer
            .render(&InvoiceSnapshot::capture(sample_form().record()))
            .unwrap();
        assert_eq!(rendered.html, "custom ₹236.00");
    }

    #[test]
    fn install_keeps_an_existing_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = install_default_template(dir.path()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("TAX INVOICE"));

        std::fs::write(&path, "mine").unwrap();
        install_default_template(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "mine");
    }
}
