use std::path::PathBuf;

use log::{error, info};

use crate::error::ExportError;
use crate::export::{DocumentBackend, Exporter};
use crate::form::InvoiceForm;
use crate::render::{InvoiceRenderer, RenderedInvoice};
use crate::snapshot::InvoiceSnapshot;

/// One user's invoice from first keystroke to downloaded PDF.
///
/// The form stays editable while the preview is open; the preview and the
/// exported file always reflect the record at the time they are produced.
pub struct InvoiceSession<B> {
    form: InvoiceForm,
    renderer: InvoiceRenderer,
    exporter: Exporter<B>,
    preview_open: bool,
}

impl<B: DocumentBackend> InvoiceSession<B> {
    pub fn new(form: InvoiceForm, renderer: InvoiceRenderer, exporter: Exporter<B>) -> Self {
        Self {
            form,
            renderer,
            exporter,
            preview_open: false,
        }
    }

    pub fn form(&self) -> &InvoiceForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut InvoiceForm {
        &mut self.form
    }

    pub fn exporter(&self) -> &Exporter<B> {
        &self.exporter
    }

    pub fn snapshot(&self) -> InvoiceSnapshot {
        InvoiceSnapshot::capture(self.form.record())
    }

    pub fn is_preview_open(&self) -> bool {
        self.preview_open
    }

    /// Renders the current record and keeps the preview open for export.
    pub fn open_preview(&mut self) -> tera::Result<RenderedInvoice> {
        let rendered = self.renderer.render(&self.snapshot())?;
        self.preview_open = true;
        Ok(rendered)
    }

    pub fn close_preview(&mut self) {
        self.preview_open = false;
    }

    /// Exports the invoice as it stands now. Requires an open preview.
    pub fn export(&self) -> Result<PathBuf, ExportError> {
        if !self.preview_open {
            return Err(ExportError::MissingRenderTarget);
        }

        let snapshot = self.snapshot();
        info!("exporting {} (total {})", snapshot.filename, snapshot.total);
        let rendered = self.renderer.render(&snapshot).map_err(|e| {
            error!("Error generating PDF: {}", e);
            ExportError::Render(e)
        })?;

        self.exporter.export(&rendered)
    }
}
