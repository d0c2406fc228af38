//! Turning a rendered invoice into a PDF file on disk.
//!
//! The actual rasterising and paging is done by an external program behind
//! [`DocumentBackend`]; [`Exporter`] owns the busy flag and the output file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info, warn};

use crate::error::{BackendError, ExportError};
use crate::render::{PageFormat, RenderedInvoice};

/// Renders an invoice page into the bytes of a paged document.
pub trait DocumentBackend {
    fn render(&self, invoice: &RenderedInvoice, page: PageFormat) -> Result<Vec<u8>, BackendError>;
}

/// Drives a headless browser (or anything with the same command line) to
/// print the invoice HTML to PDF.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl DocumentBackend for CommandBackend {
    fn render(&self, invoice: &RenderedInvoice, page: PageFormat) -> Result<Vec<u8>, BackendError> {
        let scratch = tempfile::tempdir()?;
        let html_path = scratch.path().join("invoice.html");
        let pdf_path = scratch.path().join("invoice.pdf");
        fs::write(&html_path, &invoice.html)?;

        info!(
            "rendering {} on {}x{}mm via {}",
            invoice.filename,
            page.width_mm(),
            page.height_mm(),
            self.program
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(format!("--print-to-pdf={}", pdf_path.display()))
            .arg(&html_path)
            .output()
            .map_err(|source| BackendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BackendError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let bytes = fs::read(&pdf_path)?;
        if bytes.is_empty() {
            return Err(BackendError::EmptyOutput);
        }
        Ok(bytes)
    }
}

/// Writes PDFs into one directory, one export at a time.
pub struct Exporter<B> {
    backend: B,
    output_dir: PathBuf,
    busy: AtomicBool,
}

/// Clears the busy flag when the export ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: DocumentBackend> Exporter<B> {
    pub fn new(backend: B, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_dir: output_dir.into(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<BusyGuard<'_>, ExportError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("export requested while another is running");
            return Err(ExportError::Busy);
        }
        Ok(BusyGuard(&self.busy))
    }

    /// Produces `output_dir/<invoice.filename>`. Nothing is written unless
    /// the backend succeeds; the file appears in one rename.
    pub fn export(&self, invoice: &RenderedInvoice) -> Result<PathBuf, ExportError> {
        let _guard = self.begin()?;

        let bytes = self.backend.render(invoice, invoice.page).map_err(|e| {
            error!("Error generating PDF: {}", e);
            ExportError::Backend(e)
        })?;

        let target = self.output_dir.join(&invoice.filename);
        self.write_atomically(&target, &bytes).map_err(|e| {
            error!("Error writing {}: {}", target.display(), e);
            ExportError::Write(e)
        })?;

        info!("PDF generated: {}", target.display());
        Ok(target)
    }

    fn write_atomically(&self, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        let mut file = tempfile::NamedTempFile::new_in(&self.output_dir)?;
        file.write_all(bytes)?;
        file.persist(target).map_err(|e| e.error)?;
        Ok(())
    }
}
