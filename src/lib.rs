//! GST tax invoices: form state, totals, HTML rendering and PDF export.

pub mod calc;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod format;
pub mod model;
pub mod render;
pub mod session;
pub mod snapshot;

pub use calc::{DeliveryCharge, Totals};
pub use error::{BackendError, ConfigError, ExportError};
pub use export::{CommandBackend, DocumentBackend, Exporter};
pub use form::{InvoiceField, InvoiceForm, ItemField};
pub use model::{ClientDetails, CompanyDetails, InvoiceItem, InvoiceRecord};
pub use render::{InvoiceRenderer, PageFormat, RenderedInvoice};
pub use session::InvoiceSession;
pub use snapshot::InvoiceSnapshot;
