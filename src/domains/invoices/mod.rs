pub mod memory;
pub mod models;
pub mod postgres;
pub mod pricing;
pub mod service;
pub mod store;

pub use memory::MemoryInvoiceStore;
pub use models::{
    CreatedInvoice, CustomerDisplay, DiscountType, Invoice, InvoiceChanges, InvoiceDraft,
    InvoiceWithParties,
};
pub use postgres::PgInvoiceStore;
pub use service::InvoiceService;
pub use store::{InvoiceStore, PartyDirectory};
