/// FBR Digital Invoicing integration
///
/// Split into the wire payload mapping (`payload`), the HTTP client
/// behind the `TaxAuthorityClient` trait (`client`), and the
/// submission workflow that ties database state to the remote call
/// (`submit`).

pub mod client;
pub mod payload;
pub mod submit;

pub use client::{FbrClient, SubmissionResult, TaxAuthorityClient};
pub use payload::FbrInvoicePayload;
pub use submit::{submit_invoice, SubmissionOutcome, SubmitError};
