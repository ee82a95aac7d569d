//! Client code for airgrid.
//!
//! This crate provides the caching CRUD adapter for a remote
//! tabular-data API: the request dispatcher, the attachment cache, and
//! the public `CachingClient` facade.

pub mod attachments;
pub mod caching;
pub mod error;
pub mod records;
pub mod transport;

pub use attachments::AttachmentStore;
pub use caching::CachingClient;
pub use error::ClientError;
pub use records::{Deleted, ListOptions, Record, RecordPage, RecordsApi};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
