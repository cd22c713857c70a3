//! Case catalog for Lexaid
//!
//! The catalog is a flat JSON document built once from a directory of
//! judgment PDFs. Clients load it whole and filter it locally.

pub mod indexer;
pub mod query;
pub mod schema;

pub use indexer::CatalogIndexer;
pub use query::CatalogQuery;
pub use schema::{CatalogDocument, CatalogRecord};
