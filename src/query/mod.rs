//! Query-result shaping: attribute projection and sorting.
//!
//! RFC 7644 §3.4.2.3 and §3.4.2.5 let clients choose which attributes come
//! back and in what order list results are returned. Execution of the query
//! itself belongs to the service provider; this module shapes the documents
//! it produced.

mod projection;
mod sorting;

pub use projection::AttributeProjection;
pub use sorting::{SortSpec, sort_resources};
