//! Stream graph module
//!
//! Stream nodes and the immutable forest they form.
//!
//! # Overview
//!
//! - `StreamNode` - name, parent, request, record locator, primary key and
//!   the two per-node hooks (row post-processing, child context derivation)
//! - `Catalog` - the forest, built once with `CatalogBuilder` and passed by
//!   reference to the engine
//! - `google_ads_catalog` - the concrete Google Ads forest

mod catalog;
mod googleads;
mod node;

pub use catalog::{Catalog, CatalogBuilder, StreamDescriptor};
pub use googleads::{
    google_ads_catalog, ACCESSIBLE_CUSTOMERS, CUSTOMER_HIERARCHY, CUSTOMER_ID_KEY,
    GEO_TARGET_CONSTANT, RESOURCE_NAMES_KEY,
};
pub use node::{ContextDeriver, NodeId, PostProcess, RequestSpec, StreamNode};
