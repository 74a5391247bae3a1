//! Aldehyde Assets - home asset catalog kept in a flat delimited text file.
//!
//! Core concepts:
//! - **AssetRecord**: the seven user-visible fields of one owned item
//! - **AssetId**: surrogate key persisted next to each record
//! - **codec**: one record <-> one line of comma-delimited text
//! - **AssetStore**: the authoritative in-memory collection, rewritten to disk on every change
//!
//! # Example
//!
//! ```no_run
//! use aldehyde_assets::{AssetRecord, AssetStore};
//!
//! let (mut store, report) = AssetStore::load("assets.csv");
//! println!("loaded {} assets, skipped {}", report.loaded, report.skipped.len());
//!
//! store.append(AssetRecord::new("Drill").with_category("Tools"))?;
//! for asset in store.search("dri") {
//!     println!("{}: {}", asset.id, asset.record.name);
//! }
//! # Ok::<(), aldehyde_assets::StoreError>(())
//! ```

pub mod codec;
mod error;
mod record;
mod store;

pub use codec::{Decoded, NO_DATE};
pub use error::{CodecError, StoreError};
pub use record::{Asset, AssetId, AssetRecord};
pub use store::{AssetStore, LineDiagnostic, LoadReport};
