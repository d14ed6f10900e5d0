//! # metaview
//!
//! An embeddable live-view engine for metadata-rich document corpora. A
//! view is a fenced code block inside a host document; its YAML body is a
//! [`model::ViewConfig`] describing which documents to show (folder scope
//! plus filters), how to order them, which page to show, and which columns
//! to render. The block renders as a table and persists its own config
//! back into its exact line span in the host.
//!
//! ## Pipeline
//!
//! Each render pass is a full rescan:
//!
//! 1. [`codec`] decodes the block body (totally; malformed text degrades
//!    to defaults).
//! 2. [`matcher`] scans the [`vault`], scopes by folder, and keeps the
//!    documents matching every filter.
//! 3. [`sort`] orders the matches, [`page`] slices the requested page.
//! 4. [`render`] projects the page through the configured fields.
//!
//! User-authored filter and sorter code runs behind [`compile`], which
//! turns its failures into [`diag`] events instead of errors. Config
//! saves go through [`persist`], which rewrites only the lines between
//! the block's fences.
//!
//! [`api::MetaView`] is the facade tying it all together; most hosts only
//! need that and a [`vault::Vault`] implementation.

pub mod api;
pub mod codec;
pub mod compile;
pub mod diag;
pub mod error;
pub mod expr;
pub mod matcher;
pub mod model;
pub mod page;
pub mod persist;
pub mod render;
pub mod resize;
pub mod sort;
pub mod vault;

pub use api::{MetaView, ViewOutput, ViewPage, BLOCK_LANGUAGE};
pub use error::{MetaViewError, Result};
pub use model::ViewConfig;
