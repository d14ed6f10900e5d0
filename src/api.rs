//! Public facade over the view pipeline.
//!
//! [`MetaView`] ties a vault, a failure policy, and a diagnostic sink
//! together and exposes the two operations hosts actually call:
//!
//! - [`MetaView::render_block`]: config text in, rendered page out. Total;
//!   broken config or broken user code degrades, never errors.
//! - [`MetaView::save_config`]: write a config back into its exact block
//!   span inside the host document, touching nothing else.

use crate::codec;
use crate::compile::FailMode;
use crate::diag::{DiagnosticSink, TracingSink};
use crate::error::Result;
use crate::matcher;
use crate::model::ViewConfig;
use crate::page;
use crate::persist;
use crate::render::{self, Row};
use crate::sort;
use crate::vault::{DocumentRef, Vault};

/// Fence language tag identifying view blocks in host documents.
pub const BLOCK_LANGUAGE: &str = "metaview";

/// One rendered page of a configured view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPage {
    pub rows: Vec<Row>,
    /// Matched items across all pages, before pagination.
    pub total_items: usize,
    pub total_pages: u32,
    /// The page actually rendered, after clamping the requested one.
    pub page_number: u32,
}

/// What a block renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput {
    /// The block has no fields configured yet; the host shows a
    /// "configure me" affordance instead of an empty table.
    Placeholder,
    Table(ViewPage),
}

pub struct MetaView<V: Vault> {
    vault: V,
    fail_mode: FailMode,
    sink: Box<dyn DiagnosticSink>,
}

impl<V: Vault> MetaView<V> {
    pub fn new(vault: V) -> Self {
        Self {
            vault,
            fail_mode: FailMode::default(),
            sink: Box::new(TracingSink),
        }
    }

    pub fn with_fail_mode(mut self, fail_mode: FailMode) -> Self {
        self.fail_mode = fail_mode;
        self
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    /// Decode a block's config text and render it. Malformed text degrades
    /// to the default (unconfigured) view after reporting.
    pub fn render_block(&self, config_text: &str) -> ViewOutput {
        let config = codec::decode(config_text, self.sink.as_ref());
        self.render(&config)
    }

    /// Run the full pipeline for a decoded config: rescan and match, sort,
    /// clamp the requested page, slice it, project it through the fields.
    pub fn render(&self, config: &ViewConfig) -> ViewOutput {
        if !config.is_configured() {
            return ViewOutput::Placeholder;
        }

        let mut items = matcher::run(
            &self.vault,
            &config.filters,
            &config.folder,
            &config.excluded_folders,
            self.fail_mode,
            self.sink.as_ref(),
        );
        sort::order(&mut items, &config.sorter, self.sink.as_ref());

        let total_items = items.len();
        let total_pages = page::total_pages(total_items, config.page_size);
        let page_number = page::clamp_page(config.page_number, total_items, config.page_size);
        let page_items = page::paginate(&items, page_number, config.page_size);

        ViewOutput::Table(ViewPage {
            rows: render::render_rows(page_items, &config.fields),
            total_items,
            total_pages,
            page_number,
        })
    }

    /// Persist `config` into the `block_index`-th view block of `doc`.
    ///
    /// Reads the host, locates the block, splices the encoded config
    /// between its fences, and writes the host back in a single write.
    /// Fails with [`crate::error::MetaViewError::BlockNotFound`] when the
    /// document no longer contains that block.
    pub fn save_config(
        &mut self,
        doc: &DocumentRef,
        block_index: usize,
        config: &ViewConfig,
    ) -> Result<()> {
        let host = self.vault.read_document(doc)?;
        let span = persist::locate_block(&host, BLOCK_LANGUAGE, block_index);
        let encoded = codec::encode(config)?;
        let updated = persist::splice(&host, span, &encoded)?;
        self.vault.write_document(doc, &updated)
    }
}
