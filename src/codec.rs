//! Config codec: the YAML body of a view block ⇄ [`ViewConfig`].
//!
//! Decoding is total: every config field has a default, so partial text
//! merges over the defaults and unparsable text yields the full default set
//! (reported to the sink, never raised). Encoding is normalized to exactly
//! one trailing line terminator; callers must not trim or append, since the
//! line-splice in [`crate::persist`] relies on this exactness.

use crate::diag::{Diagnostic, DiagnosticSink};
use crate::error::Result;
use crate::model::ViewConfig;

/// Decode a view block body.
///
/// Partial documents are merged over a complete default config; malformed
/// documents fall back to the default entirely.
pub fn decode(text: &str, sink: &dyn DiagnosticSink) -> ViewConfig {
    if text.trim().is_empty() {
        return ViewConfig::default();
    }
    match serde_yaml::from_str(text) {
        Ok(config) => config,
        Err(err) => {
            sink.report(Diagnostic::ConfigParse {
                message: err.to_string(),
            });
            ViewConfig::default()
        }
    }
}

/// Encode a config as a normalized YAML block.
///
/// The result ends with exactly one `\n`: no trailing blank line, no missing
/// terminator.
pub fn encode(config: &ViewConfig) -> Result<String> {
    let yaml = serde_yaml::to_string(config)?;
    let mut out = yaml.trim_end_matches('\n').to_string();
    out.push('\n');
    Ok(out)
}
