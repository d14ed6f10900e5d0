//! Locating and rewriting a view block inside its host document.
//!
//! A view block is a fenced code region tagged with the view language: an
//! opening fence line carrying the language tag, YAML config lines, and a
//! bare closing fence.
//!
//! [`locate_block`] finds the Nth such block and [`splice`] replaces only
//! the lines strictly between its fences. Everything outside the span is
//! preserved byte for byte: the host is split and rejoined on `'\n'` alone,
//! so `\r` and any other line content ride along untouched.

use crate::error::{MetaViewError, Result};

/// Line span of one block inside its host document. `line_start` is the
/// opening fence line, `line_end` the closing fence line, both 0-based over
/// `'\n'`-separated segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub line_start: usize,
    pub line_end: usize,
}

/// Find the `index`-th (0-based) fenced block tagged `language`.
///
/// An opening fence is a line whose trimmed text is exactly the three-tick
/// fence followed by the language tag; the closing fence is the next line
/// whose trimmed text is exactly the bare fence. An unclosed block at the
/// end of the document is not a block.
pub fn locate_block(host: &str, language: &str, index: usize) -> Option<BlockSpan> {
    let open = format!("```{language}");
    let mut seen = 0;
    let mut current: Option<usize> = None;

    for (line_no, line) in host.split('\n').enumerate() {
        let trimmed = line.trim();
        match current {
            None => {
                if trimmed == open {
                    current = Some(line_no);
                }
            }
            Some(start) => {
                if trimmed == "```" {
                    if seen == index {
                        return Some(BlockSpan {
                            line_start: start,
                            line_end: line_no,
                        });
                    }
                    seen += 1;
                    current = None;
                }
            }
        }
    }
    None
}

/// Replace the content between the span's fences with `content`, leaving
/// every other byte of the host untouched.
///
/// `span` is typically the one captured when the block was rendered; if the
/// host changed underneath and the span no longer brackets a block,
/// this fails rather than corrupting the document.
pub fn splice(host: &str, span: Option<BlockSpan>, content: &str) -> Result<String> {
    let span = span.ok_or(MetaViewError::BlockNotFound)?;
    let lines: Vec<&str> = host.split('\n').collect();

    let valid = span.line_start < span.line_end
        && span.line_end < lines.len()
        && lines[span.line_start].trim().starts_with("```")
        && lines[span.line_start].trim().len() > 3
        && lines[span.line_end].trim() == "```";
    if !valid {
        return Err(MetaViewError::BlockNotFound);
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    out.extend_from_slice(&lines[..=span.line_start]);
    out.extend(content.lines());
    out.extend_from_slice(&lines[span.line_end..]);
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANG: &str = "metaview";

    fn host() -> String {
        [
            "# Daily note",
            "",
            "```metaview",
            "fields: []",
            "```",
            "",
            "Some prose after.",
            "",
            "```rust",
            "fn main() {}",
            "```",
            "",
            "```metaview",
            "folder: projects",
            "```",
            "",
        ]
        .join("\n")
    }

    #[test]
    fn locates_blocks_by_language_and_index() {
        let host = host();
        assert_eq!(
            locate_block(&host, LANG, 0),
            Some(BlockSpan {
                line_start: 2,
                line_end: 4
            })
        );
        assert_eq!(
            locate_block(&host, LANG, 1),
            Some(BlockSpan {
                line_start: 12,
                line_end: 14
            })
        );
        assert_eq!(locate_block(&host, LANG, 2), None);
    }

    #[test]
    fn other_languages_do_not_count() {
        let host = host();
        assert_eq!(
            locate_block(&host, "rust", 0),
            Some(BlockSpan {
                line_start: 8,
                line_end: 10
            })
        );
    }

    #[test]
    fn indented_fences_still_match() {
        let host = "  ```metaview\n  x: 1\n  ```\n";
        assert_eq!(
            locate_block(host, LANG, 0),
            Some(BlockSpan {
                line_start: 0,
                line_end: 2
            })
        );
    }

    #[test]
    fn unclosed_block_is_not_found() {
        let host = "```metaview\nfields: []\n";
        assert_eq!(locate_block(host, LANG, 0), None);
    }

    #[test]
    fn splice_replaces_only_the_block_interior() {
        let host = host();
        let span = locate_block(&host, LANG, 0);
        let out = splice(&host, span, "fields:\n  - type: tags\n").unwrap();

        let expected = host.replace("fields: []", "fields:\n  - type: tags");
        assert_eq!(out, expected);
        // The second block is untouched
        assert!(out.contains("folder: projects"));
    }

    #[test]
    fn splice_preserves_crlf_outside_the_block() {
        let host = "before\r\n```metaview\r\nold: 1\r\n```\r\nafter\r\n";
        let span = locate_block(host, LANG, 0);
        let out = splice(host, span, "new: 2\n").unwrap();
        assert!(out.starts_with("before\r\n```metaview\r\n"));
        assert!(out.ends_with("```\r\nafter\r\n"));
        assert!(out.contains("\nnew: 2\n"));
    }

    #[test]
    fn splice_without_a_span_is_block_not_found() {
        let err = splice("no blocks here", None, "x: 1\n").unwrap_err();
        assert!(matches!(err, MetaViewError::BlockNotFound));
    }

    #[test]
    fn splice_with_a_stale_span_is_block_not_found() {
        // The host shrank since the span was captured
        let err = splice(
            "short\n",
            Some(BlockSpan {
                line_start: 2,
                line_end: 4,
            }),
            "x: 1\n",
        )
        .unwrap_err();
        assert!(matches!(err, MetaViewError::BlockNotFound));
    }

    #[test]
    fn splice_rejects_a_span_not_on_fences() {
        let host = host();
        let err = splice(
            &host,
            Some(BlockSpan {
                line_start: 0,
                line_end: 1,
            }),
            "x: 1\n",
        )
        .unwrap_err();
        assert!(matches!(err, MetaViewError::BlockNotFound));
    }

    #[test]
    fn empty_replacement_collapses_the_interior() {
        let host = "```metaview\na: 1\nb: 2\n```\n";
        let span = locate_block(host, LANG, 0);
        let out = splice(host, span, "").unwrap();
        assert_eq!(out, "```metaview\n```\n");
    }
}
