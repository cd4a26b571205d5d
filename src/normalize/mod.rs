// src/normalize/mod.rs
// =============================================================================
// This module turns a GitHub README into something a Markdown editor can
// render.
//
// Submodules:
// - interleave: the line scan that pulls Markdown out of HTML blocks
// - cleanup: empty-tag removal, <br> and <div> handling
// - sanitize: the pluggable HTML line cleaner
//
// The orchestrator runs `interleave` first, rewrites image URLs, then calls
// `tidy` for the remaining passes. The split exists because the URL rewrite
// has to happen in between.
// =============================================================================

mod cleanup;
mod interleave;
mod sanitize;

pub use cleanup::{eliminate_empty_tags, normalize_line_breaks, strip_layout_tags};
pub use interleave::resolve_interleaving;
pub use sanitize::{Passthrough, Sanitize, TagSanitizer};

use crate::config::{ImporterConfig, SanitizerKind};

/// The normalization passes, configured once per import
pub struct Normalizer {
    sanitizer: Box<dyn Sanitize>,
    strip_layout: bool,
}

impl Normalizer {
    pub fn new(sanitizer: Box<dyn Sanitize>, strip_layout: bool) -> Self {
        Self {
            sanitizer,
            strip_layout,
        }
    }

    pub fn from_config(config: &ImporterConfig) -> Self {
        let sanitizer: Box<dyn Sanitize> = match config.sanitizer {
            SanitizerKind::Default => Box::new(TagSanitizer),
            SanitizerKind::Passthrough => Box::new(Passthrough),
        };
        Self::new(sanitizer, config.strip_layout_tags)
    }

    /// Closes and re-opens HTML blocks around embedded Markdown.
    pub fn interleave(&self, content: &str) -> String {
        resolve_interleaving(content, self.sanitizer.as_ref())
    }

    /// Line breaks, then layout tags (if enabled), then empty tags. Empty
    /// tags go last because the earlier passes can leave some behind.
    pub fn tidy(&self, content: &str) -> String {
        let content = normalize_line_breaks(content);
        let content = if self.strip_layout {
            strip_layout_tags(&content)
        } else {
            content
        };
        eliminate_empty_tags(&content)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Box::new(TagSanitizer), true)
    }
}
