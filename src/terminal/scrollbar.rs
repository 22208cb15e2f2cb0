use std::ops::Range;

use anyhow::Result;
use tracing::info;

use crate::render::{DecorationOptions, ScrollDecoration, ScrollMetrics};
use crate::terminal::buffer::TerminalBuffer;

const DEFAULT_THUMB: char = '█';
const DEFAULT_TRACK: char = '│';

/// One-column scrollbar drawn beside the list.
///
/// Recognised options: `thumb` and `track`, each a single glyph.
#[derive(Debug, Clone)]
pub struct TerminalScrollbar {
    metrics: Option<ScrollMetrics>,
    thumb: char,
    track: char,
}

impl Default for TerminalScrollbar {
    fn default() -> Self {
        Self {
            metrics: None,
            thumb: DEFAULT_THUMB,
            track: DEFAULT_TRACK,
        }
    }
}

impl TerminalScrollbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.metrics.is_some()
    }

    /// Rows of a track `track_len` tall that the thumb covers.
    pub fn thumb_span(&self, track_len: u16) -> Option<Range<u16>> {
        let metrics = self.metrics?;
        let viewport = u64::from(metrics.viewport.height);
        let content = u64::from(metrics.content.height);
        if track_len == 0 || content == 0 {
            return None;
        }
        if content <= viewport {
            return Some(0..track_len);
        }
        let track = u64::from(track_len);
        let len = (track * viewport / content).clamp(1, track);
        let travel = track - len;
        let scrollable = content - viewport;
        let start = (u64::from(metrics.offset.top).min(scrollable) * travel) / scrollable;
        Some(start as u16..(start + len) as u16)
    }

    pub fn render(&self, height: u16) -> Option<TerminalBuffer> {
        let span = self.thumb_span(height)?;
        let mut buffer = TerminalBuffer::new(1, height);
        for row in 0..height {
            let glyph = if span.contains(&row) { self.thumb } else { self.track };
            buffer.write(&glyph.to_string());
            if row + 1 < height {
                buffer.newline();
            }
        }
        Some(buffer)
    }
}

fn glyph(options: &DecorationOptions, key: &str, default: char) -> char {
    options
        .get(key)
        .and_then(|value| value.chars().next())
        .unwrap_or(default)
}

impl ScrollDecoration for TerminalScrollbar {
    fn initialize(&mut self, options: &DecorationOptions, metrics: &ScrollMetrics) -> Result<()> {
        self.thumb = glyph(options, "thumb", DEFAULT_THUMB);
        self.track = glyph(options, "track", DEFAULT_TRACK);
        self.metrics = Some(*metrics);
        info!("scrollbar initialized");
        Ok(())
    }

    fn update(&mut self, metrics: &ScrollMetrics) -> Result<()> {
        if self.metrics.is_some() {
            self.metrics = Some(*metrics);
        }
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.metrics = None;
        info!("scrollbar destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ScrollOffset, Size};

    fn metrics(top: u32) -> ScrollMetrics {
        ScrollMetrics {
            offset: ScrollOffset::new(top, 0),
            viewport: Size::new(10, 10),
            content: Size::new(10, 100),
        }
    }

    #[test]
    fn inactive_until_initialized() {
        let mut bar = TerminalScrollbar::new();
        bar.update(&metrics(0)).unwrap();
        assert!(!bar.is_active());
        assert!(bar.render(10).is_none());
    }

    #[test]
    fn thumb_tracks_offset() {
        let mut bar = TerminalScrollbar::new();
        bar.initialize(&DecorationOptions::new(), &metrics(0)).unwrap();
        assert_eq!(bar.thumb_span(10), Some(0..1));

        bar.update(&metrics(90)).unwrap();
        assert_eq!(bar.thumb_span(10), Some(9..10));

        bar.update(&metrics(45)).unwrap();
        assert_eq!(bar.thumb_span(10), Some(4..5));
    }

    #[test]
    fn options_pick_glyphs() {
        let mut options = DecorationOptions::new();
        options.insert("thumb".into(), "#".into());
        options.insert("track".into(), ".".into());
        let mut bar = TerminalScrollbar::new();
        bar.initialize(&options, &metrics(0)).unwrap();

        let rows = bar.render(3).map(|buffer| buffer.rows()).unwrap_or_default();
        assert_eq!(rows, vec!["#", ".", "."]);

        bar.destroy().unwrap();
        assert!(!bar.is_active());
    }
}
