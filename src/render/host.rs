use std::collections::BTreeMap;

use anyhow::Result;

use crate::geometry::{Measure, Position, ScrollOffset, Size};

/// The visual tree a list renders into.
///
/// Nodes are produced by the list's render function; the host only places
/// them. Every call is synchronous.
pub trait Host: Measure {
    type Node;

    /// Prepares the content area, optionally at a named attach point.
    fn mount_content(&mut self, _append_to: Option<&str>) -> Result<()> {
        Ok(())
    }

    fn attach(&mut self, node: &Self::Node) -> Result<()>;

    fn detach(&mut self, node: &Self::Node) -> Result<()>;

    fn set_position(&mut self, node: &Self::Node, position: Position) -> Result<()>;

    /// Full scrollable extent of the content.
    fn set_content_size(&mut self, _size: Size) -> Result<()> {
        Ok(())
    }

    /// Moves the viewport. Called only for list-initiated scrolls.
    fn set_scroll_offset(&mut self, offset: ScrollOffset) -> Result<()>;

    /// Distance from the top of the content to `node`.
    fn offset_top(&self, node: &Self::Node) -> u32;
}

/// Opaque options handed to the scroll decoration untouched.
pub type DecorationOptions = BTreeMap<String, String>;

/// What a scroll decoration needs to draw itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub offset: ScrollOffset,
    pub viewport: Size,
    pub content: Size,
}

/// An auxiliary scrollbar layered over the container.
pub trait ScrollDecoration {
    fn initialize(&mut self, options: &DecorationOptions, metrics: &ScrollMetrics) -> Result<()>;

    fn update(&mut self, metrics: &ScrollMetrics) -> Result<()>;

    fn destroy(&mut self) -> Result<()>;
}

/// For hosts that draw no scrollbar.
impl ScrollDecoration for () {
    fn initialize(&mut self, _options: &DecorationOptions, _metrics: &ScrollMetrics) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _metrics: &ScrollMetrics) -> Result<()> {
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        Ok(())
    }
}
