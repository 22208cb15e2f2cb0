//! Scroll state, programmatic scrolling and the scrollbar decoration lifecycle.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::error::Result;
use crate::event::ListEvent;
use crate::geometry::{Invalidation, ScrollOffset};
use crate::items::ItemId;
use crate::list::VirtualList;
use crate::render::{Host, ScrollDecoration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecorationState {
    #[default]
    Uninitialized,
    ScrollActive,
    NoScroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationTransition {
    Initialize,
    Destroy,
}

/// Read side of the "programmatic scroll in progress" flag.
///
/// Hosts that emit their own scroll signals can hold a clone and drop the
/// signal while it is active.
#[derive(Debug, Clone, Default)]
pub struct ScrollSuppression(Rc<Cell<bool>>);

impl ScrollSuppression {
    pub fn is_active(&self) -> bool {
        self.0.get()
    }
}

/// Held for the duration of a list-initiated scroll. Dropping it restores
/// the previous flag, so nested scrolls and early returns unwind correctly.
#[must_use]
#[derive(Debug)]
pub struct ProgrammaticScroll {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for ProgrammaticScroll {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

#[derive(Debug, Default)]
pub struct ScrollController {
    offset: ScrollOffset,
    suppression: ScrollSuppression,
    decoration: DecorationState,
}

impl ScrollController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> ScrollOffset {
        self.offset
    }

    pub fn set_offset(&mut self, offset: ScrollOffset) {
        self.offset = offset;
    }

    pub fn begin_programmatic(&self) -> ProgrammaticScroll {
        let flag = self.suppression.0.clone();
        let previous = flag.replace(true);
        ProgrammaticScroll { flag, previous }
    }

    pub fn is_programmatic(&self) -> bool {
        self.suppression.is_active()
    }

    pub fn suppression(&self) -> ScrollSuppression {
        self.suppression.clone()
    }

    pub fn decoration_state(&self) -> DecorationState {
        self.decoration
    }

    /// Advances the decoration state machine. `fits` means every item is
    /// visible and the content is no larger than the viewport.
    pub fn next_decoration(&mut self, fits: bool) -> Option<DecorationTransition> {
        let (next, transition) = match (self.decoration, fits) {
            (DecorationState::ScrollActive, true) => {
                (DecorationState::NoScroll, Some(DecorationTransition::Destroy))
            }
            (DecorationState::ScrollActive, false) => (DecorationState::ScrollActive, None),
            (_, true) => (DecorationState::NoScroll, None),
            (_, false) => (
                DecorationState::ScrollActive,
                Some(DecorationTransition::Initialize),
            ),
        };
        if next != self.decoration {
            info!("scroll decoration {:?} -> {:?}", self.decoration, next);
        }
        self.decoration = next;
        transition
    }

    /// Forgets the decoration without tearing it down.
    pub fn reset_decoration(&mut self) {
        self.decoration = DecorationState::Uninitialized;
    }
}

impl<I, H, D> VirtualList<I, H, D>
where
    I: ItemId,
    H: Host,
    D: ScrollDecoration,
{
    /// Scrolls to `top` and/or `left`; `None` leaves that axis alone.
    pub fn scroll_to(&mut self, top: Option<u32>, left: Option<u32>) -> Result<()> {
        let current = self.scroll.offset();
        let target = ScrollOffset {
            top: top.unwrap_or(current.top),
            left: left.unwrap_or(current.left),
        };
        self.programmatic_scroll(target)
    }

    /// Scrolls vertically to `y`. Does nothing when already there.
    pub fn scroll_to_y(&mut self, y: u32) -> Result<()> {
        let current = self.scroll.offset();
        let target = self.clamp_offset(ScrollOffset { top: y, ..current });
        if target == current {
            return Ok(());
        }
        self.programmatic_scroll(target)
    }

    /// Scrolls so that `scrolled_percent_y` becomes `percent`.
    pub fn scroll_to_percent_y(&mut self, percent: f64) -> Result<()> {
        let viewport = self.scroll_height();
        let top = (percent.max(0.0) * f64::from(viewport) / 100.0).round();
        self.scroll_to_y(top.min(f64::from(u32::MAX)) as u32)
    }

    /// Scrolls the row holding `id` to the top of the viewport.
    /// Returns false, touching nothing, when `id` is not in the list.
    pub fn scroll_to_item(&mut self, id: &I) -> Result<bool> {
        let Some(index) = self.items.index_of(id) else {
            debug!("scroll_to_item: {:?} not in list", id);
            return Ok(false);
        };
        let columns = self.columns_per_row();
        let row = u32::try_from(index / columns).unwrap_or(u32::MAX);
        let top = row.saturating_mul(self.settings.item_size.height);
        let left = self.scroll.offset().left;
        self.programmatic_scroll(ScrollOffset { top, left })?;
        Ok(true)
    }

    /// Scrolls so that `node` sits at the top of the viewport.
    pub fn scroll_to_element(&mut self, node: &H::Node) -> Result<()> {
        let top = self.host.offset_top(node);
        let left = self.scroll.offset().left;
        self.programmatic_scroll(ScrollOffset { top, left })
    }

    /// Entry point for scroll signals raised by the host environment.
    ///
    /// The host has already moved its viewport; an out-of-range offset is
    /// pushed back to the host clamped. Signals that arrive while a
    /// programmatic scroll is in progress, or before the first render, are
    /// ignored. Returns whether the signal was handled as a user scroll.
    pub fn handle_scroll_event(&mut self, offset: ScrollOffset) -> Result<bool> {
        if self.scroll.is_programmatic() || !self.was_rendered {
            return Ok(false);
        }
        let clamped = self.clamp_offset(offset);
        self.scroll.set_offset(clamped);
        self.geometry.invalidate(Invalidation::Scroll);
        if clamped != offset {
            self.host.set_scroll_offset(clamped)?;
        }
        let offset = clamped;
        self.events.emit(&ListEvent::UserScroll(offset));
        self.apply_changes(false)?;
        self.scroll_update()?;
        self.events.emit(&ListEvent::Scroll(offset));
        Ok(true)
    }

    /// Refreshes the scroll decoration if it is active.
    pub fn scroll_update(&mut self) -> Result<()> {
        if self.scroll.decoration_state() == DecorationState::ScrollActive {
            let metrics = self.scroll_metrics();
            self.decoration.update(&metrics)?;
        }
        Ok(())
    }

    pub fn scroll_suppression(&self) -> ScrollSuppression {
        self.scroll.suppression()
    }

    pub fn decoration_state(&self) -> DecorationState {
        self.scroll.decoration_state()
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll.offset().top
    }

    pub fn scroll_left(&self) -> u32 {
        self.scroll.offset().left
    }

    fn programmatic_scroll(&mut self, target: ScrollOffset) -> Result<()> {
        let _token = self.scroll.begin_programmatic();
        let target = self.clamp_offset(target);
        debug!("programmatic scroll to {:?}", target);
        self.scroll.set_offset(target);
        self.geometry.invalidate(Invalidation::Scroll);
        // Before the first render the offset is handed over by initial_render.
        if self.was_rendered {
            self.host.set_scroll_offset(target)?;
            self.apply_changes(true)?;
            self.scroll_update()?;
        }
        self.events.emit(&ListEvent::Scroll(target));
        Ok(())
    }

    fn clamp_offset(&mut self, offset: ScrollOffset) -> ScrollOffset {
        let max_top = self.content_height().saturating_sub(self.scroll_height());
        let max_left = self.content_width().saturating_sub(self.scroll_width());
        ScrollOffset {
            top: offset.top.min(max_top),
            left: offset.left.min(max_left),
        }
    }
}
