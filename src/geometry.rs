//! Memoized viewport math.
//!
//! Every derived metric lives in its own slot with an explicit presence flag,
//! so a metric whose legitimate value is `0` stays cached. Mutations clear a
//! known set of slots plus everything derived from them.

use std::ops::Range;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Absolute placement of a node inside the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub top: u32,
    pub left: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOffset {
    pub top: u32,
    pub left: u32,
}

impl ScrollOffset {
    pub fn new(top: u32, left: u32) -> Self {
        Self { top, left }
    }
}

/// Geometry a cache reads on a miss.
pub trait Measure {
    /// Inner size of the scroll viewport.
    fn measure_container(&self) -> Size;

    /// Width of the first child of the container, `None` when there is none.
    fn measure_first_child(&self) -> Option<u32>;
}

/// Everything a derived metric can depend on, captured at the moment of access.
pub struct Source<'a> {
    pub measure: &'a dyn Measure,
    pub scroll: ScrollOffset,
    pub item_count: usize,
    pub item_size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    ScrollWidth,
    ScrollHeight,
    ContentWidth,
    ColumnsPerRow,
    ContentHeight,
    ScrollTop,
    ScrollLeft,
    ScrolledPercentX,
    ScrolledPercentY,
    IsAtTop,
    IsAtBottom,
    ItemsPerPage,
    VisibleFirst,
    VisibleLast,
}

impl Metric {
    /// Metrics computed from this one.
    fn dependents(self) -> &'static [Metric] {
        use Metric::*;
        match self {
            ScrollWidth => &[ScrolledPercentX],
            ScrollHeight => &[ScrolledPercentY, ItemsPerPage, IsAtBottom],
            ContentWidth => &[ColumnsPerRow],
            ColumnsPerRow => &[ContentHeight, ItemsPerPage, VisibleFirst, VisibleLast],
            ContentHeight => &[IsAtBottom],
            ScrollTop => &[ScrolledPercentY, IsAtTop, IsAtBottom, VisibleFirst, VisibleLast],
            ScrollLeft => &[ScrolledPercentX],
            ItemsPerPage => &[VisibleLast],
            ScrolledPercentX | ScrolledPercentY | IsAtTop | IsAtBottom | VisibleFirst
            | VisibleLast => &[],
        }
    }
}

/// What changed, mapped to the slots it dirties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Items were added or removed.
    Content,
    /// The scroll offset moved.
    Scroll,
    /// The container was resized; everything is recomputed.
    Resize,
}

impl Invalidation {
    fn roots(self) -> &'static [Metric] {
        use Metric::*;
        match self {
            Invalidation::Content => &[ContentWidth, ContentHeight, VisibleFirst, VisibleLast],
            Invalidation::Scroll => &[ScrollTop, ScrollLeft, VisibleFirst, VisibleLast],
            Invalidation::Resize => &[],
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct GeometryCache {
    scroll_width: Option<u32>,
    scroll_height: Option<u32>,
    content_width: Option<u32>,
    columns_per_row: Option<usize>,
    content_height: Option<u32>,
    scroll_top: Option<u32>,
    scroll_left: Option<u32>,
    scrolled_percent_x: Option<f64>,
    scrolled_percent_y: Option<f64>,
    is_at_top: Option<bool>,
    is_at_bottom: Option<bool>,
    items_per_page: Option<usize>,
    visible_first: Option<usize>,
    visible_last: Option<usize>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self, change: Invalidation) {
        if change == Invalidation::Resize {
            trace!("geometry: full clear");
            *self = Self::default();
            return;
        }
        for metric in change.roots() {
            self.clear(*metric);
        }
    }

    /// Clears `metric` and, transitively, everything derived from it.
    pub fn clear(&mut self, metric: Metric) {
        match metric {
            Metric::ScrollWidth => self.scroll_width = None,
            Metric::ScrollHeight => self.scroll_height = None,
            Metric::ContentWidth => self.content_width = None,
            Metric::ColumnsPerRow => self.columns_per_row = None,
            Metric::ContentHeight => self.content_height = None,
            Metric::ScrollTop => self.scroll_top = None,
            Metric::ScrollLeft => self.scroll_left = None,
            Metric::ScrolledPercentX => self.scrolled_percent_x = None,
            Metric::ScrolledPercentY => self.scrolled_percent_y = None,
            Metric::IsAtTop => self.is_at_top = None,
            Metric::IsAtBottom => self.is_at_bottom = None,
            Metric::ItemsPerPage => self.items_per_page = None,
            Metric::VisibleFirst => self.visible_first = None,
            Metric::VisibleLast => self.visible_last = None,
        }
        for dependent in metric.dependents() {
            self.clear(*dependent);
        }
    }

    pub fn is_cached(&self, metric: Metric) -> bool {
        match metric {
            Metric::ScrollWidth => self.scroll_width.is_some(),
            Metric::ScrollHeight => self.scroll_height.is_some(),
            Metric::ContentWidth => self.content_width.is_some(),
            Metric::ColumnsPerRow => self.columns_per_row.is_some(),
            Metric::ContentHeight => self.content_height.is_some(),
            Metric::ScrollTop => self.scroll_top.is_some(),
            Metric::ScrollLeft => self.scroll_left.is_some(),
            Metric::ScrolledPercentX => self.scrolled_percent_x.is_some(),
            Metric::ScrolledPercentY => self.scrolled_percent_y.is_some(),
            Metric::IsAtTop => self.is_at_top.is_some(),
            Metric::IsAtBottom => self.is_at_bottom.is_some(),
            Metric::ItemsPerPage => self.items_per_page.is_some(),
            Metric::VisibleFirst => self.visible_first.is_some(),
            Metric::VisibleLast => self.visible_last.is_some(),
        }
    }

    fn container(&mut self, src: &Source) -> Size {
        if let (Some(width), Some(height)) = (self.scroll_width, self.scroll_height) {
            return Size { width, height };
        }
        let size = src.measure.measure_container();
        self.scroll_width.get_or_insert(size.width);
        self.scroll_height.get_or_insert(size.height);
        Size {
            width: self.scroll_width.unwrap_or(size.width),
            height: self.scroll_height.unwrap_or(size.height),
        }
    }

    /// Viewport width.
    pub fn scroll_width(&mut self, src: &Source) -> u32 {
        self.container(src).width
    }

    /// Viewport height.
    pub fn scroll_height(&mut self, src: &Source) -> u32 {
        self.container(src).height
    }

    pub fn content_width(&mut self, src: &Source) -> u32 {
        if let Some(width) = self.content_width {
            return width;
        }
        // An empty or unmeasurable first child falls back to one item wide.
        let width = src
            .measure
            .measure_first_child()
            .filter(|width| *width > 0)
            .unwrap_or(src.item_size.width);
        self.content_width = Some(width);
        width
    }

    pub fn columns_per_row(&mut self, src: &Source) -> usize {
        if let Some(columns) = self.columns_per_row {
            return columns;
        }
        let content_width = self.content_width(src);
        let columns = columns_for(content_width, src.item_size.width);
        self.columns_per_row = Some(columns);
        columns
    }

    pub fn content_height(&mut self, src: &Source) -> u32 {
        if let Some(height) = self.content_height {
            return height;
        }
        let columns = self.columns_per_row(src);
        let rows = src.item_count.div_ceil(columns);
        let height = u32::try_from(rows)
            .unwrap_or(u32::MAX)
            .saturating_mul(src.item_size.height);
        self.content_height = Some(height);
        height
    }

    pub fn scroll_top(&mut self, src: &Source) -> u32 {
        *self.scroll_top.get_or_insert(src.scroll.top)
    }

    pub fn scroll_left(&mut self, src: &Source) -> u32 {
        *self.scroll_left.get_or_insert(src.scroll.left)
    }

    pub fn scrolled_percent_x(&mut self, src: &Source) -> f64 {
        if let Some(percent) = self.scrolled_percent_x {
            return percent;
        }
        let percent = percent_of(self.scroll_left(src), self.scroll_width(src));
        self.scrolled_percent_x = Some(percent);
        percent
    }

    pub fn scrolled_percent_y(&mut self, src: &Source) -> f64 {
        if let Some(percent) = self.scrolled_percent_y {
            return percent;
        }
        let percent = percent_of(self.scroll_top(src), self.scroll_height(src));
        self.scrolled_percent_y = Some(percent);
        percent
    }

    pub fn is_at_top(&mut self, src: &Source) -> bool {
        if let Some(at_top) = self.is_at_top {
            return at_top;
        }
        let at_top = self.scroll_top(src) == 0;
        self.is_at_top = Some(at_top);
        at_top
    }

    /// True once the bottom edge of the viewport reaches the end of the content.
    pub fn is_at_bottom(&mut self, src: &Source) -> bool {
        if let Some(at_bottom) = self.is_at_bottom {
            return at_bottom;
        }
        let bottom = self
            .scroll_top(src)
            .saturating_add(self.scroll_height(src));
        let at_bottom = bottom >= self.content_height(src);
        self.is_at_bottom = Some(at_bottom);
        at_bottom
    }

    pub fn items_per_page(&mut self, src: &Source) -> usize {
        if let Some(per_page) = self.items_per_page {
            return per_page;
        }
        let rows = self.scroll_height(src).div_ceil(src.item_size.height) as usize;
        let per_page = rows.saturating_mul(self.columns_per_row(src));
        self.items_per_page = Some(per_page);
        per_page
    }

    pub fn visible_first(&mut self, src: &Source) -> usize {
        if let Some(first) = self.visible_first {
            return first;
        }
        let row = (self.scroll_top(src) / src.item_size.height) as usize;
        let first = row
            .saturating_mul(self.columns_per_row(src))
            .min(src.item_count);
        self.visible_first = Some(first);
        first
    }

    pub fn visible_last(&mut self, src: &Source) -> usize {
        if let Some(last) = self.visible_last {
            return last;
        }
        let row = self.scroll_top(src).div_ceil(src.item_size.height) as usize;
        let last = row
            .saturating_mul(self.columns_per_row(src))
            .saturating_add(self.items_per_page(src))
            .min(src.item_count);
        self.visible_last = Some(last);
        last
    }

    /// Half-open `[first, last)` range of indices that should be attached.
    pub fn visible_range(&mut self, src: &Source) -> Range<usize> {
        let first = self.visible_first(src);
        let last = self.visible_last(src).max(first);
        first..last
    }
}

pub fn columns_for(content_width: u32, item_width: u32) -> usize {
    if item_width == 0 {
        return 1;
    }
    ((content_width / item_width) as usize).max(1)
}

/// Where the item at `index` sits in a grid of `columns` uniform cells.
pub fn position_of(index: usize, columns: usize, item_size: Size) -> Position {
    let columns = columns.max(1);
    let row = u32::try_from(index / columns).unwrap_or(u32::MAX);
    let column = (index % columns) as u32;
    Position {
        top: row.saturating_mul(item_size.height),
        left: column.saturating_mul(item_size.width),
    }
}

fn percent_of(offset: u32, extent: u32) -> f64 {
    if extent == 0 {
        return 0.0;
    }
    100.0 * f64::from(offset) / f64::from(extent)
}
