use std::ops::Range;

use tracing::{debug, info};

use crate::config::{ListConfig, ListSettings};
use crate::error::{ListError, Result};
use crate::event::{EventBus, EventKind, ListEvent, ListenerId};
use crate::geometry::{GeometryCache, Invalidation, Position, ScrollOffset, Size, Source};
use crate::items::{ItemId, ItemStore};
use crate::render::reconcile::GridLayout;
use crate::render::{
    Host, ReconcileStats, ReconciliationEngine, RenderSet, ScrollDecoration, ScrollMetrics,
};
use crate::scroll::{DecorationState, DecorationTransition, ScrollController};

/// A scrollable list or fixed-column grid that keeps only the items inside
/// the viewport attached to its host.
///
/// Every operation runs to completion before returning: geometry is brought
/// up to date, the visible range is reconciled against the host and events
/// are delivered, in that order.
pub struct VirtualList<I: ItemId, H: Host, D: ScrollDecoration = ()> {
    pub(crate) settings: ListSettings<I, H::Node>,
    pub(crate) items: ItemStore<I>,
    pub(crate) geometry: GeometryCache,
    pub(crate) engine: ReconciliationEngine<I, H::Node>,
    pub(crate) scroll: ScrollController,
    pub(crate) events: EventBus<I>,
    pub(crate) host: H,
    pub(crate) decoration: D,
    pub(crate) was_rendered: bool,
}

impl<I: ItemId, H: Host> VirtualList<I, H, ()> {
    pub fn new(config: ListConfig<I, H::Node>, host: H) -> Self {
        Self::with_decoration(config, host, ())
    }
}

impl<I, H, D> VirtualList<I, H, D>
where
    I: ItemId,
    H: Host,
    D: ScrollDecoration,
{
    pub fn with_decoration(config: ListConfig<I, H::Node>, host: H, decoration: D) -> Self {
        let (items, settings) = config.into_parts();
        Self {
            settings,
            items,
            geometry: GeometryCache::new(),
            engine: ReconciliationEngine::new(),
            scroll: ScrollController::new(),
            events: EventBus::new(),
            host,
            decoration,
            was_rendered: false,
        }
    }

    /// Mounts the content area and renders the first page. Items may be
    /// added before this is called; nothing touches the host until then.
    pub fn initial_render(&mut self) -> Result<()> {
        if self.was_rendered {
            return Err(ListError::AlreadyRendered);
        }
        self.was_rendered = true;
        self.host.mount_content(self.settings.append_to.as_deref())?;
        self.content_updated()?;
        let offset = self.scroll.offset();
        if offset != ScrollOffset::default() {
            self.host.set_scroll_offset(offset)?;
        }
        let stats = self.apply_changes(false)?;
        self.evaluate_decoration()?;
        self.scroll_update()?;
        info!(
            "initial render: {} items, {} attached at {:?}",
            self.items.len(),
            stats.attached,
            offset
        );
        Ok(())
    }

    pub fn add(&mut self, id: I) -> Result<bool> {
        Ok(self.batch_add([id])? == 1)
    }

    /// Appends every new id, then reconciles once. Returns how many were added.
    pub fn batch_add(&mut self, ids: impl IntoIterator<Item = I>) -> Result<usize> {
        let added = self.items.batch_add(ids);
        if added.is_empty() {
            return Ok(0);
        }
        if self.was_rendered {
            self.content_updated()?;
            self.apply_changes(false)?;
            self.evaluate_decoration()?;
        }
        for id in &added {
            self.events.emit(&ListEvent::ItemAdded(id.clone()));
        }
        Ok(added.len())
    }

    /// Removing an unknown id is a no-op and returns false.
    pub fn remove(&mut self, id: &I) -> Result<bool> {
        Ok(self.batch_remove([id])? == 1)
    }

    /// Removes every known id, then reconciles once. Every later item shifts
    /// up, so rendered nodes are repositioned. Returns how many were removed.
    pub fn batch_remove<'a>(&mut self, ids: impl IntoIterator<Item = &'a I>) -> Result<usize>
    where
        I: 'a,
    {
        let doomed: Vec<I> = ids
            .into_iter()
            .filter(|id| self.items.has(id))
            .cloned()
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }
        for id in &doomed {
            self.engine.detach(id, &mut self.host)?;
        }
        let removed = self.items.batch_remove(&doomed);
        if self.was_rendered {
            self.content_updated()?;
            self.apply_changes(true)?;
            self.evaluate_decoration()?;
        }
        for id in &removed {
            self.events.emit(&ListEvent::ItemRemoved(id.clone()));
        }
        Ok(removed.len())
    }

    /// Refreshes the node of `id` if it is rendered, through the configured
    /// update function or by rendering a fresh node in its place. Items
    /// outside the viewport pick up changes when they next render.
    pub fn item_updated(&mut self, id: &I) -> Result<bool> {
        if !self.engine.rendered().contains(id) {
            return Ok(false);
        }
        if let Some(update) = self.settings.update.as_mut() {
            if let Some(item) = self.engine.item_mut(id) {
                update(id, &mut item.node)?;
            }
        } else {
            let node = (self.settings.render)(id)?;
            self.engine.replace_node(id, node, &mut self.host)?;
        }
        debug!("refreshed rendered item {:?}", id);
        Ok(true)
    }

    /// Re-measures everything after the container changed size.
    pub fn resized(&mut self) -> Result<()> {
        self.geometry.invalidate(Invalidation::Resize);
        if self.was_rendered {
            self.content_updated()?;
            self.apply_changes(true)?;
            self.evaluate_decoration()?;
        }
        let size = Size::new(self.scroll_width(), self.scroll_height());
        self.events.emit(&ListEvent::Resize(size));
        Ok(())
    }

    /// Detaches every node, forgets every item and tears down the scroll
    /// decoration. The list may be rendered again afterwards.
    pub fn destroy(&mut self) -> Result<()> {
        self.engine.clear(&mut self.host)?;
        self.items.clear();
        if self.scroll.decoration_state() == DecorationState::ScrollActive {
            self.decoration.destroy()?;
        }
        self.scroll.reset_decoration();
        self.geometry.invalidate(Invalidation::Resize);
        self.was_rendered = false;
        info!("list destroyed");
        Ok(())
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ListEvent<I>) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn subscribe_to(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&ListEvent<I>) + 'static,
    ) -> ListenerId {
        self.events.subscribe_to(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn has(&self, id: &I) -> bool {
        self.items.has(id)
    }

    pub fn index_of(&self, id: &I) -> Option<usize> {
        self.items.index_of(id)
    }

    pub fn is_rendered(&self, id: &I) -> bool {
        self.engine.rendered().contains(id)
    }

    pub fn rendered_position(&self, id: &I) -> Option<Position> {
        self.engine.rendered().position(id)
    }

    pub fn rendered(&self) -> &RenderSet<I, H::Node> {
        self.engine.rendered()
    }

    pub fn items(&self) -> &[I] {
        self.items.as_slice()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn was_rendered(&self) -> bool {
        self.was_rendered
    }

    pub fn item_size(&self) -> Size {
        self.settings.item_size
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to change its size before `resized`.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn decoration(&self) -> &D {
        &self.decoration
    }

    /// The host and the decoration together, for hosts that paint both.
    pub fn host_and_decoration(&mut self) -> (&mut H, &D) {
        (&mut self.host, &self.decoration)
    }

    /// Viewport width.
    pub fn scroll_width(&mut self) -> u32 {
        self.measure(|geometry, src| geometry.scroll_width(src))
    }

    /// Viewport height.
    pub fn scroll_height(&mut self) -> u32 {
        self.measure(|geometry, src| geometry.scroll_height(src))
    }

    pub fn content_width(&mut self) -> u32 {
        self.measure(|geometry, src| geometry.content_width(src))
    }

    pub fn content_height(&mut self) -> u32 {
        self.measure(|geometry, src| geometry.content_height(src))
    }

    pub fn columns_per_row(&mut self) -> usize {
        self.measure(|geometry, src| geometry.columns_per_row(src))
    }

    pub fn items_per_page(&mut self) -> usize {
        self.measure(|geometry, src| geometry.items_per_page(src))
    }

    pub fn visible_range(&mut self) -> Range<usize> {
        self.measure(|geometry, src| geometry.visible_range(src))
    }

    pub fn is_at_top(&mut self) -> bool {
        self.measure(|geometry, src| geometry.is_at_top(src))
    }

    pub fn is_at_bottom(&mut self) -> bool {
        self.measure(|geometry, src| geometry.is_at_bottom(src))
    }

    pub fn scrolled_percent_x(&mut self) -> f64 {
        self.measure(|geometry, src| geometry.scrolled_percent_x(src))
    }

    pub fn scrolled_percent_y(&mut self) -> f64 {
        self.measure(|geometry, src| geometry.scrolled_percent_y(src))
    }

    pub(crate) fn scroll_metrics(&mut self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.scroll.offset(),
            viewport: Size::new(self.scroll_width(), self.scroll_height()),
            content: Size::new(self.content_width(), self.content_height()),
        }
    }

    fn measure<T>(&mut self, read: impl FnOnce(&mut GeometryCache, &Source) -> T) -> T {
        let src = Source {
            measure: &self.host,
            scroll: self.scroll.offset(),
            item_count: self.items.len(),
            item_size: self.settings.item_size,
        };
        read(&mut self.geometry, &src)
    }

    /// Publishes the new content extent and pulls the viewport back if the
    /// content shrank out from under it.
    fn content_updated(&mut self) -> Result<()> {
        self.geometry.invalidate(Invalidation::Content);
        let content = Size::new(self.content_width(), self.content_height());
        self.host.set_content_size(content)?;

        let max_top = content.height.saturating_sub(self.scroll_height());
        if self.scroll.offset().top > max_top {
            self.scroll_to_y(max_top)?;
        }
        Ok(())
    }

    /// Reconciles the render set against the current visible range.
    pub(crate) fn apply_changes(&mut self, reposition: bool) -> Result<ReconcileStats> {
        let range = self.visible_range();
        let layout = GridLayout {
            columns: self.columns_per_row(),
            item_size: self.settings.item_size,
        };
        let stats = self.engine.apply_visible_range(
            range,
            &self.items,
            layout,
            &mut self.host,
            &mut *self.settings.render,
            reposition,
        )?;
        Ok(stats)
    }

    /// Tears the scroll decoration down when everything fits, brings it back
    /// when it no longer does.
    fn evaluate_decoration(&mut self) -> Result<()> {
        let range = self.visible_range();
        let metrics = self.scroll_metrics();
        let fits = range.start == 0
            && range.end == self.items.len()
            && metrics.content.width <= metrics.viewport.width
            && metrics.content.height <= metrics.viewport.height;
        match self.scroll.next_decoration(fits) {
            Some(DecorationTransition::Initialize) => {
                self.decoration
                    .initialize(&self.settings.decoration_options, &metrics)?;
            }
            Some(DecorationTransition::Destroy) => self.decoration.destroy()?,
            None => {}
        }
        Ok(())
    }
}
