use std::collections::HashSet;
use std::ops::Range;

use anyhow::Result;
use tracing::debug;

use crate::geometry::{Size, position_of};
use crate::items::{ItemId, ItemStore};
use crate::render::host::Host;
use crate::render::set::{RenderSet, RenderedItem};

/// Grid shape used to place nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub item_size: Size,
}

/// Host calls made by one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    pub attached: usize,
    pub detached: usize,
    pub repositioned: usize,
}

impl ReconcileStats {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Sole writer of the render set and of the host's attached nodes.
#[derive(Debug)]
pub struct ReconciliationEngine<I: ItemId, N> {
    rendered: RenderSet<I, N>,
}

impl<I: ItemId, N> Default for ReconciliationEngine<I, N> {
    fn default() -> Self {
        Self {
            rendered: RenderSet::new(),
        }
    }
}

impl<I: ItemId, N> ReconciliationEngine<I, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> &RenderSet<I, N> {
        &self.rendered
    }

    /// Makes the render set exactly `items[range]`, each node at its grid slot.
    ///
    /// Costs O(rendered + visible). Already rendered items keep their node and
    /// are only moved when `reposition` is set. A host or render failure
    /// aborts the pass and leaves the set partially updated.
    pub fn apply_visible_range<H>(
        &mut self,
        range: Range<usize>,
        items: &ItemStore<I>,
        layout: GridLayout,
        host: &mut H,
        render: &mut dyn FnMut(&I) -> Result<N>,
        reposition: bool,
    ) -> Result<ReconcileStats>
    where
        H: Host<Node = N> + ?Sized,
    {
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        let visible_ids = &items.as_slice()[start..end];
        let mut stats = ReconcileStats::default();

        let visible: HashSet<&I> = visible_ids.iter().collect();
        let stale: Vec<I> = self
            .rendered
            .ids()
            .filter(|id| !visible.contains(id))
            .cloned()
            .collect();
        for id in stale {
            if self.detach(&id, host)? {
                stats.detached += 1;
            }
        }

        for (offset, id) in visible_ids.iter().enumerate() {
            let position = position_of(start + offset, layout.columns, layout.item_size);
            match self.rendered.get_mut(id) {
                Some(item) => {
                    if reposition && item.position != position {
                        host.set_position(&item.node, position)?;
                        item.position = position;
                        stats.repositioned += 1;
                    }
                }
                None => {
                    let node = render(id)?;
                    host.set_position(&node, position)?;
                    host.attach(&node)?;
                    self.rendered.insert(id.clone(), node, position);
                    stats.attached += 1;
                }
            }
        }

        debug!(
            "reconciled {}..{}: +{} -{} ~{} ({} rendered)",
            start,
            end,
            stats.attached,
            stats.detached,
            stats.repositioned,
            self.rendered.len()
        );
        Ok(stats)
    }

    /// Detaches `id` if it is rendered. The entry is dropped only once the
    /// host has let go of the node.
    pub fn detach<H>(&mut self, id: &I, host: &mut H) -> Result<bool>
    where
        H: Host<Node = N> + ?Sized,
    {
        let Some(item) = self.rendered.get(id) else {
            return Ok(false);
        };
        host.detach(&item.node)?;
        self.rendered.remove(id);
        Ok(true)
    }

    /// Swaps the node of a rendered item for `node`, keeping its position.
    pub fn replace_node<H>(&mut self, id: &I, node: N, host: &mut H) -> Result<bool>
    where
        H: Host<Node = N> + ?Sized,
    {
        let Some(position) = self.rendered.position(id) else {
            return Ok(false);
        };
        self.detach(id, host)?;
        host.set_position(&node, position)?;
        host.attach(&node)?;
        self.rendered.insert(id.clone(), node, position);
        Ok(true)
    }

    pub fn item_mut(&mut self, id: &I) -> Option<&mut RenderedItem<N>> {
        self.rendered.get_mut(id)
    }

    /// Detaches every rendered node.
    pub fn clear<H>(&mut self, host: &mut H) -> Result<usize>
    where
        H: Host<Node = N> + ?Sized,
    {
        let ids: Vec<I> = self.rendered.ids().cloned().collect();
        let mut detached = 0;
        for id in ids {
            if self.detach(&id, host)? {
                detached += 1;
            }
        }
        Ok(detached)
    }
}
