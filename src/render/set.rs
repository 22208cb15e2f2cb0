use std::collections::HashMap;

use crate::geometry::Position;
use crate::items::ItemId;

/// A node currently attached to the host, with the position it was last given.
#[derive(Debug, Clone)]
pub struct RenderedItem<N> {
    pub node: N,
    pub position: Position,
}

/// Identifiers currently attached to the host.
#[derive(Debug)]
pub struct RenderSet<I: ItemId, N> {
    rendered: HashMap<I, RenderedItem<N>>,
}

impl<I: ItemId, N> Default for RenderSet<I, N> {
    fn default() -> Self {
        Self {
            rendered: HashMap::new(),
        }
    }
}

impl<I: ItemId, N> RenderSet<I, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: I, node: N, position: Position) -> Option<RenderedItem<N>> {
        self.rendered.insert(id, RenderedItem { node, position })
    }

    pub fn remove(&mut self, id: &I) -> Option<RenderedItem<N>> {
        self.rendered.remove(id)
    }

    pub fn get(&self, id: &I) -> Option<&RenderedItem<N>> {
        self.rendered.get(id)
    }

    pub fn get_mut(&mut self, id: &I) -> Option<&mut RenderedItem<N>> {
        self.rendered.get_mut(id)
    }

    pub fn contains(&self, id: &I) -> bool {
        self.rendered.contains_key(id)
    }

    pub fn position(&self, id: &I) -> Option<Position> {
        self.rendered.get(id).map(|item| item.position)
    }

    pub fn ids(&self) -> impl Iterator<Item = &I> {
        self.rendered.keys()
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_remove() {
        let mut set: RenderSet<&str, u8> = RenderSet::new();
        let at = Position { top: 90, left: 0 };
        assert!(set.insert("a", 1, at).is_none());
        assert!(set.contains(&"a"));
        assert_eq!(set.position(&"a"), Some(at));

        if let Some(item) = set.get_mut(&"a") {
            item.position.top = 180;
        }
        assert_eq!(set.position(&"a").map(|p| p.top), Some(180));

        assert_eq!(set.remove(&"a").map(|item| item.node), Some(1));
        assert!(set.is_empty());
    }
}
