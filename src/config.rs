use std::fmt;

use anyhow::Result;

use crate::error::ListError;
use crate::geometry::Size;
use crate::items::{ItemId, ItemStore};
use crate::render::DecorationOptions;

/// Produces the node for an item entering the viewport.
pub type RenderFn<I, N> = Box<dyn FnMut(&I) -> Result<N>>;

/// Refreshes the node of an item that is already rendered.
pub type UpdateFn<I, N> = Box<dyn FnMut(&I, &mut N) -> Result<()>>;

/// Immutable list configuration. Build it with [`ListConfig::builder`].
pub struct ListConfig<I: ItemId, N> {
    item_size: Size,
    items: ItemStore<I>,
    render: RenderFn<I, N>,
    update: Option<UpdateFn<I, N>>,
    append_to: Option<String>,
    decoration_options: DecorationOptions,
}

impl<I: ItemId, N> fmt::Debug for ListConfig<I, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListConfig")
            .field("item_size", &self.item_size)
            .field("items", &self.items.len())
            .field("item_updated_function", &self.update.is_some())
            .field("append_to", &self.append_to)
            .field("decoration_options", &self.decoration_options)
            .finish()
    }
}

impl<I: ItemId, N> ListConfig<I, N> {
    pub fn builder() -> ListConfigBuilder<I, N> {
        ListConfigBuilder::default()
    }

    pub fn item_size(&self) -> Size {
        self.item_size
    }

    pub fn append_to(&self) -> Option<&str> {
        self.append_to.as_deref()
    }

    pub fn decoration_options(&self) -> &DecorationOptions {
        &self.decoration_options
    }

    /// Splits the configuration into the initial items and the callbacks the
    /// list keeps for its lifetime.
    pub(crate) fn into_parts(self) -> (ItemStore<I>, ListSettings<I, N>) {
        let settings = ListSettings {
            item_size: self.item_size,
            render: self.render,
            update: self.update,
            append_to: self.append_to,
            decoration_options: self.decoration_options,
        };
        (self.items, settings)
    }
}

/// The parts of a configuration that outlive construction.
pub(crate) struct ListSettings<I, N> {
    pub item_size: Size,
    pub render: RenderFn<I, N>,
    pub update: Option<UpdateFn<I, N>>,
    pub append_to: Option<String>,
    pub decoration_options: DecorationOptions,
}

pub struct ListConfigBuilder<I, N> {
    item_width: u32,
    item_height: u32,
    items: Vec<I>,
    render: Option<RenderFn<I, N>>,
    update: Option<UpdateFn<I, N>>,
    append_to: Option<String>,
    decoration_options: DecorationOptions,
}

impl<I, N> Default for ListConfigBuilder<I, N> {
    fn default() -> Self {
        Self {
            item_width: 0,
            item_height: 0,
            items: Vec::new(),
            render: None,
            update: None,
            append_to: None,
            decoration_options: DecorationOptions::new(),
        }
    }
}

impl<I: ItemId, N> ListConfigBuilder<I, N> {
    /// Fixed outer width of every item, margins included.
    pub fn item_width(mut self, width: u32) -> Self {
        self.item_width = width;
        self
    }

    /// Fixed outer height of every item, margins included.
    pub fn item_height(mut self, height: u32) -> Self {
        self.item_height = height;
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = I>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    pub fn item_render_function(mut self, render: impl FnMut(&I) -> Result<N> + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    pub fn item_updated_function(
        mut self,
        update: impl FnMut(&I, &mut N) -> Result<()> + 'static,
    ) -> Self {
        self.update = Some(Box::new(update));
        self
    }

    /// Named attach point inside the container for the item nodes.
    pub fn append_to(mut self, target: impl Into<String>) -> Self {
        self.append_to = Some(target.into());
        self
    }

    pub fn decoration_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.decoration_options.insert(key.into(), value.into());
        self
    }

    pub fn decoration_options(mut self, options: DecorationOptions) -> Self {
        self.decoration_options = options;
        self
    }

    pub fn build(self) -> crate::Result<ListConfig<I, N>> {
        let render = self.render.ok_or(ListError::MissingRenderFunction)?;
        if self.item_width == 0 || self.item_height == 0 {
            return Err(ListError::InvalidItemSize {
                width: self.item_width,
                height: self.item_height,
            });
        }
        Ok(ListConfig {
            item_size: Size::new(self.item_width, self.item_height),
            items: ItemStore::from_ids(self.items),
            render,
            update: self.update,
            append_to: self.append_to,
            decoration_options: self.decoration_options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_render_function_fails_fast() {
        let result = ListConfig::<u32, ()>::builder()
            .item_width(10)
            .item_height(10)
            .build();
        assert!(matches!(result, Err(ListError::MissingRenderFunction)));
    }

    #[test]
    fn zero_sized_items_are_rejected() {
        let result = ListConfig::<u32, ()>::builder()
            .item_width(10)
            .item_render_function(|_| Ok(()))
            .build();
        assert!(matches!(
            result,
            Err(ListError::InvalidItemSize {
                width: 10,
                height: 0
            })
        ));
    }

    #[test]
    fn duplicate_initial_items_are_dropped() {
        let config = ListConfig::<u32, ()>::builder()
            .item_width(10)
            .item_height(5)
            .items([1, 2, 1, 3])
            .item_render_function(|_| Ok(()))
            .append_to("tbody")
            .decoration_option("suppressScrollX", "true")
            .build()
            .unwrap();

        assert_eq!(config.item_size(), Size::new(10, 5));
        assert_eq!(config.append_to(), Some("tbody"));
        assert_eq!(
            config.decoration_options().get("suppressScrollX").map(String::as_str),
            Some("true")
        );
        let (items, _) = config.into_parts();
        assert_eq!(items.as_slice(), &[1, 2, 3]);
    }
}
