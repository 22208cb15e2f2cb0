//! Virtualized list and grid rendering for scrollable containers.
//!
//! A [`VirtualList`] keeps only the items inside the viewport attached to a
//! [`Host`], so lists of many thousands of entries render with a bounded
//! number of live nodes. Items share one fixed size; when the content is
//! wider than an item the list lays them out as a fixed-column grid.

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod items;
pub mod list;
pub mod render;
pub mod scroll;
pub mod terminal;

pub use config::{ListConfig, ListConfigBuilder};
pub use error::{ListError, Result};
pub use event::{EventKind, ListEvent, ListenerId};
pub use geometry::{Measure, Position, ScrollOffset, Size};
pub use items::ItemId;
pub use list::VirtualList;
pub use render::{DecorationOptions, Host, ScrollDecoration, ScrollMetrics};
pub use scroll::{DecorationState, ScrollSuppression};
