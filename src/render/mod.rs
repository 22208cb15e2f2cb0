pub mod host;
pub mod reconcile;
pub mod set;

pub use host::{DecorationOptions, Host, ScrollDecoration, ScrollMetrics};
pub use reconcile::{ReconcileStats, ReconciliationEngine};
pub use set::{RenderSet, RenderedItem};
