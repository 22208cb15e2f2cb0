//! Property-based invariant tests for the virtual list.
//!
//! 1. The visible range stays inside the item store and spans at most one
//!    page plus one partial row.
//! 2. After any sequence of operations the rendered set is exactly the
//!    visible slice of the store, each node at its grid slot.
//! 3. Repeating a scroll or a resize with nothing changed touches no node.
//! 4. Adding a batch and removing it again restores the store.

mod common;

use std::collections::HashSet;

use common::{TestList, fixture};
use proptest::prelude::*;
use virtualist::geometry::position_of;
use virtualist::{ScrollOffset, Size};

#[derive(Debug, Clone)]
enum Op {
    Add(u32),
    Remove(usize),
    ScrollTo(u32),
    UserScroll(u32),
    Resize(u32, u32),
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn size_strategy(max: u32) -> impl Strategy<Value = Size> {
    (1u32..=max, 1u32..=max).prop_map(|(w, h)| Size::new(w, h))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1000u32..1100).prop_map(Op::Add),
        any::<usize>().prop_map(Op::Remove),
        (0u32..6000).prop_map(Op::ScrollTo),
        (0u32..6000).prop_map(Op::UserScroll),
        (1u32..=400, 1u32..=400).prop_map(|(w, h)| Op::Resize(w, h)),
    ]
}

fn apply(list: &mut TestList, op: &Op) {
    match *op {
        Op::Add(id) => {
            list.add(id).unwrap();
        }
        Op::Remove(pick) => {
            if !list.is_empty() {
                let id = list.items()[pick % list.len()];
                list.remove(&id).unwrap();
            }
        }
        Op::ScrollTo(y) => list.scroll_to_y(y).unwrap(),
        Op::UserScroll(y) => {
            list.handle_scroll_event(ScrollOffset::new(y, 0)).unwrap();
        }
        Op::Resize(w, h) => {
            list.host_mut().container = Size::new(w, h);
            list.resized().unwrap();
        }
    }
}

fn check_rendered_matches_visible(list: &mut TestList) -> Result<(), TestCaseError> {
    let range = list.visible_range();
    let columns = list.columns_per_row();
    let item = list.item_size();

    let expected: HashSet<u32> = list.items()[range.clone()].iter().copied().collect();
    let rendered: HashSet<u32> = list.rendered().ids().copied().collect();
    prop_assert_eq!(&rendered, &expected, "rendered set differs for range {:?}", range);

    let attached: HashSet<u32> = list.host().attached.keys().copied().collect();
    prop_assert_eq!(&attached, &expected, "host attachments drifted");

    for (index, id) in list.items()[range.clone()].iter().enumerate() {
        let slot = position_of(range.start + index, columns, item);
        prop_assert_eq!(list.rendered_position(id), Some(slot), "item {} misplaced", id);
        prop_assert_eq!(list.host().position_of(*id), Some(slot));
    }

    let max_top = list.content_height().saturating_sub(list.scroll_height());
    prop_assert!(list.scroll_top() <= max_top, "scrolled past the content");
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Visible range bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn visible_range_bounded(
        container in size_strategy(800),
        item in size_strategy(200),
        count in 0u32..300,
        top in 0u32..20_000,
    ) {
        let mut fx = fixture(container, item, 0..count);
        fx.list.initial_render().unwrap();
        fx.list.handle_scroll_event(ScrollOffset::new(top, 0)).unwrap();

        let range = fx.list.visible_range();
        let per_page = fx.list.items_per_page();
        let columns = fx.list.columns_per_row();
        prop_assert!(range.start <= range.end);
        prop_assert!(range.end <= count as usize);
        prop_assert!(
            range.len() <= per_page + columns,
            "range {:?} wider than a page ({}) plus a row ({})",
            range, per_page, columns
        );
        prop_assert!(columns >= 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Rendered set tracks the visible slice
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn rendered_set_tracks_visible_slice(
        container in size_strategy(400),
        item in size_strategy(100),
        count in 0u32..60,
        ops in prop::collection::vec(op_strategy(), 0..24),
    ) {
        let mut fx = fixture(container, item, 0..count);
        fx.list.initial_render().unwrap();
        check_rendered_matches_visible(&mut fx.list)?;

        for op in &ops {
            apply(&mut fx.list, op);
            check_rendered_matches_visible(&mut fx.list)?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_scroll_and_resize_touch_nothing(
        container in size_strategy(400),
        item in size_strategy(100),
        count in 0u32..60,
        top in 0u32..6000,
    ) {
        let mut fx = fixture(container, item, 0..count);
        fx.list.initial_render().unwrap();
        fx.list.scroll_to_y(top).unwrap();
        let settled = fx.list.scroll_top();

        fx.list.host_mut().reset_counters();
        fx.list.scroll_to_y(settled).unwrap();
        fx.list.resized().unwrap();
        fx.list.resized().unwrap();

        let host = fx.list.host();
        prop_assert_eq!(host.attach_calls, 0);
        prop_assert_eq!(host.detach_calls, 0);
        prop_assert_eq!(host.position_calls, 0);
        prop_assert!(host.scroll_offsets.is_empty());
        prop_assert_eq!(fx.list.scroll_top(), settled);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Batch add then remove restores the store
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn batch_round_trip(
        container in size_strategy(400),
        item in size_strategy(100),
        count in 0u32..60,
        extra in prop::collection::vec(1000u32..1200, 0..40),
        top in 0u32..6000,
    ) {
        let mut fx = fixture(container, item, 0..count);
        fx.list.initial_render().unwrap();
        fx.list.scroll_to_y(top).unwrap();
        let before: Vec<u32> = fx.list.items().to_vec();

        let unique: HashSet<u32> = extra.iter().copied().collect();
        prop_assert_eq!(fx.list.batch_add(extra.iter().copied()).unwrap(), unique.len());
        prop_assert_eq!(fx.list.batch_remove(&extra).unwrap(), unique.len());

        prop_assert_eq!(fx.list.items(), before.as_slice());
        check_rendered_matches_visible(&mut fx.list)?;
    }
}
