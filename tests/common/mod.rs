#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Result, bail};
use virtualist::{
    DecorationOptions, Host, ListConfig, ListEvent, Measure, Position, ScrollDecoration,
    ScrollMetrics, ScrollOffset, Size, VirtualList,
};

/// A node as the recording host sees it. `serial` changes every time the
/// render function runs, so tests can tell re-renders from updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: u32,
    pub serial: u32,
    pub revision: u32,
}

/// In-memory host that records every call the list makes.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub container: Size,
    /// Overrides the measured content width; defaults to the container width.
    pub first_child: Option<u32>,
    pub mounted: Option<Option<String>>,
    pub attached: HashMap<u32, (Card, Position)>,
    pending: HashMap<u32, Position>,
    pub attach_calls: usize,
    pub detach_calls: usize,
    pub position_calls: usize,
    pub scroll_offsets: Vec<ScrollOffset>,
    pub content_sizes: Vec<Size>,
    pub fail_attach: bool,
    pub fail_scroll: bool,
}

impl RecordingHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            container: Size::new(width, height),
            ..Self::default()
        }
    }

    pub fn attached_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.attached.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn position_of(&self, id: u32) -> Option<Position> {
        self.attached.get(&id).map(|(_, position)| *position)
    }

    pub fn card(&self, id: u32) -> Option<&Card> {
        self.attached.get(&id).map(|(card, _)| card)
    }

    pub fn reset_counters(&mut self) {
        self.attach_calls = 0;
        self.detach_calls = 0;
        self.position_calls = 0;
        self.scroll_offsets.clear();
    }
}

impl Measure for RecordingHost {
    fn measure_container(&self) -> Size {
        self.container
    }

    fn measure_first_child(&self) -> Option<u32> {
        self.mounted
            .as_ref()
            .map(|_| self.first_child.unwrap_or(self.container.width))
    }
}

impl Host for RecordingHost {
    type Node = Card;

    fn mount_content(&mut self, append_to: Option<&str>) -> Result<()> {
        self.mounted = Some(append_to.map(str::to_owned));
        Ok(())
    }

    fn attach(&mut self, node: &Card) -> Result<()> {
        self.attach_calls += 1;
        if self.fail_attach {
            bail!("attach refused for {}", node.id);
        }
        if self.attached.contains_key(&node.id) {
            bail!("{} attached twice", node.id);
        }
        let position = self.pending.remove(&node.id).unwrap_or_default();
        self.attached.insert(node.id, (node.clone(), position));
        Ok(())
    }

    fn detach(&mut self, node: &Card) -> Result<()> {
        self.detach_calls += 1;
        match self.attached.remove(&node.id) {
            Some(_) => Ok(()),
            None => bail!("{} detached while not attached", node.id),
        }
    }

    fn set_position(&mut self, node: &Card, position: Position) -> Result<()> {
        self.position_calls += 1;
        match self.attached.get_mut(&node.id) {
            Some((_, at)) => *at = position,
            None => {
                self.pending.insert(node.id, position);
            }
        }
        Ok(())
    }

    fn set_content_size(&mut self, size: Size) -> Result<()> {
        self.content_sizes.push(size);
        Ok(())
    }

    fn set_scroll_offset(&mut self, offset: ScrollOffset) -> Result<()> {
        if self.fail_scroll {
            bail!("viewport refused offset {}", offset.top);
        }
        self.scroll_offsets.push(offset);
        Ok(())
    }

    fn offset_top(&self, node: &Card) -> u32 {
        self.position_of(node.id).map_or(0, |position| position.top)
    }
}

#[derive(Debug, Default)]
pub struct CountingDecoration {
    pub initialized: usize,
    pub updated: usize,
    pub destroyed: usize,
    pub options: DecorationOptions,
    pub last: Option<ScrollMetrics>,
}

impl ScrollDecoration for CountingDecoration {
    fn initialize(&mut self, options: &DecorationOptions, metrics: &ScrollMetrics) -> Result<()> {
        self.initialized += 1;
        self.options = options.clone();
        self.last = Some(*metrics);
        Ok(())
    }

    fn update(&mut self, metrics: &ScrollMetrics) -> Result<()> {
        self.updated += 1;
        self.last = Some(*metrics);
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.destroyed += 1;
        self.last = None;
        Ok(())
    }
}

pub type TestList = VirtualList<u32, RecordingHost, CountingDecoration>;

/// Revision counters read by the render and update functions.
pub type Revisions = Rc<RefCell<HashMap<u32, u32>>>;

pub struct Fixture {
    pub list: TestList,
    pub revisions: Revisions,
    pub renders: Rc<Cell<u32>>,
}

pub fn fixture(container: Size, item: Size, ids: impl IntoIterator<Item = u32>) -> Fixture {
    build(container, item, ids, false)
}

/// Like [`fixture`], with an update function that edits nodes in place.
pub fn fixture_with_update(
    container: Size,
    item: Size,
    ids: impl IntoIterator<Item = u32>,
) -> Fixture {
    build(container, item, ids, true)
}

fn build(container: Size, item: Size, ids: impl IntoIterator<Item = u32>, update: bool) -> Fixture {
    let revisions: Revisions = Rc::default();
    let renders = Rc::new(Cell::new(0));

    let render_revisions = revisions.clone();
    let render_count = renders.clone();
    let mut builder = ListConfig::builder()
        .item_width(item.width)
        .item_height(item.height)
        .items(ids)
        .decoration_option("theme", "dark")
        .item_render_function(move |id: &u32| {
            render_count.set(render_count.get() + 1);
            Ok(Card {
                id: *id,
                serial: render_count.get(),
                revision: render_revisions.borrow().get(id).copied().unwrap_or(0),
            })
        });
    if update {
        let update_revisions = revisions.clone();
        builder = builder.item_updated_function(move |id: &u32, card: &mut Card| {
            card.revision = update_revisions.borrow().get(id).copied().unwrap_or(0);
            Ok(())
        });
    }
    let config = builder.build().expect("valid config");
    let host = RecordingHost::new(container.width, container.height);
    Fixture {
        list: VirtualList::with_decoration(config, host, CountingDecoration::default()),
        revisions,
        renders,
    }
}

/// Collects every event the list emits.
pub fn record(list: &mut TestList) -> Rc<RefCell<Vec<ListEvent<u32>>>> {
    let events: Rc<RefCell<Vec<ListEvent<u32>>>> = Rc::default();
    let sink = events.clone();
    list.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// Ids the list currently has rendered, ascending.
pub fn rendered_ids(list: &TestList) -> Vec<u32> {
    let mut ids: Vec<u32> = list.rendered().ids().copied().collect();
    ids.sort_unstable();
    ids
}
