use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, bail};
use crossterm::QueueableCommand;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::geometry::{Measure, Position, ScrollOffset, Size};
use crate::render::Host;
use crate::terminal::buffer::{TerminalBuffer, TerminalCommand};
use crate::terminal::scrollbar::TerminalScrollbar;

static NEXT_NODE: AtomicU64 = AtomicU64::new(0);

/// Screen area a list occupies, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// A labelled box. Clones share the label, so an update is visible to the
/// host without re-attaching.
#[derive(Debug, Clone)]
pub struct TerminalNode {
    key: u64,
    label: Rc<RefCell<String>>,
    background: Color,
    foreground: Color,
}

impl TerminalNode {
    pub fn new(label: impl Into<String>, (background, foreground): (Color, Color)) -> Self {
        Self {
            key: NEXT_NODE.fetch_add(1, Ordering::Relaxed),
            label: Rc::new(RefCell::new(label.into())),
            background,
            foreground,
        }
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        *self.label.borrow_mut() = label.into();
    }

    fn render(&self, size: Size) -> TerminalBuffer {
        let width = u16::try_from(size.width).unwrap_or(u16::MAX);
        let height = u16::try_from(size.height).unwrap_or(u16::MAX);
        let mut buffer = TerminalBuffer::new(width, height);
        // Last column and, for tall items, last row are left as a gutter.
        let body_width = width.saturating_sub(1).max(1);
        let body_rows = if height > 1 { height - 1 } else { height };
        for row in 0..body_rows {
            let text = if row == 0 { self.label() } else { String::new() };
            buffer
                .set_background(self.background)
                .set_foreground(self.foreground)
                .write_fitted(&format!(" {text}"), body_width)
                .set_background(Color::Reset)
                .set_foreground(Color::Reset)
                .write_fitted("", width - body_width.min(width))
                .newline();
        }
        buffer
    }
}

struct Placed {
    node: TerminalNode,
    position: Position,
    attached: bool,
}

/// Renders list nodes into a region of a terminal.
///
/// Content coordinates are cells: an item of `item_size` occupies that many
/// columns and rows, and the scroll offset shifts the whole content.
pub struct TerminalHost<W: Write> {
    out: W,
    region: Region,
    item_size: Size,
    scroll: ScrollOffset,
    mounted: bool,
    nodes: HashMap<u64, Placed>,
}

impl<W: Write> TerminalHost<W> {
    pub fn new(out: W, region: Region, item_size: Size) -> Self {
        Self {
            out,
            region,
            item_size,
            scroll: ScrollOffset::default(),
            mounted: false,
            nodes: HashMap::new(),
        }
    }

    /// Moves or resizes the list. Follow with `VirtualList::resized`.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn attached_count(&self) -> usize {
        self.nodes.values().filter(|placed| placed.attached).count()
    }

    pub fn is_attached(&self, node: &TerminalNode) -> bool {
        self.nodes
            .get(&node.key)
            .is_some_and(|placed| placed.attached)
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Paints every attached node, clipped to the region, and the scrollbar
    /// in the column just right of it.
    pub fn draw(&mut self, scrollbar: Option<&TerminalScrollbar>) -> Result<()> {
        let blank = " ".repeat(self.region.width as usize);
        for row in 0..self.region.height {
            self.out
                .queue(MoveTo(self.region.x, self.region.y + row))?
                .queue(ResetColor)?
                .queue(Print(&blank))?;
        }

        let mut visible: Vec<(Position, TerminalBuffer)> = self
            .nodes
            .values()
            .filter(|placed| placed.attached)
            .map(|placed| (placed.position, placed.node.render(self.item_size)))
            .collect();
        visible.sort_by_key(|(position, _)| (position.top, position.left));
        for (position, buffer) in &visible {
            self.composite(buffer, *position)?;
        }

        if let Some(column) = scrollbar.and_then(|bar| bar.render(self.region.height)) {
            let x = self.region.x + self.region.width;
            for (row, text) in column.rows().iter().enumerate().take(self.region.height as usize) {
                self.out
                    .queue(MoveTo(x, self.region.y + row as u16))?
                    .queue(SetForegroundColor(Color::DarkGrey))?
                    .queue(Print(text))?;
            }
        }

        self.out.queue(ResetColor)?;
        self.out.flush()?;
        debug!("drew {} nodes at {:?}", visible.len(), self.scroll);
        Ok(())
    }

    fn composite(&mut self, buffer: &TerminalBuffer, at: Position) -> Result<()> {
        let mut run = String::new();
        let mut run_at: Option<(u16, u16)> = None;
        let mut x = 0u32;
        let mut y = 0u32;

        for cmd in buffer.commands() {
            // Early exit if we've exceeded the node's own bounds
            if y >= u32::from(buffer.height()) {
                break;
            }

            match cmd {
                TerminalCommand::Print(ch) => {
                    match self.to_screen(at.left + x, at.top + y) {
                        Some(cell) => {
                            run_at.get_or_insert(cell);
                            run.push(*ch);
                        }
                        None => flush_run(&mut self.out, &mut run, &mut run_at)?,
                    }
                    x += ch.width().unwrap_or(0) as u32;
                }
                TerminalCommand::Newline => {
                    flush_run(&mut self.out, &mut run, &mut run_at)?;
                    x = 0;
                    y += 1;
                }
                TerminalCommand::SetForeground(color) => {
                    flush_run(&mut self.out, &mut run, &mut run_at)?;
                    self.out.queue(SetForegroundColor(*color))?;
                }
                TerminalCommand::SetBackground(color) => {
                    flush_run(&mut self.out, &mut run, &mut run_at)?;
                    self.out.queue(SetBackgroundColor(*color))?;
                }
            }
        }
        flush_run(&mut self.out, &mut run, &mut run_at)?;
        self.out.queue(ResetColor)?;
        Ok(())
    }

    /// Maps a content cell to a screen cell, `None` when scrolled out of view.
    fn to_screen(&self, x: u32, y: u32) -> Option<(u16, u16)> {
        let column = x.checked_sub(self.scroll.left)?;
        let row = y.checked_sub(self.scroll.top)?;
        if column >= u32::from(self.region.width) || row >= u32::from(self.region.height) {
            return None;
        }
        Some((self.region.x + column as u16, self.region.y + row as u16))
    }
}

fn flush_run<W: Write>(out: &mut W, run: &mut String, at: &mut Option<(u16, u16)>) -> Result<()> {
    if let Some((x, y)) = at.take() {
        out.queue(MoveTo(x, y))?.queue(Print(run.as_str()))?;
    }
    run.clear();
    Ok(())
}

impl<W: Write> Measure for TerminalHost<W> {
    fn measure_container(&self) -> Size {
        Size::new(u32::from(self.region.width), u32::from(self.region.height))
    }

    /// The content area spans the region once mounted.
    fn measure_first_child(&self) -> Option<u32> {
        self.mounted.then_some(u32::from(self.region.width))
    }
}

impl<W: Write> Host for TerminalHost<W> {
    type Node = TerminalNode;

    fn mount_content(&mut self, append_to: Option<&str>) -> Result<()> {
        debug!("mounting content (append_to={:?})", append_to);
        self.mounted = true;
        Ok(())
    }

    fn attach(&mut self, node: &TerminalNode) -> Result<()> {
        let placed = self.nodes.entry(node.key).or_insert_with(|| Placed {
            node: node.clone(),
            position: Position::default(),
            attached: false,
        });
        if placed.attached {
            bail!("node {} is already attached", node.key);
        }
        placed.attached = true;
        Ok(())
    }

    fn detach(&mut self, node: &TerminalNode) -> Result<()> {
        match self.nodes.remove(&node.key) {
            Some(placed) if placed.attached => Ok(()),
            _ => bail!("node {} is not attached", node.key),
        }
    }

    fn set_position(&mut self, node: &TerminalNode, position: Position) -> Result<()> {
        self.nodes
            .entry(node.key)
            .or_insert_with(|| Placed {
                node: node.clone(),
                position,
                attached: false,
            })
            .position = position;
        Ok(())
    }

    fn set_scroll_offset(&mut self, offset: ScrollOffset) -> Result<()> {
        self.scroll = offset;
        Ok(())
    }

    fn offset_top(&self, node: &TerminalNode) -> u32 {
        self.nodes
            .get(&node.key)
            .map_or(0, |placed| placed.position.top)
    }
}
