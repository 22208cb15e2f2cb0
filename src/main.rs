use std::{
    cell::RefCell,
    collections::HashMap,
    fs::OpenOptions,
    io::{Stdout, Write, stdout},
    rc::Rc,
};

use anyhow::Result;
use crossterm::{
    ExecutableCommand, QueueableCommand,
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthChar;
use virtualist::{
    Host, ListConfig, ListEvent, ScrollOffset, Size, VirtualList,
    terminal::{Palette, Region, TerminalHost, TerminalNode, TerminalScrollbar},
};

const ITEM_WIDTH: u32 = 24;
const ITEM_HEIGHT: u32 = 3;

type DemoList = VirtualList<u32, TerminalHost<Stdout>, TerminalScrollbar>;

fn main() -> Result<()> {
    let mut args = std::env::args();
    let _program_name = args.next();
    let count = match args.next() {
        Some(count) => count.parse::<u32>()?,
        None => 1000,
    };
    // Set up file logging (logs to virtualist.log)
    let log_file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open("virtualist.log")?;
    let (writer, _log_guard) = tracing_appender::non_blocking(log_file);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    info!("virtualist demo starting with {count} items");

    // Enter alternate screen buffer and enable raw mode
    terminal::enable_raw_mode()?;
    stdout()
        .execute(EnterAlternateScreen)?
        .execute(EnableMouseCapture)?
        .execute(Hide)?;

    let result = run(count);

    // Always restore terminal state, even if run() fails
    stdout()
        .execute(Show)?
        .execute(LeaveAlternateScreen)?
        .execute(DisableMouseCapture)?;
    terminal::disable_raw_mode()?;

    info!("virtualist demo shutting down");
    result
}

/// The list gets everything but the bottom row (status) and the rightmost
/// column (scrollbar).
fn region_for(width: u16, height: u16) -> Region {
    Region {
        x: 0,
        y: 0,
        width: width.saturating_sub(1),
        height: height.saturating_sub(1),
    }
}

fn label(id: u32, revision: u32) -> String {
    match revision {
        0 => format!("Item #{id}"),
        revision => format!("Item #{id} (rev {revision})"),
    }
}

fn run(count: u32) -> Result<()> {
    let (width, height) = terminal::size()?;
    let palette = Palette::detect();
    let revisions: Rc<RefCell<HashMap<u32, u32>>> = Rc::default();

    let render_revisions = revisions.clone();
    let update_revisions = revisions.clone();
    let config = ListConfig::builder()
        .item_width(ITEM_WIDTH)
        .item_height(ITEM_HEIGHT)
        .items(1..=count)
        .item_render_function(move |id: &u32| {
            let revision = render_revisions.borrow().get(id).copied().unwrap_or(0);
            Ok(TerminalNode::new(label(*id, revision), palette.swatch(*id as usize)))
        })
        .item_updated_function(move |id: &u32, node: &mut TerminalNode| {
            let revision = update_revisions.borrow().get(id).copied().unwrap_or(0);
            node.set_label(label(*id, revision));
            Ok(())
        })
        .build()?;

    let host = TerminalHost::new(
        stdout(),
        region_for(width, height),
        Size::new(ITEM_WIDTH, ITEM_HEIGHT),
    );
    let mut list = VirtualList::with_decoration(config, host, TerminalScrollbar::new());

    let status = Rc::new(RefCell::new(String::from("ready")));
    let last_event = status.clone();
    list.subscribe(move |event| {
        *last_event.borrow_mut() = match event {
            ListEvent::ItemAdded(id) => format!("added #{id}"),
            ListEvent::ItemRemoved(id) => format!("removed #{id}"),
            ListEvent::Resize(size) => format!("resized to {}x{}", size.width, size.height),
            ListEvent::UserScroll(offset) => format!("user scroll to {}", offset.top),
            ListEvent::Scroll(offset) => format!("scrolled to {}", offset.top),
        };
    });

    list.initial_render()?;
    let mut next_id = count + 1;

    loop {
        draw(&mut list, &status.borrow())?;

        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                let top = list.scroll_top();
                let page = list.scroll_height();
                match key_event.code {
                    KeyCode::Esc | KeyCode::Char('q') => break,
                    KeyCode::Down => list.scroll_to_y(top.saturating_add(1))?,
                    KeyCode::Up => list.scroll_to_y(top.saturating_sub(1))?,
                    KeyCode::PageDown => list.scroll_to_y(top.saturating_add(page))?,
                    KeyCode::PageUp => list.scroll_to_y(top.saturating_sub(page))?,
                    KeyCode::Home => list.scroll_to(Some(0), None)?,
                    KeyCode::End => list.scroll_to_y(u32::MAX)?,
                    KeyCode::Char('t') => {
                        list.scroll_to_item(&1)?;
                    }
                    KeyCode::Char('a') => {
                        list.add(next_id)?;
                        next_id += 1;
                    }
                    KeyCode::Char('d') => {
                        if let Some(id) = first_visible(&mut list) {
                            list.remove(&id)?;
                        }
                    }
                    KeyCode::Char('u') => {
                        if let Some(id) = first_visible(&mut list) {
                            *revisions.borrow_mut().entry(id).or_insert(0) += 1;
                            list.item_updated(&id)?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Mouse(mouse_event) => {
                let top = list.scroll_top();
                let target = match mouse_event.kind {
                    MouseEventKind::ScrollDown => Some(top.saturating_add(ITEM_HEIGHT)),
                    MouseEventKind::ScrollUp => Some(top.saturating_sub(ITEM_HEIGHT)),
                    _ => None,
                };
                if let Some(target) = target {
                    // The wheel moves the viewport first, then the list hears about it.
                    let offset = ScrollOffset::new(target, list.scroll_left());
                    list.host_mut().set_scroll_offset(offset)?;
                    list.handle_scroll_event(offset)?;
                }
            }
            Event::Resize(width, height) => {
                list.host_mut().set_region(region_for(width, height));
                list.resized()?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn first_visible(list: &mut DemoList) -> Option<u32> {
    let range = list.visible_range();
    list.items().get(range.start).copied()
}

fn draw(list: &mut DemoList, status: &str) -> Result<()> {
    let summary = format!(
        " {} items | {} rendered | rows {:?} | {:.0}% | {} ",
        list.len(),
        list.rendered().len(),
        list.visible_range(),
        list.scrolled_percent_y(),
        status
    );
    let (host, scrollbar) = list.host_and_decoration();
    host.draw(Some(scrollbar))?;

    let region = host.region();
    let out = host.writer_mut();
    out.queue(MoveTo(0, region.y + region.height))?
        .queue(SetBackgroundColor(Color::Black))?
        .queue(SetForegroundColor(Color::Yellow))?
        .queue(Print(pad_or_truncate(&summary, region.width + 1)))?
        .queue(ResetColor)?;
    out.flush()?;
    Ok(())
}

/// Cuts or pads `s` to exactly `width` display cells.
fn pad_or_truncate(s: &str, width: u16) -> String {
    let width = width as usize;
    let mut fitted = String::with_capacity(width);
    let mut used = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        used += ch_width;
        fitted.push(ch);
    }
    fitted.extend(std::iter::repeat_n(' ', width - used));
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_fits_display_width() {
        assert_eq!(pad_or_truncate("abc", 5), "abc  ");
        assert_eq!(pad_or_truncate("abcdef", 4), "abcd");
        assert_eq!(pad_or_truncate("日本語", 5), "日本 ");
    }
}
