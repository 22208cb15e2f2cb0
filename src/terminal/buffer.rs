use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Debug, PartialEq)]
pub enum TerminalCommand {
    Print(char),
    Newline,
    SetForeground(Color),
    SetBackground(Color),
}

/// A virtual buffer for one rectangular node.
/// Nodes render into this instead of directly to the terminal.
#[derive(Clone, Debug)]
pub struct TerminalBuffer {
    buffer: Vec<TerminalCommand>,
    width: u16,
    height: u16,
}

impl TerminalBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Vec::new(),
            width,
            height,
        }
    }

    pub fn write(&mut self, text: &str) -> &mut Self {
        for ch in text.chars() {
            self.buffer.push(TerminalCommand::Print(ch));
        }
        self
    }

    /// Writes `text` cut or padded to exactly `width` display cells.
    pub fn write_fitted(&mut self, text: &str, width: u16) -> &mut Self {
        let width = width as usize;
        let mut used = 0;
        for ch in text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > width {
                break;
            }
            used += ch_width;
            self.buffer.push(TerminalCommand::Print(ch));
        }
        // Wide characters still occupy their cells; pad the remainder.
        for _ in used..width {
            self.buffer.push(TerminalCommand::Print(' '));
        }
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.buffer.push(TerminalCommand::Newline);
        self
    }

    pub fn set_foreground(&mut self, color: Color) -> &mut Self {
        self.buffer.push(TerminalCommand::SetForeground(color));
        self
    }

    pub fn set_background(&mut self, color: Color) -> &mut Self {
        self.buffer.push(TerminalCommand::SetBackground(color));
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn commands(&self) -> &[TerminalCommand] {
        &self.buffer
    }

    /// The text of each row, for inspection.
    pub fn rows(&self) -> Vec<String> {
        let mut rows = vec![String::new()];
        for cmd in &self.buffer {
            match cmd {
                TerminalCommand::Print(ch) => {
                    if let Some(row) = rows.last_mut() {
                        row.push(*ch);
                    }
                }
                TerminalCommand::Newline => rows.push(String::new()),
                _ => {}
            }
        }
        rows
    }
}
