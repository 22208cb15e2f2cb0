use crossterm::style::Color;
use supports_color::Stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLevel {
    /// No color support
    None,
    /// 16 basic colors
    Color16,
    /// 256 ANSI colors
    Color256,
    /// True color (24-bit RGB)
    TrueColor,
}

/// Detect the level of color support on stdout
pub fn color_level() -> ColorLevel {
    match supports_color::on(Stream::Stdout) {
        Some(level) => match level.has_16m {
            true => ColorLevel::TrueColor,
            false => match level.has_256 {
                true => ColorLevel::Color256,
                false => ColorLevel::Color16,
            },
        },
        None => ColorLevel::None,
    }
}

/// Background/foreground pairs items cycle through.
#[derive(Debug, Clone)]
pub struct Palette {
    swatches: Vec<(Color, Color)>,
}

impl Palette {
    pub fn for_level(level: ColorLevel) -> Self {
        let swatches = match level {
            ColorLevel::TrueColor => vec![
                (Color::Rgb { r: 38, g: 70, b: 83 }, Color::White),
                (Color::Rgb { r: 42, g: 157, b: 143 }, Color::Black),
                (Color::Rgb { r: 233, g: 196, b: 106 }, Color::Black),
                (Color::Rgb { r: 231, g: 111, b: 81 }, Color::Black),
            ],
            ColorLevel::Color256 => vec![
                (Color::AnsiValue(24), Color::White),
                (Color::AnsiValue(37), Color::Black),
                (Color::AnsiValue(179), Color::Black),
                (Color::AnsiValue(209), Color::Black),
            ],
            ColorLevel::Color16 => vec![
                (Color::DarkBlue, Color::White),
                (Color::DarkCyan, Color::Black),
                (Color::DarkYellow, Color::Black),
                (Color::DarkRed, Color::White),
            ],
            ColorLevel::None => vec![(Color::Reset, Color::Reset)],
        };
        Self { swatches }
    }

    pub fn detect() -> Self {
        Self::for_level(color_level())
    }

    /// (background, foreground) for the item with this sequence number.
    pub fn swatch(&self, n: usize) -> (Color, Color) {
        self.swatches
            .get(n % self.swatches.len().max(1))
            .copied()
            .unwrap_or((Color::Reset, Color::Reset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monochrome_palette_resets() {
        let palette = Palette::for_level(ColorLevel::None);
        assert_eq!(palette.swatch(7), (Color::Reset, Color::Reset));
    }

    #[test]
    fn swatches_cycle() {
        let palette = Palette::for_level(ColorLevel::Color16);
        assert_eq!(palette.swatch(0), palette.swatch(4));
        assert_ne!(palette.swatch(0), palette.swatch(1));
    }
}
