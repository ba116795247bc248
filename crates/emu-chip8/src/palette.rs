//! Display color themes.
//!
//! A theme is a background/foreground pair; the framebuffer itself is
//! 1-bit and the frontend applies the colors at present time.

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A background/foreground color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Rgb,
    pub foreground: Rgb,
}

impl Theme {
    const fn new(background: Rgb, foreground: Rgb) -> Self {
        Self {
            background,
            foreground,
        }
    }

    /// Look up a theme by index. Out-of-range indices silently fall
    /// back to the default theme (white on black).
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        THEMES.get(index).copied().unwrap_or(THEMES[0])
    }
}

const BLACK: Rgb = Rgb::new(0, 0, 0);
const WHITE: Rgb = Rgb::new(255, 255, 255);

/// The selectable theme table. Index 0 is the default.
pub const THEMES: [Theme; 14] = [
    Theme::new(BLACK, WHITE),
    Theme::new(WHITE, BLACK),
    Theme::new(Rgb::new(104, 55, 43), WHITE), // dark red
    Theme::new(Rgb::new(112, 164, 178), BLACK), // cyan
    Theme::new(Rgb::new(111, 61, 134), WHITE), // purple
    Theme::new(Rgb::new(88, 141, 67), BLACK), // green
    Theme::new(Rgb::new(53, 40, 121), WHITE), // dark blue
    Theme::new(Rgb::new(184, 199, 111), BLACK), // light yellow
    Theme::new(Rgb::new(111, 79, 37), WHITE), // dark brown
    Theme::new(Rgb::new(67, 57, 0), WHITE),  // dark olive
    Theme::new(Rgb::new(154, 103, 89), BLACK), // light orange
    Theme::new(Rgb::new(68, 68, 68), WHITE), // dark grey
    Theme::new(Rgb::new(108, 108, 108), BLACK), // grey
    Theme::new(Rgb::new(172, 172, 172), BLACK), // light grey
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_selects_theme() {
        assert_eq!(Theme::from_index(1).background, WHITE);
        assert_eq!(Theme::from_index(1).foreground, BLACK);
    }

    #[test]
    fn out_of_range_falls_back_to_default() {
        assert_eq!(Theme::from_index(THEMES.len()), THEMES[0]);
        assert_eq!(Theme::from_index(usize::MAX), THEMES[0]);
    }
}
