// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved paint and typography attributes.

use alloc::string::String;
use core::fmt;

/// An 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with explicit alpha.
    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the color contributes nothing when painted.
    #[inline]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// CSS hex notation: `#rrggbb` when opaque, `#rrggbbaa` otherwise.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({self})")
    }
}

/// Visual attributes of a view, already resolved by the adapter.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintAttributes {
    /// Fill color behind the content.
    pub background: Option<Color>,
    /// Stroke color of the border.
    pub border_color: Option<Color>,
    /// Border stroke width in points.
    pub border_width: f64,
    /// Corner radius in points.
    pub corner_radius: f64,
    /// Layer alpha from 0.0 to 1.0, not accumulated from ancestors.
    pub alpha: f32,
    /// Whether the view is hidden.
    pub hidden: bool,
}

impl Default for PaintAttributes {
    fn default() -> Self {
        Self {
            background: None,
            border_color: None,
            border_width: 0.0,
            corner_radius: 0.0,
            alpha: 1.0,
            hidden: false,
        }
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Natural alignment for the writing direction; emits nothing.
    #[default]
    Natural,
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justify,
}

impl TextAlign {
    /// CSS keyword, or `None` for [`TextAlign::Natural`].
    #[must_use]
    pub const fn as_css(self) -> Option<&'static str> {
        match self {
            Self::Natural => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
            Self::Justify => Some("justify"),
        }
    }
}

/// Resolved font attributes for text content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Typography {
    /// Font family name as the replay player should request it.
    pub font_family: Option<String>,
    /// Point size; `0.0` leaves the player default.
    pub font_size: f64,
    /// Text color.
    pub color: Option<Color>,
    /// Alignment.
    pub align: TextAlign,
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn opaque_color_uses_six_digits() {
        assert_eq!(format!("{}", Color::rgb(255, 0, 16)), "#ff0010");
    }

    #[test]
    fn translucent_color_appends_alpha() {
        assert_eq!(format!("{}", Color::rgba(1, 2, 3, 0x80)), "#01020380");
    }
}
