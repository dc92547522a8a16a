// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS-like style property maps.
//!
//! Element style is kept as discrete `property → value` pairs so that diffs
//! can report individual properties. [`StyleMap::to_css_text`] produces the
//! `prop: value;` list used in snapshots and [`StyleMap::parse`] reads such a
//! list back (e.g. an inline `style` attribute reported by the adapter).

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};

use kurbo::Rect;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use super::paint::{PaintAttributes, Typography};

/// Ordered map of style properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `prop: value; prop: value` list.
    ///
    /// Property names are lowercased; declarations without a name or value are
    /// skipped. Later declarations replace earlier ones.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut map = BTreeMap::new();
        for decl in text.split(';') {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            map.insert(name.to_ascii_lowercase(), value.to_string());
        }
        Self(map)
    }

    /// Serializes to `prop: value;` pairs separated by single spaces.
    #[must_use]
    pub fn to_css_text(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.0 {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push(';');
        }
        out
    }

    /// Sets a property, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Removes a property.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Returns a property value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Copies every property of `other` into `self`, replacing duplicates.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Borrows the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Mutably borrows the underlying map.
    pub fn as_map_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.0
    }
}

impl FromIterator<(String, String)> for StyleMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds the style for a node from its resolved geometry and paint.
///
/// `frame` and `clip` are world-space rects; the clip is expressed as a
/// `clip-path: inset(...)` relative to the frame when it cuts into it.
#[must_use]
pub fn derive_style(
    frame: Rect,
    clip: Rect,
    paint: &PaintAttributes,
    typography: Option<&Typography>,
) -> StyleMap {
    let mut style = StyleMap::new();
    style.insert("position", "absolute");
    style.insert("left", px(frame.x0));
    style.insert("top", px(frame.y0));
    style.insert("width", px(frame.width()));
    style.insert("height", px(frame.height()));

    if let Some(bg) = paint.background.filter(|c| !c.is_transparent()) {
        style.insert("background-color", bg.to_string());
    }
    if paint.border_width > 0.0 {
        if let Some(border) = paint.border_color {
            style.insert("border-color", border.to_string());
        }
        style.insert("border-width", px(paint.border_width));
        style.insert("border-style", "solid");
    }
    if paint.corner_radius > 0.0 {
        style.insert("border-radius", px(paint.corner_radius));
    }
    if paint.alpha < 1.0 {
        style.insert("opacity", number(f64::from(paint.alpha.max(0.0))));
    }
    if paint.hidden {
        style.insert("visibility", "hidden");
    }
    if let Some(inset) = clip_inset(frame, clip) {
        style.insert("clip-path", inset);
    }

    if let Some(text) = typography {
        if let Some(color) = text.color {
            style.insert("color", color.to_string());
        }
        if text.font_size > 0.0 {
            style.insert("font-size", px(text.font_size));
        }
        if let Some(family) = &text.font_family {
            style.insert("font-family", family.clone());
        }
        if let Some(align) = text.align.as_css() {
            style.insert("text-align", align);
        }
    }
    style
}

fn clip_inset(frame: Rect, clip: Rect) -> Option<String> {
    let top = (clip.y0 - frame.y0).max(0.0);
    let right = (frame.x1 - clip.x1).max(0.0);
    let bottom = (frame.y1 - clip.y1).max(0.0);
    let left = (clip.x0 - frame.x0).max(0.0);
    if top == 0.0 && right == 0.0 && bottom == 0.0 && left == 0.0 {
        return None;
    }
    Some(format!(
        "inset({} {} {} {})",
        px(top),
        px(right),
        px(bottom),
        px(left)
    ))
}

/// Formats a length in CSS pixels, rounded to two decimals.
#[must_use]
pub fn px(value: f64) -> String {
    format!("{}px", round2(value))
}

fn number(value: f64) -> String {
    format!("{}", round2(value))
}

fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid printing "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::paint::{Color, TextAlign};

    #[test]
    fn parse_splits_and_normalizes() {
        let style = StyleMap::parse("Color: red;  ; width:10px ;bogus; height : 2px");
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("width"), Some("10px"));
        assert_eq!(style.get("height"), Some("2px"));
        assert_eq!(style.len(), 3);
    }

    #[test]
    fn css_text_round_trips_through_parse() {
        let mut style = StyleMap::new();
        style.insert("left", "1px");
        style.insert("background-color", "#ffffff");
        let text = style.to_css_text();
        assert_eq!(text, "background-color: #ffffff; left: 1px;");
        assert_eq!(StyleMap::parse(&text), style);
    }

    #[test]
    fn derive_includes_geometry_and_paint() {
        let paint = PaintAttributes {
            background: Some(Color::rgb(255, 0, 0)),
            border_color: Some(Color::BLACK),
            border_width: 1.5,
            corner_radius: 4.0,
            alpha: 0.5,
            hidden: true,
        };
        let frame = Rect::new(10.0, 20.0, 110.0, 70.0);
        let style = derive_style(frame, frame, &paint, None);
        assert_eq!(style.get("left"), Some("10px"));
        assert_eq!(style.get("top"), Some("20px"));
        assert_eq!(style.get("width"), Some("100px"));
        assert_eq!(style.get("height"), Some("50px"));
        assert_eq!(style.get("background-color"), Some("#ff0000"));
        assert_eq!(style.get("border-color"), Some("#000000"));
        assert_eq!(style.get("border-width"), Some("1.5px"));
        assert_eq!(style.get("border-radius"), Some("4px"));
        assert_eq!(style.get("opacity"), Some("0.5"));
        assert_eq!(style.get("visibility"), Some("hidden"));
        assert_eq!(style.get("clip-path"), None);
    }

    #[test]
    fn zero_width_border_emits_nothing() {
        let paint = PaintAttributes {
            border_color: Some(Color::BLACK),
            ..PaintAttributes::default()
        };
        let frame = Rect::new(0.0, 0.0, 1.0, 1.0);
        let style = derive_style(frame, frame, &paint, None);
        assert_eq!(style.get("border-color"), None);
        assert_eq!(style.get("border-style"), None);
    }

    #[test]
    fn partial_clip_becomes_inset() {
        let frame = Rect::new(0.0, 0.0, 100.0, 100.0);
        let clip = Rect::new(10.0, 0.0, 100.0, 80.0);
        let style = derive_style(frame, clip, &PaintAttributes::default(), None);
        assert_eq!(style.get("clip-path"), Some("inset(0px 0px 20px 10px)"));
    }

    #[test]
    fn typography_adds_text_properties() {
        let text = Typography {
            font_family: Some("Inter".into()),
            font_size: 14.0,
            color: Some(Color::rgb(1, 2, 3)),
            align: TextAlign::Center,
        };
        let frame = Rect::new(0.0, 0.0, 1.0, 1.0);
        let style = derive_style(frame, frame, &PaintAttributes::default(), Some(&text));
        assert_eq!(style.get("font-family"), Some("Inter"));
        assert_eq!(style.get("font-size"), Some("14px"));
        assert_eq!(style.get("color"), Some("#010203"));
        assert_eq!(style.get("text-align"), Some("center"));
    }

    #[test]
    fn px_rounds_and_avoids_negative_zero() {
        assert_eq!(px(1.005_1), "1.01px");
        assert_eq!(px(-0.001), "0px");
        assert_eq!(px(f64::NAN), "0px");
    }
}
