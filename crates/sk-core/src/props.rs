//! Properties form: the string-typed side panel for the selected element.
//!
//! `from_element` projects an element into form fields; `apply_to` parses
//! the fields and writes them back through the scene store. Every field is
//! parsed before anything is written, so a bad value leaves the scene
//! untouched. An empty style field removes that property.

use crate::emitter::format_num;
use crate::error::{Result, SketchError};
use crate::id::ElementId;
use crate::model::{Element, GeometryPatch, Scene};
use crate::templates::supports_rotation;
use serde::{Deserialize, Serialize};
use winnow::ascii::{digit0, digit1, space0, space1};
use winnow::combinator::{alt, delimited, opt, preceded, separated, terminated};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertiesForm {
    pub name: String,
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    pub background: String,
    pub color: String,
    pub font_size: String,
    pub padding: String,
    pub border: String,
    /// Degrees; only shown for line-type elements.
    pub rotation: String,
    /// `None` for kinds without text editing.
    pub content: Option<String>,
    /// Space-separated class list.
    pub classes: String,
}

impl PropertiesForm {
    pub fn from_element(el: &Element) -> Self {
        let style = |k: &str| el.style.get(k).cloned().unwrap_or_default();
        let rotation = if supports_rotation(el.kind) {
            el.style
                .get("transform")
                .and_then(|t| rotate_value.parse(t.trim()).ok())
                .map(format_num)
                .unwrap_or_else(|| "0".into())
        } else {
            String::new()
        };

        Self {
            name: el.name.clone(),
            x: format_num(el.geometry.x),
            y: format_num(el.geometry.y),
            width: format_num(el.geometry.width),
            height: format_num(el.geometry.height),
            background: style("background-color"),
            color: style("color"),
            font_size: style("font-size"),
            padding: style("padding"),
            border: style("border"),
            rotation,
            content: if el.template().editable_text {
                Some(el.content.clone().unwrap_or_default())
            } else {
                None
            },
            classes: el.classes.join(" "),
        }
    }

    /// Parse and write back. Returns `Ok(false)` when `id` no longer
    /// exists (e.g. a submit queued behind a delete).
    pub fn apply_to(&self, scene: &mut Scene, id: ElementId) -> Result<bool> {
        let Some(el) = scene.get(id) else {
            log::warn!("properties submit for missing element {id}");
            return Ok(false);
        };
        let kind = el.kind;
        let parsed = ParsedForm::parse(self, supports_rotation(kind))?;

        if let Some(name) = parsed.name {
            scene.rename(id, name);
        }
        scene.update_geometry(id, parsed.geometry);
        for (prop, value) in parsed.styles {
            match value {
                Some(v) => scene.set_style(id, prop, &v),
                None => scene.remove_style(id, prop),
            };
        }
        if let Some(text) = &self.content {
            scene.set_content(id, text);
        }
        scene.set_classes(id, self.classes.split_whitespace());
        Ok(true)
    }
}

/// Validated form values, ready to write.
struct ParsedForm<'a> {
    name: Option<&'a str>,
    geometry: GeometryPatch,
    styles: Vec<(&'static str, Option<String>)>,
}

impl<'a> ParsedForm<'a> {
    fn parse(form: &'a PropertiesForm, rotates: bool) -> Result<Self> {
        let name = Some(form.name.trim()).filter(|n| !n.is_empty());
        let geometry = GeometryPatch {
            x: opt_field("x", &form.x, length)?,
            y: opt_field("y", &form.y, length)?,
            width: opt_field("width", &form.width, length)?,
            height: opt_field("height", &form.height, length)?,
        };

        let mut styles = vec![
            (
                "background-color",
                style_field("background", &form.background, |s| {
                    color.parse(s).ok().map(str::to_string)
                })?,
            ),
            (
                "color",
                style_field("color", &form.color, |s| color.parse(s).ok().map(str::to_string))?,
            ),
            (
                "font-size",
                style_field("font size", &form.font_size, |s| {
                    length.parse(s).ok().map(|n| format!("{}px", format_num(n)))
                })?,
            ),
            (
                "padding",
                style_field("padding", &form.padding, |s| {
                    box_lengths.parse(s).ok().map(|sides| {
                        sides
                            .iter()
                            .map(|n| format!("{}px", format_num(*n)))
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                })?,
            ),
            (
                "border",
                style_field("border", &form.border, |s| border.parse(s).ok().map(str::to_string))?,
            ),
        ];

        if rotates {
            let deg = opt_field("rotation", &form.rotation, angle)?.unwrap_or(0.0);
            styles.push(("transform", Some(format!("rotate({}deg)", format_num(deg)))));
        }

        Ok(Self {
            name,
            geometry,
            styles,
        })
    }
}

/// Empty means "leave unchanged".
fn opt_field(
    field: &'static str,
    raw: &str,
    mut parser: impl FnMut(&mut &str) -> ModalResult<f32>,
) -> Result<Option<f32>> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    parser
        .parse(s)
        .map(Some)
        .map_err(|_| SketchError::invalid(field, raw))
}

/// Empty means "remove the property".
fn style_field(
    field: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Option<String>,
) -> Result<Option<String>> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    parse(s)
        .map(Some)
        .ok_or_else(|| SketchError::invalid(field, raw))
}

// ─── Value parsers ───────────────────────────────────────────────────────

fn number(input: &mut &str) -> ModalResult<f32> {
    (opt('-'), digit1, opt(('.', digit0)))
        .take()
        .try_map(str::parse::<f32>)
        .verify(|n: &f32| n.is_finite())
        .parse_next(input)
}

/// `12`, `12px`, `-4.5px`.
fn length(input: &mut &str) -> ModalResult<f32> {
    terminated(number, opt("px")).parse_next(input)
}

/// `45`, `45deg`.
fn angle(input: &mut &str) -> ModalResult<f32> {
    terminated(number, opt("deg")).parse_next(input)
}

/// CSS box shorthand: one to four lengths.
fn box_lengths(input: &mut &str) -> ModalResult<Vec<f32>> {
    separated(1..=4, length, space1).parse_next(input)
}

/// `rotate(45deg)` → 45.
fn rotate_value(input: &mut &str) -> ModalResult<f32> {
    delimited(("rotate(", space0), angle, (space0, ')')).parse_next(input)
}

/// `#rgb`, `#rrggbb`, `#rrggbbaa`, a named color, or a color function.
fn color<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        preceded(
            '#',
            take_while(3..=8, |c: char| c.is_ascii_hexdigit())
                .verify(|h: &str| matches!(h.len(), 3 | 4 | 6 | 8)),
        )
        .take(),
        (
            take_while(1.., |c: char| c.is_ascii_alphabetic()),
            '(',
            take_till(0.., |c: char| matches!(c, ')' | ';' | '{' | '}')),
            ')',
        )
            .take(),
        take_while(1.., |c: char| c.is_ascii_alphabetic()),
    ))
    .parse_next(input)
}

/// Border shorthand: one to three parts, each a width, a keyword such as
/// `solid`, or a color.
fn border<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    separated(1..=3, alt((length.void(), color.void())), space1)
        .map(|_: Vec<()>| ())
        .take()
        .parse_next(input)
}
