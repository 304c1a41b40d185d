//! Template registry: element kind → default tag, size, style, and content.
//!
//! Image and shape kinds render as a plain `div`; their visual comes from
//! background and border styling, never from a native image tag.

use crate::model::ElementKind;

/// Defaults applied when an element of `kind` is instantiated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Template {
    pub kind: ElementKind,
    /// Markup tag used by the serializer.
    pub tag: &'static str,
    pub width: f32,
    pub height: f32,
    /// Initial style declarations.
    pub style: &'static [(&'static str, &'static str)],
    /// Initial inner text; `None` for kinds without text.
    pub content: Option<&'static str>,
    /// Whether the selection shows resize handles.
    pub resizable: bool,
    /// Whether content can be edited (inline or via the properties form).
    pub editable_text: bool,
}

static BLOCK: Template = Template {
    kind: ElementKind::Block,
    tag: "div",
    width: 200.0,
    height: 120.0,
    style: &[
        ("background-color", "#e9ecef"),
        ("border", "1px solid #adb5bd"),
        ("color", "#212529"),
        ("padding", "8px"),
    ],
    content: Some("Block"),
    resizable: true,
    editable_text: true,
};

static BUTTON: Template = Template {
    kind: ElementKind::Button,
    tag: "button",
    width: 120.0,
    height: 40.0,
    style: &[
        ("background-color", "#0d6efd"),
        ("border", "none"),
        ("border-radius", "4px"),
        ("color", "#ffffff"),
        ("font-size", "16px"),
        ("padding", "8px 16px"),
    ],
    content: Some("Button"),
    resizable: true,
    editable_text: true,
};

static PARAGRAPH: Template = Template {
    kind: ElementKind::Paragraph,
    tag: "p",
    width: 240.0,
    height: 60.0,
    style: &[
        ("color", "#212529"),
        ("font-size", "16px"),
        ("margin", "0"),
    ],
    content: Some("Paragraph text"),
    resizable: true,
    editable_text: true,
};

static IMAGE: Template = Template {
    kind: ElementKind::Image,
    tag: "div",
    width: 200.0,
    height: 150.0,
    style: &[
        ("background-position", "center"),
        ("background-repeat", "no-repeat"),
        ("background-size", "cover"),
    ],
    content: None,
    resizable: true,
    editable_text: false,
};

static LINE: Template = Template {
    kind: ElementKind::Line,
    tag: "div",
    width: 200.0,
    height: 20.0,
    style: &[
        ("background-color", "transparent"),
        ("border-top", "2px solid #212529"),
        ("transform", "rotate(0deg)"),
        ("transform-origin", "center"),
    ],
    content: None,
    resizable: true,
    editable_text: false,
};

static ARROW: Template = Template {
    kind: ElementKind::Arrow,
    tag: "div",
    width: 200.0,
    height: 20.0,
    style: &[
        ("background-color", "#212529"),
        (
            "clip-path",
            "polygon(0 40%, 85% 40%, 85% 0, 100% 50%, 85% 100%, 85% 60%, 0 60%)",
        ),
        ("transform", "rotate(0deg)"),
        ("transform-origin", "center"),
    ],
    content: None,
    resizable: true,
    editable_text: false,
};

static ELLIPSE: Template = Template {
    kind: ElementKind::Ellipse,
    tag: "div",
    width: 120.0,
    height: 120.0,
    style: &[
        ("background-color", "#ffc107"),
        ("border", "1px solid #212529"),
        ("border-radius", "50%"),
    ],
    content: None,
    resizable: true,
    editable_text: false,
};

/// Registry lookup for a known kind.
pub fn template(kind: ElementKind) -> &'static Template {
    match kind {
        ElementKind::Block => &BLOCK,
        ElementKind::Button => &BUTTON,
        ElementKind::Paragraph => &PARAGRAPH,
        ElementKind::Image => &IMAGE,
        ElementKind::Line => &LINE,
        ElementKind::Arrow => &ARROW,
        ElementKind::Ellipse => &ELLIPSE,
    }
}

/// Registry lookup by palette name. Unrecognized names yield `None`;
/// callers must guard.
pub fn lookup(name: &str) -> Option<&'static Template> {
    name.parse::<ElementKind>().ok().map(template)
}

/// Kinds whose templates rotate (line-type elements).
pub fn supports_rotation(kind: ElementKind) -> bool {
    matches!(kind, ElementKind::Line | ElementKind::Arrow)
}
