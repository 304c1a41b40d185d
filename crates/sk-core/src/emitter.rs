//! Serializer: Scene → HTML markup + CSS stylesheet.
//!
//! Two passes. `build_*` lowers the scene into a small structured IR
//! (markup nodes, selector/declaration rules); `render_*` turns the IR into
//! text. Output depends only on the scene, the image mode, and the year:
//! no clocks, no random ids, no hash-map iteration.

use crate::id::ElementId;
use crate::model::*;
use std::collections::HashMap;
use std::fmt::Write;

/// Id of the container every element is positioned inside.
pub const CANVAS_ID: &str = "sk-canvas";

/// Class names the editor's visual layer puts on element nodes. They never
/// reach exported markup.
pub const EDITOR_CLASSES: &[&str] = &["sk-element", "sk-selected", "sk-dragging"];

/// Properties that are either emitted from geometry or only meaningful
/// inside the editor.
pub const EXCLUDED_PROPERTIES: &[&str] = &[
    "position",
    "left",
    "top",
    "right",
    "bottom",
    "width",
    "height",
    "cursor",
    "z-index",
    "user-select",
    "-webkit-user-select",
    "outline",
    "background-image",
];

const FOOTER_CLASS: &str = "sk-footer";
const FOOTER_ATTRIBUTION: &str = "Made with Sketchkit";

/// How `image` elements reference their bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// Inline `data:` URL. Self-contained; used by the live preview.
    #[default]
    Embedded,
    /// `images/<file name>`, for output written next to an images folder.
    Relative,
}

// ─── IR ──────────────────────────────────────────────────────────────────

/// One markup element: tag, attributes in emission order, optional text,
/// and children.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupNode {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
}

impl Stylesheet {
    pub fn rule(&self, selector: &str) -> Option<&StyleRule> {
        self.rules.iter().find(|r| r.selector == selector)
    }
}

/// The two text artifacts of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub markup: String,
    pub stylesheet: String,
}

// ─── Image assets ────────────────────────────────────────────────────────

/// An uploaded image referenced by the scene, with the relative path it is
/// exported under.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset<'a> {
    pub element: ElementId,
    /// `images/<file name>`.
    pub path: String,
    pub media: &'a MediaRef,
}

/// Assign every image element an `images/` path, in creation order.
///
/// Elements sharing a file name and identical bytes share one file; a
/// different image under an already-used name gets a `-N` suffix.
pub fn image_assets(scene: &Scene) -> Vec<ImageAsset<'_>> {
    let mut used: HashMap<String, &str> = HashMap::new();
    let mut out = Vec::new();

    for el in scene.elements() {
        let Some(media) = el.media.as_ref() else {
            continue;
        };
        let base = sanitize_file_name(&media.file_name);
        let mut candidate = base.clone();
        let mut n = 1;
        loop {
            match used.get(&candidate) {
                None => {
                    used.insert(candidate.clone(), media.data_url.as_str());
                    break;
                }
                Some(existing) if *existing == media.data_url => break,
                Some(_) => {
                    candidate = with_suffix(&base, n);
                    n += 1;
                }
            }
        }
        out.push(ImageAsset {
            element: el.id,
            path: format!("images/{candidate}"),
            media,
        });
    }
    out
}

/// Keep only the final path component and characters that are safe inside
/// a quoted CSS `url()` and a zip entry name.
fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

fn with_suffix(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{n}{}", &name[..dot], &name[dot..]),
        _ => format!("{name}-{n}"),
    }
}

// ─── Lowering ────────────────────────────────────────────────────────────

/// Lower the scene into the `<body>` subtree: the canvas container with one
/// child per element (creation order), then the footer.
pub fn build_markup(scene: &Scene, year: i32) -> MarkupNode {
    let mut canvas = MarkupNode::new("div").attr("id", CANVAS_ID);

    for el in scene.elements() {
        let t = el.template();
        let mut node = MarkupNode::new(t.tag).attr("id", el.id.as_str());

        let classes: Vec<&str> = el
            .classes
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty() && !EDITOR_CLASSES.contains(c))
            .collect();
        if !classes.is_empty() {
            node = node.attr("class", classes.join(" "));
        }

        if t.editable_text {
            node.text = el.content.clone();
        }
        canvas.children.push(node);
    }

    let mut footer = MarkupNode::new("footer").attr("class", FOOTER_CLASS);
    footer.text = Some(format!("© {year} {FOOTER_ATTRIBUTION}"));

    let mut body = MarkupNode::new("body");
    body.children.push(canvas);
    body.children.push(footer);
    body
}

/// Lower the scene into stylesheet rules: canvas, one `#id` rule per
/// element, footer.
pub fn build_stylesheet(scene: &Scene, mode: ImageMode) -> Stylesheet {
    let paths: HashMap<ElementId, String> = image_assets(scene)
        .into_iter()
        .map(|a| (a.element, a.path))
        .collect();

    let canvas = scene.canvas();
    let mut rules = vec![StyleRule {
        selector: format!("#{CANVAS_ID}"),
        declarations: decls(&[
            ("position", "relative".into()),
            ("width", px(canvas.width)),
            ("height", px(canvas.height)),
            ("margin", "0 auto".into()),
            ("overflow", "hidden".into()),
        ]),
    }];

    for el in scene.elements() {
        let g = el.geometry;
        let mut declarations = decls(&[
            ("position", "absolute".into()),
            ("left", px(g.x)),
            ("top", px(g.y)),
            ("width", px(g.width)),
            ("height", px(g.height)),
        ]);

        for (prop, value) in &el.style {
            let prop = prop.trim();
            if prop.is_empty()
                || EXCLUDED_PROPERTIES.contains(&prop)
                || EDITOR_CLASSES.iter().any(|c| value.contains(c))
                || value.contains([';', '{', '}'])
            {
                continue;
            }
            declarations.push((prop.to_string(), value.trim().to_string()));
        }

        if let Some(media) = el.media.as_ref() {
            let url = match mode {
                ImageMode::Embedded => media.data_url.clone(),
                ImageMode::Relative => paths.get(&el.id).cloned().unwrap_or_default(),
            };
            declarations.push(("background-image".into(), format!("url('{url}')")));
        }

        rules.push(StyleRule {
            selector: format!("#{}", el.id.as_str()),
            declarations,
        });
    }

    rules.push(StyleRule {
        selector: format!(".{FOOTER_CLASS}"),
        declarations: decls(&[
            ("margin-top", "16px".into()),
            ("color", "#6c757d".into()),
            ("font-size", "12px".into()),
            ("text-align", "center".into()),
        ]),
    });

    Stylesheet { rules }
}

fn decls(pairs: &[(&str, String)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

// ─── Rendering ───────────────────────────────────────────────────────────

/// How the document pulls in its styles.
enum StyleSource<'a> {
    Link(&'a str),
    Inline(&'a Stylesheet),
}

/// Standalone `index.html` that links `styles.css`.
#[must_use]
pub fn emit_markup(scene: &Scene, year: i32) -> String {
    render_document(&build_markup(scene, year), StyleSource::Link("styles.css"))
}

/// `styles.css` text.
#[must_use]
pub fn emit_stylesheet(scene: &Scene, mode: ImageMode) -> String {
    render_stylesheet(&build_stylesheet(scene, mode))
}

/// Markup + stylesheet for file export (relative image paths).
#[must_use]
pub fn export(scene: &Scene, year: i32) -> Export {
    Export {
        markup: emit_markup(scene, year),
        stylesheet: emit_stylesheet(scene, ImageMode::Relative),
    }
}

/// Single self-contained document for the live preview: inline styles and
/// embedded images.
#[must_use]
pub fn emit_preview(scene: &Scene, year: i32) -> String {
    let sheet = build_stylesheet(scene, ImageMode::Embedded);
    render_document(&build_markup(scene, year), StyleSource::Inline(&sheet))
}

fn render_document(body: &MarkupNode, styles: StyleSource<'_>) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("  <title>Sketch</title>\n");
    match styles {
        StyleSource::Link(href) => {
            let _ = writeln!(out, "  <link rel=\"stylesheet\" href=\"{}\">", escape_attr(href));
        }
        StyleSource::Inline(sheet) => {
            out.push_str("  <style>\n");
            for line in render_stylesheet(sheet).lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "    {line}");
                }
            }
            out.push_str("  </style>\n");
        }
    }
    out.push_str("</head>\n");
    render_node(&mut out, body, 0);
    out.push_str("</html>\n");
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn render_node(out: &mut String, node: &MarkupNode, depth: usize) {
    indent(out, depth);
    out.push('<');
    out.push_str(node.tag);
    for (name, value) in &node.attrs {
        let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
    }
    out.push('>');

    if node.children.is_empty() {
        if let Some(text) = &node.text {
            out.push_str(&escape_text(text));
        }
        let _ = writeln!(out, "</{}>", node.tag);
        return;
    }

    out.push('\n');
    if let Some(text) = &node.text {
        indent(out, depth + 1);
        out.push_str(&escape_text(text));
        out.push('\n');
    }
    for child in &node.children {
        render_node(out, child, depth + 1);
    }
    indent(out, depth);
    let _ = writeln!(out, "</{}>", node.tag);
}

/// Render rules separated by blank lines, one declaration per line.
#[must_use]
pub fn render_stylesheet(sheet: &Stylesheet) -> String {
    let mut out = String::with_capacity(512);
    for (i, rule) in sheet.rules.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{} {{", rule.selector);
        for (prop, value) in &rule.declarations {
            let _ = writeln!(out, "  {prop}: {value};");
        }
        out.push_str("}\n");
    }
    out
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Pixel length with the shortest exact-enough number.
fn px(n: f32) -> String {
    format!("{}px", format_num(n))
}

pub(crate) fn format_num(n: f32) -> String {
    let s = if n == n.floor() {
        format!("{n:.0}")
    } else {
        format!("{n:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    };
    // -0.0 and tiny negatives round to "-0".
    if s == "-0" { "0".to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn media(name: &str, payload: &str) -> MediaRef {
        MediaRef {
            file_name: name.into(),
            mime: "image/png".into(),
            data_url: format!("data:image/png;base64,{payload}"),
            natural_width: 10,
            natural_height: 10,
        }
    }

    #[test]
    fn markup_one_tag_per_element_in_creation_order() {
        let mut scene = Scene::default();
        let b = scene.create_element(ElementKind::Button, Some((0.0, 0.0)));
        let p = scene.create_element(ElementKind::Paragraph, Some((0.0, 50.0)));
        scene.bring_to_front(b);

        let body = build_markup(&scene, 2026);
        let canvas = &body.children[0];
        let ids: Vec<_> = canvas
            .children
            .iter()
            .map(|n| n.attr_value("id").unwrap().to_string())
            .collect();
        assert_eq!(ids, vec![b.as_str().to_string(), p.as_str().to_string()]);
        assert_eq!(canvas.children[0].tag, "button");
        assert_eq!(canvas.children[1].tag, "p");
    }

    #[test]
    fn shapes_have_no_text() {
        let mut scene = Scene::default();
        scene.create_element(ElementKind::Ellipse, None);
        let body = build_markup(&scene, 2026);
        let node = &body.children[0].children[0];
        assert_eq!(node.tag, "div");
        assert_eq!(node.text, None);
    }

    #[test]
    fn editor_classes_are_filtered() {
        let mut scene = Scene::default();
        let id = scene.create_element(ElementKind::Block, None);
        scene.set_classes(id, ["card", "sk-selected", " ", "wide"]);
        let body = build_markup(&scene, 2026);
        assert_eq!(body.children[0].children[0].attr_value("class"), Some("card wide"));

        scene.set_style(id, "outline-color", "var(--sk-selected-ring)");
        let sheet = build_stylesheet(&scene, ImageMode::Relative);
        let rule = sheet.rule(&format!("#{}", id.as_str())).unwrap();
        assert!(rule.declarations.iter().all(|(k, _)| k != "outline-color"));
    }

    #[test]
    fn rule_starts_with_geometry_then_style() {
        let mut scene = Scene::default();
        let id = scene.create_element(ElementKind::Paragraph, Some((10.0, 20.5)));
        scene.set_style(id, "cursor", "move");
        scene.set_style(id, "z-index", "9");
        let sheet = build_stylesheet(&scene, ImageMode::Relative);
        let rule = sheet.rule(&format!("#{}", id.as_str())).unwrap();

        let props: Vec<&str> = rule.declarations.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            props,
            vec!["position", "left", "top", "width", "height", "color", "font-size", "margin"]
        );
        assert_eq!(rule.declarations[2].1, "20.5px");
    }

    #[test]
    fn image_url_follows_mode() {
        let mut scene = Scene::default();
        let id = scene.create_image(media("photos/cat.png", "AAAA"), 40.0, 30.0, None);
        let selector = format!("#{}", id.as_str());

        let embedded = build_stylesheet(&scene, ImageMode::Embedded);
        let relative = build_stylesheet(&scene, ImageMode::Relative);
        let bg = |s: &Stylesheet| {
            s.rule(&selector)
                .unwrap()
                .declarations
                .iter()
                .find(|(k, _)| k == "background-image")
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(bg(&embedded), "url('data:image/png;base64,AAAA')");
        assert_eq!(bg(&relative), "url('images/cat.png')");
    }

    #[test]
    fn image_assets_disambiguate_names() {
        let mut scene = Scene::default();
        scene.create_image(media("logo.png", "AAAA"), 40.0, 40.0, None);
        scene.create_image(media("logo.png", "AAAA"), 40.0, 40.0, None);
        scene.create_image(media("logo.png", "BBBB"), 40.0, 40.0, None);
        scene.create_image(media("my logo (1).png", "CCCC"), 40.0, 40.0, None);

        let paths: Vec<_> = image_assets(&scene).into_iter().map(|a| a.path).collect();
        assert_eq!(
            paths,
            vec![
                "images/logo.png",
                "images/logo.png",
                "images/logo-1.png",
                "images/my_logo__1_.png",
            ]
        );
    }

    #[test]
    fn text_is_escaped() {
        let mut scene = Scene::default();
        let id = scene.create_element(ElementKind::Paragraph, None);
        scene.set_content(id, "<b>Fish & Chips</b>");
        let html = emit_markup(&scene, 2026);
        assert!(html.contains("&lt;b&gt;Fish &amp; Chips&lt;/b&gt;"));
    }

    #[test]
    fn footer_in_both_outputs() {
        let scene = Scene::default();
        let footer = "<footer class=\"sk-footer\">© 2031 Made with Sketchkit</footer>";
        assert!(emit_markup(&scene, 2031).contains(footer));
        assert!(emit_preview(&scene, 2031).contains(footer));
    }

    #[test]
    fn render_stylesheet_layout() {
        let sheet = Stylesheet {
            rules: vec![
                StyleRule {
                    selector: "#a".into(),
                    declarations: vec![("color".into(), "red".into())],
                },
                StyleRule {
                    selector: "#b".into(),
                    declarations: vec![],
                },
            ],
        };
        assert_eq!(render_stylesheet(&sheet), "#a {\n  color: red;\n}\n\n#b {\n}\n");
    }

    #[test]
    fn format_num_trims() {
        assert_eq!(format_num(120.0), "120");
        assert_eq!(format_num(-30.0), "-30");
        assert_eq!(format_num(12.5), "12.5");
        assert_eq!(format_num(1.0 / 3.0), "0.33");
        assert_eq!(format_num(3.0e9), "3000000000");
        assert_eq!(px(-5.0e9), "-5000000000px");
        assert_eq!(format_num(-0.0), "0");
        assert_eq!(format_num(-0.001), "0");
    }
}
