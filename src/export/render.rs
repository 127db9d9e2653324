//! Layout of the exportable region into a single snapshot
//!
//! The region is plain data. Chrome that should not appear in the document
//! is left out through [`RenderOptions::exclude`] instead of being hidden and
//! restored around the capture.

/// Roles of the regions that make up the search view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Title,
    SearchControls,
    WorkerDetails,
    ActionButtons,
    DeliveryList,
}

impl RegionKind {
    /// Interactive chrome that never belongs in an exported document
    pub const CHROME: [RegionKind; 3] = [
        RegionKind::Title,
        RegionKind::SearchControls,
        RegionKind::ActionButtons,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Heading,
    Title,
    Strong,
    Body,
}

impl TextStyle {
    /// Font size in layout pixels
    fn size(self) -> f32 {
        match self {
            TextStyle::Heading => 24.0,
            TextStyle::Title => 20.0,
            TextStyle::Strong => 15.0,
            TextStyle::Body => 14.0,
        }
    }

    fn bold(self) -> bool {
        !matches!(self, TextStyle::Body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text { style: TextStyle, text: String },
    Rule,
}

impl Block {
    pub fn text(style: TextStyle, text: impl Into<String>) -> Self {
        Block::Text {
            style,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub kind: RegionKind,
    pub blocks: Vec<Block>,
}

impl Region {
    pub fn new(kind: RegionKind, blocks: Vec<Block>) -> Self {
        Self { kind, blocks }
    }
}

/// The exportable part of a view, top to bottom
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportView {
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Layout width in pixels before scaling
    pub width: f32,
    /// Upscaling factor applied to every coordinate
    pub scale: f32,
    pub padding: f32,
    pub exclude: Vec<RegionKind>,
    /// Text placed above everything else, centered
    pub heading: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            scale: 2.0,
            padding: 20.0,
            exclude: Vec::new(),
            heading: None,
        }
    }
}

/// A positioned drawing operation, in snapshot pixels with y growing down
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        baseline: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Rule {
        y: f32,
        x0: f32,
        x1: f32,
    },
}

/// The rendered region
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl Snapshot {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rule { .. } => None,
        })
    }
}

const LINE_HEIGHT: f32 = 1.4;
const REGION_GAP: f32 = 12.0;
const HEADING_GAP: f32 = 20.0;
const RULE_GAP: f32 = 6.0;

// Average glyph advance of Helvetica, as a fraction of the font size
fn advance(bold: bool) -> f32 {
    if bold {
        0.55
    } else {
        0.5
    }
}

struct Cursor<'a> {
    opts: &'a RenderOptions,
    y: f32,
    ops: Vec<DrawOp>,
}

impl Cursor<'_> {
    fn content_width(&self) -> f32 {
        (self.opts.width - 2.0 * self.opts.padding).max(1.0)
    }

    fn text(&mut self, style: TextStyle, text: &str, centered: bool) {
        let size = style.size();
        let bold = style.bold();
        let max_chars = (self.content_width() / (size * advance(bold))).floor().max(1.0) as usize;

        for line in wrap(text, max_chars) {
            let x = if centered {
                let width = line.chars().count() as f32 * size * advance(bold);
                ((self.opts.width - width) / 2.0).max(self.opts.padding)
            } else {
                self.opts.padding
            };
            let s = self.opts.scale;
            self.ops.push(DrawOp::Text {
                x: x * s,
                baseline: (self.y + size) * s,
                size: size * s,
                bold,
                text: line,
            });
            self.y += size * LINE_HEIGHT;
        }
    }

    fn rule(&mut self) {
        let s = self.opts.scale;
        self.y += RULE_GAP;
        self.ops.push(DrawOp::Rule {
            y: self.y * s,
            x0: self.opts.padding * s,
            x1: (self.opts.width - self.opts.padding) * s,
        });
        self.y += RULE_GAP;
    }
}

/// Lay out `view` into a snapshot
pub fn render(view: &ExportView, opts: &RenderOptions) -> Snapshot {
    let mut cursor = Cursor {
        opts,
        y: opts.padding,
        ops: Vec::new(),
    };

    if let Some(heading) = &opts.heading {
        cursor.text(TextStyle::Heading, heading, true);
        cursor.y += HEADING_GAP;
    }

    for region in view
        .regions
        .iter()
        .filter(|r| !opts.exclude.contains(&r.kind))
    {
        for block in &region.blocks {
            match block {
                Block::Text { style, text } => cursor.text(*style, text, false),
                Block::Rule => cursor.rule(),
            }
        }
        cursor.y += REGION_GAP;
    }

    let height = cursor.y + opts.padding;
    Snapshot {
        width: opts.width * opts.scale,
        height: height * opts.scale,
        ops: cursor.ops,
    }
}

/// Greedy word wrap on character counts; overlong words are split
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(max_chars);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        let len = chars.len();
        if current_len > 0 && current_len + 1 + len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += len;
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> ExportView {
        ExportView {
            regions: vec![
                Region::new(
                    RegionKind::Title,
                    vec![Block::text(TextStyle::Title, "Buscar Trabajador")],
                ),
                Region::new(
                    RegionKind::SearchControls,
                    vec![Block::text(TextStyle::Body, "[ Buscar ]")],
                ),
                Region::new(
                    RegionKind::WorkerDetails,
                    vec![Block::text(TextStyle::Body, "Cédula: 1020")],
                ),
                Region::new(
                    RegionKind::ActionButtons,
                    vec![Block::text(TextStyle::Body, "[ Descargar PDF ]")],
                ),
                Region::new(
                    RegionKind::DeliveryList,
                    vec![
                        Block::text(TextStyle::Strong, "Entrega #1"),
                        Block::Rule,
                    ],
                ),
            ],
        }
    }

    #[test]
    fn test_render_excludes_chrome_and_prepends_heading() {
        let opts = RenderOptions {
            exclude: RegionKind::CHROME.to_vec(),
            heading: Some("COMPROBANTES".to_string()),
            ..Default::default()
        };

        let snapshot = render(&sample_view(), &opts);
        let texts: Vec<&str> = snapshot.texts().collect();
        assert_eq!(texts, vec!["COMPROBANTES", "Cédula: 1020", "Entrega #1"]);
    }

    #[test]
    fn test_render_without_exclusions_keeps_everything() {
        let snapshot = render(&sample_view(), &RenderOptions::default());
        assert_eq!(snapshot.texts().count(), 5);
        assert!(snapshot
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::Rule { .. })));
    }

    #[test]
    fn test_render_applies_scale() {
        let view = sample_view();
        let one = render(&view, &RenderOptions { scale: 1.0, ..Default::default() });
        let two = render(&view, &RenderOptions { scale: 2.0, ..Default::default() });

        assert_eq!(two.width, one.width * 2.0);
        assert!((two.height - one.height * 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_ops_are_top_to_bottom() {
        let snapshot = render(&sample_view(), &RenderOptions::default());
        let baselines: Vec<f32> = snapshot
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { baseline, .. } => Some(*baseline),
                _ => None,
            })
            .collect();
        assert!(baselines.windows(2).all(|w| w[0] < w[1]));
        assert!(*baselines.last().unwrap() < snapshot.height);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("uno dos tres", 7), vec!["uno dos", "tres"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("a  b", 10), vec!["a b"]);
    }
}
