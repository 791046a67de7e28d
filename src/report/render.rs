//! Markdown to HTML and PDF rendering.
//!
//! Both outputs are driven by the same `pulldown-cmark` event stream: HTML
//! through its bundled writer, PDF through a small line-oriented layout on
//! A4 pages using the builtin Helvetica fonts.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use pulldown_cmark::{html, Event, HeadingLevel, Parser, Tag, TagEnd};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const BODY_SIZE_PT: f32 = 10.5;
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Convert Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(markdown));
    out
}

/// Wrap the HTML form of `markdown` into a standalone page.
pub fn render_html_page(title: &str, markdown: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{}</title>
<style>
body {{ font-family: Helvetica, Arial, sans-serif; max-width: 50em; margin: 2em auto; line-height: 1.5; }}
code {{ background: #f4f4f4; padding: 0 .2em; }}
blockquote {{ color: #555; border-left: 3px solid #ccc; margin-left: 0; padding-left: 1em; }}
</style>
</head>
<body>
{}</body>
</html>
"#,
        escape_html(title),
        markdown_to_html(markdown)
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Visual role of a laid-out block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockStyle {
    Heading(u8),
    Paragraph,
    ListItem,
    Quote,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    style: BlockStyle,
    text: String,
}

/// Flatten the Markdown event stream into styled text blocks.
fn collect_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    let mut quote_depth = 0usize;
    let mut item_depth = 0usize;

    let flush = |current: &mut Option<Block>, blocks: &mut Vec<Block>| {
        if let Some(block) = current.take() {
            let text = block.text.trim_end().to_string();
            if !text.is_empty() {
                blocks.push(Block { text, ..block });
            }
        }
    };

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush(&mut current, &mut blocks);
                current = Some(Block {
                    style: BlockStyle::Heading(heading_rank(level)),
                    text: String::new(),
                });
            }
            Event::Start(Tag::Item) => {
                flush(&mut current, &mut blocks);
                item_depth += 1;
                current = Some(Block {
                    style: BlockStyle::ListItem,
                    text: String::new(),
                });
            }
            Event::Start(Tag::BlockQuote { .. }) => {
                flush(&mut current, &mut blocks);
                quote_depth += 1;
            }
            Event::Start(Tag::CodeBlock(_)) => {
                flush(&mut current, &mut blocks);
                current = Some(Block {
                    style: BlockStyle::Code,
                    text: String::new(),
                });
            }
            Event::Start(Tag::Paragraph) => {
                if item_depth == 0 {
                    flush(&mut current, &mut blocks);
                    let style = if quote_depth > 0 {
                        BlockStyle::Quote
                    } else {
                        BlockStyle::Paragraph
                    };
                    current = Some(Block {
                        style,
                        text: String::new(),
                    });
                }
            }
            Event::Text(text) | Event::Code(text) => {
                let block = current.get_or_insert_with(|| Block {
                    style: BlockStyle::Paragraph,
                    text: String::new(),
                });
                block.text.push_str(&text);
            }
            Event::SoftBreak => {
                if let Some(block) = current.as_mut() {
                    block.text.push(' ');
                }
            }
            Event::HardBreak => {
                if let Some(block) = current.as_mut() {
                    block.text.push('\n');
                }
            }
            Event::End(TagEnd::Item) => {
                flush(&mut current, &mut blocks);
                item_depth = item_depth.saturating_sub(1);
            }
            Event::End(TagEnd::BlockQuote { .. }) => {
                flush(&mut current, &mut blocks);
                quote_depth = quote_depth.saturating_sub(1);
            }
            Event::End(TagEnd::Paragraph) => {
                if item_depth == 0 {
                    flush(&mut current, &mut blocks);
                } else if let Some(block) = current.as_mut() {
                    block.text.push(' ');
                }
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::CodeBlock) => {
                flush(&mut current, &mut blocks);
            }
            _ => {}
        }
    }
    flush(&mut current, &mut blocks);

    blocks
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        _ => 4,
    }
}

/// Characters outside Latin-1 that Windows-1252, the encoding of the
/// builtin fonts, places in 0x80..=0x9F.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

/// Replace characters the builtin fonts cannot encode with `?`.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            '\n' | ' '..='~' | '\u{a0}'..='\u{ff}' => c,
            c if WIN_ANSI_EXTRAS.contains(c) => c,
            _ => '?',
        })
        .collect()
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    mono: IndirectFontRef,
}

/// Cursor over the pages of a document being written.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    y_mm: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> anyhow::Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let font = |f: BuiltinFont| {
            doc.add_builtin_font(f)
                .map_err(|e| anyhow::anyhow!("failed to load builtin font: {:?}", e))
        };
        let fonts = Fonts {
            regular: font(BuiltinFont::Helvetica)?,
            bold: font(BuiltinFont::HelveticaBold)?,
            italic: font(BuiltinFont::HelveticaOblique)?,
            mono: font(BuiltinFont::Courier)?,
        };
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            fonts,
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Layer {}", self.pages + 1),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    fn write_block(&mut self, block: &Block) {
        let (size, indent_mm, space_before_mm) = match block.style {
            BlockStyle::Heading(1) => (18.0, 0.0, 2.0),
            BlockStyle::Heading(2) => (14.0, 0.0, 5.0),
            BlockStyle::Heading(_) => (12.0, 0.0, 4.0),
            BlockStyle::ListItem => (BODY_SIZE_PT, 4.0, 1.0),
            BlockStyle::Quote => (BODY_SIZE_PT, 8.0, 1.0),
            BlockStyle::Code => (9.0, 4.0, 2.0),
            BlockStyle::Paragraph => (BODY_SIZE_PT, 0.0, 2.0),
        };
        let font = match block.style {
            BlockStyle::Heading(_) => self.fonts.bold.clone(),
            BlockStyle::Quote => self.fonts.italic.clone(),
            BlockStyle::Code => self.fonts.mono.clone(),
            _ => self.fonts.regular.clone(),
        };

        let line_height_mm = size * 1.4 * PT_TO_MM;
        let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent_mm;
        let width = (usable_mm / (size * AVG_GLYPH_WIDTH * PT_TO_MM)) as usize;

        let text = pdf_safe(&block.text);
        let text = if block.style == BlockStyle::ListItem {
            format!("- {}", text)
        } else {
            text
        };

        self.y_mm -= space_before_mm;
        for line in textwrap::wrap(&text, width.max(8)) {
            if self.y_mm - line_height_mm < MARGIN_MM {
                self.new_page();
            }
            self.y_mm -= line_height_mm;
            self.layer
                .use_text(line, size, Mm(MARGIN_MM + indent_mm), Mm(self.y_mm), &font);
        }
    }

    fn finish(self) -> anyhow::Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| anyhow::anyhow!("failed to serialize PDF: {:?}", e))
    }
}

/// Render a Markdown document to PDF bytes.
pub fn render_pdf(title: &str, markdown: &str) -> anyhow::Result<Vec<u8>> {
    let mut writer = PageWriter::new(&pdf_safe(title))?;
    for block in collect_blocks(markdown) {
        writer.write_block(&block);
    }
    tracing::debug!(title, pages = writer.pages, "rendered pdf");
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Documentation generated for `app.py`\n\n\
                          **Date:** 2024-03-01 09:30:00\n\n\
                          ## Details\n\
                          ### Class: `Foo`\n\
                          - Method: `bar` — Bars things.\n\n\
                          **Function:** `helper`\n\
                          > No docstring\n";

    #[test]
    fn test_markdown_to_html() {
        let html = markdown_to_html(SAMPLE);
        assert!(html.contains("<h1>Documentation generated for <code>app.py</code></h1>"));
        assert!(html.contains("<li>Method: <code>bar</code> — Bars things.</li>"));
        assert!(html.contains("<blockquote>"));
    }

    #[test]
    fn test_html_page_escapes_title() {
        let page = render_html_page("a<b>", "text");
        assert!(page.contains("<title>a&lt;b&gt;</title>"));
        assert!(page.contains("<p>text</p>"));
    }

    #[test]
    fn test_collect_blocks() {
        let blocks = collect_blocks(SAMPLE);
        let styles: Vec<_> = blocks.iter().map(|b| b.style).collect();
        assert_eq!(
            styles,
            vec![
                BlockStyle::Heading(1),
                BlockStyle::Paragraph,
                BlockStyle::Heading(2),
                BlockStyle::Heading(3),
                BlockStyle::ListItem,
                BlockStyle::Paragraph,
                BlockStyle::Quote,
            ]
        );
        assert_eq!(blocks[0].text, "Documentation generated for app.py");
        assert_eq!(blocks[4].text, "Method: bar — Bars things.");
        assert_eq!(blocks[6].text, "No docstring");
    }

    #[test]
    fn test_pdf_safe() {
        assert_eq!(pdf_safe("Función básica ¿sí? — “ok” €"), "Función básica ¿sí? — “ok” €");
        assert_eq!(pdf_safe("done ✓\tşey 日本"), "done ? ?ey ??");
        assert_eq!(pdf_safe("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_render_pdf_produces_document() {
        let mut long = String::from("# Title\n\nFunción `año` sin docstring — “¿qué hace?”\n\n");
        for i in 0..200 {
            long.push_str(&format!("- item number {}\n", i));
        }
        let bytes = render_pdf("Title", &long).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
