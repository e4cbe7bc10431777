//! HTML synthesis.
//!
//! Produces one HTML document per [`Document`]: a container per page
//! followed by a page-break marker, with each element rendered in reading
//! order. Output is a pure function of the document and options.

use std::fs;
use std::path::Path;

use super::RenderOptions;
use crate::error::Result;
use crate::model::{AssetElement, Document, Element, Page, TextElement};

/// Renders documents to HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to an HTML string.
    pub fn render(&self, doc: &Document) -> String {
        let mut out = String::from("<html><body>");
        for page in &doc.pages {
            self.render_page(&mut out, page);
        }
        out.push_str("</body></html>");
        out
    }

    /// Render a document and write it to `path`.
    pub fn write(&self, doc: &Document, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.render(doc))?;
        Ok(())
    }

    fn render_page(&self, out: &mut String, page: &Page) {
        out.push_str(&format!("<div class=\"page\" id=\"page_{}\">", page.number()));
        for element in &page.elements {
            match element {
                Element::Text(text) => self.render_text(out, text),
                Element::Image(asset) | Element::Vector(asset) => self.render_asset(out, asset),
            }
        }
        out.push_str("</div><div style=\"page-break-after: always;\"></div>");
    }

    fn render_text(&self, out: &mut String, text: &TextElement) {
        let content = escape_html(&text.content).replace('\n', "<br>");
        out.push_str(&format!(
            "<p style=\"font-size:{:.1}px; font-family:{};\">{}</p>",
            text.font_size,
            escape_attribute(&self.options.font_family),
            content
        ));
    }

    fn render_asset(&self, out: &mut String, asset: &AssetElement) {
        out.push_str(&format!(
            "<img src=\"{}{}\" alt=\"{}\"><br>",
            escape_html(&self.options.asset_prefix),
            escape_html(&asset.filename),
            escape_html(&asset.filename)
        ));
    }
}

/// Render a document to HTML with default options.
pub fn to_html(doc: &Document) -> String {
    HtmlRenderer::default().render(doc)
}

/// Render a document with default options and write it to `path`.
pub fn write_html(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    HtmlRenderer::default().write(doc, path)
}

/// Escape a double-quoted attribute value; single quotes stay literal.
fn escape_attribute(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape HTML special characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
