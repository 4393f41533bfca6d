use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use tracing::debug;

use super::ReportError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const FOOTER_Y: f32 = 10.0;
const LAYER_NAME: &str = "contenu";

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.5;
const WRAP_COLUMNS: usize = 95;
const LABEL_OFFSET: f32 = 62.0;

/// Sequential A4 layout: every call writes below the previous one and opens a new page
/// when the bottom margin is reached.
pub(crate) struct ReportWriter {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    cursor: f32,
    pages: usize,
}

impl ReportWriter {
    pub(crate) fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| ReportError::Render(err.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| ReportError::Render(err.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        let writer = Self {
            doc,
            regular,
            bold,
            layer,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        };
        writer.footer();
        Ok(writer)
    }

    #[cfg(test)]
    pub(crate) fn pages(&self) -> usize {
        self.pages
    }

    pub(crate) fn title(&mut self, text: &str) {
        self.ensure_space(TITLE_SIZE * 0.6);
        self.layer
            .use_text(text, TITLE_SIZE, Mm(MARGIN), Mm(self.cursor), &self.bold);
        self.cursor -= TITLE_SIZE * 0.6;
    }

    pub(crate) fn subtitle(&mut self, text: &str) {
        self.line(text);
        self.spacer(2.0);
    }

    pub(crate) fn heading(&mut self, text: &str) {
        self.spacer(3.0);
        self.ensure_space(HEADING_SIZE * 0.5 + LINE_HEIGHT * 2.0);
        self.layer
            .use_text(text, HEADING_SIZE, Mm(MARGIN), Mm(self.cursor), &self.bold);
        self.cursor -= HEADING_SIZE * 0.55;
    }

    /// `label: value` on one line, the value wrapping under itself when long.
    pub(crate) fn field(&mut self, label: &str, value: &str) {
        let columns = WRAP_COLUMNS - 30;
        let lines = wrap(value, columns);
        self.ensure_space(LINE_HEIGHT);
        self.layer.use_text(
            format!("{label} :"),
            BODY_SIZE,
            Mm(MARGIN),
            Mm(self.cursor),
            &self.bold,
        );
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                self.ensure_space(LINE_HEIGHT);
            }
            self.layer.use_text(
                line.as_str(),
                BODY_SIZE,
                Mm(LABEL_OFFSET),
                Mm(self.cursor),
                &self.regular,
            );
            self.cursor -= LINE_HEIGHT;
        }
        if lines.is_empty() {
            self.cursor -= LINE_HEIGHT;
        }
    }

    /// Skips the field entirely when the value is missing.
    pub(crate) fn optional_field(&mut self, label: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.field(label, value);
        }
    }

    pub(crate) fn paragraph(&mut self, text: &str) {
        for line in wrap(text, WRAP_COLUMNS) {
            self.line(&line);
        }
    }

    pub(crate) fn row(&mut self, cells: &[(f32, &str)], bold: bool) {
        self.ensure_space(LINE_HEIGHT);
        let font = if bold { &self.bold } else { &self.regular };
        for (offset, text) in cells {
            self.layer
                .use_text(*text, BODY_SIZE, Mm(MARGIN + offset), Mm(self.cursor), font);
        }
        self.cursor -= LINE_HEIGHT;
    }

    pub(crate) fn spacer(&mut self, height: f32) {
        self.cursor -= height;
    }

    pub(crate) fn finish(self) -> Result<Vec<u8>, ReportError> {
        debug!(pages = self.pages, "report rendered");
        self.doc
            .save_to_bytes()
            .map_err(|err| ReportError::Render(err.to_string()))
    }

    fn line(&mut self, text: &str) {
        self.ensure_space(LINE_HEIGHT);
        self.layer
            .use_text(text, BODY_SIZE, Mm(MARGIN), Mm(self.cursor), &self.regular);
        self.cursor -= LINE_HEIGHT;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.cursor - needed < MARGIN {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
        self.footer();
    }

    fn footer(&self) {
        self.layer.use_text(
            format!("Page {}", self.pages),
            8.0,
            Mm(PAGE_WIDTH - MARGIN - 12.0),
            Mm(FOOTER_Y),
            &self.regular,
        );
    }
}

/// Greedy word wrap on character count.
pub(crate) fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = current.chars().count() + word.chars().count() + 1;
            if !current.is_empty() && needed > columns {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}
