use chrono::Local;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Rect, Rgb,
};
use std::io::BufWriter;
use tracing::warn;

use crate::config::{ReportStyle, Section};
use crate::error::AuditError;
use crate::models::{
    ActionPlan, AnalysisResult, BusinessProfile, DetailItem, Horizon, RenderedReport,
    MIN_REPORT_BYTES,
};
use crate::text::{normalize, slugify};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 15.0;
const MARGIN_TOP: f32 = 15.0;
const MARGIN_BOTTOM: f32 = 18.0;

const GAUGE_WIDTH: f32 = 120.0;
const GAUGE_HEIGHT: f32 = 6.0;

/// Written instead of text that normalizes to nothing, so a glyph problem
/// degrades one line instead of aborting the document.
const PLACEHOLDER: &str = "contenu indisponible";

const TITLE: &str = "Rapport d'Audit de Visibilité Locale";

/// Everything one report needs; borrowed for the duration of a render.
pub struct ReportData<'a> {
    pub profile: &'a BusinessProfile,
    pub analysis: &'a AnalysisResult,
    pub plan: &'a ActionPlan,
}

/// Paginated PDF builder. One engine, presentation policy injected through
/// [`ReportStyle`]: accent color, bullet glyph, section order and the text
/// budgets all come from configuration.
pub struct ReportEngine {
    style: ReportStyle,
}

impl ReportEngine {
    pub fn new(style: ReportStyle) -> Self {
        Self { style }
    }

    /// Render the full document and verify the output against the
    /// corruption threshold. Below-threshold output is an error, not a
    /// silently accepted empty document.
    pub fn render(&self, data: &ReportData) -> Result<RenderedReport, AuditError> {
        let mut canvas = Canvas::new(&self.style)?;

        for section in &self.style.sections {
            match section {
                Section::Company => canvas.company_block(data.profile),
                Section::Score => canvas.score_block(data.analysis),
                Section::Strengths => canvas.bullet_section(
                    "Forces",
                    (34, 139, 34),
                    &data.analysis.strengths,
                    "Aucune force détectée.",
                ),
                Section::Weaknesses => canvas.bullet_section(
                    "Faiblesses",
                    (178, 34, 34),
                    &data.analysis.weaknesses,
                    "Aucune faiblesse détectée.",
                ),
                Section::Plan => canvas.plan_block(data.plan),
            }
        }

        let bytes = canvas.finish()?;
        verify_report_bytes(&bytes)?;

        Ok(RenderedReport {
            bytes,
            filename: report_filename(&data.profile.name),
        })
    }
}

/// `audit_<slugified-name, max 50 chars>_<YYYYMMDD_HHMMSS>.pdf`
pub fn report_filename(business_name: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("audit_{}_{}.pdf", slugify(business_name, 50), timestamp)
}

/// Reject documents below the corruption threshold.
pub fn verify_report_bytes(bytes: &[u8]) -> Result<(), AuditError> {
    if bytes.len() <= MIN_REPORT_BYTES {
        return Err(AuditError::RenderFailed(format!(
            "document is {} bytes, below the {} byte integrity threshold",
            bytes.len(),
            MIN_REPORT_BYTES
        )));
    }
    Ok(())
}

/// Mutable page state: the document, the current page/layer, a vertical
/// cursor measured from the top edge, and the page counter for footers.
struct Canvas<'s> {
    style: &'s ReportStyle,
    doc: PdfDocumentReference,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    cursor: f32,
    page_no: usize,
}

impl<'s> Canvas<'s> {
    fn new(style: &'s ReportStyle) -> Result<Self, AuditError> {
        let (doc, page, layer) =
            printpdf::PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

        let regular = add_font(&doc, BuiltinFont::Helvetica)?;
        let bold = add_font(&doc, BuiltinFont::HelveticaBold)?;
        let oblique = add_font(&doc, BuiltinFont::HelveticaOblique)?;

        let mut canvas = Self {
            style,
            doc,
            page,
            layer,
            regular,
            bold,
            oblique,
            cursor: MARGIN_TOP,
            page_no: 1,
        };
        canvas.page_header();
        canvas.page_footer();
        Ok(canvas)
    }

    fn finish(self) -> Result<Vec<u8>, AuditError> {
        let mut buffer = Vec::new();
        {
            let mut writer = BufWriter::new(&mut buffer);
            self.doc
                .save(&mut writer)
                .map_err(|e| AuditError::RenderFailed(e.to_string()))?;
        }
        Ok(buffer)
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    /// Start a new page and re-render the running header whenever the next
    /// block would cross the bottom margin.
    fn ensure_space(&mut self, needed: f32) {
        if self.cursor + needed <= PAGE_HEIGHT - MARGIN_BOTTOM {
            return;
        }
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.page_no + 1),
        );
        self.page = page;
        self.layer = layer;
        self.page_no += 1;
        self.cursor = MARGIN_TOP;
        self.page_header();
        self.page_footer();
    }

    fn page_header(&mut self) {
        let accent = self.style.accent;
        let title_size = 16.0;
        let x = centered_x(TITLE, title_size);
        let layer = self.layer();
        layer.set_fill_color(rgb(accent[0], accent[1], accent[2]));
        layer.use_text(
            TITLE,
            title_size,
            Mm(x),
            Mm(PAGE_HEIGHT - self.cursor - 6.0),
            &self.bold,
        );
        self.cursor += 14.0;
    }

    fn page_footer(&self) {
        let label = format!("Page {}", self.page_no);
        let layer = self.layer();
        layer.set_fill_color(rgb(128, 128, 128));
        layer.use_text(
            label,
            9.0,
            Mm(PAGE_WIDTH - MARGIN_RIGHT - 15.0),
            Mm(10.0),
            &self.regular,
        );
    }

    /// Safe single-line primitive: re-normalizes, truncates overlong text
    /// with an ellipsis marker, and falls back to a placeholder when the
    /// text has no renderable characters left.
    fn line(&mut self, text: &str, size: f32, font: Font, color: (u8, u8, u8), indent: f32) {
        let height = line_height(size);
        self.ensure_space(height);

        let mut safe = normalize(text).replace('\n', " ");
        if safe.trim().is_empty() && !text.trim().is_empty() {
            warn!("line collapsed during normalization, writing placeholder");
            safe = PLACEHOLDER.to_string();
        }
        if safe.chars().count() > self.style.max_line {
            safe = safe
                .chars()
                .take(self.style.max_line.saturating_sub(3))
                .collect();
            safe.push_str("...");
        }

        if !safe.trim().is_empty() {
            let font = match font {
                Font::Regular => &self.regular,
                Font::Bold => &self.bold,
                Font::Oblique => &self.oblique,
            };
            let layer = self.layer();
            layer.set_fill_color(rgb(color.0, color.1, color.2));
            layer.use_text(
                safe,
                size,
                Mm(MARGIN_LEFT + indent),
                Mm(PAGE_HEIGHT - self.cursor - height * 0.75),
                font,
            );
        }
        self.cursor += height;
    }

    /// Greedy word wrap: append whole words while the line stays under the
    /// configured character budget, flush on overflow and continue with the
    /// overflowing word.
    fn wrapped(&mut self, text: &str, size: f32, font: Font, color: (u8, u8, u8), indent: f32) {
        let budget = self.style.wrap_width.saturating_sub(indent as usize);
        let budget = budget.max(16);

        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate_len = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if candidate_len > budget && !current.is_empty() {
                self.line(&current, size, font, color, indent);
                current = word.to_string();
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            self.line(&current, size, font, color, indent);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.cursor += mm;
    }

    fn section_title(&mut self, title: &str, color: (u8, u8, u8)) {
        self.ensure_space(line_height(14.0) + 3.0);
        self.line(title, 14.0, Font::Bold, color, 0.0);
        self.gap(2.0);
    }

    fn company_block(&mut self, profile: &BusinessProfile) {
        self.line(&profile.name, 14.0, Font::Bold, (0, 0, 0), 0.0);
        if !profile.address.is_empty() {
            self.line(&profile.address, 11.0, Font::Regular, (0, 0, 0), 0.0);
        }
        if let Some(website) = &profile.website {
            self.line(website, 11.0, Font::Regular, (0, 0, 0), 0.0);
        }
        if let Some(phone) = &profile.phone {
            self.line(phone, 11.0, Font::Regular, (0, 0, 0), 0.0);
        }
        if let Some(category) = &profile.category {
            self.line(category, 11.0, Font::Regular, (90, 90, 90), 0.0);
        }
        let reviews = format!(
            "Note : {:.1}/5 - {} avis",
            profile.rating, profile.review_count
        );
        self.line(&reviews, 11.0, Font::Regular, (90, 90, 90), 0.0);
        self.gap(4.0);
    }

    /// Numeric gauge: headline score, then a proportional bar colored by
    /// tier. The tiering is presentation only and never feeds back into the
    /// score itself.
    fn score_block(&mut self, analysis: &AnalysisResult) {
        let tier = score_tier(analysis.score);
        let headline = format!("Score Audit : {}/100", analysis.score);
        self.ensure_space(line_height(18.0) + GAUGE_HEIGHT + 8.0);
        self.line(&headline, 18.0, Font::Bold, tier, 0.0);
        self.gap(2.0);

        // Track, then proportional fill.
        let top = self.cursor;
        self.draw_bar(MARGIN_LEFT, top, GAUGE_WIDTH, (230, 230, 230));
        let fill = GAUGE_WIDTH * f32::from(analysis.score) / 100.0;
        if fill > 0.0 {
            self.draw_bar(MARGIN_LEFT, top, fill, tier);
        }
        self.cursor += GAUGE_HEIGHT + 4.0;

        if let Some(message) = &analysis.message {
            self.wrapped(message, 12.0, Font::Oblique, (128, 128, 128), 0.0);
            self.gap(2.0);
        }
        self.gap(3.0);
    }

    fn draw_bar(&self, x: f32, top: f32, width: f32, color: (u8, u8, u8)) {
        let layer = self.layer();
        layer.set_fill_color(rgb(color.0, color.1, color.2));
        let rect = Rect::new(
            Mm(x),
            Mm(PAGE_HEIGHT - top - GAUGE_HEIGHT),
            Mm(x + width),
            Mm(PAGE_HEIGHT - top),
        )
        .with_mode(PaintMode::Fill);
        layer.add_rect(rect);
    }

    fn bullet_section(
        &mut self,
        title: &str,
        color: (u8, u8, u8),
        items: &[DetailItem],
        empty_label: &str,
    ) {
        self.section_title(title, color);
        if items.is_empty() {
            self.line(empty_label, 12.0, Font::Oblique, (128, 128, 128), 2.0);
        } else {
            self.bullet_list(items);
        }
        self.gap(5.0);
    }

    fn bullet_list(&mut self, items: &[DetailItem]) {
        for item in items {
            let bullet = format!("{} {}", self.style.bullet, item.title);
            self.line(&bullet, 12.0, Font::Bold, (0, 0, 0), 2.0);
            if !item.description.is_empty() {
                self.wrapped(&item.description, 11.0, Font::Regular, (0, 0, 0), 6.0);
            }
            self.gap(1.0);
        }
    }

    fn plan_block(&mut self, plan: &ActionPlan) {
        self.section_title("Recommandations stratégiques", (218, 165, 32));

        for horizon in [Horizon::ShortTerm, Horizon::MidTerm, Horizon::LongTerm] {
            let items = match horizon {
                Horizon::ShortTerm => &plan.short_term,
                Horizon::MidTerm => &plan.mid_term,
                Horizon::LongTerm => &plan.long_term,
            };

            self.ensure_space(line_height(13.0) + line_height(12.0));
            self.line(horizon.label(), 13.0, Font::Bold, (184, 134, 11), 0.0);
            if items.is_empty() {
                self.line(
                    "Aucune recommandation.",
                    12.0,
                    Font::Oblique,
                    (128, 128, 128),
                    2.0,
                );
            } else {
                self.bullet_list(items);
            }
            self.gap(4.0);
        }
    }
}

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Oblique,
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, AuditError> {
    doc.add_builtin_font(font)
        .map_err(|e| AuditError::RenderFailed(e.to_string()))
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn line_height(size: f32) -> f32 {
    size * 0.45
}

/// Rough centering for the builtin Helvetica: average glyph width is about
/// half the font size.
fn centered_x(text: &str, size: f32) -> f32 {
    let text_width = text.chars().count() as f32 * size * 0.5 * 0.3528;
    ((PAGE_WIDTH - text_width) / 2.0).max(MARGIN_LEFT)
}

/// Three fixed presentation bands for the score gauge.
fn score_tier(score: u8) -> (u8, u8, u8) {
    if score >= 70 {
        (34, 139, 34)
    } else if score >= 50 {
        (218, 165, 32)
    } else {
        (178, 34, 34)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_bands() {
        assert_eq!(score_tier(100), (34, 139, 34));
        assert_eq!(score_tier(70), (34, 139, 34));
        assert_eq!(score_tier(69), (218, 165, 32));
        assert_eq!(score_tier(50), (218, 165, 32));
        assert_eq!(score_tier(49), (178, 34, 34));
        assert_eq!(score_tier(0), (178, 34, 34));
    }

    #[test]
    fn filename_convention() {
        let name = report_filename("Café de l'Église");
        assert!(name.starts_with("audit_Cafe_de_l_Eglise_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn undersized_output_is_rejected() {
        let err = verify_report_bytes(&[0u8; 100]).unwrap_err();
        assert!(matches!(err, AuditError::RenderFailed(_)));
        assert!(verify_report_bytes(&vec![0u8; MIN_REPORT_BYTES + 1]).is_ok());
    }
}
