//! Document export — the record as a paginated, labeled PDF.
//!
//! Composition is split from painting the way the tabular side splits
//! assembly from quoting: `build_document` produces a pure
//! `DocumentView` (title block + sections of label/value lines, already
//! filtered through the visibility policy), and `render` paints it with
//! `printpdf`. A skipped conditional field consumes no vertical space —
//! document length varies with how complete the record is.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::io::BufWriter;

use crate::config::DOCUMENT_TITLE;
use crate::record::{FieldValue, FormRecord, Section, TriState};
use crate::visibility;

use super::ExportError;

// ─── Document view (pure) ─────────────────────────────────────────────────────

/// Fully composed document: everything the paint layer needs, nothing
/// it has to decide.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    pub title: String,
    pub record_number: i64,
    /// Present only while follow-up contact is requested.
    pub follow_up_email: Option<String>,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub title: &'static str,
    pub lines: Vec<FieldLine>,
}

/// One printed field: bold label, plain value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLine {
    pub label: &'static str,
    pub value: String,
}

/// Compose the document for a record snapshot.
///
/// Only fields the visibility policy marks relevant are included; an
/// answered tri-state prints `Yes`/`No`, an unanswered one prints `—`.
pub fn build_document(record_number: i64, record: &FormRecord) -> DocumentView {
    let sections = Section::ALL
        .into_iter()
        .map(|section| SectionView {
            title: section.title(),
            lines: section
                .document_fields()
                .iter()
                .filter(|&&field| visibility::is_relevant(record, field))
                .map(|&field| FieldLine {
                    label: field.label(),
                    value: match record.get(field) {
                        FieldValue::Text(text) => text,
                        FieldValue::Answer(answer) => answer.yes_no().to_string(),
                    },
                })
                .collect(),
        })
        .collect();

    DocumentView {
        title: DOCUMENT_TITLE.to_string(),
        record_number,
        follow_up_email: record
            .want_follow_up
            .is_yes()
            .then(|| record.follow_up_email.clone()),
        sections,
    }
}

/// Render the record snapshot as PDF bytes.
pub fn serialize(record_number: i64, record: &FormRecord) -> Result<Vec<u8>, ExportError> {
    render(&build_document(record_number, record))
}

// ─── Paint layer ──────────────────────────────────────────────────────────────

/// Descending y-cursor over US-letter pages. Starts a fresh page when
/// the cursor runs past the bottom margin; section code never thinks
/// about page breaks.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl PageCursor<'_> {
    fn advance(&mut self, step: Mm) {
        self.y -= step;
        if self.y.0 < 18.0 {
            let (page, layer) = self.doc.add_page(Mm(215.9), Mm(279.4), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = Mm(262.0);
        }
    }
}

/// Paint a composed document with builtin Helvetica faces.
pub fn render(view: &DocumentView) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) = PdfDocument::new(&view.title, Mm(215.9), Mm(279.4), "Layer 1");
    let regular = add_font(&doc, BuiltinFont::Helvetica)?;
    let bold = add_font(&doc, BuiltinFont::HelveticaBold)?;

    {
        let mut cursor = PageCursor {
            layer: doc.get_page(page1).get_layer(layer1),
            doc: &doc,
            y: Mm(262.0),
        };

        // Title block
        cursor
            .layer
            .use_text(&view.title, 16.0, Mm(20.0), cursor.y, &bold);
        cursor.advance(Mm(8.0));
        cursor.layer.use_text(
            format!("Record #: {}", view.record_number),
            10.0,
            Mm(20.0),
            cursor.y,
            &regular,
        );
        cursor.advance(Mm(6.0));
        if let Some(email) = &view.follow_up_email {
            cursor.layer.use_text(
                format!("Follow-up email: {email}"),
                10.0,
                Mm(20.0),
                cursor.y,
                &regular,
            );
            cursor.advance(Mm(6.0));
        }
        cursor.advance(Mm(4.0));

        for section in &view.sections {
            cursor
                .layer
                .use_text(section.title, 11.0, Mm(20.0), cursor.y, &bold);
            cursor.advance(Mm(7.0));

            for line in &section.lines {
                cursor
                    .layer
                    .use_text(line.label, 10.0, Mm(20.0), cursor.y, &bold);
                for chunk in wrap_text(&line.value, 55) {
                    cursor
                        .layer
                        .use_text(&chunk, 10.0, Mm(95.0), cursor.y, &regular);
                    cursor.advance(Mm(6.35));
                }
            }
            cursor.advance(Mm(3.0));
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("PDF buffer error: {e}")))
}

fn add_font(
    doc: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, ExportError> {
    doc.add_builtin_font(font)
        .map_err(|e| ExportError::Pdf(format!("PDF font error: {e}")))
}

/// Simple word-wrap helper for PDF text rendering. Always yields at
/// least one chunk so an empty value still advances the cursor.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    fn all_lines(view: &DocumentView) -> Vec<&FieldLine> {
        view.sections.iter().flat_map(|s| &s.lines).collect()
    }

    fn find_line<'a>(view: &'a DocumentView, label: &str) -> Option<&'a FieldLine> {
        all_lines(view).into_iter().find(|l| l.label == label)
    }

    #[test]
    fn title_block_carries_fixed_title_and_number() {
        let view = build_document(712, &FormRecord::new());
        assert_eq!(view.title, DOCUMENT_TITLE);
        assert_eq!(view.record_number, 712);
        assert!(view.follow_up_email.is_none());
    }

    #[test]
    fn follow_up_email_line_only_when_requested() {
        let mut record = FormRecord::new();
        record.set_text(Field::FollowUpEmail, "ecmodata@umn.edu");
        let view = build_document(712, &record);
        assert!(view.follow_up_email.is_none());

        record.set_answer(Field::WantFollowUp, TriState::Yes);
        let view = build_document(712, &record);
        assert_eq!(view.follow_up_email.as_deref(), Some("ecmodata@umn.edu"));
    }

    #[test]
    fn five_sections_in_fixed_order() {
        let view = build_document(712, &FormRecord::new());
        let titles: Vec<&str> = view.sections.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec![
                "EMS & Crew",
                "Arrest & CPR Details",
                "EMS TIMES",
                "Resuscitation Details",
                "Medication Doses (EMS / First Responders)",
            ]
        );
    }

    #[test]
    fn child_label_absent_unless_parent_yes() {
        let mut record = FormRecord::new();
        record.set_text(Field::BysCprStart, "14:32");
        let view = build_document(5, &record);
        assert!(find_line(&view, "Bystander CPR start time").is_none());

        record.set_answer(Field::BystanderCpr, TriState::No);
        let view = build_document(5, &record);
        assert!(find_line(&view, "Bystander CPR start time").is_none());
    }

    #[test]
    fn child_label_and_value_present_when_parent_yes() {
        let mut record = FormRecord::new();
        record.set_answer(Field::BystanderCpr, TriState::Yes);
        record.set_text(Field::BysCprStart, "14:32");

        let view = build_document(5, &record);
        let line = find_line(&view, "Bystander CPR start time").unwrap();
        assert_eq!(line.value, "14:32");
    }

    #[test]
    fn tristate_values_render_yes_no_dash() {
        let mut record = FormRecord::new();
        record.set_answer(Field::WitnessedArrest, TriState::Yes);
        record.set_answer(Field::LucasOn, TriState::No);

        let view = build_document(712, &record);
        assert_eq!(find_line(&view, "Witnessed Arrest?").unwrap().value, "Yes");
        assert_eq!(find_line(&view, "LUCAS on?").unwrap().value, "No");
        assert_eq!(find_line(&view, "ResQPOD?").unwrap().value, "—");
    }

    #[test]
    fn empty_text_renders_blank_not_dash() {
        let view = build_document(712, &FormRecord::new());
        assert_eq!(find_line(&view, "Transporting EMS agency").unwrap().value, "");
    }

    #[test]
    fn skipped_fields_consume_no_lines() {
        let empty = build_document(712, &FormRecord::new());
        let baseline = all_lines(&empty).len();

        let mut record = FormRecord::new();
        record.set_answer(Field::AedShocksPrior, TriState::Yes);
        let with_child = build_document(712, &record);
        assert_eq!(all_lines(&with_child).len(), baseline + 1);
    }

    #[test]
    fn printed_fields_match_visibility_policy() {
        // The document must print exactly the relevant document fields —
        // any divergence from the shared policy is a bug.
        let mut record = FormRecord::new();
        record.set_answer(Field::WantFollowUp, TriState::Yes);
        record.set_answer(Field::FirstResponderCpr, TriState::Yes);

        let view = build_document(712, &record);
        for section in Section::ALL {
            let expected: Vec<&str> = section
                .document_fields()
                .iter()
                .filter(|&&f| visibility::is_relevant(&record, f))
                .map(|&f| f.label())
                .collect();
            let printed: Vec<&str> = view
                .sections
                .iter()
                .find(|s| s.title == section.title())
                .unwrap()
                .lines
                .iter()
                .map(|l| l.label)
                .collect();
            assert_eq!(printed, expected, "{}", section.title());
        }
    }

    #[test]
    fn composition_is_deterministic() {
        let mut record = FormRecord::new();
        record.set_answer(Field::BystanderCpr, TriState::Yes);
        record.set_text(Field::BysCprStart, "09:41");

        assert_eq!(build_document(7, &record), build_document(7, &record));
    }

    #[test]
    fn render_produces_pdf_bytes() {
        let mut record = FormRecord::new();
        record.set_text(Field::EmsAgency, "Hennepin EMS");
        record.set_answer(Field::WitnessedArrest, TriState::Yes);

        let bytes = serialize(712, &record).unwrap();
        assert!(!bytes.is_empty());
        // PDF magic bytes: %PDF
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn render_handles_long_values_and_page_breaks() {
        let mut record = FormRecord::new();
        record.set_answer(Field::WantFollowUp, TriState::Yes);
        record.set_answer(Field::BystanderCpr, TriState::Yes);
        record.set_answer(Field::FirstResponderCpr, TriState::Yes);
        record.set_answer(Field::AedShocksPrior, TriState::Yes);
        record.set_text(
            Field::IntubationIssues,
            "difficult airway with repeated attempts ".repeat(20),
        );

        let bytes = serialize(713, &record).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn wrap_text_splits_long_lines() {
        let text = "a long sentence that should wrap at around forty characters or so";
        let lines = wrap_text(text, 40);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= 45);
        }
    }

    #[test]
    fn wrap_text_empty_still_yields_one_chunk() {
        assert_eq!(wrap_text("", 40), vec![String::new()]);
    }
}
