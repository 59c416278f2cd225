//! Tabular export — one header line and one data line, comma-delimited.
//!
//! The column order is the declared field order with a synthetic
//! leading `Record` column for the record number. Every value is
//! double-quoted with embedded quotes doubled, so free text containing
//! commas, quotes, or newlines survives round trips through spreadsheet
//! tools. Headers are written bare.

use crate::record::{Field, FieldValue, FormRecord};

use super::ExportError;

/// Render the full record snapshot as CSV text.
///
/// Exports are unconditional: a conditionally hidden field still gets
/// its column so every export has the same shape. An unanswered
/// tri-state renders as the token `unanswered`, distinguishable from
/// empty text.
pub fn serialize(record_number: i64, record: &FormRecord) -> Result<String, ExportError> {
    let mut headers = Vec::with_capacity(Field::ALL.len() + 1);
    let mut values = Vec::with_capacity(Field::ALL.len() + 1);

    headers.push("Record".to_string());
    values.push(quote(&record_number.to_string()));

    for field in Field::ALL {
        headers.push(field.key().to_string());
        let raw = match record.get(field) {
            FieldValue::Text(text) => text,
            FieldValue::Answer(answer) => answer.as_token().to_string(),
        };
        values.push(quote(&raw));
    }

    if headers.len() != values.len() {
        return Err(ExportError::ColumnMismatch {
            headers: headers.len(),
            values: values.len(),
        });
    }

    Ok(format!("{}\n{}", headers.join(","), values.join(",")))
}

/// Wrap in double quotes, doubling embedded quotes.
fn quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TriState;

    /// Split a quoted CSV line back into raw column values.
    fn split_columns(line: &str) -> Vec<String> {
        let mut columns = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    chars.next();
                    current.push('"');
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => columns.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        columns.push(current);
        columns
    }

    #[test]
    fn two_lines_same_column_count() {
        let csv = serialize(712, &FormRecord::new()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);

        let headers: Vec<&str> = lines[0].split(',').collect();
        let values = split_columns(lines[1]);
        assert_eq!(headers.len(), values.len());
        assert_eq!(headers.len(), Field::ALL.len() + 1);
    }

    #[test]
    fn header_order_is_declared_order() {
        let csv = serialize(712, &FormRecord::new()).unwrap();
        let header_line = csv.lines().next().unwrap();
        let mut expected = vec!["Record"];
        expected.extend(Field::ALL.iter().map(|f| f.key()));
        assert_eq!(header_line, expected.join(","));
    }

    #[test]
    fn record_number_is_first_value() {
        let csv = serialize(930, &FormRecord::new()).unwrap();
        let data_line = csv.lines().nth(1).unwrap();
        assert!(data_line.starts_with("\"930\","));
    }

    #[test]
    fn embedded_quotes_and_commas_survive() {
        let mut record = FormRecord::new();
        record.set_text(Field::IntubationIssues, "difficult view, \"grade 3\"");
        record.set_text(Field::EmsAgency, "North Memorial, Station 14");

        let csv = serialize(712, &record).unwrap();
        let values = split_columns(csv.lines().nth(1).unwrap());

        let agency_col = 1 + Field::ALL
            .iter()
            .position(|&f| f == Field::EmsAgency)
            .unwrap();
        let issues_col = 1 + Field::ALL
            .iter()
            .position(|&f| f == Field::IntubationIssues)
            .unwrap();
        assert_eq!(values[agency_col], "North Memorial, Station 14");
        assert_eq!(values[issues_col], "difficult view, \"grade 3\"");
    }

    #[test]
    fn unanswered_distinct_from_empty_text() {
        let csv = serialize(712, &FormRecord::new()).unwrap();
        let values = split_columns(csv.lines().nth(1).unwrap());

        let witnessed_col = 1 + Field::ALL
            .iter()
            .position(|&f| f == Field::WitnessedArrest)
            .unwrap();
        let agency_col = 1 + Field::ALL
            .iter()
            .position(|&f| f == Field::EmsAgency)
            .unwrap();
        assert_eq!(values[witnessed_col], "unanswered");
        assert_eq!(values[agency_col], "");
    }

    #[test]
    fn answered_tristates_render_plain_bool_tokens() {
        let mut record = FormRecord::new();
        record.set_answer(Field::BystanderCpr, TriState::Yes);
        record.set_answer(Field::LucasOn, TriState::No);

        let csv = serialize(712, &record).unwrap();
        let values = split_columns(csv.lines().nth(1).unwrap());

        let bys_col = 1 + Field::ALL
            .iter()
            .position(|&f| f == Field::BystanderCpr)
            .unwrap();
        let lucas_col = 1 + Field::ALL
            .iter()
            .position(|&f| f == Field::LucasOn)
            .unwrap();
        assert_eq!(values[bys_col], "true");
        assert_eq!(values[lucas_col], "false");
    }

    #[test]
    fn hidden_conditional_fields_still_have_columns() {
        // Parent unanswered, child holds a stale value: the column is
        // still exported (tabular output is the full record).
        let mut record = FormRecord::new();
        record.set_text(Field::BysCprStart, "14:32");

        let csv = serialize(712, &record).unwrap();
        let values = split_columns(csv.lines().nth(1).unwrap());
        assert_eq!(values.len(), Field::ALL.len() + 1);

        let col = 1 + Field::ALL
            .iter()
            .position(|&f| f == Field::BysCprStart)
            .unwrap();
        assert_eq!(values[col], "14:32");
    }

    #[test]
    fn serialization_is_deterministic() {
        let mut record = FormRecord::new();
        record.set_text(Field::EmsAgency, "Allina");
        record.set_answer(Field::WitnessedArrest, TriState::Yes);

        let first = serialize(712, &record).unwrap();
        let second = serialize(712, &record).unwrap();
        assert_eq!(first, second);
    }
}
