//! Relevance policy for conditional fields.
//!
//! One pure function decides which fields currently apply: a field with
//! a declared parent is relevant iff the parent's answer is exactly
//! `Yes`; everything else is always relevant. The document serializer
//! and any interactive layer must both call this — never re-derive the
//! rule locally.

use crate::record::{Field, FormRecord, TriState};

/// Is `field` currently relevant for `record`?
///
/// A stored child value does not make the child relevant; only the
/// parent's answer does. Unanswered parents behave like `No`.
pub fn is_relevant(record: &FormRecord, field: Field) -> bool {
    match field.parent() {
        Some(parent) => record.answer(parent) == Some(TriState::Yes),
        None => true,
    }
}

/// All currently relevant fields, in declared order.
pub fn relevant_fields(record: &FormRecord) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|&field| is_relevant(record, field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parentless_fields_always_relevant() {
        let record = FormRecord::new();
        assert!(is_relevant(&record, Field::EmsAgency));
        assert!(is_relevant(&record, Field::WitnessedArrest));
        assert!(is_relevant(&record, Field::DoseEpinephrine));
    }

    #[test]
    fn child_irrelevant_while_parent_unanswered() {
        let record = FormRecord::new();
        assert!(!is_relevant(&record, Field::BysCprStart));
        assert!(!is_relevant(&record, Field::CrewNamesPhones));
        assert!(!is_relevant(&record, Field::AedShocksNumber));
    }

    #[test]
    fn child_irrelevant_while_parent_no() {
        let mut record = FormRecord::new();
        record.set_answer(Field::BystanderCpr, TriState::No);
        assert!(!is_relevant(&record, Field::BysCprStart));
    }

    #[test]
    fn child_relevant_only_on_exact_yes() {
        let mut record = FormRecord::new();
        record.set_answer(Field::BystanderCpr, TriState::Yes);
        assert!(is_relevant(&record, Field::BysCprStart));

        record.set_answer(Field::BystanderCpr, TriState::Unanswered);
        assert!(!is_relevant(&record, Field::BysCprStart));
    }

    #[test]
    fn stored_child_value_does_not_create_relevance() {
        let mut record = FormRecord::new();
        record.set_text(Field::AedShocksNumber, "3");
        assert!(!is_relevant(&record, Field::AedShocksNumber));
    }

    #[test]
    fn relevant_fields_on_empty_record() {
        let record = FormRecord::new();
        let relevant = relevant_fields(&record);
        // All five conditional fields are hidden on an empty record.
        assert_eq!(relevant.len(), Field::ALL.len() - 5);
        assert!(!relevant.contains(&Field::BysCprStart));
        assert!(!relevant.contains(&Field::FollowUpEmail));
    }

    #[test]
    fn relevant_fields_preserve_declared_order() {
        let mut record = FormRecord::new();
        record.set_answer(Field::WantFollowUp, TriState::Yes);
        record.set_answer(Field::BystanderCpr, TriState::Yes);
        record.set_answer(Field::FirstResponderCpr, TriState::Yes);
        record.set_answer(Field::AedShocksPrior, TriState::Yes);

        let relevant = relevant_fields(&record);
        assert_eq!(relevant, Field::ALL.to_vec());
    }
}
