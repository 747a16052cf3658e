//! # Label Matcher
//!
//! Best-effort keyword matching of an image label against the condition table.

use crate::types::ConditionRecord;

/// Returns every record with at least one image keyword contained in `label`.
///
/// Matching is a plain, case-sensitive substring test of each keyword inside the
/// label (never the reverse). Blank keywords are ignored. The result keeps the
/// order of `records`.
pub fn match_label(label: &str, records: &[ConditionRecord]) -> Vec<ConditionRecord> {
    records
        .iter()
        .filter(|record| record.image_keywords().any(|keyword| label.contains(keyword)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, labels: &str) -> ConditionRecord {
        ConditionRecord {
            id,
            disease_name: format!("condition-{id}"),
            image_labels: labels.to_string(),
            text_symptoms: String::new(),
            warning_level: "주의 🟡".to_string(),
            advice: String::new(),
        }
    }

    #[test]
    fn keyword_inside_longer_label_matches() {
        let records = vec![record(1, "피부 발진,붉은 반점,탈모")];
        let matched = match_label("배 부분에 피부 발진이 넓게 퍼져 있음", &records);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, 1);
    }

    #[test]
    fn unrelated_label_matches_nothing() {
        let records = vec![record(1, "피부 발진,붉은 반점,탈모")];
        assert!(match_label("정상", &records).is_empty());
    }

    #[test]
    fn containment_is_not_reversed() {
        // The label is a substring of a keyword, which must not count.
        let records = vec![record(1, "하얀 동공")];
        assert!(match_label("동공", &records).is_empty());
    }

    #[test]
    fn blank_keywords_never_match_everything() {
        let records = vec![record(1, " , ,"), record(2, "눈곱")];
        let matched = match_label("아무 라벨", &records);
        assert!(matched.is_empty());
    }

    #[test]
    fn preserves_store_order_for_multiple_hits() {
        let records = vec![record(3, "눈물"), record(1, "붉은 눈"), record(2, "탈모")];
        let ids: Vec<i64> = match_label("붉은 눈과 눈물", &records)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let records = vec![record(1, "Rash")];
        assert!(match_label("skin rash", &records).is_empty());
        assert_eq!(match_label("skin Rash", &records).len(), 1);
    }
}
