//! Plain-text rendering of an `AssessmentResult` for the terminal.

use petcare::{
    types::{AnalysisIssue, Priority},
    AssessmentResult,
};
use std::fmt::Write;

pub fn render(result: &AssessmentResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🐾 {} 분석 결과", result.species.display_name());

    if let Some(text) = &result.symptom_text {
        let _ = writeln!(out, "\n[보호자 관찰 내용]\n{text}");
    }
    if let Some(label) = &result.image_label {
        let _ = writeln!(out, "\n[사진 분석 결과 라벨]\n{label}");
    }
    if !result.matched_conditions.is_empty() {
        let _ = writeln!(out, "\n[관련 질환]");
        for record in &result.matched_conditions {
            let _ = writeln!(
                out,
                "- {} ({})\n  {}",
                record.disease_name, record.warning_level, record.advice
            );
        }
    }

    match (&result.narrative, &result.error) {
        (Some(narrative), _) => {
            let _ = writeln!(out, "\n{narrative}");
        }
        (None, Some(error)) => {
            let _ = writeln!(out, "\n⚠️ {error}");
        }
        (None, None) => {}
    }

    if let Some(behaviors) = &result.behavior_analysis {
        let _ = writeln!(out, "\n[행동 분석]");
        for item in behaviors {
            let flag = match item.priority {
                Some(Priority::High) => " ❗",
                None => "",
            };
            let _ = writeln!(out, "- {}{flag}", item.behavior);
            if let Some(causes) = &item.possible_causes {
                let _ = writeln!(out, "  가능한 원인: {}", causes.join(", "));
            }
            if let Some(coaching) = item.coaching.as_ref().or(item.note.as_ref()) {
                let _ = writeln!(out, "  {coaching}");
            }
        }
    }

    if let Some(obesity) = &result.obesity_analysis {
        let _ = writeln!(out, "\n[체형 평가]");
        if let Some(status) = obesity.status {
            let _ = writeln!(out, "상태: {}", status.label_ko());
        }
        let _ = writeln!(out, "{}", obesity.message);
    }

    for issue in &result.issues {
        let detail = match issue {
            AnalysisIssue::StoreUnavailable(d) => format!("knowledge store unavailable: {d}"),
            AnalysisIssue::LabelServiceFailure(d) => format!("image labeling failed: {d}"),
            AnalysisIssue::GenerationServiceFailure(d) => format!("text generation failed: {d}"),
        };
        let _ = writeln!(out, "(note) {detail}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_result() -> AssessmentResult {
        serde_json::from_value(json!({
            "species": "cat",
            "symptom_text": "피부에 발진이 있어요",
            "matched_conditions": [],
            "behavior_analysis": [{
                "behavior": "과도한 핥기",
                "possible_causes": ["피부 알레르기"],
                "coaching": "피부 상태를 관찰하세요.",
                "priority": "high"
            }],
            "obesity_analysis": {
                "assessable": true,
                "status": "overweight",
                "ideal_weight_kg": 4.5,
                "message": "과체중입니다."
            },
            "error": "분석 중 오류가 발생했습니다: down",
            "issues": [{"kind": "generation_service_failure", "detail": "down"}],
            "generated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn renders_sections_in_order() {
        let text = render(&sample_result());
        let observation = text.find("[보호자 관찰 내용]").unwrap();
        let error = text.find("⚠️ 분석 중 오류가 발생했습니다: down").unwrap();
        let behavior = text.find("- 과도한 핥기 ❗").unwrap();
        let obesity = text.find("상태: 과체중").unwrap();
        assert!(observation < error && error < behavior && behavior < obesity);
        assert!(!text.contains("[사진 분석 결과 라벨]"));
        assert!(text.ends_with("(note) text generation failed: down\n"));
    }
}
