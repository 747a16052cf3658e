//! # Default Task Prompts
//!
//! The default, hardcoded prompt texts for the two provider calls: labeling the
//! uploaded photo, and writing the veterinary opinion. System prompts can be
//! overridden by `config.yml` or `prompt.yml`; the user template is fixed
//! because the composer fills it.

// --- Image Labeling ---
pub const IMAGE_LABELING_PROMPT: &str = r#"당신은 수의학 지식이 있는 AI 보조원입니다.
이 반려동물 사진에서 관찰할 수 있는 모든 잠재적인 의학적 증상을 자세히 묘사해주세요.
눈, 코, 입, 귀, 피부, 털 상태, 자세 등 구체적인 부위에 집중해서 설명해주세요.
만약 여러 증상이 보인다면 모두 나열해주세요. (예: 왼쪽 눈의 탁한 분비물, 코 주변의 약간의 붉은 기, 가슴 부분의 뭉친 털)
만약 특별한 이상 징후 없이 건강해 보인다면 '외관상 특이 소견 없음' 이라고 답변해주세요."#;

// --- Analysis ---
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a careful veterinary assistant. Answer in Korean, follow the requested output format exactly, and never present your answer as a definitive diagnosis."#;

/// Filled by the composer with `{pet_type}`, `{context}` and `{mission}`.
pub const ANALYSIS_USER_PROMPT: &str = r#"당신은 전문 {pet_type} 수의사 AI 조수입니다. {context}


---
[임무]
{mission} 보호자에게 가장 가능성이 높은 질병과 경고, 조언을 생성해주세요.
만약 [사진 분석과 관련된 수의학 지식]이 제공되었다면, 해당 내용을 우선적으로 참고하여 답변을 구성하세요.
증상만으로 판단이 어려울 경우, 여러 가능성을 제시하고 사진 등의 추가 정보를 요청할 수 있습니다.
답변은 반드시 아래 [출력 형식]을 따라야 합니다.

[규칙]
[출력 형식]
### 핵심 요약
(모든 내용을 한두 문장으로 요약)
### 상세 설명
(의심되는 점과 그 이유를 자세히 설명)
### 권장 조치
(보호자가 해야 할 일, 예를 들어 병원 방문 권유 등)"#;

// --- Context blocks ---
pub const KNOWLEDGE_BLOCK_HEADER: &str = "[사진 분석과 관련된 수의학 지식 (DB 검색 결과)]";
pub const OBSERVATION_BLOCK_HEADER: &str = "[보호자 관찰 내용]";
pub const LABEL_BLOCK_HEADER: &str = "[사진 분석 결과 라벨]";
pub const NO_MATCH_PLACEHOLDER: &str = "일치하는 정보를 찾지 못했습니다.";

/// Separator between context blocks inside the persona line.
pub const CONTEXT_BLOCK_SEPARATOR: &str = ", ";

// --- Missions ---
pub const MISSION_COMBINED: &str =
    "위의 [사진 분석과 관련된 수의학 지식]을 바탕으로, [보호자 관찰 내용]과 [사진 분석 결과 라벨]을 종합하여";
pub const MISSION_IMAGE_ONLY: &str =
    "위의 [사진 분석과 관련된 수의학 지식]과 [사진 분석 결과 라벨]을 바탕으로,";
pub const MISSION_TEXT_ONLY: &str = "[보호자 관찰 내용]을 바탕으로,";
