//! # Default Condition Records
//!
//! The reference rows inserted into an empty `diseases` table.

use crate::types::ConditionSeed;

pub const DEFAULT_CONDITIONS: &[ConditionSeed] = &[
    ConditionSeed {
        disease_name: "알레르기성 피부염 (의심)",
        image_labels: "피부 발진,붉은 반점,탈모",
        text_symptoms: "가려움,핥음,비빔,발적",
        warning_level: "주의 🟡",
        advice: "사진과 증상으로 볼 때 '알레르기성 피부염'이 의심됩니다. 원인(사료, 간식, 집먼지 등)을 찾아보고, 증상이 지속되면 병원을 방문해 정확한 알레르기 원인을 찾는 것이 좋습니다.",
    },
    ConditionSeed {
        disease_name: "백내장 (초기 의심)",
        image_labels: "흐릿한 눈,하얀 동공",
        text_symptoms: "눈을 잘 못 마주침,밤에 잘 부딪힘,눈이 뿌옇게 보임",
        warning_level: "경고 🔴",
        advice: "사진상 동공이 뿌옇게 보이는 것은 '백내장'의 초기 징후일 수 있습니다. 방치하면 시력을 잃을 수 있으니 즉시 안과 전문 동물병원을 방문하여 검사를 받으세요.",
    },
    ConditionSeed {
        disease_name: "결막염 (의심)",
        image_labels: "붉은 눈,눈곱,눈물",
        text_symptoms: "눈을 찡그림,눈 주변을 비빔",
        warning_level: "주의 🟡",
        advice: "눈이 붉어지고 눈곱이 끼는 증상은 '결막염'일 수 있습니다. 세균 감염이나 알레르기 때문일 수 있으니, 병원에서 안약을 처방받아 치료하는 것이 좋습니다.",
    },
    ConditionSeed {
        disease_name: "정상 피부",
        image_labels: "정상 피부",
        text_symptoms: "특별한 증상 없음",
        warning_level: "안전 🟢",
        advice: "사진과 증상으로는 특별한 이상 징후가 보이지 않습니다. 건강한 상태로 보입니다. 하지만 평소와 다른 행동을 보인다면 주의 깊게 관찰해주세요.",
    },
];
