//! # Behavior Advisor
//!
//! A static table of abnormal behaviors an owner can tick on the form, each with
//! likely causes and a short coaching note. `analyze_behaviors` enriches the
//! selected names and flags skin-related behaviors as high priority when the
//! owner's text also mentions skin symptoms.
//!
//! A behavior counts as skin-related when its name, or one of its listed
//! causes, contains [`SKIN_BEHAVIOR_KEYWORD`]. Matching on the name alone
//! would never escalate anything: no canonical name contains the keyword,
//! yet "과도한 핥기" with skin symptoms must come out high priority. Checking
//! the causes as well makes both "과도한 핥기" (피부 알레르기) and
//! "과도한 긁기(발톱으로 긁음)" (피부병변) eligible. A custom table entry whose
//! name contains the keyword is eligible regardless of its causes.

use crate::{
    constants::UNKNOWN_BEHAVIOR_NOTE,
    types::{BehaviorResult, Priority},
};

/// One row of the behavior table.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorEntry {
    pub name: &'static str,
    pub possible_causes: &'static [&'static str],
    pub coaching: &'static str,
}

/// The keyword that makes a behavior eligible for escalation.
pub const SKIN_BEHAVIOR_KEYWORD: &str = "피부";

/// Any of these in the owner's text triggers escalation of eligible behaviors.
pub const SKIN_SYMPTOM_KEYWORDS: &[&str] = &["피부", "발진", "탈모"];

pub const BEHAVIOR_TABLE: &[BehaviorEntry] = &[
    BehaviorEntry {
        name: "과도한 핥기",
        possible_causes: &["피부 알레르기", "스트레스", "기생충"],
        coaching: "피부 상태를 관찰하고, 국소적 염증이나 탈모가 있는지 확인하세요. 48시간 내 개선 없으면 수의사 방문을 권합니다. 스트레스 가능성도 고려해 환경 변화를 최소화하세요.",
    },
    BehaviorEntry {
        name: "식욕부진",
        possible_causes: &["소화기 문제", "통증", "감염"],
        coaching: "24시간 이상 식사를 거부하면 즉시 수의사 상담이 필요합니다. 물 섭취량과 배변 상태를 함께 기록하세요.",
    },
    BehaviorEntry {
        name: "과도한 물어뜯기(깨무는 행동)",
        possible_causes: &["통증", "스트레스", "구강 문제"],
        coaching: "입안 냄새, 잇몸 출혈, 침흘림 여부를 확인하세요. 통증 의심되면 동물병원에서 구강검진을 받으세요.",
    },
    BehaviorEntry {
        name: "숨기/은신 행동 증가",
        possible_causes: &["스트레스", "병든 징후", "환경 변화"],
        coaching: "조용한 공간과 은신처를 제공하고 급격한 환경 변화를 줄이세요. 계속 숨거나 활동량이 크게 줄면 수의사 상담을 권합니다.",
    },
    BehaviorEntry {
        name: "과도한 배설/실내 배변",
        possible_causes: &["의사소통 문제", "소화기 질환", "스트레스"],
        coaching: "배변 장소와 빈도를 기록하고, 변의 모양(혈액, 점액 등)을 확인하세요. 문제 지속 시 검진이 필요합니다.",
    },
    BehaviorEntry {
        name: "지속적 울음/야행성 소음",
        possible_causes: &["통증", "인지 기능 저하(노령)", "스트레스"],
        coaching: "나이를 고려해 야간 행동 패턴을 점검하세요. 노령묘의 경우 인지기능 변화일 수 있으니 수의사 상담을 권합니다.",
    },
    BehaviorEntry {
        name: "비정상적 움직임(절뚝임 등)",
        possible_causes: &["외상", "관절염", "근골격계 이상"],
        coaching: "움직임의 시작 시점과 악화 양상을 기록하세요. 통증 징후가 보이면 안정화 후 정밀검사 필요합니다.",
    },
    BehaviorEntry {
        name: "구토 빈발",
        possible_causes: &["식이 문제", "중독", "위장관 질환"],
        coaching: "구토 횟수, 섭취한 음식, 혈액 혼합 여부를 기록하세요. 탈수 우려 시 즉시 수의사 방문이 필요합니다.",
    },
    BehaviorEntry {
        name: "설사",
        possible_causes: &["감염", "식이 부적합", "기생충"],
        coaching: "수분 공급을 우선으로 하고 24-48시간 개선이 없으면 검진을 권합니다. 배변의 상태를 사진으로 기록해 두세요.",
    },
    BehaviorEntry {
        name: "과도한 긁기(발톱으로 긁음)",
        possible_causes: &["피부병변", "알레르기", "기생충"],
        coaching: "피부의 발적, 비듬, 기생충 징후를 확인하세요. 국소 치료 후에도 지속되면 수의사 진료가 필요합니다.",
    },
];

impl BehaviorEntry {
    /// Whether the behavior's name or causes mention the skin keyword.
    pub fn is_skin_related(&self) -> bool {
        self.name.contains(SKIN_BEHAVIOR_KEYWORD)
            || self
                .possible_causes
                .iter()
                .any(|cause| cause.contains(SKIN_BEHAVIOR_KEYWORD))
    }
}

/// Looks up a behavior by its exact canonical name.
pub fn lookup(name: &str) -> Option<&'static BehaviorEntry> {
    lookup_in(BEHAVIOR_TABLE, name)
}

fn lookup_in<'a>(table: &'a [BehaviorEntry], name: &str) -> Option<&'a BehaviorEntry> {
    table.iter().find(|entry| entry.name == name)
}

/// The canonical behavior names, in table order.
pub fn behavior_names() -> Vec<&'static str> {
    BEHAVIOR_TABLE.iter().map(|entry| entry.name).collect()
}

/// Produces one result per selected behavior, duplicates included.
pub fn analyze_behaviors<S: AsRef<str>>(selected: &[S], symptom_text: &str) -> Vec<BehaviorResult> {
    analyze_behaviors_with(BEHAVIOR_TABLE, selected, symptom_text)
}

/// Same as [`analyze_behaviors`], against a caller-supplied table.
pub fn analyze_behaviors_with<S: AsRef<str>>(
    table: &[BehaviorEntry],
    selected: &[S],
    symptom_text: &str,
) -> Vec<BehaviorResult> {
    let folded = symptom_text.to_lowercase();
    let text_mentions_skin =
        !symptom_text.is_empty() && SKIN_SYMPTOM_KEYWORDS.iter().any(|k| folded.contains(k));

    selected
        .iter()
        .map(|name| {
            let name = name.as_ref();
            match lookup_in(table, name) {
                None => BehaviorResult {
                    behavior: name.to_string(),
                    possible_causes: None,
                    coaching: None,
                    note: Some(UNKNOWN_BEHAVIOR_NOTE.to_string()),
                    priority: None,
                },
                Some(entry) => {
                    let escalate = text_mentions_skin && entry.is_skin_related();
                    BehaviorResult {
                        behavior: name.to_string(),
                        possible_causes: Some(
                            entry.possible_causes.iter().map(|c| c.to_string()).collect(),
                        ),
                        coaching: Some(entry.coaching.to_string()),
                        note: None,
                        priority: escalate.then_some(Priority::High),
                    }
                }
            }
        })
        .collect()
}
