//! # Body Condition Assessor
//!
//! Weight-based obesity classification for cats and a qualitative body
//! condition score (BCS) guide for dogs. Both refuse to judge animals under a
//! year old, since growth makes weight alone meaningless.

use crate::types::{ObesityResult, ObesityStatus, Species};

/// The single reference weight used for adult cats.
pub const IDEAL_CAT_WEIGHT_KG: f64 = 4.5;
/// Upper bound (inclusive) of the normal range, as a multiple of the ideal weight.
pub const OVERWEIGHT_FACTOR: f64 = 1.2;
/// Upper bound (inclusive) of the overweight range.
pub const OBESE_FACTOR: f64 = 1.3;

const ADULT_AGE_YEARS: f64 = 1.0;

const CAT_TOO_YOUNG: &str = "1세 미만의 고양이는 성장 단계로 체중만으로 비만 판정이 어렵습니다.";
const DOG_TOO_YOUNG: &str = "1세 미만의 강아지는 성장 단계로 체중만으로 비만 판정이 어렵습니다.";

const CAT_NORMAL: &str = "현재 체중은 대략 정상 범위입니다.";
const CAT_OVERWEIGHT: &str = "과체중으로 식이조절 및 운동을 권장합니다.";
const CAT_OBESE: &str = "비만으로 판단됩니다. 식이관리와 운동, 수의사와의 상담을 권장합니다.";

pub const DOG_BCS_GUIDE: &str = r#"**강아지 신체 상태 점수(BCS) 자가 평가 가이드**

강아지의 비만도는 체중계 숫자보다 몸 상태를 직접 확인하는 것이 더 정확합니다. 아래 가이드를 따라 반려견의 신체 상태를 평가해보세요.

**1. 갈비뼈 확인:**
   - **이상적:** 갈비뼈가 눈으로는 보이지 않지만, 가슴 옆을 부드럽게 만졌을 때 쉽게 느껴져야 합니다. 얇은 담요 위로 손가락을 스치는 느낌과 비슷합니다.
   - **마름:** 갈비뼈, 등뼈, 골반뼈가 멀리서도 쉽게 보입니다.
   - **과체중/비만:** 두꺼운 지방층에 덮여 갈비뼈가 잘 만져지지 않습니다.

**2. 허리 라인 확인:**
   - **이상적:** 위에서 내려다봤을 때, 가슴 뒤쪽으로 허리 라인이 잘록하게 들어가 보여야 합니다.
   - **마름:** 허리 라인이 매우 심하게 들어가 있습니다.
   - **과체중/비만:** 허리 라인이 없거나, 오히려 옆으로 불룩 튀어나와 보입니다.

**3. 복부 라인 확인:**
   - **이상적:** 옆에서 봤을 때, 가슴에서부터 뒷다리 쪽으로 복부가 완만하게 위로 올라가는 곡선이 보여야 합니다.
   - **마름:** 복부 라인이 급격하게 위로 치솟아 있습니다.
   - **과체중/비만:** 복부 라인이 수평이거나 아래로 처져 있습니다.

**평가:**
- **이상적인 상태**라면 건강한 체중입니다.
- **과체중/비만**에 해당된다면, 식사량을 조절하고 활동량을 늘리는 것이 좋습니다. 정확한 진단과 관리 계획을 위해 수의사와 상담하는 것을 강력히 권장합니다."#;

fn not_assessable(message: &str) -> ObesityResult {
    ObesityResult {
        assessable: false,
        status: None,
        ideal_weight_kg: None,
        message: message.to_string(),
    }
}

/// Classifies an adult cat's weight against [`IDEAL_CAT_WEIGHT_KG`].
///
/// Both thresholds are inclusive, and computed as `IDEAL * factor` in `f64`.
pub fn assess_cat(age_years: f64, weight_kg: f64) -> ObesityResult {
    if age_years < ADULT_AGE_YEARS {
        return not_assessable(CAT_TOO_YOUNG);
    }

    let (status, message) = if weight_kg <= IDEAL_CAT_WEIGHT_KG * OVERWEIGHT_FACTOR {
        (ObesityStatus::Normal, CAT_NORMAL)
    } else if weight_kg <= IDEAL_CAT_WEIGHT_KG * OBESE_FACTOR {
        (ObesityStatus::Overweight, CAT_OVERWEIGHT)
    } else {
        (ObesityStatus::Obese, CAT_OBESE)
    };

    ObesityResult {
        assessable: true,
        status: Some(status),
        ideal_weight_kg: Some(IDEAL_CAT_WEIGHT_KG),
        message: message.to_string(),
    }
}

/// Returns the BCS self-assessment guide for an adult dog. The weight is
/// accepted for symmetry with [`assess_cat`] but never changes the result.
pub fn assess_dog(age_years: f64, _weight_kg: f64) -> ObesityResult {
    if age_years < ADULT_AGE_YEARS {
        return not_assessable(DOG_TOO_YOUNG);
    }
    ObesityResult {
        assessable: true,
        status: Some(ObesityStatus::Guide),
        ideal_weight_kg: None,
        message: DOG_BCS_GUIDE.to_string(),
    }
}

/// Dispatches on species. Other species get no body-condition section.
pub fn assess(species: &Species, age_years: f64, weight_kg: f64) -> Option<ObesityResult> {
    match species {
        Species::Cat => Some(assess_cat(age_years, weight_kg)),
        Species::Dog => Some(assess_dog(age_years, weight_kg)),
        Species::Other(_) => None,
    }
}
