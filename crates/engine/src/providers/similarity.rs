//! Heuristic similarity between provider names.
//!
//! Scores live in `[0, 1]`. Every directional sub-score is evaluated both
//! ways and the larger wins, so `provider_similarity(a, b)` always equals
//! `provider_similarity(b, a)`.

use crate::session::UNKNOWN_PROVIDER;

use super::normalize::normalize_provider_name;

const SHORT_FORMS: &[(&str, &[&str])] = &[
    ("eon", &["e.on", "e-on", "e on"]),
    ("ewe", &["ewe go"]),
    ("rwe", &["rwe mobility"]),
];

const KEY_BRANDS: &[&str] = &[
    "enbw", "ionity", "tesla", "fastned", "allego", "totalenergies", "shell", "recharge",
    "evbox", "aral", "plugsurfing", "maingau", "vw", "volkswagen", "eon", "vattenfall",
    "innogy", "ewe", "elli", "rwe", "porsche", "bmw", "e on", "enel", "engie", "orlen", "mer",
    "mobilityplus", "mobility", "chargepoint", "charge", "envi", "electrify", "ladenetz",
    "endesa", "e-wald", "ewald", "hascharge", "enkoping", "fortum", "easy", "move",
    "greenflux", "newmotion", "autostadt", "hyundai", "aufgeladen", "go", "ecopower", "ecotap",
    "pfalzwerke", "stadtwerke", "stadtwerk", "gemeinde", "gemeinden", "energy",
    "goingelectric", "ladepark", "ladepunkt", "super", "emobility", "sodetrel", "smatrics",
    "stromnetz", "virta", "freshmile", "jolt", "be emobil", "beemobil", "bee", "citywatt",
    "park", "flow", "eon drive", "eondrive", "hubject", "efa", "efacec", "grønn", "gronn",
    "kontakt", "circle", "cito", "charg", "schnell", "belectric", "clever", "plugsurfi",
    "webasto", "zunder", "keba", "okq8", "q8", "mover", "stad", "stadt", "statt", "city",
    "kommune", "kommun", "kommunal",
];

/// Brands at least this long are distinctive enough to decide on their own
const DISTINCTIVE_BRAND_LEN: usize = 4;

/// Keys shorter than this are compared character by character
const SHORT_KEY_LEN: usize = 6;

/// Score how likely two provider names refer to the same operator.
pub fn provider_similarity(a: &str, b: &str) -> f64 {
    if a.to_lowercase() == b.to_lowercase() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    match (a == UNKNOWN_PROVIDER, b == UNKNOWN_PROVIDER) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }
    if is_short_form_pair(a, b) {
        return 0.9;
    }

    let key_a = normalize_provider_name(a);
    let key_b = normalize_provider_name(b);
    if key_a == key_b {
        return 1.0;
    }
    if key_a.is_empty() || key_b.is_empty() {
        return 0.1;
    }

    let ratio = length_ratio(&key_a, &key_b);

    if let Some(score) = brand_score(&key_a, &key_b, ratio) {
        return score;
    }
    if key_a.contains(&key_b) || key_b.contains(&key_a) {
        return 0.7 + 0.3 * ratio;
    }

    let tokens = token_score(&key_a, &key_b).max(token_score(&key_b, &key_a));
    if tokens > 0.0 {
        return tokens.min(1.0);
    }

    let len_a = key_a.chars().count();
    let len_b = key_b.chars().count();
    if len_a < SHORT_KEY_LEN || len_b < SHORT_KEY_LEN {
        let overlap = char_overlap(&key_a, &key_b).max(char_overlap(&key_b, &key_a));
        let longest = len_a.max(len_b) as f64;
        let mut score = overlap as f64 / longest;
        if score > 0.3 {
            score += 0.1;
        }
        return score.min(1.0);
    }

    if key_a.chars().next() == key_b.chars().next() {
        0.2
    } else {
        0.1
    }
}

fn is_short_form_pair(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    SHORT_FORMS.iter().any(|(short, variants)| {
        (a == *short && variants.contains(&b.as_str()))
            || (b == *short && variants.contains(&a.as_str()))
    })
}

fn length_ratio(a: &str, b: &str) -> f64 {
    let (la, lb) = (a.chars().count() as f64, b.chars().count() as f64);
    la.min(lb) / la.max(lb)
}

fn brand_score(a: &str, b: &str, ratio: f64) -> Option<f64> {
    let shared: Vec<&str> = KEY_BRANDS
        .iter()
        .copied()
        .filter(|brand| a.contains(brand) && b.contains(brand))
        .collect();

    if shared.iter().any(|brand| brand.len() >= DISTINCTIVE_BRAND_LEN) {
        Some(0.85 + 0.15 * ratio)
    } else if shared.len() >= 2 {
        Some(0.8)
    } else {
        None
    }
}

fn significant_tokens(key: &str) -> Vec<&str> {
    let all: Vec<&str> = key.split_whitespace().collect();
    let long: Vec<&str> = all.iter().copied().filter(|t| t.len() > 1).collect();
    if long.is_empty() {
        all
    } else {
        long
    }
}

/// Token agreement measured from `a`'s side
fn token_score(a: &str, b: &str) -> f64 {
    let left = significant_tokens(a);
    let right = significant_tokens(b);
    let total = left.len() + right.len();
    if total == 0 {
        return 0.0;
    }

    let mut common = 0usize;
    let mut partial = 0usize;
    for t1 in &left {
        for t2 in &right {
            if t1 == t2 {
                common += 1;
                break;
            }
            if t1.len() >= 3 && t2.len() >= 3 && (t1.contains(t2) || t2.contains(t1)) {
                partial += 1;
                break;
            }
        }
    }

    let mut score = (2 * common + partial) as f64 / total as f64;
    if common > 1 {
        score += 0.15;
    } else if common == 1 {
        score += 0.1;
    } else if partial > 1 {
        score += 0.05;
    }
    score
}

fn char_overlap(a: &str, b: &str) -> usize {
    a.chars().filter(|c| b.contains(*c)).count()
}
