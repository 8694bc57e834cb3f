//! Canonical keys for free-text charging provider names.

use std::sync::LazyLock;

use regex::Regex;

use crate::session::UNKNOWN_PROVIDER;

/// Legitimate operator names too short to survive the letter-count check
const SHORT_NAME_WHITELIST: &[&str] = &[
    "E.ON", "EON", "EWE", "RWE", "E-ON", "E ON", "BEW", "NEW", "MER", "LEW",
];

const E_ON_SPELLINGS: &[&str] = &["E.ON", "E-ON", "E ON", "EON"];

const TRAILING_SUFFIXES: &[&str] = &[" mobility", " plus", " drive", " recharge"];

static CHARGING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((hpc|dc|ac)/)+").expect("valid prefix pattern"));

static LEGAL_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(gmbh|ag|ltd|llc|inc|kg|co\.|corporation|holding|mbh|group|b\.v|bv|networks|solutions)\b",
    )
    .expect("valid legal entity pattern")
});

static CHARGING_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(hpc|dc|ac|ultra|supercharger|super|charger|fast|rapid|schnell|lader|charging|punkt|power|station|ladepunkt|ladestationen|ladestation)\b",
    )
    .expect("valid charging vocabulary pattern")
});

static REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(germany|deutschland|de|europe|european|eu|nord|süd|sud|west|ost|east|north|south|international|global)\b",
    )
    .expect("valid region pattern")
});

static INDUSTRY_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(network|services|mobility|emobility|energy|elektro|electric|renewables|infrastructure|technologie|technology)\b",
    )
    .expect("valid industry vocabulary pattern")
});

static E_ON_VARIANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\be[-. ]on\b").expect("valid e-on pattern"));

static NON_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\s]+").expect("valid non-letter pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

pub fn ascii_letters(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

pub fn is_whitelisted_short_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    SHORT_NAME_WHITELIST.contains(&upper.as_str())
}

/// Why a raw provider string was coerced to the unknown sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion {
    Empty,
    OnlyDigits,
    TooFewLetters(usize),
}

impl Coercion {
    pub fn describe(&self, original: &str) -> String {
        match self {
            Coercion::Empty => "Empty string".to_string(),
            Coercion::OnlyDigits => format!("Only numbers: {}", original),
            Coercion::TooFewLetters(n) => format!("Too few letters ({}): {}", n, original),
        }
    }
}

/// Cleans a raw provider string before clustering.
///
/// Returns the cleaned name, and the reason when it was forced to "Unknown".
pub fn clean_provider(raw: &str) -> (String, Option<Coercion>) {
    let trimmed = raw.trim().replace("  ", " ");
    if trimmed.is_empty() {
        return (UNKNOWN_PROVIDER.to_string(), Some(Coercion::Empty));
    }
    if is_whitelisted_short_name(&trimmed) {
        return (trimmed, None);
    }

    let letters = ascii_letters(&trimmed).len();
    if letters < 2 {
        let coercion = if trimmed.chars().all(|c| c.is_ascii_digit()) {
            Coercion::OnlyDigits
        } else {
            Coercion::TooFewLetters(letters)
        };
        return (UNKNOWN_PROVIDER.to_string(), Some(coercion));
    }

    (trimmed, None)
}

/// Reduce a provider name to the part that identifies the operator.
///
/// `"HPC/IONITY GmbH"`, `"IONITY"` and `"Ionity Germany"` all become `"ionity"`.
pub fn normalize_provider_name(name: &str) -> String {
    if name.is_empty() || name == UNKNOWN_PROVIDER {
        return UNKNOWN_PROVIDER.to_string();
    }
    if E_ON_SPELLINGS.contains(&name) {
        return "eon".to_string();
    }

    let lower = name.to_lowercase();
    let mut key = CHARGING_PREFIX.replace(&lower, "").into_owned();
    for pattern in [
        &*LEGAL_ENTITY,
        &*CHARGING_VOCABULARY,
        &*REGION,
        &*INDUSTRY_VOCABULARY,
    ] {
        key = pattern.replace_all(&key, " ").into_owned();
    }
    key = E_ON_VARIANT.replace_all(&key, "eon").into_owned();
    key = NON_LETTER.replace_all(&key, " ").into_owned();
    key = WHITESPACE.replace_all(&key, " ").trim().to_string();

    for suffix in TRAILING_SUFFIXES {
        if let Some(stripped) = key.strip_suffix(suffix) {
            key = stripped.to_string();
        }
    }

    if key.is_empty() {
        let letters = ascii_letters(name).to_lowercase();
        return if letters.is_empty() {
            name.to_string()
        } else {
            letters
        };
    }

    key
}
