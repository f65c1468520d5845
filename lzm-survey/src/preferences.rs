//! Preference assembly
//!
//! Turns the union of all pages' answers into the weighted request body the
//! recommendation backend expects. Pure and deterministic.

use lzm_common::models::{fields, AnswerValue, PageAnswers, PreferenceRequest, PreferenceValue};
use std::str::FromStr;

/// Prefix of the per-species-type importance fields on page 1
pub const SPECIES_WEIGHT_PREFIX: &str = "종류_가중치_";

/// Importance used when a species weight field is non-numeric or zero
pub const DEFAULT_SPECIES_WEIGHT: i64 = 10;

/// Appearance-tag question, always sent as a sequence
pub const APPEARANCE_TAGS: &str = "외형태그";

/// One known question: where its value and importance come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSpec {
    pub key: &'static str,
    pub weight_key: &'static str,
    pub default_weight: i64,
}

impl QuestionSpec {
    const fn new(key: &'static str, weight_key: &'static str, default_weight: i64) -> Self {
        Self {
            key,
            weight_key,
            default_weight,
        }
    }

    /// Graded/tiered questions carry integer values
    pub fn is_graded(&self) -> bool {
        self.key.contains("등급") || self.key.contains("단계")
    }
}

const STANDARD_QUESTIONS: &[QuestionSpec] = &[
    QuestionSpec::new("사육_난이도_5단계", "사육_난이도_5단계_중요도", 20),
    QuestionSpec::new("초기비용_등급_5단계_max", "초기비용_등급_5단계_중요도", 15),
    QuestionSpec::new("사육장_사이즈_3단계_max", "사육장_사이즈_3단계_중요도", 10),
    QuestionSpec::new("활동패턴", "활동패턴_중요도", 10),
    QuestionSpec::new("먹이빈도_등급_prefer", "먹이빈도_등급_중요도", 10),
    QuestionSpec::new("핸들링적합도_5단계_prefer", "핸들링적합도_5단계_중요도", 10),
    QuestionSpec::new("관상용_애완용", "관상용_애완용_중요도", 10),
    QuestionSpec::new("식성타입", "식성타입_중요도", 5),
    QuestionSpec::new(APPEARANCE_TAGS, "외형태그_중요도", 5),
];

const COMPACT_QUESTIONS: &[QuestionSpec] = &[
    QuestionSpec::new("사육_난이도_5단계", "사육_난이도_5단계_중요도", 20),
    QuestionSpec::new("초기비용_등급_5단계_max", "초기비용_등급_5단계_중요도", 15),
    QuestionSpec::new("활동패턴", "활동패턴_중요도", 10),
    QuestionSpec::new("먹이빈도_등급_prefer", "먹이빈도_등급_중요도", 10),
    QuestionSpec::new("핸들링적합도_5단계_prefer", "핸들링적합도_5단계_중요도", 10),
    QuestionSpec::new("관상용_애완용", "관상용_애완용_중요도", 10),
    QuestionSpec::new("식성타입", "식성타입_중요도", 5),
    QuestionSpec::new(APPEARANCE_TAGS, "외형태그_중요도", 5),
];

/// Question table variant
///
/// `Standard` asks for the maximum enclosure size; `Compact` does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeightProfile {
    #[default]
    Standard,
    Compact,
}

impl WeightProfile {
    pub fn questions(self) -> &'static [QuestionSpec] {
        match self {
            WeightProfile::Standard => STANDARD_QUESTIONS,
            WeightProfile::Compact => COMPACT_QUESTIONS,
        }
    }
}

impl FromStr for WeightProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(WeightProfile::Standard),
            "compact" => Ok(WeightProfile::Compact),
            other => Err(format!("unknown weight profile '{}' (expected standard or compact)", other)),
        }
    }
}

/// Leading-integer parse: optional whitespace and sign, then digits
///
/// `"15"`, `" 15px"` and `"+3"` parse; `"abc"` and `""` do not.
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());

    if digits_end == 0 {
        return None;
    }

    rest[..digits_end].parse::<i64>().ok().map(|n| sign * n)
}

/// Builds [`PreferenceRequest`]s from collected answers
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceAssembler {
    profile: WeightProfile,
}

impl PreferenceAssembler {
    pub fn new(profile: WeightProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> WeightProfile {
        self.profile
    }

    /// Assemble the request body
    ///
    /// Every known question gets a `custom_weights` entry. An unanswered
    /// question is weighted 0 and its value key is left out; an answered one
    /// carries its value and the parsed importance (non-numeric means 0, a
    /// missing importance field means the question's default).
    pub fn assemble(&self, answers: &PageAnswers) -> PreferenceRequest {
        let mut request = PreferenceRequest::default();

        if let Some(types) = answers.get(fields::SPECIES_TYPE) {
            request.species_types = types.values().into_iter().map(str::to_string).collect();
        }

        for (key, value) in answers.iter() {
            let Some(species_type) = key.strip_prefix(SPECIES_WEIGHT_PREFIX) else {
                continue;
            };
            if !request.species_types.iter().any(|t| t == species_type) {
                continue;
            }
            let weight = value
                .first()
                .and_then(parse_int)
                .filter(|w| *w != 0)
                .unwrap_or(DEFAULT_SPECIES_WEIGHT);
            request
                .species_type_weights
                .insert(species_type.to_string(), weight);
        }

        for question in self.profile.questions() {
            match resolve_value(question, answers.get(question.key)) {
                Some(value) => {
                    let weight = match answers.get(question.weight_key).and_then(AnswerValue::first) {
                        Some(raw) => parse_int(raw).unwrap_or(0),
                        None => question.default_weight,
                    };
                    request.values.insert(question.key.to_string(), value);
                    request.custom_weights.insert(question.key.to_string(), weight);
                }
                None => {
                    request.custom_weights.insert(question.key.to_string(), 0);
                }
            }
        }

        request
    }
}

fn resolve_value(question: &QuestionSpec, answer: Option<&AnswerValue>) -> Option<PreferenceValue> {
    let answer = answer.filter(|a| !a.is_empty())?;

    if question.key == APPEARANCE_TAGS {
        let tags: Vec<String> = answer
            .values()
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        return (!tags.is_empty()).then_some(PreferenceValue::Tags(tags));
    }

    let scalar = answer.first().filter(|v| !v.is_empty())?;
    if question.is_graded() {
        parse_int(scalar).map(PreferenceValue::Grade)
    } else {
        Some(PreferenceValue::Text(scalar.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(pairs: &[(&str, &str)]) -> PageAnswers {
        let mut a = PageAnswers::new();
        for (k, v) in pairs {
            a.append(k, *v);
        }
        a
    }

    #[test]
    fn test_parse_int_prefix_semantics() {
        assert_eq!(parse_int("15"), Some(15));
        assert_eq!(parse_int(" 7px"), Some(7));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn test_weight_profile_from_str() {
        assert_eq!("standard".parse::<WeightProfile>(), Ok(WeightProfile::Standard));
        assert_eq!("Compact".parse::<WeightProfile>(), Ok(WeightProfile::Compact));
        assert!("full".parse::<WeightProfile>().is_err());
        assert_eq!(WeightProfile::Standard.questions().len(), 9);
        assert_eq!(WeightProfile::Compact.questions().len(), 8);
    }

    #[test]
    fn test_gecko_only_scenario() {
        let mut answers = PageAnswers::new();
        answers.insert("종류", AnswerValue::Multi(vec!["Gecko".into()]));
        answers.append("종류_가중치_Gecko", "15");

        let request = PreferenceAssembler::default().assemble(&answers);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["종류"], json!(["Gecko"]));
        assert_eq!(body["종류_가중치"], json!({"Gecko": 15}));
        for question in WeightProfile::Standard.questions() {
            assert_eq!(request.weight(question.key), Some(0), "{}", question.key);
            assert!(body.get(question.key).is_none(), "{}", question.key);
        }
    }

    #[test]
    fn test_answered_questions_carry_values_and_weights() {
        let answers = page(&[
            ("사육_난이도_5단계", "2"),
            ("사육_난이도_5단계_중요도", "30"),
            ("활동패턴", "야행성"),
            ("식성타입", "곤충식"),
            ("식성타입_중요도", "많이"),
            ("외형태그", "귀엽다"),
        ]);

        let request = PreferenceAssembler::default().assemble(&answers);

        assert_eq!(request.value("사육_난이도_5단계"), Some(&PreferenceValue::Grade(2)));
        assert_eq!(request.weight("사육_난이도_5단계"), Some(30));
        assert_eq!(request.value("활동패턴"), Some(&PreferenceValue::Text("야행성".into())));
        assert_eq!(request.weight("활동패턴"), Some(10));
        assert_eq!(request.weight("식성타입"), Some(0));
        assert_eq!(
            request.value("외형태그"),
            Some(&PreferenceValue::Tags(vec!["귀엽다".into()]))
        );
    }

    #[test]
    fn test_non_numeric_grade_treated_as_absent() {
        let answers = page(&[("초기비용_등급_5단계_max", "any"), ("초기비용_등급_5단계_중요도", "15")]);

        let request = PreferenceAssembler::default().assemble(&answers);
        assert!(request.value("초기비용_등급_5단계_max").is_none());
        assert_eq!(request.weight("초기비용_등급_5단계_max"), Some(0));
    }

    #[test]
    fn test_species_weight_fallbacks() {
        let mut answers = PageAnswers::new();
        answers.insert(
            "종류",
            AnswerValue::Multi(vec!["Gecko".into(), "Skink".into(), "Chameleon".into()]),
        );
        answers.append("종류_가중치_Gecko", "0");
        answers.append("종류_가중치_Skink", "x");
        answers.append("종류_가중치_Chameleon", "8");
        answers.append("종류_가중치_Monitor", "20");

        let request = PreferenceAssembler::default().assemble(&answers);
        assert_eq!(request.species_type_weights.get("Gecko"), Some(&10));
        assert_eq!(request.species_type_weights.get("Skink"), Some(&10));
        assert_eq!(request.species_type_weights.get("Chameleon"), Some(&8));
        assert!(!request.species_type_weights.contains_key("Monitor"));
    }

    #[test]
    fn test_compact_profile_omits_enclosure_question() {
        let answers = page(&[("사육장_사이즈_3단계_max", "2")]);

        let request = PreferenceAssembler::new(WeightProfile::Compact).assemble(&answers);
        assert!(request.weight("사육장_사이즈_3단계_max").is_none());
        assert!(request.value("사육장_사이즈_3단계_max").is_none());
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let mut answers = page(&[
            ("활동패턴", "주행성"),
            ("관상용_애완용", "애완용"),
            ("핸들링적합도_5단계_prefer", "4"),
        ]);
        answers.insert("외형태그", AnswerValue::Multi(vec!["화려하다".into(), "귀엽다".into()]));

        let assembler = PreferenceAssembler::default();
        let a = serde_json::to_string(&assembler.assemble(&answers)).unwrap();
        let b = serde_json::to_string(&assembler.assemble(&answers.clone())).unwrap();
        assert_eq!(a, b);
    }
}
