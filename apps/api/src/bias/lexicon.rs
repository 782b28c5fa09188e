//! Static lexicon for the text detector: seven bias categories of weighted phrases, the
//! context phrases that scale a match, and the per-category recommendation.
//!
//! Phrases are lower-case. Most carry their category's base weight; stereotyped compounds
//! ("too old", "too aggressive") are weighted higher than their single-word parts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TextBiasCategory {
    #[serde(rename = "age_bias")]
    Age,
    #[serde(rename = "gender_bias")]
    Gender,
    #[serde(rename = "appearance_bias")]
    Appearance,
    #[serde(rename = "cultural_bias")]
    Cultural,
    #[serde(rename = "family_bias")]
    Family,
    #[serde(rename = "socioeconomic_bias")]
    Socioeconomic,
    #[serde(rename = "disability_bias")]
    Disability,
}

pub struct CategoryRule {
    pub category: TextBiasCategory,
    pub phrases: &'static [(&'static str, f64)],
    pub recommendation: &'static str,
}

pub const NEGATIVE_CONTEXT_MULTIPLIER: f64 = 1.5;
pub const POSITIVE_CONTEXT_MULTIPLIER: f64 = 0.7;
/// Characters inspected either side of a match when choosing the context multiplier.
pub const CONTEXT_WINDOW: usize = 50;

/// Checked before the positive list; the first hit wins.
pub const NEGATIVE_CONTEXT: &[&str] = &[
    "not sure if",
    "concerned about",
    "worried that",
    "might be",
    "could be problematic",
    "red flag",
    "concerning",
    "seems",
    "doubt",
    "hesitant",
    "not convinced",
];

pub const POSITIVE_CONTEXT: &[&str] = &[
    "excellent",
    "outstanding",
    "impressive",
    "strong candidate",
    "highly qualified",
    "perfect fit",
];

/// Hedging words that mark an impression rather than an observation.
pub const SUBJECTIVE_MARKERS: &[&str] = &["seems", "appears", "feels like", "impression", "gut feeling"];

pub const OBJECTIVE_MARKERS: &[&str] = &["demonstrated", "achieved", "completed", "measured", "quantified"];

pub const RULES: &[CategoryRule] = &[
    CategoryRule {
        category: TextBiasCategory::Age,
        phrases: &[
            ("young", 1.2),
            ("old", 1.2),
            ("mature", 1.2),
            ("fresh", 1.2),
            ("energetic", 1.2),
            ("digital native", 1.2),
            ("too old", 2.0),
            ("too young", 2.0),
            ("millennial", 1.2),
            ("boomer", 1.2),
            ("gen z", 1.2),
            ("seasoned", 1.2),
            ("veteran", 1.2),
            ("junior", 1.2),
            ("senior", 1.2),
            ("recent grad", 1.2),
        ],
        recommendation: "Remove age-related descriptors and focus on relevant experience",
    },
    CategoryRule {
        category: TextBiasCategory::Gender,
        phrases: &[
            ("aggressive", 1.5),
            ("too aggressive", 2.0),
            ("assertive", 1.5),
            ("emotional", 1.5),
            ("too emotional", 2.0),
            ("nurturing", 1.5),
            ("bossy", 1.5),
            ("hysterical", 1.5),
            ("dramatic", 1.5),
            ("pushy", 1.5),
            ("sweet", 1.5),
            ("motherly", 1.5),
            ("fatherly", 1.5),
            ("manly", 1.5),
            ("feminine", 1.5),
            ("masculine", 1.5),
            ("strong-willed", 1.5),
            ("delicate", 1.5),
        ],
        recommendation: "Use gender-neutral language and avoid stereotypical descriptors",
    },
    CategoryRule {
        category: TextBiasCategory::Appearance,
        phrases: &[
            ("attractive", 1.3),
            ("professional appearance", 1.3),
            ("well-groomed", 1.3),
            ("presentable", 1.3),
            ("polished", 1.3),
            ("looks", 1.3),
            ("appearance", 1.3),
            ("fashionable", 1.3),
            ("beautiful", 1.3),
            ("handsome", 1.3),
        ],
        recommendation: "Focus on job-relevant skills rather than physical appearance",
    },
    CategoryRule {
        category: TextBiasCategory::Cultural,
        phrases: &[
            ("cultural fit", 1.4),
            ("team fit", 1.4),
            ("our type", 1.4),
            ("foreign", 1.4),
            ("accent", 1.4),
            ("communication style", 1.4),
            ("exotic", 1.4),
            ("ethnic", 1.4),
            ("westernized", 1.4),
            ("americanized", 1.4),
        ],
        recommendation: "Evaluate based on qualifications, not cultural background or 'fit'",
    },
    CategoryRule {
        category: TextBiasCategory::Family,
        phrases: &[
            ("family", 1.6),
            ("children", 1.6),
            ("pregnant", 1.6),
            ("maternity", 1.6),
            ("paternity", 1.6),
            ("childcare", 1.6),
            ("flexible schedule", 1.6),
            ("work-life balance", 1.6),
            ("personal obligations", 1.6),
        ],
        recommendation: "Avoid references to family status or personal life circumstances",
    },
    CategoryRule {
        category: TextBiasCategory::Socioeconomic,
        phrases: &[
            ("expensive education", 1.2),
            ("ivy league", 1.2),
            ("prestigious", 1.2),
            ("elite", 1.2),
            ("upper class", 1.2),
            ("privileged", 1.2),
            ("disadvantaged", 1.2),
            ("connections", 1.2),
            ("social status", 1.2),
            ("well-connected", 1.2),
        ],
        recommendation: "Focus on skills and achievements rather than background or connections",
    },
    CategoryRule {
        category: TextBiasCategory::Disability,
        phrases: &[
            ("disabled", 1.7),
            ("handicapped", 1.7),
            ("accommodation", 1.7),
            ("special needs", 1.7),
            ("medical condition", 1.7),
            ("physical ability", 1.7),
            ("mental health", 1.7),
            ("psychiatric", 1.7),
            ("therapy", 1.7),
        ],
        recommendation: "Ensure evaluations are based on ability to perform job functions",
    },
];

pub const HIGH_RISK_HEADER: &str = "High bias risk - Recommend immediate review and revision";
pub const CLEAN_TEXT: &str = "Text appears to be free of obvious bias indicators";
pub const GENERAL_GUIDANCE: &[&str] = &[
    "Use structured evaluation criteria",
    "Consider blind review processes where possible",
    "Train evaluators on unconscious bias recognition",
];
