//! Emotion Catalog
//!
//! Static registry of every emotion the practice games can target, with its
//! display label, presentation asset and mastery tier.
//!
//! Tiers gate progression:
//! - **Basic** - happy, sad, angry
//! - **Complex** - surprised, fear, disgusted
//! - **Subtle** - confused, excited, disappointed, proud

use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Identifiers ====================

/// Emotion label known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionId {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fear,
    Disgusted,
    Confused,
    Excited,
    Disappointed,
    Proud,
}

impl EmotionId {
    pub const ALL: [EmotionId; 10] = [
        EmotionId::Happy,
        EmotionId::Sad,
        EmotionId::Angry,
        EmotionId::Surprised,
        EmotionId::Fear,
        EmotionId::Disgusted,
        EmotionId::Confused,
        EmotionId::Excited,
        EmotionId::Disappointed,
        EmotionId::Proud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Surprised => "surprised",
            Self::Fear => "fear",
            Self::Disgusted => "disgusted",
            Self::Confused => "confused",
            Self::Excited => "excited",
            Self::Disappointed => "disappointed",
            Self::Proud => "proud",
        }
    }

    /// Catalog entry for this emotion
    pub fn entry(&self) -> &'static EmotionEntry {
        entry(*self)
    }

    pub fn tier(&self) -> Tier {
        self.entry().tier
    }
}

impl fmt::Display for EmotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mastery tier, ordered by cognitive load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Complex,
    Subtle,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Complex, Tier::Subtle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Complex => "complex",
            Self::Subtle => "subtle",
        }
    }

    /// The tier that unlocks after this one, if any
    pub fn next(&self) -> Option<Tier> {
        match self {
            Self::Basic => Some(Self::Complex),
            Self::Complex => Some(Self::Subtle),
            Self::Subtle => None,
        }
    }

    /// Tiers that must be fully mastered before this one opens
    pub fn prerequisites(&self) -> &'static [Tier] {
        match self {
            Self::Basic => &[],
            Self::Complex => &[Tier::Basic],
            Self::Subtle => &[Tier::Basic, Tier::Complex],
        }
    }
}

// ==================== Registry ====================

/// Presentation metadata for one emotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionEntry {
    pub id: EmotionId,
    pub display_label: &'static str,
    pub presentation_asset: &'static str,
    pub tier: Tier,
}

const fn e(
    id: EmotionId,
    display_label: &'static str,
    presentation_asset: &'static str,
    tier: Tier,
) -> EmotionEntry {
    EmotionEntry {
        id,
        display_label,
        presentation_asset,
        tier,
    }
}

// Ordered by tier, then by clarity within the tier.
static CATALOG: [EmotionEntry; 10] = [
    e(EmotionId::Happy, "Happy", "emotions/happy.png", Tier::Basic),
    e(EmotionId::Sad, "Sad", "emotions/sad.png", Tier::Basic),
    e(EmotionId::Angry, "Angry", "emotions/angry.png", Tier::Basic),
    e(EmotionId::Surprised, "Surprised", "emotions/surprised.png", Tier::Complex),
    e(EmotionId::Fear, "Scared", "emotions/fear.png", Tier::Complex),
    e(EmotionId::Disgusted, "Disgusted", "emotions/disgusted.png", Tier::Complex),
    e(EmotionId::Confused, "Confused", "emotions/confused.png", Tier::Subtle),
    e(EmotionId::Excited, "Excited", "emotions/excited.png", Tier::Subtle),
    e(EmotionId::Disappointed, "Disappointed", "emotions/disappointed.png", Tier::Subtle),
    e(EmotionId::Proud, "Proud", "emotions/proud.png", Tier::Subtle),
];

pub fn all() -> &'static [EmotionEntry] {
    &CATALOG
}

pub fn entry(id: EmotionId) -> &'static EmotionEntry {
    // CATALOG is indexed in EmotionId declaration order
    &CATALOG[id as usize]
}

/// Resolve an external label ("Happy", " fear ", "scared") to a catalog id.
pub fn lookup(label: &str) -> Option<EmotionId> {
    let normalized = label.trim().to_lowercase();
    if normalized == "scared" || normalized == "afraid" {
        return Some(EmotionId::Fear);
    }
    CATALOG
        .iter()
        .find(|entry| entry.id.as_str() == normalized)
        .map(|entry| entry.id)
}

pub fn tier_members(tier: Tier) -> impl Iterator<Item = EmotionId> {
    CATALOG
        .iter()
        .filter(move |entry| entry.tier == tier)
        .map(|entry| entry.id)
}

/// The `count` lowest cognitive-load emotions in the catalog.
pub fn clearest(count: usize) -> Vec<EmotionId> {
    CATALOG.iter().take(count).map(|entry| entry.id).collect()
}
