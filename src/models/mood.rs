use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Affect label attached to an entry. Wire names are lowercase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Excited,
    Peaceful,
    Grateful,
    Neutral,
    Tired,
    Anxious,
    Confused,
    Sad,
    Angry,
}

impl Mood {
    /// Picker order.
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Excited,
        Mood::Peaceful,
        Mood::Grateful,
        Mood::Neutral,
        Mood::Tired,
        Mood::Anxious,
        Mood::Confused,
        Mood::Sad,
        Mood::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Excited => "excited",
            Mood::Peaceful => "peaceful",
            Mood::Grateful => "grateful",
            Mood::Neutral => "neutral",
            Mood::Tired => "tired",
            Mood::Anxious => "anxious",
            Mood::Confused => "confused",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Excited => "🤩",
            Mood::Peaceful => "😌",
            Mood::Grateful => "🙏",
            Mood::Neutral => "😐",
            Mood::Tired => "😴",
            Mood::Anxious => "😰",
            Mood::Confused => "😕",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .iter()
            .copied()
            .find(|mood| mood.as_str() == value)
            .ok_or_else(|| format!("unknown mood '{value}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_from_str() {
        for mood in Mood::ALL {
            assert_eq!(mood.as_str().parse::<Mood>().unwrap(), mood);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Mood::Grateful).unwrap(), "\"grateful\"");
        let parsed: Mood = serde_json::from_str("\"anxious\"").unwrap();
        assert_eq!(parsed, Mood::Anxious);
    }

    #[test]
    fn unknown_mood_is_rejected() {
        assert!("ecstatic".parse::<Mood>().is_err());
        assert!("".parse::<Mood>().is_err());
    }
}
