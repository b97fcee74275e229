//! Story form: the option lists shown to the user and the form state
//! submitted to begin a story.

use menagerie_client::StoryRequest;

/// One selectable story option with its display emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryChoice {
    pub emoji: &'static str,
    pub label: &'static str,
}

/// Primary conflict options.
pub const CONFLICTS: &[StoryChoice] = &[
    StoryChoice { emoji: "🐿️", label: "Squirrel gang's mischief" },
    StoryChoice { emoji: "🧙‍♂️", label: "Rat wizard's devious plots" },
    StoryChoice { emoji: "🦃", label: "Turkey's clumsy adventures" },
    StoryChoice { emoji: "🐔", label: "Chicken's clever conspiracies" },
];

/// Setting options.
pub const SETTINGS: &[StoryChoice] = &[
    StoryChoice { emoji: "🌳", label: "Deep Forest" },
    StoryChoice { emoji: "🌾", label: "Sunny Pasture" },
    StoryChoice { emoji: "🏡", label: "Homestead" },
    StoryChoice { emoji: "🌲", label: "Mysterious Woods" },
];

/// Narrative style options.
pub const NARRATIVE_STYLES: &[StoryChoice] = &[
    StoryChoice { emoji: "😎", label: "GenZ fresh style" },
    StoryChoice { emoji: "✌️", label: "Old hippie 1960s vibe" },
    StoryChoice { emoji: "🤘", label: "Mix of both" },
];

/// Mood options.
pub const MOODS: &[StoryChoice] = &[
    StoryChoice { emoji: "😄", label: "Joyful and playful" },
    StoryChoice { emoji: "😲", label: "Thrilling and mysterious" },
    StoryChoice { emoji: "😎", label: "Cool and laid-back" },
    StoryChoice { emoji: "😂", label: "Funny and quirky" },
];

/// The story form as the user fills it in.
///
/// Each dimension has a picked option and an optional free-text override;
/// a non-empty override wins when the form is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryForm {
    pub conflict: String,
    pub setting: String,
    pub narrative_style: String,
    pub mood: String,
    pub custom_conflict: String,
    pub custom_setting: String,
    pub custom_narrative: String,
    pub custom_mood: String,
}

impl Default for StoryForm {
    fn default() -> Self {
        Self {
            conflict: CONFLICTS[0].label.to_string(),
            setting: SETTINGS[0].label.to_string(),
            narrative_style: NARRATIVE_STYLES[0].label.to_string(),
            mood: MOODS[0].label.to_string(),
            custom_conflict: String::new(),
            custom_setting: String::new(),
            custom_narrative: String::new(),
            custom_mood: String::new(),
        }
    }
}

impl StoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// The conflict that will actually be used: custom text when present.
    pub fn resolved_conflict(&self) -> &str {
        resolve(&self.custom_conflict, &self.conflict)
    }

    pub fn resolved_setting(&self) -> &str {
        resolve(&self.custom_setting, &self.setting)
    }

    pub fn resolved_narrative_style(&self) -> &str {
        resolve(&self.custom_narrative, &self.narrative_style)
    }

    pub fn resolved_mood(&self) -> &str {
        resolve(&self.custom_mood, &self.mood)
    }

    /// Build the wire request for this form plus the selected cast.
    pub fn to_request(&self, cast_ids: &[String]) -> StoryRequest {
        StoryRequest {
            conflict: self.conflict.clone(),
            setting: self.setting.clone(),
            narrative_style: self.narrative_style.clone(),
            mood: self.mood.clone(),
            custom_conflict: self.custom_conflict.clone(),
            custom_setting: self.custom_setting.clone(),
            custom_narrative: self.custom_narrative.clone(),
            custom_mood: self.custom_mood.clone(),
            selected_character_ids: cast_ids.to_vec(),
        }
    }
}

fn resolve<'a>(custom: &'a str, picked: &'a str) -> &'a str {
    let trimmed = custom.trim();
    if trimmed.is_empty() {
        picked
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_first_options() {
        let form = StoryForm::new();
        assert_eq!(form.conflict, "Squirrel gang's mischief");
        assert_eq!(form.setting, "Deep Forest");
        assert_eq!(form.resolved_mood(), "Joyful and playful");
    }

    #[test]
    fn test_custom_text_wins_when_present() {
        let mut form = StoryForm::new();
        form.custom_conflict = "A missing pie".to_string();
        assert_eq!(form.resolved_conflict(), "A missing pie");

        // Whitespace-only overrides don't count.
        form.custom_conflict = "   ".to_string();
        assert_eq!(form.resolved_conflict(), "Squirrel gang's mischief");
    }

    #[test]
    fn test_to_request_carries_cast_in_order() {
        let form = StoryForm::new();
        let ids = vec!["c".to_string(), "a".to_string(), "b".to_string()];

        let request = form.to_request(&ids);

        assert_eq!(request.selected_character_ids, ids);
        assert_eq!(request.conflict, form.conflict);
        assert!(request.custom_mood.is_empty());
    }
}
