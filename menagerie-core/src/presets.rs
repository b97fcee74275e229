//! Cached instruction presets and hashtag collections, plus draft helpers.

use menagerie_client::{HashtagCollection, Instruction};

/// Local cache of the studio's presets.
///
/// Refreshed wholesale from the backend; lookups are by id so UI dropdowns
/// can keep a stable reference while the list changes underneath.
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    instructions: Vec<Instruction>,
    collections: Vec<HashtagCollection>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_instructions(&mut self, instructions: Vec<Instruction>) {
        self.instructions = instructions;
    }

    pub fn replace_collections(&mut self, collections: Vec<HashtagCollection>) {
        self.collections = collections;
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn collections(&self) -> &[HashtagCollection] {
        &self.collections
    }

    pub fn instruction(&self, id: &str) -> Option<&Instruction> {
        self.instructions.iter().find(|i| i.id == id)
    }

    pub fn collection(&self, id: &str) -> Option<&HashtagCollection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// The preset marked as default, if any.
    pub fn default_instruction(&self) -> Option<&Instruction> {
        self.instructions.iter().find(|i| i.is_default)
    }

    pub fn default_collection(&self) -> Option<&HashtagCollection> {
        self.collections.iter().find(|c| c.is_default)
    }
}

/// Split raw hashtag text into tags the studio will accept.
///
/// Splits on commas and newlines; only `#`-prefixed tokens survive. This
/// mirrors what the backend does with a submitted draft, so the UI can
/// preview exactly what will be stored.
pub fn parse_hashtags(raw: &str) -> Vec<String> {
    raw.replace('\n', ",")
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && tag.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hashtags_splits_commas_and_newlines() {
        let tags = parse_hashtags("#DogArt, #PetPortrait\n#Watercolor");
        assert_eq!(tags, vec!["#DogArt", "#PetPortrait", "#Watercolor"]);
    }

    #[test]
    fn test_parse_hashtags_drops_unprefixed_tokens() {
        let tags = parse_hashtags("#Good, bad, , #AlsoGood");
        assert_eq!(tags, vec!["#Good", "#AlsoGood"]);
    }

    #[test]
    fn test_default_lookups() {
        let mut library = PresetLibrary::new();
        library.replace_instructions(vec![
            Instruction {
                id: "1".to_string(),
                name: "Plain".to_string(),
                system_prompt: String::new(),
                user_prompt: String::new(),
                is_default: false,
            },
            Instruction {
                id: "2".to_string(),
                name: "House style".to_string(),
                system_prompt: String::new(),
                user_prompt: String::new(),
                is_default: true,
            },
        ]);

        assert_eq!(library.default_instruction().unwrap().id, "2");
        assert_eq!(library.instruction("1").unwrap().name, "Plain");
        assert!(library.instruction("9").is_none());
    }
}
