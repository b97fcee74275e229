//! Casting state: the batch of character cards on display and the cast
//! selected from it.
//!
//! This is the synchronous heart of the workflow. Every invariant lives
//! here so the async session and the terminal front-end can both lean on
//! the same rules:
//! - the cast never exceeds [`MAX_CAST`] members
//! - a card's selected state always mirrors cast membership
//! - a rerolled slot evicts its old id from the cast
//! - a slot with a request in flight refuses a second one

use std::collections::HashSet;

use menagerie_client::{Analysis, CharacterCard};

/// Maximum number of characters in the cast.
pub const MAX_CAST: usize = 3;

/// Default number of cards fetched per batch.
pub const DEFAULT_BATCH_SIZE: usize = 9;

/// Verdict of a select toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The slot's card joined the cast.
    Selected,
    /// The slot's card left the cast.
    Deselected,
    /// The cast already has [`MAX_CAST`] members; nothing changed.
    CastFull,
    /// No card at that slot; nothing changed.
    NoSuchSlot,
}

/// The current batch of cards plus the selected cast.
#[derive(Debug, Clone, Default)]
pub struct CastingState {
    batch: Vec<CharacterCard>,
    cast: Vec<String>,
    pending: HashSet<usize>,
}

impl CastingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole batch. Clears the cast and any pending slot work,
    /// since every previous card is gone.
    pub fn replace_batch(&mut self, cards: Vec<CharacterCard>) {
        self.batch = cards;
        self.cast.clear();
        self.pending.clear();
    }

    /// All cards in slot order.
    pub fn cards(&self) -> &[CharacterCard] {
        &self.batch
    }

    /// The card at a slot, if the slot exists.
    pub fn card(&self, slot: usize) -> Option<&CharacterCard> {
        self.batch.get(slot)
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    /// Ids of every card on display, for reroll exclusion lists.
    pub fn excluded_ids(&self) -> Vec<String> {
        self.batch.iter().map(|card| card.id.clone()).collect()
    }

    /// Whether the slot's card is in the cast.
    pub fn is_selected(&self, slot: usize) -> bool {
        self.batch
            .get(slot)
            .is_some_and(|card| self.cast.iter().any(|id| *id == card.id))
    }

    /// Toggle a slot in or out of the cast.
    pub fn toggle_select(&mut self, slot: usize) -> ToggleOutcome {
        let Some(card) = self.batch.get(slot) else {
            return ToggleOutcome::NoSuchSlot;
        };
        let id = card.id.clone();

        if let Some(position) = self.cast.iter().position(|existing| *existing == id) {
            self.cast.remove(position);
            return ToggleOutcome::Deselected;
        }

        if self.cast.len() >= MAX_CAST {
            return ToggleOutcome::CastFull;
        }

        self.cast.push(id);
        ToggleOutcome::Selected
    }

    /// Selected ids in the order the user picked them.
    pub fn cast_ids(&self) -> &[String] {
        &self.cast
    }

    pub fn cast_len(&self) -> usize {
        self.cast.len()
    }

    /// True exactly when the cast is ready for a story.
    pub fn cast_complete(&self) -> bool {
        self.cast.len() == MAX_CAST
    }

    /// The selected cards, in selection order.
    pub fn cast_cards(&self) -> Vec<&CharacterCard> {
        self.cast
            .iter()
            .filter_map(|id| self.batch.iter().find(|card| card.id == *id))
            .collect()
    }

    /// Mark a slot as having a request in flight.
    ///
    /// Returns false (and changes nothing) when the slot is unknown or
    /// already busy, so an older response can never clobber a newer one.
    pub fn begin_slot_work(&mut self, slot: usize) -> bool {
        if slot >= self.batch.len() || self.pending.contains(&slot) {
            return false;
        }
        self.pending.insert(slot);
        true
    }

    /// Clear a slot's in-flight marker once its request resolved.
    pub fn finish_slot_work(&mut self, slot: usize) {
        self.pending.remove(&slot);
    }

    /// Whether a slot has a request in flight.
    pub fn slot_busy(&self, slot: usize) -> bool {
        self.pending.contains(&slot)
    }

    /// Replace one slot's card after a successful reroll.
    ///
    /// If the replaced card was in the cast, it leaves the cast: the
    /// character it referred to no longer exists.
    pub fn apply_reroll(&mut self, slot: usize, card: CharacterCard) -> bool {
        let Some(existing) = self.batch.get_mut(slot) else {
            return false;
        };
        let old_id = existing.id.clone();
        *existing = card;
        self.cast.retain(|id| *id != old_id);
        true
    }

    /// Overwrite a slot card's analysis fields after a successful describe.
    pub fn apply_analysis(&mut self, slot: usize, analysis: &Analysis) -> bool {
        match self.batch.get_mut(slot) {
            Some(card) => {
                card.apply_analysis(analysis);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str) -> CharacterCard {
        CharacterCard {
            id: id.to_string(),
            name: format!("Character {id}"),
            style: "watercolor".to_string(),
            story: String::new(),
            character_traits: vec!["curious".to_string()],
            image_url: format!("http://studio.local/art/{id}.png"),
        }
    }

    fn state_with(ids: &[&str]) -> CastingState {
        let mut state = CastingState::new();
        state.replace_batch(ids.iter().map(|id| card(id)).collect());
        state
    }

    #[test]
    fn test_cast_never_exceeds_max() {
        let mut state = state_with(&["a", "b", "c", "d", "e"]);

        for slot in 0..5 {
            state.toggle_select(slot);
        }

        assert_eq!(state.cast_len(), MAX_CAST);
        assert_eq!(state.toggle_select(4), ToggleOutcome::CastFull);
        assert_eq!(state.cast_len(), MAX_CAST);
    }

    #[test]
    fn test_toggle_is_invertible() {
        let mut state = state_with(&["a", "b", "c"]);
        state.toggle_select(0);
        let before: Vec<String> = state.cast_ids().to_vec();

        assert_eq!(state.toggle_select(1), ToggleOutcome::Selected);
        assert_eq!(state.toggle_select(1), ToggleOutcome::Deselected);

        assert_eq!(state.cast_ids(), before.as_slice());
    }

    #[test]
    fn test_toggle_unknown_slot_changes_nothing() {
        let mut state = state_with(&["a"]);
        assert_eq!(state.toggle_select(9), ToggleOutcome::NoSuchSlot);
        assert_eq!(state.cast_len(), 0);
    }

    #[test]
    fn test_selection_mirrors_membership() {
        let mut state = state_with(&["a", "b"]);
        assert!(!state.is_selected(0));
        state.toggle_select(0);
        assert!(state.is_selected(0));
        assert!(!state.is_selected(1));
    }

    #[test]
    fn test_replace_batch_clears_cast_and_pending() {
        let mut state = state_with(&["a", "b", "c"]);
        state.toggle_select(0);
        assert!(state.begin_slot_work(1));

        state.replace_batch(vec![card("x"), card("y")]);

        assert_eq!(state.len(), 2);
        assert_eq!(state.cast_len(), 0);
        assert!(!state.slot_busy(1));
    }

    #[test]
    fn test_reroll_replaces_only_that_slot() {
        let mut state = state_with(&["a", "b", "c"]);
        let before: Vec<CharacterCard> = state.cards().to_vec();

        assert!(state.apply_reroll(1, card("d")));

        assert_eq!(state.card(0), Some(&before[0]));
        assert_eq!(state.card(1).unwrap().id, "d");
        assert_eq!(state.card(2), Some(&before[2]));
    }

    #[test]
    fn test_reroll_evicts_selected_card() {
        let mut state = state_with(&["a", "b", "c"]);
        state.toggle_select(0);
        state.toggle_select(1);
        state.toggle_select(2);
        assert!(state.cast_complete());

        state.apply_reroll(1, card("d"));

        assert_eq!(state.cast_len(), 2);
        assert!(!state.cast_complete());
        assert!(!state.cast_ids().contains(&"b".to_string()));
        // The fresh card starts unselected.
        assert!(!state.is_selected(1));
    }

    #[test]
    fn test_slot_guard_rejects_double_work() {
        let mut state = state_with(&["a", "b"]);

        assert!(state.begin_slot_work(0));
        assert!(!state.begin_slot_work(0));
        // Other slots are independent.
        assert!(state.begin_slot_work(1));

        state.finish_slot_work(0);
        assert!(state.begin_slot_work(0));
    }

    #[test]
    fn test_slot_guard_rejects_unknown_slot() {
        let mut state = state_with(&["a"]);
        assert!(!state.begin_slot_work(5));
    }

    #[test]
    fn test_excluded_ids_cover_whole_batch() {
        let state = state_with(&["a", "b", "c"]);
        assert_eq!(state.excluded_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_apply_analysis_overwrites_fields_in_place() {
        let mut state = state_with(&["a"]);
        let analysis = Analysis {
            name: "Maple".to_string(),
            style: "gouache".to_string(),
            story: "A quiet gardener.".to_string(),
            character_traits: vec!["patient".to_string()],
        };

        assert!(state.apply_analysis(0, &analysis));

        let card = state.card(0).unwrap();
        assert_eq!(card.name, "Maple");
        assert_eq!(card.style, "gouache");
        assert_eq!(card.id, "a");
    }

    #[test]
    fn test_cast_cards_follow_selection_order() {
        let mut state = state_with(&["a", "b", "c"]);
        state.toggle_select(2);
        state.toggle_select(0);

        let ids: Vec<&str> = state.cast_cards().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }
}
