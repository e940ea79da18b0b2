use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::card::Card;

pub const DECK_SIZE: usize = 8;

pub const INSUFFICIENT_SELECTION_NOTICE: &str = "Please select at least 8 cards to build a deck.";

/// Card ids picked in deck-builder mode. Ordered so rendered links are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the id if absent, removes it if present.
    pub fn toggle(&mut self, card_id: i64) {
        if !self.ids.remove(&card_id) {
            self.ids.insert(card_id);
        }
    }

    pub fn contains(&self, card_id: i64) -> bool {
        self.ids.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn can_build(&self) -> bool {
        self.ids.len() >= DECK_SIZE
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<i64> for Selection {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self { ids: iter.into_iter().collect() }
    }
}

/// Draws a uniformly random permutation of the selected cards and keeps the first eight.
///
/// Only ids present in `cards` count towards the selection. Returns `None` when fewer than
/// eight of them resolve, leaving the caller's current deck alone.
pub fn build_deck<R: Rng + ?Sized>(cards: &[Card], selection: &Selection, rng: &mut R) -> Option<Vec<Card>> {
    let mut pool: Vec<Card> = cards
        .iter()
        .filter(|card| selection.contains(card.id))
        .cloned()
        .collect();

    if pool.len() < DECK_SIZE {
        return None;
    }

    pool.shuffle(rng);
    pool.truncate(DECK_SIZE);
    Some(pool)
}
