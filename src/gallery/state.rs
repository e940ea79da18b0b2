use std::borrow::Cow;

use rand::Rng;

use crate::catalog::proxy::ProxyReply;
use crate::gallery::deck::{build_deck, Selection, INSUFFICIENT_SELECTION_NOTICE};
use crate::logger;
use crate::models::card::Card;
use crate::models::http_response::{CardsPayload, ErrorPayload};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load card data.";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mode {
    #[default]
    Explorer,
    Builder,
}

/// One-shot interactions carried by the `action` query key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Explorer,
    Builder,
    Toggle(i64),
    Open(i64),
    Close,
    Build,
}

impl Action {
    fn parse(name: &str, card: Option<i64>) -> Option<Self> {
        match (name, card) {
            ("explorer", _) => Some(Action::Explorer),
            ("builder", _) => Some(Action::Builder),
            ("toggle", Some(id)) => Some(Action::Toggle(id)),
            ("open", Some(id)) => Some(Action::Open(id)),
            ("close", _) => Some(Action::Close),
            ("build", _) => Some(Action::Build),
            _ => None,
        }
    }
}

/// Everything the page remembers between clicks. Lives only in the URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub mode: Mode,
    pub selection: Selection,
    /// Ids of the recommended deck, in draw order.
    pub deck: Vec<i64>,
    pub preview: Option<i64>,
}

impl ViewState {
    /// Reads the state and any pending action from a raw query string.
    pub fn from_query(query: &str) -> (Self, Option<Action>) {
        let mut state = ViewState::default();
        let mut action_name: Option<String> = None;
        let mut card: Option<i64> = None;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let raw = raw.replace('+', " ");
            let value = urlencoding::decode(&raw).unwrap_or(Cow::Borrowed(""));

            match key {
                "mode" if value == "builder" => state.mode = Mode::Builder,
                "selected" => state.selection = parse_ids(&value).collect(),
                "deck" => state.deck = parse_ids(&value).collect(),
                "preview" => state.preview = value.trim().parse().ok(),
                "action" => action_name = Some(value.into_owned()),
                "card" => card = value.trim().parse().ok(),
                _ => {}
            }
        }

        // A selection only exists while building; an overlay only while exploring.
        match state.mode {
            Mode::Explorer => state.selection = Selection::new(),
            Mode::Builder => state.preview = None,
        }

        let action = action_name.and_then(|name| Action::parse(&name, card));
        (state, action)
    }

    /// Canonical query string. Never carries an action.
    pub fn to_query(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if self.mode == Mode::Builder {
            parts.push("mode=builder".to_string());
            if !self.selection.is_empty() {
                parts.push(format!("selected={}", join_ids(self.selection.ids())));
            }
        }
        if !self.deck.is_empty() {
            parts.push(format!("deck={}", join_ids(self.deck.iter().copied())));
        }
        if let (Mode::Explorer, Some(id)) = (self.mode, self.preview) {
            parts.push(format!("preview={}", id));
        }

        parts.join("&")
    }

    pub fn href(&self) -> String {
        let query = self.to_query();
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", query)
        }
    }

    /// Applies every action except `Build`, which needs the loaded cards.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Explorer if self.mode != Mode::Explorer => {
                self.mode = Mode::Explorer;
                self.selection = Selection::new();
            }
            Action::Builder if self.mode != Mode::Builder => {
                self.mode = Mode::Builder;
                self.selection = Selection::new();
                self.preview = None;
            }
            Action::Toggle(id) if self.mode == Mode::Builder => self.selection.toggle(id),
            Action::Open(id) if self.mode == Mode::Explorer => self.preview = Some(id),
            Action::Close => self.preview = None,
            _ => {}
        }
    }

    /// State after `action`, leaving `self` untouched. Used to build links.
    pub fn after(&self, action: Action) -> Self {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    /// Link that fires the build on the next load.
    pub fn build_href(&self) -> String {
        let query = self.to_query();
        if query.is_empty() {
            "/?action=build".to_string()
        } else {
            format!("/?{}&action=build", query)
        }
    }
}

fn parse_ids(value: &str) -> impl Iterator<Item = i64> + '_ {
    value.split(',').filter_map(|id| id.trim().parse().ok())
}

fn join_ids(ids: impl Iterator<Item = i64>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded(Vec<Card>),
    Failed(String),
}

/// A single page load: view state plus the outcome of the one card request.
#[derive(Debug, Clone)]
pub struct GalleryView {
    pub state: ViewState,
    pub load: LoadState,
    pub notice: Option<String>,
    pending_build: bool,
}

impl GalleryView {
    pub fn from_query(query: &str) -> Self {
        let (mut state, action) = ViewState::from_query(query);
        let mut pending_build = false;

        match action {
            Some(Action::Build) => pending_build = true,
            Some(action) => state.apply(action),
            None => {}
        }

        Self {
            state,
            load: LoadState::Loading,
            notice: None,
            pending_build,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadState::Loading
    }

    /// Stores the proxy's answer. Ignored unless the view is still loading.
    pub fn resolve<R: Rng + ?Sized>(&mut self, reply: &ProxyReply, rng: &mut R) {
        if !self.is_loading() {
            logger!(DEBUG, "[GALLERY] Ignoring card reply for a view that already settled");
            return;
        }

        self.load = match decode_reply(reply) {
            Ok(cards) => LoadState::Loaded(cards),
            Err(message) => LoadState::Failed(message),
        };

        if let LoadState::Loaded(cards) = &self.load {
            if let Some(id) = self.state.preview {
                if !cards.iter().any(|c| c.id == id) {
                    self.state.preview = None;
                }
            }
            self.state.deck.retain(|id| cards.iter().any(|c| c.id == *id));
        }

        if std::mem::take(&mut self.pending_build) {
            self.build(rng);
        }
    }

    /// Replaces the recommended deck, or sets a notice and changes nothing.
    pub fn build<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let LoadState::Loaded(cards) = &self.load else {
            return;
        };

        match build_deck(cards, &self.state.selection, rng) {
            Some(deck) => {
                self.state.deck = deck.iter().map(|c| c.id).collect();
                self.notice = None;
            }
            None => {
                logger!(
                    DEBUG,
                    "[GALLERY] Deck build rejected with {} cards selected",
                    self.state.selection.len()
                );
                self.notice = Some(INSUFFICIENT_SELECTION_NOTICE.to_string());
            }
        }
    }

    pub fn cards(&self) -> &[Card] {
        match &self.load {
            LoadState::Loaded(cards) => cards,
            _ => &[],
        }
    }

    pub fn card(&self, id: i64) -> Option<&Card> {
        self.cards().iter().find(|c| c.id == id)
    }

    pub fn recommended_deck(&self) -> Vec<&Card> {
        self.state.deck.iter().filter_map(|id| self.card(*id)).collect()
    }

    pub fn preview_card(&self) -> Option<&Card> {
        self.state.preview.and_then(|id| self.card(id))
    }
}

/// Turns a `/api/cards` answer into cards or a message fit for the error panel.
fn decode_reply(reply: &ProxyReply) -> Result<Vec<Card>, String> {
    if !reply.is_success() {
        let message = serde_json::from_str::<ErrorPayload>(&reply.body)
            .map(|e| e.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| LOAD_FAILED_MESSAGE.to_string());
        return Err(message);
    }

    let payload = serde_json::from_str::<CardsPayload>(&reply.body).map_err(|e| {
        logger!(ERROR, "[GALLERY] Card payload unreadable ({e})");
        LOAD_FAILED_MESSAGE.to_string()
    })?;

    let mut cards = Vec::with_capacity(payload.cards.len());
    for record in &payload.cards {
        match Card::from_value(record) {
            Ok(card) => cards.push(card),
            Err(error) => logger!(WARN, "[GALLERY] Skipping unreadable card record ({error})"),
        }
    }

    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::proxy::error_reply;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn cards_reply(n: i64) -> ProxyReply {
        let cards: Vec<_> = (1..=n)
            .map(|id| json!({
                "id": id,
                "name": format!("Card {id}"),
                "elixirCost": 2,
                "rarity": "rare",
                "iconUrls": { "medium": format!("https://x.test/{id}.png") }
            }))
            .collect();
        ProxyReply { status: 200, body: json!({ "cards": cards }).to_string() }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn test_query_round_trip() {
        let (state, action) = ViewState::from_query("mode=builder&selected=3,1,2&deck=9,8");
        assert_eq!(action, None);
        assert_eq!(state.mode, Mode::Builder);
        assert_eq!(state.selection.ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(state.deck, vec![9, 8]);

        let (again, _) = ViewState::from_query(&state.to_query());
        assert_eq!(again, state);
    }

    #[test]
    fn test_default_state_links_to_root() {
        assert_eq!(ViewState::default().href(), "/");
        assert_eq!(ViewState::default().build_href(), "/?action=build");
    }

    #[test]
    fn test_garbage_ids_are_ignored() {
        let (state, _) = ViewState::from_query("mode=builder&selected=1,x,%32,,4&preview=abc");
        assert_eq!(state.selection.ids().collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(state.preview, None);
    }

    #[test]
    fn test_explorer_drops_selection_and_builder_drops_preview() {
        let (state, _) = ViewState::from_query("selected=1,2&preview=5");
        assert!(state.selection.is_empty());
        assert_eq!(state.preview, Some(5));

        let (state, _) = ViewState::from_query("mode=builder&preview=5");
        assert_eq!(state.preview, None);
    }

    #[test]
    fn test_entering_builder_starts_empty_and_keeps_deck() {
        let mut state = ViewState { deck: vec![1, 2], preview: Some(4), ..Default::default() };
        state.apply(Action::Builder);
        assert_eq!(state.mode, Mode::Builder);
        assert!(state.selection.is_empty());
        assert_eq!(state.preview, None);
        assert_eq!(state.deck, vec![1, 2]);

        state.apply(Action::Toggle(7));
        state.apply(Action::Builder);
        assert!(state.selection.contains(7));

        state.apply(Action::Explorer);
        assert!(state.selection.is_empty());
        assert_eq!(state.deck, vec![1, 2]);
    }

    #[test]
    fn test_clicks_depend_on_mode() {
        let mut state = ViewState::default();
        state.apply(Action::Toggle(3));
        assert!(state.selection.is_empty());
        state.apply(Action::Open(3));
        assert_eq!(state.preview, Some(3));
        state.apply(Action::Close);
        assert_eq!(state.preview, None);

        state.apply(Action::Builder);
        state.apply(Action::Open(3));
        assert_eq!(state.preview, None);
        state.apply(Action::Toggle(3));
        assert!(state.selection.contains(3));
    }

    #[test]
    fn test_action_from_query() {
        let view = GalleryView::from_query("action=open&card=26000000");
        assert_eq!(view.state.preview, Some(26000000));
        assert!(view.is_loading());

        let view = GalleryView::from_query("action=toggle");
        assert_eq!(view.state, ViewState::default());
    }

    #[test]
    fn test_successful_reply_loads_cards() {
        let mut view = GalleryView::from_query("");
        view.resolve(&cards_reply(3), &mut rng());
        assert_eq!(view.cards().len(), 3);
        assert_eq!(view.notice, None);
    }

    #[test]
    fn test_failed_reply_surfaces_proxy_message() {
        let mut view = GalleryView::from_query("");
        view.resolve(&error_reply(403, "invalid key"), &mut rng());
        assert_eq!(view.load, LoadState::Failed("invalid key".to_string()));

        let mut view = GalleryView::from_query("");
        view.resolve(&ProxyReply { status: 500, body: "oops".to_string() }, &mut rng());
        assert_eq!(view.load, LoadState::Failed(LOAD_FAILED_MESSAGE.to_string()));
    }

    #[test]
    fn test_settled_view_ignores_late_reply() {
        let mut view = GalleryView::from_query("");
        view.resolve(&error_reply(500, "first"), &mut rng());
        view.resolve(&cards_reply(3), &mut rng());
        assert_eq!(view.load, LoadState::Failed("first".to_string()));
    }

    #[test]
    fn test_unreadable_records_are_skipped() {
        let body = json!({ "cards": [
            { "id": 1, "name": "Knight", "iconUrls": { "medium": "https://x.test/1.png" } },
            { "name": "No id" },
            "not even an object"
        ]}).to_string();
        let mut view = GalleryView::from_query("");
        view.resolve(&ProxyReply { status: 200, body }, &mut rng());
        assert_eq!(view.cards().len(), 1);
    }

    #[test]
    fn test_build_with_eight_selected() {
        let mut view = GalleryView::from_query("mode=builder&selected=1,2,3,4,5,6,7,8&action=build");
        view.resolve(&cards_reply(12), &mut rng());

        let mut deck = view.state.deck.clone();
        deck.sort();
        assert_eq!(deck, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(view.recommended_deck().len(), 8);
        assert_eq!(view.notice, None);
    }

    #[test]
    fn test_build_with_seven_selected_keeps_previous_deck() {
        let query = "mode=builder&selected=1,2,3,4,5,6,7&deck=9,10,11,12,13,14,15,16&action=build";
        let mut view = GalleryView::from_query(query);
        view.resolve(&cards_reply(20), &mut rng());

        assert_eq!(view.state.deck, vec![9, 10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(view.notice.as_deref(), Some(INSUFFICIENT_SELECTION_NOTICE));
    }

    #[test]
    fn test_build_replaces_deck() {
        let mut view = GalleryView::from_query("mode=builder&selected=1,2,3,4,5,6,7,8,9,10");
        view.resolve(&cards_reply(10), &mut rng());
        view.state.deck = vec![99];

        view.build(&mut rng());
        assert_eq!(view.state.deck.len(), 8);
        assert!(!view.state.deck.contains(&99));
    }

    #[test]
    fn test_stale_preview_and_deck_ids_are_dropped() {
        let mut view = GalleryView::from_query("preview=404&deck=1,404,2");
        view.resolve(&cards_reply(3), &mut rng());
        assert_eq!(view.state.preview, None);
        assert_eq!(view.state.deck, vec![1, 2]);
    }
}
