use std::collections::HashMap;

/// Card name to YouTube video id. Not every card has one.
const PREVIEW_VIDEOS: &[(&str, &str)] = &[
    ("P.E.K.K.A.", "F66-i5Ohp-w"),
    ("Hog Rider", "_3_212b_4hA"),
    ("Wizard", "Xt_N4m7gJ78"),
    ("Golem", "p_dYV5v-sGI"),
    ("Goblin Barrel", "fsZ2-pH48yY"),
    ("Knight", "i-3-n-p-mBE"),
];

/// Immutable name -> video id table, built once at startup.
#[derive(Debug, Clone)]
pub struct VideoLookup {
    videos: HashMap<String, String>,
}

impl VideoLookup {
    pub fn builtin() -> Self {
        Self::from_pairs(PREVIEW_VIDEOS.iter().copied())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let videos = pairs
            .into_iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect();
        Self { videos }
    }

    pub fn video_id(&self, card_name: &str) -> Option<&str> {
        self.videos.get(card_name).map(String::as_str)
    }

    pub fn embed_url(&self, card_name: &str) -> Option<String> {
        self.video_id(card_name)
            .map(|id| format!("https://www.youtube.com/embed/{}?autoplay=1", id))
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let lookup = VideoLookup::builtin();
        assert_eq!(lookup.len(), 6);
        assert_eq!(lookup.video_id("Hog Rider"), Some("_3_212b_4hA"));
        assert_eq!(
            lookup.embed_url("Knight").as_deref(),
            Some("https://www.youtube.com/embed/i-3-n-p-mBE?autoplay=1")
        );
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let lookup = VideoLookup::builtin();
        assert_eq!(lookup.video_id("knight"), None);
        assert_eq!(lookup.embed_url("Mirror"), None);
    }
}
