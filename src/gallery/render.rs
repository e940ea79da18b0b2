use crate::gallery::deck::DECK_SIZE;
use crate::gallery::state::{Action, GalleryView, LoadState, Mode, ViewState};
use crate::gallery::videos::VideoLookup;
use crate::models::card::Card;

const STYLESHEET: &str = include_str!("../../static/gallery.css");

pub const PREVIEW_UNAVAILABLE: &str = "Sorry, a video preview for this card is not available yet.";

const ELIXIR_DROP_PATH: &str =
    "M16 0C16 0 32 15.63 32 24C32 32.84 24.84 40 16 40C7.16 40 0 32.84 0 24C0 15.63 16 0 16 0Z";

/// Page-wide inputs that do not come from the URL.
pub struct PageContext<'a> {
    pub background_url: &'a str,
    pub videos: &'a VideoLookup,
}

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Everything up to and including the loading indicator.
///
/// Sent before the card request starts so the browser can paint the loader.
pub fn render_shell(state: &ViewState, ctx: &PageContext) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Clash Royale Card Database</title>\n");
    html.push_str(&format!("<style>\n{}</style>\n</head>\n", STYLESHEET));
    html.push_str(&format!(
        "<body style=\"background-image: url('{}')\">\n<div class=\"veil\">\n<main class=\"container\">\n",
        escape_html(ctx.background_url)
    ));
    html.push_str("<header class=\"page-header\">\n<h1>Clash Royale Card Database</h1>\n");
    html.push_str("<p>Explore cards or build your perfect deck.</p>\n</header>\n");
    html.push_str(&render_mode_bar(state));
    html.push_str("<div id=\"loader\" class=\"loader-block\"><div class=\"loader\"></div><p>Loading Cards...</p></div>\n");
    html
}

/// Everything after the loader, once the card request has settled.
pub fn render_body(view: &GalleryView, ctx: &PageContext) -> String {
    let mut html = String::new();

    if !view.is_loading() {
        html.push_str("<style>#loader { display: none; }</style>\n");
    }

    if let Some(notice) = &view.notice {
        html.push_str(&format!(
            "<div class=\"notice\" role=\"alert\">{}</div>\n",
            escape_html(notice)
        ));
    }

    if let LoadState::Failed(message) = &view.load {
        html.push_str(&render_error(message));
    }

    let deck = view.recommended_deck();
    if !deck.is_empty() {
        html.push_str(&render_deck(&deck));
    }

    if let LoadState::Loaded(cards) = &view.load {
        html.push_str(&render_grid(cards, &view.state));
    }

    html.push_str("</main>\n</div>\n");

    if view.state.mode == Mode::Explorer {
        if let Some(card) = view.preview_card() {
            html.push_str(&render_overlay(card, &view.state, ctx.videos));
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_mode_bar(state: &ViewState) -> String {
    let builder = state.mode == Mode::Builder;
    let (switch_to, explorer_class, builder_class) = if builder {
        (Action::Explorer, "mode-label", "mode-label active")
    } else {
        (Action::Builder, "mode-label active", "mode-label")
    };

    let mut html = String::from("<nav class=\"mode-bar\">\n");
    html.push_str(&format!(
        "<a class=\"{}\" href=\"{}\">Card Explorer</a>\n",
        explorer_class,
        escape_html(&state.after(Action::Explorer).href())
    ));
    html.push_str(&format!(
        "<a class=\"switch{}\" href=\"{}\" role=\"switch\" aria-checked=\"{}\"><span class=\"knob\"></span></a>\n",
        if builder { " on" } else { "" },
        escape_html(&state.after(switch_to).href()),
        builder
    ));
    html.push_str(&format!(
        "<a class=\"{}\" href=\"{}\">Deck Builder</a>\n",
        builder_class,
        escape_html(&state.after(Action::Builder).href())
    ));

    if builder {
        let count = state.selection.len();
        if state.selection.can_build() {
            html.push_str(&format!(
                "<a class=\"build-button\" href=\"{}\">Find Best Deck ({} selected)</a>\n",
                escape_html(&state.build_href()),
                count
            ));
        } else {
            html.push_str(&format!(
                "<span class=\"build-button disabled\" aria-disabled=\"true\" title=\"Select at least {} cards\">Find Best Deck ({} selected)</span>\n",
                DECK_SIZE, count
            ));
        }
    }

    html.push_str("</nav>\n");
    html
}

fn render_error(message: &str) -> String {
    format!(
        "<div class=\"error-panel\"><p class=\"error-title\">An Error Occurred</p><p>{}</p></div>\n",
        escape_html(message)
    )
}

fn render_deck(deck: &[&Card]) -> String {
    let mut html = String::from("<section class=\"deck\">\n<h2>Recommended Deck for You</h2>\n<div class=\"deck-grid\">\n");
    for card in deck {
        if let Some(icon) = card.icon() {
            html.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">\n",
                escape_html(icon),
                escape_html(&card.name)
            ));
        }
    }
    html.push_str("</div>\n</section>\n");
    html
}

fn render_grid(cards: &[Card], state: &ViewState) -> String {
    let mut html = String::from("<div class=\"grid\">\n");
    for card in cards {
        html.push_str(&render_tile(card, state));
    }
    html.push_str("</div>\n");
    html
}

/// One card tile, or nothing when the card has no icon.
pub fn render_tile(card: &Card, state: &ViewState) -> String {
    let Some(icon) = card.icon() else {
        return String::new();
    };

    let (click, selected) = match state.mode {
        Mode::Explorer => (Action::Open(card.id), false),
        Mode::Builder => (Action::Toggle(card.id), state.selection.contains(card.id)),
    };

    let mut html = format!(
        "<a class=\"tile {}{}\" href=\"{}\" data-card-id=\"{}\" title=\"{}\">\n<div class=\"tile-art\">\n<img src=\"{}\" alt=\"{}\">\n",
        card.rarity.style_class(),
        if selected { " selected" } else { "" },
        escape_html(&state.after(click).href()),
        card.id,
        escape_html(card.rarity.label()),
        escape_html(icon),
        escape_html(&card.name)
    );

    if let Some(cost) = card.elixir_cost {
        html.push_str(&format!(
            "<div class=\"elixir\"><svg viewBox=\"0 0 32 40\"><path d=\"{}\" fill=\"#D652F5\"/></svg><span>{}</span></div>\n",
            ELIXIR_DROP_PATH, cost
        ));
    }

    html.push_str(&format!("</div>\n<h3>{}</h3>\n", escape_html(&card.name)));

    if card.hitpoints.is_some() || card.damage.is_some() {
        html.push_str("<div class=\"stats\">\n");
        if let Some(hitpoints) = card.hitpoints {
            html.push_str(&format!("<p class=\"stat hitpoints\">\u{2764}\u{fe0f} <b>{}</b></p>\n", hitpoints));
        }
        if let Some(damage) = card.damage {
            html.push_str(&format!("<p class=\"stat damage\">\u{2694}\u{fe0f} <b>{}</b></p>\n", damage));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</a>\n");
    html
}

/// Video preview overlay. The backdrop and the close control both dismiss it;
/// the content panel is not inside the backdrop link.
pub fn render_overlay(card: &Card, state: &ViewState, videos: &VideoLookup) -> String {
    let close = escape_html(&state.after(Action::Close).href());
    let mut html = String::from("<div class=\"overlay\">\n");
    html.push_str(&format!(
        "<a class=\"overlay-backdrop\" href=\"{}\" aria-label=\"Close preview\"></a>\n",
        close
    ));
    html.push_str("<div class=\"overlay-content\">\n");
    html.push_str(&format!(
        "<a class=\"overlay-close\" href=\"{}\" aria-label=\"Close\">&times;</a>\n",
        close
    ));
    html.push_str(&format!("<h2>{} - Video Preview</h2>\n", escape_html(&card.name)));

    match videos.embed_url(&card.name) {
        Some(url) => html.push_str(&format!(
            "<div class=\"video\"><iframe src=\"{}\" title=\"YouTube video player\" frameborder=\"0\" allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" allowfullscreen></iframe></div>\n",
            escape_html(&url)
        )),
        None => html.push_str(&format!("<p class=\"placeholder\">{}</p>\n", PREVIEW_UNAVAILABLE)),
    }

    html.push_str("</div>\n</div>\n");
    html
}
