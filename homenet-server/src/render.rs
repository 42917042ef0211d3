//! HTML rendering
//!
//! Full pages are read from the templates directory on first use. Fragments
//! returned to htmx are compiled into the binary. Every dynamic value goes
//! through minijinja's HTML auto-escaping.

use crate::db::{Details, Kind, Listing, Movie};
use homenet_common::config::Config;
use minijinja::{context, path_loader, Environment, Error};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const FRAGMENTS: &[(&str, &str)] = &[
    ("fragments/items.html", include_str!("../templates/fragments/items.html")),
    ("fragments/count.html", include_str!("../templates/fragments/count.html")),
    ("fragments/empty.html", include_str!("../templates/fragments/empty.html")),
    ("fragments/listing.html", include_str!("../templates/fragments/listing.html")),
    ("fragments/random.html", include_str!("../templates/fragments/random.html")),
    ("fragments/fortune.html", include_str!("../templates/fragments/fortune.html")),
    ("fragments/relay_error.html", include_str!("../templates/fragments/relay_error.html")),
];

const YEAR_RANGE: YearRange = YearRange { min: 1900, max: 3000 };

const HOME_ICON: &str = "M3 12l2-2m0 0l7-7 7 7M5 10v10a1 1 0 001 1h3m10-11l2 2m-2-2v10a1 1 0 01-1 1h-3m-6 0a1 1 0 001-1v-4a1 1 0 011-1h2a1 1 0 011 1v4a1 1 0 001 1m-6 0h6";
const BOARD_ICON: &str = "M7 4V2a1 1 0 011-1h4a1 1 0 011 1v2h4a1 1 0 011 1v14a1 1 0 01-1 1H3a1 1 0 01-1-1V5a1 1 0 011-1h4zM9 4V3h6v1H9z";
const CAMERA_ICON: &str = "M15 10l4.553-2.276A1 1 0 0121 8.618v6.764a1 1 0 01-1.447.894L15 14M5 18h8a2 2 0 002-2V8a2 2 0 00-2-2H5a2 2 0 00-2 2v8a2 2 0 002 2z";
const CHAT_ICON: &str = "M8.625 12a.375.375 0 1 1-.75 0 .375.375 0 0 1 .75 0Zm0 0H8.25m4.125 0a.375.375 0 1 1-.75 0 .375.375 0 0 1 .75 0Zm0 0H12m4.125 0a.375.375 0 1 1-.75 0 .375.375 0 0 1 .75 0Zm0 0h-.375M21 12c0 4.556-4.03 8.25-9 8.25a9.764 9.764 0 0 1-2.555-.337A5.972 5.972 0 0 1 5.41 20.97a5.969 5.969 0 0 1-.474-.065 4.48 4.48 0 0 0 .978-2.025c.09-.457-.133-.901-.467-1.226C3.93 16.178 3 14.189 3 12c0-4.556 4.03-8.25 9-8.25s9 3.694 9 8.25Z";

/// Top navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub url: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub is_active: bool,
}

/// Home page tile linking to a board
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub icon: &'static str,
    pub icon_color: &'static str,
    pub button_color: &'static str,
    pub button_text: &'static str,
}

/// Labels for a board's add and edit forms
#[derive(Debug, Clone, Serialize)]
pub struct FormText {
    pub add_new: &'static str,
    pub edit: &'static str,
    pub cancel: &'static str,
    pub save: &'static str,
    pub delete: &'static str,
    pub title: &'static str,
    pub year: &'static str,
    pub genre: &'static str,
    pub streaming: &'static str,
    pub imdb_link: &'static str,
    pub notes: &'static str,
    /// "Available Now" or "Active Season"
    pub flag: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct YearRange {
    min: i64,
    max: i64,
}

/// Per-table names used by the board templates and scripts
#[derive(Debug, Serialize)]
struct KindView {
    slug: &'static str,
    plural: &'static str,
    path: &'static str,
    flag_field: &'static str,
    flag_attr: &'static str,
    flag_label: &'static str,
    /// `badge_colors` key for the flag badge, and its colour when unset
    flag_badge: (&'static str, &'static str),
    empty_message: &'static str,
}

fn kind_view(kind: Kind) -> KindView {
    match kind {
        Kind::Movie => KindView {
            slug: "movie",
            plural: kind.plural(),
            path: kind.board_path(),
            flag_field: kind.flag_column(),
            flag_attr: "available-now",
            flag_label: "Available Now",
            flag_badge: ("available", "green"),
            empty_message: "No movies added yet. Add your first movie above!",
        },
        Kind::TvShow => KindView {
            slug: "tvshow",
            plural: kind.plural(),
            path: kind.board_path(),
            flag_field: kind.flag_column(),
            flag_attr: "active-season",
            flag_label: "Active Season",
            flag_badge: ("active", "yellow"),
            empty_message: "No TV shows added yet. Add your first TV show above!",
        },
    }
}

/// Tailwind background classes for the listing badges
#[derive(Debug, Serialize)]
struct BadgeClasses {
    year: String,
    genre: String,
    streaming: String,
    flag: String,
}

impl BadgeClasses {
    fn new(kind: Kind, colors: &BTreeMap<String, String>) -> Self {
        let color = |key: &str, default: &'static str| {
            colors
                .get(key)
                .map(String::as_str)
                .filter(|c| !c.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        let (flag_key, flag_default) = kind_view(kind).flag_badge;

        Self {
            year: format!("bg-{}-600", color("year", "gray")),
            genre: format!("bg-{}-600", color("genre", "blue")),
            streaming: format!("bg-{}-600", color("streaming", "green")),
            flag: format!("bg-{}-500", color(flag_key, flag_default)),
        }
    }
}

/// Only plain web links become clickable
fn is_web_link(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[derive(Serialize)]
struct ItemView<'a> {
    id: i64,
    #[serde(flatten)]
    details: &'a Details,
    flag: bool,
}

impl<'a> ItemView<'a> {
    fn of<T: Listing>(item: &'a T) -> Self {
        Self {
            id: item.id(),
            details: item.details(),
            flag: item.flag(),
        }
    }
}

/// Navigation with the entry for `current_path` marked active
pub fn navigation(current_path: &str) -> Vec<NavItem> {
    [
        ("/", "Home", HOME_ICON),
        ("/movie-board", "Movie Board", BOARD_ICON),
        ("/tv-shows-board", "TV Shows Board", CAMERA_ICON),
        ("/ai", "AI", CHAT_ICON),
    ]
    .into_iter()
    .map(|(url, label, icon)| NavItem {
        url,
        label,
        icon,
        is_active: url == current_path,
    })
    .collect()
}

pub fn feature_cards() -> Vec<FeatureCard> {
    vec![
        FeatureCard {
            title: "Movie Board",
            description: "Manage your movie watchlist, add new films, and get random movie suggestions",
            url: "/movie-board",
            icon: CAMERA_ICON,
            icon_color: "blue",
            button_color: "blue",
            button_text: "Open Movie Board",
        },
        FeatureCard {
            title: "TV Shows Board",
            description: "Track your favorite TV shows, manage seasons, and organize your binge-watching",
            url: "/tv-shows-board",
            icon: CAMERA_ICON,
            icon_color: "purple",
            button_color: "purple",
            button_text: "Open TV Shows Board",
        },
        FeatureCard {
            title: "AI",
            description: "Homenet custom AI, running locally. No data is uploaded to anywhere",
            url: "/ai",
            icon: CHAT_ICON,
            icon_color: "pink",
            button_color: "pink",
            button_text: "Open Homenet AI",
        },
    ]
}

pub fn form_text(kind: Kind) -> FormText {
    let (add_new, edit, save, title, flag) = match kind {
        Kind::Movie => ("Add New Movie", "Edit Movie", "Add Movie", "Movie Title", "Available Now"),
        Kind::TvShow => (
            "Add New TV Show",
            "Edit TV Show",
            "Add TV Show",
            "TV Show Title",
            "Active Season",
        ),
    };

    FormText {
        add_new,
        edit,
        cancel: "Cancel",
        save,
        delete: "Delete",
        title,
        year: "Year",
        genre: "Genre",
        streaming: "Streaming Service",
        imdb_link: "IMDB Link (Optional)",
        notes: "Notes (Optional)",
        flag,
    }
}

fn page_title(kind: Kind) -> &'static str {
    match kind {
        Kind::Movie => "Movie Board",
        Kind::TvShow => "TV Shows Board",
    }
}

fn page_template(kind: Kind) -> &'static str {
    match kind {
        Kind::Movie => "movie-board.html",
        Kind::TvShow => "tv-shows-board.html",
    }
}

/// Template environment shared by all handlers
#[derive(Clone)]
pub struct Renderer {
    env: Arc<Environment<'static>>,
}

impl Renderer {
    /// Page templates resolve against `templates_dir`; fragments are built in
    pub fn new(templates_dir: impl AsRef<Path>) -> Result<Self, Error> {
        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir.as_ref().to_path_buf()));
        env.add_test("web_link", is_web_link);

        for (name, source) in FRAGMENTS {
            env.add_template(*name, *source)?;
        }

        Ok(Self { env: Arc::new(env) })
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, Error> {
        self.env.get_template(name)?.render(ctx)
    }

    pub fn home_page(&self, config: &Config) -> Result<String, Error> {
        self.render(
            "index.html",
            context! {
                title => "Homenet",
                count => 0,
                navigation => navigation("/"),
                feature_cards => feature_cards(),
                genres => &config.genres,
                streaming_services => &config.streaming_services,
                year_range => YEAR_RANGE,
                colors => &config.app_colors,
            },
        )
    }

    pub fn board_page<T: Listing>(
        &self,
        config: &Config,
        items: &[T],
        count: i64,
    ) -> Result<String, Error> {
        let kind = T::KIND;
        let view = kind_view(kind);
        let nav = navigation(view.path);
        self.render(
            page_template(kind),
            context! {
                title => page_title(kind),
                navigation => nav,
                kind => view,
                items => items.iter().map(ItemView::of).collect::<Vec<_>>(),
                count => count,
                genres => &config.genres,
                streaming_services => &config.streaming_services,
                year_range => YEAR_RANGE,
                form_text => form_text(kind),
                colors => &config.app_colors,
                badges => BadgeClasses::new(kind, &config.badge_colors),
            },
        )
    }

    pub fn ai_page(&self) -> Result<String, Error> {
        self.render(
            "ai.html",
            context! {
                title => "Homenet AI",
                navigation => navigation("/ai"),
            },
        )
    }

    /// Every listing (or the empty placeholder) plus the out-of-band count block
    pub fn listing_fragment<T: Listing>(
        &self,
        config: &Config,
        items: &[T],
        count: i64,
    ) -> Result<String, Error> {
        self.render(
            "fragments/listing.html",
            context! {
                kind => kind_view(T::KIND),
                badges => BadgeClasses::new(T::KIND, &config.badge_colors),
                items => items.iter().map(ItemView::of).collect::<Vec<_>>(),
                count => count,
            },
        )
    }

    /// Random pick card, or the placeholder when nothing is available
    pub fn random_fragment(&self, config: &Config, movie: Option<&Movie>) -> Result<String, Error> {
        self.render(
            "fragments/random.html",
            context! {
                movie => movie.map(ItemView::of),
                badges => BadgeClasses::new(Kind::Movie, &config.badge_colors),
            },
        )
    }

    pub fn fortune_fragment(&self, text: &str, text_class: &str) -> Result<String, Error> {
        self.render(
            "fragments/fortune.html",
            context! { text => text, text_class => text_class },
        )
    }

    pub fn relay_error_fragment(&self, detail: &str, query: &str) -> Result<String, Error> {
        self.render(
            "fragments/relay_error.html",
            context! { detail => detail, query => query },
        )
    }
}
