//! Watchlist entities
//!
//! Movies and TV shows share every column except their boolean flag
//! (`available_now` / `active_season`), so the store works on the [`Listing`]
//! trait and each entity only names its table and flag.

use serde::Serialize;

/// Which watchlist table a listing lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Movie,
    TvShow,
}

impl Kind {
    pub fn table(self) -> &'static str {
        match self {
            Kind::Movie => "movies",
            Kind::TvShow => "tv_shows",
        }
    }

    pub fn flag_column(self) -> &'static str {
        match self {
            Kind::Movie => "available_now",
            Kind::TvShow => "active_season",
        }
    }

    /// Singular name used in messages, e.g. "Invalid TV show ID"
    pub fn noun(self) -> &'static str {
        match self {
            Kind::Movie => "movie",
            Kind::TvShow => "TV show",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Kind::Movie => "movies",
            Kind::TvShow => "TV shows",
        }
    }

    /// Route prefix of the board page
    pub fn board_path(self) -> &'static str {
        match self {
            Kind::Movie => "/movie-board",
            Kind::TvShow => "/tv-shows-board",
        }
    }
}

/// Columns common to both watchlists
///
/// `year == 0` means unset; empty strings mean the optional field is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Details {
    pub title: String,
    pub year: i64,
    pub genre: String,
    pub streaming: String,
    pub notes: String,
    pub imdb_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: i64,
    #[serde(flatten)]
    pub details: Details,
    pub available_now: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TvShow {
    pub id: i64,
    #[serde(flatten)]
    pub details: Details,
    pub active_season: bool,
}

/// A row of one of the watchlist tables
pub trait Listing: Serialize + Send + Sync + Unpin + Sized + 'static {
    const KIND: Kind;

    fn from_parts(id: i64, details: Details, flag: bool) -> Self;
    fn id(&self) -> i64;
    fn details(&self) -> &Details;
    /// `available_now` for movies, `active_season` for shows
    fn flag(&self) -> bool;
}

impl Listing for Movie {
    const KIND: Kind = Kind::Movie;

    fn from_parts(id: i64, details: Details, flag: bool) -> Self {
        Self {
            id,
            details,
            available_now: flag,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn details(&self) -> &Details {
        &self.details
    }

    fn flag(&self) -> bool {
        self.available_now
    }
}

impl Listing for TvShow {
    const KIND: Kind = Kind::TvShow;

    fn from_parts(id: i64, details: Details, flag: bool) -> Self {
        Self {
            id,
            details,
            active_season: flag,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn details(&self) -> &Details {
        &self.details
    }

    fn flag(&self) -> bool {
        self.active_season
    }
}
