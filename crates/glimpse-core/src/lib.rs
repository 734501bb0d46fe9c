//! Glimpse core: the search-side logic of a multimodal video-search front end.
//!
//! Everything with state or ordering rules lives here, independent of any
//! rendering environment: query encoding ([`encode`]), the backend search
//! client ([`search`]), the upload relay client ([`upload`]), the
//! search/pagination session ([`session`]), and the single-active-clip
//! playback coordinator ([`playback`]).

pub mod config;
pub mod encode;
pub mod error;
pub mod model;
pub mod playback;
pub mod search;
pub mod session;
pub mod upload;

pub use error::{GlimpseError, Result};
