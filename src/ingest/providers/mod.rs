// src/ingest/providers/mod.rs
pub mod html_board;
pub mod naukri;
pub mod portals;
pub mod rss_feed;

pub(crate) fn enabled_by_default() -> bool {
    true
}
