//! Merge rules: built-in defaults applied before any file or environment source.

use crate::views;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with defaults for every key the files may override.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let enabled: Vec<String> = views::default_enabled()
        .iter()
        .map(|kind| view_kind_key(*kind).to_string())
        .collect();

    Config::builder()
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?
        .set_default("views.enabled", enabled)?
        .set_default(
            "views.max_listing_entries",
            views::default_max_listing_entries() as u64,
        )?
        .set_default("views.max_hash_bytes", views::default_max_hash_bytes())
}

fn view_kind_key(kind: views::ViewKind) -> &'static str {
    match kind {
        views::ViewKind::ContentHash => "content-hash",
        views::ViewKind::Listing => "listing",
        views::ViewKind::Stat => "stat",
    }
}
