//! Timezone to country/city resolution.
//!
//! The canonical zone→country index comes from the embedded catalog and is
//! built once at startup; an optional `alias=canonical` file layers alternate
//! spellings on top. Both are immutable afterwards.

pub mod catalog;

use std::collections::HashMap;
use std::path::Path;

use crate::shared::error::{AppError, AppResult};

pub struct ZoneResolver {
    country_by_zone: HashMap<String, String>,
}

impl ZoneResolver {
    /// Build the index from the catalog alone.
    pub fn new() -> Self {
        Self::with_aliases(HashMap::new())
    }

    /// Build the index from the catalog plus an alias file. A missing file is
    /// not an error; the resolver just carries no aliases.
    pub fn from_alias_file(path: impl AsRef<Path>) -> Self {
        Self::with_aliases(load_aliases(path))
    }

    fn with_aliases(aliases: HashMap<String, String>) -> Self {
        let mut country_by_zone = HashMap::new();
        for (country, zones) in catalog::COUNTRY_ZONES {
            for zone in zones.iter() {
                country_by_zone.insert(zone.to_string(), country.to_string());
            }
        }

        // Aliases piggyback on canonical ownership; an alias whose target is
        // not in the catalog is dropped.
        let mut registered = 0usize;
        for (alias, canonical) in &aliases {
            if let Some(country) = country_by_zone.get(canonical).cloned() {
                country_by_zone.insert(alias.clone(), country);
                registered += 1;
            }
        }
        if !aliases.is_empty() {
            println!(
                "[Zones] Registered {}/{} timezone aliases",
                registered,
                aliases.len()
            );
        }

        Self { country_by_zone }
    }

    /// ISO country code owning `zone` (canonical or alias).
    pub fn country_from_zone(&self, zone: &str) -> AppResult<&str> {
        self.country_by_zone
            .get(zone)
            .map(|c| c.as_str())
            .ok_or_else(|| AppError::UnknownZone(zone.to_string()))
    }

    pub fn zone_count(&self) -> usize {
        self.country_by_zone.len()
    }
}

impl Default for ZoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// City component of an `Area/City` zone identifier: the last path segment
/// with underscores made human readable.
pub fn city_from_zone(zone: &str) -> AppResult<String> {
    let mut parts = zone.split('/');
    let first = parts.next();
    let last = parts.last();
    match (first, last) {
        (Some(_), Some(city)) => Ok(city.replace('_', " ")),
        _ => Err(AppError::UnsupportedZoneFormat(zone.to_string())),
    }
}

fn load_aliases(path: impl AsRef<Path>) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    let raw = match std::fs::read_to_string(path.as_ref()) {
        Ok(raw) => raw,
        Err(_) => return aliases,
    };

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Only split on the first '='.
        if let Some((alias, canonical)) = line.split_once('=') {
            aliases.insert(alias.trim().to_string(), canonical.trim().to_string());
        }
    }
    aliases
}
