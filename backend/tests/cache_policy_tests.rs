//! Cache coherence policy tests
//!
//! Models the read-through-and-invalidate discipline every entity service
//! follows, over a map-backed store and cache:
//! - a keyed read populates the cache; a mutation invalidates it, so the
//!   next read reflects the update instead of a stale entry
//! - a slug change invalidates both the old and the new key: the old slug
//!   stops resolving, the new one serves the updated record

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Record {
    slug: String,
    name: String,
    description: Option<String>,
}

const LIST_KEY: &str = "categories:list";

fn cache_key(slug: &str) -> String {
    format!("category:{slug}")
}

/// Store (source of truth) + cache, with the service's read/mutate rules.
#[derive(Default)]
struct Fixture {
    store: HashMap<String, Record>,
    cache: HashMap<String, String>,
    store_reads: usize,
}

impl Fixture {
    /// Read-through fetch by slug.
    fn get(&mut self, slug: &str) -> Option<Record> {
        if let Some(raw) = self.cache.get(&cache_key(slug)) {
            if let Ok(record) = serde_json::from_str(raw) {
                return Some(record);
            }
        }
        self.store_reads += 1;
        let record = self.store.get(slug).cloned()?;
        self.cache
            .insert(cache_key(slug), serde_json::to_string(&record).unwrap());
        Some(record)
    }

    /// Create: write the store, invalidate the list key.
    fn create(&mut self, record: Record) {
        self.store.insert(record.slug.clone(), record);
        self.cache.remove(LIST_KEY);
    }

    /// Update by slug, possibly re-slugging; invalidate old key, new key
    /// (when changed) and the list key.
    fn update(&mut self, slug: &str, name: Option<&str>, description: Option<&str>) {
        let mut record = self.store.remove(slug).expect("record exists");
        if let Some(name) = name {
            record.name = name.to_string();
            record.slug = name.to_lowercase().replace(' ', "-");
        }
        if let Some(description) = description {
            record.description = Some(description.to_string());
        }
        let new_slug = record.slug.clone();
        self.store.insert(new_slug.clone(), record);

        self.cache.remove(&cache_key(slug));
        self.cache.remove(LIST_KEY);
        if new_slug != slug {
            self.cache.remove(&cache_key(&new_slug));
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn electronics() -> Record {
        Record {
            slug: "electronics".to_string(),
            name: "Electronics".to_string(),
            description: None,
        }
    }

    #[test]
    fn second_read_is_served_from_cache() {
        let mut fx = Fixture::default();
        fx.create(electronics());

        assert!(fx.get("electronics").is_some());
        assert!(fx.get("electronics").is_some());
        assert_eq!(fx.store_reads, 1);
    }

    #[test]
    fn update_is_visible_after_a_cached_read() {
        let mut fx = Fixture::default();
        fx.create(electronics());

        // Miss populates the cache.
        assert_eq!(fx.get("electronics").unwrap().description, None);

        fx.update("electronics", None, Some("phones and appliances"));

        // The cached entry was invalidated, not served stale.
        assert_eq!(
            fx.get("electronics").unwrap().description.as_deref(),
            Some("phones and appliances")
        );
    }

    #[test]
    fn rename_moves_the_lookup_key() {
        let mut fx = Fixture::default();
        fx.create(electronics());
        assert!(fx.get("electronics").is_some());

        fx.update("electronics", Some("Electronics V2"), None);

        // Old slug no longer resolves, even though it was cached.
        assert!(fx.get("electronics").is_none());
        // New slug serves the renamed record.
        let renamed = fx.get("electronics-v2").unwrap();
        assert_eq!(renamed.name, "Electronics V2");
    }

    #[test]
    fn stale_entry_under_the_new_slug_is_also_dropped() {
        let mut fx = Fixture::default();
        fx.create(electronics());

        // A leftover cache entry squats on the slug the rename will land on
        // (e.g. from a record that held the slug before being renamed away).
        fx.cache.insert(
            cache_key("electronics-v2"),
            serde_json::to_string(&Record {
                slug: "electronics-v2".to_string(),
                name: "Old Squatter".to_string(),
                description: None,
            })
            .unwrap(),
        );

        fx.update("electronics", Some("Electronics V2"), None);

        // The rename invalidated the new key too; the squatter is gone.
        assert_eq!(fx.get("electronics-v2").unwrap().name, "Electronics V2");
    }
}
