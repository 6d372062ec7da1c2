//! Identity resolution seam.
//!
//! The core never creates or deletes identities; it resolves display names
//! to durable IDs and checks the flat admin flag through this one interface.
//! A caching wrapper with explicit invalidation replaces the original
//! design's parallel in-memory/database sources of truth.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

use crate::types::UserId;

/// Maps human-readable names to stable platform identities.
pub trait IdentityResolver: Send + Sync {
    /// Resolves a display name to a user ID, or `None` if unknown.
    fn resolve_id_by_name(&self, display_name: &str) -> Option<UserId>;

    /// Looks up a user's display name.
    fn display_name(&self, id: &UserId) -> Option<String>;

    /// Whether the user carries the admin flag.
    fn is_admin(&self, id: &UserId) -> bool;

    /// All known display names, presented to the user when a target name
    /// fails to resolve.
    fn known_names(&self) -> Vec<String>;
}

/// One user in the in-process directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Error loading a roster file.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("IO error reading roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid roster JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-process identity directory, seeded from configuration.
///
/// This is the single source of truth for the single-instance deployment;
/// a multi-instance deployment would substitute a database-backed resolver
/// behind the same trait.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    users: Vec<UserRecord>,
}

impl StaticDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        StaticDirectory { users }
    }

    /// Loads a roster from a JSON array of `{id, display_name, is_admin}`.
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let bytes = std::fs::read(path)?;
        let users: Vec<UserRecord> = serde_json::from_slice(&bytes)?;
        Ok(StaticDirectory { users })
    }

    fn find_by_id(&self, id: &UserId) -> Option<&UserRecord> {
        self.users.iter().find(|u| &u.id == id)
    }
}

impl IdentityResolver for StaticDirectory {
    fn resolve_id_by_name(&self, display_name: &str) -> Option<UserId> {
        self.users
            .iter()
            .find(|u| u.display_name == display_name)
            .map(|u| u.id.clone())
    }

    fn display_name(&self, id: &UserId) -> Option<String> {
        self.find_by_id(id).map(|u| u.display_name.clone())
    }

    fn is_admin(&self, id: &UserId) -> bool {
        self.find_by_id(id).is_some_and(|u| u.is_admin)
    }

    fn known_names(&self) -> Vec<String> {
        self.users.iter().map(|u| u.display_name.clone()).collect()
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    by_name: HashMap<String, Option<UserId>>,
    by_id: HashMap<UserId, Option<(String, bool)>>,
}

/// Caching wrapper around any resolver, with explicit invalidation.
///
/// Negative lookups are cached too; callers that mutate the underlying
/// directory (out of scope for the core) are expected to invalidate.
pub struct CachedResolver<R> {
    inner: R,
    cache: Mutex<CacheInner>,
}

impl<R: IdentityResolver> CachedResolver<R> {
    pub fn new(inner: R) -> Self {
        CachedResolver {
            inner,
            cache: Mutex::new(CacheInner::default()),
        }
    }

    /// Drops every cached entry for one user.
    pub fn invalidate(&self, id: &UserId) {
        let mut cache = self.cache.lock().unwrap();
        if let Some(Some((name, _))) = cache.by_id.remove(id) {
            cache.by_name.remove(&name);
        }
        // A negative by_name entry may also exist for this user's current
        // name; cheaper to drop the whole name cache than to track it.
        cache.by_name.clear();
    }

    pub fn invalidate_all(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.by_name.clear();
        cache.by_id.clear();
    }

    fn lookup_id(&self, id: &UserId) -> Option<(String, bool)> {
        {
            let cache = self.cache.lock().unwrap();
            if let Some(entry) = cache.by_id.get(id) {
                return entry.clone();
            }
        }
        let resolved = self
            .inner
            .display_name(id)
            .map(|name| (name, self.inner.is_admin(id)));
        let mut cache = self.cache.lock().unwrap();
        cache.by_id.insert(id.clone(), resolved.clone());
        resolved
    }
}

impl<R: IdentityResolver> IdentityResolver for CachedResolver<R> {
    fn resolve_id_by_name(&self, display_name: &str) -> Option<UserId> {
        {
            let cache = self.cache.lock().unwrap();
            if let Some(entry) = cache.by_name.get(display_name) {
                return entry.clone();
            }
        }
        let resolved = self.inner.resolve_id_by_name(display_name);
        let mut cache = self.cache.lock().unwrap();
        cache
            .by_name
            .insert(display_name.to_string(), resolved.clone());
        resolved
    }

    fn display_name(&self, id: &UserId) -> Option<String> {
        self.lookup_id(id).map(|(name, _)| name)
    }

    fn is_admin(&self, id: &UserId) -> bool {
        self.lookup_id(id).is_some_and(|(_, admin)| admin)
    }

    fn known_names(&self) -> Vec<String> {
        // Membership listings are not cached; they are only needed on the
        // UnknownTarget path.
        self.inner.known_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn directory() -> StaticDirectory {
        StaticDirectory::new(vec![
            UserRecord {
                id: UserId::new("u1"),
                display_name: "Alice".to_string(),
                is_admin: true,
            },
            UserRecord {
                id: UserId::new("u2"),
                display_name: "Bob".to_string(),
                is_admin: false,
            },
        ])
    }

    #[test]
    fn resolves_known_names() {
        let dir = directory();
        assert_eq!(dir.resolve_id_by_name("Alice"), Some(UserId::new("u1")));
        assert_eq!(dir.resolve_id_by_name("Carol"), None);
    }

    #[test]
    fn admin_flag_and_names() {
        let dir = directory();
        assert!(dir.is_admin(&UserId::new("u1")));
        assert!(!dir.is_admin(&UserId::new("u2")));
        assert!(!dir.is_admin(&UserId::new("nobody")));
        assert_eq!(dir.display_name(&UserId::new("u2")).unwrap(), "Bob");
        assert_eq!(dir.known_names(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn roster_loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(
            &path,
            r#"[{"id": "u1", "display_name": "Alice", "is_admin": true},
                {"id": "u2", "display_name": "Bob"}]"#,
        )
        .unwrap();

        let roster = StaticDirectory::load(&path).unwrap();
        assert!(roster.is_admin(&UserId::new("u1")));
        assert!(!roster.is_admin(&UserId::new("u2")));
    }

    /// Resolver that counts underlying lookups, for cache assertions.
    struct Counting {
        inner: StaticDirectory,
        name_lookups: AtomicUsize,
    }

    impl IdentityResolver for Counting {
        fn resolve_id_by_name(&self, display_name: &str) -> Option<UserId> {
            self.name_lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.resolve_id_by_name(display_name)
        }
        fn display_name(&self, id: &UserId) -> Option<String> {
            self.inner.display_name(id)
        }
        fn is_admin(&self, id: &UserId) -> bool {
            self.inner.is_admin(id)
        }
        fn known_names(&self) -> Vec<String> {
            self.inner.known_names()
        }
    }

    #[test]
    fn cache_serves_repeat_lookups() {
        let cached = CachedResolver::new(Counting {
            inner: directory(),
            name_lookups: AtomicUsize::new(0),
        });

        assert_eq!(cached.resolve_id_by_name("Alice"), Some(UserId::new("u1")));
        assert_eq!(cached.resolve_id_by_name("Alice"), Some(UserId::new("u1")));
        assert_eq!(cached.inner.name_lookups.load(Ordering::SeqCst), 1);

        // Negative lookups are cached too.
        assert_eq!(cached.resolve_id_by_name("Carol"), None);
        assert_eq!(cached.resolve_id_by_name("Carol"), None);
        assert_eq!(cached.inner.name_lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_fresh_lookup() {
        let cached = CachedResolver::new(Counting {
            inner: directory(),
            name_lookups: AtomicUsize::new(0),
        });

        cached.resolve_id_by_name("Alice");
        cached.invalidate_all();
        cached.resolve_id_by_name("Alice");
        assert_eq!(cached.inner.name_lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_single_user_clears_id_entry() {
        let cached = CachedResolver::new(Counting {
            inner: directory(),
            name_lookups: AtomicUsize::new(0),
        });
        let u1 = UserId::new("u1");
        assert!(cached.is_admin(&u1));
        cached.invalidate(&u1);
        assert!(cached.is_admin(&u1));
    }
}
