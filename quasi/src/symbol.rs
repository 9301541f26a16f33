use std::{
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock},
};

use parking_lot::RwLock;

/// An interned identifier name.
///
/// Every distinct name is stored once in a process-wide table, so cloning
/// a symbol is an `Arc` increment and equal names usually share storage.
#[derive(Clone)]
pub struct Symbol(Arc<str>);

struct InternedNames {
    table: HashSet<Arc<str>>,
}

impl InternedNames {
    fn new() -> Self {
        Self {
            table: HashSet::new(),
        }
    }

    fn get(&self, name: &str) -> Option<Arc<str>> {
        self.table.get(name).cloned()
    }

    fn get_or_add(&mut self, name: &str) -> Arc<str> {
        // another writer may have added it between our read and write lock
        if let Some(interned) = self.get(name) {
            return interned;
        }
        let interned = Arc::<str>::from(name);
        self.table.insert(interned.clone());
        interned
    }
}

fn names() -> &'static RwLock<InternedNames> {
    static NAMES: OnceLock<RwLock<InternedNames>> = OnceLock::new();
    NAMES.get_or_init(|| RwLock::new(InternedNames::new()))
}

impl Symbol {
    pub fn new(name: &str) -> Self {
        if let Some(interned) = names().read().get(name) {
            return Self(interned);
        }
        Self(names().write().get_or_add(name))
    }

    /// A name built from data, such as rendered expressions or strings.
    /// It is not interned and is freed with its last clone.
    pub fn from_text(text: &str) -> Self {
        Self(Arc::from(text))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Symbol {}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
pub(crate) fn is_interned(name: &str) -> bool {
    names().read().get(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_names_share_storage() {
        let a = Symbol::new("foo");
        let b = Symbol::from(String::from("foo"));
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn test_distinct_names() {
        let a = Symbol::new("foo");
        let b = Symbol::new("bar");
        assert_ne!(a, b);
        assert_eq!(a, "foo");
        assert_eq!(b.as_str(), "bar");
    }

    #[test]
    fn test_hash_matches_str() {
        let mut set = HashSet::new();
        set.insert(Symbol::new("x"));
        assert!(set.contains(&Symbol::new("x")));
        assert!(!set.contains(&Symbol::new("y")));
    }

    #[test]
    fn test_text_names_are_not_interned() {
        let text = Symbol::from_text("rendered(text_only)");
        assert!(!is_interned("rendered(text_only)"));
        assert_eq!(text, "rendered(text_only)");

        let interned = Symbol::new("rendered(text_only)");
        assert_eq!(text, interned);
        assert!(!Arc::ptr_eq(&text.0, &interned.0));
    }
}
