//! Case-insensitive header container.
//!
//! Header names compare case-insensitively, but the casing a name was first
//! inserted with is the casing that gets serialised. Setting `x-foo` after
//! `X-Foo` overwrites the value and keeps `X-Foo`.
//!
//! A [`HeaderMap`] either owns its storage or wraps someone else's:
//!
//! ```rust
//! use tandem::headers::{HeaderMap, RawHeaders};
//!
//! let mut raw: RawHeaders = vec![("Content-Type".into(), "text/html".into())];
//!
//! // cloned: `raw` is left alone
//! let mut copy = HeaderMap::cloned(&raw);
//! copy.set("content-type", "text/plain");
//! assert_eq!(raw[0].1, "text/html");
//!
//! // wrapped: writes land in `raw`
//! let mut view = HeaderMap::wrap(&mut raw);
//! view.set("content-type", "application/json");
//! assert_eq!(raw[0], ("Content-Type".into(), "application/json".into()));
//! ```

use std::borrow::{Borrow, BorrowMut};
use std::collections::HashMap;
use std::fmt;

/// Plain header storage: ordered `(name, value)` pairs.
pub type RawHeaders = Vec<(String, String)>;

/// Common header names, lowercase.
pub mod names {
    pub const ACCEPT: &str = "accept";
    pub const AUTHORIZATION: &str = "authorization";
    pub const CACHE_CONTROL: &str = "cache-control";
    pub const CONTENT_ENCODING: &str = "content-encoding";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const ETAG: &str = "etag";
    pub const HOST: &str = "host";
    pub const LOCATION: &str = "location";
    pub const SERVER: &str = "server";
    pub const USER_AGENT: &str = "user-agent";
    pub const VARY: &str = "vary";
    pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
}

/// Header map keyed case-insensitively.
///
/// `S` is the backing store. `HeaderMap` (the default) owns a [`RawHeaders`];
/// `HeaderMap<&mut RawHeaders>` writes straight through to a borrowed one.
///
/// For any two names differing only in case, at most one entry exists.
#[derive(Clone, Default)]
pub struct HeaderMap<S = RawHeaders> {
    store: S,
    // lowercase name -> position in `store`
    index: HashMap<String, usize>,
}

/// Lookup key for `name`. Folds the full Unicode range, not just ASCII.
fn fold(name: &str) -> String {
    name.to_lowercase()
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an owned map from a copy of `raw`.
    pub fn cloned(raw: &[(String, String)]) -> Self {
        Self::from_store(raw.to_vec())
    }
}

impl<'a> HeaderMap<&'a mut RawHeaders> {
    /// Wraps `raw` so every mutation propagates to it.
    ///
    /// Names in `raw` that collide case-insensitively are collapsed onto the
    /// first casing, keeping the last value.
    pub fn wrap(raw: &'a mut RawHeaders) -> Self {
        Self::from_store(raw)
    }
}

impl<S: BorrowMut<RawHeaders>> HeaderMap<S> {
    fn from_store(mut store: S) -> Self {
        let raw = <S as BorrowMut<RawHeaders>>::borrow_mut(&mut store);
        let mut index: HashMap<String, usize> = HashMap::with_capacity(raw.len());
        let mut pos = 0;
        while pos < raw.len() {
            let folded = fold(&raw[pos].0);
            match index.get(&folded) {
                Some(&first) => {
                    let (_, value) = raw.remove(pos);
                    raw[first].1 = value;
                }
                None => {
                    index.insert(folded, pos);
                    pos += 1;
                }
            }
        }
        Self { store, index }
    }

    fn raw(&self) -> &RawHeaders {
        <S as Borrow<RawHeaders>>::borrow(&self.store)
    }

    fn raw_mut(&mut self) -> &mut RawHeaders {
        <S as BorrowMut<RawHeaders>>::borrow_mut(&mut self.store)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&fold(name)).copied()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let pos = self.position(name)?;
        Some(self.raw()[pos].1.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sets `name` to `value`, returning the previous value.
    ///
    /// An existing entry keeps the casing it was first inserted with.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(pos) => {
                Some(std::mem::replace(&mut self.raw_mut()[pos].1, value))
            }
            None => {
                let pos = self.len();
                self.index.insert(fold(&name), pos);
                self.raw_mut().push((name, value));
                None
            }
        }
    }

    /// Removes `name` in whatever casing it was stored under.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.index.remove(&fold(name))?;
        let (_, value) = self.raw_mut().remove(pos);
        for p in self.index.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
        Some(value)
    }

    /// Entries in insertion order, with their remembered casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.raw().iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.raw().len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw().is_empty()
    }

    /// Copies every entry of `other` into this map.
    pub fn extend_from<T: BorrowMut<RawHeaders>>(&mut self, other: &HeaderMap<T>) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl From<RawHeaders> for HeaderMap {
    fn from(raw: RawHeaders) -> Self {
        Self::from_store(raw)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<S: BorrowMut<RawHeaders>> fmt::Debug for HeaderMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawHeaders {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn lookup_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.set("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
        assert!(headers.has("content-TYPE"));
        assert!(!headers.has("accept"));
    }

    #[test]
    fn overwrite_keeps_first_casing() {
        let mut headers = HeaderMap::new();
        headers.set("X-Foo", "one");
        assert_eq!(headers.set("x-foo", "two"), Some("one".to_owned()));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("X-Foo", "two")]);
    }

    #[test]
    fn remove_by_any_casing() {
        let mut headers = HeaderMap::new();
        headers.set("X-Foo", "one");
        assert_eq!(headers.remove("x-FOO"), Some("one".to_owned()));
        assert!(headers.is_empty());
        assert!(!headers.has("X-Foo"));

        // the old casing is forgotten once removed
        headers.set("x-foo", "two");
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("x-foo", "two")]);
    }

    #[test]
    fn remove_keeps_later_positions_valid() {
        let mut headers: HeaderMap = [("a", "1"), ("B", "2"), ("c", "3")].into_iter().collect();
        headers.remove("a");
        assert_eq!(headers.get("b"), Some("2"));
        assert_eq!(headers.get("C"), Some("3"));
        headers.set("b", "22");
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("B", "22"), ("c", "3")]);
    }

    #[test]
    fn wrap_writes_through() {
        let mut original = raw(&[("A", "blue"), ("C", "green"), ("z", "red")]);
        {
            let mut headers = HeaderMap::wrap(&mut original);
            headers.set("a", "one");
            headers.set("b", "two");
            headers.set("c", "three");
            headers.set("C", "four");
        }
        assert_eq!(original, raw(&[("A", "one"), ("C", "four"), ("z", "red"), ("b", "two")]));
    }

    #[test]
    fn clone_leaves_source_alone() {
        let original = raw(&[("A", "blue"), ("C", "green"), ("z", "red")]);
        let mut headers = HeaderMap::cloned(&original);
        headers.set("a", "one");
        headers.set("b", "two");
        headers.remove("z");
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("A", "one"), ("C", "green"), ("b", "two")]);
        assert_eq!(original, raw(&[("A", "blue"), ("C", "green"), ("z", "red")]));
    }

    #[test]
    fn wrapped_remove_deletes_underlying_entry() {
        let mut original = raw(&[("Content-Type", "text/plain"), ("Vary", "accept")]);
        HeaderMap::wrap(&mut original).remove("content-type");
        assert_eq!(original, raw(&[("Vary", "accept")]));
    }

    #[test]
    fn case_variant_duplicates_collapse() {
        let headers = HeaderMap::from(raw(&[("X-A", "1"), ("x-a", "2"), ("y", "3")]));
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("X-A", "2"), ("y", "3")]);
        assert_eq!(headers.get("y"), Some("3"));
    }

    #[test]
    fn folds_non_ascii_names() {
        let mut headers = HeaderMap::new();
        headers.set("X-Ärger", "one");
        headers.set("x-ärger", "two");
        assert_eq!(headers.get("X-ÄRGER"), Some("two"));
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("X-Ärger", "two")]);
        assert_eq!(headers.remove("x-äRGER"), Some("two".to_owned()));
        assert!(headers.is_empty());
    }
}
