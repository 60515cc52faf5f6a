use std::collections::{BTreeMap, BTreeSet};

/// Discovered descriptors of one plugin family, keyed by plugin key.
///
/// Built once per discovery pass through a [`CatalogBuilder`] and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct Catalog<K, I> {
    /// First-seen descriptor per key
    infos: BTreeMap<K, I>,
    /// Every registered key
    keys: BTreeSet<K>,
    /// Keys declared by two or more sources, with all of those sources
    duplicates: BTreeMap<K, BTreeSet<String>>,
}

impl<K: Ord, I> Default for Catalog<K, I> {
    fn default() -> Self {
        Self {
            infos: BTreeMap::new(),
            keys: BTreeSet::new(),
            duplicates: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, I> Catalog<K, I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infos(&self) -> &BTreeMap<K, I> {
        &self.infos
    }

    pub fn keys(&self) -> &BTreeSet<K> {
        &self.keys
    }

    pub fn duplicates(&self) -> &BTreeMap<K, BTreeSet<String>> {
        &self.duplicates
    }

    pub fn get(&self, key: &K) -> Option<&I> {
        self.infos.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &I)> {
        self.infos.iter()
    }
}

/// Accumulates one discovery pass.
///
/// The first descriptor registered under a key is kept; later ones only add
/// their source to the duplicate bookkeeping.
#[derive(Debug)]
pub struct CatalogBuilder<K, I> {
    catalog: Catalog<K, I>,
    sources: BTreeMap<K, BTreeSet<String>>,
    kept: BTreeMap<K, String>,
}

impl<K: Ord + Clone, I> Default for CatalogBuilder<K, I> {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            sources: BTreeMap::new(),
            kept: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, I> CatalogBuilder<K, I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `info` under `key` as declared by `source`.
    ///
    /// Returns `true` if this descriptor is the one kept.
    pub fn register(&mut self, key: K, info: I, source: impl Into<String>) -> bool {
        let source = source.into();
        self.sources.entry(key.clone()).or_default().insert(source.clone());

        if self.catalog.infos.contains_key(&key) {
            return false;
        }
        self.kept.insert(key.clone(), source);
        self.catalog.keys.insert(key.clone());
        self.catalog.infos.insert(key, info);
        true
    }

    /// Source of the descriptor kept for `key`
    pub fn kept_source(&self, key: &K) -> Option<&str> {
        self.kept.get(key).map(String::as_str)
    }

    /// Seals the pass. Also returns the kept source of every duplicated key,
    /// for reporting.
    pub fn finish(self) -> (Catalog<K, I>, BTreeMap<K, String>) {
        let Self { mut catalog, sources, mut kept } = self;
        catalog.duplicates = sources
            .into_iter()
            .filter(|(_, declared_by)| declared_by.len() >= 2)
            .collect();
        kept.retain(|key, _| catalog.duplicates.contains_key(key));
        (catalog, kept)
    }
}
