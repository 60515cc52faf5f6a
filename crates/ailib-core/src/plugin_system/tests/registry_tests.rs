use crate::plugin_system::registry::{Catalog, CatalogBuilder};

#[test]
fn test_first_registration_wins() {
    let mut builder = CatalogBuilder::new();
    assert!(builder.register("C 0.1".to_string(), "first", "/a/InterfaceInfo.json"));
    assert!(!builder.register("C 0.1".to_string(), "second", "/b/InterfaceInfo.json"));
    assert_eq!(builder.kept_source(&"C 0.1".to_string()), Some("/a/InterfaceInfo.json"));

    let (catalog, kept) = builder.finish();
    assert_eq!(catalog.get(&"C 0.1".to_string()), Some(&"first"));
    assert_eq!(catalog.len(), 1);
    assert_eq!(kept.get("C 0.1").map(String::as_str), Some("/a/InterfaceInfo.json"));
}

#[test]
fn test_duplicates_record_every_source() {
    let mut builder = CatalogBuilder::new();
    builder.register(1, "one", "a");
    builder.register(1, "one again", "b");
    builder.register(1, "one more", "c");
    builder.register(2, "two", "a");

    let (catalog, kept) = builder.finish();
    let sources: Vec<&str> = catalog.duplicates()[&1].iter().map(String::as_str).collect();
    assert_eq!(sources, vec!["a", "b", "c"]);
    assert!(!catalog.duplicates().contains_key(&2));
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[&1], "a");
}

#[test]
fn test_same_source_twice_is_not_a_duplicate() {
    let mut builder = CatalogBuilder::new();
    builder.register("RAI", 1, "C 0.1");
    builder.register("RAI", 2, "C 0.1");

    let (catalog, kept) = builder.finish();
    assert!(catalog.duplicates().is_empty());
    assert!(kept.is_empty());
    assert_eq!(catalog.get(&"RAI"), Some(&1));
}

#[test]
fn test_keys_and_infos_agree() {
    let mut builder = CatalogBuilder::new();
    builder.register("b", (), "x");
    builder.register("a", (), "x");
    let (catalog, _) = builder.finish();

    let keys: Vec<_> = catalog.keys().iter().copied().collect();
    let info_keys: Vec<_> = catalog.infos().keys().copied().collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(keys, info_keys);
    assert!(catalog.contains(&"a"));
    assert_eq!(catalog.iter().count(), 2);
}

#[test]
fn test_new_catalog_is_empty() {
    let catalog: Catalog<String, ()> = Catalog::new();
    assert!(catalog.is_empty());
    assert!(catalog.duplicates().is_empty());
}
