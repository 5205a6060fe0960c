//! Index construction and persistence round-trips.

use sftindex::index::{IndexMap, IndexSet};
use sftindex::trie::{BuildError, PersistError, TrieSet};

#[test]
fn empty_dictionary() {
    let index: IndexSet = IndexSet::build(Vec::<String>::new()).unwrap();
    let searcher = index.searcher();
    assert!(index.is_empty());
    assert!(!searcher.exact(""));
    assert!(!searcher.exact("A"));
    assert!(!searcher.exact("BC"));
    assert_eq!(searcher.predict("").count(), 0);
    assert_eq!(searcher.approx("A", 2).count(), 0);
}

#[test]
fn dictionary_of_an_empty_string() {
    let index: IndexSet = IndexSet::build([""]).unwrap();
    let searcher = index.searcher();
    assert!(searcher.exact(""));
    assert!(!searcher.exact("A"));
    assert!(!searcher.exact("BC"));
}

#[test]
fn tiny_dictionary() {
    let index: IndexSet = IndexSet::build(["B", "D", "F"]).unwrap();
    let searcher = index.searcher();
    for text in ["B", "D", "F"] {
        assert!(searcher.exact(text), "{text}");
    }
    for text in ["", "A", "C", "E", "BC", "AB", "DF", "BDF"] {
        assert!(!searcher.exact(text), "{text}");
    }
}

#[test]
fn small_dictionary() {
    let texts = ["AM", "AMD", "CAD", "CAM", "CM", "DM"];
    let index: IndexSet = IndexSet::build(texts).unwrap();
    let searcher = index.searcher();
    for text in texts {
        assert!(searcher.exact(text), "{text}");
    }
    for text in ["", "C", "A", "M", "CA", "MD", "AMP", "CMD", "CAMP"] {
        assert!(!searcher.exact(text), "{text}");
    }
}

#[test]
fn from_sorted_rejects_disorder_and_duplicates() {
    assert!(matches!(
        IndexSet::<u8, u32>::from_sorted(&["B", "A"]),
        Err(BuildError::Unsorted { index: 1 })
    ));
    assert!(matches!(
        IndexSet::<u8, u32>::from_sorted(&["A", "A"]),
        Err(BuildError::Duplicate { index: 1 })
    ));
}

#[test]
fn set_file_round_trip_is_indistinguishable() {
    let texts = ["AM", "AMD", "CAD", "CAM", "CM", "DM"];
    let index: IndexSet = IndexSet::build(texts).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.sft");
    index.save(&path).unwrap();

    let loaded = IndexSet::<u8, u32>::load(&path).unwrap();
    assert_eq!(loaded.len(), index.len());

    let searcher = loaded.searcher();
    for text in texts {
        assert!(searcher.exact(text), "{text}");
    }
    let before: Vec<(String, usize)> = index
        .searcher()
        .approx("CAD", 2)
        .map(|h| (h.key, h.edits))
        .collect();
    let after: Vec<(String, usize)> = searcher
        .approx("CAD", 2)
        .map(|h| (h.key, h.edits))
        .collect();
    assert_eq!(before, after);

    let before: Vec<String> = index.searcher().predict("").map(|h| h.key).collect();
    let after: Vec<String> = searcher.predict("").map(|h| h.key).collect();
    assert_eq!(before, after);
}

#[test]
fn map_file_round_trip_preserves_values() {
    let pairs = [("AM", 3i64), ("CAD", -7), ("CM", 1 << 40)];
    let index: IndexMap<i64> = IndexMap::build(pairs).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pairs.sft");
    index.save(&path).unwrap();

    let loaded = IndexMap::<i64>::load(&path).unwrap();
    assert_eq!(loaded.len(), 3);
    for (key, value) in pairs {
        assert_eq!(loaded.trie().get(key), Some(&value), "{key}");
    }
}

#[test]
fn loader_refuses_foreign_and_mismatched_images() {
    let dir = tempfile::tempdir().unwrap();

    let garbage = dir.path().join("garbage");
    std::fs::write(&garbage, b"not an index at all").unwrap();
    assert!(matches!(
        IndexSet::<u8, u32>::load(&garbage),
        Err(PersistError::BadMagic)
    ));

    let set_path = dir.path().join("set.sft");
    IndexSet::<u8, u32>::build(["A", "B"])
        .unwrap()
        .save(&set_path)
        .unwrap();

    // Wrong container kind.
    assert!(matches!(
        IndexMap::<i64>::load(&set_path),
        Err(PersistError::ContainerMismatch { .. })
    ));

    // Wrong offset width.
    assert!(matches!(
        IndexSet::<u8, u64>::load(&set_path),
        Err(PersistError::IntegerMismatch { .. })
    ));

    // Wrong unit encoding.
    assert!(matches!(
        IndexSet::<char, u32>::load(&set_path),
        Err(PersistError::EncodingMismatch { .. })
    ));

    let map_path = dir.path().join("map.sft");
    IndexMap::<i64>::build([("A", 1), ("B", 2)])
        .unwrap()
        .save(&map_path)
        .unwrap();

    // Wrong value width.
    assert!(matches!(
        IndexMap::<u8>::load(&map_path),
        Err(PersistError::ValueMismatch { .. })
    ));

    // A refused load reports the missing file as plain I/O.
    assert!(matches!(
        IndexSet::<u8, u32>::load(dir.path().join("absent.sft")),
        Err(PersistError::Io(_))
    ));
}

#[test]
fn wide_offset_and_char_unit_variants() {
    let texts = ["うみ", "うみべ", "やま"];
    let index: IndexSet<char, u64> = IndexSet::build(texts).unwrap();
    let searcher = index.searcher();
    assert!(searcher.exact("うみ"));
    assert!(!searcher.exact("う"));

    let predicted: Vec<String> = searcher.predict("うみ").map(|h| h.key).collect();
    assert_eq!(predicted, vec!["うみ", "うみべ"]);

    let close: Vec<(String, usize)> = searcher
        .approx("うみぺ", 1)
        .map(|h| (h.key, h.edits))
        .collect();
    assert_eq!(close, vec![("うみ".to_string(), 1), ("うみべ".to_string(), 1)]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.sft");
    index.save(&path).unwrap();
    let loaded = IndexSet::<char, u64>::load(&path).unwrap();
    assert!(loaded.searcher().exact("やま"));
}

#[test]
fn raw_trie_access_matches_the_facade() {
    let index: IndexSet = IndexSet::build(["AM", "CM"]).unwrap();
    let trie: &TrieSet = index.trie();
    assert!(trie.contains("AM"));
    assert_eq!(trie.len(), 2);
}
