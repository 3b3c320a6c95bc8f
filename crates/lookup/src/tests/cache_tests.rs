use super::helpers::{map_of, RecordingSink};
use crate::*;
use anyhow::Result;
use tempfile::{tempdir, TempDir};

fn open_cache(dir: &TempDir) -> Result<(LookupCache<FilePrefixStore>, RecordingSink)> {
    let sink = RecordingSink::default();
    let config = CacheConfig::new(dir.path().join("cache"), "test-malware-proto")?;
    let mut cache =
        LookupCache::new(config, FilePrefixStore::new()).with_sink(Box::new(sink.clone()));
    cache.init()?;
    Ok((cache, sink))
}

// -------------------- Basics --------------------

#[test]
fn init_creates_store_dir() -> Result<()> {
    let dir = tempdir()?;
    let (cache, _) = open_cache(&dir)?;
    assert!(cache.store_dir().is_dir());
    assert_eq!(cache.table_name(), "test-malware-proto");
    Ok(())
}

#[test]
fn build_get_and_clear() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;

    let map = map_of(&[(4, b"aaaabbbb")]);
    cache.build(map.clone())?;
    assert_eq!(cache.get_prefixes()?, map);

    cache.clear_prefixes()?;
    assert!(cache.get_prefixes()?.is_empty());
    Ok(())
}

#[test]
fn has_is_not_supported_yet() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;
    cache.build(map_of(&[(4, b"aaaa")]))?;

    let result = cache.has(b"aaaa0000000000000000000000000000");
    assert_eq!(result, LookupResult::default());
    assert!(!result.has && !result.complete);
    Ok(())
}

#[test]
fn size_of_prefix_set_tracks_store() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;
    let empty = cache.size_of_prefix_set();
    cache.build(map_of(&[(4, &[1u8; 400])]))?;
    assert!(cache.size_of_prefix_set() >= empty + 400);
    Ok(())
}

// -------------------- Updates --------------------

#[test]
fn partial_update_merges_and_writes_metadata() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, sink) = open_cache(&dir)?;
    cache.build(map_of(&[(4, b"aaaabbbbcccc")]))?;

    let update =
        TableUpdate::partial(map_of(&[(5, b"bbbbb")]), vec![0]).with_metadata(b"st2", b"ck2");
    cache.apply_update(&update)?;

    assert_eq!(
        cache.get_prefixes()?,
        map_of(&[(4, b"bbbbcccc"), (5, b"bbbbb")])
    );
    let meta = cache.load_metadata()?;
    assert_eq!(meta.state, b"st2");
    assert_eq!(meta.checksum, b"ck2");
    assert!(sink.reports.borrow().is_empty());
    Ok(())
}

#[test]
fn full_update_replaces_contents() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;
    cache.build(map_of(&[(4, b"aaaa")]))?;

    let update = TableUpdate::full(map_of(&[(4, b"zzzz")])).with_metadata(b"s", b"c");
    cache.apply_update(&update)?;
    assert_eq!(cache.get_prefixes()?, map_of(&[(4, b"zzzz")]));
    assert_eq!(cache.load_metadata()?.state, b"s");
    Ok(())
}

#[test]
fn full_update_with_removals_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, sink) = open_cache(&dir)?;

    let mut update = TableUpdate::full(map_of(&[(4, b"zzzz")]));
    update.removal_indices = vec![0];
    let err = cache.apply_update(&update).unwrap_err();
    assert!(matches!(err, UpdateError::RemovalIndexOutOfRange { .. }));
    assert_eq!(
        *sink.reports.borrow(),
        vec![UpdateErrorType::WrongRemovalIndices]
    );
    assert!(cache.get_prefixes()?.is_empty());
    Ok(())
}

#[test]
fn duplicate_update_is_reported_and_leaves_store_untouched() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, sink) = open_cache(&dir)?;
    let original = map_of(&[(4, b"aaaabbbb")]);
    cache.build(original.clone())?;

    let update = TableUpdate::partial(map_of(&[(4, b"bbbb")]), vec![]).with_metadata(b"s", b"c");
    let err = cache.apply_update(&update).unwrap_err();

    assert!(matches!(err, UpdateError::DuplicatePrefix));
    assert_eq!(*sink.reports.borrow(), vec![UpdateErrorType::DuplicatePrefix]);
    assert_eq!(cache.get_prefixes()?, original);
    assert!(cache.load_metadata().is_err(), "metadata written for a failed update");
    Ok(())
}

#[test]
fn bad_removal_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, sink) = open_cache(&dir)?;
    cache.build(map_of(&[(4, b"aaaabbbb")]))?;

    let update = TableUpdate::partial(PrefixMap::new(), vec![5]);
    let err = cache.apply_partial_update(&update).unwrap_err();
    assert!(err.requires_full_update());
    assert_eq!(
        *sink.reports.borrow(),
        vec![UpdateErrorType::WrongRemovalIndices]
    );
    Ok(())
}

#[test]
fn successive_partial_updates() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;

    cache.apply_update(&TableUpdate::full(map_of(&[(4, b"bbbbdddd")])))?;
    cache.apply_update(&TableUpdate::partial(map_of(&[(4, b"aaaacccc")]), vec![]))?;
    // Current order: aaaa bbbb cccc dddd
    cache.apply_update(&TableUpdate::partial(map_of(&[(6, b"eeeeee")]), vec![0, 2]))?;

    assert_eq!(
        cache.get_prefixes()?,
        map_of(&[(4, b"bbbbdddd"), (6, b"eeeeee")])
    );
    Ok(())
}

#[test]
fn failed_metadata_write_restores_prefixes() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, sink) = open_cache(&dir)?;
    let original = map_of(&[(4, b"aaaabbbb")]);
    cache.build(original.clone())?;

    // A non-empty directory at the metadata path makes the final rename fail.
    let blocker = dir.path().join("cache").join("test-malware-proto.metadata");
    std::fs::create_dir(&blocker)?;
    std::fs::write(blocker.join("keep"), b"x")?;

    let update = TableUpdate::partial(map_of(&[(4, b"cccc")]), vec![0]).with_metadata(b"s", b"c");
    let err = cache.apply_update(&update).unwrap_err();

    assert!(matches!(err, UpdateError::Io(_)));
    assert!(!err.requires_full_update());
    assert_eq!(cache.get_prefixes()?, original);
    assert!(sink.reports.borrow().is_empty());
    assert!(blocker.join("keep").exists());
    Ok(())
}

#[test]
fn unsorted_update_prefixes_are_rejected() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, sink) = open_cache(&dir)?;
    let original = map_of(&[(4, b"bbbb")]);
    cache.build(original.clone())?;

    let update = TableUpdate::partial(map_of(&[(4, b"ccccaaaa")]), vec![]);
    let err = cache.apply_update(&update).unwrap_err();

    assert!(matches!(
        err,
        UpdateError::MalformedPrefixes(PrefixMapError::Unsorted { length: 4, index: 1 })
    ));
    assert!(err.requires_full_update());
    assert!(sink.reports.borrow().is_empty());
    assert_eq!(cache.get_prefixes()?, original);
    assert!(cache.load_metadata().is_err());

    // The table on disk stays loadable.
    cache.save()?;
    let (mut reopened, _) = open_cache(&dir)?;
    assert!(reopened.load()?);
    assert_eq!(reopened.get_prefixes()?, original);
    Ok(())
}

#[test]
fn duplicated_update_prefixes_are_rejected() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;

    let partial = TableUpdate::partial(map_of(&[(4, b"aaaaaaaa")]), vec![]);
    let err = cache.apply_partial_update(&partial).unwrap_err();
    assert!(matches!(err, UpdateError::MalformedPrefixes(_)));

    let full = TableUpdate::full(map_of(&[(5, b"bbbbbaaaaa")]));
    let err = cache.apply_update(&full).unwrap_err();
    assert!(matches!(err, UpdateError::MalformedPrefixes(_)));
    assert!(cache.get_prefixes()?.is_empty());
    Ok(())
}

// -------------------- Persistence --------------------

#[test]
fn save_and_load_default_file() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;
    let map = map_of(&[(4, b"aaaa"), (32, &[9u8; 32])]);
    cache.build(map.clone())?;
    cache.save()?;

    let (mut reopened, _) = open_cache(&dir)?;
    assert!(reopened.load()?);
    assert_eq!(reopened.get_prefixes()?, map);
    Ok(())
}

#[test]
fn load_without_file_is_a_no_op() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;
    assert!(!cache.load()?);
    assert!(cache.get_prefixes()?.is_empty());
    Ok(())
}

#[test]
fn store_errors_surface_as_store_variant() -> Result<()> {
    let dir = tempdir()?;
    let (mut cache, _) = open_cache(&dir)?;
    let err = cache.load_from_file(&dir.path().join("missing.vlpset")).unwrap_err();
    assert!(matches!(err, UpdateError::Store(_)));
    Ok(())
}
