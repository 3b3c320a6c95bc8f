use crate::*;

#[test]
fn insert_rejects_zero_length() {
    let mut map = PrefixMap::new();
    assert_eq!(map.insert(0, vec![]), Err(PrefixMapError::ZeroLength));
}

#[test]
fn insert_rejects_misaligned_blob() {
    let mut map = PrefixMap::new();
    let err = map.insert(4, b"aaaabb".to_vec()).unwrap_err();
    assert_eq!(
        err,
        PrefixMapError::MisalignedBlob {
            length: 4,
            blob_len: 6
        }
    );
    assert!(map.is_empty());
}

#[test]
fn empty_groups_are_not_kept() {
    let mut map = PrefixMap::new();
    map.insert(4, b"aaaa".to_vec()).unwrap();
    map.insert(4, Vec::new()).unwrap();
    assert!(map.is_empty());
    assert_eq!(map, PrefixMap::new());
}

#[test]
fn count_sums_all_groups() {
    let mut map = PrefixMap::new();
    map.insert(4, b"aaaabbbbcccc".to_vec()).unwrap();
    map.insert(5, b"aaaaa".to_vec()).unwrap();
    assert_eq!(map.count(), 4);
    assert_eq!(map.group_count(), 2);
}

#[test]
fn append_prefix_groups_by_length() {
    let mut map = PrefixMap::new();
    map.append_prefix(b"aaaa");
    map.append_prefix(b"bbbbb");
    map.append_prefix(b"cccc");
    map.append_prefix(b"");
    assert_eq!(map.get(4), Some(&b"aaaacccc"[..]));
    assert_eq!(map.get(5), Some(&b"bbbbb"[..]));
    assert_eq!(map.group_count(), 2);
}

#[test]
fn from_prefixes_sorts_and_dedups() {
    let map = PrefixMap::from_prefixes([&b"cccc"[..], b"aaaa", b"cccc", b"zzzzz", b""]);
    assert_eq!(map.get(4), Some(&b"aaaacccc"[..]));
    assert_eq!(map.get(5), Some(&b"zzzzz"[..]));
    assert!(map.is_strictly_sorted());
}

#[test]
fn validate_reports_unsorted_position() {
    let mut map = PrefixMap::new();
    map.insert(4, b"aaaaccccbbbb".to_vec()).unwrap();
    assert_eq!(
        map.validate(),
        Err(PrefixMapError::Unsorted { length: 4, index: 2 })
    );
}

#[test]
fn validate_reports_duplicates() {
    let mut map = PrefixMap::new();
    map.insert(4, b"aaaaaaaa".to_vec()).unwrap();
    assert!(!map.is_strictly_sorted());
}

#[test]
fn iter_yields_groups_by_ascending_length() {
    let mut map = PrefixMap::new();
    map.insert(5, b"aaaaa".to_vec()).unwrap();
    map.insert(4, b"bbbbcccc".to_vec()).unwrap();
    let groups: Vec<(u32, &[u8])> = map.iter().collect();
    assert_eq!(groups, vec![(4, &b"bbbbcccc"[..]), (5, &b"aaaaa"[..])]);
}
