use std::cell::RefCell;
use std::rc::Rc;

use crate::{AnomalySink, PrefixMap, UpdateErrorType};

/// Builds a map from `(length, concatenated prefixes)` groups.
pub fn map_of(groups: &[(u32, &[u8])]) -> PrefixMap {
    let mut map = PrefixMap::new();
    for &(len, blob) in groups {
        map.insert(len, blob.to_vec()).unwrap();
    }
    map
}

/// Sink that remembers every reported anomaly.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub reports: Rc<RefCell<Vec<UpdateErrorType>>>,
}

impl AnomalySink for RecordingSink {
    fn report(&self, kind: UpdateErrorType) {
        self.reports.borrow_mut().push(kind);
    }
}
