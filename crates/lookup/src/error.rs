use std::fmt;
use std::io;

use prefixset::PrefixMapError;
use thiserror::Error;

/// Errors produced while applying an update to a lookup cache.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The add set re-introduced a prefix already present in the old set.
    #[error("add prefix already exists in the current prefix set")]
    DuplicatePrefix,

    /// The merge ran out of iterations before either side was exhausted.
    #[error("partial update did not finish within {bound} iterations")]
    InfiniteLoopGuardTripped { bound: usize },

    /// Removal indices were left over once the old prefix set ran out.
    #[error("{remaining} removal indices point past the end of the current prefix set")]
    RemovalIndexOutOfRange { remaining: usize },

    /// The update's own prefix groups are unsorted or contain duplicates.
    #[error("malformed update prefixes: {0}")]
    MalformedPrefixes(#[source] PrefixMapError),

    /// Codec, metadata or file-system failure.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Failure reported by the prefix store.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl UpdateError {
    /// The telemetry tag for merge failures, `None` for everything else.
    pub fn error_type(&self) -> Option<UpdateErrorType> {
        match self {
            UpdateError::DuplicatePrefix => Some(UpdateErrorType::DuplicatePrefix),
            UpdateError::InfiniteLoopGuardTripped { .. } => Some(UpdateErrorType::InfiniteLoop),
            UpdateError::RemovalIndexOutOfRange { .. } => {
                Some(UpdateErrorType::WrongRemovalIndices)
            }
            UpdateError::MalformedPrefixes(_) | UpdateError::Io(_) | UpdateError::Store(_) => None,
        }
    }

    /// `true` when the update data itself is bad and the caller should
    /// discard it and request a full list instead of retrying.
    #[must_use]
    pub fn requires_full_update(&self) -> bool {
        self.error_type().is_some() || matches!(self, UpdateError::MalformedPrefixes(_))
    }
}

/// Stable classification of malformed updates, reported to an [`AnomalySink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum UpdateErrorType {
    DuplicatePrefix = 0,
    InfiniteLoop = 1,
    WrongRemovalIndices = 2,
}

impl UpdateErrorType {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn tag(self) -> &'static str {
        match self {
            UpdateErrorType::DuplicatePrefix => "DUPLICATE_PREFIX",
            UpdateErrorType::InfiniteLoop => "INFINITE_LOOP",
            UpdateErrorType::WrongRemovalIndices => "WRONG_REMOVAL_INDICES",
        }
    }
}

impl fmt::Display for UpdateErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Receives a tag for every malformed update before the error is returned.
pub trait AnomalySink {
    fn report(&self, kind: UpdateErrorType);
}

/// Default sink: logs the anomaly at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AnomalySink for LogSink {
    fn report(&self, kind: UpdateErrorType) {
        log::warn!("update error type {} ({})", kind.tag(), kind.code());
    }
}
