use core::fmt::{self, Debug};

/// A view into an error kind returned by the fallible methods of [`PairMap`](super::PairMap).
/// It is part of the [`InsertError`] structure and can be obtained from
/// [`PairMapError`] with [`PairMapError::kind`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Returns when an argument is unusable: an absent key, a capacity that does
    /// not fit into `usize`, or a start index outside of the destination.
    InvalidArgument,
    /// Returns when [`add`](super::PairMap::add) is called with a key which
    /// already exists in the map.
    DuplicateKey,
    /// Returns when a key read with [`get`](super::PairMap::get) is not in the map.
    KeyNotFound,
    /// Returns when the destination of [`copy_to`](super::PairMap::copy_to) can
    /// not hold all entries.
    InsufficientSpace,
    /// Returns when a [`Cursor`](super::Cursor) is advanced after the map was modified.
    ConcurrentModification,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error_txt = match *self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::DuplicateKey => "an entry with the same key already exists",
            ErrorKind::KeyNotFound => "the given key was not present in the map",
            ErrorKind::InsufficientSpace => "destination is too small to hold all entries",
            ErrorKind::ConcurrentModification => "the map was modified during enumeration",
        };
        write!(f, "{}", error_txt)
    }
}

/// The error returned by the non-inserting fallible methods of [`PairMap`](super::PairMap)
/// and by [`Cursor::advance`](super::Cursor::advance).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairMapError {
    /// An argument is unusable. `argument` names it.
    InvalidArgument {
        /// Name of the rejected argument.
        argument: &'static str,
    },
    /// An entry with an equal key already exists.
    DuplicateKey,
    /// No entry with an equal key exists.
    KeyNotFound,
    /// The destination has room for `available` entries, but `required` are needed.
    InsufficientSpace {
        /// Number of entries to copy.
        required: usize,
        /// Number of slots from the start index to the end of the destination.
        available: usize,
    },
    /// The map was modified after the cursor was created or reset.
    ConcurrentModification,
}

impl PairMapError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            PairMapError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            PairMapError::DuplicateKey => ErrorKind::DuplicateKey,
            PairMapError::KeyNotFound => ErrorKind::KeyNotFound,
            PairMapError::InsufficientSpace { .. } => ErrorKind::InsufficientSpace,
            PairMapError::ConcurrentModification => ErrorKind::ConcurrentModification,
        }
    }
}

impl fmt::Display for PairMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PairMapError::InvalidArgument { argument } => {
                write!(f, "invalid argument `{}`", argument)
            }
            PairMapError::InsufficientSpace {
                required,
                available,
            } => write!(
                f,
                "destination is too small, {} entries required but only {} available",
                required, available
            ),
            ref other => write!(f, "{}", other.kind()),
        }
    }
}

impl std::error::Error for PairMapError {}

/// The error returned by [`add`](super::PairMap::add), [`add_entry`](super::PairMap::add_entry),
/// [`add_or_update`](super::PairMap::add_or_update) and [`set`](super::PairMap::set)
/// methods of the [`PairMap`](super::PairMap).
///
/// Contains the [`ErrorKind`] enum (either [`ErrorKind::InvalidArgument`] for an absent key
/// or [`ErrorKind::DuplicateKey`]), and the provided key and pair that were not inserted.
/// These returned key and pair can be used for another purpose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertError<K, V1, V2> {
    /// Explains why the key and pair were not inserted.
    pub error: ErrorKind,
    /// The provided key that was returned because of error.
    pub key: K,
    /// The value pair which was not inserted because of the error.
    pub pair: (V1, V2),
}

impl<K, V1, V2> InsertError<K, V1, V2> {
    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.error
    }

    /// Gives back the key and the pair that were not inserted.
    #[inline]
    pub fn into_entry(self) -> (K, (V1, V2)) {
        (self.key, self.pair)
    }
}

impl<K: Debug, V1: Debug, V2: Debug> fmt::Display for InsertError<K, V1, V2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error {
            ErrorKind::DuplicateKey => write!(
                f,
                "failed to insert {:?}, because key = {:?} already exists",
                self.pair, self.key
            ),
            ErrorKind::InvalidArgument => write!(
                f,
                "failed to insert {:?}, because key = {:?} is absent",
                self.pair, self.key
            ),
            other => write!(f, "failed to insert {:?}: {}", self.pair, other),
        }
    }
}

impl<K: Debug, V1: Debug, V2: Debug> std::error::Error for InsertError<K, V1, V2> {}

impl<K, V1, V2> From<InsertError<K, V1, V2>> for PairMapError {
    fn from(error: InsertError<K, V1, V2>) -> Self {
        match error.error {
            ErrorKind::InvalidArgument => PairMapError::InvalidArgument { argument: "key" },
            ErrorKind::DuplicateKey => PairMapError::DuplicateKey,
            ErrorKind::KeyNotFound => PairMapError::KeyNotFound,
            ErrorKind::InsufficientSpace => PairMapError::InsufficientSpace {
                required: 1,
                available: 0,
            },
            ErrorKind::ConcurrentModification => PairMapError::ConcurrentModification,
        }
    }
}
