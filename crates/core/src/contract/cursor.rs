//! Pagination cursors
//!
//! Two cursor shapes are exposed to callers:
//!
//! - [`Cursor`]: a composite `(version_boundary, id_boundary)` position in a
//!   definition series. Definitions are ordered by `(first_seen_version, id)`,
//!   which is a total order because ids are unique. A cursor handed out by a
//!   page is *inclusive*: the next page starts exactly at the named position.
//! - [`OffsetCursor`]: an index into a rollup snapshot.
//!
//! Both encode to base64 over a compact JSON object. Decoding is strict:
//! malformed base64, malformed JSON, unknown fields and missing fields are all
//! rejected with [`Error::InvalidCursor`], never clamped.

use crate::contract::StateVersion;
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Traversal direction over a definition series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Oldest first
    Ascending,
    /// Newest first
    #[default]
    Descending,
}

impl Direction {
    /// Name used in configuration files and logs
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite position in a definition series.
///
/// Ordered by `version_boundary` first, then `id_boundary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cursor {
    /// `first_seen_version` of the definition at this position
    #[serde(rename = "v")]
    pub version_boundary: StateVersion,
    /// Surrogate id of the definition at this position
    #[serde(rename = "id")]
    pub id_boundary: u64,
}

impl Cursor {
    /// Lowest possible position
    pub const MIN: Cursor = Cursor::new(StateVersion::ZERO, 0);

    /// Highest possible position
    pub const MAX: Cursor = Cursor::new(StateVersion::MAX, u64::MAX);

    /// Create a cursor
    pub const fn new(version_boundary: StateVersion, id_boundary: u64) -> Self {
        Cursor {
            version_boundary,
            id_boundary,
        }
    }

    /// Highest position that can exist at or below `version`
    pub const fn ceiling(version: StateVersion) -> Self {
        Cursor::new(version, u64::MAX)
    }

    /// The adjacent position immediately after this one in scan order.
    ///
    /// Descending scans step to `(version, id - 1)`, ascending scans to
    /// `(version, id + 1)`, carrying into the version at the id range edges.
    /// Returns `None` when no position can follow.
    pub fn step(&self, direction: Direction) -> Option<Cursor> {
        let v = self.version_boundary;
        match direction {
            Direction::Descending => match self.id_boundary.checked_sub(1) {
                Some(id) => Some(Cursor::new(v, id)),
                None => v.prev().map(|pv| Cursor::new(pv, u64::MAX)),
            },
            Direction::Ascending => match self.id_boundary.checked_add(1) {
                Some(id) => Some(Cursor::new(v, id)),
                None if v < StateVersion::MAX => Some(Cursor::new(v.next(), 0)),
                None => None,
            },
        }
    }

    /// Reject a position that cannot exist in a read pinned at `as_of`.
    pub fn ensure_within(&self, as_of: StateVersion) -> Result<()> {
        if self.version_boundary > as_of {
            return Err(Error::invalid_cursor(format!(
                "position {} lies beyond version {}",
                self, as_of
            )));
        }
        Ok(())
    }

    /// Encode as an opaque cursor string
    pub fn encode(&self) -> Result<String> {
        encode_json(self)
    }

    /// Decode an opaque cursor string
    pub fn decode(s: &str) -> Result<Self> {
        decode_json(s)
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.version_boundary, self.id_boundary)
    }
}

/// Offset into a rollup snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OffsetCursor {
    /// Zero-based index of the first child on the page
    #[serde(rename = "o")]
    pub offset: u64,
}

impl OffsetCursor {
    /// Create an offset cursor
    pub const fn new(offset: u64) -> Self {
        OffsetCursor { offset }
    }

    /// Cursor for the page after `offset..offset + limit`, if `total` has more children.
    pub fn next_after(offset: u64, limit: u64, total: u64) -> Option<OffsetCursor> {
        let next = offset.saturating_add(limit);
        (next < total).then(|| OffsetCursor::new(next))
    }

    /// Encode as an opaque cursor string
    pub fn encode(&self) -> Result<String> {
        encode_json(self)
    }

    /// Decode an opaque cursor string
    pub fn decode(s: &str) -> Result<Self> {
        decode_json(s)
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(BASE64.encode(json))
}

fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T> {
    if s.is_empty() {
        return Err(Error::invalid_cursor("empty cursor"));
    }
    let bytes = BASE64
        .decode(s)
        .map_err(|e| Error::invalid_cursor(format!("not base64: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::invalid_cursor(format!("bad payload: {}", e)))
}
