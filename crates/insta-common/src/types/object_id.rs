//! Document identifiers
//!
//! An [`ObjectId`] is a 12-byte opaque handle assigned by the document store.
//! On the wire it is a lowercase, 24-character hexadecimal string. The layout
//! of generated ids is:
//!
//! - 4 bytes: seconds since the Unix epoch (big-endian)
//! - 5 bytes: random value fixed for the lifetime of the process
//! - 3 bytes: incrementing counter (big-endian), seeded randomly
//!
//! The all-zero id is reserved: it is what a malformed path segment parses to,
//! and records carrying it are treated as "no id assigned yet".

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{CommonError, Result};

/// Length of an id in bytes
pub const OBJECT_ID_LEN: usize = 12;

/// Length of the hex representation
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// 12-byte store identifier
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// The reserved all-zero id
    pub const ZERO: ObjectId = ObjectId([0; OBJECT_ID_LEN]);

    /// Generate a fresh id from the current time
    pub fn generate() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        Self::with_timestamp(seconds)
    }

    fn with_timestamp(seconds: u32) -> Self {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        let count = next_count();
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Build an id from raw bytes
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the id
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Parse a 24-character hex string
    ///
    /// Upper- and lowercase digits are accepted; anything else is an error.
    pub fn parse_str(value: &str) -> Result<Self> {
        if value.len() != OBJECT_ID_HEX_LEN {
            return Err(CommonError::invalid_object_id(
                value,
                format!("expected {} hex characters, got {}", OBJECT_ID_HEX_LEN, value.len()),
            ));
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(value, &mut bytes)
            .map_err(|e| CommonError::invalid_object_id(value, e.to_string()))?;

        Ok(Self(bytes))
    }

    /// Parse a hex string, falling back to [`ObjectId::ZERO`] when malformed
    pub fn parse_lenient(value: &str) -> Self {
        Self::parse_str(value).unwrap_or(Self::ZERO)
    }

    /// Whether this is the reserved zero id
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Lowercase hex representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Creation time encoded in the leading four bytes
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(seconds), 0)
            .single()
            .unwrap_or_default()
    }
}

fn process_unique() -> &'static [u8; 5] {
    static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS_UNIQUE.get_or_init(|| {
        let random = Uuid::new_v4();
        let mut bytes = [0u8; 5];
        bytes.copy_from_slice(&random.as_bytes()[..5]);
        bytes
    })
}

fn next_count() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| {
        let seed = Uuid::new_v4().as_u128() as u32;
        AtomicU32::new(seed & COUNTER_MASK)
    });
    counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse_str(&value).map_err(de::Error::custom)
    }
}
