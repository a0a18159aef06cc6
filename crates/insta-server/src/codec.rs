//! Record codec
//!
//! Maps request bodies to typed records and records to store documents.
//!
//! Decoding follows the rules clients of this API already rely on:
//!
//! - keys match record fields case-insensitively, an exact match wins
//! - members apply in document order, so a repeated field keeps its last value
//! - unknown keys and `null` values are ignored
//! - missing fields keep their zero value
//!
//! What happens to a body that does not decode is a [`DecodePolicy`]. Under
//! [`DecodePolicy::Lenient`] (the default) a malformed body yields the default
//! record and a field of the wrong type is dropped; [`DecodePolicy::Strict`]
//! turns both into a [`DecodeError`].
//!
//! Encoding is plain `serde`: every record omits zero-valued fields.

use std::fmt;

use insta_common::ObjectId;
use serde::{
    de::{DeserializeOwned, MapAccess, Visitor},
    ser::Error as _,
    Deserialize, Deserializer, Serialize,
};
use serde_json::{error::Category, Value};

use crate::store::{Collection, Document};

/// A typed document living in one collection
pub trait Record: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Collection the record is stored in
    const COLLECTION: Collection;

    /// Wire names of the record's fields
    const FIELDS: &'static [&'static str];

    /// Store-assigned identifier, zero until inserted
    fn id(&self) -> ObjectId;
}

/// How to treat request bodies that fail to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Fall back to the default record and drop mistyped fields
    #[default]
    Lenient,
    /// Reject the request with 400
    Strict,
}

impl std::str::FromStr for DecodePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(DecodePolicy::Lenient),
            "strict" => Ok(DecodePolicy::Strict),
            _ => Err(anyhow::anyhow!("Invalid decode policy: {}", s)),
        }
    }
}

impl std::fmt::Display for DecodePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodePolicy::Lenient => write!(f, "lenient"),
            DecodePolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Errors surfaced by strict decoding
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed JSON body: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Invalid value for field '{field}': {source}")]
    Field {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a request body under the given policy
pub fn decode<R: Record>(body: &[u8], policy: DecodePolicy) -> Result<R, DecodeError> {
    match policy {
        DecodePolicy::Lenient => Ok(decode_lenient(body)),
        DecodePolicy::Strict => decode_strict(body),
    }
}

/// Decode a request body, never failing
pub fn decode_lenient<R: Record>(body: &[u8]) -> R {
    let members = match parse_object(body) {
        Ok(members) => members,
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring undecodable request body");
            return R::default();
        },
    };

    let mut accepted = Document::new();
    for (field, value) in canonicalize::<R>(members) {
        match check_field::<R>(field, &value) {
            Ok(()) => {
                accepted.insert(field.to_string(), value);
            },
            Err(err) => {
                tracing::debug!(field, error = %err, "Dropping field with unexpected type");
            },
        }
    }

    serde_json::from_value(Value::Object(accepted)).unwrap_or_default()
}

fn decode_strict<R: Record>(body: &[u8]) -> Result<R, DecodeError> {
    let members = parse_object(body)?;

    let mut accepted = Document::new();
    for (field, value) in canonicalize::<R>(members) {
        check_field::<R>(field, &value).map_err(|source| DecodeError::Field { field, source })?;
        accepted.insert(field.to_string(), value);
    }

    serde_json::from_value(Value::Object(accepted)).map_err(DecodeError::Syntax)
}

fn parse_object(body: &[u8]) -> Result<Members, DecodeError> {
    serde_json::from_slice::<Members>(body).map_err(|err| match err.classify() {
        Category::Data => DecodeError::NotAnObject,
        _ => DecodeError::Syntax(err),
    })
}

/// Members of a JSON object in document order, repeated keys included
struct Members(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Members {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MembersVisitor;

        impl<'de> Visitor<'de> for MembersVisitor {
            type Value = Members;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Members, A::Error> {
                let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(member) = map.next_entry::<String, Value>()? {
                    members.push(member);
                }
                Ok(Members(members))
            }
        }

        deserializer.deserialize_map(MembersVisitor)
    }
}

/// Map incoming keys to the record's wire names, keeping document order
///
/// A key equal to a wire name maps to it; otherwise the first wire name equal
/// ignoring ASCII case does. Later members for the same field overwrite
/// earlier ones when inserted in order.
fn canonicalize<R: Record>(members: Members) -> impl Iterator<Item = (&'static str, Value)> {
    members.0.into_iter().filter_map(|(key, value)| {
        if value.is_null() {
            return None;
        }
        let field = R::FIELDS
            .iter()
            .find(|field| **field == key)
            .or_else(|| R::FIELDS.iter().find(|field| field.eq_ignore_ascii_case(&key)))?;
        Some((*field, value))
    })
}

/// Whether `value` deserializes into `field` of `R`
fn check_field<R: Record>(field: &str, value: &Value) -> Result<(), serde_json::Error> {
    let mut single = Document::new();
    single.insert(field.to_string(), value.clone());
    serde_json::from_value::<R>(Value::Object(single)).map(|_| ())
}

/// Serialize a record into a store document
pub fn to_document<R: Record>(record: &R) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(document) => Ok(document),
        other => Err(serde_json::Error::custom(format!(
            "record serialized to {} instead of an object",
            json_kind(&other)
        ))),
    }
}

/// Deserialize a store document into a record
pub fn from_document<R: Record>(document: Document) -> Result<R, serde_json::Error> {
    serde_json::from_value(Value::Object(document))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
