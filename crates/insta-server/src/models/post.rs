//! Post record

use chrono::{DateTime, NaiveDateTime, Utc};
use insta_common::ObjectId;
use serde::{Deserialize, Serialize};

use crate::codec::Record;
use crate::store::Collection;

/// Layout of the `timestamp` field, always rendered in UTC
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f UTC";

const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f UTC";

/// Image post owned by a user
///
/// `user_id` is the owner's id as the client sent it. It is not checked
/// against the users collection and is matched verbatim when listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "ObjectId::is_zero")]
    pub id: ObjectId,

    #[serde(rename = "Caption", skip_serializing_if = "String::is_empty")]
    pub caption: String,

    #[serde(rename = "ImageURL", skip_serializing_if = "String::is_empty")]
    pub image_url: String,

    #[serde(rename = "timestamp", skip_serializing_if = "String::is_empty")]
    pub timestamp: String,

    #[serde(rename = "userid", skip_serializing_if = "String::is_empty")]
    pub user_id: String,
}

impl Post {
    /// Wire name of the owner field, used for filtered finds
    pub const OWNER_FIELD: &'static str = "userid";

    /// Overwrite the timestamp with `at`
    pub fn stamp(&mut self, at: DateTime<Utc>) {
        self.timestamp = format_timestamp(at);
    }

    /// Parsed `timestamp`, if it holds one
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

impl Record for Post {
    const COLLECTION: Collection = Collection::Posts;
    const FIELDS: &'static [&'static str] = &["_id", "Caption", "ImageURL", "timestamp", "userid"];

    fn id(&self) -> ObjectId {
        self.id
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_PARSE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
