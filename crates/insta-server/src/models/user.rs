//! User record

use insta_common::ObjectId;
use serde::{Deserialize, Serialize};

use crate::codec::Record;
use crate::store::Collection;

/// Account owning posts
///
/// `password` holds the base64 SHA-256 digest once the user has been created;
/// plaintext only ever lives in the incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "ObjectId::is_zero")]
    pub id: ObjectId,

    #[serde(rename = "Name", skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(rename = "email", skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(rename = "password", skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
    const FIELDS: &'static [&'static str] = &["_id", "Name", "email", "password"];

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_user_encodes_in_field_order() {
        let user = User {
            id: ObjectId::parse_str("61680c9492897f0ebd1fbffa").unwrap(),
            name: "testUser".to_string(),
            email: "testEmail@mail.com".to_string(),
            password: "ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=".to_string(),
        };

        assert_eq!(
            serde_json::to_string(&user).unwrap(),
            r#"{"_id":"61680c9492897f0ebd1fbffa","Name":"testUser","email":"testEmail@mail.com","password":"ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0="}"#
        );
    }

    #[test]
    fn test_zero_fields_are_omitted() {
        assert_eq!(serde_json::to_string(&User::default()).unwrap(), "{}");

        let user = User {
            email: "only@mail.com".to_string(),
            ..User::default()
        };
        assert_eq!(serde_json::to_string(&user).unwrap(), r#"{"email":"only@mail.com"}"#);
    }

    #[test]
    fn test_decodes_stored_document() {
        let user: User = serde_json::from_str(r#"{"_id":"61680c9492897f0ebd1fbffa","Name":"n"}"#).unwrap();
        assert_eq!(user.id.to_hex(), "61680c9492897f0ebd1fbffa");
        assert_eq!(user.name, "n");
        assert!(user.email.is_empty());
    }
}
