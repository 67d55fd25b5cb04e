// Data shapes exchanged with the vault server.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize, Serializer};

/// Session token issued by `/registration` or `/authentication`.
///
/// Owned by the [`Shell`](crate::shell::Shell) and lent to the transport on
/// every call. Never persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Replace the current token, e.g. after logging in as another user.
    pub fn replace(&mut self, token: String) {
        self.token = token;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Login request payload for both registration and authentication.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// One stored record as listed by `/get_data`. Field names mirror the
/// server's JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "UserID")]
    pub owner_id: u64,
    #[serde(rename = "UserData")]
    pub payload: String,
    #[serde(rename = "DataType")]
    pub data_type: String,
}

impl Record {
    /// The record kind, if the server's tag is one this client understands.
    pub fn kind(&self) -> Option<RecordKind> {
        self.data_type.parse().ok()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, UserID: {}, Data: {}, DataType: {}",
            self.id, self.owner_id, self.payload, self.data_type
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Credential,
    Text,
    Binary,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Credential, RecordKind::Text, RecordKind::Binary];

    /// Tag used in the `Data-Type` header and the `DataType` field.
    pub fn wire_tag(self) -> &'static str {
        match self {
            RecordKind::Credential => "log-pas",
            RecordKind::Text => "text",
            RecordKind::Binary => "binary",
        }
    }

    /// Content type announced when adding a record of this kind.
    pub fn content_type(self) -> &'static str {
        match self {
            RecordKind::Binary => "application/octet-stream",
            _ => "application/json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Credential => "credential (login/password)",
            RecordKind::Text => "text",
            RecordKind::Binary => "binary",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_tag())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "log-pas" | "key-pas" | "credential" => Ok(RecordKind::Credential),
            "text" => Ok(RecordKind::Text),
            "binary" => Ok(RecordKind::Binary),
            other => Err(format!("unknown record kind `{other}`")),
        }
    }
}

/// Kind-shaped field set built from user input and sent once.
///
/// The variant is the kind, so a draft can never carry fields of another
/// kind than the tag it is sent under.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecordDraft {
    Credential {
        login: String,
        password: String,
        #[serde(rename = "meta-info")]
        meta_info: String,
    },
    Text {
        text: String,
        #[serde(rename = "meta-info")]
        meta_info: String,
    },
    Binary {
        #[serde(rename = "meta-info")]
        meta_info: String,
        #[serde(rename = "binary-data", serialize_with = "as_base64")]
        binary_data: Vec<u8>,
    },
}

impl RecordDraft {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordDraft::Credential { .. } => RecordKind::Credential,
            RecordDraft::Text { .. } => RecordKind::Text,
            RecordDraft::Binary { .. } => RecordKind::Binary,
        }
    }

    pub fn meta_info(&self) -> &str {
        match self {
            RecordDraft::Credential { meta_info, .. }
            | RecordDraft::Text { meta_info, .. }
            | RecordDraft::Binary { meta_info, .. } => meta_info,
        }
    }
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_record_list() {
        let body = r#"[{"ID":1,"UserID":1,"UserData":"data1","DataType":"text"}]"#;
        let records: Vec<Record> = serde_json::from_str(body).unwrap();
        assert_eq!(
            records,
            vec![Record {
                id: 1,
                owner_id: 1,
                payload: "data1".into(),
                data_type: "text".into(),
            }]
        );
        assert_eq!(records[0].kind(), Some(RecordKind::Text));
    }

    #[test]
    fn unknown_data_type_has_no_kind() {
        let record = Record {
            id: 3,
            owner_id: 1,
            payload: String::new(),
            data_type: "card".into(),
        };
        assert_eq!(record.kind(), None);
    }

    #[test]
    fn kind_aliases() {
        assert_eq!("key-pas".parse::<RecordKind>(), Ok(RecordKind::Credential));
        assert_eq!("credential".parse::<RecordKind>(), Ok(RecordKind::Credential));
        assert_eq!(" binary ".parse::<RecordKind>(), Ok(RecordKind::Binary));
        assert!("exit".parse::<RecordKind>().is_err());
        assert_eq!(RecordKind::Credential.wire_tag(), "log-pas");
    }

    #[test]
    fn credential_draft_fields() {
        let draft = RecordDraft::Credential {
            login: "user".into(),
            password: "pass".into(),
            meta_info: "bank".into(),
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"login": "user", "password": "pass", "meta-info": "bank"})
        );
        assert_eq!(draft.kind(), RecordKind::Credential);
    }

    #[test]
    fn binary_draft_is_base64() {
        let draft = RecordDraft::Binary {
            meta_info: String::new(),
            binary_data: b"hi\x00".to_vec(),
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"meta-info": "", "binary-data": "aGkA"})
        );
    }

    #[test]
    fn session_debug_hides_token() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());
        session.replace("secret-token".into());
        assert!(session.is_authenticated());
        assert!(!format!("{session:?}").contains("secret-token"));
    }
}
