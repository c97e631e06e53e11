//! Who is acting on a donation item or writing on a post.

use uuid::Uuid;

use crate::{Account, AccountKind, EngineError};

/// The role a caller plays when changing an item's status or authoring a
/// comment.
///
/// The role is derived per request from the authenticated account; admins
/// have no item-level role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    User(Uuid),
    Institute(Uuid),
}

impl Actor {
    /// Column form used by comment and reply rows.
    pub(crate) fn to_columns(self) -> (&'static str, String) {
        match self {
            Self::User(id) => ("user", id.to_string()),
            Self::Institute(id) => ("institute", id.to_string()),
        }
    }

    pub(crate) fn from_columns(kind: &str, id: &str) -> Result<Self, EngineError> {
        let id = crate::util::parse_uuid(id, "author id")?;
        match kind {
            "user" => Ok(Self::User(id)),
            "institute" => Ok(Self::Institute(id)),
            other => Err(EngineError::Validation(format!(
                "unknown author kind: {other}"
            ))),
        }
    }
}

impl TryFrom<&Account> for Actor {
    type Error = EngineError;

    fn try_from(account: &Account) -> Result<Self, Self::Error> {
        match account.kind {
            AccountKind::User => Ok(Self::User(account.id)),
            AccountKind::Institute => Ok(Self::Institute(account.id)),
            AccountKind::Admin => Err(EngineError::Unauthorized(
                "only users and institutes can change item status".to_string(),
            )),
        }
    }
}
