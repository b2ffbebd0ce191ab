//! Two-role capability gate.
//!
//! A caller is either a [`Role::Guest`] (the default) or a
//! [`Role::Maintainer`]. Guests may freely create issues and may change the
//! ones they created themselves (`createdByVisitor == true`); everything else
//! needs a maintainer. There are no per-field permissions and no audit log.
//!
//! Maintainer status is granted by presenting a shared secret to a
//! [`SecretVerifier`]. The verifier is injected so a deployment can swap in
//! real credential checks; the bundled [`SharedSecret`] is a convenience
//! lock, not a security boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::error::{ErrorCode, Result};
use crate::model::Issue;
use crate::storage::StoragePort;

/// Caller role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Maintainer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Maintainer => "maintainer",
        }
    }

    #[must_use]
    pub const fn is_maintainer(self) -> bool {
        matches!(self, Self::Maintainer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutations the gate decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Move,
    Delete,
    Comment,
    Create,
    Reset,
}

impl Action {
    const fn verb(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Comment => "comment on",
            Self::Create => "create",
            Self::Reset => "reset",
        }
    }
}

/// What an action is applied to.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A persisted issue.
    Issue(&'a Issue),
    /// The unsaved draft.
    Draft,
    /// The whole collection (reset).
    Collection,
}

/// Reasons the gate refuses a mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// Guest tried to change an issue they did not create.
    #[error("guests cannot {action} {id}: only maintainers may change issues they did not create")]
    NotPermitted { action: &'static str, id: String },

    /// Unsaved drafts cannot change column.
    #[error("a draft cannot be moved; save it first")]
    DraftNotMovable,

    /// Only maintainers may replace the whole collection.
    #[error("only maintainers can reset the board")]
    MaintainerOnly,

    /// The presented secret was rejected.
    #[error("maintainer secret rejected")]
    BadSecret,
}

impl AuthorizationError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::BadSecret => ErrorCode::BadSecret,
            Self::NotPermitted { .. } | Self::DraftNotMovable | Self::MaintainerOnly => {
                ErrorCode::PermissionDenied
            }
        }
    }
}

/// Decide whether `role` may perform `action` on `target`.
///
/// # Errors
///
/// Returns the [`AuthorizationError`] describing the denial.
pub fn authorize(role: Role, action: Action, target: Target<'_>) -> Result<(), AuthorizationError> {
    let decision = match (action, target) {
        (Action::Create, _) => Ok(()),
        (Action::Reset, _) => {
            if role.is_maintainer() {
                Ok(())
            } else {
                Err(AuthorizationError::MaintainerOnly)
            }
        }
        (Action::Move, Target::Draft) => Err(AuthorizationError::DraftNotMovable),
        (_, Target::Draft) => Ok(()),
        (_, Target::Issue(issue)) => {
            if role.is_maintainer() || issue.created_by_visitor {
                Ok(())
            } else {
                Err(AuthorizationError::NotPermitted {
                    action: action.verb(),
                    id: issue.id.clone(),
                })
            }
        }
        (_, Target::Collection) => {
            if role.is_maintainer() {
                Ok(())
            } else {
                Err(AuthorizationError::MaintainerOnly)
            }
        }
    };

    if let Err(err) = &decision {
        warn!(%role, ?action, %err, "mutation denied");
    }
    decision
}

/// Provenance flag for an issue created by `role`.
#[must_use]
pub const fn provenance_for(role: Role) -> bool {
    !role.is_maintainer()
}

// ---------------------------------------------------------------------------
// Secret verification
// ---------------------------------------------------------------------------

/// Pluggable check for the maintainer secret.
pub trait SecretVerifier {
    fn verify(&self, presented: &str) -> bool;
}

impl<F> SecretVerifier for F
where
    F: Fn(&str) -> bool,
{
    fn verify(&self, presented: &str) -> bool {
        self(presented)
    }
}

/// Compares against a configured shared secret.
///
/// Both sides are hashed with BLAKE3 and the digests compared; `blake3::Hash`
/// equality is constant-time, so the comparison does not reveal how long a
/// matching prefix was.
#[derive(Clone)]
pub struct SharedSecret {
    digest: blake3::Hash,
}

impl SharedSecret {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            digest: blake3::hash(secret.as_bytes()),
        }
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

impl SecretVerifier for SharedSecret {
    fn verify(&self, presented: &str) -> bool {
        blake3::hash(presented.as_bytes()) == self.digest
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The caller's current role, persisted through the role key of a
/// [`StoragePort`] until an explicit sign-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    role: Role,
}

impl Session {
    /// Restore the persisted role, defaulting to guest.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the stored role cannot be read.
    pub fn load(port: &impl StoragePort) -> Result<Self> {
        let role = port.load_role()?.unwrap_or_default();
        Ok(Self { role })
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Become maintainer if `verifier` accepts `secret`.
    ///
    /// # Errors
    ///
    /// [`AuthorizationError::BadSecret`] on rejection (role unchanged), or a
    /// storage error if the new role cannot be persisted.
    pub fn sign_in(
        &mut self,
        secret: &str,
        verifier: &impl SecretVerifier,
        port: &mut impl StoragePort,
    ) -> Result<Role> {
        if !verifier.verify(secret) {
            warn!("maintainer sign-in rejected");
            return Err(AuthorizationError::BadSecret.into());
        }
        port.save_role(Role::Maintainer)?;
        self.role = Role::Maintainer;
        info!("signed in as maintainer");
        Ok(self.role)
    }

    /// Drop back to guest.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the role cannot be persisted.
    pub fn sign_out(&mut self, port: &mut impl StoragePort) -> Result<Role> {
        port.save_role(Role::Guest)?;
        self.role = Role::Guest;
        info!("signed out");
        Ok(self.role)
    }
}
