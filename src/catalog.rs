use serde_json::json;

use crate::query::compiler::ListSpec;
use crate::query::predicate::Predicate;
use crate::store::{Record, Store, StoreError};

/// The entity kinds this backend serves. The catalog maps each kind to its
/// table, its wire label, the foreign key other entities use to reference
/// it, and what the list machinery is allowed to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Team,
    Membership,
    Account,
    AccountMember,
    Project,
    Favorite,
    MembershipRequest,
}

static USER_LIST: ListSpec = ListSpec {
    sortable: &["displayName", "email", "role", "createdAt", "updatedAt"],
    searchable: &["displayName", "email", "handle"],
};

static TEAM_LIST: ListSpec = ListSpec {
    sortable: &["name", "createdAt", "updatedAt"],
    searchable: &["name"],
};

static MEMBERSHIP_LIST: ListSpec = ListSpec {
    sortable: &["role", "createdAt", "updatedAt"],
    searchable: &["role", "teamId", "userId"],
};

static ACCOUNT_LIST: ListSpec = ListSpec {
    sortable: &["name", "kind", "createdAt", "updatedAt"],
    searchable: &[],
};

static ACCOUNT_MEMBER_LIST: ListSpec = ListSpec {
    sortable: &["createdAt", "updatedAt"],
    searchable: &[],
};

static PROJECT_LIST: ListSpec = ListSpec {
    sortable: &["name", "createdAt", "updatedAt"],
    searchable: &[],
};

static FAVORITE_LIST: ListSpec = ListSpec {
    sortable: &["createdAt", "updatedAt"],
    searchable: &[],
};

static MEMBERSHIP_REQUEST_LIST: ListSpec = ListSpec {
    sortable: &["status", "createdAt", "updatedAt"],
    searchable: &[],
};

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Team => "teams",
            EntityKind::Membership => "memberships",
            EntityKind::Account => "accounts",
            EntityKind::AccountMember => "account_members",
            EntityKind::Project => "projects",
            EntityKind::Favorite => "favorites",
            EntityKind::MembershipRequest => "membership_requests",
        }
    }

    /// Label used in client-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Team => "Team",
            EntityKind::Membership => "Membership",
            EntityKind::Account => "Account",
            EntityKind::AccountMember => "Account member",
            EntityKind::Project => "Project",
            EntityKind::Favorite => "Favorite",
            EntityKind::MembershipRequest => "Membership request",
        }
    }

    /// Field other records use to reference an entity of this kind.
    pub fn scope_field(self) -> &'static str {
        match self {
            EntityKind::User => "userId",
            EntityKind::Team => "teamId",
            EntityKind::Membership => "membershipId",
            EntityKind::Account => "accountId",
            EntityKind::AccountMember => "accountMemberId",
            EntityKind::Project => "projectId",
            EntityKind::Favorite => "favoriteId",
            EntityKind::MembershipRequest => "membershipRequestId",
        }
    }

    /// The kind that records membership of users in this kind, if any.
    pub fn membership_link(self) -> Option<EntityKind> {
        match self {
            EntityKind::Team => Some(EntityKind::Membership),
            EntityKind::Account => Some(EntityKind::AccountMember),
            _ => None,
        }
    }

    pub fn list_spec(self) -> &'static ListSpec {
        match self {
            EntityKind::User => &USER_LIST,
            EntityKind::Team => &TEAM_LIST,
            EntityKind::Membership => &MEMBERSHIP_LIST,
            EntityKind::Account => &ACCOUNT_LIST,
            EntityKind::AccountMember => &ACCOUNT_MEMBER_LIST,
            EntityKind::Project => &PROJECT_LIST,
            EntityKind::Favorite => &FAVORITE_LIST,
            EntityKind::MembershipRequest => &MEMBERSHIP_REQUEST_LIST,
        }
    }

    /// Fields that must never leave the backend.
    pub fn secret_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::User => &["passwordHash"],
            _ => &[],
        }
    }
}

/// Entity-specific post-processing applied to every listed row: strips
/// secret fields and attaches computed fields.
pub async fn decorate(store: &dyn Store, kind: EntityKind, record: &mut Record) -> Result<(), StoreError> {
    for field in kind.secret_fields() {
        record.remove(*field);
    }

    if kind == EntityKind::Team {
        if let Some(id) = record.get("id").cloned() {
            let members = store
                .count(EntityKind::Membership, &Predicate::eq("teamId", id))
                .await?;
            record.insert("memberCount".to_string(), json!(members));
        }
    }

    Ok(())
}
