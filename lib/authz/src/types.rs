//! Authorization types: actions, resources, and decisions.

use schoolbook_core::{AnnouncementId, GradeId, StudentId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the caller wants to do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// View a resource or list a collection.
    Read,
    /// Create, update, or delete a resource.
    Write,
}

impl Action {
    /// Returns the action name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resource types in the authorization model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// A student record.
    Student,
    /// A grade belonging to a student.
    Grade,
    /// A school announcement.
    Announcement,
    /// A login account.
    UserAccount,
    /// A family-to-student link.
    FamilyLink,
    /// A type name the engine does not know. Always denied.
    Unrecognized(String),
}

impl ResourceType {
    /// Maps a type name onto a resource type.
    ///
    /// Never fails: unknown names become [`ResourceType::Unrecognized`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "student" => Self::Student,
            "grade" => Self::Grade,
            "announcement" => Self::Announcement,
            "user_account" => Self::UserAccount,
            "family_link" => Self::FamilyLink,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Returns the type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Student => "student",
            Self::Grade => "grade",
            Self::Announcement => "announcement",
            Self::UserAccount => "user_account",
            Self::FamilyLink => "family_link",
            Self::Unrecognized(name) => name,
        }
    }

    /// Returns false for [`ResourceType::Unrecognized`].
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A uniform handle on a resource, independent of its storage schema.
///
/// `id` is `None` for collection-level requests (listing, creating).
/// `owner_student_id` names the student a grade or link belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// The type of resource.
    pub resource_type: ResourceType,
    /// The resource key, if a single resource is addressed.
    pub id: Option<i64>,
    /// The student who owns this resource, if any.
    pub owner_student_id: Option<StudentId>,
}

impl ResourceRef {
    /// Creates a new resource reference.
    #[must_use]
    pub fn new(
        resource_type: ResourceType,
        id: Option<i64>,
        owner_student_id: Option<StudentId>,
    ) -> Self {
        Self {
            resource_type,
            id,
            owner_student_id,
        }
    }

    /// A single student record; the student owns itself.
    #[must_use]
    pub fn student(id: StudentId) -> Self {
        Self::new(ResourceType::Student, Some(id.get()), Some(id))
    }

    /// The student collection.
    #[must_use]
    pub fn students() -> Self {
        Self::new(ResourceType::Student, None, None)
    }

    /// A single grade of a student.
    #[must_use]
    pub fn grade(id: GradeId, owner: StudentId) -> Self {
        Self::new(ResourceType::Grade, Some(id.get()), Some(owner))
    }

    /// The grades of a student, as a collection.
    #[must_use]
    pub fn grades_of(owner: StudentId) -> Self {
        Self::new(ResourceType::Grade, None, Some(owner))
    }

    /// Grades in general, before an owner is known.
    #[must_use]
    pub fn grades() -> Self {
        Self::new(ResourceType::Grade, None, None)
    }

    /// A single announcement.
    #[must_use]
    pub fn announcement(id: AnnouncementId) -> Self {
        Self::new(ResourceType::Announcement, Some(id.get()), None)
    }

    /// The announcement board.
    #[must_use]
    pub fn announcements() -> Self {
        Self::new(ResourceType::Announcement, None, None)
    }

    /// A single login account.
    #[must_use]
    pub fn user_account(id: UserId) -> Self {
        Self::new(ResourceType::UserAccount, Some(id.get()), None)
    }

    /// The account collection.
    #[must_use]
    pub fn user_accounts() -> Self {
        Self::new(ResourceType::UserAccount, None, None)
    }

    /// The link between a family account and a student.
    #[must_use]
    pub fn family_link(user_id: UserId, student_id: StudentId) -> Self {
        Self::new(ResourceType::FamilyLink, Some(user_id.get()), Some(student_id))
    }

    /// The family-link collection.
    #[must_use]
    pub fn family_links() -> Self {
        Self::new(ResourceType::FamilyLink, None, None)
    }

    /// Returns the student whose family may see this resource.
    ///
    /// A student record without an explicit owner is owned by itself.
    #[must_use]
    pub fn owner_student(&self) -> Option<StudentId> {
        match (&self.resource_type, self.owner_student_id, self.id) {
            (_, Some(owner), _) => Some(owner),
            (ResourceType::Student, None, Some(id)) => Some(StudentId::new(id)),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}:{}", self.resource_type, id),
            None => write!(f, "{}:*", self.resource_type),
        }
    }
}

/// Why a request was denied.
///
/// Reasons are for logs and tests; callers must not show them to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The role may never perform this action on this resource type.
    InsufficientRole,
    /// The role may, but not on a student the principal is not linked to.
    NotOwner,
    /// No rule covers the request.
    UnknownPolicy,
}

impl DenyReason {
    /// Returns the reason name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientRole => "insufficient_role",
            Self::NotOwner => "not_owner",
            Self::UnknownPolicy => "unknown_policy",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed to storage.
    Allow,
    /// The request must be rejected without touching storage.
    Deny(DenyReason),
}

impl Decision {
    /// Returns true for `Allow`.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the denial reason, if denied.
    #[must_use]
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny(reason) => write!(f, "deny({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_owns_itself() {
        let r = ResourceRef::student(StudentId::new(12));
        assert_eq!(r.owner_student(), Some(StudentId::new(12)));
    }

    #[test]
    fn bare_student_ref_falls_back_to_id() {
        let r = ResourceRef::new(ResourceType::Student, Some(12), None);
        assert_eq!(r.owner_student(), Some(StudentId::new(12)));
    }

    #[test]
    fn explicit_owner_wins() {
        let r = ResourceRef::grade(GradeId::new(5), StudentId::new(12));
        assert_eq!(r.owner_student(), Some(StudentId::new(12)));
    }

    #[test]
    fn announcements_have_no_owner() {
        assert_eq!(ResourceRef::announcements().owner_student(), None);
        assert_eq!(ResourceRef::students().owner_student(), None);
    }

    #[test]
    fn unknown_type_names_are_unrecognized() {
        let t = ResourceType::from_name("timetable");
        assert_eq!(t, ResourceType::Unrecognized("timetable".to_string()));
        assert!(!t.is_recognized());
        assert_eq!(t.as_str(), "timetable");
    }

    #[test]
    fn known_type_names_roundtrip() {
        for t in [
            ResourceType::Student,
            ResourceType::Grade,
            ResourceType::Announcement,
            ResourceType::UserAccount,
            ResourceType::FamilyLink,
        ] {
            assert_eq!(ResourceType::from_name(t.as_str()), t);
        }
    }

    #[test]
    fn resource_display() {
        assert_eq!(ResourceRef::student(StudentId::new(3)).to_string(), "student:3");
        assert_eq!(ResourceRef::announcements().to_string(), "announcement:*");
    }

    #[test]
    fn decision_accessors() {
        assert!(Decision::Allow.is_allowed());
        assert_eq!(Decision::Allow.deny_reason(), None);
        let deny = Decision::Deny(DenyReason::NotOwner);
        assert!(!deny.is_allowed());
        assert_eq!(deny.deny_reason(), Some(DenyReason::NotOwner));
        assert_eq!(deny.to_string(), "deny(not_owner)");
    }
}
