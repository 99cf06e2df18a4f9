//! Typed entities exchanged between the remote service and the core.

/// A field-service technician (`ServiceResource`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technician {
    /// Remote unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email of the owning user, when resolved through the email path.
    pub email: Option<String>,
    /// Whether the technician record is active.
    pub is_active: bool,
}

/// A platform user that may own technician records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Remote unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
}

/// A remote skill definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    /// Remote unique id.
    pub id: String,
    /// Master label used to match configured group labels.
    pub label: String,
}

/// An assignment of a skill to a technician (`ServiceResourceSkill`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillLink {
    /// Id of the link record itself, needed for removal.
    pub link_id: String,
    /// Id of the linked skill.
    pub skill_id: String,
    /// Label of the linked skill for display.
    pub label: String,
}

/// Payload for creating a skill assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSkillLink {
    /// Technician receiving the skill.
    pub technician_id: String,
    /// Skill being assigned.
    pub skill_id: String,
    /// Start of the assignment, formatted as the API expects.
    pub effective_start_date: String,
    /// Optional skill level required by some orgs.
    pub skill_level: Option<u32>,
}

/// Label shown for links whose skill has no label.
pub const UNNAMED_SKILL: &str = "(unnamed)";
