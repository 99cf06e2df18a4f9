//! Wire-format records and their conversion into model entities.

use serde::{Deserialize, Serialize};

use crate::model::{NewSkillLink, Skill, SkillLink, Technician, UNNAMED_SKILL, User};

/// `ServiceResource` row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct ServiceResourceRecord {
    /// Record id.
    id: String,
    /// Resource name.
    name: Option<String>,
    /// Active flag.
    is_active: Option<bool>,
}

impl From<ServiceResourceRecord> for Technician {
    fn from(record: ServiceResourceRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.unwrap_or_default(),
            email: None,
            is_active: record.is_active.unwrap_or(false),
        }
    }
}

/// `User` row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct UserRecord {
    /// Record id.
    id: String,
    /// User name.
    name: Option<String>,
    /// User email.
    email: Option<String>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.unwrap_or_default(),
            email: record.email,
        }
    }
}

/// `Skill` row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct SkillRecord {
    /// Record id.
    id: String,
    /// Label shown in the org.
    master_label: Option<String>,
}

impl SkillRecord {
    /// Convert into a skill, dropping rows without a label.
    pub(super) fn into_skill(self) -> Option<Skill> {
        let label = self.master_label?.trim().to_string();
        if label.is_empty() {
            return None;
        }
        Some(Skill { id: self.id, label })
    }
}

/// Skill fields embedded in an assignment row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SkillRef {
    /// Label shown in the org.
    master_label: Option<String>,
    /// API name.
    developer_name: Option<String>,
}

/// `ServiceResourceSkill` row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct SkillLinkRecord {
    /// Link record id.
    id: Option<String>,
    /// Linked skill id.
    skill_id: Option<String>,
    /// Embedded skill relationship.
    skill: Option<SkillRef>,
}

impl SkillLinkRecord {
    /// Convert into a link, dropping rows without a skill id.
    ///
    /// A missing link id becomes empty: the skill still counts as held but
    /// the link cannot be removed.
    pub(super) fn into_link(self) -> Option<SkillLink> {
        let skill_id = self.skill_id.filter(|id| !id.is_empty())?;
        let label = self
            .skill
            .and_then(|skill| skill.master_label.or(skill.developer_name))
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| UNNAMED_SKILL.to_string());
        Some(SkillLink {
            link_id: self.id.unwrap_or_default(),
            skill_id,
            label,
        })
    }
}

/// Response body of a record creation.
#[derive(Debug, Deserialize)]
pub(super) struct CreatedRecord {
    /// Id of the created record.
    pub(super) id: Option<String>,
}

/// Body of a `ServiceResourceSkill` creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct SkillLinkBody<'a> {
    /// Technician receiving the skill.
    service_resource_id: &'a str,
    /// Skill being assigned.
    skill_id: &'a str,
    /// Start of the assignment.
    effective_start_date: &'a str,
    /// Optional skill level.
    #[serde(skip_serializing_if = "Option::is_none")]
    skill_level: Option<u32>,
}

impl<'a> From<&'a NewSkillLink> for SkillLinkBody<'a> {
    fn from(link: &'a NewSkillLink) -> Self {
        Self {
            service_resource_id: &link.technician_id,
            skill_id: &link.skill_id,
            effective_start_date: &link.effective_start_date,
            skill_level: link.skill_level,
        }
    }
}

/// Body of a `ServiceResource` activation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct ActivationBody {
    /// Requested active flag.
    pub(super) is_active: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ServiceResourceRecord, SkillLinkBody, SkillLinkRecord, SkillRecord};
    use crate::model::{NewSkillLink, Technician};

    #[test]
    fn technician_defaults_missing_fields() {
        let record: ServiceResourceRecord =
            serde_json::from_value(json!({ "Id": "0Hn000000000001" })).expect("decode");
        let technician = Technician::from(record);
        assert_eq!(technician.name, "");
        assert!(!technician.is_active);
    }

    #[test]
    fn skill_label_is_trimmed() {
        let record: SkillRecord = serde_json::from_value(json!({
            "Id": "0C5a",
            "MasterLabel": " Chip "
        }))
        .expect("decode");
        let skill = record.into_skill().expect("skill");
        assert_eq!(skill.label, "Chip");
    }

    #[test]
    fn link_label_falls_back_to_developer_name() {
        let record: SkillLinkRecord = serde_json::from_value(json!({
            "Id": "0Sx1",
            "SkillId": "0C5a",
            "Skill": { "MasterLabel": null, "DeveloperName": "Chip_Dev" }
        }))
        .expect("decode");
        let link = record.into_link().expect("link");
        assert_eq!(link.label, "Chip_Dev");
    }

    #[test]
    fn link_without_skill_relationship_is_unnamed() {
        let record: SkillLinkRecord =
            serde_json::from_value(json!({ "Id": "0Sx1", "SkillId": "0C5a" })).expect("decode");
        assert_eq!(record.into_link().expect("link").label, "(unnamed)");
    }

    #[test]
    fn link_without_id_is_kept_and_without_skill_is_dropped() {
        let record: SkillLinkRecord =
            serde_json::from_value(json!({ "Id": null, "SkillId": "0C5a" })).expect("decode");
        assert_eq!(record.into_link().expect("link").link_id, "");

        let record: SkillLinkRecord =
            serde_json::from_value(json!({ "Id": "0Sx1", "SkillId": null })).expect("decode");
        assert!(record.into_link().is_none());
    }

    #[test]
    fn skill_level_is_omitted_when_absent() {
        let link = NewSkillLink {
            technician_id: "0Hn1".to_string(),
            skill_id: "0C5a".to_string(),
            effective_start_date: "2026-01-01T00:00:00.000Z".to_string(),
            skill_level: None,
        };
        let body = serde_json::to_value(SkillLinkBody::from(&link)).expect("encode");
        assert_eq!(
            body,
            json!({
                "ServiceResourceId": "0Hn1",
                "SkillId": "0C5a",
                "EffectiveStartDate": "2026-01-01T00:00:00.000Z"
            })
        );
    }
}
