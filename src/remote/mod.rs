//! Remote field-service API access.
//!
//! The core talks to the platform only through [`FieldService`], which speaks
//! in the typed entities of [`crate::model`]. [`SalesforceClient`] implements
//! it over the REST API: an OAuth2 password-grant login, paged SOQL queries
//! and single-record mutations.

use async_trait::async_trait;

use crate::{
    error::Result,
    model::{NewSkillLink, Skill, SkillLink, Technician, User},
};

/// OAuth2 password-grant login.
mod auth;
/// Typed REST client implementing [`FieldService`].
mod client;
/// Paged query execution and status handling.
mod query;
/// Wire-format records and their conversion into model entities.
mod records;

pub use self::{
    auth::{Session, authenticate},
    client::SalesforceClient,
};

/// Operations the reconciler needs from the field-service platform.
///
/// Lookups that return lists honor the given `limit` and order technicians by
/// most recently modified first.
#[async_trait]
pub trait FieldService: Send + Sync {
    /// Look up a technician by its remote id.
    async fn technician_by_id(&self, id: &str) -> Result<Option<Technician>>;

    /// Find technicians whose name equals `name` exactly.
    async fn technicians_named(&self, name: &str, limit: usize) -> Result<Vec<Technician>>;

    /// Find technicians whose name contains `fragment`.
    async fn technicians_name_containing(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<Technician>>;

    /// Find users whose email equals `email` exactly.
    async fn users_with_email(&self, email: &str, limit: usize) -> Result<Vec<User>>;

    /// Find technician records linked to a user.
    async fn technicians_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<Technician>>;

    /// Fetch non-deleted skills ordered by label.
    async fn skills(&self, limit: usize) -> Result<Vec<Skill>>;

    /// Fetch the current skill assignments of a technician.
    async fn skill_links(&self, technician_id: &str) -> Result<Vec<SkillLink>>;

    /// Mark a technician as active.
    async fn activate_technician(&self, technician_id: &str) -> Result<()>;

    /// Delete a skill assignment by link id.
    async fn delete_skill_link(&self, link_id: &str) -> Result<()>;

    /// Create a skill assignment, returning the new link id when reported.
    async fn create_skill_link(&self, link: &NewSkillLink) -> Result<Option<String>>;
}
