//! Test utilities for exercising the reconciler without a remote org.
//!
//! This module provides [`FakeFieldService`], an in-memory [`FieldService`]
//! with a fluent builder for seeding technicians, users, skills and links,
//! hooks for injecting failures, and a log of the mutations it received.

#![allow(dead_code)]

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    model::{NewSkillLink, Skill, SkillLink, Technician, User},
    remote::FieldService,
};

/// A user and the technicians it owns.
struct FakeUser {
    /// The user record.
    user: User,
    /// Ids of technicians owned by the user.
    technician_ids: Vec<String>,
}

/// Mutable state behind the fake.
#[derive(Default)]
struct State {
    /// Technicians in insertion order.
    technicians: Vec<Technician>,
    /// Users in insertion order.
    users: Vec<FakeUser>,
    /// Skills in insertion order.
    skills: Vec<Skill>,
    /// Current links keyed by technician id.
    links: HashMap<String, Vec<SkillLink>>,
    /// Counter for generated link ids.
    next_link: usize,
    /// Technicians activated through the service.
    activated: Vec<String>,
    /// Link ids deleted through the service.
    deleted: Vec<String>,
    /// Links created through the service.
    created: Vec<NewSkillLink>,
}

/// In-memory [`FieldService`] for tests.
#[derive(Default)]
pub struct FakeFieldService {
    /// Seeded and mutated records.
    state: Mutex<State>,
    /// Link ids whose deletion fails.
    failing_deletes: BTreeSet<String>,
    /// Skill ids whose assignment fails.
    failing_creates: BTreeSet<String>,
    /// Technician ids whose link listing fails.
    failing_link_fetches: BTreeSet<String>,
    /// Whether activation requests fail.
    failing_activation: bool,
    /// Whether created links are reported without an id.
    anonymous_creates: bool,
}

impl FakeFieldService {
    /// Create an empty fake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a technician.
    pub fn with_technician(self, id: &str, name: &str, is_active: bool) -> Self {
        self.state().technicians.push(Technician {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            is_active,
        });
        self
    }

    /// Seed a user owning the given technicians.
    pub fn with_user(self, id: &str, email: &str, technician_ids: &[&str]) -> Self {
        self.state().users.push(FakeUser {
            user: User {
                id: id.to_string(),
                name: format!("User {id}"),
                email: Some(email.to_string()),
            },
            technician_ids: technician_ids.iter().map(|id| (*id).to_string()).collect(),
        });
        self
    }

    /// Seed a skill definition.
    pub fn with_skill(self, id: &str, label: &str) -> Self {
        self.state().skills.push(Skill {
            id: id.to_string(),
            label: label.to_string(),
        });
        self
    }

    /// Seed an existing assignment.
    pub fn with_link(
        self,
        technician_id: &str,
        link_id: &str,
        skill_id: &str,
        label: &str,
    ) -> Self {
        self.state()
            .links
            .entry(technician_id.to_string())
            .or_default()
            .push(SkillLink {
                link_id: link_id.to_string(),
                skill_id: skill_id.to_string(),
                label: label.to_string(),
            });
        self
    }

    /// Make deleting this link fail.
    pub fn failing_delete(mut self, link_id: &str) -> Self {
        self.failing_deletes.insert(link_id.to_string());
        self
    }

    /// Make assigning this skill fail.
    pub fn failing_create(mut self, skill_id: &str) -> Self {
        self.failing_creates.insert(skill_id.to_string());
        self
    }

    /// Make listing this technician's links fail.
    pub fn failing_link_fetch(mut self, technician_id: &str) -> Self {
        self.failing_link_fetches.insert(technician_id.to_string());
        self
    }

    /// Make every activation request fail.
    pub fn failing_activation(mut self) -> Self {
        self.failing_activation = true;
        self
    }

    /// Report created links without an id.
    pub fn anonymous_creates(mut self) -> Self {
        self.anonymous_creates = true;
        self
    }

    /// Technicians activated so far.
    pub fn activated(&self) -> Vec<String> {
        self.state().activated.clone()
    }

    /// Link ids deleted so far.
    pub fn deleted(&self) -> Vec<String> {
        self.state().deleted.clone()
    }

    /// Links created so far.
    pub fn created(&self) -> Vec<NewSkillLink> {
        self.state().created.clone()
    }

    /// Skill ids a technician currently holds.
    pub fn held_skills(&self, technician_id: &str) -> BTreeSet<String> {
        self.state()
            .links
            .get(technician_id)
            .map(|links| links.iter().map(|link| link.skill_id.clone()).collect())
            .unwrap_or_default()
    }

    /// True when no mutation has been sent.
    pub fn untouched(&self) -> bool {
        let state = self.state();
        state.activated.is_empty() && state.deleted.is_empty() && state.created.is_empty()
    }

    /// Lock the state.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake state lock")
    }

    /// Technicians matching a predicate, capped at `limit`.
    fn technicians_where(
        &self,
        limit: usize,
        keep: impl Fn(&Technician) -> bool,
    ) -> Vec<Technician> {
        self.state()
            .technicians
            .iter()
            .filter(|technician| keep(technician))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Error returned by injected failures.
fn injected(message: &str) -> Error {
    Error::Api {
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait]
impl FieldService for FakeFieldService {
    async fn technician_by_id(&self, id: &str) -> Result<Option<Technician>> {
        Ok(self.technicians_where(1, |technician| technician.id == id).pop())
    }

    async fn technicians_named(&self, name: &str, limit: usize) -> Result<Vec<Technician>> {
        Ok(self.technicians_where(limit, |technician| technician.name == name))
    }

    async fn technicians_name_containing(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<Technician>> {
        Ok(self.technicians_where(limit, |technician| technician.name.contains(fragment)))
    }

    async fn users_with_email(&self, email: &str, limit: usize) -> Result<Vec<User>> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|entry| entry.user.email.as_deref() == Some(email))
            .take(limit)
            .map(|entry| entry.user.clone())
            .collect())
    }

    async fn technicians_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<Technician>> {
        let owned = self
            .state()
            .users
            .iter()
            .filter(|entry| entry.user.id == user_id)
            .flat_map(|entry| entry.technician_ids.clone())
            .collect::<Vec<_>>();
        Ok(self.technicians_where(limit, |technician| owned.contains(&technician.id)))
    }

    async fn skills(&self, limit: usize) -> Result<Vec<Skill>> {
        Ok(self.state().skills.iter().take(limit).cloned().collect())
    }

    async fn skill_links(&self, technician_id: &str) -> Result<Vec<SkillLink>> {
        if self.failing_link_fetches.contains(technician_id) {
            return Err(injected("link listing failed"));
        }
        Ok(self
            .state()
            .links
            .get(technician_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn activate_technician(&self, technician_id: &str) -> Result<()> {
        if self.failing_activation {
            return Err(injected("activation refused"));
        }
        let mut state = self.state();
        state.activated.push(technician_id.to_string());
        for technician in &mut state.technicians {
            if technician.id == technician_id {
                technician.is_active = true;
            }
        }
        Ok(())
    }

    async fn delete_skill_link(&self, link_id: &str) -> Result<()> {
        if self.failing_deletes.contains(link_id) {
            return Err(injected("delete refused"));
        }
        let mut state = self.state();
        for links in state.links.values_mut() {
            links.retain(|link| link.link_id != link_id);
        }
        state.deleted.push(link_id.to_string());
        Ok(())
    }

    async fn create_skill_link(&self, link: &NewSkillLink) -> Result<Option<String>> {
        if self.failing_creates.contains(&link.skill_id) {
            return Err(injected("duplicate value found"));
        }
        let mut state = self.state();
        state.next_link += 1;
        let link_id = format!("0Ho{:015}", state.next_link);
        let label = state
            .skills
            .iter()
            .find(|skill| skill.id == link.skill_id)
            .map(|skill| skill.label.clone())
            .unwrap_or_default();
        state
            .links
            .entry(link.technician_id.clone())
            .or_default()
            .push(SkillLink {
                link_id: link_id.clone(),
                skill_id: link.skill_id.clone(),
                label,
            });
        state.created.push(link.clone());
        if self.anonymous_creates {
            return Ok(None);
        }
        Ok(Some(link_id))
    }
}
