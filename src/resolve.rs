//! Technician identifier resolution.
//!
//! Operators refer to technicians by id, by name, or by the email of the
//! owning user. Each lookup must land on exactly one record; anything else is
//! reported with enough detail (candidate ids) to retry with an id.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    error::{Error, Result},
    model::Technician,
    remote::FieldService,
};

/// Maximum number of candidates fetched per lookup.
pub const SEARCH_LIMIT: usize = 10;

/// Key prefix of technician (`ServiceResource`) ids.
const TECHNICIAN_ID_PREFIX: &str = "0Hn";

/// True when `value` has the shape of a technician id.
pub fn looks_like_technician_id(value: &str) -> bool {
    value.starts_with(TECHNICIAN_ID_PREFIX)
        && matches!(value.len(), 15 | 18)
        && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Resolve any operator identifier: an email, an id or a name.
pub async fn resolve_identifier(remote: &dyn FieldService, identifier: &str) -> Result<Technician> {
    let identifier = identifier.trim();
    if identifier.contains('@') {
        return find_by_email(remote, identifier)
            .await?
            .ok_or_else(|| Error::NotFound {
                identifier: identifier.to_string(),
            });
    }
    resolve_technician(remote, identifier).await
}

/// Resolve an id or a name to exactly one technician.
pub async fn resolve_technician(remote: &dyn FieldService, identifier: &str) -> Result<Technician> {
    if looks_like_technician_id(identifier) {
        debug!(%identifier, "resolving by id");
        let technician = remote
            .technician_by_id(identifier)
            .await?
            .ok_or_else(|| Error::NotFound {
                identifier: identifier.to_string(),
            })?;
        return Ok(with_display_name(technician, identifier));
    }

    debug!(%identifier, "resolving by exact name");
    let exact = remote.technicians_named(identifier, SEARCH_LIMIT).await?;
    if !exact.is_empty() {
        return single(exact, identifier, "name");
    }

    debug!(%identifier, "no exact name match; trying partial match");
    let partial = remote
        .technicians_name_containing(identifier, SEARCH_LIMIT)
        .await?;
    if partial.is_empty() {
        return Err(Error::NotFound {
            identifier: identifier.to_string(),
        });
    }
    single(partial, identifier, "partial name")
}

/// Resolve the technician owned by the user with `email`.
///
/// Returns `Ok(None)` when no technician exists for the email.
pub async fn find_by_email(remote: &dyn FieldService, email: &str) -> Result<Option<Technician>> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(None);
    }

    let users = remote.users_with_email(email, SEARCH_LIMIT).await?;
    debug!(%email, users = users.len(), "resolved users by email");

    let mut candidates: BTreeMap<String, Technician> = BTreeMap::new();
    for user in users {
        if user.id.is_empty() {
            continue;
        }
        for technician in remote.technicians_for_user(&user.id, SEARCH_LIMIT).await? {
            if technician.id.is_empty() {
                continue;
            }
            let owner_email = user.email.clone().unwrap_or_else(|| email.to_string());
            let technician = Technician {
                email: Some(owner_email),
                ..with_display_name(technician, email)
            };
            candidates.insert(technician.id.clone(), technician);
        }
    }

    if candidates.len() > 1 {
        return Err(Error::Ambiguous {
            identifier: email.to_string(),
            kind: "email",
            candidates: candidates.into_keys().collect(),
        });
    }
    Ok(candidates.into_values().next())
}

/// Accept a single match or report every candidate.
fn single(
    mut matches: Vec<Technician>,
    identifier: &str,
    kind: &'static str,
) -> Result<Technician> {
    if matches.len() > 1 {
        return Err(Error::Ambiguous {
            identifier: identifier.to_string(),
            kind,
            candidates: matches.into_iter().map(|technician| technician.id).collect(),
        });
    }
    match matches.pop() {
        Some(technician) => Ok(with_display_name(technician, identifier)),
        None => Err(Error::NotFound {
            identifier: identifier.to_string(),
        }),
    }
}

/// Fall back to the identifier when the record has no name.
fn with_display_name(mut technician: Technician, identifier: &str) -> Technician {
    if technician.name.trim().is_empty() {
        technician.name = identifier.to_string();
    }
    technician
}
