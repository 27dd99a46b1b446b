//! Actor Directory - resolves keys, accounts and creator references to role profiles
//!
//! Role resolution goes through a dispatch table keyed by [`RoleKind`]: each
//! entry pairs the repository holding that role's profiles with the function
//! that renders its summary.

use super::repository::{AccountRepository, ProfileRepository};
use crate::contract::{
    Account, Actor, ActorDetails, ActorRef, ActorSummary, EntityId, RoleKind, TrainingPointsError,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Renders a profile of its own role; `None` for any other role
type Presenter = fn(&Actor) -> Option<ActorSummary>;

struct RoleEntry {
    profiles: Arc<dyn ProfileRepository>,
    present: Presenter,
}

pub struct ActorDirectory {
    roles: BTreeMap<RoleKind, RoleEntry>,
    accounts: Arc<dyn AccountRepository>,
}

impl ActorDirectory {
    /// Build the directory from one profile repository per role kind
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        profiles: Vec<Arc<dyn ProfileRepository>>,
    ) -> Self {
        let roles = profiles
            .into_iter()
            .map(|repo| {
                let kind = repo.role_kind();
                (
                    kind,
                    RoleEntry {
                        profiles: repo,
                        present: presenter_for(kind),
                    },
                )
            })
            .collect();
        Self { roles, accounts }
    }

    fn entry(&self, kind: RoleKind) -> Result<&RoleEntry, TrainingPointsError> {
        self.roles.get(&kind).ok_or_else(|| {
            tracing::error!(role = %kind, "no profile repository registered for role");
            TrainingPointsError::Internal
        })
    }

    /// Find the profile owning `key`, trying role kinds in [`RoleKind::ALL`] order
    pub async fn resolve_by_key(&self, key: &str) -> Result<Actor, TrainingPointsError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(TrainingPointsError::validation("key cannot be empty"));
        }

        for kind in RoleKind::ALL {
            let Some(entry) = self.roles.get(&kind) else {
                continue;
            };
            if let Some(actor) = entry
                .profiles
                .find_by_code(key)
                .await
                .map_err(TrainingPointsError::internal)?
            {
                return Ok(actor);
            }
        }

        Err(TrainingPointsError::not_found("profile", key))
    }

    /// Load the concrete actor behind a polymorphic reference
    pub async fn resolve_reference(&self, reference: ActorRef) -> Result<Actor, TrainingPointsError> {
        self.entry(reference.role)?
            .profiles
            .find_by_id(reference.actor_id)
            .await
            .map_err(TrainingPointsError::internal)?
            .ok_or_else(|| {
                TrainingPointsError::not_found(reference.role.as_str(), reference.actor_id)
            })
    }

    /// Resolve a creator reference and render the summary for its role
    pub async fn resolve_by_creator_reference(
        &self,
        reference: ActorRef,
    ) -> Result<ActorSummary, TrainingPointsError> {
        let actor = self.resolve_reference(reference).await?;
        self.present(reference.role, &actor)
    }

    /// Render the role-appropriate summary of an already loaded actor
    pub fn summarize(&self, actor: &Actor) -> Result<ActorSummary, TrainingPointsError> {
        self.present(actor.role_kind(), actor)
    }

    fn present(&self, kind: RoleKind, actor: &Actor) -> Result<ActorSummary, TrainingPointsError> {
        (self.entry(kind)?.present)(actor).ok_or_else(|| {
            tracing::error!(
                expected = %kind,
                found = %actor.role_kind(),
                actor_id = actor.id(),
                "profile repository returned a profile of another role"
            );
            TrainingPointsError::Internal
        })
    }

    pub async fn find_account(&self, account_id: EntityId) -> Result<Account, TrainingPointsError> {
        self.accounts
            .find(account_id)
            .await
            .map_err(TrainingPointsError::internal)?
            .ok_or_else(|| TrainingPointsError::not_found("account", account_id))
    }

    /// Role kind an account is bound to; `None` before binding
    pub async fn role_kind_of(&self, account_id: EntityId) -> Result<Option<RoleKind>, TrainingPointsError> {
        Ok(self.find_account(account_id).await?.role)
    }

    /// The single profile bound to an account, if any
    pub async fn profile_for(&self, account_id: EntityId) -> Result<Option<Actor>, TrainingPointsError> {
        let Some(kind) = self.role_kind_of(account_id).await? else {
            return Ok(None);
        };
        self.entry(kind)?
            .profiles
            .find_by_account(account_id)
            .await
            .map_err(TrainingPointsError::internal)
    }

    /// Create an account for the profile owning `key` and bind the two
    pub async fn provision_account(&self, email: &str, key: &str) -> Result<Account, TrainingPointsError> {
        let actor = self.resolve_by_key(key).await?;
        if actor.account_id().is_some() {
            return Err(TrainingPointsError::AlreadyBound {
                key: key.to_string(),
            });
        }

        // A concurrent provisioning may bind the profile between the read above
        // and this write; the repository's conditional link catches it.
        let account = self
            .accounts
            .provision(email.trim(), actor.reference())
            .await
            .map_err(TrainingPointsError::internal)?
            .ok_or_else(|| TrainingPointsError::AlreadyBound {
                key: key.to_string(),
            })?;

        tracing::info!(
            account_id = account.id,
            role = %actor.role_kind(),
            profile_id = actor.id(),
            "account bound to profile"
        );
        Ok(account)
    }
}

fn presenter_for(kind: RoleKind) -> Presenter {
    match kind {
        RoleKind::Student => present_student,
        RoleKind::Specialist => present_specialist,
        RoleKind::Assistant | RoleKind::Administrator => present_officer,
    }
}

fn base_summary(actor: &Actor, details: ActorDetails) -> ActorSummary {
    let info = actor.info();
    ActorSummary {
        role: actor.role_kind(),
        id: actor.id(),
        code: actor.code().to_string(),
        full_name: info.full_name(),
        faculty_id: info.faculty_id,
        details,
    }
}

fn present_student(actor: &Actor) -> Option<ActorSummary> {
    let Actor::Student(s) = actor else {
        return None;
    };
    let details = ActorDetails::Student {
        major: s.major.clone(),
        class_name: s.class_name.clone(),
        academic_year: s.academic_year.clone(),
    };
    Some(base_summary(actor, details))
}

fn present_specialist(actor: &Actor) -> Option<ActorSummary> {
    let Actor::Specialist(o) = actor else {
        return None;
    };
    let details = ActorDetails::Specialist {
        job_title: o.job_title.clone(),
        academic_degree: o.academic_degree.clone(),
    };
    Some(base_summary(actor, details))
}

fn present_officer(actor: &Actor) -> Option<ActorSummary> {
    match actor {
        Actor::Assistant(_) | Actor::Administrator(_) => {
            Some(base_summary(actor, ActorDetails::Officer))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Officer, PersonalInfo};

    fn officer(id: EntityId) -> Officer {
        Officer {
            id,
            code: format!("TL{:03}", id),
            info: PersonalInfo {
                first_name: "Minh".to_string(),
                last_name: "Pham".to_string(),
                ..Default::default()
            },
            job_title: Some("Coordinator".to_string()),
            academic_degree: None,
            account_id: None,
        }
    }

    #[test]
    fn presenters_reject_other_roles() {
        let assistant = Actor::Assistant(officer(1));
        assert!(present_student(&assistant).is_none());
        assert!(present_specialist(&assistant).is_none());

        let summary = present_officer(&assistant).expect("assistant summary");
        assert_eq!(summary.role, RoleKind::Assistant);
        assert_eq!(summary.details, ActorDetails::Officer);

        let specialist = Actor::Specialist(officer(2));
        assert!(present_officer(&specialist).is_none());
        assert_eq!(
            present_specialist(&specialist).expect("specialist summary").details,
            ActorDetails::Specialist {
                job_title: Some("Coordinator".to_string()),
                academic_degree: None,
            }
        );
    }
}
