//! Acting actor extraction
//!
//! Authentication happens upstream; the gateway forwards the resolved profile
//! in the `x-actor-role` and `x-actor-id` headers.

use super::error::Problem;
use crate::contract::{ActorRef, RoleKind};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// The profile on whose behalf the request is made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingActor(pub ActorRef);

impl ActingActor {
    /// The acting student's id, or 403 for staff actors
    pub fn student_id(&self, action: &str) -> Result<i64, Problem> {
        match self.0.role {
            RoleKind::Student => Ok(self.0.actor_id),
            role => Err(Problem::new(StatusCode::FORBIDDEN, "Forbidden")
                .with_detail(format!("only students can {}, acting role is {}", action, role))),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ActingActor {
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized")
                        .with_detail(format!("missing {} header", name))
                })
        };

        let role_value = header(ACTOR_ROLE_HEADER)?;
        let role = RoleKind::parse(&role_value.to_ascii_lowercase()).ok_or_else(|| {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Actor")
                .with_detail(format!("unknown actor role '{}'", role_value))
        })?;

        let id_value = header(ACTOR_ID_HEADER)?;
        let actor_id = id_value.parse::<i64>().map_err(|_| {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Actor")
                .with_detail(format!("actor id '{}' is not a number", id_value))
        })?;

        Ok(Self(ActorRef::new(role, actor_id)))
    }
}
