//! Staff authentication extractor.
//!
//! Route handlers take `RequireStaff` and then call
//! [`crate::models::CurrentStaff::require`] with the permission key the
//! operation needs; authentication and authorization stay separate steps.
//!
//! The session stores only the staff id. The extractor reloads the staff and
//! role documents on every request, so there is no cached permission set to
//! go stale between sign-in and sign-out.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use fiesta_core::types::StaffId;

use crate::error::AppError;
use crate::firestore::FirestoreError;
use crate::models::{CurrentStaff, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in, active staff member.
///
/// # Example
///
/// ```rust,ignore
/// async fn create_product(
///     RequireStaff(staff): RequireStaff,
/// ) -> Result<impl IntoResponse> {
///     staff.require(keys::CATALOG_WRITE)?;
///     // ...
/// }
/// ```
pub struct RequireStaff(pub CurrentStaff);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Session is placed in extensions by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(unauthorized)?;

        let id: StaffId = session
            .get(session_keys::STAFF_ID)
            .await
            .ok()
            .flatten()
            .ok_or_else(unauthorized)?;

        // A deleted staff document ends the session like a deactivation does.
        let member = match state.firestore().get_staff(&id).await {
            Ok(member) => member,
            Err(FirestoreError::NotFound(_)) => return Err(unauthorized()),
            Err(err) => return Err(err.into()),
        };
        let role = match &member.role_id {
            Some(role_id) => state.firestore().get_role(role_id).await.ok(),
            None => None,
        };

        let staff = CurrentStaff::resolve(member, role.as_ref()).ok_or_else(unauthorized)?;
        Ok(Self(staff))
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("staff sign in required".to_string())
}

/// Helper to record the signed-in staff member in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_staff_session(
    session: &Session,
    id: &StaffId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::STAFF_ID, id).await
}

/// Helper to clear the signed-in staff member from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_staff_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<StaffId>(session_keys::STAFF_ID).await?;
    Ok(())
}
