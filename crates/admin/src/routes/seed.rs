//! Demo catalog seeding endpoint.

use axum::{Json, extract::State};
use tracing::instrument;

use fiesta_core::permissions::keys;

use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::seed::{self, SeedError, SeedFile, SeedReport};
use crate::state::AppState;

/// `POST /api/seed`
///
/// Writes the built-in demo catalog. Seed documents use fixed ids, so running
/// this against an already-seeded project fails on the first duplicate.
#[instrument(skip(state, staff))]
pub async fn run(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
) -> Result<Json<SeedReport>> {
    staff.require(keys::CATALOG_SEED)?;
    let file = SeedFile::demo().map_err(seed_error)?;
    let report = seed::apply(state.firestore(), &file)
        .await
        .map_err(seed_error)?;
    Ok(Json(report))
}

fn seed_error(error: SeedError) -> AppError {
    match error {
        SeedError::Parse(e) => AppError::Internal(format!("demo catalog is malformed: {e}")),
        SeedError::Invalid { entry, message } => {
            AppError::BadRequest(format!("invalid seed entry {entry}: {message}"))
        }
        SeedError::Firestore(e) => AppError::Firestore(e),
    }
}
