//! Create staff accounts.

use tracing::info;

use fiesta_admin::config::AdminConfig;
use fiesta_admin::firestore::FirestoreClient;
use fiesta_core::firestore::convert::StaffDraft;
use fiesta_core::types::{Email, RoleId};

/// Create a staff member document.
///
/// The member still needs a Firebase Auth account with the same email to sign
/// in; this only writes the `staff` document that grants dashboard access.
///
/// # Errors
///
/// Returns an error if the email is invalid, a staff member with the email
/// already exists, or the write fails.
pub async fn create(
    email: &str,
    name: &str,
    role: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AdminConfig::from_env()?;
    let client = FirestoreClient::new(&config.firebase);

    let email = Email::parse(email)?;
    if client.find_staff_by_email(email.as_str()).await?.is_some() {
        return Err(format!("staff member with email {email} already exists").into());
    }

    let draft = StaffDraft {
        name: name.to_string(),
        email,
        role_id: role.map(RoleId::new),
        permissions: vec![],
        active: true,
    };
    let member = client.create_staff(&draft, None).await?;

    info!(id = %member.id, email = %member.email, "Staff member created");
    if let Some(role_id) = &member.role_id {
        info!(role = %role_id, "Role assigned");
    }

    Ok(())
}
