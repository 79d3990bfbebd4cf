//! Seed catalog data into Firestore.

use tracing::info;

use fiesta_admin::config::AdminConfig;
use fiesta_admin::firestore::FirestoreClient;
use fiesta_admin::seed::{self, SeedFile};

/// Seed from a YAML file, or the built-in demo catalog when `file` is `None`.
///
/// # Errors
///
/// Returns an error if configuration, parsing, or any write fails. Seed ids
/// are fixed, so re-running against seeded data fails on the first duplicate.
pub async fn run(file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AdminConfig::from_env()?;
    let client = FirestoreClient::new(&config.firebase);

    let seed_file = match file {
        Some(path) => {
            info!(path, "Loading seed file");
            let content = tokio::fs::read_to_string(path).await?;
            SeedFile::parse(&content)?
        }
        None => {
            info!("Using built-in demo catalog");
            SeedFile::demo()?
        }
    };

    let report = seed::apply(&client, &seed_file).await?;

    info!("Seeding complete!");
    info!("  Categories: {}", report.categories);
    info!("  Products: {}", report.products);
    info!("  Roles: {}", report.roles);
    info!("  Staff: {}", report.staff);

    Ok(())
}
