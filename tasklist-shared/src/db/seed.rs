/// Demo data for local runs
///
/// Inserts four users (one administrator) and seven tasks, but only into an
/// empty user table, so restarting a seeded instance is harmless.
///
/// | Email                     | Password            | Authority |
/// |---------------------------|---------------------|-----------|
/// | `armando@email.com`       | `password123`       | USER      |
/// | `amelia@email.com`        | `longerPassword544` | USER      |
/// | `josecardamomo@email.com` | `joseKpo777`        | USER      |
/// | `jhex@email.com`          | `admin123`          | ADMIN     |

use tracing::info;

use crate::auth::password::CredentialHasher;
use crate::error::ServiceResult;
use crate::models::task::{CreateTask, TaskStatus};
use crate::models::user::{Authority, CreateUser};
use crate::repository::{TaskRepository, UserRepository};

const USERS: [(&str, &str, &str, Authority); 4] = [
    ("armando@email.com", "password123", "ArmandoParedes", Authority::User),
    ("amelia@email.com", "longerPassword544", "amelia_1990", Authority::User),
    ("josecardamomo@email.com", "joseKpo777", "JoseCapo777", Authority::User),
    ("jhex@email.com", "admin123", "JheX", Authority::Admin),
];

/// (owner index into `USERS`, title, description, status)
const TASKS: [(usize, &str, &str, TaskStatus); 7] = [
    (0, "Title of this task", "Description for this task", TaskStatus::Pending),
    (1, "Do the dishes", "", TaskStatus::InProgress),
    (1, "Do the laundry", "Do the landry with John's clothes", TaskStatus::Pending),
    (1, "Do my bed", "", TaskStatus::Completed),
    (2, "Go to the gim", "At 17:30", TaskStatus::Pending),
    (2, "Send Armando the new documents", "Due to 8/1 until 10:00", TaskStatus::Completed),
    (2, "Daily meet of MindHub", "On weekdays usually at 9:10", TaskStatus::InProgress),
];

/// Summary of a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub tasks: usize,
}

/// Seeds the demo users and tasks if no user exists yet
///
/// Returns an empty report when the store already holds users.
pub async fn seed_demo_data(
    users: &dyn UserRepository,
    tasks: &dyn TaskRepository,
    hasher: &dyn CredentialHasher,
) -> ServiceResult<SeedReport> {
    if !users.find_all().await?.is_empty() {
        info!("Users already present, skipping demo data");
        return Ok(SeedReport::default());
    }

    info!("Populating users...");
    let mut owners = Vec::with_capacity(USERS.len());
    for (email, password, username, authority) in USERS {
        let user = users
            .insert(CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hasher.hash(password)?,
                authority,
            })
            .await?;
        owners.push(user.id);
    }

    info!("Populating tasks...");
    for (owner, title, description, task_status) in TASKS {
        tasks
            .insert(CreateTask {
                owner_id: owners[owner],
                title: title.to_string(),
                description: description.to_string(),
                task_status,
            })
            .await?;
    }

    let report = SeedReport {
        users: USERS.len(),
        tasks: TASKS.len(),
    };
    info!(users = report.users, tasks = report.tasks, "Demo data seeded");
    Ok(report)
}
