use serde::{Deserialize, Serialize};

use crate::config::{READ_WRITE_ROLE, TARGET_DATABASES};
use crate::error::BootstrapError;
use crate::session::AdminSession;

/// A permission level scoped to a single database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: String,
    pub db: String,
}

/// One createUser request in the shape the server expects:
/// `{user, pwd, roles: [{role, db}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub user: String,
    pub pwd: String,
    pub roles: Vec<RoleGrant>,
}

impl CreateUserRequest {
    fn read_write(user: &str, pwd: &str, database: &str) -> Self {
        Self {
            user: user.to_string(),
            pwd: pwd.to_string(),
            roles: vec![RoleGrant {
                role: READ_WRITE_ROLE.to_string(),
                db: database.to_string(),
            }],
        }
    }

    /// Copy with the password masked, for display output.
    pub fn redacted(&self) -> Self {
        Self {
            pwd: "********".to_string(),
            ..self.clone()
        }
    }

    /// Database this request is issued against (same database the single
    /// role grant is scoped to).
    pub fn database(&self) -> &str {
        &self.roles[0].db
    }
}

/// Build the ordered request sequence: one readWrite user per target
/// database, all carrying the same credential pair. Empty credentials are
/// passed through unchanged.
pub fn plan_users(username: &str, password: &str) -> Vec<CreateUserRequest> {
    TARGET_DATABASES
        .iter()
        .map(|db| CreateUserRequest::read_write(username, password, db))
        .collect()
}

/// Issue the planned requests one after another. The first failure halts
/// the run; already-created users are not rolled back and the remaining
/// databases are not attempted.
pub async fn provision<S: AdminSession>(
    session: &S,
    username: &str,
    password: &str,
) -> Result<(), BootstrapError> {
    for request in plan_users(username, password) {
        let database = request.database().to_string();
        tracing::info!(%database, user = %request.user, "Creating readWrite user");
        session.create_user(&database, &request).await?;
    }
    Ok(())
}
