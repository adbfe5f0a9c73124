use async_trait::async_trait;
use mongodb::bson::{doc, Bson};
use mongodb::Client;

use crate::error::BootstrapError;
use crate::provision::CreateUserRequest;

/// Administrative session against the target server. The only operation
/// the bootstrap needs is issuing one createUser command against one
/// named database.
#[async_trait]
pub trait AdminSession {
    async fn create_user(
        &self,
        database: &str,
        request: &CreateUserRequest,
    ) -> Result<(), BootstrapError>;
}

/// Driver-backed session over a shared `mongodb::Client`.
pub struct MongoSession {
    client: Client,
}

impl MongoSession {
    /// Build a session from a connection string (typically `MONGO_URL`).
    pub async fn connect(url: &str) -> Result<Self, BootstrapError> {
        let client = Client::with_uri_str(url)
            .await
            .map_err(|e| BootstrapError::InvalidConnectionString(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AdminSession for MongoSession {
    async fn create_user(
        &self,
        database: &str,
        request: &CreateUserRequest,
    ) -> Result<(), BootstrapError> {
        let roles: Vec<Bson> = request
            .roles
            .iter()
            .map(|grant| Bson::from(doc! { "role": grant.role.as_str(), "db": grant.db.as_str() }))
            .collect();
        // Shell `db.createUser({user, pwd, roles})` maps to this command form.
        let command = doc! {
            "createUser": request.user.as_str(),
            "pwd": request.pwd.as_str(),
            "roles": roles,
        };
        self.client
            .database(database)
            .run_command(command)
            .await
            .map_err(|e| BootstrapError::CreateUser {
                database: database.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
