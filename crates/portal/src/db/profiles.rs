//! Profile repository.

use tracing::instrument;

use eyeopener_core::UserId;

use super::RepositoryError;
use crate::models::Profile;
use crate::supabase::{RestQuery, SupabaseClient};

const TABLE: &str = "profiles";

/// Repository for `public.profiles`.
///
/// Visibility is left to the row policies: a client sees only their own
/// profile, an admin sees all of them.
pub struct ProfileRepository<'a> {
    client: &'a SupabaseClient,
    access_token: &'a str,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, access_token: &'a str) -> Self {
        Self {
            client,
            access_token,
        }
    }

    /// Get the profile of one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Supabase` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let query = RestQuery::new().select("*").eq("user_id", user_id);
        let rows: Vec<Profile> = self.client.select(self.access_token, TABLE, &query).await?;
        Ok(rows.into_iter().next())
    }

    /// All visible profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Supabase` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Profile>, RepositoryError> {
        let query = RestQuery::new().select("*").order_desc("created_at");
        Ok(self.client.select(self.access_token, TABLE, &query).await?)
    }

    /// Profiles for a set of users in one query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Supabase` if the query fails.
    #[instrument(skip_all)]
    pub async fn find_by_ids<I>(&self, ids: I) -> Result<Vec<Profile>, RepositoryError>
    where
        I: IntoIterator<Item = UserId> + Send,
        I::IntoIter: Send,
    {
        let ids: Vec<UserId> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = RestQuery::new()
            .select("user_id,email,full_name,role,created_at")
            .in_list("user_id", ids);
        Ok(self.client.select(self.access_token, TABLE, &query).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SupabaseConfig;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ME: &str = "6f1c1f8e-2f47-4c52-9a3b-4f2d2b8e9c10";

    #[tokio::test]
    async fn test_get_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("user_id", format!("eq.{ME}")))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"user_id": ME, "email": "travis@example.com", "full_name": "Travis", "role": "admin", "created_at": "2025-01-01T00:00:00Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&SupabaseConfig::new(&server.uri(), "anon-key").unwrap());
        let profile = ProfileRepository::new(&client, "user-token")
            .get(ME.parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(profile.is_admin());
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(&SupabaseConfig::new(&server.uri(), "anon-key").unwrap());
        let profiles = ProfileRepository::new(&client, "user-token")
            .find_by_ids(Vec::new())
            .await
            .unwrap();
        assert!(profiles.is_empty());
    }
}
