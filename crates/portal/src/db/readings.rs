//! Reading repository.
//!
//! Every method is one PostgREST round trip, except [`ReadingRepository::list_all`]
//! which takes two: the readings, then their owners' profiles in a single
//! `in.(...)` query, joined in memory.

use std::collections::{BTreeSet, HashMap};

use tracing::instrument;

use eyeopener_core::{ReadingId, UserId};

use super::profiles::ProfileRepository;
use super::{Principal, RepositoryError};
use crate::models::{NewReading, Reading, ReadingUpdate, ReadingWithOwner};
use crate::supabase::{NewReadingRow, ReadingPatch, RestQuery, SupabaseClient};

const TABLE: &str = "readings";

/// Repository for readings, scoped to one principal.
pub struct ReadingRepository<'a> {
    client: &'a SupabaseClient,
    principal: &'a Principal,
}

impl<'a> ReadingRepository<'a> {
    /// Create a new reading repository.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, principal: &'a Principal) -> Self {
        Self { client, principal }
    }

    /// Readings owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Forbidden` when a regular client asks for
    /// someone else's readings, or `RepositoryError::Supabase` if the query fails.
    #[instrument(skip(self), fields(principal = %self.principal.user_id))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Reading>, RepositoryError> {
        if !self.principal.can_read(user_id) {
            return Err(RepositoryError::Forbidden);
        }

        let query = RestQuery::new()
            .select("*")
            .eq("user_id", user_id)
            .order_desc("created_at");
        Ok(self
            .client
            .select(&self.principal.access_token, TABLE, &query)
            .await?)
    }

    /// Every reading with its owner's name and email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Forbidden` for non-admins, or
    /// `RepositoryError::Supabase` if either query fails.
    #[instrument(skip(self), fields(principal = %self.principal.user_id))]
    pub async fn list_all(&self) -> Result<Vec<ReadingWithOwner>, RepositoryError> {
        self.principal.require_admin()?;

        let query = RestQuery::new().select("*").order_desc("created_at");
        let readings: Vec<Reading> = self
            .client
            .select(&self.principal.access_token, TABLE, &query)
            .await?;

        if readings.is_empty() {
            return Ok(Vec::new());
        }

        let owner_ids: BTreeSet<UserId> = readings.iter().map(|r| r.user_id).collect();
        let owners: HashMap<UserId, _> =
            ProfileRepository::new(self.client, &self.principal.access_token)
                .find_by_ids(owner_ids)
                .await?
                .into_iter()
                .map(|p| (p.user_id, p))
                .collect();

        Ok(readings
            .into_iter()
            .map(|reading| {
                let owner = owners.get(&reading.user_id);
                ReadingWithOwner {
                    owner_name: owner.and_then(|p| p.full_name.clone()),
                    owner_email: owner.and_then(|p| p.email.clone()),
                    reading,
                }
            })
            .collect())
    }

    /// A single reading, if it exists and is visible to the principal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Supabase` if the query fails.
    #[instrument(skip(self), fields(principal = %self.principal.user_id))]
    pub async fn get(&self, id: ReadingId) -> Result<Option<Reading>, RepositoryError> {
        let mut query = RestQuery::new().select("*").eq("id", id);
        if !self.principal.is_admin {
            query = query.eq("user_id", self.principal.user_id);
        }

        let rows: Vec<Reading> = self
            .client
            .select(&self.principal.access_token, TABLE, &query)
            .await?;
        Ok(rows
            .into_iter()
            .find(|r| self.principal.can_read(r.user_id)))
    }

    /// Create a reading for a client.
    ///
    /// Encoded content is parsed before anything is sent, so malformed JSON
    /// never results in a write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Forbidden` for non-admins,
    /// `RepositoryError::InvalidContent` for unparseable content, or
    /// `RepositoryError::Supabase` if the insert fails.
    #[instrument(skip(self, new), fields(principal = %self.principal.user_id, owner = %new.user_id))]
    pub async fn create(&self, new: NewReading) -> Result<Reading, RepositoryError> {
        self.principal.require_admin()?;

        let body = NewReadingRow {
            user_id: new.user_id,
            reading_type: new.reading_type,
            title: new.title,
            content: new.content.into_document()?,
        };

        let rows: Vec<Reading> = self
            .client
            .insert(&self.principal.access_token, TABLE, &body)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::DataCorruption("insert returned no row".to_string()))
    }

    /// Update a reading's title, type and/or content. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Forbidden` for non-admins,
    /// `RepositoryError::InvalidContent` for unparseable content,
    /// `RepositoryError::NotFound` if no reading has this id, or
    /// `RepositoryError::Supabase` if the update fails.
    #[instrument(skip(self, update), fields(principal = %self.principal.user_id))]
    pub async fn update(
        &self,
        id: ReadingId,
        update: ReadingUpdate,
    ) -> Result<Reading, RepositoryError> {
        self.principal.require_admin()?;

        let patch = ReadingPatch {
            title: update.title,
            reading_type: update.reading_type,
            content: update.content.map(|c| c.into_document()).transpose()?,
        };

        if patch.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        let rows: Vec<Reading> = self
            .client
            .update(
                &self.principal.access_token,
                TABLE,
                &RestQuery::new().eq("id", id),
                &patch,
            )
            .await?;
        rows.into_iter().next().ok_or(RepositoryError::NotFound)
    }

    /// Delete a reading. Nothing else is removed with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Forbidden` for non-admins,
    /// `RepositoryError::NotFound` if no reading has this id, or
    /// `RepositoryError::Supabase` if the delete fails.
    #[instrument(skip(self), fields(principal = %self.principal.user_id))]
    pub async fn delete(&self, id: ReadingId) -> Result<(), RepositoryError> {
        self.principal.require_admin()?;

        let rows: Vec<Reading> = self
            .client
            .delete(
                &self.principal.access_token,
                TABLE,
                &RestQuery::new().eq("id", id),
            )
            .await?;
        if rows.is_empty() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SupabaseConfig;
    use eyeopener_core::{ContentInput, ReadingType};
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ME: &str = "6f1c1f8e-2f47-4c52-9a3b-4f2d2b8e9c10";
    const OTHER: &str = "9a3b4f2d-2b8e-4c52-9c10-6f1c1f8e2f47";
    const READING: &str = "0b7e7c38-6f8d-4c1e-9c53-3e1f1a2b3c4d";

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig::new(&server.uri(), "anon-key").unwrap())
    }

    fn principal(is_admin: bool) -> Principal {
        Principal {
            user_id: ME.parse().unwrap(),
            is_admin,
            access_token: "user-token".to_string(),
        }
    }

    fn reading_json(owner: &str, title: &str) -> Value {
        json!({
            "id": READING,
            "user_id": owner,
            "reading_type": "tarot",
            "title": title,
            "content": {"card": "The Star"},
            "created_at": "2025-01-05T10:00:00+00:00"
        })
    }

    #[tokio::test]
    async fn test_list_for_user_empty_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/readings"))
            .and(query_param("user_id", format!("eq.{ME}")))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let principal = principal(false);
        let readings = ReadingRepository::new(&client, &principal)
            .list_for_user(ME.parse().unwrap())
            .await
            .unwrap();
        assert!(readings.is_empty());
    }

    #[tokio::test]
    async fn test_client_cannot_list_other_users() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let principal = principal(false);
        let repo = ReadingRepository::new(&client, &principal);
        assert!(matches!(
            repo.list_for_user(OTHER.parse().unwrap()).await,
            Err(RepositoryError::Forbidden)
        ));
        assert!(matches!(repo.list_all().await, Err(RepositoryError::Forbidden)));
        assert!(matches!(
            repo.delete(READING.parse().unwrap()).await,
            Err(RepositoryError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_list_all_joins_owners_in_two_queries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/readings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                reading_json(ME, "Mine"),
                reading_json(OTHER, "Theirs"),
                reading_json(ME, "Mine again"),
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("user_id", format!("in.({ME},{OTHER})")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"user_id": ME, "email": "me@example.com", "full_name": "Me", "role": "admin", "created_at": "2025-01-01T00:00:00Z"},
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let principal = principal(true);
        let rows = ReadingRepository::new(&client, &principal)
            .list_all()
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].owner_label(), "Me");
        assert_eq!(rows[1].owner_label(), "Unknown");
    }

    #[tokio::test]
    async fn test_create_parses_encoded_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/readings"))
            .and(body_json(json!({
                "user_id": OTHER,
                "reading_type": "tarot",
                "title": "Celtic Cross",
                "content": {"a": 1}
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!([reading_json(OTHER, "Celtic Cross")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let principal = principal(true);
        let reading = ReadingRepository::new(&client, &principal)
            .create(NewReading {
                user_id: OTHER.parse().unwrap(),
                reading_type: ReadingType::Tarot,
                title: "Celtic Cross".to_string(),
                content: ContentInput::Encoded(r#"{"a":1}"#.to_string()),
            })
            .await
            .unwrap();
        assert_eq!(reading.title, "Celtic Cross");
    }

    #[tokio::test]
    async fn test_create_with_malformed_content_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let principal = principal(true);
        let err = ReadingRepository::new(&client, &principal)
            .create(NewReading {
                user_id: OTHER.parse().unwrap(),
                reading_type: ReadingType::Tarot,
                title: "Broken".to_string(),
                content: ContentInput::Encoded("{a:}".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidContent(_)));
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/readings"))
            .and(query_param("id", format!("eq.{READING}")))
            .and(body_json(json!({"title": "Renamed"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([reading_json(OTHER, "Renamed")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let principal = principal(true);
        let reading = ReadingRepository::new(&client, &principal)
            .update(
                READING.parse().unwrap(),
                ReadingUpdate {
                    title: Some("Renamed".to_string()),
                    ..ReadingUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(reading.title, "Renamed");
        assert_eq!(reading.reading_type, ReadingType::Tarot);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/readings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client(&server);
        let principal = principal(true);
        let err = ReadingRepository::new(&client, &principal)
            .delete(READING.parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_client_get_is_scoped_to_owner() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/readings"))
            .and(query_param("id", format!("eq.{READING}")))
            .and(query_param("user_id", format!("eq.{ME}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let principal = principal(false);
        let reading = ReadingRepository::new(&client, &principal)
            .get(READING.parse().unwrap())
            .await
            .unwrap();
        assert!(reading.is_none());
    }
}
