//! PostgREST endpoints (`/rest/v1/{table}`).

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::{SupabaseClient, SupabaseError};

/// Query-string builder for PostgREST filters.
///
/// ```
/// use eyeopener_portal::supabase::RestQuery;
///
/// let query = RestQuery::new()
///     .select("*")
///     .eq("user_id", "42")
///     .order_desc("created_at");
/// assert_eq!(
///     query.pairs(),
///     [("select", "*"), ("user_id", "eq.42"), ("order", "created_at.desc")]
///         .map(|(k, v)| (k.to_string(), v.to_string()))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestQuery {
    pairs: Vec<(String, String)>,
}

impl RestQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.pairs.push(("select".to_string(), columns.to_string()));
        self
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.pairs.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// `column IN (values...)`.
    #[must_use]
    pub fn in_list<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: std::fmt::Display,
    {
        let list = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.pairs.push((column.to_string(), format!("in.({list})")));
        self
    }

    /// Newest first by `column`.
    #[must_use]
    pub fn order_desc(mut self, column: &str) -> Self {
        self.pairs.push(("order".to_string(), format!("{column}.desc")));
        self
    }

    /// The raw key/value pairs, in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    fn apply(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut query = url.query_pairs_mut();
        for (key, value) in &self.pairs {
            query.append_pair(key, value);
        }
    }
}

impl SupabaseClient {
    fn table_url(&self, table: &str, query: &RestQuery) -> Result<Url, SupabaseError> {
        let mut url = self.endpoint(&format!("rest/v1/{table}"))?;
        query.apply(&mut url);
        Ok(url)
    }

    /// `GET /rest/v1/{table}?...`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows do not decode into `T`.
    #[instrument(skip(self, access_token))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        query: &RestQuery,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, query)?;
        self.send_json(self.request(Method::GET, url, Some(access_token)))
            .await
    }

    /// `POST /rest/v1/{table}` returning the inserted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected by a row policy.
    #[instrument(skip(self, access_token, body))]
    pub async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        body: &B,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, &RestQuery::new().select("*"))?;
        let request = self
            .request(Method::POST, url, Some(access_token))
            .header("Prefer", "return=representation")
            .json(body);
        self.send_json(request).await
    }

    /// `PATCH /rest/v1/{table}?filters` returning the updated rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, access_token, body))]
    pub async fn update<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        filters: &RestQuery,
        body: &B,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, filters)?;
        let request = self
            .request(Method::PATCH, url, Some(access_token))
            .header("Prefer", "return=representation")
            .json(body);
        self.send_json(request).await
    }

    /// `DELETE /rest/v1/{table}?filters` returning the deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, access_token))]
    pub async fn delete<T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        filters: &RestQuery,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, filters)?;
        let request = self
            .request(Method::DELETE, url, Some(access_token))
            .header("Prefer", "return=representation");
        self.send_json(request).await
    }
}
