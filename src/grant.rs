//! Access grants: permission for an identity (or everyone) to use resources
//! matching an optional filter.
//!
//! Grants are created and looked up through associated functions on
//! [`Grant`] and revoked with [`delete_grant`] or [`Grant::delete`], which
//! share one endpoint routine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http::{HttpClient, HttpError};
use crate::ids::{ConsentId, GrantId, IdentityId};
use crate::wire::{parse_timestamp, resource_path};

const GRANTS_EP: &str = "/grants";

/// Wire value standing for "every identity".
pub const EVERYONE: &str = "everyone";

fn grant_ep(id: &GrantId) -> String {
    resource_path(GRANTS_EP, id.as_str())
}

/// Opaque filter predicate, evaluated by the server and carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraints(pub Value);

/// Who receives a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Grantee {
    Everyone,
    Identity(IdentityId),
}

impl From<String> for Grantee {
    fn from(s: String) -> Self {
        if s == EVERYONE {
            Grantee::Everyone
        } else {
            Grantee::Identity(IdentityId::new(s))
        }
    }
}

impl From<Grantee> for String {
    fn from(grantee: Grantee) -> Self {
        match grantee {
            Grantee::Everyone => EVERYONE.to_string(),
            Grantee::Identity(id) => id.to_string(),
        }
    }
}

impl From<IdentityId> for Grantee {
    fn from(id: IdentityId) -> Self {
        Grantee::Identity(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantCreateParams {
    pub grantee: Grantee,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Constraints>,
}

impl GrantCreateParams {
    pub fn new(grantee: impl Into<Grantee>) -> Self {
        Self {
            grantee: grantee.into(),
            filter: None,
        }
    }

    pub fn everyone() -> Self {
        Self::new(Grantee::Everyone)
    }

    pub fn with_filter(mut self, filter: Constraints) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Grant as transmitted by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRecord {
    pub id: String,
    pub created_at: String,
    pub granter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grantee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Constraints>,
}

/// A grant fetched from the server.
///
/// Deleting it revokes the remote grant; the local fields are left as they
/// were.
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub id: GrantId,
    pub created_at: DateTime<Utc>,
    pub granter: IdentityId,
    /// `None` when the grant applies to everyone.
    pub grantee: Option<IdentityId>,
    /// Consent this grant was issued under, if any.
    pub consent: Option<ConsentId>,
    pub filter: Option<Constraints>,
}

impl TryFrom<GrantRecord> for Grant {
    type Error = HttpError;

    fn try_from(record: GrantRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: parse_timestamp("createdAt", &record.created_at)?,
            id: GrantId::new(record.id),
            granter: IdentityId::new(record.granter),
            // Absent and "everyone" mean the same thing.
            grantee: record
                .grantee
                .filter(|g| g != EVERYONE)
                .map(IdentityId::new),
            consent: record.consent.map(ConsentId::new),
            filter: record.filter,
        })
    }
}

impl Grant {
    pub async fn create(
        client: &impl HttpClient,
        params: &GrantCreateParams,
    ) -> Result<Grant, HttpError> {
        let record: GrantRecord = client.create(GRANTS_EP, params).await?;
        let grant = Grant::try_from(record)?;
        debug!(grant_id = %grant.id, "created grant");
        Ok(grant)
    }

    pub async fn get(client: &impl HttpClient, id: &GrantId) -> Result<Grant, HttpError> {
        let record: GrantRecord = client.get(&grant_ep(id), &()).await?;
        Grant::try_from(record)
    }

    /// Revokes this grant. Same request as [`delete_grant`].
    pub async fn delete(&self, client: &impl HttpClient) -> Result<(), HttpError> {
        delete_grant(client, &self.id).await
    }

    pub fn is_for_everyone(&self) -> bool {
        self.grantee.is_none()
    }
}

pub async fn delete_grant(client: &impl HttpClient, id: &GrantId) -> Result<(), HttpError> {
    debug!(grant_id = %id, "deleting grant");
    client.delete(&grant_ep(id)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use std::sync::Mutex;

    struct MockClient {
        response: Result<Value, u16>,
        calls: Mutex<Vec<(&'static str, String, Value)>>,
    }

    impl MockClient {
        fn ok(value: Value) -> Self {
            Self {
                response: Ok(value),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn status(status: u16) -> Self {
            Self {
                response: Err(status),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, method: &'static str, path: &str, payload: Value) {
            self.calls
                .lock()
                .unwrap()
                .push((method, path.to_string(), payload));
        }

        fn respond<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
            match &self.response {
                Ok(value) => Ok(serde_json::from_value(value.clone())?),
                Err(status) => Err(HttpError::from_status(*status, path, "mock error".into())),
            }
        }

        fn calls(&self) -> Vec<(&'static str, String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl HttpClient for MockClient {
        async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, HttpError>
        where
            T: DeserializeOwned,
            Q: Serialize + ?Sized,
        {
            self.record("GET", path, serde_json::to_value(query)?);
            self.respond(path)
        }

        async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
        where
            T: DeserializeOwned,
            B: Serialize + ?Sized,
        {
            self.record("POST", path, serde_json::to_value(body)?);
            self.respond(path)
        }

        async fn delete(&self, path: &str) -> Result<(), HttpError> {
            self.record("DELETE", path, Value::Null);
            self.respond::<Value>(path).map(|_| ())
        }
    }

    fn grant_json(grantee: Option<&str>) -> Value {
        let mut value = json!({
            "id": "G1",
            "createdAt": "2021-03-04T12:00:00Z",
            "granter": "I-owner",
            "consent": "C1",
            "filter": {"document.tags": {"$any": {"$eq": "csv"}}}
        });
        if let Some(g) = grantee {
            value["grantee"] = json!(g);
        }
        value
    }

    #[test]
    fn grantee_serializes_as_string() {
        assert_eq!(
            serde_json::to_value(GrantCreateParams::everyone()).unwrap(),
            json!({"grantee": "everyone"})
        );
        assert_eq!(
            serde_json::to_value(GrantCreateParams::new(IdentityId::new("I2"))).unwrap(),
            json!({"grantee": "I2"})
        );
    }

    #[test]
    fn grantee_parses_sentinel() {
        assert_eq!(Grantee::from("everyone".to_string()), Grantee::Everyone);
        assert_eq!(
            Grantee::from("I2".to_string()),
            Grantee::Identity(IdentityId::new("I2"))
        );
    }

    #[test]
    fn absent_or_sentinel_grantee_means_everyone() {
        for grantee in [None, Some("everyone")] {
            let record: GrantRecord = serde_json::from_value(grant_json(grantee)).unwrap();
            let grant = Grant::try_from(record).unwrap();
            assert_eq!(grant.grantee, None);
            assert!(grant.is_for_everyone());
        }

        let record: GrantRecord = serde_json::from_value(grant_json(Some("I2"))).unwrap();
        let grant = Grant::try_from(record).unwrap();
        assert_eq!(grant.grantee, Some(IdentityId::new("I2")));
    }

    #[test]
    fn optional_fields_may_be_missing() {
        let record: GrantRecord = serde_json::from_value(json!({
            "id": "G2",
            "createdAt": "2021-03-04T12:00:00Z",
            "granter": "I-owner"
        }))
        .unwrap();
        let grant = Grant::try_from(record).unwrap();
        assert!(grant.consent.is_none());
        assert!(grant.filter.is_none());
    }

    #[tokio::test]
    async fn create_transports_filter_verbatim() {
        let filter = Constraints(json!({"document.tags": {"$any": {"$eq": "csv"}}}));
        let client = MockClient::ok(grant_json(Some("I2")));
        let params = GrantCreateParams::new(IdentityId::new("I2")).with_filter(filter.clone());

        let grant = Grant::create(&client, &params).await.unwrap();

        assert_eq!(grant.id, GrantId::new("G1"));
        assert_eq!(grant.consent, Some(ConsentId::new("C1")));
        assert_eq!(grant.filter, Some(filter.clone()));
        let calls = client.calls();
        assert_eq!(calls[0].0, "POST");
        assert_eq!(calls[0].1, "/grants");
        assert_eq!(calls[0].2, json!({"grantee": "I2", "filter": filter.0}));
    }

    #[tokio::test]
    async fn get_uses_grant_path() {
        let client = MockClient::ok(grant_json(None));
        let grant = Grant::get(&client, &GrantId::new("G1")).await.unwrap();
        assert_eq!(grant.granter, IdentityId::new("I-owner"));
        assert_eq!(client.calls()[0].1, "/grants/G1");
    }

    #[tokio::test]
    async fn instance_and_free_delete_hit_same_endpoint() {
        let client = MockClient::ok(grant_json(None));
        let grant = Grant::get(&client, &GrantId::new("G1")).await.unwrap();

        grant.delete(&client).await.unwrap();
        delete_grant(&client, &GrantId::new("G1")).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], calls[2]);
        assert_eq!(calls[1].0, "DELETE");
        assert_eq!(calls[1].1, "/grants/G1");
        // Local fields survive deletion.
        assert_eq!(grant.id, GrantId::new("G1"));
    }

    #[tokio::test]
    async fn grant_id_is_encoded_into_one_segment() {
        let client = MockClient::ok(Value::Null);
        delete_grant(&client, &GrantId::new("G1?cascade=true")).await.unwrap();
        assert_eq!(client.calls()[0].1, "/grants/G1%3Fcascade%3Dtrue");
    }

    #[tokio::test]
    async fn missing_grant_is_not_found() {
        let client = MockClient::status(404);
        let err = Grant::get(&client, &GrantId::new("G404")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
