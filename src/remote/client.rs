//! Typed REST client implementing [`FieldService`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{
    FieldService, Session, authenticate,
    query::{check_status, query_all},
    records::{
        ActivationBody, CreatedRecord, ServiceResourceRecord, SkillLinkBody, SkillLinkRecord,
        SkillRecord, UserRecord,
    },
};
use crate::{
    config::Credentials,
    error::{Error, Result},
    model::{NewSkillLink, Skill, SkillLink, Technician, User},
};

/// Timeout applied to every request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Field-service client bound to an authenticated session.
#[derive(Debug, Clone)]
pub struct SalesforceClient {
    /// Shared HTTP client.
    http: reqwest::Client,
    /// Authenticated session.
    session: Session,
    /// REST API version, e.g. `v65.0`.
    api_version: String,
}

impl SalesforceClient {
    /// Log in with the given credentials and return a ready client.
    pub async fn connect(credentials: &Credentials, api_version: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| Error::Auth {
                message: format!("failed to build HTTP client: {error}"),
            })?;
        let session = authenticate(&http, credentials).await?;
        info!(instance = %session.instance_url, "authenticated");
        Ok(Self::with_session(http, session, api_version))
    }

    /// Build a client around an existing session.
    pub fn with_session(http: reqwest::Client, session: Session, api_version: &str) -> Self {
        Self {
            http,
            session,
            api_version: api_version.to_string(),
        }
    }

    /// Run a query and decode every record.
    async fn query<T>(&self, soql: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        query_all(&self.http, &self.session, &self.api_version, soql).await
    }

    /// Build the URL of an sObject resource.
    fn sobject_url(&self, path: &str) -> String {
        format!(
            "{}/services/data/{}/sobjects/{path}",
            self.session.instance_url, self.api_version
        )
    }

    /// Send an authenticated mutation and check its status.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.session.access_token)
            .send()
            .await
            .map_err(|source| Error::Request {
                url: url.to_string(),
                source,
            })?;
        check_status(response).await
    }

    /// Query technicians with the given filter clause.
    async fn technicians_where(&self, clause: &str, limit: usize) -> Result<Vec<Technician>> {
        let soql = format!(
            "SELECT Id, Name, IsActive FROM ServiceResource WHERE {clause} \
             ORDER BY LastModifiedDate DESC LIMIT {limit}"
        );
        let records: Vec<ServiceResourceRecord> = self.query(&soql).await?;
        Ok(records.into_iter().map(Technician::from).collect())
    }
}

#[async_trait]
impl FieldService for SalesforceClient {
    async fn technician_by_id(&self, id: &str) -> Result<Option<Technician>> {
        let soql = format!(
            "SELECT Id, Name, IsActive FROM ServiceResource WHERE Id = '{}' LIMIT 1",
            escape_soql(id)
        );
        let records: Vec<ServiceResourceRecord> = self.query(&soql).await?;
        Ok(records.into_iter().next().map(Technician::from))
    }

    async fn technicians_named(&self, name: &str, limit: usize) -> Result<Vec<Technician>> {
        let clause = format!("Name = '{}'", escape_soql(name));
        self.technicians_where(&clause, limit).await
    }

    async fn technicians_name_containing(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<Technician>> {
        let clause = format!("Name LIKE '%{}%'", escape_like(fragment));
        self.technicians_where(&clause, limit).await
    }

    async fn users_with_email(&self, email: &str, limit: usize) -> Result<Vec<User>> {
        let soql = format!(
            "SELECT Id, Name, Email FROM User WHERE Email = '{}' LIMIT {limit}",
            escape_soql(email)
        );
        let records: Vec<UserRecord> = self.query(&soql).await?;
        Ok(records.into_iter().map(User::from).collect())
    }

    async fn technicians_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<Technician>> {
        let clause = format!("RelatedRecordId = '{}'", escape_soql(user_id));
        self.technicians_where(&clause, limit).await
    }

    async fn skills(&self, limit: usize) -> Result<Vec<Skill>> {
        let soql = format!(
            "SELECT Id, MasterLabel, DeveloperName FROM Skill WHERE IsDeleted = false \
             ORDER BY MasterLabel LIMIT {limit}"
        );
        let records: Vec<SkillRecord> = self.query(&soql).await?;
        Ok(records.into_iter().filter_map(SkillRecord::into_skill).collect())
    }

    async fn skill_links(&self, technician_id: &str) -> Result<Vec<SkillLink>> {
        let soql = format!(
            "SELECT Id, SkillId, Skill.MasterLabel, Skill.DeveloperName FROM ServiceResourceSkill \
             WHERE ServiceResourceId = '{}' ORDER BY Skill.MasterLabel",
            escape_soql(technician_id)
        );
        let records: Vec<SkillLinkRecord> = self.query(&soql).await?;
        Ok(records.into_iter().filter_map(SkillLinkRecord::into_link).collect())
    }

    async fn activate_technician(&self, technician_id: &str) -> Result<()> {
        let url = self.sobject_url(&format!("ServiceResource/{technician_id}"));
        debug!(%technician_id, "activating technician");
        let request = self
            .http
            .patch(&url)
            .json(&ActivationBody { is_active: true });
        self.send(request, &url).await?;
        Ok(())
    }

    async fn delete_skill_link(&self, link_id: &str) -> Result<()> {
        let url = self.sobject_url(&format!("ServiceResourceSkill/{link_id}"));
        debug!(%link_id, "deleting skill link");
        self.send(self.http.delete(&url), &url).await?;
        Ok(())
    }

    async fn create_skill_link(&self, link: &NewSkillLink) -> Result<Option<String>> {
        let url = self.sobject_url("ServiceResourceSkill");
        debug!(
            technician_id = %link.technician_id,
            skill_id = %link.skill_id,
            "creating skill link"
        );
        let request = self.http.post(&url).json(&SkillLinkBody::from(link));
        let response = self.send(request, &url).await?;
        // The link exists once the status is a success; a body without an id is not a failure.
        match response.json::<CreatedRecord>().await {
            Ok(created) => Ok(created.id),
            Err(error) => {
                warn!(%url, %error, "created skill link without a readable id");
                Ok(None)
            }
        }
    }
}

/// Escape a value for use inside a quoted SOQL string literal.
fn escape_soql(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Escape a value for use inside a `LIKE` pattern.
fn escape_like(text: &str) -> String {
    escape_soql(text).replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path, query_param},
    };

    use super::{SalesforceClient, escape_like, escape_soql};
    use crate::{
        error::Error,
        model::NewSkillLink,
        remote::{FieldService, Session},
        resolve::SEARCH_LIMIT,
    };

    fn client(server: &MockServer) -> SalesforceClient {
        let session = Session {
            access_token: "token".to_string(),
            instance_url: server.uri(),
        };
        SalesforceClient::with_session(reqwest::Client::new(), session, "v65.0")
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_soql(r"O'Brien\x"), r"O\'Brien\\x");
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
    }

    #[tokio::test]
    async fn maps_link_rows_to_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v65.0/query/"))
            .and(query_param(
                "q",
                "SELECT Id, SkillId, Skill.MasterLabel, Skill.DeveloperName FROM ServiceResourceSkill \
                 WHERE ServiceResourceId = '0Hn000000000001AAA' ORDER BY Skill.MasterLabel",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "done": true,
                "records": [
                    { "Id": "0Sx1", "SkillId": "0C5a", "Skill": { "MasterLabel": "Chip" } },
                    { "Id": null, "SkillId": "0C5b", "Skill": { "MasterLabel": "TV" } }
                ]
            })))
            .mount(&server)
            .await;

        let links = client(&server)
            .skill_links("0Hn000000000001AAA")
            .await
            .expect("links");

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].link_id, "0Sx1");
        assert_eq!(links[0].label, "Chip");
        assert_eq!(links[1].link_id, "");
        assert_eq!(links[1].skill_id, "0C5b");
    }

    /// Answer the query `soql` with `records`, exactly once.
    async fn expect_query(server: &MockServer, soql: &str, records: Value) {
        Mock::given(method("GET"))
            .and(path("/services/data/v65.0/query/"))
            .and(query_param("q", soql))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "done": true,
                "records": records
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn exact_name_lookup_is_newest_first_and_capped() {
        let server = MockServer::start().await;
        expect_query(
            &server,
            "SELECT Id, Name, IsActive FROM ServiceResource WHERE Name = 'Maria D\\'Ávila' \
             ORDER BY LastModifiedDate DESC LIMIT 10",
            json!([
                { "Id": "0Hn2", "Name": "Maria D'Ávila", "IsActive": true },
                { "Id": "0Hn1", "Name": "Maria D'Ávila", "IsActive": false }
            ]),
        )
        .await;

        let technicians = client(&server)
            .technicians_named("Maria D'Ávila", SEARCH_LIMIT)
            .await
            .expect("lookup");

        let ids = technicians
            .iter()
            .map(|technician| technician.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["0Hn2", "0Hn1"]);
        assert!(technicians[0].is_active);
        assert!(!technicians[1].is_active);
    }

    #[tokio::test]
    async fn partial_name_lookup_escapes_wildcards() {
        let server = MockServer::start().await;
        expect_query(
            &server,
            "SELECT Id, Name, IsActive FROM ServiceResource WHERE Name LIKE '%50\\%\\_off%' \
             ORDER BY LastModifiedDate DESC LIMIT 10",
            json!([{ "Id": "0Hn3", "Name": "Loja 50%_off", "IsActive": true }]),
        )
        .await;

        let technicians = client(&server)
            .technicians_name_containing("50%_off", SEARCH_LIMIT)
            .await
            .expect("lookup");

        assert_eq!(technicians.len(), 1);
        assert_eq!(technicians[0].name, "Loja 50%_off");
    }

    #[tokio::test]
    async fn email_lookup_queries_users_then_owned_technicians() {
        let server = MockServer::start().await;
        expect_query(
            &server,
            "SELECT Id, Name, Email FROM User WHERE Email = 'maria@example.com' LIMIT 10",
            json!([{ "Id": "005A", "Name": "Maria", "Email": "maria@example.com" }]),
        )
        .await;
        expect_query(
            &server,
            "SELECT Id, Name, IsActive FROM ServiceResource WHERE RelatedRecordId = '005A' \
             ORDER BY LastModifiedDate DESC LIMIT 10",
            json!([{ "Id": "0Hn1", "Name": "Maria Silva", "IsActive": true }]),
        )
        .await;

        let client = client(&server);
        let users = client
            .users_with_email("maria@example.com", SEARCH_LIMIT)
            .await
            .expect("users");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email.as_deref(), Some("maria@example.com"));

        let technicians = client
            .technicians_for_user(&users[0].id, SEARCH_LIMIT)
            .await
            .expect("technicians");
        assert_eq!(technicians.len(), 1);
        assert_eq!(technicians[0].id, "0Hn1");
    }

    #[tokio::test]
    async fn create_posts_body_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/data/v65.0/sobjects/ServiceResourceSkill"))
            .and(body_json(json!({
                "ServiceResourceId": "0Hn1",
                "SkillId": "0C5a",
                "EffectiveStartDate": "2026-01-01T00:00:00.000Z",
                "SkillLevel": 3
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "id": "0Sx9", "success": true })),
            )
            .mount(&server)
            .await;

        let link = NewSkillLink {
            technician_id: "0Hn1".to_string(),
            skill_id: "0C5a".to_string(),
            effective_start_date: "2026-01-01T00:00:00.000Z".to_string(),
            skill_level: Some(3),
        };
        let id = client(&server).create_skill_link(&link).await.expect("create");
        assert_eq!(id.as_deref(), Some("0Sx9"));
    }

    #[tokio::test]
    async fn failed_delete_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/services/data/v65.0/sobjects/ServiceResourceSkill/0Sx1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("NOT_FOUND"))
            .mount(&server)
            .await;

        let error = client(&server)
            .delete_skill_link("0Sx1")
            .await
            .expect_err("should fail");
        assert!(matches!(error, Error::Api { status: 404, ref message } if message == "NOT_FOUND"));
    }

    #[tokio::test]
    async fn activation_patches_is_active() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/services/data/v65.0/sobjects/ServiceResource/0Hn1"))
            .and(body_json(json!({ "IsActive": true })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).activate_technician("0Hn1").await.expect("activate");
    }
}
