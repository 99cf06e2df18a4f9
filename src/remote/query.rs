//! Paged query execution and status handling.

use reqwest::{Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;

use super::Session;
use crate::error::{Error, Result};

/// One page of a query response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage<T> {
    /// Whether this is the last page.
    #[serde(default = "default_done")]
    done: bool,
    /// Relative URL of the next page.
    next_records_url: Option<String>,
    /// Records on this page.
    #[serde(default = "Vec::new")]
    records: Vec<T>,
}

/// Pages without a `done` flag are treated as final.
fn default_done() -> bool {
    true
}

/// Run a SOQL query and collect the records of every page.
pub async fn query_all<T>(
    http: &reqwest::Client,
    session: &Session,
    api_version: &str,
    soql: &str,
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let base = format!("{}/services/data/{api_version}/query/", session.instance_url);
    let mut url = Url::parse(&base).map_err(|error| Error::Decode {
        url: base.clone(),
        message: error.to_string(),
    })?;
    url.query_pairs_mut().append_pair("q", soql);

    debug!(query = soql, "running query");
    let mut page: QueryPage<T> = get_json(http, session, url.as_str()).await?;
    let mut records = Vec::new();
    loop {
        records.append(&mut page.records);
        if page.done {
            break;
        }
        let Some(next) = page.next_records_url.take() else {
            warn!("query page not done but carries no nextRecordsUrl; stopping");
            break;
        };
        let next_url = format!("{}{next}", session.instance_url);
        debug!(url = %next_url, "fetching next page");
        page = get_json(http, session, &next_url).await?;
    }

    debug!(count = records.len(), "query complete");
    Ok(records)
}

/// Issue an authenticated GET and decode the JSON body.
async fn get_json<T>(http: &reqwest::Client, session: &Session, url: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = http
        .get(url)
        .bearer_auth(&session.access_token)
        .send()
        .await
        .map_err(|source| Error::Request {
            url: url.to_string(),
            source,
        })?;
    let response = check_status(response).await?;
    response.json().await.map_err(|error| Error::Decode {
        url: url.to_string(),
        message: error.to_string(),
    })
}

/// Turn responses with a status of 400 or above into [`Error::Api`].
pub(super) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.as_u16() < StatusCode::BAD_REQUEST.as_u16() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message: body,
    })
}
