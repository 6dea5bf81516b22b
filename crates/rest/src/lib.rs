//! Blocking REST client for the Stratus console API
//!
//! Tests use this for fixture setup/teardown and for cross-checking what the
//! UI shows: create a provider over REST, drive the UI against it, delete it
//! afterwards. Collections mirror the console's `/api/<name>` endpoints.

pub mod error;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub use error::{RestError, RestResult};

/// Authenticated client for one console instance.
pub struct RestClient {
    http: reqwest::blocking::Client,
    base_url: String,
    username: String,
    password: String,
}

impl RestClient {
    pub fn new(base_url: &str, username: &str, password: &str) -> RestResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle for an `/api/<name>` collection.
    pub fn collection<'a>(&'a self, name: &str) -> Collection<'a> {
        Collection {
            client: self,
            name: name.to_string(),
        }
    }

    /// True once `/health` answers 200.
    pub fn is_healthy(&self) -> bool {
        self.http
            .get(format!("{}/health", self.base_url))
            .send()
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> RestResult<T> {
        debug!(%path, "GET");
        let resp = self
            .http
            .get(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
            .send()?;
        Self::parse(resp)
    }

    pub fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> RestResult<T> {
        debug!(%path, "POST");
        let resp = self
            .http
            .post(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()?;
        Self::parse(resp)
    }

    pub fn delete(&self, path: &str) -> RestResult<()> {
        debug!(%path, "DELETE");
        let resp = self
            .http
            .delete(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
            .send()?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RestError::Api {
                status: status.as_u16(),
                message: resp.text().unwrap_or_default(),
            })
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn parse<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> RestResult<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(RestError::Api {
                status: status.as_u16(),
                message: resp.text().unwrap_or_default(),
            });
        }
        Ok(resp.json()?)
    }
}

/// One `/api/<name>` collection.
pub struct Collection<'a> {
    client: &'a RestClient,
    name: String,
}

impl Collection<'_> {
    pub fn all(&self) -> RestResult<Vec<Value>> {
        let body: Value = self.client.get(&format!("/api/{}", self.name))?;
        Ok(body
            .get("resources")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    pub fn find_by_name(&self, name: &str) -> RestResult<Option<Value>> {
        Ok(self
            .all()?
            .into_iter()
            .find(|item| item.get("name").and_then(Value::as_str) == Some(name)))
    }

    pub fn create(&self, payload: &Value) -> RestResult<Value> {
        self.client.post(&format!("/api/{}", self.name), payload)
    }

    pub fn delete(&self, id: &str) -> RestResult<()> {
        self.client.delete(&format!("/api/{}/{}", self.name, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = RestClient::new("http://127.0.0.1:8080/", "admin", "secret").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
        assert_eq!(client.url("/api/providers"), "http://127.0.0.1:8080/api/providers");
    }
}
