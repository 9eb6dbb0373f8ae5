//! Reqwest-backed collection source for a JSON REST backend.
//!
//! This adapter owns transport details only: URL layout, timeout and HTTP
//! error mapping, and JSON decoding into resource records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use resource_schema::{Collection, Post, Resource, ResourceId, User};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{CollectionSource, SourceError};

/// Collection source issuing `GET/POST/PUT/DELETE` against
/// `{base}/{collection}[/{id}]`.
#[derive(Debug, Clone)]
pub struct RestCollectionSource {
    client: Client,
    base_url: Url,
}

impl RestCollectionSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Root every request is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(
        &self,
        method: Method,
        collection: Collection,
        id: Option<ResourceId>,
    ) -> Result<RequestBuilder, SourceError> {
        let url = resource_url(&self.base_url, collection, id)?;
        debug!(%method, %url, "sending collection request");
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json"))
    }
}

#[async_trait]
impl CollectionSource for RestCollectionSource {
    async fn list(&self, collection: Collection) -> Result<Vec<Resource>, SourceError> {
        let body = send(self.request(Method::GET, collection, None)?).await?;
        decode_many(collection, &body)
    }

    async fn get(&self, collection: Collection, id: ResourceId) -> Result<Resource, SourceError> {
        let body = send(self.request(Method::GET, collection, Some(id))?).await?;
        decode_one(collection, &body)
    }

    async fn create(&self, collection: Collection, body: &Value) -> Result<Resource, SourceError> {
        let request = self.request(Method::POST, collection, None)?.json(body);
        let echo = send(request).await?;
        decode_one(collection, &echo)
    }

    async fn update(
        &self,
        collection: Collection,
        id: ResourceId,
        body: &Value,
    ) -> Result<Resource, SourceError> {
        let request = self.request(Method::PUT, collection, Some(id))?.json(body);
        let echo = send(request).await?;
        decode_one(collection, &echo)
    }

    async fn delete(&self, collection: Collection, id: ResourceId) -> Result<(), SourceError> {
        send(self.request(Method::DELETE, collection, Some(id))?).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Vec<u8>, SourceError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    debug!(status = status.as_u16(), bytes = body.len(), "collection response received");
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    Ok(body.to_vec())
}

fn resource_url(
    base: &Url,
    collection: Collection,
    id: Option<ResourceId>,
) -> Result<Url, SourceError> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|()| {
            SourceError::invalid_request(format!("base URL cannot carry a path: {base}"))
        })?;
        segments.pop_if_empty().push(collection.as_str());
        if let Some(id) = id {
            segments.push(&id.to_string());
        }
    }
    Ok(url)
}

fn decode_many(collection: Collection, body: &[u8]) -> Result<Vec<Resource>, SourceError> {
    let decoded = match collection {
        Collection::Users => serde_json::from_slice::<Vec<User>>(body)
            .map(|users| users.into_iter().map(Resource::User).collect()),
        Collection::Posts => serde_json::from_slice::<Vec<Post>>(body)
            .map(|posts| posts.into_iter().map(Resource::Post).collect()),
    };
    decoded.map_err(|error| {
        SourceError::decode(format!("invalid {collection} list payload: {error}"))
    })
}

fn decode_one(collection: Collection, body: &[u8]) -> Result<Resource, SourceError> {
    let decoded = match collection {
        Collection::Users => serde_json::from_slice::<User>(body).map(Resource::User),
        Collection::Posts => serde_json::from_slice::<Post>(body).map(Resource::Post),
    };
    decoded.map_err(|error| {
        SourceError::decode(format!("invalid {} payload: {error}", collection.noun()))
    })
}

fn map_transport_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::timeout(error.to_string())
    } else {
        SourceError::network(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status.canonical_reason().unwrap_or("no reason given").to_owned()
    } else {
        preview
    };
    SourceError::request(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    fn base(raw: &str) -> Url {
        Url::parse(raw).expect("test URL parses")
    }

    #[rstest]
    #[case("https://jsonplaceholder.typicode.com", None, "https://jsonplaceholder.typicode.com/posts")]
    #[case("https://jsonplaceholder.typicode.com/", Some(7), "https://jsonplaceholder.typicode.com/posts/7")]
    #[case("http://localhost:3000/api/", Some(1), "http://localhost:3000/api/posts/1")]
    fn builds_collection_urls(
        #[case] root: &str,
        #[case] id: Option<u64>,
        #[case] expected: &str,
    ) {
        let url = resource_url(&base(root), Collection::Posts, id.map(ResourceId::new))
            .expect("URL builds");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn rejects_base_urls_without_paths() {
        let error = resource_url(&base("mailto:ops@example.org"), Collection::Users, None)
            .expect_err("mailto URLs cannot carry segments");
        assert!(matches!(error, SourceError::InvalidRequest { .. }));
    }

    #[rstest]
    #[case::not_found(StatusCode::NOT_FOUND, b"{}".as_slice(), "{}")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, b"".as_slice(), "Internal Server Error")]
    #[case::whitespace(StatusCode::BAD_REQUEST, b"  bad\n  input ".as_slice(), "bad input")]
    fn maps_statuses_to_request_errors(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] message: &str,
    ) {
        let error = map_status_error(status, body);
        assert_eq!(error, SourceError::request(status.as_u16(), message));
        assert_eq!(error.status(), Some(status.as_u16()));
    }

    #[test]
    fn truncates_long_body_previews() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn decodes_post_lists_in_backend_order() {
        let body = br#"[
            { "userId": 1, "id": 2, "title": "qui est esse", "body": "est rerum tempore" },
            { "userId": 1, "id": 1, "title": "sunt aut facere", "body": "quia et suscipit" }
        ]"#;

        let rows = decode_many(Collection::Posts, body).expect("posts decode");
        let ids: Vec<u64> = rows.iter().map(|row| row.id().get()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn decodes_user_records_with_nested_fields() {
        let body = br#"{
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": { "lat": "-37.3159", "lng": "81.1496" }
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {
                "name": "Romaguera-Crona",
                "catchPhrase": "Multi-layered client-server neural-net",
                "bs": "harness real-time e-markets"
            }
        }"#;

        let record = decode_one(Collection::Users, body).expect("user decodes");
        let user = record.as_user().expect("decoded as a user");
        assert_eq!(user.address.city, "Gwenborough");
        assert_eq!(
            user.company.catch_phrase.as_deref(),
            Some("Multi-layered client-server neural-net")
        );
    }

    #[test]
    fn partial_echoes_are_acknowledged_decode_errors() {
        let error = decode_one(Collection::Posts, br#"{ "id": 1, "title": "only a title" }"#)
            .expect_err("partial echo is rejected");
        assert!(error.is_acknowledged());
        assert!(error.to_string().contains("invalid post payload"));
    }

    #[test]
    fn client_builds_with_timeout() {
        let source = RestCollectionSource::new(
            base("https://jsonplaceholder.typicode.com"),
            Duration::from_secs(10),
        )
        .expect("client builds");
        assert_eq!(source.base_url().host_str(), Some("jsonplaceholder.typicode.com"));
    }
}
