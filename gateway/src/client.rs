use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::Value;

use super::error::Result;

/// Marker for forwarded requests that carry no query parameters.
pub const NO_QUERY: &[(&str, &str)] = &[];

/// Thin client for the data layer. Every call relays the upstream status
/// and JSON body unchanged; the gateway adds nothing to responses.
#[derive(Clone)]
pub struct DataApi {
    http: reqwest::Client,
    base_url: String,
}

impl DataApi {
    pub fn new(base_url: String) -> DataApi {
        DataApi {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<Q: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<HttpResponse> {
        self.relay(self.http.get(self.url(path)).query(query)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<HttpResponse> {
        self.relay(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<HttpResponse> {
        self.relay(self.http.put(self.url(path)).json(body)).await
    }

    pub async fn delete(&self, path: &str, body: &Value) -> Result<HttpResponse> {
        self.relay(self.http.delete(self.url(path)).json(body)).await
    }

    async fn relay(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse> {
        let response = request.send().await?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap_or(Value::Null);
        Ok(HttpResponse::build(status).json(body))
    }
}
