//! Request body extraction
//!
//! Issue endpoints accept either a JSON object or an HTML form
//! (`application/x-www-form-urlencoded`). Both are normalized into a JSON
//! object so one set of domain types decodes either shape.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::convert::Infallible;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Top-level fields of a request body.
///
/// Never rejects: a missing, non-object or undecodable body yields no fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyFields(pub Map<String, Value>);

impl BodyFields {
    /// The `_id` field as text, if sent as a string, number or boolean
    pub fn id(&self) -> Option<String> {
        match self.0.get("_id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Decode the fields into a request type
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

#[async_trait]
impl<S> FromRequest<S> for BodyFields
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));

        if is_form {
            let fields = match Form::<HashMap<String, String>>::from_request(req, state).await {
                Ok(Form(pairs)) => pairs
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
                Err(rejection) => {
                    tracing::debug!("Ignoring undecodable form body: {}", rejection);
                    Map::new()
                }
            };
            return Ok(Self(fields));
        }

        let fields = match Json::<Value>::from_request(req, state).await {
            Ok(Json(Value::Object(fields))) => fields,
            Ok(_) => Map::new(),
            Err(rejection) => {
                tracing::debug!("Ignoring undecodable JSON body: {}", rejection);
                Map::new()
            }
        };
        Ok(Self(fields))
    }
}
