//! Executing `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the only seam between the client and real I/O. The default
//! `UreqTransport` disables ureq's status-as-error behavior so 4xx/5xx
//! responses come back as data and the client applies its own status policy.
//! Only failures that produce no response at all surface as `TransportError`.

use std::time::Duration;

use ureq::unversioned::multipart::Form;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};

/// Performs one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an agent configured by the caller. It must have
    /// `http_status_as_error(false)` or non-2xx responses become transport
    /// errors.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let target = format!("{} {}", request.method.as_str(), request.url);

        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => prepare(self.agent.get(&request.url), request).call(),
            (HttpMethod::Delete, _) => prepare(self.agent.delete(&request.url), request).call(),
            (HttpMethod::Post, Some(RequestBody::Json(json))) => {
                prepare(self.agent.post(&request.url), request)
                    .content_type("application/json")
                    .send(json.as_bytes())
            }
            (HttpMethod::Post, Some(RequestBody::Multipart(form))) => {
                let form = multipart(form).map_err(|e| {
                    TransportError::with_source(format!("{target}: opening upload file"), e)
                })?;
                prepare(self.agent.post(&request.url), request).send(form)
            }
            (HttpMethod::Post, None) => prepare(self.agent.post(&request.url), request).send_empty(),
        };
        let mut response = result.map_err(|e| TransportError::with_source(target.clone(), e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::with_source(format!("{target}: reading body"), e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// ureq sets the boundary and the `multipart/form-data` content type.
fn multipart(form: &MultipartForm) -> std::io::Result<Form<'_>> {
    form.fields
        .iter()
        .fold(Form::new(), |data, (name, value)| data.text(name, value))
        .file(&form.file.field, &form.file.path)
}

fn prepare<B>(builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    let builder = builder.query_pairs(
        request
            .query
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );
    request
        .headers
        .iter()
        .fold(builder, |builder, (name, value)| {
            builder.header(name.as_str(), value.as_str())
        })
}
