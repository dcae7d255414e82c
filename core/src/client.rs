//! Request builder, response parser and blocking facade for the cat API.
//!
//! # Design
//! Every operation is split into a `build_*` method that checks credentials
//! and produces an `HttpRequest`, and a `parse_*` method that applies the
//! status policy and maps the body. The facade method of the same name runs
//! one round-trip through the client's `Transport` in between. `build_*` and
//! `parse_*` never touch the network, so they can be driven with hand-made
//! responses.

use std::fmt::{self, Display};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{ClientConfig, KeyTier};
use crate::error::CatApiError;
use crate::http::{
    FilePart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, QueryParams, RequestBody,
};
use crate::mapper;
use crate::params::{BreedFacts, FetchImages, ListUploadedImages, ListVotes, RandomFacts};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Breed, Cat, Fact, Image, NewVote, Vote};

pub const API_KEY_HEADER: &str = "x-api-key";

const SIGNUP_HINT: &str = "To get an API key, go to https://thecatapi.com/signup";

const OK: &[u16] = &[200];
const CREATED: &[u16] = &[200, 201];
const DELETED: &[u16] = &[200, 201, 204];

/// Blocking client for the cat API.
///
/// The configuration is fixed at construction. A client built without an API
/// key can only use the public operations.
#[derive(Clone)]
pub struct CatApiClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl<T> fmt::Debug for CatApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CatApiClient<UreqTransport> {
    /// Client for the public service, optionally authenticated.
    pub fn new(api_key: Option<String>) -> Self {
        let config = match api_key {
            Some(key) => ClientConfig::new().with_api_key(key),
            None => ClientConfig::new(),
        };
        Self::from_config(config)
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self { config, transport }
    }
}

impl<T> CatApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_fetch_images(&self, params: &FetchImages) -> Result<HttpRequest, CatApiError> {
        if params.requires_api_key() {
            self.require_key(&format!(
                "You must have an API key to get more than 10 images or filter by breed. {SIGNUP_HINT}"
            ))?;
        }
        Ok(self.request(HttpMethod::Get, &["images", "search"], params.to_query()))
    }

    pub fn build_search_breed(&self, name: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["breeds", "search"],
            QueryParams::new().push("q", name),
        )
    }

    pub fn build_list_breeds(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &["breeds"], QueryParams::new())
    }

    /// Check that `file_path` is a readable regular file and describe the
    /// multipart upload. The transport streams the file when sending.
    pub fn build_upload_image(
        &self,
        file_path: &Path,
        sub_id: Option<&str>,
        breed_ids: Option<&str>,
    ) -> Result<HttpRequest, CatApiError> {
        let readable = std::fs::File::open(file_path)
            .and_then(|file| file.metadata())
            .and_then(|metadata| {
                if metadata.is_file() {
                    Ok(())
                } else {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "not a regular file",
                    ))
                }
            });
        readable.map_err(|source| CatApiError::UploadFile {
            path: file_path.to_path_buf(),
            source,
        })?;
        let form = MultipartForm {
            fields: QueryParams::new()
                .push_opt("sub_id", sub_id)
                .push_opt("breed_ids", breed_ids)
                .into_pairs(),
            file: FilePart {
                field: "file".to_string(),
                path: file_path.to_path_buf(),
            },
        };
        let mut request = self.request(HttpMethod::Post, &["images", "upload"], QueryParams::new());
        request.body = Some(RequestBody::Multipart(form));
        Ok(request)
    }

    pub fn build_delete_image(&self, image_id: &str) -> Result<HttpRequest, CatApiError> {
        self.require_key(&key_required())?;
        let mut request = self.request(HttpMethod::Delete, &["images", image_id], QueryParams::new());
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        Ok(request)
    }

    pub fn build_list_uploaded_images(
        &self,
        params: &ListUploadedImages,
    ) -> Result<HttpRequest, CatApiError> {
        self.require_key(&key_required())?;
        Ok(self.request(HttpMethod::Get, &["images"], params.to_query()))
    }

    pub fn build_vote(&self, input: &NewVote) -> Result<HttpRequest, CatApiError> {
        self.require_key(&key_required())?;
        let body =
            serde_json::to_string(input).map_err(|e| CatApiError::Serialization(e.to_string()))?;
        let mut request = self.request(HttpMethod::Post, &["votes"], QueryParams::new());
        request.body = Some(RequestBody::Json(body));
        Ok(request)
    }

    pub fn build_list_votes(&self, params: &ListVotes) -> Result<HttpRequest, CatApiError> {
        self.require_key(&key_required())?;
        Ok(self.request(HttpMethod::Get, &["votes"], params.to_query()))
    }

    pub fn build_get_vote(&self, vote_id: impl Display) -> Result<HttpRequest, CatApiError> {
        self.require_key(&key_required())?;
        let vote_id = vote_id.to_string();
        Ok(self.request(HttpMethod::Get, &["votes", &vote_id], QueryParams::new()))
    }

    pub fn build_delete_vote(&self, vote_id: impl Display) -> Result<HttpRequest, CatApiError> {
        self.require_key(&key_required())?;
        let vote_id = vote_id.to_string();
        Ok(self.request(HttpMethod::Delete, &["votes", &vote_id], QueryParams::new()))
    }

    pub fn build_random_facts(&self, params: &RandomFacts) -> Result<HttpRequest, CatApiError> {
        self.require_premium()?;
        Ok(self.request(HttpMethod::Get, &["facts"], params.to_query()))
    }

    pub fn build_breed_facts(
        &self,
        breed: &str,
        params: &BreedFacts,
    ) -> Result<HttpRequest, CatApiError> {
        self.require_premium()?;
        Ok(self.request(HttpMethod::Get, &["breeds", breed, "facts"], params.to_query()))
    }

    pub fn build_get_version(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &[], QueryParams::new())
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_fetch_images(&self, response: HttpResponse) -> Result<Vec<Cat>, CatApiError> {
        mapper::map_image_list(decode(&response, OK)?)
    }

    /// `Ok(None)` when the service found no matching breed.
    pub fn parse_search_breed(&self, response: HttpResponse) -> Result<Option<Breed>, CatApiError> {
        let breeds = mapper::map_breed_list(decode(&response, OK)?)?;
        Ok(breeds.into_iter().next())
    }

    pub fn parse_list_breeds(&self, response: HttpResponse) -> Result<Vec<Breed>, CatApiError> {
        mapper::map_breed_list(decode(&response, OK)?)
    }

    pub fn parse_upload_image(&self, response: HttpResponse) -> Result<Image, CatApiError> {
        mapper::map_image(decode(&response, CREATED)?)
    }

    pub fn parse_delete_image(&self, response: HttpResponse) -> Result<bool, CatApiError> {
        check_status(&response, DELETED)?;
        Ok(true)
    }

    pub fn parse_list_uploaded_images(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Image>, CatApiError> {
        mapper::map_image_records(decode(&response, OK)?)
    }

    pub fn parse_vote(&self, response: HttpResponse) -> Result<Vote, CatApiError> {
        mapper::map_vote(decode(&response, CREATED)?)
    }

    pub fn parse_list_votes(&self, response: HttpResponse) -> Result<Vec<Vote>, CatApiError> {
        mapper::map_vote_list(decode(&response, OK)?)
    }

    pub fn parse_get_vote(&self, response: HttpResponse) -> Result<Vote, CatApiError> {
        mapper::map_vote(decode(&response, OK)?)
    }

    /// The service's confirmation object as sent, `Value::Null` for an empty
    /// body.
    pub fn parse_delete_vote(&self, response: HttpResponse) -> Result<Value, CatApiError> {
        decode(&response, DELETED)
    }

    pub fn parse_facts(&self, response: HttpResponse) -> Result<Vec<Fact>, CatApiError> {
        mapper::map_fact_list(decode(&response, OK)?)
    }

    pub fn parse_get_version(&self, response: HttpResponse) -> Result<Value, CatApiError> {
        decode(&response, OK)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn request(&self, method: HttpMethod, segments: &[&str], query: QueryParams) -> HttpRequest {
        let headers = match self.config.api_key() {
            Some(key) => vec![(API_KEY_HEADER.to_string(), key.to_string())],
            None => Vec::new(),
        };
        HttpRequest {
            method,
            url: self.endpoint(segments).into(),
            query: query.into_pairs(),
            headers,
            body: None,
        }
    }

    /// Base URL with `segments` appended, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.config.base_url().clone();
        if segments.is_empty() {
            return url;
        }
        // http(s) base URLs always have a path to extend.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn require_key(&self, message: &str) -> Result<(), CatApiError> {
        match self.config.api_key() {
            Some(_) => Ok(()),
            None => Err(CatApiError::credential(message)),
        }
    }

    fn require_premium(&self) -> Result<(), CatApiError> {
        let message =
            format!("You must have an API key with premium to access this method. {SIGNUP_HINT}");
        self.require_key(&message)?;
        match self.config.key_tier() {
            KeyTier::Premium => Ok(()),
            KeyTier::Free => Err(CatApiError::credential(message)),
        }
    }
}

impl<T: Transport> CatApiClient<T> {
    /// Search random images, with breed data when the service has it.
    #[instrument(skip(self))]
    pub fn fetch_images(&self, params: &FetchImages) -> Result<Vec<Cat>, CatApiError> {
        let request = self.build_fetch_images(params)?;
        self.parse_fetch_images(self.dispatch(&request)?)
    }

    /// First breed whose name matches `name`.
    #[instrument(skip(self))]
    pub fn search_breed(&self, name: &str) -> Result<Option<Breed>, CatApiError> {
        let request = self.build_search_breed(name);
        self.parse_search_breed(self.dispatch(&request)?)
    }

    #[instrument(skip(self))]
    pub fn list_breeds(&self) -> Result<Vec<Breed>, CatApiError> {
        let request = self.build_list_breeds();
        self.parse_list_breeds(self.dispatch(&request)?)
    }

    #[instrument(skip(self, file_path), fields(file_path = %file_path.as_ref().display()))]
    pub fn upload_image(
        &self,
        file_path: impl AsRef<Path>,
        sub_id: Option<&str>,
        breed_ids: Option<&str>,
    ) -> Result<Image, CatApiError> {
        let request = self.build_upload_image(file_path.as_ref(), sub_id, breed_ids)?;
        self.parse_upload_image(self.dispatch(&request)?)
    }

    /// Returns `true` once the service confirms the deletion.
    #[instrument(skip(self))]
    pub fn delete_image(&self, image_id: &str) -> Result<bool, CatApiError> {
        let request = self.build_delete_image(image_id)?;
        self.parse_delete_image(self.dispatch(&request)?)
    }

    #[instrument(skip(self))]
    pub fn list_uploaded_images(
        &self,
        params: &ListUploadedImages,
    ) -> Result<Vec<Image>, CatApiError> {
        let request = self.build_list_uploaded_images(params)?;
        self.parse_list_uploaded_images(self.dispatch(&request)?)
    }

    #[instrument(skip(self))]
    pub fn vote(
        &self,
        image_id: &str,
        sub_id: Option<&str>,
        value: i64,
    ) -> Result<Vote, CatApiError> {
        let input = NewVote {
            image_id: image_id.to_string(),
            sub_id: sub_id.map(str::to_string),
            value,
        };
        let request = self.build_vote(&input)?;
        self.parse_vote(self.dispatch(&request)?)
    }

    #[instrument(skip(self))]
    pub fn list_votes(&self, params: &ListVotes) -> Result<Vec<Vote>, CatApiError> {
        let request = self.build_list_votes(params)?;
        self.parse_list_votes(self.dispatch(&request)?)
    }

    #[instrument(skip(self, vote_id), fields(vote_id = %vote_id))]
    pub fn get_vote(&self, vote_id: impl Display) -> Result<Vote, CatApiError> {
        let request = self.build_get_vote(vote_id)?;
        self.parse_get_vote(self.dispatch(&request)?)
    }

    #[instrument(skip(self, vote_id), fields(vote_id = %vote_id))]
    pub fn delete_vote(&self, vote_id: impl Display) -> Result<Value, CatApiError> {
        let request = self.build_delete_vote(vote_id)?;
        self.parse_delete_vote(self.dispatch(&request)?)
    }

    #[instrument(skip(self))]
    pub fn random_facts(&self, params: &RandomFacts) -> Result<Vec<Fact>, CatApiError> {
        let request = self.build_random_facts(params)?;
        self.parse_facts(self.dispatch(&request)?)
    }

    #[instrument(skip(self))]
    pub fn breed_facts(&self, breed: &str, params: &BreedFacts) -> Result<Vec<Fact>, CatApiError> {
        let request = self.build_breed_facts(breed, params)?;
        self.parse_facts(self.dispatch(&request)?)
    }

    #[instrument(skip(self))]
    pub fn get_version(&self) -> Result<Value, CatApiError> {
        let request = self.build_get_version();
        self.parse_get_version(self.dispatch(&request)?)
    }

    fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, CatApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

fn key_required() -> String {
    format!("You must have an API key to access this method. {SIGNUP_HINT}")
}

/// Map a status outside `accepted` to `CatApiError::Request`.
fn check_status(response: &HttpResponse, accepted: &[u16]) -> Result<(), CatApiError> {
    if accepted.contains(&response.status) {
        return Ok(());
    }
    Err(CatApiError::Request {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode(response: &HttpResponse, accepted: &[u16]) -> Result<Value, CatApiError> {
    check_status(response, accepted)?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| CatApiError::Deserialization(e.to_string()))
}
