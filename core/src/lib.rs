//! Synchronous client for the cat image and breed directory API.
//!
//! # Overview
//! Turns method calls into `HttpRequest` values, runs them through a
//! `Transport` (ureq by default), applies each endpoint's status policy and
//! maps the JSON bodies into typed records.
//!
//! # Design
//! - `CatApiClient` holds an immutable `ClientConfig` (base URL, optional
//!   API key, key tier, timeout) and a transport. No other state.
//! - Each operation is split into `build_*` (credential check, request) and
//!   `parse_*` (status check, mapping), with a facade method doing one
//!   round-trip in between. Nothing is retried.
//! - Records have all-optional fields; the polymorphic breed data on images
//!   is the `BreedInfo` enum.
//!
//! ```no_run
//! use catapi_core::{CatApiClient, FetchImages};
//!
//! let client = CatApiClient::new(None);
//! for cat in client.fetch_images(&FetchImages::default().limit(5))? {
//!     println!("{:?}", cat.image_info.url);
//! }
//! # Ok::<(), catapi_core::CatApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mapper;
pub mod params;
pub mod transport;
pub mod types;

pub use client::{CatApiClient, API_KEY_HEADER};
pub use config::{ClientConfig, KeyTier};
pub use error::{CatApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, QueryParams, RequestBody};
pub use params::{BreedFacts, FetchImages, ImageFormat, ListUploadedImages, ListVotes, Order, RandomFacts};
pub use transport::{Transport, UreqTransport};
pub use types::{Breed, BreedInfo, Cat, Fact, Image, NewVote, Vote, Weight};
