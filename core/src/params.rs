//! Query parameters for the list-style operations.
//!
//! Each struct enumerates exactly the parameters its endpoint accepts, with
//! the service's defaults. `Option` fields are left out of the query string
//! when unset; plain fields are always sent.

use std::fmt;

use crate::http::QueryParams;

/// Result ordering understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Rand,
    Asc,
    Desc,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::Rand => "RAND",
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        })
    }
}

/// Response format for `GET images`. `Src` makes the service redirect to the
/// image itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Json,
    Src,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Json => "json",
            ImageFormat::Src => "src",
        })
    }
}

/// Parameters for `GET images/search`.
///
/// Without an API key the service serves at most 10 images and ignores
/// breed filtering, so `limit > 10` or `has_breeds` needs a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchImages {
    pub limit: u32,
    pub page: u32,
    pub order: Order,
    pub has_breeds: bool,
    /// Comma separated breed ids.
    pub breed_ids: Option<String>,
    pub sub_id: Option<String>,
}

impl Default for FetchImages {
    fn default() -> Self {
        Self {
            limit: 1,
            page: 0,
            order: Order::Rand,
            has_breeds: false,
            breed_ids: None,
            sub_id: None,
        }
    }
}

impl FetchImages {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn has_breeds(mut self, has_breeds: bool) -> Self {
        self.has_breeds = has_breeds;
        self
    }

    pub fn breed_ids(mut self, breed_ids: impl Into<String>) -> Self {
        self.breed_ids = Some(breed_ids.into());
        self
    }

    pub fn sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }

    pub(crate) fn requires_api_key(&self) -> bool {
        self.limit > 10 || self.has_breeds
    }

    pub(crate) fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push("limit", self.limit)
            .push("page", self.page)
            .push("order", self.order)
            .push("has_breeds", self.has_breeds)
            .push_opt("breed_ids", self.breed_ids.as_deref())
            .push_opt("sub_id", self.sub_id.as_deref())
    }
}

/// Parameters for `GET images`, the caller's own uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListUploadedImages {
    pub limit: u32,
    pub page: u32,
    pub order: Order,
    pub sub_id: Option<String>,
    pub breed_ids: Option<String>,
    pub category_ids: Option<String>,
    pub format: ImageFormat,
    pub original_filename: Option<String>,
    pub user_id: Option<String>,
}

impl Default for ListUploadedImages {
    fn default() -> Self {
        Self {
            limit: 10,
            page: 0,
            order: Order::Desc,
            sub_id: None,
            breed_ids: None,
            category_ids: None,
            format: ImageFormat::Json,
            original_filename: None,
            user_id: None,
        }
    }
}

impl ListUploadedImages {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }

    pub fn original_filename(mut self, original_filename: impl Into<String>) -> Self {
        self.original_filename = Some(original_filename.into());
        self
    }

    pub(crate) fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push("limit", self.limit)
            .push("page", self.page)
            .push("order", self.order)
            .push_opt("sub_id", self.sub_id.as_deref())
            .push_opt("breed_ids", self.breed_ids.as_deref())
            .push_opt("category_ids", self.category_ids.as_deref())
            .push("format", self.format)
            .push_opt("original_filename", self.original_filename.as_deref())
            .push_opt("user_id", self.user_id.as_deref())
    }
}

/// Parameters for `GET votes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListVotes {
    /// Embed the voted image in each vote.
    pub attach_image: bool,
    pub sub_id: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub order: Order,
}

impl Default for ListVotes {
    fn default() -> Self {
        Self {
            attach_image: false,
            sub_id: None,
            page: 0,
            limit: 100,
            order: Order::Asc,
        }
    }
}

impl ListVotes {
    pub fn attach_image(mut self, attach_image: bool) -> Self {
        self.attach_image = attach_image;
        self
    }

    pub fn sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn to_query(&self) -> QueryParams {
        // The service reads attach_image as 0/1.
        QueryParams::new()
            .push("attach_image", u8::from(self.attach_image))
            .push_opt("sub_id", self.sub_id.as_deref())
            .push("page", self.page)
            .push("limit", self.limit)
            .push("order", self.order)
    }
}

/// Parameters for `GET facts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomFacts {
    pub page: u32,
    pub limit: u32,
    pub order: Order,
}

impl Default for RandomFacts {
    fn default() -> Self {
        Self {
            page: 0,
            limit: 1,
            order: Order::Rand,
        }
    }
}

impl RandomFacts {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push("page", self.page)
            .push("limit", self.limit)
            .push("order", self.order)
    }
}

/// Parameters for `GET breeds/{breed}/facts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedFacts {
    pub limit: u32,
    pub page: u32,
    pub order: Order,
}

impl Default for BreedFacts {
    fn default() -> Self {
        Self {
            limit: 1,
            page: 0,
            order: Order::Asc,
        }
    }
}

impl BreedFacts {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .push("limit", self.limit)
            .push("page", self.page)
            .push("order", self.order)
    }
}
