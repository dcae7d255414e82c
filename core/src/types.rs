//! Domain records for the cat API.
//!
//! # Design
//! Every field is an `Option` because the service omits keys freely: a breed
//! without a `cfa_url`, an image without dimensions. Serde fills missing keys
//! with `None` and drops unknown ones, so mapping only fails when a present
//! value has the wrong JSON type. The derives are generated at compile time;
//! nothing here inspects field names at runtime.

use std::slice;

use serde::{Deserialize, Serialize};

/// An image hosted by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    pub id: Option<String>,
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Weight range of a breed, as free text (`"7 - 10"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Weight {
    pub imperial: Option<String>,
    pub metric: Option<String>,
}

/// A breed descriptor. Trait scores are 0-5 and flags are 0/1, both kept as
/// the integers the service sends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Breed {
    pub weight: Option<Weight>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub cfa_url: Option<String>,
    pub vetstreet_url: Option<String>,
    pub vcahospitals_url: Option<String>,
    pub temperament: Option<String>,
    pub origin: Option<String>,
    pub country_codes: Option<String>,
    pub country_code: Option<String>,
    pub description: Option<String>,
    pub life_span: Option<String>,
    pub indoor: Option<i64>,
    pub lap: Option<i64>,
    pub alt_names: Option<String>,
    pub adaptability: Option<i64>,
    pub affection_level: Option<i64>,
    pub child_friendly: Option<i64>,
    pub dog_friendly: Option<i64>,
    pub energy_level: Option<i64>,
    pub grooming: Option<i64>,
    pub health_issues: Option<i64>,
    pub intelligence: Option<i64>,
    pub shedding_level: Option<i64>,
    pub social_needs: Option<i64>,
    pub stranger_friendly: Option<i64>,
    pub vocalisation: Option<i64>,
    pub experimental: Option<i64>,
    pub hairless: Option<i64>,
    pub natural: Option<i64>,
    pub rare: Option<i64>,
    pub rex: Option<i64>,
    pub suppressed_tail: Option<i64>,
    pub short_legs: Option<i64>,
    pub wikipedia_url: Option<String>,
    pub hypoallergenic: Option<i64>,
    pub reference_image_id: Option<String>,
}

/// Breed data attached to an image.
///
/// Depending on the endpoint the service sends no breed data, a single breed
/// object, or a list. The list case is kept as a list even when it holds one
/// element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BreedInfo {
    #[default]
    None,
    One(Breed),
    Many(Vec<Breed>),
}

impl BreedInfo {
    pub fn is_none(&self) -> bool {
        matches!(self, BreedInfo::None)
    }

    /// All breeds as a slice, empty for `None`.
    pub fn as_slice(&self) -> &[Breed] {
        match self {
            BreedInfo::None => &[],
            BreedInfo::One(breed) => slice::from_ref(breed),
            BreedInfo::Many(breeds) => breeds,
        }
    }

    pub fn first(&self) -> Option<&Breed> {
        self.as_slice().first()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn iter(&self) -> slice::Iter<'_, Breed> {
        self.as_slice().iter()
    }
}

impl<'a> IntoIterator for &'a BreedInfo {
    type Item = &'a Breed;
    type IntoIter = slice::Iter<'a, Breed>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An image together with whatever breed data came with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cat {
    pub image_info: Image,
    pub breed_info: BreedInfo,
}

/// A vote cast on an image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub id: Option<i64>,
    pub image_id: Option<String>,
    pub sub_id: Option<String>,
    pub value: Option<i64>,
    pub created_at: Option<String>,
    pub image: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A cat fact. Premium keys only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    pub id: Option<String>,
    pub fact: Option<String>,
    pub breed_id: Option<String>,
    pub title: Option<String>,
}

/// Request payload for casting a vote. `value` is passed through unchecked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVote {
    pub image_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    pub value: i64,
}
