//! Conversion from decoded JSON into domain records.
//!
//! # Design
//! The client decodes every success body into a `serde_json::Value` first and
//! hands it here. Keeping the mapping separate from the HTTP layer means the
//! image/breed split below can be tested against raw payloads without
//! building responses.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CatApiError;
use crate::types::{Breed, BreedInfo, Cat, Fact, Image, Vote};

/// Map an `images/search` payload into cats.
///
/// The `breeds` key is taken out of each element before the image is mapped.
/// A missing, null, or empty `breeds` value yields `BreedInfo::None`; an
/// array yields `BreedInfo::Many` even with a single entry; a bare object
/// yields `BreedInfo::One`.
pub fn map_image_list(raw: Value) -> Result<Vec<Cat>, CatApiError> {
    let Value::Array(elements) = raw else {
        return Err(unexpected_shape("array of images", &raw));
    };
    elements.into_iter().map(map_cat).collect()
}

fn map_cat(element: Value) -> Result<Cat, CatApiError> {
    let Value::Object(mut fields) = element else {
        return Err(unexpected_shape("image object", &element));
    };
    let breed_info = match fields.remove("breeds") {
        None | Some(Value::Null) => BreedInfo::None,
        Some(Value::Array(breeds)) if breeds.is_empty() => BreedInfo::None,
        Some(breeds @ Value::Array(_)) => BreedInfo::Many(map_breed_list(breeds)?),
        Some(breed @ Value::Object(_)) => BreedInfo::One(map_breed(breed)?),
        Some(other) => return Err(unexpected_shape("breed list or object", &other)),
    };
    Ok(Cat {
        image_info: map_image(Value::Object(fields))?,
        breed_info,
    })
}

pub fn map_breed_list(raw: Value) -> Result<Vec<Breed>, CatApiError> {
    map_list(raw, "array of breeds")
}

pub fn map_image(raw: Value) -> Result<Image, CatApiError> {
    map_record(raw)
}

pub fn map_breed(raw: Value) -> Result<Breed, CatApiError> {
    map_record(raw)
}

/// Map a plain list of images, as returned by `GET images`.
pub fn map_image_records(raw: Value) -> Result<Vec<Image>, CatApiError> {
    map_list(raw, "array of images")
}

pub fn map_vote(raw: Value) -> Result<Vote, CatApiError> {
    map_record(raw)
}

pub fn map_vote_list(raw: Value) -> Result<Vec<Vote>, CatApiError> {
    map_list(raw, "array of votes")
}

pub fn map_fact_list(raw: Value) -> Result<Vec<Fact>, CatApiError> {
    map_list(raw, "array of facts")
}

fn map_record<T: DeserializeOwned>(raw: Value) -> Result<T, CatApiError> {
    serde_json::from_value(raw).map_err(|e| CatApiError::Deserialization(e.to_string()))
}

fn map_list<T: DeserializeOwned>(raw: Value, expected: &str) -> Result<Vec<T>, CatApiError> {
    let Value::Array(elements) = raw else {
        return Err(unexpected_shape(expected, &raw));
    };
    elements.into_iter().map(map_record).collect()
}

fn unexpected_shape(expected: &str, found: &Value) -> CatApiError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    CatApiError::Deserialization(format!("expected {expected}, found {found}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Weight;

    fn bengal() -> Value {
        json!({
            "weight": {"imperial": "6 - 12", "metric": "3 - 7"},
            "id": "beng",
            "name": "Bengal",
            "origin": "United States",
            "temperament": "Alert, Agile, Energetic, Demanding, Intelligent",
            "adaptability": 5,
            "lap": 0,
            "hypoallergenic": 1,
            "reference_image_id": "O3btzLlsO"
        })
    }

    #[test]
    fn image_list_without_breeds_key() {
        let cats = map_image_list(json!([
            {"id": "a1", "url": "https://cdn/a1.jpg", "width": 640, "height": 480}
        ]))
        .unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].image_info.id.as_deref(), Some("a1"));
        assert_eq!(cats[0].image_info.width, Some(640));
        assert!(cats[0].breed_info.is_none());
    }

    #[test]
    fn empty_breeds_array_is_no_breed() {
        let cats = map_image_list(json!([{"id": "a1", "breeds": []}])).unwrap();
        assert_eq!(cats[0].breed_info, BreedInfo::None);
        assert_eq!(cats[0].breed_info.len(), 0);
    }

    #[test]
    fn null_breeds_is_no_breed() {
        let cats = map_image_list(json!([{"id": "a1", "breeds": null}])).unwrap();
        assert!(cats[0].breed_info.is_none());
    }

    #[test]
    fn single_element_breed_array_stays_a_list() {
        let cats = map_image_list(json!([{"id": "a1", "breeds": [bengal()]}])).unwrap();
        match &cats[0].breed_info {
            BreedInfo::Many(breeds) => {
                assert_eq!(breeds.len(), 1);
                assert_eq!(breeds[0].name.as_deref(), Some("Bengal"));
            }
            other => panic!("expected Many, got {other:?}"),
        }
    }

    #[test]
    fn breed_object_maps_to_one() {
        let cats = map_image_list(json!([{"id": "a1", "breeds": bengal()}])).unwrap();
        assert!(matches!(&cats[0].breed_info, BreedInfo::One(b) if b.id.as_deref() == Some("beng")));
    }

    #[test]
    fn breeds_key_does_not_leak_into_image() {
        let cats = map_image_list(json!([{"id": "a1", "url": "u", "breeds": [bengal()]}])).unwrap();
        assert_eq!(
            cats[0].image_info,
            Image {
                id: Some("a1".to_string()),
                url: Some("u".to_string()),
                width: None,
                height: None,
            }
        );
    }

    #[test]
    fn breeds_of_wrong_type_is_rejected() {
        let err = map_image_list(json!([{"id": "a1", "breeds": "beng"}])).unwrap_err();
        assert!(matches!(err, CatApiError::Deserialization(_)));
    }

    #[test]
    fn missing_known_fields_map_to_none() {
        let breed = map_breed(json!({"id": "abys"})).unwrap();
        assert_eq!(
            breed,
            Breed {
                id: Some("abys".to_string()),
                ..Breed::default()
            }
        );
        assert_eq!(map_image(json!({})).unwrap(), Image::default());
        assert_eq!(map_vote(json!({})).unwrap(), Vote::default());
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let image = map_image(json!({"id": "x", "mime_type": "image/png", "categories": []})).unwrap();
        assert_eq!(image.id.as_deref(), Some("x"));
    }

    #[test]
    fn wrong_field_type_is_a_deserialization_error() {
        let err = map_breed(json!({"adaptability": "high"})).unwrap_err();
        assert!(matches!(err, CatApiError::Deserialization(_)));
    }

    #[test]
    fn breed_roundtrips_through_json() {
        let breed = Breed {
            weight: Some(Weight {
                imperial: Some("7 - 10".to_string()),
                metric: Some("3 - 5".to_string()),
            }),
            id: Some("abys".to_string()),
            name: Some("Abyssinian".to_string()),
            indoor: Some(0),
            energy_level: Some(5),
            wikipedia_url: Some("https://en.wikipedia.org/wiki/Abyssinian_(cat)".to_string()),
            ..Breed::default()
        };
        let raw = serde_json::to_value(&breed).unwrap();
        assert_eq!(map_breed(raw).unwrap(), breed);
    }

    #[test]
    fn empty_breed_list_is_empty() {
        assert!(map_breed_list(json!([])).unwrap().is_empty());
    }

    #[test]
    fn list_mapper_rejects_object() {
        let err = map_breed_list(json!({"message": "oops"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "deserialization failed: expected array of breeds, found object"
        );
    }

    #[test]
    fn fact_list_maps_each_fact() {
        let facts = map_fact_list(json!([
            {"id": "f1", "fact": "Cats sleep a lot.", "breed_id": "beng"},
            {"id": "f2", "title": "Whiskers"}
        ]))
        .unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].breed_id.as_deref(), Some("beng"));
        assert!(facts[1].fact.is_none());
    }
}
