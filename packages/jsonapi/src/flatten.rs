//! # Relationship flattening
//!
//! [`flatten`] turns one JSON:API resource into the plain camelCase object the
//! frontend consumes, replacing every relationship pointer with the resource it
//! points at in `included`:
//!
//! | Referenced resource | Inlined as |
//! |---------------------|-----------|
//! | has relationships of its own | recursively flattened object (carries its `id`) |
//! | has attributes only | `{ id, ...attributes }` |
//! | has neither | the bare id string |
//! | not in `included` | `null` in a to-many slot, `{}` for a to-one |
//!
//! To-one relationships are unwrapped to a single value; to-many relationships
//! are always arrays, one slot per reference.
//!
//! Lookups match on `id` only and take the first hit in `included`. The
//! recursion tracks the ids on the current resolution path; a reference back
//! into that path, or one nested deeper than [`MAX_DEPTH`], is inlined as the
//! bare id string.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use crate::case::{camel_keys, snake_keys, snake_to_camel};
use crate::models::{Document, FlattenedDocument, PrimaryData, RelationshipData, Resource};

/// Deepest level at which a referenced resource is still expanded.
pub const MAX_DEPTH: usize = 32;

/// Flatten `resource`, resolving its relationships against `included`.
///
/// The output carries `id` only when the resource has relationships (or when
/// one of its attributes is literally named `id`).
pub fn flatten<'a>(resource: &'a Resource, included: &'a [Resource]) -> Value {
    let mut path = HashSet::from([resource.id.as_str()]);
    Value::Object(flatten_on_path(resource, included, &mut path))
}

fn flatten_on_path<'a>(
    resource: &'a Resource,
    included: &'a [Resource],
    path: &mut HashSet<&'a str>,
) -> Map<String, Value> {
    let mut out = camel_attributes(resource);

    let Some(relationships) = resource.relationships.as_ref().filter(|r| !r.is_empty()) else {
        return out;
    };

    for (name, relationship) in relationships {
        let value = match &relationship.data {
            None => Value::Null,
            Some(RelationshipData::One(reference)) => {
                resolve(&reference.id, included, path).unwrap_or_else(|| Value::Object(Map::new()))
            }
            Some(RelationshipData::Many(references)) => Value::Array(
                references
                    .iter()
                    .map(|r| resolve(&r.id, included, path).unwrap_or(Value::Null))
                    .collect(),
            ),
        };
        out.insert(snake_to_camel(name), value);
    }

    out.insert("id".to_string(), Value::String(resource.id.clone()));
    out
}

fn resolve<'a>(
    id: &str,
    included: &'a [Resource],
    path: &mut HashSet<&'a str>,
) -> Option<Value> {
    let found = included.iter().find(|r| r.id == id)?;

    if path.contains(found.id.as_str()) {
        return Some(Value::String(found.id.clone()));
    }

    if found.has_relationships() {
        if path.len() >= MAX_DEPTH {
            return Some(Value::String(found.id.clone()));
        }
        path.insert(found.id.as_str());
        let nested = flatten_on_path(found, included, path);
        path.remove(found.id.as_str());
        return Some(Value::Object(nested));
    }

    if found.attributes.is_none() {
        return Some(Value::String(found.id.clone()));
    }

    let mut out = Map::new();
    out.insert("id".to_string(), Value::String(found.id.clone()));
    out.extend(camel_attributes(found));
    Some(Value::Object(out))
}

fn camel_attributes(resource: &Resource) -> Map<String, Value> {
    resource
        .attributes
        .iter()
        .flatten()
        .map(|(k, v)| (snake_to_camel(k), v.clone()))
        .collect()
}

impl Document {
    /// Flatten the primary data (one resource or each of many) against this
    /// document's `included` list.
    pub fn flatten(&self) -> FlattenedDocument {
        let data = match &self.data {
            None => Value::Null,
            Some(PrimaryData::One(resource)) => flatten(resource, &self.included),
            Some(PrimaryData::Many(resources)) => Value::Array(
                resources
                    .iter()
                    .map(|r| flatten(r, &self.included))
                    .collect(),
            ),
        };
        FlattenedDocument {
            data,
            meta: self.meta.as_ref().map(camel_keys),
        }
    }
}

/// Build an outgoing JSON:API request document from camelCase attributes.
pub fn resource_payload(kind: &str, id: Option<&str>, attributes: &Value) -> Value {
    let mut data = json!({
        "type": kind,
        "attributes": snake_keys(attributes),
    });
    if let Some(id) = id {
        data["id"] = Value::String(id.to_string());
    }
    json!({ "data": data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(value: Value) -> Resource {
        serde_json::from_value(value).unwrap()
    }

    fn included(value: Value) -> Vec<Resource> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_attributes_only() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "attributes": { "first_name": "A", "age": 5 }
        }));
        assert_eq!(flatten(&contact, &[]), json!({ "firstName": "A", "age": 5 }));
    }

    #[test]
    fn test_values_pass_through() {
        let donation = resource(json!({
            "id": "d1",
            "type": "donations",
            "attributes": {
                "donation_date": "2019-03-01",
                "amount": 25.5,
                "memo": null,
                "extra_data": { "nested_key": true }
            }
        }));
        assert_eq!(
            flatten(&donation, &[]),
            json!({
                "donationDate": "2019-03-01",
                "amount": 25.5,
                "memo": null,
                "extraData": { "nested_key": true }
            })
        );
    }

    #[test]
    fn test_to_one_relationship() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "attributes": { "name": "C" },
            "relationships": { "owner": { "data": { "id": "x", "type": "users" } } }
        }));
        let side = included(json!([{ "id": "x", "type": "users", "attributes": { "name": "N" } }]));

        assert_eq!(
            flatten(&contact, &side),
            json!({ "id": "c1", "name": "C", "owner": { "id": "x", "name": "N" } })
        );
    }

    #[test]
    fn test_to_many_with_missing_reference() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "attributes": {},
            "relationships": {
                "tags": { "data": [{ "id": "a", "type": "tags" }, { "id": "b", "type": "tags" }] }
            }
        }));
        let side = included(json!([{ "id": "a", "type": "tags", "attributes": { "label": "L" } }]));

        let out = flatten(&contact, &side);
        assert_eq!(out["tags"], json!([{ "id": "a", "label": "L" }, null]));
        assert_eq!(out["tags"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_to_many_single_element_stays_array() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "relationships": { "people": { "data": [{ "id": "p1", "type": "people" }] } }
        }));
        let side = included(json!([{ "id": "p1", "type": "people", "attributes": { "first_name": "Jo" } }]));

        assert_eq!(
            flatten(&contact, &side),
            json!({ "id": "c1", "people": [{ "id": "p1", "firstName": "Jo" }] })
        );
    }

    #[test]
    fn test_to_many_empty_stays_array() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "relationships": { "tags": { "data": [] } }
        }));
        let out = flatten(&contact, &[]);
        assert_eq!(out["tags"], json!([]));
        assert_ne!(out["tags"], json!({}));
    }

    #[test]
    fn test_unresolved_to_one_is_empty_object() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "relationships": { "account_list": { "data": { "id": "gone", "type": "account_lists" } } }
        }));
        assert_eq!(flatten(&contact, &[]), json!({ "id": "c1", "accountList": {} }));
    }

    #[test]
    fn test_reference_without_attributes_is_bare_id() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "relationships": {
                "last_donation": { "data": { "id": "d9", "type": "donations" } },
                "appeals": { "data": [{ "id": "ap1", "type": "appeals" }] }
            }
        }));
        let side = included(json!([
            { "id": "d9", "type": "donations" },
            { "id": "ap1", "type": "appeals" }
        ]));

        assert_eq!(
            flatten(&contact, &side),
            json!({ "id": "c1", "lastDonation": "d9", "appeals": ["ap1"] })
        );
    }

    #[test]
    fn test_null_to_one_relationship() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "relationships": { "primary_person": { "data": null } }
        }));
        assert_eq!(flatten(&contact, &[]), json!({ "id": "c1", "primaryPerson": null }));
    }

    #[test]
    fn test_nested_relationships() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "attributes": { "name": "Doe" },
            "relationships": { "people": { "data": [{ "id": "p1", "type": "people" }] } }
        }));
        let side = included(json!([
            {
                "id": "p1",
                "type": "people",
                "attributes": { "first_name": "Jo" },
                "relationships": {
                    "email_addresses": { "data": [{ "id": "e1", "type": "email_addresses" }] }
                }
            },
            { "id": "e1", "type": "email_addresses", "attributes": { "email": "jo@example.com" } }
        ]));

        assert_eq!(
            flatten(&contact, &side),
            json!({
                "id": "c1",
                "name": "Doe",
                "people": [{
                    "id": "p1",
                    "firstName": "Jo",
                    "emailAddresses": [{ "id": "e1", "email": "jo@example.com" }]
                }]
            })
        );
    }

    #[test]
    fn test_lookup_matches_id_only() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "relationships": { "owner": { "data": { "id": "7", "type": "users" } } }
        }));
        let side = included(json!([
            { "id": "7", "type": "tags", "attributes": { "label": "first" } },
            { "id": "7", "type": "users", "attributes": { "name": "second" } }
        ]));

        assert_eq!(flatten(&contact, &side)["owner"], json!({ "id": "7", "label": "first" }));
    }

    #[test]
    fn test_relationship_cycle_terminates() {
        let person = resource(json!({
            "id": "p1",
            "type": "people",
            "attributes": { "first_name": "Jo" },
            "relationships": { "spouse": { "data": { "id": "p2", "type": "people" } } }
        }));
        let side = included(json!([
            {
                "id": "p2",
                "type": "people",
                "attributes": { "first_name": "Sam" },
                "relationships": { "spouse": { "data": { "id": "p1", "type": "people" } } }
            },
            {
                "id": "p1",
                "type": "people",
                "attributes": { "first_name": "Jo" },
                "relationships": { "spouse": { "data": { "id": "p2", "type": "people" } } }
            }
        ]));

        assert_eq!(
            flatten(&person, &side),
            json!({
                "id": "p1",
                "firstName": "Jo",
                "spouse": { "id": "p2", "firstName": "Sam", "spouse": "p1" }
            })
        );
    }

    #[test]
    fn test_long_chain_stops_at_max_depth() {
        let chain: Vec<Value> = (0..200)
            .map(|i| {
                json!({
                    "id": format!("n{i}"),
                    "type": "nodes",
                    "relationships": { "next": { "data": { "id": format!("n{}", i + 1), "type": "nodes" } } }
                })
            })
            .collect();
        let side = included(Value::Array(chain));

        let out = flatten(&side[0], &side);
        let mut node = &out;
        for i in 1..MAX_DEPTH {
            node = &node["next"];
            assert_eq!(node["id"], json!(format!("n{i}")));
        }
        assert_eq!(node["next"], json!(format!("n{MAX_DEPTH}")));
    }

    #[test]
    fn test_shared_reference_resolves_in_siblings() {
        let contact = resource(json!({
            "id": "c1",
            "type": "contacts",
            "relationships": {
                "people": { "data": [{ "id": "p1", "type": "people" }, { "id": "p2", "type": "people" }] }
            }
        }));
        let side = included(json!([
            {
                "id": "p1",
                "type": "people",
                "relationships": { "family": { "data": { "id": "f1", "type": "families" } } }
            },
            {
                "id": "p2",
                "type": "people",
                "relationships": { "family": { "data": { "id": "f1", "type": "families" } } }
            },
            { "id": "f1", "type": "families", "attributes": { "name": "Doe" } }
        ]));

        let out = flatten(&contact, &side);
        assert_eq!(out["people"][0]["family"], json!({ "id": "f1", "name": "Doe" }));
        assert_eq!(out["people"][1]["family"], json!({ "id": "f1", "name": "Doe" }));
    }

    #[test]
    fn test_flatten_collection_document() {
        let doc = Document::from_value(json!({
            "data": [
                {
                    "id": "c1",
                    "type": "contacts",
                    "attributes": { "name": "A" },
                    "relationships": { "tags": { "data": [{ "id": "t1", "type": "tags" }] } }
                },
                { "id": "c2", "type": "contacts", "attributes": { "name": "B" } }
            ],
            "included": [{ "id": "t1", "type": "tags", "attributes": { "tag_name": "monthly" } }],
            "meta": { "pagination": { "total_count": 2, "per_page": 25 } }
        }))
        .unwrap();

        let flat = doc.flatten();
        assert_eq!(
            flat.data,
            json!([
                { "id": "c1", "name": "A", "tags": [{ "id": "t1", "tagName": "monthly" }] },
                { "name": "B" }
            ])
        );
        assert_eq!(flat.meta, Some(json!({ "pagination": { "totalCount": 2, "perPage": 25 } })));
    }

    #[test]
    fn test_flatten_empty_document() {
        let flat = Document::default().flatten();
        assert_eq!(flat.data, Value::Null);
        assert_eq!(serde_json::to_value(&flat).unwrap(), json!({ "data": null }));
    }

    #[test]
    fn test_resource_payload() {
        let payload = resource_payload(
            "contacts",
            Some("c1"),
            &json!({ "sendNewsletter": "email", "pledgeAmount": 50 }),
        );
        assert_eq!(
            payload,
            json!({
                "data": {
                    "type": "contacts",
                    "id": "c1",
                    "attributes": { "send_newsletter": "email", "pledge_amount": 50 }
                }
            })
        );

        let payload = resource_payload("tags", None, &json!({ "name": "x" }));
        assert!(payload["data"].get("id").is_none());
    }
}
