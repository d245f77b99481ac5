//! Filter, sort, project, and wrap: the shaping steps a service provider
//! runs between its store and a list response.

use scim2_core::filter::{Filter, FilterEvaluator};
use scim2_core::messages::{ListResponse, SearchRequest};
use scim2_core::query::{AttributeProjection, SortSpec, sort_resources};
use scim2_core::SchemaRegistry;
use serde_json::{Value, json};

fn store() -> Vec<Value> {
    vec![
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "0001",
            "userName": "bjensen",
            "userType": "Employee",
            "title": "Tour Guide",
            "password": "t1meMa$heen",
            "meta": {"created": "2010-01-23T04:56:22Z"}
        }),
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "0002",
            "userName": "jsmith",
            "userType": "Intern",
            "title": "Barista",
            "meta": {"created": "2011-08-01T18:29:49Z"}
        }),
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "0003",
            "userName": "ajensen",
            "userType": "Employee",
            "title": "Manager",
            "meta": {"created": "2009-03-09T07:59:45Z"}
        }),
    ]
}

#[test]
fn filtered_sorted_projected_list_response() {
    let registry = SchemaRegistry::new().unwrap();

    let request: SearchRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:SearchRequest"],
        "filter": "userType eq \"Employee\"",
        "sortBy": "meta.created",
        "sortOrder": "descending",
        "attributes": ["userName", "title"]
    }))
    .unwrap();
    request.validate().unwrap();

    // Filter.
    let filter: Filter = request.filter.as_deref().unwrap().parse().unwrap();
    let evaluator = FilterEvaluator::with_registry(&registry);
    let mut matched: Vec<Value> = store()
        .into_iter()
        .filter(|resource| evaluator.matches(&filter, resource))
        .collect();
    assert_eq!(matched.len(), 2);

    // Sort.
    let spec = SortSpec::from_params(request.sort_by.as_deref(), Some("descending"))
        .unwrap()
        .unwrap();
    sort_resources(&mut matched, &spec, Some(&registry));

    // Project.
    let projection =
        AttributeProjection::from_params(Some(&request.attributes.join(",")), None).unwrap();
    let resources: Vec<Value> = matched
        .iter()
        .map(|resource| projection.apply(resource, Some(&registry)))
        .collect();

    let total = resources.len() as u64;
    let response = ListResponse::new(total, resources);
    let wire = serde_json::to_value(&response).unwrap();

    assert_eq!(wire["totalResults"], json!(2));
    // Newest first, trimmed to the requested attributes plus id/schemas.
    assert_eq!(wire["Resources"][0]["userName"], json!("bjensen"));
    assert_eq!(wire["Resources"][1]["userName"], json!("ajensen"));
    assert_eq!(wire["Resources"][0]["id"], json!("0001"));
    assert!(wire["Resources"][0].get("userType").is_none());
    assert!(wire["Resources"][0].get("password").is_none());
    assert!(wire["Resources"][0].get("meta").is_none());
}
