// src/handlers/schema.rs
// DOCUMENTATION: OpenAPI document for the v1 API
// PURPOSE: Machine-readable description of every route, served as JSON

use actix_web::{web, HttpResponse, Responder};
use serde_json::{json, Map, Value};

/// (path, method, tag, summary, success status)
const OPERATIONS: &[(&str, &str, &str, &str, &str)] = &[
    ("/api/v1/auth/signup/", "post", "auth", "Register and receive a confirmation code by mail", "200"),
    ("/api/v1/auth/token/", "post", "auth", "Exchange a confirmation code for an access token", "200"),
    ("/api/v1/categories/", "get", "categories", "List categories", "200"),
    ("/api/v1/categories/", "post", "categories", "Create a category", "201"),
    ("/api/v1/categories/{slug}/", "delete", "categories", "Delete a category", "204"),
    ("/api/v1/genres/", "get", "genres", "List genres", "200"),
    ("/api/v1/genres/", "post", "genres", "Create a genre", "201"),
    ("/api/v1/genres/{slug}/", "delete", "genres", "Delete a genre", "204"),
    ("/api/v1/titles/", "get", "titles", "List titles", "200"),
    ("/api/v1/titles/", "post", "titles", "Create a title", "201"),
    ("/api/v1/titles/{title_id}/", "get", "titles", "Retrieve a title", "200"),
    ("/api/v1/titles/{title_id}/", "patch", "titles", "Update a title", "200"),
    ("/api/v1/titles/{title_id}/", "delete", "titles", "Delete a title", "204"),
    ("/api/v1/titles/{title_id}/reviews/", "get", "reviews", "List reviews of a title", "200"),
    ("/api/v1/titles/{title_id}/reviews/", "post", "reviews", "Review a title", "201"),
    ("/api/v1/titles/{title_id}/reviews/{review_id}/", "get", "reviews", "Retrieve a review", "200"),
    ("/api/v1/titles/{title_id}/reviews/{review_id}/", "patch", "reviews", "Update a review", "200"),
    ("/api/v1/titles/{title_id}/reviews/{review_id}/", "delete", "reviews", "Delete a review", "204"),
    ("/api/v1/titles/{title_id}/reviews/{review_id}/comments/", "get", "comments", "List comments of a review", "200"),
    ("/api/v1/titles/{title_id}/reviews/{review_id}/comments/", "post", "comments", "Comment on a review", "201"),
    ("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/", "get", "comments", "Retrieve a comment", "200"),
    ("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/", "patch", "comments", "Update a comment", "200"),
    ("/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/", "delete", "comments", "Delete a comment", "204"),
    ("/api/v1/users/", "get", "users", "List users", "200"),
    ("/api/v1/users/", "post", "users", "Create a user", "201"),
    ("/api/v1/users/me/", "get", "users", "Retrieve the current user", "200"),
    ("/api/v1/users/me/", "patch", "users", "Update the current user", "200"),
    ("/api/v1/users/{username}/", "get", "users", "Retrieve a user", "200"),
    ("/api/v1/users/{username}/", "patch", "users", "Update a user", "200"),
    ("/api/v1/users/{username}/", "delete", "users", "Delete a user", "204"),
];

/// Path parameters named in `{...}` segments
fn path_parameters(path: &str) -> Vec<Value> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .map(|name| {
            let schema = if name.ends_with("_id") {
                json!({ "type": "integer" })
            } else {
                json!({ "type": "string" })
            };
            json!({ "name": name, "in": "path", "required": true, "schema": schema })
        })
        .collect()
}

/// Build the OpenAPI 3 document
pub fn openapi_document() -> Value {
    let mut paths = Map::new();

    for (path, method, tag, summary, status) in OPERATIONS {
        let mut operation = json!({
            "tags": [tag],
            "summary": summary,
            "responses": { status.to_string(): { "description": "Success" } }
        });

        let mut parameters = path_parameters(path);
        if *method == "get" && is_collection(path) {
            parameters.push(page_parameter());
        }
        if !parameters.is_empty() {
            operation["parameters"] = Value::Array(parameters);
        }
        if *tag != "auth" {
            operation["security"] = json!([{ "jwtAuth": [] }]);
        }

        let entry = paths
            .entry(path.to_string())
            .or_insert_with(|| json!({}));
        entry[*method] = operation;
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "YaMDb API",
            "version": "v1",
            "description": "Reviews of titles: books, films and music"
        },
        "paths": paths,
        "components": {
            "securitySchemes": {
                "jwtAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
            }
        }
    })
}

/// List routes end in a plural resource name rather than a parameter
fn is_collection(path: &str) -> bool {
    !path.ends_with("}/") && !path.ends_with("/me/")
}

fn page_parameter() -> Value {
    json!({ "name": "page", "in": "query", "required": false, "schema": { "type": "integer" } })
}

/// GET /api/schema/
pub async fn schema() -> impl Responder {
    HttpResponse::Ok().json(openapi_document())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/schema/", web::get().to(schema));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_header() {
        let doc = openapi_document();
        assert_eq!(doc["info"]["title"], "YaMDb API");
        assert_eq!(doc["info"]["version"], "v1");
        assert!(doc["openapi"].as_str().unwrap().starts_with("3."));
    }

    #[test]
    fn test_every_operation_is_described() {
        let doc = openapi_document();
        for (path, method, _, _, status) in OPERATIONS {
            let op = &doc["paths"][*path][*method];
            assert!(op.is_object(), "missing {} {}", method, path);
            assert!(op["responses"][*status].is_object());
        }
    }

    #[test]
    fn test_path_parameters_typed() {
        let params = path_parameters("/api/v1/titles/{title_id}/reviews/{review_id}/");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0]["name"], "title_id");
        assert_eq!(params[0]["schema"]["type"], "integer");

        let slug = path_parameters("/api/v1/genres/{slug}/");
        assert_eq!(slug[0]["schema"]["type"], "string");
    }

    #[test]
    fn test_list_endpoints_are_paginated() {
        let doc = openapi_document();
        let params = doc["paths"]["/api/v1/titles/"]["get"]["parameters"]
            .as_array()
            .unwrap();
        assert!(params.iter().any(|p| p["name"] == "page"));
    }
}
