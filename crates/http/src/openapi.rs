//! Merges module OpenAPI fragments into one document.

use serde_json::{json, Value};

use shelf_kernel::{settings::ServerSettings, ModuleRegistry};

/// Join a module mount point and a module-relative path.
fn mounted_path(mount: &str, path: &str) -> String {
    if path == "/" {
        mount.to_string()
    } else {
        format!("{}{}", mount, path)
    }
}

/// Build the OpenAPI document for every registered module.
///
/// Each module's `paths` are re-rooted under its mount point and its
/// component schemas are merged into one namespace. Later modules win on
/// schema name clashes.
pub fn merged_openapi(registry: &ModuleRegistry, server: &ServerSettings) -> Value {
    let mut doc = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "SHELF API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Books resource API"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    doc["paths"]["/"] = json!({
        "get": {
            "summary": "Greeting",
            "operationId": "index",
            "responses": {
                "200": {
                    "description": "Greeting message",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": { "message": { "type": "string" } },
                                "required": ["message"]
                            }
                        }
                    }
                }
            }
        }
    });

    doc["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "operationId": "health_check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": {
                                "type": "string"
                            }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };
        let mount = server.module_path(module.name());

        if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                doc["paths"][mounted_path(&mount, path)] = item.clone();
            }
        }

        if let Some(schemas) = fragment
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        {
            for (name, schema) in schemas {
                doc["components"]["schemas"][name] = schema.clone();
            }
        }

        tracing::debug!(module = module.name(), %mount, "merged module OpenAPI fragment");
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_kernel::Module;
    use std::sync::Arc;

    struct Shelf;

    #[async_trait::async_trait]
    impl Module for Shelf {
        fn name(&self) -> &'static str {
            "shelf"
        }

        fn openapi(&self) -> Option<Value> {
            Some(json!({
                "paths": {
                    "/": { "get": { "responses": {} } },
                    "/{id}": { "get": { "responses": {} } }
                },
                "components": { "schemas": { "Shelf": { "type": "object" } } }
            }))
        }
    }

    #[test]
    fn module_paths_are_rerooted() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(Shelf));
        let server = ServerSettings {
            api_prefix: "/api".to_string(),
            ..ServerSettings::default()
        };

        let doc = merged_openapi(&registry, &server);

        assert!(doc["paths"]["/api/shelf"].is_object());
        assert!(doc["paths"]["/api/shelf/{id}"].is_object());
        assert!(doc["paths"]["/healthz"].is_object());
        assert!(doc["components"]["schemas"]["Shelf"].is_object());
    }

    #[test]
    fn document_parses_as_openapi() {
        let doc = merged_openapi(&ModuleRegistry::new(), &ServerSettings::default());
        let parsed: Result<utoipa::openapi::OpenApi, _> = serde_json::from_value(doc);
        assert!(parsed.is_ok());
    }
}
