/// Service-derived UDP/TCP filter generation: for schemas declaring RPC
/// services, the emitter also generates the two entry points a
/// [`pbv_core::filter::Filter`] dispatches through, `filter_udp` and
/// `filter_tcp`.
use pbv_core::Schema;

use crate::error::CodegenError;

/// One RPC method resolved against the schema, ready to become a
/// [`pbv_core::filter::ServiceEntry`].
#[derive(Debug, Clone)]
pub struct ServiceMethodIr {
    pub service_name: String,
    pub method_name: String,
    pub request_type: String,
    pub response_type: String,
}

/// Walks every service in every schema file and resolves its methods'
/// request/response type names, failing if either references a message
/// that does not exist anywhere in the schema.
pub fn lower_services(schema: &Schema) -> Result<Vec<ServiceMethodIr>, CodegenError> {
    let mut methods = Vec::new();
    for file in &schema.files {
        for service in &file.services {
            for method in &service.methods {
                require_message_exists(schema, &file.path, &service.name, &method.request_type)?;
                require_message_exists(schema, &file.path, &service.name, &method.response_type)?;
                methods.push(ServiceMethodIr {
                        service_name: service.name.clone(),
                        method_name: method.name.clone(),
                        request_type: method.request_type.clone(),
                        response_type: method.response_type.clone(),
                });
            }
        }
    }
    Ok(methods)
}

fn require_message_exists(schema: &Schema, file: &str, service: &str, type_name: &str) -> Result<(), CodegenError> {
    if schema.find_message(type_name).is_some() {
        Ok(())
    } else {
        Err(CodegenError::UnknownType {
                file: file.to_string(),
                message: service.to_string(),
                type_name: type_name.to_string(),
        })
    }
}

/// Renders the Rust source constructing the `Vec<pbv_core::filter::ServiceEntry>`
/// a generated `filter_udp`/`filter_tcp` pair is built from, in schema
/// declaration order — dispatch is first-match-wins, so earlier entries
/// take priority over later ones.
pub fn render_service_entries(methods: &[ServiceMethodIr]) -> String {
    let mut source = String::from("vec![\n");
    for method in methods {
        source.push_str(&format!(
                " pbv_core::ServiceEntry {{\n request_type: \"{req}\".to_string(),\n request_validator: validate_{req},\n response_type: \"{resp}\".to_string(),\n response_validator: validate_{resp},\n }}, // {svc}::{m}\n",
                req = method.request_type,
                resp = method.response_type,
                svc = method.service_name,
                m = method.method_name,
        ));
    }
    source.push(']');
    source
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use pbv_core::{Message, Method, SchemaFile, Service};

    fn schema_with_service() -> Schema {
        let request = Message::new("LoginRequest", vec![], vec![], vec![]).unwrap();
        let response = Message::new("LoginResponse", vec![], vec![], vec![]).unwrap();
        let service = Service {
            name: "Auth".to_string(),
            methods: vec![Method {
                    name: "Login".to_string(),
                    request_type: "LoginRequest".to_string(),
                    response_type: "LoginResponse".to_string(),
            }],
        };
        let file = SchemaFile {
            path: "auth.proto".to_string(),
            package: "pkg".to_string(),
            messages: vec![request, response],
            enums: vec![],
            services: vec![service],
            imports: vec![],
        };
        Schema { files: vec![file] }
    }

    #[test]
    fn lower_services_resolves_request_and_response_types() {
        let schema = schema_with_service();
        let methods = lower_services(&schema).unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].request_type, "LoginRequest");
        assert_eq!(methods[0].response_type, "LoginResponse");
    }

    #[test]
    fn lower_services_rejects_unresolvable_method_type() {
        let mut schema = schema_with_service();
        schema.files[0].services[0].methods[0].response_type = "Nonexistent".to_string();
        assert!(lower_services(&schema).is_err());
    }

    #[test]
    fn render_service_entries_preserves_declaration_order() {
        let methods = vec![
            ServiceMethodIr {
                service_name: "Auth".to_string(),
                method_name: "Login".to_string(),
                request_type: "LoginRequest".to_string(),
                response_type: "LoginResponse".to_string(),
            },
            ServiceMethodIr {
                service_name: "Auth".to_string(),
                method_name: "Logout".to_string(),
                request_type: "LogoutRequest".to_string(),
                response_type: "LogoutResponse".to_string(),
            },
        ];
        let rendered = render_service_entries(&methods);
        let login_pos = rendered.find("LoginRequest").unwrap();
        let logout_pos = rendered.find("LogoutRequest").unwrap();
        assert!(login_pos < logout_pos);
    }
}
