//! Protobuf messages and gRPC client stubs of the secret manager API.
//!
//! The modules bind the `csm.v1` and `csm.v2` packages defined under `proto/`.
//! They follow the layout `tonic-prost-build` emits but are maintained by hand,
//! so building the workspace does not need `protoc`. The tests below check
//! every message field, tag and rpc against the proto files.

#[allow(clippy::doc_lazy_continuation, clippy::large_enum_variant)]
pub mod v1;
#[allow(clippy::doc_lazy_continuation, clippy::large_enum_variant)]
pub mod v2;

pub use v1::secret_manager_service_client::SecretManagerServiceClient;
pub use v2::folder_service_client::FolderServiceClient;
pub use v2::secret_service_client::SecretServiceClient;

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use prost::Message;

    const V1_PROTO: &str = include_str!("../proto/csm/v1/secret_manager.proto");
    const V2_FOLDER_PROTO: &str = include_str!("../proto/csm/v2/folder.proto");
    const V2_SECRET_PROTO: &str = include_str!("../proto/csm/v2/secret.proto");
    const V1_RS: &str = include_str!("v1.rs");
    const V2_RS: &str = include_str!("v2.rs");

    type Field = (String, String, String);

    /// `(message, field, tag)` of every message field declared in `proto`.
    fn proto_fields(proto: &str) -> BTreeSet<Field> {
        let mut fields = BTreeSet::new();
        let mut message: Option<String> = None;
        for line in proto.lines().map(str::trim) {
            if line.starts_with("//") {
                continue;
            }
            if let Some(rest) = line.strip_prefix("message ") {
                message = Some(rest.trim_end_matches(['{', '}', ' ']).to_string());
            } else if line.starts_with("enum ") || line == "}" {
                message = None;
            } else if let (Some(name), Some((decl, tag))) = (&message, line.split_once(" = ")) {
                let field = decl.split_whitespace().last().unwrap_or_default();
                fields.insert((name.clone(), field.to_string(), tag.trim_end_matches(';').to_string()));
            }
        }
        fields
    }

    /// `(struct, field, tag)` of every prost field in a bindings source file.
    fn binding_fields(source: &str) -> BTreeSet<Field> {
        let mut fields = BTreeSet::new();
        let mut message: Option<String> = None;
        let mut tag: Option<String> = None;
        for line in source.lines() {
            if let Some(rest) = line.strip_prefix("pub struct ") {
                message = Some(rest.trim_end_matches(['{', '}', ' ']).to_string());
            } else if line.starts_with('}') || line.starts_with("pub ") || line.starts_with("impl") {
                message = None;
            } else if let Some(name) = &message {
                let line = line.trim();
                if let Some(attr) = line.strip_prefix("#[prost(") {
                    tag = attr
                        .split("tag = \"")
                        .nth(1)
                        .and_then(|rest| rest.split('"').next())
                        .map(str::to_string);
                } else if let Some(field) = line.strip_prefix("pub ").and_then(|rest| rest.split(':').next()) {
                    if let Some(tag) = tag.take() {
                        fields.insert((name.clone(), field.to_string(), tag));
                    }
                }
            }
        }
        fields
    }

    /// Request paths of every rpc declared in `proto`.
    fn rpc_paths(proto: &str) -> Vec<String> {
        let package = proto
            .lines()
            .find_map(|line| line.strip_prefix("package "))
            .map(|package| package.trim_end_matches(';'))
            .unwrap();

        let mut service = "";
        let mut paths = Vec::new();
        for line in proto.lines().map(str::trim) {
            if let Some(rest) = line.strip_prefix("service ") {
                service = rest.trim_end_matches('{').trim();
            } else if let Some(rest) = line.strip_prefix("rpc ") {
                let method = rest.split('(').next().unwrap();
                paths.push(format!("/{package}.{service}/{method}"));
            }
        }
        paths
    }

    /// `(name, number)` of every enum value declared in `proto`.
    fn enum_values(proto: &str) -> Vec<(String, i32)> {
        proto
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("SECRET_"))
            .filter_map(|line| line.split_once(" = "))
            .map(|(name, number)| (name.to_string(), number.trim_end_matches(';').parse().unwrap()))
            .collect()
    }

    fn assert_paths_bound(paths: &[String], source: &str) {
        for path in paths {
            assert!(
                source.contains(&format!("\"{path}\"")),
                "no client method for {path}"
            );
        }
        assert_eq!(source.matches("PathAndQuery::from_static").count(), paths.len());
    }

    #[test]
    fn test_v1_messages_match_proto() {
        let expected = proto_fields(V1_PROTO);
        assert!(!expected.is_empty());
        assert_eq!(binding_fields(V1_RS), expected);
    }

    #[test]
    fn test_v2_messages_match_proto() {
        let mut expected = proto_fields(V2_FOLDER_PROTO);
        expected.extend(proto_fields(V2_SECRET_PROTO));
        assert!(!expected.is_empty());
        assert_eq!(binding_fields(V2_RS), expected);
    }

    #[test]
    fn test_v1_client_covers_every_rpc() {
        let paths = rpc_paths(V1_PROTO);
        assert_eq!(paths.len(), 6);
        assert_paths_bound(&paths, V1_RS);
    }

    #[test]
    fn test_v2_clients_cover_every_rpc() {
        let mut paths = rpc_paths(V2_FOLDER_PROTO);
        paths.extend(rpc_paths(V2_SECRET_PROTO));
        assert_eq!(paths.len(), 11);
        assert_paths_bound(&paths, V2_RS);
    }

    #[test]
    fn test_enum_names_match_proto() {
        for (name, number) in enum_values(V1_PROTO) {
            let value = crate::v1::SecretVersionState::from_str_name(&name);
            assert_eq!(value.map(|v| v as i32), Some(number), "{name}");
        }
        for (name, number) in enum_values(V2_SECRET_PROTO) {
            let value = crate::v2::SecretState::from_str_name(&name);
            assert_eq!(value.map(|v| v as i32), Some(number), "{name}");
        }
    }

    #[test]
    fn test_access_request_wire_format() {
        let request = crate::v2::AccessSecretVersionRequest {
            secret_id: "db".to_string(),
            version: 3,
        };
        // field 1 length-delimited, field 2 varint
        assert_eq!(request.encode_to_vec(), vec![0x0a, 2, b'd', b'b', 0x10, 3]);
    }
}
