//! Fixtures shared by the editor integration tests.
#![allow(dead_code)]

use bootprops_metadata::{
    BeanProperty, Deprecation, MetadataIndex, PropertyMetadata, TypeRegistry,
};

/// Cursor marker in test documents.
pub const CURSOR: &str = "<*>";

/// Remove the cursor marker, returning the text and the cursor offset.
pub fn split_cursor(marked: &str) -> (String, usize) {
    let offset = marked.find(CURSOR).expect("test text has a cursor marker");
    (marked.replacen(CURSOR, "", 1), offset)
}

/// Insert the cursor marker at `offset`.
pub fn mark_cursor(text: &str, offset: usize) -> String {
    format!("{}{CURSOR}{}", &text[..offset], &text[offset..])
}

/// Index from `(path, type)` pairs.
pub fn index_of(entries: &[(&str, &str)]) -> MetadataIndex {
    entries
        .iter()
        .map(|(path, ty)| PropertyMetadata::new(*path, *ty, format!("Property {path}")))
        .collect()
}

/// A small slice of a web application's configuration properties.
pub fn default_index() -> MetadataIndex {
    let mut context_path = PropertyMetadata::new(
        "server.context-path",
        "java.lang.String",
        "Context path of the application.",
    );
    context_path.deprecation = Some(Deprecation {
        reason: None,
        replacement: Some("server.servlet.context-path".into()),
    });

    let login_timeout = |method: &str| {
        let mut property = PropertyMetadata::new(
            "spring.datasource.login-timeout",
            "java.lang.Integer",
            "Login timeout in seconds.",
        )
        .with_source_type("org.acme.jdbc.DataSourceConfigMetadata");
        property.source_method = Some(method.to_string());
        property
    };

    MetadataIndex::new()
        .with(
            PropertyMetadata::new("server.port", "java.lang.Integer", "Server HTTP port.")
                .with_source_type("org.acme.web.ServerProperties"),
        )
        .with(
            PropertyMetadata::new(
                "server.address",
                "java.lang.String",
                "Network address to which the server should bind.",
            )
            .with_default("localhost"),
        )
        .with(PropertyMetadata::new(
            "server.servlet-path",
            "java.lang.String",
            "Path of the main dispatcher servlet.",
        ))
        .with(context_path)
        .with(PropertyMetadata::new(
            "spring.application.name",
            "java.lang.String",
            "Application name.",
        ))
        .with(PropertyMetadata::new(
            "spring.activemq.broker-url",
            "java.lang.String",
            "URL of the ActiveMQ broker.",
        ))
        .with(
            PropertyMetadata::new(
                "spring.aop.auto",
                "java.lang.Boolean",
                "Add @EnableAspectJAutoProxy.",
            )
            .with_default(true),
        )
        .with(PropertyMetadata::new(
            "spring.aop.proxy-target-class",
            "java.lang.Boolean",
            "Whether subclass-based proxies are to be created.",
        ))
        .with(login_timeout("hikariDataSource()"))
        .with(login_timeout("tomcatDataSource()"))
        .with(login_timeout("dbcpDataSource()"))
        .with(
            PropertyMetadata::new(
                "flyway.init-sqls",
                "java.util.List<java.lang.String>",
                "SQL statements to execute to initialize a connection.",
            )
            .with_source_type("org.acme.flyway.FlywayProperties"),
        )
        .with(PropertyMetadata::new(
            "liquibase.enabled",
            "java.lang.Boolean",
            "Enable liquibase support.",
        ))
        .with(PropertyMetadata::new(
            "logging.level",
            "java.util.Map<java.lang.String,java.lang.Object>",
            "Log levels severity mapping.",
        ))
}

/// The `demo.Color` enum and the `demo.Foo` bean.
pub fn demo_types() -> TypeRegistry {
    TypeRegistry::new()
        .with_enum("demo.Color", ["RED", "GREEN", "BLUE"])
        .with_bean(
            "demo.Foo",
            [
                BeanProperty::new("name", "java.lang.String"),
                BeanProperty::new("description", "java.lang.String"),
                BeanProperty::new("roles", "java.util.List<java.lang.String>"),
            ],
        )
}

/// Every dotted combination of `names`, `levels` deep, typed as strings.
pub fn nested_index(names: &[&str], levels: usize) -> MetadataIndex {
    let mut paths = vec![String::new()];
    for _ in 0..levels {
        paths = paths
            .iter()
            .flat_map(|prefix| {
                names.iter().map(move |name| {
                    if prefix.is_empty() {
                        (*name).to_string()
                    } else {
                        format!("{prefix}.{name}")
                    }
                })
            })
            .collect();
    }
    paths
        .into_iter()
        .map(|path| {
            let description = format!("Property {path}");
            PropertyMetadata::new(path, "java.lang.String", description)
        })
        .collect()
}
