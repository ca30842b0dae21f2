//! Range invariants over realistic configuration documents.

use bootprops_yaml::{NodeValue, SourceRange, YamlNode, parse, parse_documents};

/// Every child range lies within its parent and siblings do not overlap.
fn assert_nested(node: &YamlNode, source: &str) {
    let children: Vec<SourceRange> = match &node.value {
        NodeValue::Scalar(_) => Vec::new(),
        NodeValue::Sequence(items) => {
            for item in items {
                assert_nested(item, source);
            }
            items.iter().map(|item| item.range).collect()
        }
        NodeValue::Mapping(entries) => {
            for entry in entries {
                assert_nested(&entry.key, source);
                assert_nested(&entry.value, source);
            }
            entries
                .iter()
                .flat_map(|entry| [entry.key.range, entry.value.range])
                .collect()
        }
    };

    for child in &children {
        assert!(
            node.range.encloses(child),
            "{:?} ({:?}) not inside {:?} ({:?})",
            child,
            child.slice(source),
            node.range,
            node.range.slice(source)
        );
    }
    for pair in children.windows(2) {
        assert!(
            pair[0].end <= pair[1].start,
            "overlapping siblings {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
}

const APPLICATION_YAML: &str = "\
# application settings
spring:
  application:
    name: foofoo
  datasource:
    url: 'jdbc:h2:mem:test'
    login-timeout: 1000

server:
  port: 8888
  address:
logging:
  level:
    com.acme: INFO
    org.springframework: \"DEBUG\"
volder:
  foo:
    list:
      - name: Kris
        roles:
          - Developer
          - Admin
      - name: Other
flyway:
  init-sqls: [a, b, c]
";

#[test]
fn ranges_nest_in_application_yaml() {
    let yaml = parse(APPLICATION_YAML).unwrap();
    assert_nested(&yaml, APPLICATION_YAML);
}

#[test]
fn key_ranges_cover_key_text() {
    let yaml = parse(APPLICATION_YAML).unwrap();
    let level = yaml.get("logging").unwrap().get("level").unwrap();
    let keys: Vec<&str> = level
        .as_mapping()
        .unwrap()
        .iter()
        .map(|entry| entry.key_range().slice(APPLICATION_YAML))
        .collect();
    assert_eq!(keys, vec!["com.acme", "org.springframework"]);

    let debug = level.get("org.springframework").unwrap();
    assert_eq!(debug.range.slice(APPLICATION_YAML), "\"DEBUG\"");
    assert_eq!(debug.as_scalar().unwrap().text, "DEBUG");
}

#[test]
fn sequence_of_mappings() {
    let yaml = parse(APPLICATION_YAML).unwrap();
    let list = yaml
        .get("volder")
        .and_then(|v| v.get("foo"))
        .and_then(|f| f.get("list"))
        .unwrap();
    let items = list.as_sequence().unwrap();
    assert_eq!(items.len(), 2);
    let roles = items[0].get("roles").unwrap();
    assert_eq!(roles.range.slice(APPLICATION_YAML), "- Developer\n          - Admin");
    assert_eq!(items[1].range.slice(APPLICATION_YAML), "name: Other");
}

#[test]
fn ranges_nest_across_documents() {
    let source = "a:\n  b: 1\n---\nc:\n  - x\n  - y: z\n";
    let docs = parse_documents(source).unwrap();
    assert_eq!(docs.len(), 2);
    for doc in &docs {
        assert_nested(doc, source);
    }
    assert_eq!(docs[1].range.slice(source), "c:\n  - x\n  - y: z");
}

const SPARSE_YAML: &str = "\
server:
  port:
  \"address\": here
  tags:
  - a
  -
  - 'c'
  banner: |
    hello

  footer: >-
    bye
list:
- name: x
  roles: [a, b]
- name: y
";

#[test]
fn ranges_nest_around_empty_values_and_block_scalars() {
    let yaml = parse(SPARSE_YAML).unwrap();
    assert_nested(&yaml, SPARSE_YAML);

    let mut out = Vec::new();
    leaves(&yaml, "", SPARSE_YAML, &mut out);
    assert_eq!(
        out,
        vec![
            "server.port = Plain ",
            "server.address = Plain here",
            "server.tags[0] = Plain a",
            "server.tags[1] = Plain ",
            "server.tags[2] = SingleQuoted 'c'",
            "server.banner = Literal |\n    hello",
            "server.footer = Folded >-\n    bye",
            "list[0].name = Plain x",
            "list[0].roles[0] = Plain a",
            "list[0].roles[1] = Plain b",
            "list[1].name = Plain y",
        ]
    );

    let server = yaml.get("server").unwrap();
    assert!(server.range.slice(SPARSE_YAML).starts_with("port:"));
    let tags = server.get("tags").unwrap();
    assert_eq!(tags.range.slice(SPARSE_YAML), "- a\n  -\n  - 'c'");
    let list = yaml.get("list").unwrap();
    assert!(list.range.slice(SPARSE_YAML).starts_with("- name: x"));
    assert!(list.range.slice(SPARSE_YAML).ends_with("- name: y"));
}

#[test]
fn parse_error_reports_location() {
    let source = "somemap: val\n- sequence";
    let err = parse(source).unwrap_err();
    assert!(err.range().start >= "somemap: val".len(), "{err:?}");
    assert!(!err.message().is_empty());
}

/// `path = style source-text` for every scalar leaf.
fn leaves(node: &YamlNode, path: &str, source: &str, out: &mut Vec<String>) {
    match &node.value {
        NodeValue::Scalar(scalar) => out.push(format!(
            "{path} = {:?} {}",
            scalar.style,
            node.range.slice(source)
        )),
        NodeValue::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                leaves(item, &format!("{path}[{i}]"), source, out);
            }
        }
        NodeValue::Mapping(entries) => {
            for entry in entries {
                let key = entry.key_text().unwrap_or("?");
                let child = if path.is_empty() {
                    key.to_string()
                } else {
                    format!("{path}.{key}")
                };
                leaves(&entry.value, &child, source, out);
            }
        }
    }
}

#[test]
fn scalar_leaves_keep_their_source_text() {
    let source = "\
spring:
  application:
    name: foofoo
server:
  port: 8888
  tags:
    - 'a'
    - \"b\"
";
    let mut out = Vec::new();
    leaves(&parse(source).unwrap(), "", source, &mut out);
    insta::assert_snapshot!(out.join("\n"), @r#"
    spring.application.name = Plain foofoo
    server.port = Plain 8888
    server.tags[0] = SingleQuoted 'a'
    server.tags[1] = DoubleQuoted "b"
    "#);
}
