//! Hierarchical sensor paths
//!
//! Parses gNMI-style string paths (`/interfaces/interface[name=eth0]/state`)
//! and resolves them into a flat path string plus a tag set.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::domain::error::TelemetryError;
use crate::domain::metrics::TagSet;

/// One named segment of a path, optionally keyed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathElement {
    pub name: String,
    /// Sorted so key processing is deterministic
    pub keys: BTreeMap<String, String>,
}

impl PathElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: BTreeMap::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(key.into(), value.into());
        self
    }
}

/// Ordered sequence of path elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchicalPath {
    pub elements: Vec<PathElement>,
}

impl HierarchicalPath {
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// Parse a string path.
    ///
    /// Accepts an optional leading `/` and an optional `origin:` prefix on the
    /// first element. Inside `[...]`, `/` is literal and `\` escapes the next
    /// character.
    pub fn parse(path: &str) -> Result<Self, TelemetryError> {
        let trimmed = path.trim();
        let body = strip_origin(trimmed.strip_prefix('/').unwrap_or(trimmed));

        let mut elements = Vec::new();
        let mut chars = body.chars().peekable();

        while chars.peek().is_some() {
            let mut element = PathElement::default();

            // Element name runs until '/', '[' or end of input
            while let Some(&c) = chars.peek() {
                match c {
                    '/' | '[' => break,
                    ']' => return Err(TelemetryError::invalid_path(path, "unexpected ']'")),
                    _ => {
                        element.name.push(c);
                        chars.next();
                    }
                }
            }

            while chars.peek() == Some(&'[') {
                chars.next();
                let (key, value) = parse_key_value(&mut chars, path)?;
                element.keys.insert(key, value);
            }

            match chars.next() {
                None | Some('/') => {}
                Some(c) => {
                    return Err(TelemetryError::invalid_path(
                        path,
                        format!("unexpected '{}' after key selector", c),
                    ));
                }
            }

            if element.name.is_empty() && element.keys.is_empty() {
                // Tolerate duplicate or trailing slashes
                continue;
            }
            elements.push(element);
        }

        Ok(Self { elements })
    }
}

/// Drop an `origin:` prefix when it appears before any '/' or '['.
fn strip_origin(path: &str) -> &str {
    let first_end = path.find(['/', '[']).unwrap_or(path.len());
    match path[..first_end].find(':') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

fn parse_key_value(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    path: &str,
) -> Result<(String, String), TelemetryError> {
    let mut key = String::new();
    loop {
        match chars.next() {
            Some('=') => break,
            Some(']') | None => {
                return Err(TelemetryError::invalid_path(
                    path,
                    "key selector without '='",
                ));
            }
            Some(c) => key.push(c),
        }
    }
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(TelemetryError::invalid_path(path, "empty key in selector"));
    }

    let mut value = String::new();
    loop {
        match chars.next() {
            Some(']') => break,
            Some('\\') => match chars.next() {
                Some(c) => value.push(c),
                None => return Err(TelemetryError::invalid_path(path, "unclosed '['")),
            },
            Some(c) => value.push(c),
            None => return Err(TelemetryError::invalid_path(path, "unclosed '['")),
        }
    }

    Ok((key, value))
}

/// Resolve a path into a flat path string and tags.
///
/// The flat path is `prefix` followed by each non-empty element name in upper
/// case. Keys become tags under their normalized name (`-` -> `_`); when that
/// name is already taken the tag is stored as `elementName_key` instead.
pub fn resolve_path(
    path: &HierarchicalPath,
    prefix: &str,
    tags: &mut TagSet,
) -> Result<String, TelemetryError> {
    let mut flat = String::with_capacity(prefix.len() + path.elements.len() * 8);
    resolve_path_into(&mut flat, path, prefix, tags)?;
    Ok(flat)
}

/// Same as [`resolve_path`] but writes the flat path into any `fmt::Write`.
pub fn resolve_path_into<W: Write>(
    out: &mut W,
    path: &HierarchicalPath,
    prefix: &str,
    tags: &mut TagSet,
) -> Result<(), TelemetryError> {
    out.write_str(prefix)?;

    for element in &path.elements {
        if !element.name.is_empty() {
            out.write_str(&element.name.to_uppercase())?;
        }

        for (key, value) in &element.keys {
            let key = key.replace('-', "_");
            if tags.contains_key(&key) {
                tags.insert(format!("{}_{}", element.name, key), value.clone());
            } else {
                tags.insert(key, value.clone());
            }
        }
    }

    Ok(())
}

/// Normalize a flat path for use as a measurement name and field prefix.
pub fn normalize_flat_path(flat: &str) -> String {
    flat.replace(['/', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(path: &HierarchicalPath, prefix: &str) -> (String, TagSet) {
        let mut tags = TagSet::new();
        let flat = resolve_path(path, prefix, &mut tags).unwrap();
        (flat, tags)
    }

    #[test]
    fn test_resolve_ifm_interface() {
        let path = HierarchicalPath::new(vec![
            PathElement::new("IFM"),
            PathElement::new("INTERFACE").with_key("port-name", "eth0"),
        ]);
        let (flat, tags) = resolve(&path, "");

        assert_eq!(flat, "IFMINTERFACE");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("port_name").map(String::as_str), Some("eth0"));
    }

    #[test]
    fn test_resolve_uppercases_and_uses_prefix() {
        let path = HierarchicalPath::new(vec![
            PathElement::new("interfaces"),
            PathElement::new("interface"),
            PathElement::new("state"),
        ]);
        let (flat, _) = resolve(&path, "dev1_");
        assert_eq!(flat, "dev1_INTERFACESINTERFACESTATE");
    }

    #[test]
    fn test_resolve_skips_empty_names() {
        let path = HierarchicalPath::new(vec![
            PathElement::new(""),
            PathElement::new("a"),
        ]);
        let (flat, _) = resolve(&path, "");
        assert_eq!(flat, "A");
    }

    #[test]
    fn test_collision_uses_qualified_name() {
        let path = HierarchicalPath::new(vec![
            PathElement::new("interface").with_key("name", "eth0"),
            PathElement::new("subinterface").with_key("name", "eth0.1"),
        ]);
        let (_, tags) = resolve(&path, "");

        assert_eq!(tags.get("name").map(String::as_str), Some("eth0"));
        assert_eq!(
            tags.get("subinterface_name").map(String::as_str),
            Some("eth0.1")
        );
    }

    #[test]
    fn test_collision_after_normalization() {
        let path = HierarchicalPath::new(vec![
            PathElement::new("a").with_key("port_name", "p1"),
            PathElement::new("b").with_key("port-name", "p2"),
        ]);
        let (_, tags) = resolve(&path, "");

        assert_eq!(tags.get("port_name").map(String::as_str), Some("p1"));
        assert_eq!(tags.get("b_port_name").map(String::as_str), Some("p2"));
    }

    #[test]
    fn test_claimed_short_name_is_never_released() {
        let path = HierarchicalPath::new(vec![
            PathElement::new("a").with_key("id", "1"),
            PathElement::new("b").with_key("id", "2"),
            PathElement::new("c").with_key("id", "3"),
        ]);
        let (_, tags) = resolve(&path, "");

        assert_eq!(tags.get("id").map(String::as_str), Some("1"));
        assert_eq!(tags.get("b_id").map(String::as_str), Some("2"));
        assert_eq!(tags.get("c_id").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_keys_within_element_processed_sorted() {
        // "a-b" and "a_b" normalize to the same name; sorted order puts "a-b" first
        let element = PathElement::new("x")
            .with_key("a_b", "second")
            .with_key("a-b", "first");
        let path = HierarchicalPath::new(vec![element]);
        let (_, tags) = resolve(&path, "");

        assert_eq!(tags.get("a_b").map(String::as_str), Some("first"));
        assert_eq!(tags.get("x_a_b").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let build = || {
            HierarchicalPath::new(vec![
                PathElement::new("a")
                    .with_key("z", "1")
                    .with_key("m-k", "2")
                    .with_key("b", "3"),
                PathElement::new("b").with_key("m_k", "4").with_key("z", "5"),
            ])
        };
        let first = resolve(&build(), "p");
        for _ in 0..10 {
            assert_eq!(resolve(&build(), "p"), first);
        }
    }

    #[test]
    fn test_resolve_updates_existing_tags() {
        let mut tags = TagSet::new();
        tags.insert("name".into(), "preset".into());
        let path = HierarchicalPath::new(vec![PathElement::new("if").with_key("name", "eth0")]);
        resolve_path(&path, "", &mut tags).unwrap();

        assert_eq!(tags.get("name").map(String::as_str), Some("preset"));
        assert_eq!(tags.get("if_name").map(String::as_str), Some("eth0"));
    }

    #[test]
    fn test_parse_simple_path() {
        let path = HierarchicalPath::parse("/interfaces/interface/state").unwrap();
        let names: Vec<&str> = path.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["interfaces", "interface", "state"]);
    }

    #[test]
    fn test_parse_keys() {
        let path =
            HierarchicalPath::parse("/interfaces/interface[name=eth0][unit=0]/state").unwrap();
        let iface = &path.elements[1];
        assert_eq!(iface.name, "interface");
        assert_eq!(iface.keys.get("name").map(String::as_str), Some("eth0"));
        assert_eq!(iface.keys.get("unit").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_parse_slash_and_escape_inside_key_value() {
        let path = HierarchicalPath::parse(r"/if[name=Ethernet1/0/1]/x[k=a\]b]").unwrap();
        assert_eq!(
            path.elements[0].keys.get("name").map(String::as_str),
            Some("Ethernet1/0/1")
        );
        assert_eq!(path.elements[1].keys.get("k").map(String::as_str), Some("a]b"));
    }

    #[test]
    fn test_parse_strips_origin() {
        let path = HierarchicalPath::parse("openconfig:/interfaces/interface").unwrap();
        assert_eq!(path.elements[0].name, "interfaces");

        let path = HierarchicalPath::parse("/openconfig-interfaces:interfaces/interface").unwrap();
        assert_eq!(path.elements[0].name, "interfaces");
    }

    #[test]
    fn test_parse_tolerates_extra_slashes() {
        let path = HierarchicalPath::parse("//a//b/").unwrap();
        assert_eq!(path.elements.len(), 2);
    }

    #[test]
    fn test_parse_empty_path() {
        assert!(HierarchicalPath::parse("").unwrap().elements.is_empty());
        assert!(HierarchicalPath::parse("/").unwrap().elements.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "/a[name=eth0",
            "/a[name]",
            "/a[=x]",
            "/a]b",
            "/a[k=v]x/b",
        ] {
            let err = HierarchicalPath::parse(bad).unwrap_err();
            assert!(err.is_payload_error(), "expected payload error for {}", bad);
        }
    }

    #[test]
    fn test_normalize_flat_path() {
        assert_eq!(normalize_flat_path("IFM/INTER-FACE"), "IFM_INTER_FACE");
        assert_eq!(normalize_flat_path("plain"), "plain");
    }
}
