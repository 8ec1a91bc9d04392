//! XML utility functions for navigating and extracting data from DOM trees.
//!
//! All lookups compare bare (namespace-stripped) tag names. Path strings use
//! the ElementTree subset the extractors need:
//!
//! - `.//A/B` selects every descendant `A` of the context node (never the
//!   context node itself), then walks child `B` elements from each;
//! - `./A/B` and `A/B` walk child elements only;
//! - `*` matches any element name.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ddi_harvester::xml::get_tag_name;
///
/// let xml = r#"<r:Fragment xmlns:r="ddi:reusable:3_2"><r:URN/></r:Fragment>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "Fragment");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

fn matches_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && (tag == "*" || get_tag_name(node) == tag)
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ddi_harvester::xml::find_child;
///
/// let xml = r#"<root><child1/><child2/></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "child1").is_some());
/// assert!(find_child(root, "missing").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| matches_tag(*child, tag))
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| matches_tag(*child, tag))
}

/// Select every element matching `path`, relative to `node`.
///
/// Results come out in the order ElementTree's `findall` yields them: for
/// each match of the first step in document order, the matches of the
/// remaining steps beneath it.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ddi_harvester::xml::select_all;
///
/// let xml = r#"<Seq>
///   <ControlConstructReference><ID>a</ID></ControlConstructReference>
///   <ControlConstructReference><ID>b</ID></ControlConstructReference>
/// </Seq>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let ids: Vec<_> = select_all(doc.root_element(), ".//ControlConstructReference/ID")
///     .into_iter()
///     .filter_map(|n| n.text())
///     .collect();
/// assert_eq!(ids, ["a", "b"]);
/// ```
pub fn select_all<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let (descendant, rest) = match path.strip_prefix(".//") {
        Some(rest) => (true, rest),
        None => (false, path.strip_prefix("./").unwrap_or(path)),
    };

    let mut steps = rest.split('/').filter(|s| !s.is_empty());
    let Some(first) = steps.next() else {
        return vec![node];
    };

    let mut current: Vec<Node<'a, 'input>> = if descendant {
        node.descendants()
            .skip(1)
            .filter(|n| matches_tag(*n, first))
            .collect()
    } else {
        find_children_owned(node, first)
    };

    for step in steps {
        current = current
            .into_iter()
            .flat_map(|n| find_children_owned(n, step))
            .collect();
    }

    current
}

fn find_children_owned<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Vec<Node<'a, 'input>> {
    node.children().filter(|c| matches_tag(*c, tag)).collect()
}

/// Select the first element matching `path`, relative to `node`.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ddi_harvester::xml::select;
///
/// let xml = r#"<Study><Citation><Title><String>NCDS</String></Title></Citation></Study>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let title = select(doc.root_element(), ".//Citation/Title/String");
/// assert_eq!(title.and_then(|n| n.text()), Some("NCDS"));
/// assert!(select(doc.root_element(), ".//Abstract").is_none());
/// ```
pub fn select<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    select_all(node, path).into_iter().next()
}

/// Find the first descendant whose attribute `name` equals `value`.
///
/// Equivalent to ElementTree's `.//*[@name='value']`.
pub fn find_by_attribute<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
    value: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.attribute(name) == Some(value))
}

/// Get the text content of a node, trimmed.
///
/// Returns an empty string if the node has no direct text.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get the trimmed text content of a node, or `None` when it has none.
pub fn text_content(node: Node<'_, '_>) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Get an attribute value from a node.
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<root><item>1</item><other/><item>2</item></root>"#;
        let doc = Document::parse(xml).unwrap();
        let items: Vec<_> = find_children(doc.root_element(), "item").collect();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_select_descendant_excludes_context_node() {
        let xml = r#"<URN><Inner><URN>inner</URN></Inner></URN>"#;
        let doc = Document::parse(xml).unwrap();
        let found = select(doc.root_element(), ".//URN").unwrap();
        assert_eq!(get_text(found), "inner");
    }

    #[test]
    fn test_select_child_only() {
        let xml = r#"<Mode><URN>own</URN><Nested><URN>nested</URN></Nested></Mode>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert_eq!(select(root, "./URN").map(get_text), Some("own".to_string()));
        assert_eq!(select_all(root, "./URN").len(), 1);
        assert_eq!(select_all(root, ".//URN").len(), 2);
    }

    #[test]
    fn test_select_all_walks_every_branch() {
        let xml = r#"<root>
            <Code><CategoryReference><ID>1</ID></CategoryReference></Code>
            <Code><CategoryReference><ID>2</ID></CategoryReference></Code>
            <CategoryReference><ID>x</ID></CategoryReference>
        </root>"#;
        let doc = Document::parse(xml).unwrap();
        let ids: Vec<_> = select_all(doc.root_element(), ".//Code/CategoryReference/ID")
            .into_iter()
            .map(get_text)
            .collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn test_select_wildcard() {
        let xml = r#"<root><a><x>1</x></a><b><x>2</x></b></root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(select_all(doc.root_element(), "*/x").len(), 2);
    }

    #[test]
    fn test_find_by_attribute() {
        let xml = r#"<Instrument>
            <UserID typeOfUserID="colectica:sourceId">ns_w1</UserID>
            <UserID typeOfUserID="closer:sourceFileName">ns1.qsrx</UserID>
        </Instrument>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        let node = find_by_attribute(root, "typeOfUserID", "closer:sourceFileName").unwrap();
        assert_eq!(get_text(node), "ns1.qsrx");
        assert!(find_by_attribute(root, "typeOfUserID", "other").is_none());
    }

    #[test]
    fn test_text_content() {
        let xml = r#"<root><a>  value </a><b/><c>   </c></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert_eq!(
            text_content(find_child(root, "a").unwrap()),
            Some("value".to_string())
        );
        assert_eq!(text_content(find_child(root, "b").unwrap()), None);
        assert_eq!(text_content(find_child(root, "c").unwrap()), None);
    }

    #[test]
    fn test_get_attribute() {
        let xml = r#"<ResponseCardinality minimumResponses="1"/>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert_eq!(get_attribute(root, "minimumResponses"), Some("1"));
        assert_eq!(get_attribute(root, "maximumResponses"), None);
    }
}
