use crate::types::Node;

/// Depth-first pre-order visit: each node is seen before its children.
pub fn visit_all<'a, F>(nodes: &'a [Node], visit: &mut F)
where
    F: FnMut(&'a Node),
{
    for node in nodes {
        visit(node);
        visit_all(node.children(), visit);
    }
}

/// Pre-order visit that may edit nodes in place.
///
/// Children are visited after `visit` returns, so nodes it inserts are
/// visited too.
pub fn visit_all_mut<F>(nodes: &mut [Node], visit: &mut F)
where
    F: FnMut(&mut Node),
{
    for node in nodes {
        visit(node);
        if let Some(children) = node.children_mut() {
            visit_all_mut(children, visit);
        }
    }
}

/// All nodes matching `pred`, in document order.
pub fn find_all<'a, P>(nodes: &'a [Node], mut pred: P) -> Vec<&'a Node>
where
    P: FnMut(&Node) -> bool,
{
    let mut found = Vec::new();
    visit_all(nodes, &mut |node| {
        if pred(node) {
            found.push(node);
        }
    });
    found
}

/// All elements whose tag is one of `names` (ASCII case-insensitive).
pub fn find_tags<'a>(nodes: &'a [Node], names: &[&str]) -> Vec<&'a Node> {
    find_all(nodes, |node| {
        node.tag()
            .is_some_and(|tag| names.iter().any(|n| n.eq_ignore_ascii_case(tag)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::parse;

    #[test]
    fn visit_all_is_pre_order() {
        let nodes = parse("<div><p>a</p><p>b<i>c</i></p></div>d");
        let mut order = Vec::new();
        visit_all(&nodes, &mut |node| {
            order.push(match node {
                Node::Text(t) => t.clone(),
                other => other.tag().unwrap_or_default().to_string(),
            });
        });
        assert_eq!(order, vec!["DIV", "P", "a", "P", "b", "I", "c", "d"]);
    }

    #[test]
    fn find_tags_any_case() {
        let nodes = parse("<ul><li>1</li><li>2<ul><li>3</li></ul></li></ul><ol><li>4</ol>");
        assert_eq!(find_tags(&nodes, &["li"]).len(), 4);
        assert_eq!(find_tags(&nodes, &["UL", "ol"]).len(), 3);
        assert!(find_tags(&nodes, &["table"]).is_empty());
    }

    #[test]
    fn find_all_by_predicate() {
        let nodes = parse("<a href=x>1</a><a name=y>2</a><a href=z>3</a>");
        let links = find_all(&nodes, |n| n.as_element().is_some_and(|el| el.has_attr("href")));
        let hrefs: Vec<&str> = links
            .iter()
            .filter_map(|n| n.as_element().and_then(|el| el.attr("href")))
            .collect();
        assert_eq!(hrefs, vec!["x", "z"]);
    }

    #[test]
    fn visit_all_mut_edits_in_place() {
        let mut nodes = parse("<p>keep <b>bold</b></p>");
        visit_all_mut(&mut nodes, &mut |node| {
            if let Node::Text(text) = node {
                *text = text.to_uppercase();
            }
            if let Some(el) = node.as_element_mut() {
                el.set_attr("class", Some("seen"));
            }
        });
        let p = nodes[0].as_element().expect("P");
        assert_eq!(p.attr("class"), Some("seen"));
        assert_eq!(p.children[0], Node::text("KEEP "));
        assert_eq!(p.children[1].children(), &[Node::text("BOLD")]);
    }
}
