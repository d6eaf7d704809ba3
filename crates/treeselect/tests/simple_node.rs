use rstest::rstest;
use treeselect::simple_node::{attr, comment, doc, elem, text};
use treeselect::{NodeKind, QName, SelectNode, SimpleNode};

fn sample() -> SimpleNode {
    doc()
        .child(
            elem("Root")
                .attr(attr("ID", "r"))
                .class("a  b")
                .child(elem("x").child(text("one ")))
                .child(comment("skip"))
                .child(elem("svg:y").child(text(" two")))
                .child(elem("x")),
        )
        .build()
}

#[rstest]
fn builder_links_parents_and_attributes() {
    let document = sample();
    assert_eq!(document.kind(), NodeKind::Document);
    let root = document.element_children().remove(0);
    assert_eq!(root.parent(), Some(document.clone()));
    assert_eq!(root.children().len(), 4);
    assert_eq!(root.element_children().len(), 3);

    let attrs = root.attributes();
    assert_eq!(attrs.len(), 2);
    assert!(attrs.iter().all(|a| a.kind() == NodeKind::Attribute));
    assert_eq!(attrs[0].parent(), Some(root.clone()));
    assert_eq!(root.id().as_deref(), Some("r"));
    assert_eq!(root.attribute("Class").as_deref(), Some("a  b"));
    assert!(root.has_attribute("id"));
    assert!(!root.has_attribute("title"));
    assert!(root.has_class("B"));
}

#[rstest]
fn names_and_tag_names() {
    let document = sample();
    let root = document.element_children().remove(0);
    let y = root.element_children().remove(1);
    assert_eq!(y.name(), Some(QName::prefixed("svg", "y")));
    assert_eq!(y.tag_name().as_deref(), Some("svg:y"));
    assert_eq!(root.tag_name().as_deref(), Some("root"));
    assert_eq!(document.tag_name(), None);
    assert_eq!(QName::parse("a:").to_string(), "a:");
    assert_eq!(QName::parse("p:l"), QName::prefixed("p", "l"));
}

#[rstest]
fn text_values() {
    let document = sample();
    let root = document.element_children().remove(0);
    assert_eq!(root.string_value(), "one  two");
    assert_eq!(root.text(), "one two");
    assert_eq!(root.own_text(), "");
    assert_eq!(document.string_value(), "one  two");
}

#[rstest]
fn sibling_navigation() {
    let document = sample();
    let root = document.element_children().remove(0);
    let kids = root.element_children();
    assert_eq!(kids[2].element_sibling_index(), 2);
    assert_eq!(kids[2].previous_element_sibling(), Some(kids[1].clone()));
    assert_eq!(kids[2].preceding_element_siblings(), vec![kids[1].clone(), kids[0].clone()]);
    assert_eq!(kids[0].previous_element_sibling(), None);
    assert_eq!(kids[0].ancestors().collect::<Vec<_>>(), vec![root.clone(), document.clone()]);
}

#[rstest]
fn identity_not_structure() {
    let a = elem("p").build();
    let b = elem("p").build();
    assert_ne!(a, b);
    assert_eq!(a.clone(), a);
    assert_eq!(sample().descendants_or_self().len(), 8);
}

#[rstest]
fn debug_shows_kind_and_name() {
    let node = elem("p").build();
    let rendered = format!("{node:?}");
    assert!(rendered.contains("Element"), "{rendered}");
    assert!(rendered.contains("\"p\""), "{rendered}");
}

#[cfg(debug_assertions)]
#[rstest]
#[should_panic(expected = "more than one parent")]
fn attaching_a_node_twice_is_caught() {
    let shared = elem("b").build();
    let _first = elem("p").child(shared.clone()).build();
    let _second = elem("q").child(shared).build();
}
