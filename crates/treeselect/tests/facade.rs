use std::thread;

use rstest::{fixture, rstest};
use treeselect::simple_node::{doc, elem, text};
use treeselect::{
    CaseSensitivity, NodeSet, SelectNode, SelectOptions, Selector, SimpleNode, select, select_all,
    select_all_with, select_first, select_with,
};

#[fixture]
fn tree() -> SimpleNode {
    doc()
        .child(
            elem("main")
                .id("main")
                .child(
                    elem("div")
                        .id("d1")
                        .class("note")
                        .child(elem("p").id("p1").child(text("a")))
                        .child(elem("div").id("d2").child(elem("p").id("p2"))),
                )
                .child(elem("p").id("p3").class("note"))
                .child(elem("div").id("d3").child(elem("span").id("s1"))),
        )
        .build()
}

fn ids(nodes: &[SimpleNode]) -> Vec<String> {
    nodes.iter().map(|n| n.id().unwrap_or_default()).collect()
}

fn find(root: &SimpleNode, id: &str) -> SimpleNode {
    select(&format!("#{id}"), root).unwrap().remove(0)
}

#[rstest]
fn repeated_calls_are_deterministic(tree: SimpleNode) {
    let first = select("div, p, span", &tree).unwrap();
    for _ in 0..5 {
        assert_eq!(select("div, p, span", &tree).unwrap(), first);
    }
}

#[rstest]
#[case("*")]
#[case("p, div")]
#[case("span, .note, #main")]
#[case("div p, div > div, :has(span)")]
fn results_are_in_document_order(tree: SimpleNode, #[case] query: &str) {
    let order = tree.descendants_or_self();
    let positions: Vec<usize> = select(query, &tree)
        .unwrap()
        .iter()
        .map(|n| order.iter().position(|o| o == n).unwrap())
        .collect();
    assert!(!positions.is_empty());
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{query}: {positions:?}");
}

#[rstest]
fn union_has_no_duplicates(tree: SimpleNode) {
    assert_eq!(ids(&select("div, p", &tree).unwrap()), ["d1", "p1", "d2", "p2", "p3", "d3"]);
    assert_eq!(ids(&select("div, .note", &tree).unwrap()), ["d1", "d2", "p3", "d3"]);
    assert_eq!(ids(&select("p, p, p", &tree).unwrap()), ["p1", "p2", "p3"]);
}

#[rstest]
fn multi_root_union_keeps_first_occurrence(tree: SimpleNode) {
    let d1 = find(&tree, "d1");
    let d2 = find(&tree, "d2");
    assert_eq!(ids(&select_all("p", &[d2.clone(), d1.clone()]).unwrap()), ["p2", "p1"]);
    assert_eq!(ids(&select_all("p", &[d1, d2]).unwrap()), ["p1", "p2"]);
}

#[rstest]
fn multi_root_sibling_roots(tree: SimpleNode) {
    let d3 = find(&tree, "d3");
    let d1 = find(&tree, "d1");
    assert_eq!(ids(&select_all("div", &[d3, d1]).unwrap()), ["d3", "d1", "d2"]);
}

#[rstest]
fn empty_roots_give_empty_result() {
    let roots: [SimpleNode; 0] = [];
    assert!(select_all("p", &roots).unwrap().is_empty());
    assert!(select_all("   ", &roots).is_err());
}

#[rstest]
fn no_match_is_not_an_error(tree: SimpleNode) {
    assert_eq!(select("table > tr", &tree).unwrap(), Vec::<SimpleNode>::new());
    assert_eq!(select_first("table", &tree).unwrap(), None);
}

#[rstest]
fn select_first_stops_at_first_hit(tree: SimpleNode) {
    let hit = select_first("div p, span", &tree).unwrap().unwrap();
    assert_eq!(hit.id().as_deref(), Some("p1"));
}

#[rstest]
fn only_elements_are_returned(tree: SimpleNode) {
    let all = select("*", &tree).unwrap();
    assert_eq!(all.len(), 8);
    assert!(all.iter().all(SelectNode::is_element));
    assert!(select(":not(p)", &tree).unwrap().iter().all(SelectNode::is_element));
}

#[rstest]
fn scope_root_inclusion_is_an_option(tree: SimpleNode) {
    let d1 = find(&tree, "d1");
    assert_eq!(ids(&select("div", &d1).unwrap()), ["d1", "d2"]);
    let options = SelectOptions::new().with_scope_root(false);
    assert_eq!(ids(&select_with("div", &d1, &options).unwrap()), ["d2"]);
    assert_eq!(ids(&select_all_with(".note", &[d1], &options).unwrap()), Vec::<String>::new());
}

#[rstest]
fn options_defaults() {
    let options = SelectOptions::default();
    assert!(options.include_scope_root());
    assert_eq!(options.attribute_value_case(), CaseSensitivity::Sensitive);
    assert_eq!(SelectOptions::new(), options);
}

#[rstest]
fn compiled_selector_is_reusable(tree: SimpleNode) {
    let selector = Selector::compile("  div > p  ").unwrap();
    assert_eq!(selector.query(), "div > p");
    assert_eq!(selector.evaluator().to_string(), "div > p");
    let d1 = find(&tree, "d1");
    let d3 = find(&tree, "d3");
    assert_eq!(ids(&selector.select(&tree)), ["p1", "p2"]);
    assert_eq!(ids(&selector.select(&d1)), ["p1", "p2"]);
    assert!(selector.select(&d3).is_empty());
    assert_eq!(ids(&selector.select_all(&[d3, d1])), ["p1", "p2"]);
}

#[rstest]
fn selector_matches_single_node(tree: SimpleNode) {
    let selector = Selector::compile("div > p").unwrap();
    let p1 = find(&tree, "p1");
    let p3 = find(&tree, "p3");
    let d1 = find(&tree, "d1");
    assert!(selector.matches(&p1, &tree));
    assert!(!selector.matches(&p3, &tree));
    assert!(!selector.matches(&d1, &tree));

    let relative = Selector::compile("> p").unwrap();
    assert!(relative.matches(&p1, &d1));
    assert!(!relative.matches(&p1, &tree));
    let text_node = p1.children().remove(0);
    assert!(!Selector::compile("*").unwrap().matches(&text_node, &tree));
}

#[rstest]
fn selector_is_shared_across_threads(tree: SimpleNode) {
    let selector = Selector::compile("div p, span").unwrap();
    let expected = selector.select(&tree);
    let (selector, tree) = (&selector, &tree);
    thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(move || selector.select(tree))).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[rstest]
fn node_set_keeps_insertion_order(tree: SimpleNode) {
    let p = select("p", &tree).unwrap();
    let mut set = NodeSet::new();
    assert!(set.insert(p[1].clone()));
    assert!(set.insert(p[0].clone()));
    assert!(!set.insert(p[1].clone()));
    set.extend(p.iter().cloned());
    assert_eq!(set.len(), 3);
    assert!(set.contains(&p[2]));
    assert_eq!(ids(&set.into_vec()), ["p2", "p1", "p3"]);
}
