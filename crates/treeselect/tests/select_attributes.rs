use rstest::{fixture, rstest};
use treeselect::simple_node::{attr, doc, elem};
use treeselect::{CaseSensitivity, SelectNode, SelectOptions, SimpleNode, select, select_with};

#[fixture]
fn links() -> SimpleNode {
    doc()
        .child(
            elem("body")
                .child(
                    elem("a")
                        .id("a1")
                        .attr(attr("href", "https://example.com/Page"))
                        .attr(attr("title", "Home")),
                )
                .child(
                    elem("a")
                        .id("a2")
                        .attr(attr("href", "/local/page.html"))
                        .attr(attr("rel", "nofollow")),
                )
                .child(
                    elem("a")
                        .id("a3")
                        .attr(attr("href", "mailto:x@y.z"))
                        .attr(attr("data-id", "42"))
                        .attr(attr("data-kind", "mail")),
                )
                .child(elem("input").id("i1").attr(attr("type", "Checkbox")).attr(attr("checked", "")))
                .child(elem("input").id("i2").attr(attr("type", "text")))
                .child(elem("img").id("img1").attr(attr("src", "logo.png")))
                .child(elem("img").id("img2").attr(attr("src", "logo.png.gif"))),
        )
        .build()
}

fn ids(nodes: &[SimpleNode]) -> Vec<String> {
    nodes.iter().map(|n| n.id().unwrap_or_default()).collect()
}

#[rstest]
#[case("[href]", &["a1", "a2", "a3"])]
#[case("[HREF]", &["a1", "a2", "a3"])]
#[case("a[href^=https]", &["a1"])]
#[case("[href$=.html]", &["a2"])]
#[case("[href*=example]", &["a1"])]
#[case("[rel=nofollow]", &["a2"])]
#[case("a[rel!=nofollow]", &["a1", "a3"])]
#[case(r"[href~=^/\w+/]", &["a2"])]
#[case("[^data-]", &["a3"])]
#[case("[^DATA-k]", &["a3"])]
#[case("[checked]", &["i1"])]
#[case("[checked='']", &["i1"])]
#[case("[title='Home']", &["a1"])]
#[case(r#"[title="Home"]"#, &["a1"])]
#[case("input[type!=text]", &["i1"])]
#[case("[data-id=42][data-kind=mail]", &["a3"])]
#[case("img[src$=.png]", &["img1"])]
#[case("a[href^=http:]", &[])]
fn operators(links: SimpleNode, #[case] query: &str, #[case] expected: &[&str]) {
    assert_eq!(ids(&select(query, &links).unwrap()), expected);
}

#[rstest]
fn prefix_requires_exact_scheme() {
    let tree = doc()
        .child(
            elem("p")
                .child(elem("a").id("web").attr(attr("href", "http://x")))
                .child(elem("a").id("ftp").attr(attr("href", "ftp://x"))),
        )
        .build();
    assert_eq!(ids(&select("a[href^=http:]", &tree).unwrap()), ["web"]);
}

#[rstest]
#[case("[type=checkbox]", &[])]
#[case("[type=Checkbox]", &["i1"])]
#[case("[title^=HO]", &[])]
#[case("[href*=PAGE]", &[])]
fn values_are_case_sensitive_by_default(
    links: SimpleNode,
    #[case] query: &str,
    #[case] expected: &[&str],
) {
    assert_eq!(ids(&select(query, &links).unwrap()), expected);
}

#[rstest]
#[case("[type=checkbox]", &["i1"])]
#[case("[title^=HO]", &["a1"])]
#[case("[href$=PAGE.HTML]", &["a2"])]
#[case("[href*=PAGE]", &["a1", "a2"])]
#[case("input[type!=CHECKBOX]", &["i2"])]
fn insensitive_values_by_option(links: SimpleNode, #[case] query: &str, #[case] expected: &[&str]) {
    let options = SelectOptions::new().with_attribute_value_case(CaseSensitivity::Insensitive);
    assert_eq!(ids(&select_with(query, &links, &options).unwrap()), expected);
}

#[rstest]
fn regex_operator_follows_pattern_flags(links: SimpleNode) {
    assert!(select("[title~=^home$]", &links).unwrap().is_empty());
    assert_eq!(ids(&select("[title~=(?i)^home$]", &links).unwrap()), ["a1"]);
}

#[rstest]
fn id_is_exact_class_is_case_insensitive() {
    let tree = doc()
        .child(elem("div").id("Main").attr(attr("class", "Big  red")).child(elem("span").class("red")))
        .build();
    assert_eq!(select("#Main", &tree).unwrap().len(), 1);
    assert!(select("#main", &tree).unwrap().is_empty());
    assert_eq!(select(".big", &tree).unwrap().len(), 1);
    assert_eq!(select(".RED", &tree).unwrap().len(), 2);
    assert!(select(".bi", &tree).unwrap().is_empty());
}
