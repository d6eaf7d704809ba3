use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use treeselect::simple_node::{attr, doc, elem, text};
use treeselect::{Selector, SimpleNode, compile, select};

fn create_large_html_document() -> SimpleNode {
    let mut body_builder = elem("body");

    for i in 0..100 {
        let mut section_builder = elem("section")
            .attr(attr("class", &format!("section-{i}")))
            .attr(attr("id", &format!("section-{i}")));

        for j in 0..20 {
            let div_builder = elem("div")
                .attr(attr("class", "content"))
                .attr(attr("data-index", &j.to_string()))
                .child(elem("p").child(text(&format!("Content paragraph {j} in section {i}"))))
                .child(elem("span").attr(attr("class", "highlight")).child(text("highlighted text")));
            section_builder = section_builder.child(div_builder);
        }

        body_builder = body_builder.child(section_builder);
    }

    let head_builder = elem("head").child(elem("title").child(text("Test Document")));
    doc().child(elem("html").child(head_builder).child(body_builder)).build()
}

fn benchmark_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let queries = [
        "div",
        "section#section-5 > div.content:nth-child(2n+1) p",
        "div:has(> span.highlight):not([data-index=3]), p:containsOwn(section 7)",
        "[class~=^sec\\w+-\\d$] ~ section",
    ];
    for query in queries {
        group.bench_with_input(BenchmarkId::new("query", query), &query, |b, q| {
            b.iter(|| black_box(compile(black_box(q)).unwrap()));
        });
    }
    group.finish();
}

fn benchmark_select(c: &mut Criterion) {
    let document = create_large_html_document();
    let mut group = c.benchmark_group("select");

    let test_cases = [
        ("div", "Select all div elements"),
        ("span.highlight", "Select spans with class"),
        ("section[id]", "Select sections with id attribute"),
        ("p:contains(paragraph 1)", "Text content search"),
        ("div.content > p", "Child combinator"),
        ("section div p", "Descendant chain"),
        ("div[data-index=5]", "Attribute value matching"),
        ("section > div:lt(5)", "Index predicate"),
        ("div:nth-child(odd) + div", "Sibling with nth formula"),
        ("section:has(div[data-index=19])", "Has predicate"),
    ];

    for (query, description) in test_cases {
        group.bench_with_input(BenchmarkId::new("compiled", description), &query, |b, q| {
            let selector = Selector::compile(q).unwrap();
            b.iter(|| black_box(selector.select(black_box(&document)).len()));
        });
    }

    group.bench_function("uncompiled/Select all div elements", |b| {
        b.iter(|| black_box(select("div", black_box(&document)).unwrap().len()));
    });

    group.finish();
}

fn benchmark_select_first(c: &mut Criterion) {
    let document = create_large_html_document();
    let selector = Selector::compile("section#section-99 span").unwrap();
    c.bench_function("select_first_late_match", |b| {
        b.iter(|| black_box(selector.select_first(black_box(&document))));
    });
}

criterion_group!(benches, benchmark_compile, benchmark_select, benchmark_select_first);
criterion_main!(benches);
