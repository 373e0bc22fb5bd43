use crate::attr;
use crate::locate;
use crate::mutate;
use crate::selector::{Selection, ShapeSet};
use crate::span::{self, ElementSpan};

const MIXED: &str = r##"<svg viewBox="0 0 100 100">
  <!-- background -->
  <rect width="100" height="100" fill="#eee"/>
  <g id="outer"><g id="inner"><circle cx="1" cy="1" r="1"/></g></g>
  <circle cx="2" cy="2" r="2"/>
  <path d="M0 0 L10 10"></path>
  <circle cx="3" cy="3" r="3"/>
</svg>"##;

fn sel(s: &str) -> Selection {
    Selection::parse(s).unwrap()
}

fn spans(doc: &str, s: &str) -> Vec<ElementSpan> {
    locate::locate_spans(doc, &sel(s), ShapeSet::Editable).unwrap()
}

#[test]
fn extraction_is_idempotent() {
    for m in locate::find_all(MIXED, "g") {
        assert_eq!(span::extract(MIXED, &m), span::extract(MIXED, &m));
    }
}

#[test]
fn batch_removal_leaves_other_bytes_untouched() {
    let targets = spans(MIXED, "circle:1,path:0,rect:0");
    let removed_len: usize = targets.iter().map(ElementSpan::len).sum();
    let (out, removed) = mutate::remove_spans(MIXED, &targets);

    assert_eq!(removed.len(), 3);
    assert_eq!(out.len(), MIXED.len() - removed_len);

    let mut expected = String::new();
    let mut pos = 0;
    for s in &targets {
        expected.push_str(&MIXED[pos..s.start]);
        pos = s.end;
    }
    expected.push_str(&MIXED[pos..]);
    assert_eq!(out, expected);
}

#[test]
fn setting_twice_replaces_instead_of_duplicating() {
    let el = r#"<circle cx="1" cy="2" r="3"/>"#;
    let red = attr::set_attribute(el, "fill", "red");
    assert_eq!(red, r#"<circle cx="1" cy="2" r="3" fill="red"/>"#);
    let blue = attr::set_attribute(&red, "fill", "blue");
    assert_eq!(blue, r#"<circle cx="1" cy="2" r="3" fill="blue"/>"#);
}

#[test]
fn outer_group_spans_both_close_tags() {
    let doc = "<svg><g><g><circle/></g></g><rect/></svg>";
    let outer = &spans(doc, "g:0")[0];
    assert_eq!(outer.text, "<g><g><circle/></g></g>");
}

#[test]
fn negative_index_counts_from_the_end() {
    assert_eq!(spans(MIXED, "circle:-1"), spans(MIXED, "circle:2"));
}

#[test]
fn union_is_ordered_and_deduplicated() {
    let picked = spans(MIXED, "circle:2,circle:0,circle:-1");
    assert_eq!(picked.len(), 2);
    assert!(picked[0].start < picked[1].start);
}
