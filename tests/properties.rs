//! Whole-parser properties: container balance, re-parse idempotence,
//! totality over arbitrary input, and deep nesting.

use marktree::{Arena, Block, Document, Inline, List, parse, parse_inlines, to_html};
use proptest::prelude::*;

/// Structural description of an inline list, independent of arena handles.
fn describe(arena: &Arena<Inline>, list: List, out: &mut String) {
    for node in arena.iter(list) {
        match node {
            Inline::Text(text) => out.push_str(&format!("text({text:?})")),
            Inline::Code(code) => out.push_str(&format!("code({code:?})")),
            Inline::Html(raw) => out.push_str(&format!("html({raw:?})")),
            Inline::SoftBreak => out.push_str("soft"),
            Inline::HardBreak => out.push_str("hard"),
            Inline::Autolink { dest, .. } => out.push_str(&format!("auto({dest:?})")),
            Inline::Link { dest, title, .. } | Inline::Image { dest, title, .. } => {
                out.push_str(&format!("link({dest:?},{title:?})"));
            }
            Inline::Emphasis { .. } => out.push_str("em"),
            Inline::Strong { .. } => out.push_str("strong"),
        }
        if let Some(children) = node.children() {
            out.push('[');
            describe(arena, children, out);
            out.push(']');
        }
        out.push(' ');
    }
}

/// Every paragraph and heading in the document, depth first.
fn leaves(doc: &Document) -> Vec<&Block> {
    let mut found = Vec::new();
    let mut pending = vec![doc.root];
    while let Some(list) = pending.pop() {
        for block in doc.blocks.iter(list) {
            if let Some(children) = block.block_children() {
                pending.push(children);
            } else if block.inline_content().is_some() {
                found.push(block);
            }
        }
    }
    found
}

fn assert_reparse_matches(input: &str) {
    let doc = parse(input);
    for leaf in leaves(&doc) {
        let (raw, children) = leaf.inline_content().unwrap();
        let mut in_doc = String::new();
        describe(&doc.inlines, children, &mut in_doc);

        let mut arena = Arena::new();
        let out = arena.new_list();
        parse_inlines(raw, &mut arena, out, &doc.refs);
        let mut alone = String::new();
        describe(&arena, out, &mut alone);

        assert_eq!(in_doc, alone, "re-parse of {raw:?} differs");
    }
}

#[test]
fn test_container_balance_on_samples() {
    let samples = [
        "> a\n> > b\nc\n",
        "- a\n  - b\n\n    c\n- d\n",
        "1. x\n   > y\n   z\n\n2. w\n",
        "> - a\n>\n> - b\n\n- c\n",
        "-\n\n  foo\n",
        "> ```\n> code\n\nafter\n",
    ];
    for input in samples {
        let doc = parse(input);
        assert_eq!(
            doc.stats.container_pushes, doc.stats.container_exits,
            "unbalanced containers for {input:?}"
        );
    }
}

#[test]
fn test_reparse_is_idempotent() {
    assert_reparse_matches(
        "[r]: /ref \"t\"\n\n# *Head* [r]\n\n> a **b** `c`\n> [d](/e) ![f][r]\n\n- <http://x.y> &amp; \\*\n",
    );
}

#[test]
fn test_reference_definition_extraction() {
    let doc = parse("[Foo  Bar]: /url \"title\"\n");
    assert_eq!(doc.top_level().count(), 0);
    let def = doc.refs.get("foo bar").unwrap();
    assert_eq!(def.dest, "/url");
    assert_eq!(def.title.as_deref(), Some("title"));
}

#[test]
fn test_deep_block_quotes() {
    let input = "> ".repeat(1000) + "deep\n";
    let html = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || to_html(&input))
        .unwrap()
        .join()
        .unwrap();
    let limit = marktree::limits::MAX_BLOCK_NESTING;
    assert_eq!(html.matches("<blockquote>").count(), limit);
    assert_eq!(html.matches("</blockquote>").count(), limit);
    assert!(html.contains("deep"));
}

#[test]
fn test_deep_lists() {
    let input: String = (0..300)
        .map(|depth| format!("{}- item\n", "  ".repeat(depth)))
        .collect();
    let doc = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || parse(&input))
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(doc.stats.container_pushes, doc.stats.container_exits);
}

#[test]
fn test_pathological_inlines_finish() {
    let emphasis = "*a ".repeat(5000) + &"b* ".repeat(5000);
    assert!(to_html(&emphasis).starts_with("<p>"));

    let brackets = "[a ".repeat(5000) + "](b)";
    assert!(to_html(&brackets).contains("<a href=\"b\">"));

    let backticks: String = (1..300).map(|n| "`".repeat(n) + " x ").collect();
    assert!(!to_html(&backticks).contains("<code>"));
}

#[test]
fn test_deeply_nested_emphasis_parses() {
    let depth = 50_000;
    let doc = parse(&("*a ".repeat(depth) + &"b* ".repeat(depth)));
    let (_, mut list) = leaves(&doc)[0].inline_content().unwrap();
    let mut level = 0;
    while let Some(children) = doc.inlines.iter(list).find_map(Inline::children) {
        level += 1;
        list = children;
    }
    assert_eq!(level, depth);
    let innermost: Vec<_> = doc.inlines.iter(list).collect();
    assert!(matches!(innermost.as_slice(), [Inline::Text(text)] if text == "a b"));
}

#[test]
fn test_deeply_nested_emphasis_renders() {
    let depth = 5_000;
    let html = to_html(&("*a ".repeat(depth) + &"b* ".repeat(depth)));
    assert_eq!(html.matches("<em>").count(), depth);
    assert!(html.contains("<em>a b</em>"));
    assert!(html.ends_with("</em> b</em> b</em></p>\n"));
}

fn markdownish() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(vec![
        "> ", "- ", "* ", "1. ", "2) ", "    ", "\t", "\n", "\n\n", "# ", "---", "===", "```",
        "~~~", "*", "**", "_", "`", "[", "]", "(", ")", "![", "<", ">", "&amp;", "\\", "a",
        "foo", " ", "<div>", "</div>", "[x]: /u", "\"t\"", "<!--", "-->", "\r\n",
    ]);
    prop::collection::vec(pieces, 0..40).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_never_panics_on_arbitrary_text(input in "\\PC{0,200}") {
        let _ = to_html(&input);
    }

    #[test]
    fn prop_containers_balance(input in markdownish()) {
        let doc = parse(&input);
        prop_assert_eq!(doc.stats.container_pushes, doc.stats.container_exits);
    }

    #[test]
    fn prop_reparse_matches(input in markdownish()) {
        assert_reparse_matches(&input);
    }
}
