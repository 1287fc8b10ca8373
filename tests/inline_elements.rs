//! Inline element tests: emphasis, code spans, links, images, autolinks,
//! raw HTML, escapes, entities and line breaks.

use marktree::to_html;

fn para(inner: &str) -> String {
    format!("<p>{inner}</p>\n")
}

#[test]
fn test_basic_emphasis() {
    assert_eq!(to_html("*foo bar*"), para("<em>foo bar</em>"));
    assert_eq!(to_html("**foo bar**"), para("<strong>foo bar</strong>"));
    assert_eq!(to_html("_foo bar_"), para("<em>foo bar</em>"));
}

#[test]
fn test_flanking_rules() {
    assert_eq!(to_html("a * foo bar*"), para("a * foo bar*"));
    assert_eq!(to_html("foo*bar*"), para("foo<em>bar</em>"));
    assert_eq!(to_html("_foo_bar"), para("_foo_bar"));
    assert_eq!(to_html("foo_bar_"), para("foo_bar_"));
}

#[test]
fn test_rule_of_three() {
    assert_eq!(
        to_html("**foo*bar**baz*"),
        para("<strong>foo*bar</strong>baz*")
    );
    assert_eq!(
        to_html("*foo**bar**baz*"),
        para("<em>foo<strong>bar</strong>baz</em>")
    );
    assert_eq!(to_html("*foo**bar*"), para("<em>foo**bar</em>"));
}

#[test]
fn test_triple_delimiters() {
    assert_eq!(
        to_html("***strong emph***"),
        para("<em><strong>strong emph</strong></em>")
    );
    assert_eq!(
        to_html("***strong** in emph*"),
        para("<em><strong>strong</strong> in emph</em>")
    );
}

#[test]
fn test_code_spans() {
    assert_eq!(to_html("`foo`"), para("<code>foo</code>"));
    assert_eq!(to_html("`` foo ` bar ``"), para("<code>foo ` bar</code>"));
    assert_eq!(to_html("`foo\nbar`"), para("<code>foo bar</code>"));
    assert_eq!(to_html("`foo"), para("`foo"));
    assert_eq!(to_html("*foo`*`"), para("*foo<code>*</code>"));
}

#[test]
fn test_inline_links() {
    assert_eq!(
        to_html("[link](/uri \"title\")"),
        para("<a href=\"/uri\" title=\"title\">link</a>")
    );
    assert_eq!(to_html("[link](</my uri>)"), para("<a href=\"/my%20uri\">link</a>"));
    assert_eq!(to_html("[link]()"), para("<a href=\"\">link</a>"));
}

#[test]
fn test_link_text_may_hold_balanced_brackets() {
    assert_eq!(
        to_html("[link [foo [bar]]](/uri)"),
        para("<a href=\"/uri\">link [foo [bar]]</a>")
    );
}

#[test]
fn test_links_do_not_nest() {
    assert_eq!(
        to_html("[foo [bar](/uri)](/uri)"),
        para("[foo <a href=\"/uri\">bar</a>](/uri)")
    );
}

#[test]
fn test_link_binds_tighter_than_emphasis() {
    assert_eq!(to_html("*[foo*](/uri)"), para("*<a href=\"/uri\">foo*</a>"));
}

#[test]
fn test_reference_links() {
    assert_eq!(
        to_html("[foo][bar]\n\n[bar]: /url \"title\""),
        para("<a href=\"/url\" title=\"title\">foo</a>")
    );
    assert_eq!(to_html("[foo][]\n\n[foo]: /url"), para("<a href=\"/url\">foo</a>"));
    assert_eq!(to_html("[Foo]\n\n[foo]: /url"), para("<a href=\"/url\">Foo</a>"));
}

#[test]
fn test_undefined_references_stay_literal() {
    assert_eq!(to_html("[foo][bar]"), para("[foo][bar]"));
    assert_eq!(to_html("[foo]"), para("[foo]"));
}

#[test]
fn test_reference_label_case_folding() {
    assert_eq!(to_html("[ẞ]\n\n[SS]: /url"), para("<a href=\"/url\">ẞ</a>"));
    assert_eq!(
        to_html("[Foo\n  bar]: /url\n\n[Baz][Foo bar]"),
        para("<a href=\"/url\">Baz</a>")
    );
}

#[test]
fn test_first_definition_wins() {
    assert_eq!(
        to_html("[foo]: first\n[foo]: second\n\n[foo]"),
        para("<a href=\"first\">foo</a>")
    );
}

#[test]
fn test_images() {
    assert_eq!(
        to_html("![foo *bar*](train.jpg \"train & tracks\")"),
        para("<img src=\"train.jpg\" alt=\"foo bar\" title=\"train &amp; tracks\" />")
    );
    assert_eq!(
        to_html("[![moon](moon.jpg)](/uri)"),
        para("<a href=\"/uri\"><img src=\"moon.jpg\" alt=\"moon\" /></a>")
    );
}

#[test]
fn test_autolinks() {
    assert_eq!(
        to_html("<http://foo.bar.baz>"),
        para("<a href=\"http://foo.bar.baz\">http://foo.bar.baz</a>")
    );
    assert_eq!(
        to_html("<foo@bar.example.com>"),
        para("<a href=\"mailto:foo@bar.example.com\">foo@bar.example.com</a>")
    );
    assert_eq!(to_html("<m:abc>"), para("&lt;m:abc&gt;"));
}

#[test]
fn test_raw_html() {
    assert_eq!(to_html("<a><bab><c2c>"), para("<a><bab><c2c>"));
    assert_eq!(to_html("foo <!-- comment -->"), para("foo <!-- comment -->"));
    assert_eq!(to_html("<33> <__>"), para("&lt;33&gt; &lt;__&gt;"));
}

#[test]
fn test_backslash_escapes() {
    assert_eq!(to_html("\\*not emphasized*"), para("*not emphasized*"));
    assert_eq!(to_html("\\a\\b"), para("\\a\\b"));
    assert_eq!(to_html("[foo](/bar\\* \"ti\\*tle\")"), para("<a href=\"/bar*\" title=\"ti*tle\">foo</a>"));
}

#[test]
fn test_entities() {
    assert_eq!(to_html("&copy; &#35; &#x22;"), para("© # &quot;"));
    assert_eq!(to_html("&#0;"), para("\u{FFFD}"));
    assert_eq!(to_html("&nosuch; &"), para("&amp;nosuch; &amp;"));
    assert_eq!(to_html("`&amp;`"), para("<code>&amp;amp;</code>"));
}

#[test]
fn test_line_breaks() {
    assert_eq!(to_html("foo  \nbar"), para("foo<br />\nbar"));
    assert_eq!(to_html("foo\\\nbar"), para("foo<br />\nbar"));
    assert_eq!(to_html("foo \nbar"), para("foo\nbar"));
    assert_eq!(to_html("foo  "), para("foo"));
}

#[test]
fn test_heading_inlines() {
    assert_eq!(
        to_html("## *a* `b` [c](/d)"),
        "<h2><em>a</em> <code>b</code> <a href=\"/d\">c</a></h2>\n"
    );
}
