//! Per-operator behavior, exercised through full injection runs.

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::dom::{Document, Element};
    use crate::element::ElementHandle;
    use crate::error::TemplateError;
    use crate::template::Template;

    fn render(html: &str, model: Value) -> Template<Document> {
        let template = Template::new(Document::parse(html).unwrap());
        template.inject_value(model).unwrap();
        template
    }

    fn render_err(html: &str, model: Value) -> TemplateError {
        let template = Template::new(Document::parse(html).unwrap());
        template.inject_value(model).unwrap_err()
    }

    fn by_id(template: &Template<Document>, id: &str) -> Element {
        template.document().get_element_by_id(id).unwrap()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ATTRIBUTE OPERATORS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_attr_sets_and_removes() {
        let t = render(
            r#"<a id="a" href="/old" rel="x" data-attr="href:url;rel:rel;data-count:count"></a>"#,
            json!({ "url": "/new", "rel": null, "count": 3 }),
        );
        let a = by_id(&t, "a");
        assert_eq!(a.get_attr("href").as_deref(), Some("/new"));
        assert!(!a.has_attr("rel"));
        assert_eq!(a.get_attr("data-count").as_deref(), Some("3"));
    }

    #[test]
    fn test_attr_invalid_expression() {
        let err = render_err(r#"<a data-attr="href"></a>"#, json!({}));
        assert!(matches!(err, TemplateError::InvalidExpression { .. }));
    }

    #[test]
    fn test_id_coerces_numbers() {
        let t = render(
            r#"<div data-object="item"><p class="row" data-id="key"></p></div>"#,
            json!({ "item": { "key": 17 } }),
        );
        assert!(t.document().get_element_by_id("17").is_some());
    }

    #[test]
    fn test_href_and_title() {
        let t = render(
            r#"<a id="a" title="old" data-href="link" data-title="caption"></a>"#,
            json!({ "link": "/docs", "caption": null }),
        );
        let a = by_id(&t, "a");
        assert_eq!(a.get_attr("href").as_deref(), Some("/docs"));
        assert!(!a.has_attr("title"));
    }

    #[test]
    fn test_href_requires_string() {
        let t = render(r#"<a id="a" href="/keep" data-href="link"></a>"#, json!({ "link": 5 }));
        assert_eq!(by_id(&t, "a").get_attr("href").as_deref(), Some("/keep"));
    }

    #[test]
    fn test_src() {
        let t = render(r#"<img id="i" data-src="picture">"#, json!({ "picture": "a.png" }));
        assert_eq!(by_id(&t, "i").get_attr("src").as_deref(), Some("a.png"));

        let err = render_err(r#"<div data-src="picture"></div>"#, json!({ "picture": "a.png" }));
        assert!(matches!(err, TemplateError::UnsupportedElement { operator: "SRC", .. }));
    }

    #[test]
    fn test_value_on_controls() {
        let t = render(
            r#"<input id="text" data-value="name">
               <input id="check" type="checkbox" data-value="agreed">
               <input id="radio" type="radio" value="b" data-value="choice">
               <textarea id="area" data-value="notes"></textarea>
               <select id="sel" data-value="choice"><option value="a" selected>A</option><option value="b">B</option></select>
               <div id="holder" data-value="count"></div>"#,
            json!({ "name": "Ann", "agreed": true, "choice": "b", "notes": "n1", "count": 4 }),
        );
        assert_eq!(by_id(&t, "text").get_attr("value").as_deref(), Some("Ann"));
        assert!(by_id(&t, "check").has_attr("checked"));
        assert!(by_id(&t, "radio").has_attr("checked"));
        assert_eq!(by_id(&t, "area").text(), "n1");
        let options = by_id(&t, "sel").children();
        assert!(!options[0].has_attr("selected"));
        assert!(options[1].has_attr("selected"));
        assert_eq!(by_id(&t, "holder").text(), "4");
    }

    #[test]
    fn test_value_null_resets_control() {
        let t = render(
            r#"<input id="text" value="old" data-value="name"><input id="check" type="checkbox" checked data-value="agreed">"#,
            json!({ "name": null, "agreed": null }),
        );
        assert!(!by_id(&t, "text").has_attr("value"));
        assert!(!by_id(&t, "check").has_attr("checked"));
    }

    #[test]
    fn test_value_on_unsupported_element() {
        let err = render_err(r#"<span data-value="name"></span>"#, json!({ "name": "x" }));
        assert!(matches!(err, TemplateError::UnsupportedElement { operator: "VALUE", .. }));
    }

    #[test]
    fn test_css_class_toggles() {
        let t = render(
            r#"<li id="a" class="item" data-css-class="active:state;odd:flags;new:fresh;gone:missing"></li>"#,
            json!({ "state": "active", "flags": ["odd", "first"], "fresh": false, "missing": null }),
        );
        let li = by_id(&t, "a");
        assert!(li.has_css_class("item"));
        assert!(li.has_css_class("active"));
        assert!(li.has_css_class("odd"));
        assert!(!li.has_css_class("new"));
        assert!(!li.has_css_class("gone"));
    }

    #[test]
    fn test_css_class_removes_on_mismatch() {
        let t = render(
            r#"<li id="a" class="item active" data-css-class="active:state"></li>"#,
            json!({ "state": "idle" }),
        );
        assert_eq!(by_id(&t, "a").get_attr("class").as_deref(), Some("item"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CONTENT OPERATORS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_text_rejects_element_with_children() {
        let err = render_err(r#"<p data-text="t"><b>x</b></p>"#, json!({ "t": "x" }));
        assert!(matches!(err, TemplateError::ElementHasChildren { operator: "TEXT", .. }));
    }

    #[test]
    fn test_text_empty_string_removes_text() {
        let t = render(r#"<p id="p" data-text="t">old</p>"#, json!({ "t": "" }));
        assert_eq!(by_id(&t, "p").text(), "");
    }

    #[test]
    fn test_text_is_escaped_on_serialization() {
        let t = render(r#"<p id="p" data-text="t"></p>"#, json!({ "t": "<b>&</b>" }));
        assert_eq!(by_id(&t, "p").inner_html(), "&lt;b&gt;&amp;&lt;/b&gt;");
    }

    #[test]
    fn test_html_sets_markup() {
        let t = render(
            r#"<div id="d" data-html="body"><i>old</i></div>"#,
            json!({ "body": "<b>bold</b> text" }),
        );
        let div = by_id(&t, "d");
        assert_eq!(div.inner_html(), "<b>bold</b> text");
        assert_eq!(div.children()[0].tag(), "b");
    }

    #[test]
    fn test_html_null_removes_children() {
        let t = render(r#"<div id="d" data-html="body"><i>old</i></div>"#, json!({ "body": null }));
        assert_eq!(by_id(&t, "d").inner_html(), "");
    }

    #[test]
    fn test_html_markup_is_not_walked() {
        let t = render(
            r#"<div id="d" data-html="body"></div>"#,
            json!({ "body": r#"<span id="inner" data-text="x">raw</span>"#, "x": "walked" }),
        );
        assert_eq!(by_id(&t, "inner").text(), "raw");
    }

    #[test]
    fn test_html_wrong_type_keeps_content() {
        let t = render(r#"<div id="d" data-html="body"><i>old</i></div>"#, json!({ "body": [1] }));
        assert_eq!(by_id(&t, "d").inner_html(), "<i>old</i>");
    }

    #[test]
    fn test_object_requires_object_for_paths() {
        let t = render(
            r#"<div data-object="user"><span id="s" data-text="name">keep</span></div>"#,
            json!({ "user": "Ann", "name": "root" }),
        );
        assert_eq!(by_id(&t, "s").text(), "keep");
    }

    #[test]
    fn test_object_with_scalar_item_scope() {
        let t = render(
            r#"<ul data-list="tags"><li><em data-text="."></em></li></ul>"#,
            json!({ "tags": ["x", "y"] }),
        );
        let ems: Vec<String> = t
            .document()
            .elements_by_tag("em")
            .iter()
            .map(|el| el.text())
            .collect();
        assert_eq!(ems, vec!["x", "y"]);
    }

    #[test]
    fn test_numbering_formats() {
        let t = render(
            r#"<ol data-olist="items"><li><b data-numbering="%n"></b><i data-numbering="%s"></i><u data-numbering="%i"></u></li></ol>"#,
            json!({ "items": [{}, {}, {}, {}] }),
        );
        let collect = |tag: &str| -> Vec<String> {
            t.document()
                .elements_by_tag(tag)
                .iter()
                .map(|el| el.text())
                .collect()
        };
        assert_eq!(collect("b"), vec!["1", "2", "3", "4"]);
        assert_eq!(collect("i"), vec!["a", "b", "c", "d"]);
        assert_eq!(collect("u"), vec!["i", "ii", "iii", "iv"]);
    }

    #[test]
    fn test_numbering_invalid_code() {
        let err = render_err(
            r#"<ol data-olist="items"><li><b data-numbering="%x"></b></li></ol>"#,
            json!({ "items": [{}] }),
        );
        assert!(matches!(err, TemplateError::InvalidNumberingFormat { .. }));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CONTROL OPERATORS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_case_invalid_expressions() {
        let err = render_err(r#"<p data-case="status"></p>"#, json!({ "status": "a" }));
        assert!(matches!(err, TemplateError::InvalidExpression { .. }));
        let err = render_err(r#"<p data-case="status:"></p>"#, json!({ "status": "a" }));
        assert!(matches!(err, TemplateError::InvalidExpression { .. }));
    }

    #[test]
    fn test_case_literal_may_contain_separator() {
        let t = render(r#"<p id="p" data-case="time:12:30">x</p>"#, json!({ "time": "12:30" }));
        assert!(!by_id(&t, "p").has_css_class("hidden"));
    }

    #[test]
    fn test_if_emptiness() {
        let t = render(
            r#"<p id="zero" data-if="zero">x</p><p id="text" data-if="text">x</p><p id="obj" data-if="obj">x</p><p id="empty" data-if="empty">x</p>"#,
            json!({ "zero": 0, "text": "t", "obj": { "a": 1 }, "empty": {} }),
        );
        assert!(by_id(&t, "zero").has_css_class("hidden"));
        assert!(!by_id(&t, "text").has_css_class("hidden"));
        assert!(!by_id(&t, "obj").has_css_class("hidden"));
        assert!(by_id(&t, "empty").has_css_class("hidden"));
    }
}
