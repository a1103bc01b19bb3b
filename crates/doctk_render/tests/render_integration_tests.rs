//! End-to-end rendering tests for doctk_render.

use std::cell::{Cell, RefCell};
use std::fs;
use std::rc::Rc;

use doctk_render::{
    Block, DataObject, DataSource, DocumentGenerator, Image, ImageNode, MemoryTemplates, NodeRef,
    PageBreak, Record, RenderConfig, RenderError, RenderResult, RepeatingNode, Resolver,
    TemplateNode, TextFormatProvider, TokenMarkers, Value,
};
use doctk_render::{FormatProvider, HtmlFormatProvider, Node};
use serde_json::json;
use tempfile::tempdir;

thread_local! {
    static SEEN: RefCell<Vec<Vec<String>>> = RefCell::new(Vec::new());
}

struct LineItem {
    name: &'static str,
    qty: i64,
}

impl DataObject for LineItem {
    fn member(&self, name: &str) -> Option<Value<'static>> {
        match name {
            "Name" => Some(Value::from(self.name)),
            "Qty" => Some(Value::Integer(self.qty)),
            _ => None,
        }
    }
}

/// Repeated row that records the keys of its data source on every render.
#[derive(Default)]
struct Row;

impl Block for Row {
    fn pick_sources(&self, data: &DataSource, _parent: Option<&Resolver<'_>>) -> RenderResult<()> {
        SEEN.with(|seen| seen.borrow_mut().push(data.keys()));
        Ok(())
    }
}

#[derive(Default)]
struct Greeting;

impl Block for Greeting {
    fn member(&self, name: &str, _data: &DataSource) -> Option<Value<'_>> {
        match name {
            "Name" => Some(Value::from("World")),
            "Payload" => Some(Value::Bytes(b"<raw & bytes>".to_vec())),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Hidden;

impl Block for Hidden {
    fn is_visible(&self, _resolver: &Resolver<'_>) -> RenderResult<bool> {
        Ok(false)
    }
}

fn render(templates: MemoryTemplates, root: NodeRef) -> RenderResult<String> {
    DocumentGenerator::html(templates, TokenMarkers::Braces).generate_to_string(&[root], None)
}

fn items() -> Vec<LineItem> {
    vec![
        LineItem { name: "Pen", qty: 2 },
        LineItem { name: "Ink", qty: 1 },
        LineItem { name: "Pad", qty: 5 },
    ]
}

#[test]
fn test_hello_world_through_me() {
    let templates = MemoryTemplates::new().with_template("Greeting", "htm", "Hello <!--{me.Name}-->!");
    let provider = HtmlFormatProvider::new(templates);
    let node = TemplateNode::<Greeting>::default();

    let mut out = Vec::new();
    node.write_output(&mut out, &provider, None, None).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "Hello World!");
}

#[test]
fn test_unresolved_name_without_parent_is_empty() {
    let templates = MemoryTemplates::new().with_template("Page", "htm", "Hello <!--{Missing}-->!");
    let provider = HtmlFormatProvider::new(templates);
    let node = TemplateNode::named("Page");

    let mut out = Vec::new();
    node.write_output(&mut out, &provider, None, None).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "Hello !");
}

#[test]
fn test_repeating_node_renders_once_per_item() {
    SEEN.with(|seen| seen.borrow_mut().clear());
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "<ul>{{Lines}}</ul>")
        .with_template("Row", "htm", "<li>{{LineItem.Name}} x{{LineItem.Qty}}</li>");

    let page = TemplateNode::named("Page");
    page.add("Lines", Rc::new(RepeatingNode::<Row>::new(items())));

    let out = render(templates, Rc::new(page)).unwrap();
    assert_eq!(
        out,
        "<ul><li>Pen x2</li><li>Ink x1</li><li>Pad x5</li></ul>"
    );

    let seen = SEEN.with(|seen| seen.borrow().clone());
    assert_eq!(seen.len(), 3);
    for keys in seen {
        assert_eq!(keys, vec!["LineItem".to_string()]);
    }
}

#[test]
fn test_repeating_node_without_items_renders_nothing() {
    SEEN.with(|seen| seen.borrow_mut().clear());
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "[{{Lines}}]")
        .with_template("Row", "htm", "row");

    let page = TemplateNode::named("Page");
    page.add("Lines", Rc::new(RepeatingNode::<Row>::new(Vec::<LineItem>::new())));

    assert_eq!(render(templates, Rc::new(page)).unwrap(), "[]");
    assert!(SEEN.with(|seen| seen.borrow().is_empty()));
}

#[test]
fn test_repeating_node_selects_from_ancestor_data() {
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "{{Lines}}")
        .with_template("Row", "htm", "{{Lines.Name}};");

    let page = TemplateNode::named("Page");
    Record::new("Order", json!({"Lines": [{"Name": "a"}, {"Name": "b"}]}))
        .install(page.data_source());
    page.add(
        "Lines",
        Rc::new(RepeatingNode::<Row>::with_selector(|resolver| {
            resolver.resolve("Order.Lines")
        })),
    );

    assert_eq!(render(templates, Rc::new(page)).unwrap(), "a;b;");
}

#[test]
fn test_repeating_node_rejects_null_items() {
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "{{Lines}}")
        .with_template("Row", "htm", "row");

    let page = TemplateNode::named("Page");
    page.add(
        "Lines",
        Rc::new(RepeatingNode::<Row>::from_values(vec![
            Value::from("a"),
            Value::Null,
        ])),
    );

    let err = render(templates, Rc::new(page)).unwrap_err();
    assert!(matches!(err, RenderError::NullItem { index: 1 }));
}

#[test]
fn test_area_takes_precedence_over_data_source() {
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "{{Items}}|{{subparts.Items}}")
        .with_template("Child", "htm", "from-area");

    let page = TemplateNode::named("Page");
    Record::new("Items", json!("from-data")).install(page.data_source());
    page.add("Items", Rc::new(TemplateNode::named("Child")));

    assert_eq!(render(templates, Rc::new(page)).unwrap(), "from-area|from-area");
}

#[test]
fn test_child_resolves_through_parent_chain() {
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "{{Body}}")
        .with_template("Child", "htm", "#{{Invoice.Number}} {{Generator.FormatProviderType}}");

    let page = TemplateNode::named("Page");
    Record::new("Invoice", json!({"Number": 42})).install(page.data_source());
    page.add("Body", Rc::new(TemplateNode::named("Child")));

    assert_eq!(
        render(templates, Rc::new(page)).unwrap(),
        "#42 HtmlFormatProvider"
    );
}

#[test]
fn test_resolved_text_is_escaped_but_template_text_is_not() {
    let templates = MemoryTemplates::new().with_template("Page", "htm", "<b>{{Note}}</b>");

    let page = TemplateNode::named("Page");
    Record::new("Note", json!("a < b")).install(page.data_source());

    assert_eq!(
        render(templates, Rc::new(page)).unwrap(),
        "<b>a&nbsp;&lt;&nbsp;b</b>"
    );
}

#[test]
fn test_bytes_are_copied_verbatim() {
    let templates = MemoryTemplates::new().with_template("Greeting", "htm", "{{me.Payload}}");
    let out = render(templates, Rc::new(TemplateNode::<Greeting>::default())).unwrap();
    assert_eq!(out, "<raw & bytes>");
}

#[test]
fn test_image_node_writes_data_uri() {
    let templates = MemoryTemplates::new().with_template("Page", "htm", "<img src=\"{{Logo}}\">");

    let page = TemplateNode::named("Page");
    page.add("Logo", Rc::new(ImageNode::new(Image::png(vec![1, 2, 3]))));

    assert_eq!(
        render(templates, Rc::new(page)).unwrap(),
        "<img src=\"data:image/png;base64,AQID\">"
    );
}

#[test]
fn test_scope_override_selects_template_variant() {
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "{{Body}} {{Body~mail}}")
        .with_template("Child", "htm", "web")
        .with_template("Child", "mail", "mail");

    let page = TemplateNode::named("Page");
    page.add("Body", Rc::new(TemplateNode::named("Child")));

    assert_eq!(render(templates, Rc::new(page)).unwrap(), "web mail");
}

#[test]
fn test_format_spec_is_applied() {
    let templates = MemoryTemplates::new().with_template("Page", "htm", "{{Invoice.Total:F2}}");

    let page = TemplateNode::named("Page");
    Record::new("Invoice", json!({"Total": 12.3456})).install(page.data_source());

    assert_eq!(render(templates, Rc::new(page)).unwrap(), "12.35");
}

#[test]
fn test_invisible_node_renders_nothing() {
    let templates = MemoryTemplates::new().with_template("Page", "htm", "[{{Body}}]");

    let page = TemplateNode::named("Page");
    page.add("Body", Rc::new(TemplateNode::<Hidden>::default()));

    // No Hidden template exists; it must not even be opened.
    assert_eq!(render(templates, Rc::new(page)).unwrap(), "[]");
}

fn gated_lines(selected: Rc<Cell<usize>>) -> RepeatingNode<Row> {
    RepeatingNode::<Row>::with_selector(move |resolver| {
        selected.set(selected.get() + 1);
        resolver.resolve("Order.Lines")
    })
    .visible_when(|resolver| {
        let show = resolver.resolve("Order.ShowLines")?;
        Ok(matches!(show, Value::Bool(true)))
    })
}

#[test]
fn test_repeating_node_visibility_gates_selector() {
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "[{{Lines}}]")
        .with_template("Row", "htm", "{{Lines.Name}};");

    let selected = Rc::new(Cell::new(0));
    let hidden = TemplateNode::named("Page");
    Record::new("Order", json!({"ShowLines": false, "Lines": [{"Name": "a"}]}))
        .install(hidden.data_source());
    hidden.add("Lines", Rc::new(gated_lines(selected.clone())));

    assert_eq!(render(templates.clone(), Rc::new(hidden)).unwrap(), "[]");
    assert_eq!(selected.get(), 0);

    let shown = TemplateNode::named("Page");
    Record::new("Order", json!({"ShowLines": true, "Lines": [{"Name": "a"}]}))
        .install(shown.data_source());
    shown.add("Lines", Rc::new(gated_lines(selected.clone())));

    assert_eq!(render(templates, Rc::new(shown)).unwrap(), "[a;]");
    assert_eq!(selected.get(), 1);
}

#[test]
fn test_page_break_node() {
    let templates = MemoryTemplates::new().with_template("Page", "htm", "a{{Break}}b");

    let page = TemplateNode::named("Page");
    page.add("Break", Rc::new(PageBreak::new()));

    assert_eq!(
        render(templates, Rc::new(page)).unwrap(),
        "a<p id=\"pagebreak\">\nb"
    );
}

#[test]
fn test_missing_member_is_an_error() {
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "{{Lines}}")
        .with_template("Row", "htm", "{{LineItem.Price}}");

    let page = TemplateNode::named("Page");
    page.add("Lines", Rc::new(RepeatingNode::<Row>::new(items())));

    let err = render(templates, Rc::new(page)).unwrap_err();
    assert!(
        matches!(err, RenderError::MemberLookup { ref target, ref member } if target == "LineItem" && member == "Price")
    );
}

#[test]
fn test_missing_template_is_an_error() {
    let templates = MemoryTemplates::new().with_template("Page", "htm", "{{Body~pdf}}");

    let page = TemplateNode::named("Page");
    page.add("Body", Rc::new(TemplateNode::named("Child")));

    let err = render(templates, Rc::new(page)).unwrap_err();
    assert!(matches!(err, RenderError::TemplateNotFound(ref name) if name == "Child.Template.pdf"));
}

#[test]
fn test_rendering_is_deterministic() {
    let templates = MemoryTemplates::new()
        .with_template("Page", "htm", "<h1>{{Title}}</h1><ul>{{Lines}}</ul>")
        .with_template("Row", "htm", "<li>{{LineItem.Name}}</li>");

    let page = TemplateNode::named("Page");
    Record::new("Title", json!("Order #7")).install(page.data_source());
    page.add("Lines", Rc::new(RepeatingNode::<Row>::new(items())));
    let roots: Vec<NodeRef> = vec![Rc::new(page)];

    let generator = DocumentGenerator::html(templates, TokenMarkers::Braces);
    let first = generator.generate_to_string(&roots, None).unwrap();
    let second = generator.generate_to_string(&roots, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_text_provider() {
    let templates = MemoryTemplates::new().with_template("Page", "txt", "Dear {{Customer.Name}},");
    let generator =
        DocumentGenerator::new(TextFormatProvider::new(templates).with_markers(TokenMarkers::Braces));
    assert_eq!(generator.provider().name(), "TextFormatProvider");

    let page = TemplateNode::named("Page");
    Record::new("Customer", json!({"Name": "Ada <Admin>"})).install(page.data_source());

    let out = generator
        .generate_to_string(&[Rc::new(page) as NodeRef], None)
        .unwrap();
    assert_eq!(out, "Dear Ada <Admin>,");
}

#[test]
fn test_directory_templates_from_config() {
    let temp = tempdir().unwrap();
    let template_dir = temp.path().join("templates");
    fs::create_dir(&template_dir).unwrap();
    fs::write(
        template_dir.join("Letter.Template.htm"),
        "Hi {{Customer.Name}}",
    )
    .unwrap();

    let config_path = temp.path().join("render.yaml");
    fs::write(
        &config_path,
        format!(
            "markers: braces\ntemplate_dir: {}\ndocument_shell: true\n",
            template_dir.display()
        ),
    )
    .unwrap();

    let generator = RenderConfig::load(&config_path)
        .unwrap()
        .build_generator()
        .unwrap();

    let letter = TemplateNode::named("Letter");
    Record::new("Customer", json!({"Name": "Ada Lovelace"})).install(letter.data_source());

    let out = generator
        .generate_to_string(&[Rc::new(letter) as NodeRef], None)
        .unwrap();
    assert!(out.starts_with("<!DOCTYPE html>"));
    assert!(out.contains("<body>\nHi Ada&nbsp;Lovelace</body>"));
}
