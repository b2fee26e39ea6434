use codepress_widget_lowering::{
    emit, transform_source, widget::ELEMENT_MAPPINGS, TransformConfig, TransformOutput, WidgetChildren,
};
use pretty_assertions::assert_eq;

fn transform(jsx: &str) -> TransformOutput {
    let source = format!("export default function Screen() {{ return {jsx}; }}");
    transform_source(&source, "Screen.jsx", &TransformConfig::default()).expect("transform")
}

fn code(jsx: &str) -> String {
    transform(jsx).code
}

const HEADLINE: &str = "Theme.of(context).textTheme";

fn styled_text(style: &str) -> String {
    format!("Text(\n  'x',\n  style: {style}\n)")
}

#[test]
fn every_mapping_row_has_a_golden() {
    let plain_text = "Text(\n  'x'\n)".to_string();
    let bold = styled_text("const TextStyle(fontWeight: FontWeight.bold)");
    let italic = styled_text("const TextStyle(fontStyle: FontStyle.italic)");
    let cases: Vec<(&str, &str, String)> = vec![
        ("div", "<div />", "Container()".into()),
        ("section", "<section />", "Column()".into()),
        ("header", "<header />", "Column()".into()),
        ("footer", "<footer />", "Column()".into()),
        ("main", "<main />", "Column()".into()),
        ("article", "<article />", "Column()".into()),
        ("aside", "<aside />", "Column()".into()),
        ("span", "<span>x</span>", plain_text.clone()),
        ("p", "<p>x</p>", plain_text.clone()),
        ("h1", "<h1>x</h1>", styled_text(&format!("{HEADLINE}.headlineLarge"))),
        ("h2", "<h2>x</h2>", styled_text(&format!("{HEADLINE}.headlineMedium"))),
        ("h3", "<h3>x</h3>", styled_text(&format!("{HEADLINE}.headlineSmall"))),
        ("h4", "<h4>x</h4>", styled_text(&format!("{HEADLINE}.titleLarge"))),
        ("h5", "<h5>x</h5>", styled_text(&format!("{HEADLINE}.titleMedium"))),
        ("h6", "<h6>x</h6>", styled_text(&format!("{HEADLINE}.titleSmall"))),
        ("label", "<label>x</label>", plain_text.clone()),
        ("strong", "<strong>x</strong>", bold.clone()),
        ("b", "<b>x</b>", bold),
        ("em", "<em>x</em>", italic.clone()),
        ("i", "<i>x</i>", italic),
        ("small", "<small>x</small>", styled_text(&format!("{HEADLINE}.bodySmall"))),
        ("code", "<code>x</code>", styled_text("const TextStyle(fontFamily: 'monospace')")),
        ("button", "<button>x</button>", "ElevatedButton(\n  child: Text(\n    'x'\n  )\n)".into()),
        ("a", "<a>x</a>", "InkWell(\n  onTap: () {},\n  child: Text(\n    'x'\n  )\n)".into()),
        ("img", "<img src=\"a.png\" />", "Image.network(\n  'a.png'\n)".into()),
        ("input", "<input />", "TextField()".into()),
        ("textarea", "<textarea />", "TextField(\n  maxLines: null\n)".into()),
        ("ul", "<ul />", "ListView(\n  shrinkWrap: true\n)".into()),
        ("ol", "<ol />", "ListView(\n  shrinkWrap: true\n)".into()),
        ("li", "<li>x</li>", "ListTile(\n  title: Text(\n    'x'\n  )\n)".into()),
        ("nav", "<nav />", "Row()".into()),
        ("form", "<form />", "Form()".into()),
        ("hr", "<hr />", "Divider()".into()),
        ("br", "<br />", "const SizedBox.shrink()".into()),
        ("select", "<select />", "DropdownButton(\n  onChanged: (value) {}\n)".into()),
        ("option", "<option>x</option>", "DropdownMenuItem(\n  child: Text(\n    'x'\n  )\n)".into()),
        ("table", "<table />", "Table()".into()),
        ("tr", "<tr />", "TableRow()".into()),
        ("td", "<td />", "TableCell()".into()),
        ("th", "<th />", "TableCell()".into()),
    ];

    let covered: Vec<&str> = cases.iter().map(|(tag, _, _)| *tag).collect();
    let rows: Vec<&str> = ELEMENT_MAPPINGS.iter().map(|r| r.source_tag).collect();
    assert_eq!(covered, rows);

    for (tag, jsx, expected) in &cases {
        assert_eq!(&code(jsx), expected, "<{tag}>");
    }
}

#[test]
fn end_to_end_container_with_button() {
    let out = transform(r#"<div className="row"><button onClick={fn}>Go</button></div>"#);
    let expected = "\
Container(
  // className: row
  child: ElevatedButton(
    onPressed: fn,
    child: Text(
      'Go'
    )
  )
)";
    assert_eq!(out.code, expected);
    assert!(out.widget_tree.class_names.contains("row"));
}

#[test]
fn emission_is_deterministic() {
    let jsx = r#"<ul><li key={item.id}>{item.name}</li><li>b</li></ul>"#;
    let first = transform(jsx);
    let second = transform(jsx);
    assert_eq!(first.code, second.code);
    assert_eq!(emit(&first.widget_tree.root), first.code);
}

#[test]
fn attributes_keep_source_order() {
    let got = code(r#"<input type="password" placeholder="Name" data-test="a" onChange={save} />"#);
    let expected = "\
TextField(
  obscureText: true,
  decoration: InputDecoration(
    hintText: 'Name'
  ),
  // data-test: unhandled attribute (a)
  onChanged: save
)";
    assert_eq!(got, expected);
}

#[test]
fn text_payload_moves_to_the_front() {
    let got = code(r#"<h1 id="t">Hi</h1>"#);
    let expected = "\
Text(
  'Hi',
  key: Key('t'),
  style: Theme.of(context).textTheme.headlineLarge
)";
    assert_eq!(got, expected);
}

#[test]
fn children_block_forces_trailing_commas() {
    let got = code(r#"<section id="s"><span>a</span></section>"#);
    let expected = "\
Column(
  key: Key('s'),
  children: [
    Text(
      'a'
    ),
  ]
)";
    assert_eq!(got, expected);

    let without_children = code(r#"<section id="s" />"#);
    assert_eq!(without_children, "Column(\n  key: Key('s')\n)");
}

#[test]
fn unhandled_attributes_surface_as_comments() {
    let out = transform(r#"<div role="banner" tabIndex={0} />"#);
    assert!(out.code.contains("// role: unhandled attribute (banner)"));
    assert!(out.code.contains("// tabIndex: unhandled attribute (0)"));
    assert_eq!(
        out.diagnostics
            .iter()
            .filter(|d| d.message.contains("has no lowering rule"))
            .count(),
        2
    );
}

#[test]
fn several_children_in_a_single_slot_get_one_vertical_wrapper() {
    for jsx in [
        "<button><span>a</span><span>b</span></button>",
        "<div><nav /><span>a</span><span>b</span><span>c</span></div>",
        "<li>a<b>b</b></li>",
    ] {
        let out = transform(jsx);
        let WidgetChildren::Single { node, .. } = &out.widget_tree.root.children else {
            panic!("expected a single child slot for {jsx}");
        };
        assert_eq!(node.target_tag, "Column", "{jsx}");
        assert_eq!(out.code.matches("Column(").count(), 1, "{jsx}");
    }
}

#[test]
fn fragment_roots_share_a_wrapper() {
    let got = code("<><hr /><br /></>");
    assert_eq!(got, "Column(\n  children: [\n    Divider(),\n    const SizedBox.shrink(),\n  ]\n)");
}

#[test]
fn list_render_children_become_placeholders() {
    let out = transform("<ul>{items.map(i => <li>{i}</li>)}</ul>");
    assert!(out.code.starts_with("ListView(\n  shrinkWrap: true,\n  children: [\n    Placeholder(\n      // list render: "));
    assert!(out.diagnostics.iter().any(|d| d.message.starts_with("list render")));
}

#[test]
fn nested_text_element_attributes_become_comments() {
    let out = transform(r#"<p>Hello <strong className="hl" data-x="1" onClick={go}>w</strong></p>"#);
    let expected = "\
Text(
  // <strong> className: hl
  'Hello w'
  // <strong> data-x: unhandled attribute (1)
  // <strong> onClick: unhandled attribute (go)
)";
    assert_eq!(out.code, expected);
    assert!(out.widget_tree.class_names.contains("hl"));
}

#[test]
fn empty_string_expressions_add_no_text() {
    assert_eq!(code(r#"<p>a{""}b</p>"#), "Text(\n  'a b'\n)");
}

#[test]
fn named_constructors_keep_attribute_comments() {
    let got = code(r#"<br data-x="1" className="gap" />"#);
    assert_eq!(got, "SizedBox.shrink(\n  // className: gap\n  // data-x: unhandled attribute (1)\n)");
}

#[test]
fn disabled_lowers_to_enabled() {
    assert_eq!(
        code("<button disabled>Go</button>"),
        "ElevatedButton(\n  enabled: false,\n  child: Text(\n    'Go'\n  )\n)"
    );
    assert_eq!(code("<input disabled={true} />"), "TextField(\n  enabled: false\n)");
    assert_eq!(code("<input disabled={busy} />"), "TextField(\n  enabled: !(busy)\n)");
}

#[test]
fn value_lowers_by_element_and_literal_kind() {
    assert_eq!(code("<input value={name} />"), "TextField(\n  // value: name (external controller needed)\n)");
    assert_eq!(
        code(r#"<input value="Ada" />"#),
        "TextField(\n  controller: TextEditingController(text: 'Ada')\n)"
    );
    assert_eq!(
        code("<input value={3} />"),
        "TextField(\n  controller: TextEditingController(text: '3')\n)"
    );
    assert_eq!(
        code(r#"<option value="a">A</option>"#),
        "DropdownMenuItem(\n  value: 'a',\n  child: Text(\n    'A'\n  )\n)"
    );
}

#[test]
fn image_source_and_alt() {
    assert_eq!(
        code(r#"<img src={user.avatar} alt="Avatar" />"#),
        "Image.network(\n  user.avatar,\n  semanticLabel: 'Avatar'\n)"
    );
}

#[test]
fn href_is_kept_as_a_comment() {
    assert_eq!(
        code(r#"<a href="/home">Home</a>"#),
        "InkWell(\n  // href: /home\n  onTap: () {},\n  child: Text(\n    'Home'\n  )\n)"
    );
}

#[test]
fn input_types_pick_a_keyboard() {
    for (ty, keyboard) in [("email", "emailAddress"), ("number", "number"), ("tel", "phone")] {
        assert_eq!(
            code(&format!(r#"<input type="{ty}" />"#)),
            format!("TextField(\n  keyboardType: TextInputType.{keyboard}\n)"),
            "{ty}"
        );
    }
}

#[test]
fn on_click_targets_depend_on_the_element() {
    assert_eq!(code("<div onClick={go} />"), "Container(\n  onTap: go\n)");
    assert_eq!(
        code("<button onClick={go}>S</button>"),
        "ElevatedButton(\n  onPressed: go,\n  child: Text(\n    'S'\n  )\n)"
    );
    assert_eq!(code("<div onClick={() => {}} />"), "Container(\n  onTap: () {}\n)");
}
