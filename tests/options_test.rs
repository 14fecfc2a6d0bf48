use rs_chanscrape::{Options, RuleTable};

#[derive(Default)]
struct Seen {
    values: Vec<String>,
}

fn table(options: Options) -> RuleTable<Seen> {
    RuleTable::<Seen>::builder()
        .options(options)
        .name("a")
        .open(|seen, _, attrs| {
            seen.values.push(attrs.get_or_empty("href").to_string());
            Ok(false)
        })
        .build()
        .expect("table")
}

#[test]
fn options_default_values_are_sensible() {
    let options = Options::default();
    assert!(options.decode_attribute_entities);
    assert!(options.flush_capture_at_eof);
    assert_eq!(options.raw_text_elements, vec!["script", "style"]);
}

#[test]
fn options_struct_update_syntax_overrides_selected_fields_only() {
    let options = Options {
        flush_capture_at_eof: false,
        ..Options::default()
    };
    assert!(!options.flush_capture_at_eof);
    assert!(options.decode_attribute_entities);
    assert!(options.is_raw_text_element("SCRIPT"));
}

#[test]
fn attribute_entities_follow_option() {
    let source = r#"<a href="/b/res/1.html?a=1&amp;b=2">x</a>"#;

    let mut seen = Seen::default();
    table(Options::default()).parse(source, &mut seen).expect("parse");
    assert_eq!(seen.values, vec!["/b/res/1.html?a=1&b=2"]);

    let mut seen = Seen::default();
    let raw = Options {
        decode_attribute_entities: false,
        ..Options::default()
    };
    table(raw).parse(source, &mut seen).expect("parse");
    assert_eq!(seen.values, vec!["/b/res/1.html?a=1&amp;b=2"]);
}

#[test]
fn raw_text_elements_hide_markup_in_scripts() {
    let source = r#"<script>document.write('<a href="/fake">');</script><a href="/real">r</a>"#;

    let mut seen = Seen::default();
    table(Options::default()).parse(source, &mut seen).expect("parse");
    assert_eq!(seen.values, vec!["/real"]);

    let mut seen = Seen::default();
    let no_raw = Options {
        raw_text_elements: Vec::new(),
        ..Options::default()
    };
    table(no_raw).parse(source, &mut seen).expect("parse");
    assert_eq!(seen.values, vec!["/fake", "/real"]);
}
