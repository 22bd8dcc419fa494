/**
 * Formatter Tests
 *
 * End to end formatting through a message context: built-in formatters,
 * spacing rules, locale selection and custom formatters for declared types.
 */

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::Arc;

    use message_format::error::FormatErrorKind;
    use message_format::{
        FormattableObject, FormattableType, FormatterContext, FormatterRegistry, Locale,
        MessageConfig, MessageContext, MessageError, MessageFormatError, ParameterFormatter,
        ParameterMap, Text, Value,
    };

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn format(template: &str, params: &ParameterMap) -> String {
        MessageContext::default()
            .format_template(template, params)
            .unwrap()
    }

    fn format_one(template: &str, name: &str, value: impl Into<Value>) -> String {
        format(template, &ParameterMap::default().with(name, value))
    }

    #[derive(Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl FormattableObject for Point {
        fn type_name(&self) -> &str {
            "point"
        }

        fn to_text(&self) -> String {
            format!("{},{}", self.x, self.y)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Point3d(i32, i32, i32);

    impl FormattableObject for Point3d {
        fn type_name(&self) -> &str {
            "point3d"
        }

        fn to_text(&self) -> String {
            format!("{},{},{}", self.0, self.1, self.2)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct CoordinatesFormatter;

    impl ParameterFormatter for CoordinatesFormatter {
        fn name(&self) -> Option<&str> {
            Some("coords")
        }

        fn formattable_types(&self) -> Vec<FormattableType> {
            vec![FormattableType::new("point")]
        }

        fn format_value(&self, _ctx: &FormatterContext<'_>, value: &Value) -> Result<Text, MessageFormatError> {
            let text = match value {
                Value::Object(object) => match object.as_any().downcast_ref::<Point>() {
                    Some(point) => format!("x={} y={}", point.x, point.y),
                    None => format!("<{}>", object.to_text()),
                },
                other => format!("<{other}>"),
            };
            Ok(Text::no_space(&text))
        }
    }

    #[test]
    fn should_format_choice() {
        let template = "%{n,choice,1:'one item',:'%{n} items'}";
        assert_eq!(format_one(template, "n", 1), "one item");
        assert_eq!(format_one(template, "n", 5), "5 items");
        assert_eq!(format_one(template, "n", 0), "0 items");
    }

    #[test]
    fn should_format_choice_with_relational_keys() {
        let template = "%{n,choice,<0:'negative',0:'zero',>0:'positive'}";
        assert_eq!(format_one(template, "n", -5), "negative");
        assert_eq!(format_one(template, "n", 0), "zero");
        assert_eq!(format_one(template, "n", 7), "positive");
        assert_eq!(format_one(template, "n", "3"), "positive");
    }

    #[test]
    fn should_join_parts_with_single_spaces() {
        let template = "Hello %{name} !";
        assert_eq!(format_one(template, "name", "Ada"), "Hello Ada !");
        assert_eq!(format_one(template, "name", ""), "Hello !");
        assert_eq!(format_one("Hello %{name}", "name", Value::Null), "Hello");
        assert_eq!(format_one("%{a}%{a}", "a", "x"), "xx");
        assert_eq!(format_one("  %{a}  %{b}  ", "b", "y"), "y");
    }

    #[test]
    fn should_format_numbers_with_locale() {
        let german = ParameterMap::new(locale("de")).with("x", 1.5);
        assert_eq!(format("%{x}", &german), "1,5");
        assert_eq!(format_one("%{x}", "x", 1.5), "1.5");
        assert_eq!(format_one("%{x}", "x", 42i64), "42");
        assert_eq!(format_one("%{n,1:'one',:'many'}", "n", 1), "one");
        assert_eq!(format_one("%{n,1:'one',:'many'}", "n", 2), "many");
    }

    #[test]
    fn should_format_booleans() {
        assert_eq!(format_one("%{b}", "b", true), "true");
        assert_eq!(format_one("%{b,true:'yes',false:'no'}", "b", false), "no");
        assert_eq!(format_one("%{n,bool}", "n", 0), "false");
        assert_eq!(format_one("%{n,bool}", "n", 3), "true");
        assert_eq!(format_one("%{s,bool,true:'on',false:'off'}", "s", "TRUE"), "on");
        assert_eq!(format_one("[%{s,bool}]", "s", Value::Null), "[]");
    }

    #[test]
    fn should_format_strings() {
        assert_eq!(format_one("%{s}", "s", "  abc "), "abc");
        assert_eq!(format_one("%{s,'a':'alpha',:'other'}", "s", "a"), "alpha");
        assert_eq!(format_one("%{s,'a':'alpha',:'other'}", "s", "b"), "other");
        assert_eq!(format_one("%{s,empty:'nothing'}", "s", ""), "nothing");
        assert_eq!(format_one("%{s,null:'none',:'x'}", "s", Value::Null), "none");
        assert_eq!(format_one("%{c}", "c", 'z'), "z");
    }

    #[test]
    fn should_clip_long_values() {
        let text = "Hello wonderful world";
        assert_eq!(format_one("%{s,clip,clip-size:10}", "s", text), "Hello w...");
        assert_eq!(format_one("%{s,clip,clip-size:3}", "s", text), "Hello...");
        assert_eq!(format_one("%{s,clip,clip-size:10}", "s", "Hi"), "Hi");
        assert_eq!(format_one("%{s,clip}", "s", text), text);
    }

    #[test]
    fn should_format_sizes() {
        assert_eq!(format_one("%{l,size}", "l", vec![1, 2, 3]), "3");
        assert_eq!(format_one("%{s,size}", "s", "abcd"), "4");
        assert_eq!(format_one("%{s,size}", "s", Value::Null), "0");

        let template = "%{l,size,0:'none',1:'one',:'many'}";
        assert_eq!(format_one(template, "l", Vec::<i32>::new()), "none");
        assert_eq!(format_one(template, "l", vec!["x"]), "one");
        assert_eq!(format_one(template, "l", vec!["x", "y"]), "many");
    }

    #[test]
    fn should_format_lists() {
        let list = || vec![1, 2, 3];
        assert_eq!(format_one("%{l}", "l", list()), "1, 2, 3");
        assert_eq!(format_one("%{l,list-sep-last:' and '}", "l", list()), "1, 2 and 3");
        assert_eq!(format_one("%{l,list-sep:'/'}", "l", list()), "1/2/3");
        assert_eq!(
            format_one("%{l,list-max-size:2,list-value-more:'...'}", "l", list()),
            "1, 2, ..."
        );
        assert_eq!(format_one("%{l,list-max-size:2}", "l", list()), "1, 2");
        assert_eq!(format_one("%{l}", "l", vec!["a", "", "b"]), "a, b");
        assert_eq!(
            format_one("%{l,empty:'no items'}", "l", Vec::<i32>::new()),
            "no items"
        );
    }

    #[test]
    fn should_format_maps() {
        let map = || {
            Value::Map(vec![
                (Value::from("a"), Value::from(1)),
                (Value::from("b"), Value::Null),
            ])
        };
        assert_eq!(format_one("%{m}", "m", map()), "a=1, b=(null)");
        assert_eq!(format_one("%{m,map-kv-sep:': '}", "m", map()), "a: 1, b: (null)");
        assert_eq!(format_one("%{m,map-null-value:'-'}", "m", map()), "a=1, b=-");
        assert_eq!(format_one("%{m,empty:'none'}", "m", Value::Map(Vec::new())), "none");
        assert_eq!(format_one("%{m,size}", "m", map()), "2");
    }

    #[test]
    fn should_unwrap_optionals_and_suppliers() {
        assert_eq!(format_one("%{o}", "o", Some(5)), "5");
        assert_eq!(format_one("[%{o}]", "o", Value::Optional(None)), "[]");
        assert_eq!(format_one("%{o,null:'absent'}", "o", Value::Optional(None)), "absent");
        assert_eq!(format_one("%{o,empty:'nothing'}", "o", Value::Optional(None)), "nothing");
        assert_eq!(format_one("%{s}", "s", Value::supplier(|| Value::from("lazy"))), "lazy");
        assert_eq!(
            format_one("%{s,1:'one',:'other'}", "s", Value::supplier(|| Value::from(1))),
            "one"
        );
    }

    #[test]
    fn should_select_locale_variants() {
        let context = MessageContext::default();
        let variants: Vec<(Locale, &str)> = [
            ("en-US", "color"),
            ("nl", "kleur"),
            ("en-GB", "colour"),
            ("de-DE", "Farbe"),
        ]
        .iter()
        .map(|(tag, text)| (locale(tag), *text))
        .collect();
        let message = context.parser().parse_locales(None, &variants).unwrap();

        let format_in = |tag: &str| {
            context
                .format(&message, &ParameterMap::new(locale(tag)))
                .unwrap()
        };
        assert_eq!(format_in("en-GB"), "colour");
        assert_eq!(format_in("nl-BE"), "kleur");
        assert_eq!(format_in("en"), "color");
        assert_eq!(format_in("de"), "Farbe");
        assert_eq!(format_in("zh"), "color");
    }

    #[test]
    fn should_use_default_locale_for_root_parameters() {
        let context = MessageContext::new(MessageConfig {
            default_locale: Some(locale("de")),
            ..MessageConfig::default()
        })
        .unwrap();
        let message = context
            .parser()
            .parse_locales(None, &[(locale("en"), "%{x}"), (locale("de"), "%{x} (de)")])
            .unwrap();

        let params = ParameterMap::default().with("x", 2.5);
        assert_eq!(context.format(&message, &params).unwrap(), "2,5 (de)");
    }

    #[test]
    fn should_report_invalid_nested_templates() {
        let context = MessageContext::default();
        let template = "%{n,choice,1:'%{broken',:'x'}";

        let params = ParameterMap::default().with("n", 2);
        assert_eq!(context.format_template(template, &params).unwrap(), "x");

        let params = ParameterMap::default().with("n", 1);
        match context.format_template(template, &params) {
            Err(MessageError::Format(e)) => {
                assert!(matches!(e.kind(), FormatErrorKind::NestedTemplate(_)));
                assert!(e.is_developer_error());
                assert_eq!(e.parameter(), Some("n"));
                assert_eq!(e.template(), Some(template));
            }
            other => panic!("format error expected, got {other:?}"),
        }
    }

    #[test]
    fn should_fall_back_to_type_for_unknown_format() {
        assert_eq!(format_one("%{n,nosuch}", "n", 5), "5");
    }

    #[test]
    fn should_format_objects_by_text() {
        let point = Value::object(Point { x: 1, y: 2 });
        assert_eq!(format_one("%{p}", "p", point), "1,2");
    }

    #[test]
    fn should_use_registered_formatters() {
        let registry = Arc::new(FormatterRegistry::with_defaults());
        registry.register(Arc::new(CoordinatesFormatter));
        registry.declare_type("point3d", Some("point"), &[]);
        let context = MessageContext::builder()
            .formatters(Arc::clone(&registry))
            .build()
            .unwrap();

        let params = ParameterMap::default()
            .with("p", Value::object(Point { x: 1, y: 2 }))
            .with("q", Value::object(Point3d(1, 2, 3)))
            .with("n", 7);

        assert_eq!(context.format_template("%{p}", &params).unwrap(), "x=1 y=2");
        assert_eq!(context.format_template("%{q}", &params).unwrap(), "<1,2,3>");
        assert_eq!(context.format_template("%{n,coords}", &params).unwrap(), "<7>");
        assert_eq!(context.format_template("%{n}", &params).unwrap(), "7");
    }

    #[test]
    fn should_format_from_many_threads() {
        let context = MessageContext::default();
        let message = context
            .parse("%{n,choice,1:'one file',:'%{n} files'} in %{dir}")
            .unwrap();

        std::thread::scope(|scope| {
            for n in 0..8 {
                let context = &context;
                let message = &message;
                scope.spawn(move || {
                    let params = ParameterMap::default().with("n", n).with("dir", "/tmp");
                    let expected = if n == 1 {
                        "one file in /tmp".to_string()
                    } else {
                        format!("{n} files in /tmp")
                    };
                    assert_eq!(context.format(message, &params).unwrap(), expected);
                });
            }
        });
    }
}
