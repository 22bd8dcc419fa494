/**
 * Message Bundle Tests
 *
 * Compiling message tables, formatting by code with locale fallback, packing
 * whole bundles and contexts built from JSON configuration.
 */

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use message_format::{
        BundleError, Locale, MessageBundle, MessageConfig, MessageContext, MessageError,
        PackError, PackOptions, ParameterMap, TableRow,
    };

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn table() -> Vec<TableRow> {
        vec![
            TableRow::new("FILES", locale("en"), "%{n,choice,0:'no files',1:'one file',:'%{n} files'}"),
            TableRow::new("FILES", locale("de"), "%{n,choice,0:'keine Dateien',1:'eine Datei',:'%{n} Dateien'}"),
            TableRow::new("FILES", locale("de-AT"), "%{n,choice,1:'a Datei',:'%{n} Dateien'}"),
            TableRow::new("GREETING", locale("en"), "Hello %{user,null:'stranger'}!"),
            TableRow::new("GREETING", locale("fr"), "Bonjour %{user,null:'inconnu'} !"),
            TableRow::new("LIST", locale(""), "%{items,list-sep-last:' & '}"),
        ]
    }

    fn bundle(context: &MessageContext) -> MessageBundle {
        MessageBundle::compile_table(context, table()).unwrap()
    }

    #[test]
    fn should_format_by_code_and_locale() {
        let context = MessageContext::default();
        let bundle = bundle(&context);

        let files = |tag: &str, n: i32| {
            let params = ParameterMap::new(locale(tag)).with("n", n);
            bundle.format(&context, "FILES", &params).unwrap()
        };
        assert_eq!(files("en", 0), "no files");
        assert_eq!(files("en-US", 2), "2 files");
        assert_eq!(files("de-DE", 1), "eine Datei");
        assert_eq!(files("de-AT", 1), "a Datei");
        assert_eq!(files("de-AT", 0), "0 Dateien");
        assert_eq!(files("it", 1), "one file");
    }

    #[test]
    fn should_format_absent_parameters_as_null() {
        let context = MessageContext::default();
        let bundle = bundle(&context);

        let anonymous = ParameterMap::new(locale("fr"));
        assert_eq!(bundle.format(&context, "GREETING", &anonymous).unwrap(), "Bonjour inconnu !");

        let named = ParameterMap::new(locale("en")).with("user", "Ada");
        assert_eq!(bundle.format(&context, "GREETING", &named).unwrap(), "Hello Ada!");
    }

    #[test]
    fn should_use_root_variant_for_any_locale() {
        let context = MessageContext::default();
        let bundle = bundle(&context);

        let params = ParameterMap::new(locale("ja")).with("items", vec!["a", "b", "c"]);
        assert_eq!(bundle.format(&context, "LIST", &params).unwrap(), "a, b & c");
    }

    #[test]
    fn should_list_codes_and_parameters() {
        let context = MessageContext::default();
        let bundle = bundle(&context);

        assert_eq!(bundle.len(), 3);
        assert!(bundle.contains("LIST"));
        assert!(!bundle.contains("MISSING"));
        assert_eq!(bundle.codes().collect::<Vec<_>>(), vec!["FILES", "GREETING", "LIST"]);
        assert_eq!(
            bundle
                .parameter_names(&context, "GREETING")
                .unwrap()
                .into_iter()
                .collect::<Vec<_>>(),
            vec!["user"]
        );
        assert!(matches!(
            bundle.parameter_names(&context, "MISSING"),
            Err(MessageError::Bundle(BundleError::UnknownCode(code))) if code == "MISSING"
        ));
    }

    #[test]
    fn should_compile_large_tables() {
        let context = MessageContext::default();
        let rows = (0..500).flat_map(|i| {
            [
                TableRow::new(format!("CODE_{i}"), locale("en"), format!("message {i} for %{{user}}")),
                TableRow::new(format!("CODE_{i}"), locale("nl"), format!("bericht {i} voor %{{user}}")),
            ]
        });

        let bundle = MessageBundle::compile_table(&context, rows).unwrap();
        assert_eq!(bundle.len(), 500);
        assert_eq!(bundle.codes().nth(42), Some("CODE_42"));

        let params = ParameterMap::new(locale("nl-NL")).with("user", "Piet");
        assert_eq!(bundle.format(&context, "CODE_499", &params).unwrap(), "bericht 499 voor Piet");
    }

    #[test]
    fn should_round_trip_packed_bundles() {
        let context = MessageContext::default();
        let bundle = bundle(&context);

        for compress in [false, true] {
            let mut bytes = Vec::new();
            bundle.pack(PackOptions { compress }, &mut bytes).unwrap();
            let unpacked = MessageBundle::unpack(bytes.as_slice()).unwrap();

            assert_eq!(unpacked.codes().collect::<Vec<_>>(), bundle.codes().collect::<Vec<_>>());
            for (code, message) in bundle.iter() {
                assert_eq!(unpacked.get(code), Some(message));
            }

            let params = ParameterMap::new(locale("de")).with("n", 7);
            assert_eq!(unpacked.format(&context, "FILES", &params).unwrap(), "7 Dateien");
        }
    }

    #[test]
    fn should_reject_packs_of_messages_without_code() {
        let context = MessageContext::default();
        let message = context.parse("no code here").unwrap();

        let mut bytes = Vec::new();
        message_format::pack::pack_all([message.as_ref()], PackOptions::default(), &mut bytes).unwrap();
        assert!(matches!(
            MessageBundle::unpack(bytes.as_slice()),
            Err(MessageError::Bundle(BundleError::MissingCode))
        ));

        assert!(matches!(
            MessageBundle::unpack(&b"garbage"[..]),
            Err(MessageError::Pack(PackError::BadHeader))
        ));
    }

    #[test]
    fn should_insert_messages_by_code() {
        let context = MessageContext::default();
        let mut bundle = MessageBundle::new();
        assert!(bundle.is_empty());

        bundle.add(context.parse_with_code("A", "first").unwrap()).unwrap();
        bundle.insert("B", context.parse("second").unwrap()).unwrap();
        let second = Arc::clone(bundle.get("B").unwrap());
        assert!(matches!(
            bundle.insert("A", second),
            Err(BundleError::DuplicateCode(code)) if code == "A"
        ));

        let params = ParameterMap::default();
        assert_eq!(bundle.format(&context, "B", &params).unwrap(), "second");
    }

    #[test]
    fn should_build_context_from_json_config() {
        let config = MessageConfig::from_json_str(
            r#"{
                "normalizer": "unbounded",
                "strict-parameters": true,
                "default-locale": "de",
                "defaults": { "list-sep-last": " und " }
            }"#,
        )
        .unwrap();
        let context = MessageContext::new(config).unwrap();
        let bundle = bundle(&context);

        let params = ParameterMap::default().with("n", 0);
        assert_eq!(bundle.format(&context, "FILES", &params).unwrap(), "keine Dateien");

        let params = ParameterMap::default().with("items", vec![1, 2, 3]);
        assert_eq!(bundle.format(&context, "LIST", &params).unwrap(), "1, 2 & 3");
        let list = context.format_template("%{items}", &params).unwrap();
        assert_eq!(list, "1, 2 und 3");

        match bundle.format(&context, "GREETING", &ParameterMap::default()) {
            Err(MessageError::Format(e)) => {
                assert_eq!(e.code(), Some("GREETING"));
                assert_eq!(e.parameter(), Some("user"));
            }
            other => panic!("missing parameter error expected, got {other:?}"),
        }
    }
}
