/**
 * Normalizer Tests
 *
 * Node sharing across parsed templates, LRU eviction and the property that
 * normalizing never changes a node's structure.
 */

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use message_format::message::TextPart;
    use message_format::normalizer::Node;
    use message_format::{
        LruNormalizer, MessagePart, MessagePartNormalizer, MessageParser, NoOpNormalizer,
        UnboundedNormalizer,
    };
    use proptest::prelude::*;

    fn text(s: &str) -> Node {
        Node::Text(Arc::new(TextPart::new(s, false, true)))
    }

    fn parameter_of(part: &MessagePart) -> &Arc<message_format::message::ParameterPart> {
        match part {
            MessagePart::Parameter(p) => p,
            other => panic!("parameter expected, got {other:?}"),
        }
    }

    #[test]
    fn should_share_parts_between_templates() {
        let parser = MessageParser::new(Arc::new(LruNormalizer::new(64).unwrap()));
        let hello = parser.parse("Hello %{name}").unwrap();
        let bye = parser.parse("Bye %{name}").unwrap();

        assert!(Arc::ptr_eq(parameter_of(&hello.parts()[1]), parameter_of(&bye.parts()[1])));
    }

    #[test]
    fn should_share_nested_messages() {
        let parser = MessageParser::new(Arc::new(UnboundedNormalizer::new()));
        let outer = parser.parse("%{n,choice,1:'one %{x}',:'%{x}'}").unwrap();
        let standalone = parser.parse("one %{x}").unwrap();

        let MessagePart::Parameter(p) = &outer.parts()[0] else {
            panic!("parameter expected");
        };
        let nested = p
            .config
            .entries()
            .next()
            .unwrap()
            .1
            .as_message(&parser)
            .unwrap();
        assert!(Arc::ptr_eq(&nested, &standalone));
    }

    #[test]
    fn should_not_share_without_normalizer() {
        let parser = MessageParser::new(Arc::new(NoOpNormalizer));
        let a = parser.parse("same %{text}").unwrap();
        let b = parser.parse("same %{text}").unwrap();

        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn should_evict_least_recently_used() {
        let normalizer = LruNormalizer::new(3).unwrap();
        let a = normalizer.normalize(text("a"));
        let b = normalizer.normalize(text("b"));
        normalizer.normalize(text("c"));

        // touch a, then overflow: b is the oldest
        normalizer.normalize(text("a"));
        normalizer.normalize(text("d"));

        assert_eq!(normalizer.len(), 3);
        assert!(normalizer.contains(&a));
        assert!(!normalizer.contains(&b));
    }

    #[test]
    fn should_normalize_from_many_threads() {
        let normalizer = Arc::new(UnboundedNormalizer::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let normalizer = Arc::clone(&normalizer);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|i| normalizer.normalize(text(&format!("t{}", i % 10))))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let results: Vec<Vec<Node>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(normalizer.len(), 10);
        for (i, node) in results[0].iter().enumerate() {
            for other in &results[1..] {
                assert!(node.ptr_eq(&other[i]));
            }
        }
    }

    proptest! {
        #[test]
        fn should_return_equal_nodes(
            texts in proptest::collection::vec("[a-c]{1,2}", 1..60),
            capacity in 1usize..8,
        ) {
            let normalizer = LruNormalizer::new(capacity).unwrap();

            for t in &texts {
                let node = text(t);
                let normalized = normalizer.normalize(node.clone());
                prop_assert_eq!(&normalized, &node);
                prop_assert!(normalizer.len() <= capacity);

                let again = normalizer.normalize(text(t));
                prop_assert!(again.ptr_eq(&normalized));
            }
        }

        #[test]
        fn should_keep_one_node_per_structure(texts in proptest::collection::vec("[a-d]{1,3}", 0..80)) {
            let normalizer = UnboundedNormalizer::new();
            for t in &texts {
                normalizer.normalize(text(t));
            }

            let distinct: HashSet<&String> = texts.iter().collect();
            prop_assert_eq!(normalizer.len(), distinct.len());
        }
    }
}
