//! Type graph used for formatter dispatch
//!
//! Every runtime type name is a node with an optional super type and a list of
//! interfaces. Dispatch walks the graph from the exact type up to `object`.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::value;

pub const OBJECT_TYPE: &str = "object";
pub const NUMBER_TYPE: &str = "number";
pub const INTEGRAL_TYPE: &str = "integral";
pub const FLOATING_TYPE: &str = "floating";
pub const CHAR_SEQUENCE_TYPE: &str = "char-sequence";
pub const ITERABLE_TYPE: &str = "iterable";

/// Walk result; the exact type comes first and `object` last.
pub type TypeWalk = SmallVec<[String; 8]>;

#[derive(Debug, Clone, Default)]
struct TypeNode {
    super_type: Option<String>,
    interfaces: SmallVec<[String; 2]>,
}

#[derive(Debug, Clone)]
pub struct TypeGraph {
    nodes: HashMap<String, TypeNode>,
}

impl TypeGraph {
    /// Graph containing only the root type
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(OBJECT_TYPE.to_string(), TypeNode::default());
        TypeGraph { nodes }
    }

    /// Graph with the types of all built-in values
    pub fn builtin() -> Self {
        let mut graph = TypeGraph::new();

        graph.declare(value::NULL_TYPE, None, &[]);
        graph.declare(value::BOOL_TYPE, None, &[]);
        graph.declare(NUMBER_TYPE, None, &[]);
        graph.declare(INTEGRAL_TYPE, None, &[]);
        graph.declare(FLOATING_TYPE, None, &[]);
        for integral in [value::I8_TYPE, value::I16_TYPE, value::I32_TYPE, value::I64_TYPE] {
            graph.declare(integral, Some(NUMBER_TYPE), &[INTEGRAL_TYPE]);
        }
        for floating in [value::F32_TYPE, value::F64_TYPE] {
            graph.declare(floating, Some(NUMBER_TYPE), &[FLOATING_TYPE]);
        }
        graph.declare(CHAR_SEQUENCE_TYPE, None, &[]);
        graph.declare(value::STRING_TYPE, None, &[CHAR_SEQUENCE_TYPE]);
        graph.declare(value::CHAR_TYPE, None, &[]);
        graph.declare(ITERABLE_TYPE, None, &[]);
        graph.declare(value::LIST_TYPE, None, &[ITERABLE_TYPE]);
        graph.declare(value::MAP_TYPE, None, &[]);
        graph.declare(value::OPTIONAL_TYPE, None, &[]);
        graph.declare(value::SUPPLIER_TYPE, None, &[]);

        graph
    }

    /// Declares (or redeclares) a type. Without a super type the type derives from `object`.
    pub fn declare(&mut self, name: &str, super_type: Option<&str>, interfaces: &[&str]) {
        let super_type = match super_type {
            Some(s) => Some(s.to_string()),
            None if name == OBJECT_TYPE => None,
            None => Some(OBJECT_TYPE.to_string()),
        };

        self.nodes.insert(
            name.to_string(),
            TypeNode {
                super_type,
                interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Types to look up for `name`: the type itself, its interfaces (recursively),
    /// then its super type with its interfaces, and so on up to `object`.
    /// Unknown types resolve like a direct subtype of `object`.
    pub fn walk(&self, name: &str) -> TypeWalk {
        let mut walk = TypeWalk::new();
        let mut seen = HashSet::new();
        let mut current = Some(name.to_string());

        while let Some(type_name) = current.take() {
            if !seen.insert(type_name.clone()) {
                break;
            }

            let node = self.nodes.get(&type_name);
            walk.push(type_name);

            if let Some(node) = node {
                for interface in &node.interfaces {
                    self.walk_interface(interface, &mut walk, &mut seen);
                }
                current = node.super_type.clone();
            } else {
                current = Some(OBJECT_TYPE.to_string());
            }
        }

        if !seen.contains(OBJECT_TYPE) {
            walk.push(OBJECT_TYPE.to_string());
        }

        walk
    }

    fn walk_interface(&self, name: &str, walk: &mut TypeWalk, seen: &mut HashSet<String>) {
        if !seen.insert(name.to_string()) {
            return;
        }

        walk.push(name.to_string());

        if let Some(node) = self.nodes.get(name) {
            for interface in &node.interfaces {
                self.walk_interface(interface, walk, seen);
            }
        }
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        TypeGraph::builtin()
    }
}
