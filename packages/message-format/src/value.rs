//! Runtime values
//!
//! Parameter values handed to the formatter. Every value reports a type name that
//! the formatter registry resolves against its type graph.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub const NULL_TYPE: &str = "null";
pub const BOOL_TYPE: &str = "bool";
pub const I8_TYPE: &str = "i8";
pub const I16_TYPE: &str = "i16";
pub const I32_TYPE: &str = "i32";
pub const I64_TYPE: &str = "i64";
pub const F32_TYPE: &str = "f32";
pub const F64_TYPE: &str = "f64";
pub const CHAR_TYPE: &str = "char";
pub const STRING_TYPE: &str = "string";
pub const LIST_TYPE: &str = "list";
pub const MAP_TYPE: &str = "map";
pub const OPTIONAL_TYPE: &str = "optional";
pub const SUPPLIER_TYPE: &str = "supplier";

/// A user type that can be passed as parameter value.
pub trait FormattableObject: fmt::Debug + Send + Sync {
    /// Name of the type as declared in the formatter registry's type graph
    fn type_name(&self) -> &str;

    /// Generic text representation
    fn to_text(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

/// Lazily computed value, evaluated each time it is formatted.
#[derive(Clone)]
pub struct Supplier(Arc<dyn Fn() -> Value + Send + Sync>);

impl Supplier {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Supplier(Arc::new(f))
    }

    pub fn get(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Supplier(..)")
    }
}

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Optional(Option<Box<Value>>),
    Supplier(Supplier),
    Object(Arc<dyn FormattableObject>),
}

impl Value {
    pub fn supplier<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Value::Supplier(Supplier::new(f))
    }

    pub fn object<T: FormattableObject + 'static>(object: T) -> Self {
        Value::Object(Arc::new(object))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => NULL_TYPE,
            Value::Bool(_) => BOOL_TYPE,
            Value::I8(_) => I8_TYPE,
            Value::I16(_) => I16_TYPE,
            Value::I32(_) => I32_TYPE,
            Value::I64(_) => I64_TYPE,
            Value::F32(_) => F32_TYPE,
            Value::F64(_) => F64_TYPE,
            Value::Char(_) => CHAR_TYPE,
            Value::String(_) => STRING_TYPE,
            Value::List(_) => LIST_TYPE,
            Value::Map(_) => MAP_TYPE,
            Value::Optional(_) => OPTIONAL_TYPE,
            Value::Supplier(_) => SUPPLIER_TYPE,
            Value::Object(object) => object.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer value of an integral type
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Floating point value of a floating point type
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v.into()),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        self.as_i64().is_some() || self.as_f64().is_some()
    }

    /// Text of string and character values
    pub fn as_text(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            Value::String(s) => Some(s.as_str().into()),
            Value::Char(ch) => Some(ch.to_string().into()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
            Value::Optional(Some(value)) => write!(f, "{value}"),
            Value::Optional(None) => Ok(()),
            Value::Supplier(supplier) => write!(f, "{}", supplier.get()),
            Value::Object(object) => f.write_str(&object.to_text()),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => I16,
    u16 => I32,
    u32 => I64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    &str => String,
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Value::F64(v as f64), Value::I64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        Value::Optional(value.map(|v| Box::new(v.into())))
    }
}
