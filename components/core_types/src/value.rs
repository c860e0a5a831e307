//! Loader value representation.
//!
//! Settled promises carry argument lists of [`Value`]s, export paths resolve to
//! values from the [`Namespace`] tree, and host objects (resources, promises,
//! load diagnostics) travel through the same lists as native objects.

use crate::Namespace;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Represents any value that can flow through a settled promise.
///
/// Primitive values are stored inline. Namespace objects are shared handles,
/// and host objects are wrapped as [`Value::NativeObject`] and recovered with
/// [`Value::downcast_ref`].
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::Number(42.0);
///
/// assert_ne!(undefined, number);
/// assert_eq!(number.to_string(), "42");
/// ```
#[derive(Clone)]
pub enum Value {
    /// No value
    Undefined,
    /// Explicit empty value
    Null,
    /// Boolean (true or false)
    Boolean(bool),
    /// IEEE 754 double-precision number
    Number(f64),
    /// String value
    String(std::string::String),
    /// Positional argument list (one settled promise inside `when`)
    List(Vec<Value>),
    /// Namespace object
    Object(Namespace),
    /// Host object (resource, promise, load diagnostic, ...)
    NativeObject(Rc<dyn Any>),
}

impl Value {
    /// Wraps a host object.
    pub fn native<T: Any>(object: T) -> Self {
        Value::NativeObject(Rc::new(object))
    }

    /// Borrows the host object if it is a `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// let value = Value::native(7u8);
    /// assert_eq!(value.downcast_ref::<u8>(), Some(&7));
    /// assert!(value.downcast_ref::<String>().is_none());
    /// ```
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::NativeObject(object) => object.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Returns the string slice for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items of a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the namespace behind an object value.
    pub fn as_object(&self) -> Option<&Namespace> {
        match self {
            Value::Object(ns) => Some(ns),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Object(ns) => f.debug_tuple("Object").field(ns).finish(),
            Value::NativeObject(_) => write!(f, "NativeObject(...)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::NativeObject(a), Value::NativeObject(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::NativeObject(_) => write!(f, "[native object]"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Namespace> for Value {
    fn from(ns: Namespace) -> Self {
        Value::Object(ns)
    }
}
