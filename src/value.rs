use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A dynamically typed cache payload.
///
/// Every entry stores exactly one `Value`. Commands are strictly typed:
/// a list command against an `Int` entry fails with a type mismatch and
/// leaves the entry untouched.
///
/// `Opaque` carries payloads placed through the internal insertion path;
/// the public command surface never produces it, and every typed command
/// rejects it.
#[derive(Clone)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    List(Vec<Value>),
    Set(Vec<Value>),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Returns the inner string, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the inner float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the list elements, if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the set members, if this is a `Set`. Order is not
    /// meaningful.
    pub fn as_set(&self) -> Option<&[Value]> {
        match self {
            Value::Set(members) => Some(members),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // IEEE equality: NaN is never a member of anything
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => {
                // membership is unique, so mutual containment reduces to
                // equal length plus one-way containment
                a.len() == b.len() && a.iter().all(|m| b.contains(m))
            }
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Set(members) => f.debug_tuple("Set").field(members).finish(),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Value::from("hello"), Value::Str("hello".to_string()));
        assert_eq!(Value::from(7i64), Value::Int(7));
        assert_eq!(Value::from(1.5f64), Value::Float(1.5));
    }

    #[test]
    fn typed_accessors() {
        assert_eq!(Value::from("a").as_str(), Some("a"));
        assert_eq!(Value::from("a").as_int(), None);
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::Float(2.5).as_float(), Some(2.5));
        assert!(Value::List(vec![]).as_list().unwrap().is_empty());
    }

    #[test]
    fn cross_variant_never_equal() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Str("1".into()), Value::Int(1));
    }

    #[test]
    fn set_equality_ignores_order() {
        let a = Value::Set(vec![Value::from("x"), Value::from("y")]);
        let b = Value::Set(vec![Value::from("y"), Value::from("x")]);
        assert_eq!(a, b);
        let c = Value::Set(vec![Value::from("x")]);
        assert_ne!(a, c);
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn opaque_equality_is_identity() {
        let p: Arc<dyn Any + Send + Sync> = Arc::new(12.62f64);
        let a = Value::Opaque(p.clone());
        let b = Value::Opaque(p);
        let c = Value::Opaque(Arc::new(12.62f64));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
