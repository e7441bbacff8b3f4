use crate::error::ConversionError;
use crate::field::FieldKind;
use std::time::Duration;
use url::Url;

/// A converted field value, before it is narrowed into the field's Rust type
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Duration(Duration),
    Url(Url),
    List(Vec<String>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Duration(_) => "duration",
            Value::Url(_) => "url",
            Value::List(_) => "list",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ConversionError {
        ConversionError::Unsupported(format!(
            "cannot store a {} value in a {} field",
            self.kind_name(),
            expected
        ))
    }
}

/// A Rust type a field can be bound to.
///
/// `kind` picks the conversion, `from_value` narrows the converted value into
/// `Self` and `to_value` exposes the stored value to validation rules.
pub trait FieldValue: Sized {
    fn kind() -> FieldKind;

    fn from_value(value: Value) -> Result<Self, ConversionError>;

    /// `None` when there is nothing to validate
    fn to_value(&self) -> Option<Value>;
}

impl FieldValue for String {
    fn kind() -> FieldKind {
        FieldKind::String
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Str(self.clone()))
    }
}

impl FieldValue for bool {
    fn kind() -> FieldKind {
        FieldKind::Bool
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other.mismatch("bool")),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }
}

macro_rules! int_field {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            fn kind() -> FieldKind {
                FieldKind::Int(<$t>::BITS)
            }

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Int(i) => <$t>::try_from(i)
                        .map_err(|_| ConversionError::invalid("int", i.to_string())),
                    other => Err(other.mismatch("int")),
                }
            }

            fn to_value(&self) -> Option<Value> {
                Some(Value::Int(*self as i64))
            }
        }
    )*};
}

macro_rules! uint_field {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            fn kind() -> FieldKind {
                FieldKind::Uint(<$t>::BITS)
            }

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Uint(u) => <$t>::try_from(u)
                        .map_err(|_| ConversionError::invalid("uint", u.to_string())),
                    other => Err(other.mismatch("uint")),
                }
            }

            fn to_value(&self) -> Option<Value> {
                Some(Value::Uint(*self as u64))
            }
        }
    )*};
}

int_field!(i8, i16, i32, i64, isize);
uint_field!(u8, u16, u32, u64, usize);

impl FieldValue for f32 {
    fn kind() -> FieldKind {
        FieldKind::Float(32)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(f) => Ok(f as f32),
            other => Err(other.mismatch("float")),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Float(f64::from(*self)))
    }
}

impl FieldValue for f64 {
    fn kind() -> FieldKind {
        FieldKind::Float(64)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(other.mismatch("float")),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Float(*self))
    }
}

impl FieldValue for Duration {
    fn kind() -> FieldKind {
        FieldKind::Duration
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Duration(d) => Ok(d),
            other => Err(other.mismatch("duration")),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Duration(*self))
    }
}

// By value this only ever fails in `convert`; `Option<Url>` is the bindable form.
impl FieldValue for Url {
    fn kind() -> FieldKind {
        FieldKind::Url
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Url(u) => Ok(u),
            other => Err(other.mismatch("url")),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Url(self.clone()))
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn kind() -> FieldKind {
        FieldKind::Optional(Box::new(T::kind()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        T::from_value(value).map(Some)
    }

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(T::to_value)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::List(Box::new(T::kind()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| T::from_value(Value::Str(item)))
                .collect(),
            other => Err(other.mismatch("list")),
        }
    }

    fn to_value(&self) -> Option<Value> {
        let mut items = Vec::with_capacity(self.len());
        for item in self {
            match item.to_value()? {
                Value::Str(s) => items.push(s),
                _ => return None,
            }
        }
        Some(Value::List(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_kinds_carry_width() {
        assert_eq!(i8::kind(), FieldKind::Int(8));
        assert_eq!(u16::kind(), FieldKind::Uint(16));
        assert_eq!(i64::kind(), FieldKind::Int(64));
        assert_eq!(f32::kind(), FieldKind::Float(32));
    }

    #[test]
    fn test_nested_kinds() {
        assert_eq!(
            Option::<Url>::kind(),
            FieldKind::Optional(Box::new(FieldKind::Url))
        );
        assert_eq!(
            Vec::<String>::kind(),
            FieldKind::List(Box::new(FieldKind::String))
        );
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(u8::from_value(Value::Uint(255)), Ok(255));
        assert!(u8::from_value(Value::Uint(256)).is_err());
        assert!(u8::from_value(Value::Int(1)).is_err());
        assert_eq!(
            Option::<i32>::from_value(Value::Int(-4)),
            Ok(Some(-4))
        );
    }

    #[test]
    fn test_list_round_values() {
        let list = Vec::<String>::from_value(Value::List(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(list, vec!["a", "b"]);
        assert_eq!(
            list.to_value(),
            Some(Value::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_absent_option_has_no_value() {
        let none: Option<u16> = None;
        assert_eq!(none.to_value(), None);
        assert_eq!(Some(3u16).to_value(), Some(Value::Uint(3)));
    }
}
