//! The runtime shapes an enum field value can arrive in.
use std::fmt;

/// A native enum whose constants mirror a protobuf enumeration by name.
///
/// ```
/// use dyn_proto_write::ProtoEnum;
///
/// #[derive(Debug, Clone, Copy)]
/// enum Color {
///     Red,
///     Green,
/// }
///
/// impl ProtoEnum for Color {
///     fn proto_name(&self) -> &str {
///         match self {
///             Self::Red => "RED",
///             Self::Green => "GREEN",
///         }
///     }
/// }
///
/// assert_eq!(Color::Green.proto_name(), "GREEN");
/// ```
pub trait ProtoEnum {
    /// The symbolic name of this constant, as declared in the `.proto` file.
    fn proto_name(&self) -> &str;
}

/// A boxed number of any width. Narrowed to an `int32` candidate with [`Number::int_value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl Number {
    /// Integers wrap to their low 32 bits, floats truncate toward zero and saturate
    /// (`NaN` becomes 0).
    pub fn int_value(&self) -> i32 {
        match *self {
            Self::Signed(int) => int as i32,
            Self::Unsigned(uint) => uint as i32,
            Self::Float(float) => float as i32,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(int) => write!(f, "{int}"),
            Self::Unsigned(uint) => write!(f, "{uint}"),
            Self::Float(float) => write!(f, "{float}"),
        }
    }
}

macro_rules! impl_from_number {
    ($variant:ident($target:ty): $($src:ty),* $(,)?) => {
        $(
            impl From<$src> for Number {
                #[inline]
                fn from(value: $src) -> Self {
                    Self::$variant(value as $target)
                }
            }

            impl From<$src> for EnumValue<'_> {
                #[inline]
                fn from(value: $src) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_number!(Signed(i64): i8, i16, i32, i64, isize);
impl_from_number!(Unsigned(u64): u8, u16, u32, u64, usize);
impl_from_number!(Float(f64): f32, f64);

/// A field value, classified into the shapes a dynamic enum writer accepts.
#[derive(Clone, Copy)]
pub enum EnumValue<'a> {
    /// A native enum constant, looked up by its symbolic name.
    Native(&'a dyn ProtoEnum),
    /// A candidate wire value, checked against the enum's value set.
    Number(Number),
    /// A string array (as bound from a multi-valued query parameter), carrying only its
    /// first element. `None` when the array was empty.
    Strings(Option<&'a str>),
    /// A symbolic name.
    Str(&'a str),
    /// Anything else. Always rejected.
    Unsupported(&'a dyn fmt::Display),
}

impl fmt::Debug for EnumValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(native) => f.debug_tuple("Native").field(&native.proto_name()).finish(),
            Self::Number(number) => f.debug_tuple("Number").field(number).finish(),
            Self::Strings(first) => f.debug_tuple("Strings").field(first).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Unsupported(value) => f
                .debug_tuple("Unsupported")
                .field(&format_args!("{value}"))
                .finish(),
        }
    }
}

impl fmt::Display for EnumValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(native) => f.write_str(native.proto_name()),
            Self::Number(number) => fmt::Display::fmt(number, f),
            Self::Strings(Some(first)) => write!(f, "[{first:?}, ..]"),
            Self::Strings(None) => f.write_str("[]"),
            Self::Str(s) => f.write_str(s),
            Self::Unsupported(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl<'a> EnumValue<'a> {
    pub fn native<E: ProtoEnum>(value: &'a E) -> Self {
        Self::Native(value)
    }

    /// Classifies a string array, keeping only its first element.
    pub fn strings<S: AsRef<str>>(values: &'a [S]) -> Self {
        Self::Strings(values.first().map(AsRef::as_ref))
    }

    /// Classifies an untyped JSON value. `null` is an absent value, and returns [`None`].
    ///
    /// Arrays are only accepted as string arrays when every element is a string.
    #[cfg(feature = "json")]
    pub fn from_json(value: &'a serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        let classified = match value {
            Value::Null => return None,
            Value::String(s) => Self::Str(s),
            Value::Number(number) => match (number.as_i64(), number.as_u64(), number.as_f64()) {
                (Some(int), _, _) => Self::Number(Number::Signed(int)),
                (None, Some(uint), _) => Self::Number(Number::Unsigned(uint)),
                (None, None, Some(float)) => Self::Number(Number::Float(float)),
                (None, None, None) => Self::Unsupported(value),
            },
            Value::Array(array) if array.iter().all(Value::is_string) => {
                Self::Strings(array.first().and_then(Value::as_str))
            }
            Value::Array(_) | Value::Bool(_) | Value::Object(_) => Self::Unsupported(value),
        };

        Some(classified)
    }
}

impl<'a> From<&'a str> for EnumValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for EnumValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a [String]> for EnumValue<'a> {
    fn from(value: &'a [String]) -> Self {
        Self::strings(value)
    }
}

impl<'a> From<&'a [&'a str]> for EnumValue<'a> {
    fn from(value: &'a [&'a str]) -> Self {
        Self::strings(value)
    }
}

impl<'a> From<&'a Vec<String>> for EnumValue<'a> {
    fn from(value: &'a Vec<String>) -> Self {
        Self::strings(value)
    }
}

impl<'a> From<&'a dyn ProtoEnum> for EnumValue<'a> {
    fn from(value: &'a dyn ProtoEnum) -> Self {
        Self::Native(value)
    }
}

impl From<Number> for EnumValue<'_> {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_value() {
        assert_eq!(Number::from(7_u8).int_value(), 7);
        assert_eq!(Number::from(-3_i64).int_value(), -3);
        assert_eq!(Number::from(2.9_f64).int_value(), 2);
        assert_eq!(Number::from(-2.9_f32).int_value(), -2);
        assert_eq!(Number::from(f64::NAN).int_value(), 0);
        assert_eq!(Number::from(1e20_f64).int_value(), i32::MAX);
        assert_eq!(Number::from((1_i64 << 32) + 1).int_value(), 1);
        assert_eq!(Number::from(u64::MAX).int_value(), -1);
    }

    #[test]
    fn test_strings_keeps_first() {
        let owned = vec!["BLUE".to_owned(), "RED".to_owned()];
        assert!(matches!(EnumValue::from(&owned), EnumValue::Strings(Some("BLUE"))));

        let empty: &[&str] = &[];
        assert!(matches!(EnumValue::from(empty), EnumValue::Strings(None)));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json() {
        use serde_json::json;

        let cases = [
            (json!("GREEN"), "Str(\"GREEN\")"),
            (json!(1), "Number(Signed(1))"),
            (json!(u64::MAX), "Number(Unsigned(18446744073709551615))"),
            (json!(1.5), "Number(Float(1.5))"),
            (json!(["GREEN", "RED"]), "Strings(Some(\"GREEN\"))"),
            (json!([]), "Strings(None)"),
            (json!(["GREEN", 1]), "Unsupported([\"GREEN\",1])"),
            (json!(true), "Unsupported(true)"),
            (json!({ "color": "GREEN" }), "Unsupported({\"color\":\"GREEN\"})"),
        ];

        for (json, expected) in cases.iter() {
            let classified = EnumValue::from_json(json).unwrap();
            assert_eq!(format!("{classified:?}"), *expected);
        }

        assert!(EnumValue::from_json(&serde_json::Value::Null).is_none());
    }
}
