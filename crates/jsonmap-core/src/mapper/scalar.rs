//! Field types that map to a single scalar value.

use crate::value::Value;

/// A Rust type stored as one scalar [`Value`].
pub trait Scalar: Sized + Send + Sync + 'static {
    /// Name of the expected value kind, for diagnostics.
    const EXPECTED: &'static str;

    fn to_value(&self) -> Value;

    /// `None` when `value` is the wrong kind or out of range.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! int_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const EXPECTED: &'static str = "int";

                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_i64().and_then(|i| <$ty>::try_from(i).ok())
                }
            }
        )*
    };
}

int_scalar!(i8, i16, i32, i64, u8, u16, u32);

// Float fields also accept integer values.
impl Scalar for f64 {
    const EXPECTED: &'static str = "float";

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl Scalar for f32 {
    const EXPECTED: &'static str = "float";

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64().map(|f| f as f32)
    }
}

impl Scalar for bool {
    const EXPECTED: &'static str = "bool";

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Scalar for String {
    const EXPECTED: &'static str = "string";

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

/// `None` is stored as `null`.
impl<S: Scalar> Scalar for Option<S> {
    const EXPECTED: &'static str = S::EXPECTED;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, S::to_value)
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            S::from_value(value).map(Some)
        }
    }
}
