/// Implement [`Mappable`](crate::Mappable) by listing participating fields.
///
/// Each entry names a struct field and the [`Fields`](crate::Fields) method
/// that declares it. The wire name defaults to the field name and can be
/// overridden with `as "name"`. Fields not listed are ignored by the mapper.
///
/// ```
/// use jsonmap_core::{impl_mappable, Registry};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point {
///     x: i64,
///     y: i64,
///     label: Option<String>,
///     cache: Vec<u8>,
/// }
///
/// impl_mappable! {
///     Point as "Point" {
///         x: scalar,
///         y: scalar,
///         label: scalar as "name",
///     }
/// }
///
/// let mut builder = Registry::builder();
/// builder.register::<Point>();
/// let registry = builder.build().unwrap();
///
/// let point = Point { x: 1, y: -2, label: None, cache: vec![7] };
/// assert_eq!(registry.to_text(&point).unwrap(), r#"{"x":1,"y":-2,"name":null}"#);
/// ```
#[macro_export]
macro_rules! impl_mappable {
    (@wire $field:ident $wire:literal) => {
        $wire
    };
    (@wire $field:ident) => {
        stringify!($field)
    };
    (
        $ty:ty as $name:literal {
            $($field:ident : $kind:ident $(as $wire:literal)?),* $(,)?
        }
    ) => {
        impl $crate::Mappable for $ty {
            const TYPE_NAME: &'static str = $name;

            fn describe(fields: &mut $crate::Fields<Self>) {
                $(
                    fields.$kind(
                        $crate::impl_mappable!(@wire $field $($wire)?),
                        |value| &value.$field,
                        |value| &mut value.$field,
                    );
                )*
            }
        }
    };
}
