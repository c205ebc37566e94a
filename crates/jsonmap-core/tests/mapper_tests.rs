/// Object mapper tests.
///
/// Covers every field kind (scalar, scalar sequence, scalar map, nested
/// object, nested sequence, nested map, polymorphic), partial decoding,
/// the mismatch policies, error paths, and registration rules.
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use indexmap::IndexMap;
use jsonmap_core::error::MappingErrorKind;
use jsonmap_core::{
    impl_mappable, parse, FieldKind, JsonError, Mappable, MapperOptions, MappableDyn,
    MismatchPolicy, Registry, Value,
};

// ============================================================================
// Domain types
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct Primitives {
    id: i64,
    small: u8,
    ratio: f64,
    enabled: bool,
    label: String,
    note: Option<String>,
    scratch: Vec<u8>,
}

impl_mappable! {
    Primitives as "Primitives" {
        id: scalar,
        small: scalar,
        ratio: scalar,
        enabled: scalar,
        label: scalar as "displayName",
        note: scalar,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Collections {
    tags: Vec<String>,
    queue: VecDeque<i32>,
    unique: BTreeSet<i64>,
    hashed: HashSet<String>,
    limits: BTreeMap<String, f64>,
    counts: HashMap<String, i64>,
    flags: IndexMap<String, bool>,
}

impl_mappable! {
    Collections as "Collections" {
        tags: scalar_seq,
        queue: scalar_seq,
        unique: scalar_seq,
        hashed: scalar_seq,
        limits: scalar_map,
        counts: scalar_map,
        flags: scalar_map,
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Address {
    street: String,
    zip: u32,
}

impl_mappable! {
    Address as "Address" {
        street: scalar,
        zip: scalar,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Person {
    name: String,
    home: Address,
    previous: Vec<Address>,
    by_label: BTreeMap<String, Address>,
}

impl_mappable! {
    Person as "Person" {
        name: scalar,
        home: nested,
        previous: nested_seq,
        by_label: nested_map,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Tree {
    value: i64,
    children: Vec<Tree>,
}

impl_mappable! {
    Tree as "Tree" {
        value: scalar,
        children: nested_seq,
    }
}

trait Shape: MappableDyn + fmt::Debug {
    fn area(&self) -> f64;
}

#[derive(Debug, Default, PartialEq)]
struct Circle {
    radius: f64,
}

impl_mappable! {
    Circle as "Circle" {
        radius: scalar,
    }
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

#[derive(Debug, Default, PartialEq)]
struct Rect {
    width: f64,
    height: f64,
}

impl_mappable! {
    Rect as "Rect" {
        width: scalar,
        height: scalar,
    }
}

impl Shape for Rect {
    fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Mappable and a `Shape`, but never registered as a variant.
#[derive(Debug, Default)]
struct Triangle {
    base: f64,
}

impl_mappable! {
    Triangle as "Triangle" {
        base: scalar,
    }
}

impl Shape for Triangle {
    fn area(&self) -> f64 {
        self.base
    }
}

#[derive(Debug, Default)]
struct Drawing {
    title: String,
    primary: Option<Box<dyn Shape>>,
}

impl_mappable! {
    Drawing as "Drawing" {
        title: scalar,
        primary: polymorphic,
    }
}

#[derive(Debug, Default)]
struct ReservedName {
    kind: String,
}

impl_mappable! {
    ReservedName as "ReservedName" {
        kind: scalar as "__type",
    }
}

#[derive(Debug, Default)]
struct DuplicateName {
    a: i64,
    b: i64,
}

impl_mappable! {
    DuplicateName as "DuplicateName" {
        a: scalar,
        b: scalar as "a",
    }
}

/// Hand-written impl, no macro.
#[derive(Debug, Default, PartialEq)]
struct Manual {
    count: i32,
}

impl Mappable for Manual {
    const TYPE_NAME: &'static str = "Manual";

    fn describe(fields: &mut jsonmap_core::Fields<Self>) {
        fields.scalar("n", |m| &m.count, |m| &mut m.count);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn registry_for<T: Mappable>() -> Registry {
    let mut builder = Registry::builder();
    builder.register::<T>();
    builder.build().expect("registration failed")
}

fn lenient_registry_for<T: Mappable>() -> Registry {
    let mut builder = Registry::builder();
    builder
        .options(MapperOptions {
            mismatch: MismatchPolicy::SkipField,
        })
        .register::<T>();
    builder.build().expect("registration failed")
}

fn shapes_registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .register::<Drawing>()
        .register_variant::<dyn Shape, Circle>(|circle| Box::new(circle))
        .register_variant::<dyn Shape, Rect>(|rect| Box::new(rect));
    builder.build().expect("registration failed")
}

/// Unwrap a mapping error into its path and kind.
fn mapping_error<T: fmt::Debug>(result: Result<T, JsonError>) -> (String, MappingErrorKind) {
    match result {
        Err(JsonError::Mapping { path, kind }) => (path, kind),
        other => panic!("expected mapping error, got {other:?}"),
    }
}

fn json(text: &str) -> Value {
    parse(text).unwrap_or_else(|err| panic!("bad fixture {text:?}: {err}"))
}

fn sample_person() -> Person {
    let work = Address {
        street: "1 Dock Rd".into(),
        zip: 30301,
    };
    Person {
        name: "Ada".into(),
        home: Address {
            street: "12 Elm St".into(),
            zip: 10001,
        },
        previous: vec![work.clone()],
        by_label: BTreeMap::from([("work".to_string(), work)]),
    }
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn encode_scalars_in_declaration_order() {
    let registry = registry_for::<Primitives>();
    let value = Primitives {
        id: 7,
        small: 3,
        ratio: 0.5,
        enabled: true,
        label: "seven".into(),
        note: None,
        scratch: vec![1, 2],
    };
    assert_eq!(
        registry.to_text(&value).unwrap(),
        r#"{"id":7,"small":3,"ratio":0.5,"enabled":true,"displayName":"seven","note":null}"#
    );
}

#[test]
fn decode_scalars() {
    let registry = registry_for::<Primitives>();
    let decoded: Primitives = registry
        .from_text(r#"{"id":-4,"small":255,"ratio":1.25,"enabled":false,"displayName":"x","note":"n"}"#)
        .unwrap();
    assert_eq!(decoded.id, -4);
    assert_eq!(decoded.small, 255);
    assert_eq!(decoded.ratio, 1.25);
    assert!(!decoded.enabled);
    assert_eq!(decoded.label, "x");
    assert_eq!(decoded.note.as_deref(), Some("n"));
}

#[test]
fn scalar_roundtrip() {
    let registry = registry_for::<Primitives>();
    let original = Primitives {
        id: i64::MAX,
        small: 0,
        ratio: -3.75,
        enabled: true,
        label: "quote \" and \\".into(),
        note: Some(String::new()),
        scratch: vec![],
    };
    let text = registry.to_text(&original).unwrap();
    let back: Primitives = registry.from_text(&text).unwrap();
    assert_eq!(back, original);
}

#[test]
fn undeclared_fields_are_neither_written_nor_read() {
    let registry = registry_for::<Primitives>();
    let decoded: Primitives = registry.from_text(r#"{"scratch":[9],"other":1}"#).unwrap();
    assert!(decoded.scratch.is_empty());
    assert_eq!(decoded, Primitives::default());
}

#[test]
fn float_field_accepts_integer() {
    let registry = registry_for::<Primitives>();
    let decoded: Primitives = registry.from_text(r#"{"ratio": 3}"#).unwrap();
    assert_eq!(decoded.ratio, 3.0);
}

#[test]
fn integer_field_rejects_float() {
    let registry = registry_for::<Primitives>();
    let (path, kind) = mapping_error(registry.from_text::<Primitives>(r#"{"id": 1.5}"#));
    assert_eq!(path, "id");
    assert_eq!(
        kind,
        MappingErrorKind::ScalarMismatch {
            expected: "int",
            found: "float"
        }
    );
}

#[test]
fn out_of_range_integer_is_a_mismatch() {
    let registry = registry_for::<Primitives>();
    let (path, kind) = mapping_error(registry.from_text::<Primitives>(r#"{"small": 300}"#));
    assert_eq!(path, "small");
    assert!(matches!(kind, MappingErrorKind::ScalarMismatch { .. }));
}

#[test]
fn null_into_option_is_none() {
    let registry = registry_for::<Primitives>();
    let mut target = Primitives {
        note: Some("before".into()),
        ..Default::default()
    };
    registry
        .decode_into(&mut target, &json(r#"{"note": null}"#))
        .unwrap();
    assert_eq!(target.note, None);
}

#[test]
fn null_into_plain_scalar_is_a_mismatch() {
    let registry = registry_for::<Primitives>();
    let (path, kind) = mapping_error(registry.from_text::<Primitives>(r#"{"displayName": null}"#));
    assert_eq!(path, "displayName");
    assert_eq!(
        kind,
        MappingErrorKind::ScalarMismatch {
            expected: "string",
            found: "null"
        }
    );
}

#[test]
fn container_into_scalar_is_a_shape_mismatch() {
    let registry = registry_for::<Primitives>();
    let (path, kind) = mapping_error(registry.from_text::<Primitives>(r#"{"id": [1]}"#));
    assert_eq!(path, "id");
    assert_eq!(
        kind,
        MappingErrorKind::ShapeMismatch {
            expected: "scalar",
            found: "array"
        }
    );
}

#[test]
fn hand_written_impl() {
    let registry = registry_for::<Manual>();
    assert_eq!(registry.to_text(&Manual { count: 3 }).unwrap(), r#"{"n":3}"#);
    assert_eq!(
        registry.from_text::<Manual>(r#"{"n":-1}"#).unwrap(),
        Manual { count: -1 }
    );
}

// ============================================================================
// Scalar sequences and maps
// ============================================================================

fn sample_collections() -> Collections {
    Collections {
        tags: vec!["b".into(), "a".into()],
        queue: VecDeque::from([3, 1, 2]),
        unique: BTreeSet::from([5, -1]),
        hashed: HashSet::from(["zeta".to_string(), "alpha".to_string()]),
        limits: BTreeMap::from([("max".to_string(), 9.5), ("min".to_string(), 0.5)]),
        counts: HashMap::from([("y".to_string(), 2), ("x".to_string(), 1)]),
        flags: IndexMap::from([("on".to_string(), true), ("debug".to_string(), false)]),
    }
}

#[test]
fn encode_collections() {
    let registry = registry_for::<Collections>();
    assert_eq!(
        registry.to_text(&sample_collections()).unwrap(),
        concat!(
            r#"{"tags":["b","a"],"queue":[3,1,2],"unique":[-1,5],"hashed":["alpha","zeta"],"#,
            r#""limits":{"max":9.5,"min":0.5},"counts":{"x":1,"y":2},"#,
            r#""flags":{"on":true,"debug":false}}"#
        )
    );
}

#[test]
fn collections_roundtrip() {
    let registry = registry_for::<Collections>();
    let original = sample_collections();
    let back: Collections = registry
        .from_text(&registry.to_text(&original).unwrap())
        .unwrap();
    assert_eq!(back, original);
}

#[test]
fn empty_collections() {
    let registry = registry_for::<Collections>();
    let text = registry.to_text(&Collections::default()).unwrap();
    assert_eq!(
        text,
        r#"{"tags":[],"queue":[],"unique":[],"hashed":[],"limits":{},"counts":{},"flags":{}}"#
    );
    assert_eq!(
        registry.from_text::<Collections>(&text).unwrap(),
        Collections::default()
    );
}

#[test]
fn set_collapses_duplicates() {
    let registry = registry_for::<Collections>();
    let decoded: Collections = registry.from_text(r#"{"unique":[3,3,1]}"#).unwrap();
    assert_eq!(decoded.unique, BTreeSet::from([1, 3]));
}

#[test]
fn heterogeneous_array_is_rejected_and_field_untouched() {
    let registry = registry_for::<Collections>();
    let mut target = Collections {
        queue: VecDeque::from([42]),
        ..Default::default()
    };
    let (path, kind) = mapping_error(
        registry.decode_into(&mut target, &json(r#"{"queue": [1, "two", 3]}"#)),
    );
    assert_eq!(path, "queue");
    assert_eq!(
        kind,
        MappingErrorKind::ElementMismatch {
            index: 1,
            expected: "int",
            found: "string"
        }
    );
    assert_eq!(target.queue, VecDeque::from([42]));
}

#[test]
fn object_into_sequence_is_a_shape_mismatch() {
    let registry = registry_for::<Collections>();
    let (path, kind) = mapping_error(registry.from_text::<Collections>(r#"{"tags": {"a": 1}}"#));
    assert_eq!(path, "tags");
    assert_eq!(
        kind,
        MappingErrorKind::ShapeMismatch {
            expected: "array",
            found: "object"
        }
    );
}

#[test]
fn map_value_mismatch_names_the_key() {
    let registry = registry_for::<Collections>();
    let (path, kind) = mapping_error(
        registry.from_text::<Collections>(r#"{"limits": {"max": 1, "min": "low"}}"#),
    );
    assert_eq!(path, "limits.min");
    assert_eq!(
        kind,
        MappingErrorKind::ScalarMismatch {
            expected: "float",
            found: "string"
        }
    );
}

#[test]
fn array_into_map_is_a_shape_mismatch() {
    let registry = registry_for::<Collections>();
    let (path, _) = mapping_error(registry.from_text::<Collections>(r#"{"counts": [1]}"#));
    assert_eq!(path, "counts");
}

// ============================================================================
// Nested objects
// ============================================================================

#[test]
fn registering_a_type_registers_its_nested_types() {
    let registry = registry_for::<Person>();
    assert!(registry.is_registered::<Address>());
    assert_eq!(registry.type_names(), vec!["Address", "Person"]);
}

#[test]
fn encode_nested_object_graph() {
    let registry = registry_for::<Person>();
    assert_eq!(
        registry.to_text(&sample_person()).unwrap(),
        concat!(
            r#"{"name":"Ada","home":{"street":"12 Elm St","zip":10001},"#,
            r#""previous":[{"street":"1 Dock Rd","zip":30301}],"#,
            r#""by_label":{"work":{"street":"1 Dock Rd","zip":30301}}}"#
        )
    );
}

#[test]
fn nested_roundtrip() {
    let registry = registry_for::<Person>();
    let original = sample_person();
    let value = registry.encode(&original).unwrap();
    assert_eq!(registry.decode::<Person>(&value).unwrap(), original);
}

#[test]
fn nested_error_path() {
    let registry = registry_for::<Person>();
    let (path, kind) = mapping_error(
        registry.from_text::<Person>(r#"{"home": {"street": "s", "zip": "nope"}}"#),
    );
    assert_eq!(path, "home.zip");
    assert!(matches!(kind, MappingErrorKind::ScalarMismatch { .. }));
}

#[test]
fn nested_sequence_error_path() {
    let registry = registry_for::<Person>();
    let (path, _) = mapping_error(
        registry.from_text::<Person>(r#"{"previous": [{"zip": 1}, {"zip": true}]}"#),
    );
    assert_eq!(path, "previous[1].zip");
}

#[test]
fn nested_sequence_element_must_be_object() {
    let registry = registry_for::<Person>();
    let (path, kind) = mapping_error(registry.from_text::<Person>(r#"{"previous": [7]}"#));
    assert_eq!(path, "previous[0]");
    assert_eq!(
        kind,
        MappingErrorKind::ShapeMismatch {
            expected: "object",
            found: "int"
        }
    );
}

#[test]
fn nested_map_error_path() {
    let registry = registry_for::<Person>();
    let (path, _) = mapping_error(
        registry.from_text::<Person>(r#"{"by_label": {"work": {"street": 5}}}"#),
    );
    assert_eq!(path, "by_label.work.street");
}

#[test]
fn failed_nested_decode_leaves_field_untouched() {
    let registry = registry_for::<Person>();
    let mut target = sample_person();
    let before = target.home.clone();
    assert!(registry
        .decode_into(&mut target, &json(r#"{"home": {"street": "new", "zip": -1}}"#))
        .is_err());
    assert_eq!(target.home, before);
}

#[test]
fn recursive_types() {
    let registry = registry_for::<Tree>();
    let tree = Tree {
        value: 1,
        children: vec![
            Tree {
                value: 2,
                children: vec![],
            },
            Tree {
                value: 3,
                children: vec![Tree {
                    value: 4,
                    children: vec![],
                }],
            },
        ],
    };
    let text = registry.to_text(&tree).unwrap();
    assert_eq!(
        text,
        r#"{"value":1,"children":[{"value":2,"children":[]},{"value":3,"children":[{"value":4,"children":[]}]}]}"#
    );
    assert_eq!(registry.from_text::<Tree>(&text).unwrap(), tree);
}

#[test]
fn descriptor_lists_fields_and_kinds() {
    let registry = registry_for::<Person>();
    let descriptor = registry.descriptor::<Person>().unwrap();
    assert_eq!(descriptor.type_name(), "Person");
    let fields: Vec<(&str, FieldKind)> = descriptor
        .fields()
        .iter()
        .map(|field| (field.name(), field.kind()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("name", FieldKind::Scalar),
            ("home", FieldKind::NestedObject),
            ("previous", FieldKind::NestedSequence),
            ("by_label", FieldKind::NestedMap),
        ]
    );
    assert_eq!(descriptor.field("home").map(|f| f.kind()), Some(FieldKind::NestedObject));
    assert!(descriptor.field("missing").is_none());
}

#[test]
fn field_kind_accepts_matching_shapes() {
    assert!(FieldKind::Scalar.accepts(&Value::Null));
    assert!(!FieldKind::Scalar.accepts(&json("{}")));
    assert!(FieldKind::ScalarSequence.accepts(&json("[]")));
    assert!(FieldKind::NestedMap.accepts(&json("{}")));
    assert!(FieldKind::Polymorphic.accepts(&Value::Null));
    assert!(!FieldKind::Polymorphic.accepts(&json("[]")));
}

// ============================================================================
// Partial decoding and mismatch policy
// ============================================================================

#[test]
fn absent_fields_keep_their_values() {
    let registry = registry_for::<Primitives>();
    let mut target = Primitives {
        id: 1,
        label: "keep".into(),
        ..Default::default()
    };
    registry
        .decode_into(&mut target, &json(r#"{"id": 2}"#))
        .unwrap();
    assert_eq!(target.id, 2);
    assert_eq!(target.label, "keep");
}

#[test]
fn decode_stops_at_first_mismatch() {
    let registry = registry_for::<Primitives>();
    let mut target = Primitives::default();
    let result = registry.decode_into(
        &mut target,
        &json(r#"{"id": 5, "small": "bad", "displayName": "late"}"#),
    );
    assert!(result.is_err());
    assert_eq!(target.id, 5);
    assert_eq!(target.label, "");
}

#[test]
fn skip_field_policy_continues_past_mismatches() {
    let registry = lenient_registry_for::<Primitives>();
    let mut target = Primitives {
        small: 9,
        ..Default::default()
    };
    registry
        .decode_into(
            &mut target,
            &json(r#"{"id": 5, "small": "bad", "displayName": "late"}"#),
        )
        .unwrap();
    assert_eq!(target.id, 5);
    assert_eq!(target.small, 9);
    assert_eq!(target.label, "late");
}

#[test]
fn skip_field_policy_applies_inside_nested_objects() {
    let registry = lenient_registry_for::<Person>();
    let person: Person = registry
        .from_text(r#"{"name": "N", "home": {"street": "S", "zip": "bad"}}"#)
        .unwrap();
    assert_eq!(person.home.street, "S");
    assert_eq!(person.home.zip, 0);
}

#[test]
fn skip_field_policy_still_rejects_non_object_roots() {
    let registry = lenient_registry_for::<Primitives>();
    let (path, kind) = mapping_error(registry.decode::<Primitives>(&json("[1]")));
    assert_eq!(path, "");
    assert_eq!(
        kind,
        MappingErrorKind::ShapeMismatch {
            expected: "object",
            found: "array"
        }
    );
}

#[test]
fn root_must_be_an_object() {
    let registry = registry_for::<Primitives>();
    let err = registry.decode::<Primitives>(&json("42")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "mapping error at `<root>`: expected object, found int"
    );
}

#[test]
fn error_message_includes_path() {
    let registry = registry_for::<Person>();
    let err = registry
        .from_text::<Person>(r#"{"home": {"zip": "x"}}"#)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "mapping error at `home.zip`: expected int scalar, found string"
    );
}

#[test]
fn from_text_surfaces_parse_errors() {
    let registry = registry_for::<Primitives>();
    assert!(matches!(
        registry.from_text::<Primitives>(r#"{"id": }"#),
        Err(JsonError::Syntax { .. })
    ));
}

// ============================================================================
// Polymorphic fields
// ============================================================================

#[test]
fn encode_polymorphic_writes_discriminator_first() {
    let registry = shapes_registry();
    let drawing = Drawing {
        title: "d".into(),
        primary: Some(Box::new(Circle { radius: 1.5 })),
    };
    assert_eq!(
        registry.to_text(&drawing).unwrap(),
        r#"{"title":"d","primary":{"__type":"Circle","radius":1.5}}"#
    );
}

#[test]
fn decode_polymorphic_resolves_the_variant() {
    let registry = shapes_registry();
    let drawing: Drawing = registry
        .from_text(r#"{"title":"r","primary":{"__type":"Rect","width":2,"height":3.5}}"#)
        .unwrap();
    let shape = drawing.primary.as_deref().expect("shape decoded");
    assert_eq!(shape.variant_name(), "Rect");
    assert_eq!(shape.area(), 7.0);
    assert_eq!(
        shape.as_any().downcast_ref::<Rect>(),
        Some(&Rect {
            width: 2.0,
            height: 3.5
        })
    );
}

#[test]
fn discriminator_position_does_not_matter_on_decode() {
    let registry = shapes_registry();
    let drawing: Drawing = registry
        .from_text(r#"{"primary":{"radius":2,"__type":"Circle"}}"#)
        .unwrap();
    let circle = drawing
        .primary
        .as_deref()
        .and_then(|shape| shape.as_any().downcast_ref::<Circle>());
    assert_eq!(circle, Some(&Circle { radius: 2.0 }));
}

#[test]
fn polymorphic_roundtrip() {
    let registry = shapes_registry();
    for shape in [
        Box::new(Circle { radius: 0.25 }) as Box<dyn Shape>,
        Box::new(Rect {
            width: 4.0,
            height: 0.5,
        }),
    ] {
        let area = shape.area();
        let name = shape.variant_name();
        let drawing = Drawing {
            title: name.into(),
            primary: Some(shape),
        };
        let back: Drawing = registry
            .from_text(&registry.to_text(&drawing).unwrap())
            .unwrap();
        let decoded = back.primary.as_deref().unwrap();
        assert_eq!(decoded.variant_name(), name);
        assert_eq!(decoded.area(), area);
    }
}

#[test]
fn polymorphic_none_is_null() {
    let registry = shapes_registry();
    let drawing = Drawing {
        title: "empty".into(),
        primary: None,
    };
    let text = registry.to_text(&drawing).unwrap();
    assert_eq!(text, r#"{"title":"empty","primary":null}"#);
    let back: Drawing = registry.from_text(&text).unwrap();
    assert!(back.primary.is_none());
}

#[test]
fn unknown_variant_is_rejected() {
    let registry = shapes_registry();
    let (path, kind) = mapping_error(
        registry.from_text::<Drawing>(r#"{"primary":{"__type":"Hexagon","side":1}}"#),
    );
    assert_eq!(path, "primary");
    assert_eq!(kind, MappingErrorKind::UnknownVariant("Hexagon".into()));
}

#[test]
fn missing_discriminator_is_rejected() {
    let registry = shapes_registry();
    let (path, kind) = mapping_error(registry.from_text::<Drawing>(r#"{"primary":{"radius":1}}"#));
    assert_eq!(path, "primary");
    assert_eq!(kind, MappingErrorKind::MissingDiscriminator);
}

#[test]
fn non_string_discriminator_is_rejected() {
    let registry = shapes_registry();
    let (_, kind) = mapping_error(registry.from_text::<Drawing>(r#"{"primary":{"__type":3}}"#));
    assert_eq!(kind, MappingErrorKind::MissingDiscriminator);
}

#[test]
fn variant_field_errors_carry_the_path() {
    let registry = shapes_registry();
    let (path, _) = mapping_error(
        registry.from_text::<Drawing>(r#"{"primary":{"__type":"Circle","radius":"big"}}"#),
    );
    assert_eq!(path, "primary.radius");
}

#[test]
fn scalar_into_polymorphic_is_a_shape_mismatch() {
    let registry = shapes_registry();
    let (_, kind) = mapping_error(registry.from_text::<Drawing>(r#"{"primary":5}"#));
    assert_eq!(
        kind,
        MappingErrorKind::ShapeMismatch {
            expected: "object or null",
            found: "int"
        }
    );
}

#[test]
fn encoding_an_unregistered_variant_fails() {
    let registry = shapes_registry();
    let drawing = Drawing {
        title: "t".into(),
        primary: Some(Box::new(Triangle { base: 1.0 })),
    };
    let (path, kind) = mapping_error(registry.encode(&drawing));
    assert_eq!(path, "primary");
    assert_eq!(kind, MappingErrorKind::UnregisteredVariant("Triangle".into()));
}

#[test]
fn variants_are_scoped_to_their_abstract_type() {
    let mut builder = Registry::builder();
    builder.register::<Drawing>().register::<Circle>();
    let registry = builder.build().unwrap();
    let (_, kind) = mapping_error(
        registry.from_text::<Drawing>(r#"{"primary":{"__type":"Circle","radius":1}}"#),
    );
    assert_eq!(kind, MappingErrorKind::UnknownVariant("Circle".into()));
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn unregistered_type_is_not_mappable() {
    let registry = Registry::builder().build().unwrap();
    match registry.encode(&Address::default()) {
        Err(JsonError::NotMappable { type_name }) => assert_eq!(type_name, "Address"),
        other => panic!("expected NotMappable, got {other:?}"),
    }
    assert!(registry.decode::<Address>(&json("{}")).is_err());
}

#[test]
fn reserved_field_name_fails_registration() {
    let mut builder = Registry::builder();
    builder.register::<ReservedName>();
    match builder.build() {
        Err(JsonError::Registration(message)) => assert!(message.contains("__type"), "{message}"),
        other => panic!("expected registration error, got {other:?}"),
    }
}

#[test]
fn duplicate_field_name_fails_registration() {
    let mut builder = Registry::builder();
    builder.register::<DuplicateName>();
    match builder.build() {
        Err(JsonError::Registration(message)) => {
            assert!(message.contains("DuplicateName"), "{message}")
        }
        other => panic!("expected registration error, got {other:?}"),
    }
}

#[test]
fn registering_twice_is_harmless() {
    let mut builder = Registry::builder();
    builder
        .register::<Person>()
        .register::<Person>()
        .register::<Address>();
    let registry = builder.build().unwrap();
    assert_eq!(registry.type_names().len(), 2);
}

#[test]
fn encode_any_dispatches_on_runtime_type() {
    let registry = registry_for::<Person>();
    let address = Address {
        street: "x".into(),
        zip: 1,
    };
    let erased: &dyn Any = &address;
    assert_eq!(
        registry.encode_any(erased).unwrap().to_text(),
        r#"{"street":"x","zip":1}"#
    );
    assert!(matches!(
        registry.encode_any(&5_i32),
        Err(JsonError::NotMappable { .. })
    ));
}

#[test]
fn registry_is_shareable_across_threads() {
    let registry = std::sync::Arc::new(registry_for::<Person>());
    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                let mut person = sample_person();
                person.home.zip = i;
                let back: Person = registry
                    .from_text(&registry.to_text(&person).unwrap())
                    .unwrap();
                back.home.zip
            })
        })
        .collect();
    let mut zips: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    zips.sort_unstable();
    assert_eq!(zips, vec![0, 1, 2, 3]);
}

#[test]
fn registry_debug_lists_type_names() {
    let registry = registry_for::<Person>();
    let debug = format!("{registry:?}");
    assert!(debug.contains("Address") && debug.contains("Person"), "{debug}");
}
