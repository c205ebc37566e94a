//! # jsonmap-core
//!
//! A small JSON toolkit: a position-tracking tokenizer, a recursive-descent
//! parser producing an insertion-ordered [`Value`] tree, a compact
//! serializer, and a descriptor-driven object mapper for plain Rust structs.
//!
//! ## Quick start
//!
//! ```rust
//! use jsonmap_core::{impl_mappable, parse, Registry};
//!
//! // Text → value tree → text
//! let value = parse(r#"{"name": "Alice", "scores": [95, 87.5]}"#).unwrap();
//! assert_eq!(value["scores"][1].as_f64(), Some(87.5));
//! assert_eq!(value.to_text(), r#"{"name":"Alice","scores":[95,87.5]}"#);
//!
//! // Struct ↔ value tree
//! #[derive(Debug, Default, PartialEq)]
//! struct Player {
//!     name: String,
//!     scores: Vec<i64>,
//! }
//!
//! impl_mappable! {
//!     Player as "Player" {
//!         name: scalar,
//!         scores: scalar_seq,
//!     }
//! }
//!
//! let mut builder = Registry::builder();
//! builder.register::<Player>();
//! let registry = builder.build().unwrap();
//!
//! let player: Player = registry.from_text(r#"{"name":"Bo","scores":[3,1]}"#).unwrap();
//! assert_eq!(player, Player { name: "Bo".into(), scores: vec![3, 1] });
//! assert_eq!(registry.to_text(&player).unwrap(), r#"{"name":"Bo","scores":[3,1]}"#);
//! ```
//!
//! ## Modules
//!
//! - [`cursor`]: character cursor with line/column tracking
//! - [`lexer`]: tokenizer with one token of lookahead
//! - [`parser`]: recursive-descent parser and typed sub-parsers
//! - [`value`]: the `Value` tree and its accessors
//! - [`ser`]: compact serializer
//! - [`mapper`]: type descriptors, registry, encode/decode
//! - [`interop`]: conversions to and from `serde_json`

pub mod cursor;
pub mod error;
pub mod interop;
pub mod lexer;
pub mod mapper;
pub mod options;
pub mod parser;
pub mod ser;
pub mod token;
pub mod value;

pub use error::{JsonError, Position, Result};
pub use mapper::{
    decode, encode, FieldDescriptor, FieldKind, Fields, Keyed, Mappable, MappableDyn, Registry,
    RegistryBuilder, Scalar, Sequence, TypeDescriptor, DISCRIMINATOR_KEY,
};
pub use options::{MapperOptions, MismatchPolicy, ParseOptions};
pub use parser::{parse, parse_array, parse_object, parse_with};
pub use ser::to_string;
pub use value::{Map, Value};
