//! Tunable behaviour for the parser and the object mapper.
//!
//! Both structs deserialize from any serde format with kebab-case names and
//! per-field defaults, so an embedding application can keep them in its own
//! configuration file:
//!
//! ```
//! use jsonmap_core::{MapperOptions, MismatchPolicy, ParseOptions};
//!
//! let parse: ParseOptions = serde_json::from_str(r#"{"max-depth": 16}"#).unwrap();
//! assert_eq!(parse.max_depth, 16);
//!
//! let mapper: MapperOptions = serde_json::from_str(r#"{"mismatch": "skip-field"}"#).unwrap();
//! assert_eq!(mapper.mismatch, MismatchPolicy::SkipField);
//! ```

use serde::{Deserialize, Serialize};

/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParseOptions {
    /// Deepest allowed container nesting. The root container is depth 1.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// What decoding does when a stored value does not fit a field's declared
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchPolicy {
    /// Abort the decode with a mapping error.
    #[default]
    Fail,
    /// Leave the field at its prior value and carry on with the next one.
    SkipField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MapperOptions {
    pub mismatch: MismatchPolicy,
}
