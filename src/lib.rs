//! A Pine virtual machine: a minimal, self-describing evaluator over a
//! uniform tree-of-bytes value space, with bidirectional encoding between
//! Pine values and Pine expressions, and a mapping to and from a
//! higher-level Elm-style value domain.
//!
//! See the module docs for each layer: [`value`] (the substrate), [`expr`]
//! (the expression algebra and its codec), [`kernel`] (the fixed primitive
//! set), [`cache`] and [`eval`] (the evaluator), and [`elm`] (the
//! higher-level value domain and pretty-printer).

pub mod cache;
pub mod elm;
pub mod error;
pub mod eval;
pub mod expr;
pub mod intern;
pub mod kernel;
pub mod value;

pub use elm::encode::{decode_elm_as_pine, encode_pine_as_elm};
pub use elm::pretty::elm_value_to_expression_string;
pub use elm::{elm_from_pine, pine_from_elm, ElmValue, ElmValueKind};
pub use error::{ErrorKind, PineError, PineResult, ResultExt};
pub use eval::{PineVm, VmConfig, DEFAULT_CACHE_WRITE_THRESHOLD, DEFAULT_MAX_RECURSION_DEPTH};
pub use expr::{decode_expression, encode_expression, Delegating, Expr};
pub use kernel::KernelName;
pub use value::Value;
