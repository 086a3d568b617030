//! extcov Function Registry
//!
//! Models the functions declared by a set of extension sources and resolves
//! test case calls to the overload they exercise.
//!
//! ## Architecture
//!
//! - **Type canonicalization** (`types`): long/short type names, parameter
//!   matching and return-type comparison
//! - **Registry** (`registry`, `model`): namespaces, functions and variants
//!   in discovery order, addressed by stable ids
//! - **Loader** (`loader`): YAML extension sources into a registry
//! - **Resolution** (`resolution`): overload selection with dependency fallback

pub mod dependency_graph;
pub mod error;
pub mod loader;
pub mod model;
pub mod registry;
pub mod resolution;
pub mod types;

pub use dependency_graph::DependencyGraph;
pub use error::{RegistryError, RegistryResult, TypeError};
pub use loader::LoaderOptions;
pub use model::{
    format_signature, ArgType, Function, FunctionId, FunctionKind, Namespace, NamespaceId,
    ParamPattern, Variadic, Variant, VariantId,
};
pub use registry::{FunctionRegistry, RegistryStats};
pub use resolution::arg_types_of;
pub use types::{long_name, same_type, short_alias, DataType, Param, TypeKind};
