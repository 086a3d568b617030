//! Overload resolution
//!
//! A call resolves against the first namespace declaring the function: the
//! named namespace itself, or else its dependencies breadth first. Within that
//! namespace the matching variant with the most concrete parameter patterns
//! wins; ties go to the variant declared first.

use crate::error::TypeError;
use crate::model::{ArgType, FunctionId, NamespaceId, Variant};
use crate::registry::FunctionRegistry;
use crate::types::DataType;
use extcov_parser::{Argument, TestCase};

impl ArgType {
    /// Canonicalize one test case argument
    pub fn from_argument(argument: &Argument) -> Result<Self, TypeError> {
        match argument {
            Argument::Enum { value } => Ok(ArgType::Enum(value.clone())),
            Argument::Value { data_type, .. } | Argument::Column { data_type, .. } => {
                Ok(ArgType::Value(DataType::from_expr(data_type)?))
            }
        }
    }
}

/// Canonical argument types of a test case
pub fn arg_types_of(case: &TestCase) -> Result<Vec<ArgType>, TypeError> {
    case.arguments.iter().map(ArgType::from_argument).collect()
}

impl FunctionRegistry {
    /// Find the variant of `name` that a call with `args` exercises
    ///
    /// Not finding one is an ordinary outcome and yields `None`. Dependencies
    /// are only consulted when the named namespace does not declare `name`.
    pub fn resolve_overload(
        &self,
        name: &str,
        namespace: NamespaceId,
        args: &[ArgType],
    ) -> Option<&Variant> {
        let function = std::iter::once(namespace)
            .chain(self.dependency_chain(namespace))
            .find_map(|candidate| self.namespace(candidate).functions.get(name).copied())?;
        self.resolve_in(name, function, args)
    }

    fn resolve_in(&self, name: &str, function: FunctionId, args: &[ArgType]) -> Option<&Variant> {
        let mut best: Option<(&Variant, usize)> = None;
        for variant in self.variants_of(function) {
            if !variant.matches(args) {
                continue;
            }
            let score = variant.specificity();
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((variant, score));
            }
        }

        if let Some((variant, _)) = best {
            tracing::trace!(function = name, signature = %variant.signature, "resolved overload");
        }
        best.map(|(variant, _)| variant)
    }
}
