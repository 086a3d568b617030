//! The function registry
//!
//! Built once from extension sources, then only read. Coverage counters are
//! kept outside the registry so one instance can serve any number of runs.

use crate::dependency_graph::DependencyGraph;
use crate::error::{RegistryError, RegistryResult};
use crate::model::*;
use crate::types::DataType;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Aggregate counts used as regression guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegistryStats {
    pub namespaces: usize,
    /// Distinct function names across all namespaces
    pub functions: usize,
    pub scalar_functions: usize,
    pub aggregate_functions: usize,
    pub window_functions: usize,
    pub dependencies: usize,
    pub variants: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    namespaces: Vec<Namespace>,
    functions: Vec<Function>,
    variants: Vec<Variant>,
    /// Namespace keys and URN aliases
    lookup: HashMap<String, NamespaceId>,
    dependencies: DependencyGraph,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Construction

    /// Register a new namespace under `key`, optionally aliased by `urn`
    pub fn add_namespace(&mut self, key: &str, urn: Option<&str>) -> RegistryResult<NamespaceId> {
        if self.lookup.contains_key(key) || urn.is_some_and(|urn| self.lookup.contains_key(urn)) {
            return Err(RegistryError::DuplicateNamespace {
                key: key.to_string(),
            });
        }

        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(Namespace {
            id,
            key: key.to_string(),
            urn: urn.map(str::to_string),
            functions: IndexMap::new(),
            dependencies: IndexMap::new(),
        });
        self.lookup.insert(key.to_string(), id);
        if let Some(urn) = urn {
            self.lookup.insert(urn.to_string(), id);
        }
        self.dependencies.add_namespace(key);
        Ok(id)
    }

    /// Record that `namespace` reuses `target` under `alias`
    pub fn add_dependency(&mut self, namespace: NamespaceId, alias: &str, target: &str) {
        let ns = &mut self.namespaces[namespace.index()];
        ns.dependencies.insert(alias.to_string(), target.to_string());
        let key = ns.key.clone();
        self.dependencies.add_dependency(&key, alias, target);
    }

    /// Find or create the function `name` in `namespace`. Redeclaring a
    /// function with the same kind merges; a different kind is an error.
    pub fn add_function(
        &mut self,
        namespace: NamespaceId,
        name: &str,
        kind: FunctionKind,
    ) -> RegistryResult<FunctionId> {
        let ns = &self.namespaces[namespace.index()];
        if let Some(&existing) = ns.functions.get(name) {
            let function = &self.functions[existing.index()];
            if function.kind != kind {
                return Err(RegistryError::ConflictingKind {
                    namespace: ns.key.clone(),
                    function: name.to_string(),
                    existing: function.kind,
                    found: kind,
                });
            }
            return Ok(existing);
        }

        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Function {
            id,
            namespace,
            name: name.to_string(),
            kind,
            variants: Vec::new(),
        });
        self.namespaces[namespace.index()]
            .functions
            .insert(name.to_string(), id);
        Ok(id)
    }

    /// Add an overload; two overloads of one function may not share a
    /// parameter sequence
    pub fn add_variant(
        &mut self,
        function: FunctionId,
        params: Vec<ParamPattern>,
        variadic: Option<Variadic>,
        return_type: DataType,
    ) -> RegistryResult<VariantId> {
        let owner = &self.functions[function.index()];
        let signature = format_signature(&owner.name, &params, variadic);

        let duplicate = owner
            .variants
            .iter()
            .any(|&existing| self.variants[existing.index()].params == params);
        if duplicate {
            return Err(RegistryError::DuplicateVariant {
                namespace: self.namespaces[owner.namespace.index()].key.clone(),
                signature,
            });
        }

        let id = VariantId(self.variants.len() as u32);
        self.variants.push(Variant {
            id,
            function,
            params,
            variadic,
            return_type,
            signature,
        });
        self.functions[function.index()].variants.push(id);
        Ok(id)
    }

    // Lookup

    /// All namespaces in discovery order
    pub fn list_namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn variant(&self, id: VariantId) -> &Variant {
        &self.variants[id.index()]
    }

    /// Namespace of a key or URN, without file-name matching
    pub fn namespace_by_key(&self, key: &str) -> Option<NamespaceId> {
        self.lookup.get(key).copied()
    }

    /// Resolve a test file include: exact key, then URN, then a unique
    /// namespace whose file name matches
    pub fn namespace_for(&self, include: &str) -> Option<NamespaceId> {
        if let Some(id) = self.namespace_by_key(include) {
            return Some(id);
        }

        let file_name = file_name_of(include);
        let mut candidates = self
            .namespaces
            .iter()
            .filter(|ns| file_name_of(&ns.key) == file_name);
        match (candidates.next(), candidates.next()) {
            (Some(ns), None) => Some(ns.id),
            _ => None,
        }
    }

    /// Functions of a namespace in declaration order
    pub fn functions_of(&self, namespace: NamespaceId) -> impl Iterator<Item = &Function> {
        self.namespaces[namespace.index()]
            .functions
            .values()
            .map(|&id| &self.functions[id.index()])
    }

    /// Variants of a function in declaration order
    pub fn variants_of(&self, function: FunctionId) -> impl Iterator<Item = &Variant> {
        self.functions[function.index()]
            .variants
            .iter()
            .map(|&id| &self.variants[id.index()])
    }

    /// Visit every (namespace, function, variant) triple in discovery order
    pub fn for_each_variant<F>(&self, mut visitor: F)
    where
        F: FnMut(&Namespace, &Function, &Variant),
    {
        for namespace in &self.namespaces {
            for function in self.functions_of(namespace.id) {
                for variant in self.variants_of(function.id) {
                    visitor(namespace, function, variant);
                }
            }
        }
    }

    /// Namespaces reachable through dependency edges, breadth first in
    /// declaration order. Targets that were not loaded are skipped.
    pub fn dependency_chain(&self, namespace: NamespaceId) -> Vec<NamespaceId> {
        let mut visited = HashSet::from([namespace]);
        let mut queue = VecDeque::from([namespace]);
        let mut chain = Vec::new();

        while let Some(current) = queue.pop_front() {
            let key = &self.namespaces[current.index()].key;
            for (_, target) in self.dependencies.dependencies_of(key) {
                let Some(id) = self.namespace_by_key(target) else {
                    continue;
                };
                if visited.insert(id) {
                    chain.push(id);
                    queue.push_back(id);
                }
            }
        }

        chain
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.dependencies
    }

    // Counts

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Distinct function names; a name declared in several namespaces counts once
    pub fn function_count(&self) -> usize {
        self.functions
            .iter()
            .map(|function| function.name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Functions of one kind, counting each (namespace, name) pair
    pub fn function_count_by_kind(&self, kind: FunctionKind) -> usize {
        self.functions.iter().filter(|f| f.kind == kind).count()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.edge_count()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            namespaces: self.namespace_count(),
            functions: self.function_count(),
            scalar_functions: self.function_count_by_kind(FunctionKind::Scalar),
            aggregate_functions: self.function_count_by_kind(FunctionKind::Aggregate),
            window_functions: self.function_count_by_kind(FunctionKind::Window),
            dependencies: self.dependency_count(),
            variants: self.variant_count(),
        }
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', ':']).next().unwrap_or(path)
}
