//! The table of code generators, keyed by tool id.

use std::{collections::HashMap, fmt::Debug};

use crate::{
    ir::Fragment,
    model::PuzzleModel,
    puzzle::{ConstraintsElement, InstanceShape},
    tool,
};

/// A code generator for one tool.
///
/// Generators are pure with respect to everything but the model: they read
/// the grid, resolve clue values through the shared registry, and return the
/// statements for one element. Instances that cannot be compiled are reported
/// through [`PuzzleModel::skip`] and contribute nothing.
pub trait ConstraintCompiler: Debug + Send + Sync {
    /// Returns the tool id this generator handles.
    fn tool_id(&self) -> &'static str;

    /// Returns the instance shape this generator expects.
    fn shape(&self) -> InstanceShape;

    /// Returns a boxed clone of the generator.
    fn clone_box(&self) -> BoxedCompiler;

    /// Compiles `element` into a fragment.
    fn compile(&self, model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment;
}

/// A boxed generator.
pub type BoxedCompiler = Box<dyn ConstraintCompiler>;

impl Clone for BoxedCompiler {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Signature of a plain generator function.
pub type GenerateFn = fn(&mut PuzzleModel<'_>, &ConstraintsElement) -> Fragment;

/// A [`ConstraintCompiler`] backed by a plain function.
///
/// # Examples
///
/// ```
/// use gridcsp_compiler::{
///     ir::Fragment,
///     puzzle::InstanceShape,
///     registry::{CompilerRegistry, FnCompiler},
/// };
///
/// let mut registry = CompilerRegistry::new();
/// registry.register(FnCompiler::new("noop", InstanceShape::Cell, |_, _| Fragment::new()));
/// assert_eq!(registry.tool_ids(), ["noop"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnCompiler {
    tool_id: &'static str,
    shape: InstanceShape,
    generate: GenerateFn,
}

impl FnCompiler {
    /// Wraps `generate` as the generator for `tool_id`.
    #[must_use]
    pub const fn new(tool_id: &'static str, shape: InstanceShape, generate: GenerateFn) -> Self {
        Self {
            tool_id,
            shape,
            generate,
        }
    }
}

impl ConstraintCompiler for FnCompiler {
    fn tool_id(&self) -> &'static str {
        self.tool_id
    }

    fn shape(&self) -> InstanceShape {
        self.shape
    }

    fn clone_box(&self) -> BoxedCompiler {
        Box::new(*self)
    }

    fn compile(&self, model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
        (self.generate)(model, element)
    }
}

/// The generators available to a compilation.
///
/// The registry is an ordinary value passed to the
/// [`ModelAssembler`](crate::assembler::ModelAssembler); there is no global
/// table, so tests can build one holding only fakes.
#[derive(Debug, Clone, Default)]
pub struct CompilerRegistry {
    compilers: HashMap<&'static str, BoxedCompiler>,
}

impl CompilerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in generator.
    #[must_use]
    pub fn with_all_tools() -> Self {
        let mut registry = Self::new();
        for compiler in tool::all_compilers() {
            registry.insert(compiler);
        }
        registry
    }

    /// Registers `compiler`, returning the generator it replaces.
    pub fn register<C>(&mut self, compiler: C) -> Option<BoxedCompiler>
    where
        C: ConstraintCompiler + 'static,
    {
        self.insert(Box::new(compiler))
    }

    /// Registers a boxed generator, returning the generator it replaces.
    pub fn insert(&mut self, compiler: BoxedCompiler) -> Option<BoxedCompiler> {
        let previous = self.compilers.insert(compiler.tool_id(), compiler);
        if let Some(previous) = &previous {
            log::debug!("replacing generator for {}", previous.tool_id());
        }
        previous
    }

    /// Returns the generator for `tool_id`.
    #[must_use]
    pub fn get(&self, tool_id: &str) -> Option<&dyn ConstraintCompiler> {
        self.compilers.get(tool_id).map(AsRef::as_ref)
    }

    /// Returns the registered tool ids, sorted.
    #[must_use]
    pub fn tool_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.compilers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of registered generators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compilers.len()
    }

    /// Returns `true` if no generator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compilers.is_empty()
    }
}
