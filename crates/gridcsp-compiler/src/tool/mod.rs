//! Built-in generators, grouped by instance shape.
//!
//! Each submodule exports its tool ids and flag names as constants and a
//! `COMPILERS` table. [`all_compilers`] collects every table; it is what
//! [`CompilerRegistry::with_all_tools`](crate::registry::CompilerRegistry::with_all_tools)
//! registers.

use crate::registry::{BoxedCompiler, ConstraintCompiler as _};

pub mod cage;
pub mod cell;
pub mod corner;
pub mod edge;
pub mod global;
pub mod line;
pub mod modifier;
pub mod outside;
pub mod shading;

/// Returns every built-in generator.
///
/// # Examples
///
/// ```
/// use gridcsp_compiler::tool;
///
/// let compilers = tool::all_compilers();
/// assert!(compilers.iter().any(|c| c.tool_id() == "killer_cage"));
/// ```
#[must_use]
pub fn all_compilers() -> Vec<BoxedCompiler> {
    [
        cage::COMPILERS,
        line::COMPILERS,
        cell::COMPILERS,
        outside::COMPILERS,
        edge::COMPILERS,
        corner::COMPILERS,
        global::COMPILERS,
        shading::COMPILERS,
        modifier::COMPILERS,
    ]
    .into_iter()
    .flatten()
    .map(|compiler| compiler.clone_box())
    .collect()
}
