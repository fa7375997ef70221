//! Compiles declarative Sudoku-variant puzzles into constraint model text.
//!
//! A [`Puzzle`] is a [`Grid`](gridcsp_core::Grid) plus a map from tool id to
//! [`ConstraintsElement`]. Each tool id has one generator, registered in a
//! [`CompilerRegistry`], which turns the element's instances into a
//! [`Fragment`] of model statements. [`ModelAssembler`] runs the generators in
//! element order and concatenates their fragments into a [`CompiledModel`].
//!
//! # Overview
//!
//! - [`puzzle`]: The input model: elements, instances, and their geometry.
//! - [`document`]: The serde-facing puzzle document and its conversion.
//! - [`value`]: The clue value language (literals, names, intervals, lists).
//! - [`shared`]: Per-compilation memoization of auxiliary declarations.
//! - [`model`]: The context handed to generators, with skip diagnostics.
//! - [`ir`]: Structured statements and expressions, rendered on display.
//! - [`codegen`]: Helpers shared by generators.
//! - [`tool`]: The built-in generators.
//! - [`registry`]: Tool id to generator lookup.
//! - [`assembler`]: The compilation driver.
//!
//! The digit grid (`grid`) and the base rules are owned by the surrounding
//! model template. Compiled text only adds the variant rules, so a puzzle
//! without elements compiles to an empty string. Grid givens are emitted only
//! when [`AssemblerSettings::givens`] is set.
//!
//! # Examples
//!
//! ```
//! use gridcsp_compiler::{
//!     CompilerRegistry, ConstraintInstance, ConstraintsElement, ModelAssembler, Puzzle,
//! };
//! use gridcsp_core::{Direction, Grid, Position};
//!
//! let puzzle = Puzzle::new(Grid::standard(9)).with_element(
//!     ConstraintsElement::new("little_killer_sum").with_instance(
//!         "lk1",
//!         ConstraintInstance::cell_direction(Position::new(-1, 5), Direction::DownRight)
//!             .with_value("12"),
//!     ),
//! );
//!
//! let registry = CompilerRegistry::with_all_tools();
//! let model = ModelAssembler::new(&registry).compile(&puzzle)?;
//! assert_eq!(
//!     model.text(),
//!     "% little_killer_sum\nconstraint sum([grid[1,7], grid[2,8], grid[3,9]]) = 12;\n"
//! );
//! # Ok::<(), gridcsp_compiler::CompileError>(())
//! ```

pub use self::{
    assembler::{AssemblerSettings, CompileError, CompiledModel, ModelAssembler},
    document::{DocumentError, PuzzleDocument},
    ir::{Fragment, Statement},
    model::{PuzzleModel, SkipDiagnostic, SkipReason},
    puzzle::{ConstraintInstance, ConstraintsElement, InstanceGeometry, InstanceShape, Puzzle},
    registry::{CompilerRegistry, ConstraintCompiler},
};

pub mod assembler;
pub mod codegen;
pub mod document;
pub mod ir;
pub mod model;
pub mod puzzle;
pub mod registry;
pub mod shared;
pub mod tool;
pub mod value;

#[cfg(test)]
mod testing;
