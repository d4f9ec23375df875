//! PAGE: Pathway Analysis of Gene Expression
//!
//! This library identifies pathways whose gene membership carries
//! statistically significant, non-redundant information about a discretized
//! gene expression profile.
//!
//! The main components of this library are:
//! - `Page`: The analysis orchestrator
//! - `PageConfig`: Configuration of the permutation search and consolidation
//! - `ExpressionProfile` / `GeneOntology`: Indexed expression bins and pathway memberships
//! - `PageResults`, `Summary`, `Heatmap`: Structures to hold and display the results
//!
//! The statistical building blocks are exposed in [`hist`], [`information`]
//! and [`math`].

pub mod config;
pub mod error;
pub mod hist;
pub mod information;
pub mod io;
pub mod math;
mod page;
mod results;
pub mod selection;
mod utils;

pub use config::{InformationFunction, PageConfig};
pub use error::{PageError, Result};
pub use io::{ExpressionProfile, GeneOntology};
pub use page::Page;
pub use results::{GeneExpression, Heatmap, PageResults, PathwayResult, Summary, SummaryRow};
