//! Reflected-function lowering
//!
//! Translates a function literal from the syntax tree into the closed IR of
//! [`rf_ir`]. Lowering is a single recursive descent over the function's
//! parameters and body:
//! - [`function`] handles the function shape itself
//! - [`stmt`] and [`expr`] translate the supported grammar subset
//! - [`binder`] maps call arguments onto resolved parameters
//! - [`reference`] recognizes handles to external resources
//! - [`boundary`] turns any failure into an `Err` node
//!
//! Type questions go through the [`TypeOracle`] held by the
//! [`LoweringContext`]; the engine never depends on a concrete checker.

pub mod binder;
pub mod boundary;
pub mod error;
pub mod expr;
pub mod function;
pub mod operator;
pub mod reference;
pub mod stmt;

pub use boundary::{contain, lower_reflected};
pub use error::LoweringError;
pub use function::{FunctionFlavor, lower_function};

use rf_ty::TypeOracle;

/// Result of lowering one syntax node
pub type LowerResult<T = rf_ir::Node> = Result<T, LoweringError>;

/// State shared by one lowering invocation
#[derive(Clone, Copy)]
pub struct LoweringContext<'oracle> {
    oracle: &'oracle dyn TypeOracle,
}

impl<'oracle> LoweringContext<'oracle> {
    /// Create a context answering type questions with `oracle`
    pub fn new(oracle: &'oracle dyn TypeOracle) -> Self {
        Self { oracle }
    }

    /// The type oracle
    pub fn oracle(&self) -> &'oracle dyn TypeOracle {
        self.oracle
    }
}

impl std::fmt::Debug for LoweringContext<'_> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("LoweringContext").finish_non_exhaustive()
    }
}
