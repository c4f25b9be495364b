pub mod calculator;
pub mod equation;
pub mod error;
pub mod expression;
pub mod format;
pub mod fraction;
pub mod grades;
pub mod integer;
pub mod matrix;
pub mod percentage;
pub mod polynomial;
pub mod ratio;
pub mod record;
pub mod stats;
pub mod step;
pub mod store;
pub mod trig;
pub mod validation;

pub use calculator::{CalcRequest, CalculatorKind, Computed};
pub use error::{CalcError, CalcResult};
pub use format::{fmt, format_number};
pub use fraction::Fraction;
pub use matrix::Matrix;
pub use polynomial::Polynomial;
pub use record::{CalculationRecord, HistoryStats, DEFAULT_TTL_DAYS};
pub use step::{Solution, Step};
pub use store::HistoryStore;
