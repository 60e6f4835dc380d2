//! Results data model for election result reports.
//!
//! An [`Election`] is loaded from a JSON definition with [`load_election`].
//! Its contests and turnout hold dense result matrices, read through a
//! [`ResultsSource`], and answer total queries through [`IndexedTotals`].
//! Ranked-choice contests also expose their rounds through [`RcvResults`].
//!
//! See the [`manual`] for the input formats.

mod area;
pub mod builder;
mod catalog;
mod choice;
mod contest;
mod election;
mod error;
mod format;
mod loader;
pub mod manual;
mod mapping;
mod rcv;
mod reportable;
mod tabular;
mod totals;
mod turnout;

pub use crate::area::*;
pub use crate::catalog::*;
pub use crate::choice::*;
pub use crate::contest::*;
pub use crate::election::*;
pub use crate::error::*;
pub use crate::format::*;
pub use crate::loader::*;
pub use crate::mapping::*;
pub use crate::rcv::*;
pub use crate::reportable::*;
pub use crate::tabular::*;
pub use crate::totals::*;
pub use crate::turnout::*;
