//! # draftlint_rules
//!
//! Deterministic rules for draftlint.
//!
//! Every rule declares a [`RecheckPolicy`](draftlint_cache::RecheckPolicy)
//! describing how far an edit's influence reaches, and only reports on the
//! elements the planner hands it.
//!
//! | Rule | Policy | Checks |
//! |------|--------|--------|
//! | `punctuation` | Local (sentence) | Sentences end with terminal punctuation |
//! | `caption` | Local (figure, table) | Floats carry a caption |
//! | `section-density` | File-aggregate | Sections contain enough sentences |
//! | `abbreviation` | Order-dependent | Acronyms are defined at first use |

mod error;
mod rule;
pub mod rules;

pub use error::RuleError;
pub use rule::{BuiltinOptions, Rule, RuleSet, run_rule};
