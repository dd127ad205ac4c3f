//! Built-in rule bodies.

mod abbreviation;
mod caption;
mod punctuation;
mod section_density;

pub use abbreviation::Abbreviation;
pub use caption::Caption;
pub use punctuation::Punctuation;
pub use section_density::SectionDensity;

use draftlint_ast::Element;
use draftlint_cache::{ElementKey, IdentifiedDocument, RecheckSet};

/// Target elements in document order.
pub(crate) fn targets<'a>(
    doc: &'a IdentifiedDocument,
    targets: &'a RecheckSet,
) -> impl Iterator<Item = (&'a ElementKey, &'a Element)> + 'a {
    doc.iter().filter(move |(key, _)| targets.contains(key))
}
