//! Standard parser catalog.
//!
//! Small set of leaf parsers covering the common argument shapes: bounded
//! integers, strings in single/greedy modes, string arrays, booleans, keyed
//! enumerations, and unit-suffixed durations.

mod boolean;
mod duration;
mod enumeration;
mod integer;
mod string;

pub use boolean::BooleanParser;
pub use duration::DurationParser;
pub use enumeration::EnumParser;
pub use integer::IntegerParser;
pub use string::{StringArrayParser, StringMode, StringParser};
