//! Crew output and the concrete crews this service runs.

pub mod crew_output;
pub mod random_phrase;
pub mod translation;

pub use crew_output::CrewOutput;
