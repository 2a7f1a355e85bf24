//! XML-facing pieces: a thin DOM adapter, the BER→XML pretty writer and
//! the XML→BER builder.

pub mod build;
pub mod dom;
pub mod pretty;
