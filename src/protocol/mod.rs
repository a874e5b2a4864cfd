//! Wire payload grammars for the Aura Light device.
//!
//! Decoders turn loosely structured payload strings into typed records,
//! the encoder turns operator intents back into topic-suffix/payload
//! pairs. Both sides are pure functions so the whole wire contract is
//! testable without a broker.

pub mod decode;
pub mod encode;
pub mod weather;
