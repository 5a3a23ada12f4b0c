//! Cross-cutting helpers shared by the server crate and the binary:
//! logging setup, shutdown signalling and small wire types.

pub mod types;
pub mod utils;
