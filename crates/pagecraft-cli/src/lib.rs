//! Library side of the pagecraft CLI.

pub mod classify;
pub mod logging;
pub mod replay;
