use std::error::Error;
use std::fmt;

mod health_check;
mod profile;

pub use health_check::*;
pub use profile::*;

/// Format an error followed by every error in its source chain.
pub fn error_chain_fmt(e: &impl Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
