//! Explain command implementation.

use crate::error::Result;
use crate::output::Formatter;

/// Execute the explain command.
pub async fn execute_explain(formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_explanation()?);
    Ok(())
}
