use std::error::Error;
use std::fmt;

/// Render an error and its source chain on a single `:`-separated
/// line, for log fields where a multi-line report is unwelcome.
pub(crate) struct ErrorChain<'a>(pub &'a (dyn Error + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current = Some(self.0);
        while let Some(err) = current {
            write!(f, "{err}")?;
            current = err.source();
            if current.is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}
