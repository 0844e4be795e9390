use std::error::Error;
use std::fmt;

/// Failures collected from a batch, kept in the order of the inputs that
/// produced them.
#[derive(Debug)]
pub struct MultiError<E> {
    errors: Vec<E>,
}

impl<E> MultiError<E> {
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Collapses a single failure into itself so callers see the underlying
    /// error unchanged; two or more stay grouped.
    pub fn flatten(mut self) -> Result<E, Self> {
        if self.errors.len() == 1 {
            Ok(self.errors.remove(0))
        } else {
            Err(self)
        }
    }
}

impl<E: fmt::Display> fmt::Display for MultiError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failures", self.errors.len())?;
        for error in self.errors.iter() {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl<E: Error + 'static> Error for MultiError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.errors.first().map(|e| e as &dyn Error)
    }
}
