use std::fmt::{Display, Formatter, Result as FmtResult};

pub struct AggregatedDisplayer<'a, E> {
    errors: &'a [E],
}

impl<'a, E> AggregatedDisplayer<'a, E> {
    pub fn new(errors: &'a [E]) -> Self {
        Self { errors }
    }
}

impl<E: Display> Display for AggregatedDisplayer<'_, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}
