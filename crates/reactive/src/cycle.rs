//! Per-consumer read-cycle bookkeeping.

use alloc::string::String;
use alloc::vec::Vec;
use capi_core::{Result, Value};

/// What a consumer read during its current cycle.
///
/// `begin` opens a cycle: the used record is cleared so names that are no
/// longer read stop forcing renders.
#[derive(Clone, Debug, Default)]
pub struct ReadCycle {
    used: Vec<(String, Value)>,
    renders: usize,
    started: bool,
}

impl ReadCycle {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a cycle. Every cycle after the first counts as a render.
    pub fn begin(&mut self) {
        if self.started {
            self.renders += 1;
        }
        self.started = true;
        self.used.clear();
    }

    /// Records the value observed for `name`, keeping first-read order.
    pub fn record(&mut self, name: &str, value: Value) {
        match self.used.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.used.push((name.into(), value)),
        }
    }

    /// Names and values observed in this cycle, in read order.
    #[inline]
    pub fn used(&self) -> &[(String, Value)] {
        &self.used
    }

    /// Number of cycles started after the first.
    #[inline]
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// First recorded name whose fresh value is not `same` as the recorded one.
    ///
    /// Stops at the first mismatch. A name that fails to recompute counts
    /// as stale.
    pub fn first_stale<F>(&self, mut fresh: F) -> Option<&str>
    where
        F: FnMut(&str) -> Result<Value>,
    {
        self.used
            .iter()
            .find(|(name, recorded)| match fresh(name.as_str()) {
                Ok(value) => !value.same(recorded),
                Err(_) => true,
            })
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use capi_core::Error;

    #[test]
    fn test_begin_counts_renders() {
        let mut cycle = ReadCycle::new();
        cycle.begin();
        assert_eq!(cycle.render_count(), 0);
        cycle.record("count", Value::from(1));
        cycle.begin();
        assert_eq!(cycle.render_count(), 1);
        assert!(cycle.used().is_empty());
    }

    #[test]
    fn test_record_keeps_first_read_order() {
        let mut cycle = ReadCycle::new();
        cycle.record("a", Value::from(1));
        cycle.record("b", Value::from(2));
        cycle.record("a", Value::from(3));
        let names: Vec<_> = cycle.used().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(cycle.used()[0].1, Value::from(3));
    }

    #[test]
    fn test_first_stale_fails_fast() {
        let mut cycle = ReadCycle::new();
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            cycle.record(name, Value::from(i));
        }
        let mut asked = Vec::new();
        let stale = cycle.first_stale(|name| {
            asked.push(String::from(name));
            Ok(match name {
                "b" | "d" => Value::from(99),
                _ => cycle_value(name),
            })
        });
        assert_eq!(stale, Some("b"));
        assert_eq!(asked, vec!["a", "b"]);
    }

    #[test]
    fn test_error_counts_as_stale() {
        let mut cycle = ReadCycle::new();
        cycle.record("a", Value::from(0));
        assert_eq!(cycle.first_stale(|_| Err(Error::custom("gone"))), Some("a"));
        assert_eq!(cycle.first_stale(|_| Ok(Value::from(0))), None);
    }

    fn cycle_value(name: &str) -> Value {
        match name {
            "a" => Value::from(0),
            "c" => Value::from(2),
            _ => Value::Null,
        }
    }
}
