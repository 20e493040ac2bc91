use std::cmp;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number represents either an integral or a floating point value. It
/// needs to be accompanied with a source of `NumberKind` that describes
/// the actual type of the value stored within `Number`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Number(u64);

impl Number {
    /// Casts the number to `i64`. May result in data/precision loss.
    pub fn to_i64(&self, number_kind: &NumberKind) -> i64 {
        match number_kind {
            NumberKind::I64 => self.0 as i64,
            NumberKind::F64 => u64_to_f64(self.0) as i64,
        }
    }

    /// Casts the number to `f64`. May result in data/precision loss.
    pub fn to_f64(&self, number_kind: &NumberKind) -> f64 {
        match number_kind {
            NumberKind::I64 => (self.0 as i64) as f64,
            NumberKind::F64 => u64_to_f64(self.0),
        }
    }

    /// Adds the given other number to this one, saturating at the numeric
    /// bounds of the kind. Both should be of the same kind.
    pub fn saturating_add(&self, number_kind: &NumberKind, other: &Number) -> Number {
        match number_kind {
            NumberKind::I64 => Number((self.0 as i64).saturating_add(other.0 as i64) as u64),
            NumberKind::F64 => Number(f64_to_u64(u64_to_f64(self.0) + u64_to_f64(other.0))),
        }
    }

    /// Compares this number to the given other number. Both should be of the same kind.
    pub fn partial_cmp(&self, number_kind: &NumberKind, other: &Number) -> Option<cmp::Ordering> {
        match number_kind {
            NumberKind::I64 => (self.0 as i64).partial_cmp(&(other.0 as i64)),
            NumberKind::F64 => u64_to_f64(self.0).partial_cmp(&u64_to_f64(other.0)),
        }
    }

    /// Checks if this value is an f64 nan value. Do not use on non-f64 values.
    pub fn is_nan(&self) -> bool {
        u64_to_f64(self.0).is_nan()
    }

    /// `true` if the actual value is less than zero.
    pub fn is_negative(&self, number_kind: &NumberKind) -> bool {
        match number_kind {
            NumberKind::I64 => (self.0 as i64).is_negative(),
            NumberKind::F64 => u64_to_f64(self.0).is_sign_negative(),
        }
    }

    /// Return loaded data for debugging purposes.
    pub fn to_debug(&self, kind: &NumberKind) -> Box<dyn fmt::Debug> {
        match kind {
            NumberKind::I64 => Box::new(self.0 as i64),
            NumberKind::F64 => Box::new(u64_to_f64(self.0)),
        }
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number(f64_to_u64(f))
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number(i as u64)
    }
}

/// A `Number` in an atomic cell, supporting lock-free concurrent updates.
#[derive(Debug, Default)]
pub struct AtomicNumber(AtomicU64);

impl AtomicNumber {
    /// Loads the current value.
    pub fn load(&self) -> Number {
        Number(self.0.load(Ordering::Acquire))
    }

    /// Stores a new value, replacing the current one.
    pub fn store(&self, val: &Number) {
        self.0.store(val.0, Ordering::Release)
    }

    /// Adds the given number to the stored value, saturating at the numeric
    /// bounds of the kind. Both should be of the same kind.
    pub fn fetch_add(&self, number_kind: &NumberKind, val: &Number) {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            let new = Number(current).saturating_add(number_kind, val);
            match self
                .0
                .compare_exchange_weak(current, new.0, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

impl From<Number> for AtomicNumber {
    fn from(number: Number) -> Self {
        AtomicNumber(AtomicU64::new(number.0))
    }
}

/// A descriptor for the encoded data type of a `Number`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumberKind {
    /// A `Number` that stores `i64` values.
    I64,
    /// A `Number` that stores `f64` values.
    F64,
}

#[inline]
fn u64_to_f64(val: u64) -> f64 {
    f64::from_bits(val)
}

#[inline]
fn f64_to_u64(val: f64) -> u64 {
    f64::to_bits(val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn i64_roundtrip() {
        let number = Number::from(-42i64);
        assert_eq!(number.to_i64(&NumberKind::I64), -42);
        assert!(number.is_negative(&NumberKind::I64));
        assert!(!Number::from(42i64).is_negative(&NumberKind::I64));
    }

    #[test]
    fn f64_roundtrip() {
        let number = Number::from(0.25f64);
        assert_eq!(number.to_f64(&NumberKind::F64), 0.25);
        assert!(!number.is_negative(&NumberKind::F64));
        assert!(Number::from(-0.25f64).is_negative(&NumberKind::F64));
        assert!(Number::from(f64::NAN).is_nan());
    }

    #[test]
    fn saturating_add_clamps_at_i64_bounds() {
        let max = Number::from(i64::MAX);
        let sum = max.saturating_add(&NumberKind::I64, &Number::from(1i64));
        assert_eq!(sum.to_i64(&NumberKind::I64), i64::MAX);
    }

    #[test]
    fn kind_directed_comparison() {
        let small = Number::from(1i64);
        let large = Number::from(100i64);
        assert_eq!(
            small.partial_cmp(&NumberKind::I64, &large),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::from(2.5f64).partial_cmp(&NumberKind::F64, &Number::from(1.5f64)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::from(f64::NAN).partial_cmp(&NumberKind::F64, &Number::from(1.5f64)),
            None
        );
    }

    #[test]
    fn atomic_add_is_exact_under_contention() {
        let value = Arc::new(AtomicNumber::default());
        let handles = (0..4)
            .map(|_| {
                let value = value.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        value.fetch_add(&NumberKind::I64, &Number::from(1i64));
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert_eq!(value.load().to_i64(&NumberKind::I64), 4_000);
    }

    #[test]
    fn debug_rendering_follows_kind() {
        let number = Number::from(10.5f64);
        assert_eq!(format!("{:?}", number.to_debug(&NumberKind::F64)), "10.5");
        assert_eq!(
            format!("{:?}", Number::from(7i64).to_debug(&NumberKind::I64)),
            "7"
        );
    }
}
