//! Implements the factorial

pub trait Factorial {
    /// Evaluates the factorial function n!
    fn factorial(&self) -> f64;
}

impl Factorial for i32 {
    fn factorial(&self) -> f64 {
        (1..=*self).fold(1.0, |acc, i| acc * (i as f64))
    }
}
