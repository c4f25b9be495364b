use serde::{Deserialize, Serialize};

/// One line of a worked solution, e.g. `("Calculate Discriminant", "Δ = 1")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    pub value: String,
}

impl Step {
    pub fn new(description: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            value: value.into(),
        }
    }
}

/// A computed value together with the steps that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution<T> {
    pub value: T,
    pub steps: Vec<Step>,
}

impl<T> Solution<T> {
    pub fn new(value: T, steps: Vec<Step>) -> Self {
        Self { value, steps }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Solution<U> {
        Solution {
            value: f(self.value),
            steps: self.steps,
        }
    }
}
