//! Integer arithmetic: GCD/LCM, factorials, permutations and combinations,
//! prime factorization.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::format::format_number;
use crate::step::{Solution, Step};

/// Largest `n` whose factorial is finite in double precision.
pub const MAX_FACTORIAL: i64 = 170;

/// Iterative Euclidean algorithm. `gcd(a, 0) == a`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// `|a * b| / gcd(a, b)`, computed as `a / gcd * b` to delay overflow.
pub fn lcm(a: u64, b: u64) -> CalcResult<u64> {
    let g = gcd(a, b);
    if g == 0 {
        return Err(CalcError::domain("LCM of 0 and 0 is undefined"));
    }
    (a / g)
        .checked_mul(b)
        .ok_or_else(|| CalcError::domain(format!("LCM of {a} and {b} overflows")))
}

fn require_positive_set(numbers: &[u64]) -> CalcResult<()> {
    if numbers.len() < 2 || numbers.contains(&0) {
        return Err(CalcError::validation(
            "Please enter at least 2 positive numbers",
        ));
    }
    Ok(())
}

/// Left fold of [`gcd`] over at least two positive integers.
pub fn gcd_all(numbers: &[u64]) -> CalcResult<u64> {
    require_positive_set(numbers)?;
    Ok(numbers[1..].iter().fold(numbers[0], |acc, &n| gcd(acc, n)))
}

/// Left fold of [`lcm`] over at least two positive integers.
pub fn lcm_all(numbers: &[u64]) -> CalcResult<u64> {
    require_positive_set(numbers)?;
    numbers[1..]
        .iter()
        .try_fold(numbers[0], |acc, &n| lcm(acc, n))
}

/// `n!` in double precision, defined for `0 <= n <= 170`.
pub fn factorial(n: i64) -> CalcResult<f64> {
    if n < 0 {
        return Err(CalcError::validation(
            "Please enter a valid non-negative integer",
        ));
    }
    if n > MAX_FACTORIAL {
        return Err(CalcError::Domain(format!(
            "Number too large. Maximum is {MAX_FACTORIAL}"
        )));
    }
    Ok((2..=n).fold(1.0, |acc, i| acc * i as f64))
}

/// Exact `n!` while it fits in a `u128` (n <= 34).
pub fn factorial_exact(n: u32) -> Option<u128> {
    (2..=n as u128).try_fold(1u128, |acc, i| acc.checked_mul(i))
}

fn check_nr(n: i64, r: i64) -> CalcResult<()> {
    if n < 0 || r < 0 {
        return Err(CalcError::validation(
            "Please enter valid non-negative integers",
        ));
    }
    if r > n {
        return Err(CalcError::domain("r cannot be greater than n"));
    }
    Ok(())
}

fn finite(value: f64, what: &str) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::Domain(format!("{what} is too large to represent")))
    }
}

/// `P(n, r) = n! / (n - r)!`, as the product `(n-r+1) ... n`.
pub fn permutations(n: i64, r: i64) -> CalcResult<f64> {
    check_nr(n, r)?;
    // every factor is at least 1, so once the product overflows it stays infinite
    ((n - r + 1)..=n).try_fold(1.0, |acc, i| finite(acc * i as f64, "P(n, r)"))
}

/// `C(n, r) = n! / (r! (n - r)!)`.
///
/// Uses the multiplicative form over `k = min(r, n - r)` so every intermediate
/// is itself a binomial coefficient, which keeps `C(n, r) == C(n, n - r)` exact.
pub fn combinations(n: i64, r: i64) -> CalcResult<f64> {
    check_nr(n, r)?;
    let k = r.min(n - r);
    let c = (1..=k).try_fold(1.0, |acc, i| {
        finite(acc * (n - k + i) as f64 / i as f64, "C(n, r)")
    })?;
    Ok(c.round())
}

/// Trial division from 2 upward. Empty for `n < 2`.
pub fn prime_factors(mut n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    let mut d = 2u64;
    while d.saturating_mul(d) <= n {
        while n % d == 0 {
            factors.push(d);
            n /= d;
        }
        d += 1;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

// ---------------------------------------------------------------------------
// Calculator outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorialOutcome {
    pub n: i64,
    pub value: f64,
    pub scientific: String,
    /// Exact decimal digits when `n <= 34`.
    pub exact: Option<String>,
}

pub fn factorial_solution(n: i64) -> CalcResult<Solution<FactorialOutcome>> {
    let value = factorial(n)?;
    let exact = factorial_exact(n as u32).map(|v| v.to_string());
    let mut steps = Vec::new();
    if n <= 10 {
        let chain = if n <= 1 {
            "1".to_string()
        } else {
            (1..=n)
                .rev()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(" × ")
        };
        steps.push(Step::new(
            "Factorial Calculation",
            format!("{n}! = {chain} = {}", format_number(value, 0)),
        ));
    } else {
        steps.push(Step::new(
            "Factorial Calculation",
            format!("{n}! = {n} × {} × ... × 1", n - 1),
        ));
    }
    steps.push(Step::new("Result", format!("{n}! = {value:.4e}")));
    Ok(Solution::new(
        FactorialOutcome {
            n,
            value,
            scientific: format!("{value:.4e}"),
            exact,
        },
        steps,
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermutationCombination {
    pub n: i64,
    pub r: i64,
    pub permutations: f64,
    pub combinations: f64,
}

pub fn permutation_combination(n: i64, r: i64) -> CalcResult<Solution<PermutationCombination>> {
    let p = permutations(n, r)?;
    let c = combinations(n, r)?;
    let steps = vec![
        Step::new("Permutation Formula", "P(n,r) = n! / (n-r)!"),
        Step::new(
            "Permutation Calculation",
            format!("P({n},{r}) = {n}! / {}! = {}", n - r, format_number(p, 0)),
        ),
        Step::new("Combination Formula", "C(n,r) = n! / (r! × (n-r)!)"),
        Step::new(
            "Combination Calculation",
            format!(
                "C({n},{r}) = {n}! / ({r}! × {}!) = {}",
                n - r,
                format_number(c, 0)
            ),
        ),
    ];
    Ok(Solution::new(
        PermutationCombination {
            n,
            r,
            permutations: p,
            combinations: c,
        },
        steps,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimeFactors {
    pub number: u64,
    pub factors: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcmGcd {
    pub numbers: Vec<u64>,
    pub lcm: u64,
    pub gcd: u64,
    pub prime_factors: Vec<PrimeFactors>,
}

pub fn lcm_gcd(numbers: &[u64]) -> CalcResult<Solution<LcmGcd>> {
    let l = lcm_all(numbers)?;
    let g = gcd_all(numbers)?;
    let prime_factors: Vec<PrimeFactors> = numbers
        .iter()
        .map(|&n| PrimeFactors {
            number: n,
            factors: prime_factors(n),
        })
        .collect();

    let listed = numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let factor_lines = prime_factors
        .iter()
        .map(|pf| {
            let body = if pf.factors.is_empty() {
                pf.number.to_string()
            } else {
                pf.factors
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(" × ")
            };
            format!("{} = {body}", pf.number)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let steps = vec![
        Step::new("Prime Factorization of each number", factor_lines),
        Step::new(
            "Greatest Common Divisor (GCD/HCF)",
            "The GCD is the product of common prime factors with lowest powers",
        ),
        Step::new("GCD Result", format!("GCD({listed}) = {g}")),
        Step::new(
            "Least Common Multiple (LCM)",
            "For two numbers: LCM(a,b) = (a × b) / GCD(a,b)",
        ),
        Step::new("LCM Result", format!("LCM({listed}) = {l}")),
    ];

    Ok(Solution::new(
        LcmGcd {
            numbers: numbers.to_vec(),
            lcm: l,
            gcd: g,
            prime_factors,
        },
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd_basics() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(17, 5), 1);
    }

    #[test]
    fn test_gcd_lcm_identity() {
        for a in 1..40u64 {
            for b in 1..40u64 {
                let g = gcd(a, b);
                assert_eq!(a % g, 0);
                assert_eq!(b % g, 0);
                assert_eq!(lcm(a, b).unwrap() * g, a * b);
            }
        }
    }

    #[test]
    fn test_lcm_overflow() {
        assert!(lcm(u64::MAX, u64::MAX - 1).is_err());
        assert!(lcm(0, 0).is_err());
    }

    #[test]
    fn test_multi_number() {
        assert_eq!(gcd_all(&[12, 18, 24]).unwrap(), 6);
        assert_eq!(lcm_all(&[4, 6, 8]).unwrap(), 24);
        assert!(lcm_all(&[4]).is_err());
        assert!(gcd_all(&[4, 0]).is_err());
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(5).unwrap(), 120.0);
        assert_eq!(factorial(0).unwrap(), 1.0);
        assert_eq!(factorial(1).unwrap(), 1.0);
        assert!(factorial(170).unwrap().is_finite());
        assert!(factorial(171).is_err());
        assert!(factorial(-1).is_err());
    }

    #[test]
    fn test_factorial_exact() {
        assert_eq!(factorial_exact(20), Some(2_432_902_008_176_640_000));
        assert!(factorial_exact(34).is_some());
        assert!(factorial_exact(35).is_none());
    }

    #[test]
    fn test_permutations_combinations() {
        assert_eq!(permutations(5, 3).unwrap(), 60.0);
        assert_eq!(combinations(5, 3).unwrap(), 10.0);
        assert_eq!(combinations(5, 0).unwrap(), 1.0);
        assert!(permutations(3, 5).is_err());
        assert!(combinations(-1, 0).is_err());
    }

    #[test]
    fn test_huge_inputs_stop_at_overflow() {
        let started = std::time::Instant::now();
        assert!(permutations(i64::MAX, i64::MAX).is_err());
        assert!(combinations(i64::MAX, i64::MAX / 2).is_err());
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(combinations(i64::MAX, 1).unwrap(), i64::MAX as f64);
    }

    #[test]
    fn test_combination_symmetry() {
        for n in 0..60 {
            for r in 0..=n {
                assert_eq!(combinations(n, r).unwrap(), combinations(n, n - r).unwrap());
            }
        }
    }

    #[test]
    fn test_prime_factors() {
        assert_eq!(prime_factors(360), vec![2, 2, 2, 3, 3, 5]);
        assert_eq!(prime_factors(97), vec![97]);
        assert!(prime_factors(1).is_empty());
    }

    #[test]
    fn test_lcm_gcd_solution() {
        let sol = lcm_gcd(&[12, 18]).unwrap();
        assert_eq!(sol.value.lcm, 36);
        assert_eq!(sol.value.gcd, 6);
        assert_eq!(sol.steps[0].value, "12 = 2 × 2 × 3\n18 = 2 × 3 × 3");
        assert_eq!(sol.steps.last().unwrap().value, "LCM(12, 18) = 36");
    }

    #[test]
    fn test_factorial_solution_steps() {
        let sol = factorial_solution(5).unwrap();
        assert_eq!(sol.steps[0].value, "5! = 5 × 4 × 3 × 2 × 1 = 120");
        assert_eq!(sol.value.exact.as_deref(), Some("120"));
    }
}
