//! Raw moments of the inter-spike-interval distribution
//! of a pumped, binary branching process.
//!
//! A population of particles branches (one particle becomes two)
//! at rate `s`, is removed at effective rate `r`, and is topped up
//! by spontaneous creation at rate `gamma`. Every creation event is
//! a "spike"; the closed-form solution for the waiting time between
//! spikes is an infinite series over the particle number, truncated
//! here at `precision`.
//!
//! All formulas are exact for binary branching only.

use crate::special_functions::*;

/// Highest moment order the recurrence is unrolled for.
const MAX_ORDER: usize = 5;

/// The probability that a spontaneous-creation event occurs while the
/// process holds exactly `state` particles, for branching rate `s`,
/// effective extinction rate `r`, creation rate `gamma` and single-particle
/// extinction probability `p2`.
///
/// Summed over all `state` >= 1, these weights form a normalized
/// probability distribution.
///
/// The general branch is evaluated in log space: the geometric factor
/// `(s p2 / (r + s p2))^(state-1)` spans thousands of orders of magnitude
/// over the state range, and the log form lets it underflow cleanly to
/// zero once a contribution can no longer be represented.
///
/// Callers are expected to supply physically valid parameters,
/// `s > 0`, `r >= 0`, `gamma > 0` and `p2` in (0,1); ranges are not
/// checked here.
pub fn creation_probability(r: f64, gamma: f64, s: f64, p2: f64, state: usize) -> f64 {
    let a = gamma / (s * p2);
    if state > 1 {
        let n = (state - 1) as f64;
        let ln_prob = (2.0 * r / (r + s)).ln()
            + (s * n / gamma + 1.0).ln()
            + n * (s * p2 / (r + s * p2)).ln()
            + a * (r / (r + s * p2)).ln()
            + (s * p2 * n + gamma).ln()
            - n.ln()
            - ln_beta(a, n)
            - (s * n + gamma).ln();
        ln_prob.exp()
    } else {
        2.0 * (r / (r + s)) * (a * (r / (r + s * p2)).ln()).exp()
    }
}

/// Evaluates the k-th raw moment by accumulating, over states 1..=precision,
/// the product of the outermost telescoping sum and the creation probability.
///
/// The reference recurrence tracks raw partial sums S_j(n) that contain a
/// factor 1/(1-p2)^n, which overflows any fixed-width float long before
/// n reaches `precision`. We instead carry the rescaled quantities
///
///     v_j(n) = S_j(n) * (1-p2)^n * B(gamma/s, n+1),
///
/// which absorb the per-state weight that the reference multiplies back in
/// at accumulation time. With B(a,n+1)/B(a,n) = n/(a+n), each update is
///
///     v_0(n) = v_0(n-1) * rho_n + 1/(n s + gamma),
///     v_j(n) = v_j(n-1) * rho_n + k! v_{j-1}(n)/(n s + gamma)   (outermost)
///     v_j(n) = v_j(n-1) * rho_n + v_{j-1}(n)/(n s + gamma)      (otherwise)
///
/// where rho_n = (1-p2) n/(a+n) < 1. Every intermediate is a sum of
/// positive, well-scaled terms, so the result agrees with an
/// extended-precision evaluation of the reference recurrence to
/// ~13 significant figures.
fn raw_moment(k: usize, r: f64, gamma: f64, s: f64, p2: f64, precision: usize) -> f64 {
    assert!(k >= 1 && k <= MAX_ORDER);
    let a = gamma / s;
    let k_factorial = (k as i32).factorial();

    // v[0] is the head of the chain (the normalization sum);
    // v[k-1] is the outermost, factorial-weighted sum.
    let mut v = [0.0f64; MAX_ORDER];
    v[0] = 1.0 / gamma;
    for j in 1..k-1 {
        v[j] = gamma.powi(-(j as i32) - 1);
    }
    if k > 1 {
        v[k-1] = k_factorial * gamma.powi(-(k as i32));
    }

    let mut moment = 0.0;
    for state in 1..=precision {
        let n = state as f64;
        let rho = (1.0 - p2) * n / (a + n);
        let sg = n * s + gamma;
        v[0] = v[0] * rho + 1.0 / sg;
        for j in 1..k {
            let scale = if j == k - 1 { k_factorial } else { 1.0 };
            v[j] = v[j] * rho + scale * v[j-1] / sg;
        }
        moment += v[k-1] * creation_probability(r, gamma, s, p2, state);
    }

    moment
}

/// The mean inter-spike interval, i.e. the first raw moment of the
/// waiting-time distribution, summed over states 1..=precision.
/// Time units are the inverse of the rate units.
pub fn first_moment(r: f64, gamma: f64, s: f64, p2: f64, precision: usize) -> f64 {
    raw_moment(1, r, gamma, s, p2, precision)
}

/// The second raw moment of the inter-spike-interval distribution.
pub fn second_moment(r: f64, gamma: f64, s: f64, p2: f64, precision: usize) -> f64 {
    raw_moment(2, r, gamma, s, p2, precision)
}

/// The third raw moment of the inter-spike-interval distribution.
pub fn third_moment(r: f64, gamma: f64, s: f64, p2: f64, precision: usize) -> f64 {
    raw_moment(3, r, gamma, s, p2, precision)
}

/// The fourth raw moment of the inter-spike-interval distribution.
pub fn fourth_moment(r: f64, gamma: f64, s: f64, p2: f64, precision: usize) -> f64 {
    raw_moment(4, r, gamma, s, p2, precision)
}

/// The fifth raw moment of the inter-spike-interval distribution.
pub fn fifth_moment(r: f64, gamma: f64, s: f64, p2: f64, precision: usize) -> f64 {
    raw_moment(5, r, gamma, s, p2, precision)
}
