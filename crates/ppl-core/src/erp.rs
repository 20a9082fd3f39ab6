//! Elementary random primitives: the distribution capability consumed at choice points.
//!
//! Parameters travel as a numeric slice. Values are produced in the program's own
//! value type through `From<bool>` / `From<i64>`, and scored by comparing with
//! `PartialEq`, so a single value type can flow through every choice point.

use std::f64::consts::PI;

/// Capability required from a distribution used at a choice point.
pub trait Erp<V> {
    /// Short human readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Enumerates the finite support for `params`, in a stable order.
    ///
    /// `None` means the distribution has no enumerable support.
    fn support(&self, params: &[f64]) -> Option<Vec<V>>;

    /// Log-probability of `value` under `params`; `-inf` outside the support.
    fn score(&self, params: &[f64], value: &V) -> f64;
}

fn param(params: &[f64], index: usize) -> f64 {
    params.get(index).copied().unwrap_or(f64::NAN)
}

fn count_param(params: &[f64]) -> usize {
    let raw = param(params, 0);
    if raw.is_finite() && raw > 0.0 {
        raw.floor() as usize
    } else {
        0
    }
}

fn normalized_log_weight(weights: &[f64], matched: f64) -> f64 {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return f64::NEG_INFINITY;
    }
    (matched / total).ln()
}

/// Coin flip with success probability `params[0]`. Support is `[true, false]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bernoulli;

impl<V> Erp<V> for Bernoulli
where
    V: From<bool> + PartialEq,
{
    fn name(&self) -> &str {
        "bernoulli"
    }

    fn support(&self, _params: &[f64]) -> Option<Vec<V>> {
        Some(vec![V::from(true), V::from(false)])
    }

    fn score(&self, params: &[f64], value: &V) -> f64 {
        let p = param(params, 0);
        if *value == V::from(true) {
            p.ln()
        } else if *value == V::from(false) {
            (1.0 - p).ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// Uniform integer in `0..params[0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomInteger;

impl<V> Erp<V> for RandomInteger
where
    V: From<i64> + PartialEq,
{
    fn name(&self) -> &str {
        "randomInteger"
    }

    fn support(&self, params: &[f64]) -> Option<Vec<V>> {
        let n = count_param(params);
        Some((0..n as i64).map(V::from).collect())
    }

    fn score(&self, params: &[f64], value: &V) -> f64 {
        let n = count_param(params);
        if (0..n as i64).any(|i| V::from(i) == *value) {
            -(n as f64).ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// Index drawn proportionally to the unnormalized weights in `params`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discrete;

impl<V> Erp<V> for Discrete
where
    V: From<i64> + PartialEq,
{
    fn name(&self) -> &str {
        "discrete"
    }

    fn support(&self, params: &[f64]) -> Option<Vec<V>> {
        Some((0..params.len() as i64).map(V::from).collect())
    }

    fn score(&self, params: &[f64], value: &V) -> f64 {
        match (0..params.len()).find(|&i| V::from(i as i64) == *value) {
            Some(index) => normalized_log_weight(params, params[index]),
            None => f64::NEG_INFINITY,
        }
    }
}

/// Uniform choice among owned items. Parameters are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDraw<V> {
    items: Vec<V>,
}

impl<V> UniformDraw<V> {
    /// Creates a uniform draw over `items`.
    pub fn new(items: Vec<V>) -> Self {
        Self { items }
    }
}

impl<V> Erp<V> for UniformDraw<V>
where
    V: Clone + PartialEq,
{
    fn name(&self) -> &str {
        "uniformDraw"
    }

    fn support(&self, _params: &[f64]) -> Option<Vec<V>> {
        Some(self.items.clone())
    }

    fn score(&self, _params: &[f64], value: &V) -> f64 {
        if self.items.contains(value) {
            -(self.items.len() as f64).ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// Choice among owned items weighted by the unnormalized weights in `params`.
///
/// Repeated items pool their weights and appear once in the support, at their
/// first position.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical<V> {
    items: Vec<V>,
}

impl<V> Categorical<V> {
    /// Creates a categorical distribution over `items`.
    pub fn new(items: Vec<V>) -> Self {
        Self { items }
    }
}

impl<V> Erp<V> for Categorical<V>
where
    V: Clone + PartialEq,
{
    fn name(&self) -> &str {
        "categorical"
    }

    fn support(&self, params: &[f64]) -> Option<Vec<V>> {
        let usable = self.items.len().min(params.len());
        let mut distinct: Vec<V> = Vec::with_capacity(usable);
        for item in &self.items[..usable] {
            if !distinct.contains(item) {
                distinct.push(item.clone());
            }
        }
        Some(distinct)
    }

    fn score(&self, params: &[f64], value: &V) -> f64 {
        let usable = self.items.len().min(params.len());
        let matched: f64 = self.items[..usable]
            .iter()
            .zip(params)
            .filter(|(item, _)| *item == value)
            .map(|(_, weight)| *weight)
            .sum();
        if matched > 0.0 {
            normalized_log_weight(&params[..usable], matched)
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// Normal distribution with `params = [mu, sigma]`.
///
/// Continuous, so it has no enumerable support.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

impl Erp<f64> for Gaussian {
    fn name(&self) -> &str {
        "gaussian"
    }

    fn support(&self, _params: &[f64]) -> Option<Vec<f64>> {
        None
    }

    fn score(&self, params: &[f64], value: &f64) -> f64 {
        let mu = param(params, 0);
        let sigma = param(params, 1);
        let z = (value - mu) / sigma;
        -0.5 * (2.0 * PI).ln() - sigma.ln() - 0.5 * z * z
    }
}

impl Erp<serde_json::Value> for Gaussian {
    fn name(&self) -> &str {
        "gaussian"
    }

    fn support(&self, _params: &[f64]) -> Option<Vec<serde_json::Value>> {
        None
    }

    fn score(&self, params: &[f64], value: &serde_json::Value) -> f64 {
        match value.as_f64() {
            Some(x) => <Gaussian as Erp<f64>>::score(self, params, &x),
            None => f64::NEG_INFINITY,
        }
    }
}
