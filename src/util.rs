use itertools::Itertools;

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;
    Some(variance.sqrt())
}

pub fn median(data: &[f64]) -> Option<f64> {
    let sorted = data
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .sorted_by(|a, b| a.total_cmp(b))
        .collect_vec();
    match sorted.len() {
        0 => None,
        n if n % 2 == 1 => Some(sorted[n / 2]),
        n => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

/// Milliseconds as `f64` for the float helpers above
pub fn as_f64(ms: &[u64]) -> Vec<f64> {
    ms.iter().map(|&m| m as f64).collect()
}
