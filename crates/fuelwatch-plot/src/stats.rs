//! Summary statistics behind the box and violin glyphs.

/// Tukey box plot summary with 1.5·IQR whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
  pub q1:            f64,
  pub median:        f64,
  pub q3:            f64,
  /// Most extreme values still inside the fences.
  pub whisker_low:   f64,
  pub whisker_high:  f64,
  pub mean:          f64,
  pub outliers:      Vec<f64>,
}

impl BoxStats {
  pub fn new(values: &[f64]) -> Option<Self> {
    let sorted = sorted(values);
    if sorted.is_empty() {
      return None;
    }

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let whisker_low = inside.clone().next().unwrap_or(q1);
    let whisker_high = inside.last().unwrap_or(q3);

    Some(Self {
      q1,
      median,
      q3,
      whisker_low,
      whisker_high,
      mean: mean(&sorted),
      outliers: sorted
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect(),
    })
  }
}

fn sorted(values: &[f64]) -> Vec<f64> {
  let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
  sorted.sort_by(f64::total_cmp);
  sorted
}

/// Linearly interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], p: f64) -> f64 {
  let pos = p * (sorted.len() - 1) as f64;
  let lo = pos.floor() as usize;
  let hi = pos.ceil() as usize;
  sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}

fn mean(values: &[f64]) -> f64 { values.iter().sum::<f64>() / values.len() as f64 }

fn std_dev(values: &[f64]) -> f64 {
  let m = mean(values);
  let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
  var.sqrt()
}

/// Gaussian kernel density estimate over `[min, max]` of `values`, sampled
/// at `points` evenly spaced prices. Bandwidth follows Silverman's rule.
///
/// Empty when the values have no spread to estimate.
pub fn density(values: &[f64], points: usize) -> Vec<(f64, f64)> {
  let sorted = sorted(values);
  let (Some(&lo), Some(&hi)) = (sorted.first(), sorted.last()) else {
    return Vec::new();
  };
  if points < 2 || hi <= lo {
    return Vec::new();
  }

  let n = sorted.len() as f64;
  let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
  let spread = match std_dev(&sorted) {
    sd if iqr > 0.0 => sd.min(iqr / 1.34),
    sd => sd,
  };
  let bandwidth = 0.9 * spread * n.powf(-0.2);
  if bandwidth <= 0.0 {
    return Vec::new();
  }

  let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
  let step = (hi - lo) / (points - 1) as f64;
  (0..points)
    .map(|i| {
      let y = lo + step * i as f64;
      let d = sorted
        .iter()
        .map(|v| (-0.5 * ((y - v) / bandwidth).powi(2)).exp())
        .sum::<f64>();
      (y, d * norm)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quartiles_interpolate() {
    let stats = BoxStats::new(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(stats.q1, 1.75);
    assert_eq!(stats.median, 2.5);
    assert_eq!(stats.q3, 3.25);
    assert_eq!(stats.mean, 2.5);
    assert!(stats.outliers.is_empty());
  }

  #[test]
  fn whiskers_stop_at_last_value_inside_fences() {
    let stats = BoxStats::new(&[1.80, 1.82, 1.84, 1.86, 1.88, 2.50]).unwrap();
    assert_eq!(stats.whisker_low, 1.80);
    assert_eq!(stats.whisker_high, 1.88);
    assert_eq!(stats.outliers, [2.50]);
  }

  #[test]
  fn single_value_collapses() {
    let stats = BoxStats::new(&[1.9]).unwrap();
    assert_eq!((stats.q1, stats.median, stats.q3), (1.9, 1.9, 1.9));
    assert_eq!((stats.whisker_low, stats.whisker_high), (1.9, 1.9));
    assert!(BoxStats::new(&[]).is_none());
  }

  #[test]
  fn density_spans_the_data() {
    let curve = density(&[1.8, 1.85, 1.9, 1.9, 2.0], 20);
    assert_eq!(curve.len(), 20);
    assert_eq!(curve[0].0, 1.8);
    assert!((curve[19].0 - 2.0).abs() < 1e-12);
    assert!(curve.iter().all(|&(_, d)| d > 0.0));
  }

  #[test]
  fn density_of_identical_values_is_empty() {
    assert!(density(&[1.9, 1.9, 1.9], 20).is_empty());
    assert!(density(&[1.9], 20).is_empty());
  }
}
