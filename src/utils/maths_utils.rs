use argminmax::ArgMinMax;

/// (min, max) of a non-empty, NaN-free slice.
pub fn get_min_max(vec: &[f64]) -> (f64, f64) {
    let (min_index, max_index) = vec.argminmax();
    (vec[min_index], vec[max_index])
}

/// Mean and (population) standard deviation.
pub fn mean_std(vec: &[f64]) -> (f64, f64) {
    if vec.is_empty() {
        return (0.0, 0.0);
    }
    let n = vec.len() as f64;
    let mean = vec.iter().sum::<f64>() / n;
    let var = vec.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max() {
        let v = [3.0, -1.0, 7.5, 2.0];
        assert_eq!(get_min_max(&v), (-1.0, 7.5));
    }

    #[test]
    fn test_mean_std() {
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }
}
