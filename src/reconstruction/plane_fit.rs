// Copyright @yucwang 2026

use crate::core::photon_count::PhotonCount;
use crate::math::constants::{Float, Matrix3f, Rotation3f, Vector3f};
use crate::reconstruction::reconstructor::ReconstructionError;

/// Least-squares plane through the signal-weighted pixel view directions.
///
/// Builds `M = sum(w d d^T)` over valid pixels, with `w` the pixel's total
/// count, and returns the eigenvector of the smallest eigenvalue rotated into
/// the world frame. With degenerate eigenvalues any of the candidates may be
/// returned.
pub fn fit_sd_plane(data: &PhotonCount, rotation: &Rotation3f) -> Result<Vector3f, ReconstructionError> {
    if data.valid_count() == 0 {
        return Err(ReconstructionError::NoValidPixels);
    }

    let mut matrix = Matrix3f::zeros();
    let mut weight_sum = 0.0;
    for (x, y) in data.iter() {
        let weight = data.sum_bins(x, y) as Float;
        if weight == 0.0 {
            continue;
        }
        let d = data.direction(x, y);
        matrix += weight * d * d.transpose();
        weight_sum += weight;
    }
    if weight_sum == 0.0 {
        return Err(ReconstructionError::NoSignal);
    }

    let eigen = matrix.symmetric_eigen();
    let mut min_index = 0;
    for i in 1..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[min_index] {
            min_index = i;
        }
    }
    let normal: Vector3f = eigen.eigenvectors.column(min_index).into_owned();
    Ok((rotation * normal).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Signal along the great circle through the zenith with normal (cos b, sin b, 0).
    fn great_circle(beta: Float) -> PhotonCount {
        let mut data = PhotonCount::new(150, 150, 0.0, 1.0, 4, 0.002, 1.0);
        let along = Vector3f::new(-beta.sin(), beta.cos(), 0.0);
        let mut t: Float = -0.12;
        while t <= 0.12 {
            let direction = t.cos() * Vector3f::new(0.0, 0.0, 1.0) + t.sin() * along;
            for _ in 0..3 {
                data.add_photon(1.5, &direction);
            }
            t += 0.0005;
        }
        data
    }

    #[test]
    fn test_fit_recovers_plane() {
        let beta: Float = 0.3;
        let data = great_circle(beta);
        assert!(data.total() > 0);
        let normal = fit_sd_plane(&data, &Rotation3f::identity()).unwrap();
        let truth = Vector3f::new(beta.cos(), beta.sin(), 0.0);
        assert!(normal.dot(&truth).abs() >= (1.0 as Float).to_radians().cos());
    }

    #[test]
    fn test_fit_is_rotated_to_world() {
        let beta: Float = 0.3;
        let data = great_circle(beta);
        let rotation = Rotation3f::from_axis_angle(&Vector3f::x_axis(), -0.5);
        let normal = fit_sd_plane(&data, &rotation).unwrap();
        let truth = rotation * Vector3f::new(beta.cos(), beta.sin(), 0.0);
        assert!(normal.dot(&truth).abs() >= (1.0 as Float).to_radians().cos());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let blank = PhotonCount::new(10, 10, 0.0, 1.0, 4, 0.01, 1.0);
        assert_eq!(fit_sd_plane(&blank, &Rotation3f::identity()), Err(ReconstructionError::NoSignal));
        let none = PhotonCount::new(0, 0, 0.0, 1.0, 4, 0.01, 1.0);
        assert_eq!(fit_sd_plane(&none, &Rotation3f::identity()), Err(ReconstructionError::NoValidPixels));
    }
}
