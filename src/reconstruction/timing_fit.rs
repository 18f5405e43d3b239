// Copyright @yucwang 2026

use crate::math::constants::{Float, C_CENT, HALF_PI, PI};
use crate::reconstruction::reconstructor::ReconstructionError;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

pub const IMPACT_MAX: Float = 100000.0;
pub const IMPACT_STEP: Float = 100.0;
pub const ANGLE_STEP: Float = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingFit {
    pub impact_param: Float,
    pub shower_angle: Float,
    pub residual: Float,
}

/// Arrival time at in-plane angle `angle` for a shower with the given
/// geometry, relative to `t0`.
pub fn expected_time(t0: Float, impact_param: Float, shower_angle: Float, angle: Float) -> Float {
    t0 + impact_param / C_CENT * ((PI - shower_angle - angle) / 2.0).tan()
}

/// Sum of squared timing residuals for one candidate geometry. The pixel
/// whose angle is closest to `pi/2 - shower_angle` fixes `t0`. Only the
/// first `min(angles.len(), times.len())` pairs count; no pairs give zero.
pub fn timing_residual(angles: &[Float], times: &[Float], impact_param: Float,
                       shower_angle: Float) -> Float {
    let n = angles.len().min(times.len());
    if n == 0 {
        return 0.0;
    }
    let (angles, times) = (&angles[..n], &times[..n]);
    let target = HALF_PI - shower_angle;
    let mut anchor = 0;
    for (i, angle) in angles.iter().enumerate() {
        if (angle - target).abs() < (angles[anchor] - target).abs() {
            anchor = i;
        }
    }
    let t0 = times[anchor] - expected_time(0.0, impact_param, shower_angle, angles[anchor]);
    angles.iter()
        .zip(times.iter())
        .map(|(&angle, &time)| {
            let r = time - expected_time(t0, impact_param, shower_angle, angle);
            r * r
        })
        .sum()
}

/// Exhaustive search over impact parameter in `[0, IMPACT_MAX]` and shower
/// angle in `[0, pi]`. Ties go to the candidate visited first, impact
/// parameter outermost.
pub fn fit_timing(angles: &[Float], times: &[Float]) -> Result<TimingFit, ReconstructionError> {
    let n = angles.len().min(times.len());
    if n == 0 {
        return Err(ReconstructionError::NoValidPixels);
    }
    let (angles, times) = (&angles[..n], &times[..n]);

    let rows = (IMPACT_MAX / IMPACT_STEP).round() as usize + 1;
    let shower_angles: Vec<Float> = (0..)
        .map(|k| k as Float * ANGLE_STEP)
        .take_while(|&a| a <= PI)
        .collect();

    let next_row = Arc::new(AtomicUsize::new(0));
    let thread_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let (tx, rx) = mpsc::channel::<(usize, TimingFit)>();
    let mut row_best: Vec<Option<TimingFit>> = vec![None; rows];

    thread::scope(|scope| {
        for _ in 0..thread_count {
            let next_row = Arc::clone(&next_row);
            let tx = tx.clone();
            let shower_angles = &shower_angles;
            scope.spawn(move || {
                loop {
                    let row = next_row.fetch_add(1, Ordering::Relaxed);
                    if row >= rows {
                        break;
                    }
                    let impact_param = row as Float * IMPACT_STEP;
                    let mut best: Option<TimingFit> = None;
                    for &shower_angle in shower_angles.iter() {
                        let residual = timing_residual(angles, times, impact_param, shower_angle);
                        if best.map_or(true, |b| residual < b.residual) {
                            best = Some(TimingFit { impact_param, shower_angle, residual });
                        }
                    }
                    if let Some(best) = best {
                        if tx.send((row, best)).is_err() {
                            break;
                        }
                    }
                }
            });
        }

        drop(tx);
        for (row, fit) in rx.iter() {
            row_best[row] = Some(fit);
        }
    });

    let mut best: Option<TimingFit> = None;
    for fit in row_best.into_iter().flatten() {
        if best.map_or(true, |b| fit.residual < b.residual) {
            best = Some(fit);
        }
    }
    best.ok_or(ReconstructionError::NoSignal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(impact_param: Float, shower_angle: Float) -> (Vec<Float>, Vec<Float>) {
        let angles: Vec<Float> = (0..29).map(|i| 0.2 + 0.05 * i as Float).collect();
        let times = angles.iter()
            .map(|&a| expected_time(1e-5, impact_param, shower_angle, a))
            .collect();
        (angles, times)
    }

    #[test]
    fn test_recovers_grid_point() {
        let (angles, times) = synthetic(25000.0, 1.0);
        let fit = fit_timing(&angles, &times).unwrap();
        assert_eq!(fit.impact_param, 25000.0);
        assert_eq!(fit.shower_angle, 1.0);
        assert!(fit.residual < 1e-30);
    }

    #[test]
    fn test_recovers_within_resolution() {
        let (angles, times) = synthetic(61234.0, 2.0);
        let fit = fit_timing(&angles, &times).unwrap();
        assert!((fit.impact_param - 61234.0).abs() <= IMPACT_STEP);
        assert_eq!(fit.shower_angle, 2.0);
    }

    #[test]
    fn test_true_geometry_has_zero_residual() {
        let (angles, times) = synthetic(40000.0, 0.7);
        assert!(timing_residual(&angles, &times, 40000.0, 0.7) < 1e-30);
        assert!(timing_residual(&angles, &times, 40000.0, 1.7) > 1e-20);
    }

    #[test]
    fn test_residual_with_mismatched_lengths() {
        let (angles, times) = synthetic(40000.0, 0.7);
        assert_eq!(timing_residual(&[], &[], 40000.0, 0.7), 0.0);
        assert_eq!(timing_residual(&angles, &[], 40000.0, 0.7), 0.0);
        assert!(timing_residual(&angles, &times[..10], 40000.0, 0.7) < 1e-30);
        let short = timing_residual(&angles[..10], &times, 40000.0, 1.7);
        assert_eq!(short, timing_residual(&angles[..10], &times[..10], 40000.0, 1.7));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fit_timing(&[], &[]), Err(ReconstructionError::NoValidPixels));
    }
}
