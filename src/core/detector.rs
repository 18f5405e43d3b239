// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::shower::Shower;
use crate::math::constants::Float;
use crate::math::plane::Plane;

use indicatif::{ProgressBar, ProgressStyle};
use rand::RngCore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

/// One photon reaching the focal plane, in detector-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub x: Float,
    pub y: Float,
    pub time: Float,
}

/// Anything that can watch a shower go by.
pub trait Detector: Sync {
    /// Traces `photons` photons emitted from the shower's current position.
    fn view_point(&self, shower: &Shower, photons: usize, rng: &mut dyn RngCore) -> Vec<Detection>;

    fn ground_plane(&self) -> &Plane;

    /// Number of passes needed to follow the shower down to the ground.
    fn step_count(&self, shower: &Shower, time_delay: Float) -> usize {
        let time_to_ground = shower.time_to_plane(self.ground_plane());
        if !(time_delay > 0.0) {
            return 0;
        }
        let steps = if time_to_ground.is_finite() && time_to_ground > 0.0 {
            (time_to_ground / time_delay).ceil() as usize
        } else {
            0
        };
        steps + 2
    }

    /// Steps the shower down to the ground, `time_delay` at a time, running
    /// one detection pass per step. Each step draws from its own stream
    /// seeded by `(seed, step)`, so the result does not depend on scheduling.
    fn view_shower(&self, shower: &Shower, time_delay: Float, photons_per_step: usize,
                   seed: u64) -> Vec<Detection> {
        let total_steps = self.step_count(shower, time_delay);
        if total_steps == 0 {
            log::warn!("Time delay {} leaves nothing to trace.", time_delay);
            return Vec::new();
        }
        log::info!("Tracing {} steps of {} photons.", total_steps, photons_per_step);

        let progress = ProgressBar::new(total_steps as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} steps")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_step = Arc::new(AtomicUsize::new(0));
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let (tx, rx) = mpsc::channel::<(usize, Vec<Detection>)>();
        let mut per_step: Vec<Vec<Detection>> = vec![Vec::new(); total_steps];

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let next_step = Arc::clone(&next_step);
                let tx = tx.clone();
                scope.spawn(move || {
                    loop {
                        let step = next_step.fetch_add(1, Ordering::Relaxed);
                        if step >= total_steps {
                            break;
                        }
                        let mut current = *shower;
                        current.increment_time(step as Float * time_delay);
                        let mut rng = LcgRng::for_task(seed, step as u64);
                        let hits = self.view_point(&current, photons_per_step, &mut rng);
                        if tx.send((step, hits)).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for _ in 0..total_steps {
                if let Ok((step, hits)) = rx.recv() {
                    per_step[step] = hits;
                    progress.inc(1);
                }
            }
        });
        progress.finish_and_clear();

        let detections: Vec<Detection> = per_step.into_iter().flatten().collect();
        log::info!("Recorded {} detections.", detections.len());
        detections
    }
}
