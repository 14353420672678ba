//! Animation tick body
//!
//! Particle fountain: one particle spawned per tick at the canvas centre,
//! drifting with a time-varying perturbation and fading out.

use std::f64::consts::TAU;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AnimationConfig;
use crate::signal::FrameSignal;
use crate::sink::FrameRenderer;
use crate::worker::TickBody;

/// Alpha lost per tick
const FADE_PER_TICK: f32 = 0.01;
/// Velocity perturbation amplitude
const DRIFT: f64 = 0.05;

/// Single particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Opacity in (0, 1]; the particle is removed once it reaches 0
    pub alpha: f32,
}

/// What a renderer sees after each tick
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Simulation time
    pub time: f64,
    /// Live particles, oldest first
    pub particles: &'a [Particle],
    pub width: u32,
    pub height: u32,
}

/// Producer body for the animation worker
pub struct AnimationBody {
    config: AnimationConfig,
    time: f64,
    particles: Vec<Particle>,
    rng: StdRng,
    signal: Arc<FrameSignal>,
    renderer: Box<dyn FrameRenderer>,
}

impl std::fmt::Debug for AnimationBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationBody")
            .field("time", &self.time)
            .field("particles", &self.particles.len())
            .field("max_particles", &self.config.max_particles)
            .finish()
    }
}

impl AnimationBody {
    /// Create a body publishing to `signal` and drawing through `renderer`
    pub fn new(
        config: AnimationConfig,
        signal: Arc<FrameSignal>,
        renderer: impl FrameRenderer + 'static,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            particles: Vec::with_capacity(config.max_particles),
            config,
            time: 0.0,
            rng,
            signal,
            renderer: Box::new(renderer),
        }
    }

    /// Simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Live particles
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Particle cap
    pub fn max_particles(&self) -> usize {
        self.config.max_particles
    }

    /// Spawn point
    pub fn origin(&self) -> (f64, f64) {
        (
            f64::from(self.config.width) / 2.0,
            f64::from(self.config.height) / 2.0,
        )
    }

    fn spawn(&mut self) {
        if self.particles.len() >= self.config.max_particles {
            return;
        }

        let (x, y) = self.origin();
        let angle = self.rng.gen_range(0.0..TAU);
        let speed = self.rng.gen_range(1.0..3.0);

        self.particles.push(Particle {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            alpha: 1.0,
        });
    }

    fn advance(&mut self) {
        let time = self.time;
        for p in &mut self.particles {
            p.vx += (time + p.x * 0.01).sin() * DRIFT;
            p.vy += (time * 0.7 + p.y * 0.01).cos() * DRIFT;

            p.x += p.vx;
            p.y += p.vy;

            p.alpha -= FADE_PER_TICK;
        }

        self.particles.retain(|p| p.alpha > 0.0);
    }
}

impl TickBody for AnimationBody {
    fn tick(&mut self) {
        self.time += self.config.time_step;
        self.spawn();
        self.advance();

        let frame = FrameView {
            time: self.time,
            particles: &self.particles,
            width: self.config.width,
            height: self.config.height,
        };
        self.renderer.render_frame(&frame);

        self.signal.publish();
        tracing::trace!(time = self.time, particles = self.particles.len(), "frame published");
    }

    fn reset(&mut self) {
        self.time = 0.0;
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullRenderer;

    fn body(max_particles: usize) -> (AnimationBody, Arc<FrameSignal>) {
        let signal = Arc::new(FrameSignal::new());
        let config = AnimationConfig {
            max_particles,
            seed: Some(7),
            ..AnimationConfig::default()
        };
        (AnimationBody::new(config, Arc::clone(&signal), NullRenderer), signal)
    }

    #[test]
    fn test_tick_spawns_and_publishes() {
        let (mut anim, signal) = body(10);

        anim.tick();

        assert_eq!(anim.particle_count(), 1);
        assert!((anim.time() - 0.05).abs() < 1e-12);
        assert!(signal.is_ready());
        assert_eq!(signal.stats().published, 1);
    }

    #[test]
    fn test_particle_cap_holds() {
        let (mut anim, _) = body(5);

        for _ in 0..50 {
            anim.tick();
            assert!(anim.particle_count() <= 5);
        }
        assert_eq!(anim.particle_count(), 5);
    }

    #[test]
    fn test_particles_fade_out() {
        let (mut anim, _) = body(1);

        anim.tick();
        let first = anim.particles()[0];
        assert!(first.alpha < 1.0);

        for _ in 0..50 {
            anim.tick();
        }
        assert_eq!(anim.particle_count(), 1);
        assert!(anim.particles()[0].alpha < first.alpha);

        // Past its ~100 tick lifetime the first particle is gone
        for _ in 0..150 {
            anim.tick();
            assert!(anim.particles().iter().all(|p| p.alpha > 0.0));
        }
    }

    #[test]
    fn test_new_particle_starts_near_origin() {
        let (mut anim, _) = body(10);
        anim.tick();

        let (ox, oy) = anim.origin();
        let p = anim.particles()[0];
        let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
        // One step of travel at speed < 3 plus drift
        assert!(((p.x - ox).powi(2) + (p.y - oy).powi(2)).sqrt() < 3.2);
        assert!(speed < 3.2);
    }

    #[test]
    fn test_reset_clears_state() {
        let (mut anim, _) = body(10);
        for _ in 0..5 {
            anim.tick();
        }

        anim.reset();

        assert_eq!(anim.time(), 0.0);
        assert_eq!(anim.particle_count(), 0);
    }

    #[test]
    fn test_renderer_sees_each_frame() {
        let signal = Arc::new(FrameSignal::new());
        let frames = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = Arc::clone(&frames);
        let renderer = move |frame: &FrameView<'_>| {
            seen.lock().unwrap().push((frame.time, frame.particles.len()));
        };
        let config = AnimationConfig {
            seed: Some(1),
            ..AnimationConfig::default()
        };
        let mut anim = AnimationBody::new(config, signal, renderer);

        anim.tick();
        anim.tick();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].1, 2);
    }
}
