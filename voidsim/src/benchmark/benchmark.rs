use std::time::Instant;

use crate::simulation::body::BodyDef;
use crate::simulation::params::Parameters;
use crate::simulation::spacetime::Spacetime;
use crate::simulation::states::NVec3;

/// Helper to build a spacetime of `n` bodies in one domain.
/// Deterministic placement, with velocities pointing roughly at the origin so
/// some pairs actually meet.
fn make_spacetime(n: usize) -> Spacetime {
    let mut spacetime = Spacetime::new(Parameters::default());
    let domain = spacetime.create_domain();

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = NVec3::new(
            (i_f * 0.37).sin() * 50.0,
            (i_f * 0.13).cos() * 50.0,
            (i_f * 0.07).sin() * 50.0,
        );
        let v = -x * 0.05;

        let def = BodyDef::new(1.0, 0.5).with_position(x).with_velocity(v);
        if let Err(e) = spacetime.create_body(domain, def) {
            println!("skipping body {i}: {e}");
        }
    }

    spacetime
}

/// Time the same-domain candidate search on its own
pub fn bench_collisions() {
    // Different body counts to test
    let ns = [50, 100, 200, 400, 800];

    for n in ns {
        let spacetime = make_spacetime(n);

        // Warm up
        let _ = spacetime.collision_candidates(1.0);

        let t0 = Instant::now();
        let found = spacetime.collision_candidates(1.0);
        let dt_search = t0.elapsed().as_secs_f64();

        println!("N = {n:5}, candidates = {:5}, search = {:8.6} s", found.len(), dt_search);
    }
}

/// Time full `progress` calls for a range of n
/// Paste output directly into excel to graph
pub fn bench_progress_curve() {
    println!("N,ms_per_tick,impacts");

    // Steps of 50 to give smoother graph
    for n in (50..=800).step_by(50) {
        // Small n: average over a few ticks to smooth noise
        let ticks = if n <= 200 { 5 } else { 1 };

        let mut spacetime = make_spacetime(n);
        let mut impacts = 0;

        let t0 = Instant::now();
        for _ in 0..ticks {
            match spacetime.progress(1, 4) {
                Ok(report) => impacts += report.impacts,
                Err(e) => {
                    println!("{n},tick failed: {e}");
                    break;
                }
            }
        }
        let elapsed = t0.elapsed().as_secs_f64() * 1000.0; // ms total
        let ms_per_tick = elapsed / ticks as f64;

        println!("{},{:.6},{}", n, ms_per_tick, impacts);
    }
}
