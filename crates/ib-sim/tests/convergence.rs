//! Temporal order of accuracy by self-convergence.
//!
//! A vorticity blob is carried by a uniform stream with no bodies, both at
//! negligible viscosity and with diffusion comparable to advection. Halving `h`
//! must shrink the difference between successive solutions by `2^order`.

use ib_core::Real;
use ib_grid::{Flux, Geometry, Grid, Scalar};
use ib_model::{Discretization, FlowModel, NonlinearNavierStokes, State};
use ib_sim::{Scheme, build_timestepper};
use ib_solver::SchurMethod;

const FINAL_TIME: Real = 0.2;
const INVISCID: Real = 1e12;

fn model(reynolds: Real) -> NonlinearNavierStokes {
    let grid = Grid::new(16, 16, 4.0, -2.0, -2.0).unwrap();
    let q0 = Flux::uniform_flow(&grid, 1.0, 0.3);
    NonlinearNavierStokes::new(Discretization::new(&grid, Geometry::new(), reynolds, q0).unwrap())
}

fn initial_state(model: &NonlinearNavierStokes) -> State {
    let grid = model.grid().clone();
    let dx = grid.dx();
    let mut x = model.new_state();
    x.gamma = Scalar::from_fn(&grid, |i, j| {
        let px = grid.x_node(i) + 0.5;
        let py = grid.y_node(j);
        dx * dx * (-(px * px + py * py) / 0.5).exp()
    });
    model.refresh_state(&mut x);
    x
}

fn solve(scheme: Scheme, steps: usize, reynolds: Real) -> Scalar {
    let model = model(reynolds);
    let mut x = initial_state(&model);
    let h = FINAL_TIME / steps as Real;
    let mut stepper = build_timestepper(scheme, model, h, SchurMethod::Cholesky).unwrap();
    stepper.init().unwrap();
    for _ in 0..steps {
        stepper.advance(&mut x).unwrap();
    }
    assert_eq!(x.timestep, steps as u64);
    assert!((x.time - FINAL_TIME).abs() < 1e-12);
    x.gamma
}

/// Ratio of successive self-convergence differences at the two finest pairs.
fn convergence_ratio(scheme: Scheme, reynolds: Real) -> Real {
    let sols: Vec<Scalar> = [10, 20, 40, 80]
        .iter()
        .map(|&n| solve(scheme, n, reynolds))
        .collect();
    let e_coarse = (&sols[1] - &sols[2]).norm_inf();
    let e_fine = (&sols[2] - &sols[3]).norm_inf();
    assert!(e_fine > 0.0, "{scheme} at Re {reynolds}: solutions did not change with h");
    e_coarse / e_fine
}

#[test]
fn euler_is_first_order() {
    let r = convergence_ratio(Scheme::Euler, INVISCID);
    assert!((1.6..2.5).contains(&r), "ratio {r}");
}

#[test]
fn adams_bashforth_is_second_order() {
    let r = convergence_ratio(Scheme::AdamsBashforth, INVISCID);
    assert!((3.2..5.0).contains(&r), "ratio {r}");
}

#[test]
fn runge_kutta2_is_second_order() {
    let r = convergence_ratio(Scheme::RungeKutta2, INVISCID);
    assert!((3.2..5.0).contains(&r), "ratio {r}");
}

#[test]
fn runge_kutta3_is_third_order() {
    let r = convergence_ratio(Scheme::RungeKutta3, INVISCID);
    assert!((6.0..10.5).contains(&r), "ratio {r}");
}

#[test]
fn runge_kutta3_stays_third_order_with_viscosity() {
    for reynolds in [1.0, 100.0] {
        let r = convergence_ratio(Scheme::RungeKutta3, reynolds);
        assert!((6.0..10.5).contains(&r), "Re {reynolds}: ratio {r}");
    }
}

#[test]
fn runge_kutta2_stays_second_order_with_viscosity() {
    let r = convergence_ratio(Scheme::RungeKutta2, 1.0);
    assert!((3.2..5.0).contains(&r), "ratio {r}");
}
