use ib_core::Real;
use ib_grid::{BoundaryVector, Flux, Geometry, Grid, Motion, Point2, RigidBody, Scalar};
use ib_model::{Discretization, FlowModel, NonlinearNavierStokes};
use ib_solver::{ProjectionSolver, SchurMethod, SolverError, constraint_residual};

fn model_with(geometry: Geometry) -> NonlinearNavierStokes {
    let grid = Grid::new(16, 16, 4.0, -2.0, -2.0).unwrap();
    let q0 = Flux::uniform_flow(&grid, 1.0, 0.0);
    NonlinearNavierStokes::new(Discretization::new(&grid, geometry, 100.0, q0).unwrap())
}

fn cylinder() -> NonlinearNavierStokes {
    model_with(
        Geometry::new().with_body(RigidBody::circle("cyl", Point2::origin(), 0.5, 12).unwrap()),
    )
}

fn source(model: &NonlinearNavierStokes) -> Scalar {
    Scalar::from_fn(model.grid(), |i, j| {
        0.01 * ((i as Real) * 0.9).sin() * ((j as Real) * 0.5).cos()
    })
}

#[test]
fn cholesky_solution_satisfies_constraint() {
    let model = cylinder();
    let mut solver = ProjectionSolver::new(&model, 0.01, SchurMethod::Cholesky).unwrap();
    assert!(solver.needs_init(&model));
    solver.init(&model).unwrap();
    assert!(!solver.needs_init(&model));

    let b = model.boundary_target();
    let (gamma, f) = solver.solve(&model, &source(&model), &b).unwrap();
    assert_eq!(f.num_points(), 12);
    assert!(constraint_residual(&model, &gamma, &b) < 1e-10);
    // the body holds the fluid back against the free stream
    assert!(f.sum_x().abs() > 0.0);
}

#[test]
fn solution_satisfies_implicit_equation() {
    let model = cylinder();
    let beta = 0.02;
    let mut solver = ProjectionSolver::new(&model, beta, SchurMethod::Cholesky).unwrap();
    solver.init(&model).unwrap();
    let a = source(&model);
    let (gamma, f) = solver.solve(&model, &a, &model.boundary_target()).unwrap();

    // (1 − β/2 L) γ + β B f, with L applied through the sine basis
    let disc = model.discretization();
    let lhs_diag = model.eigenvalues().map(|l| 1.0 - 0.5 * beta * l);
    let mut lhs = disc.apply_diagonal(&gamma, &lhs_diag);
    lhs += &(&disc.force_coupling(&f) * beta);
    assert!((&lhs - &a).norm_inf() < 1e-10);
}

#[test]
fn cholesky_and_conjugate_gradient_agree() {
    let model = cylinder();
    let mut direct = ProjectionSolver::new(&model, 0.01, SchurMethod::Cholesky).unwrap();
    direct.init(&model).unwrap();
    let iterative = ProjectionSolver::new(&model, 0.01, SchurMethod::iterative()).unwrap();
    assert!(!iterative.needs_init(&model));

    let a = source(&model);
    let b = model.boundary_target();
    let (g1, f1) = direct.solve(&model, &a, &b).unwrap();
    let (g2, f2) = iterative.solve(&model, &a, &b).unwrap();
    assert!((&g1 - &g2).norm_inf() < 1e-8);
    assert!((&f1 - &f2).norm_inf() < 1e-6 * f1.norm_inf().max(1.0));
}

#[test]
fn schur_matrix_is_symmetric_and_reusable() {
    let model = cylinder();
    let mut first = ProjectionSolver::new(&model, 0.01, SchurMethod::Cholesky).unwrap();
    first.init(&model).unwrap();
    let m = first.schur_matrix().unwrap().clone();
    assert_eq!(m.nrows(), 24);
    assert!((&m - m.transpose()).amax() < 1e-14);

    let mut second = ProjectionSolver::new(&model, 0.01, SchurMethod::Cholesky).unwrap();
    second.set_schur_matrix(m).unwrap();
    assert!(!second.needs_init(&model));

    let a = source(&model);
    let b = model.boundary_target();
    assert_eq!(
        first.solve(&model, &a, &b).unwrap(),
        second.solve(&model, &a, &b).unwrap()
    );
}

#[test]
fn no_bodies_reduces_to_implicit_solve() {
    let model = model_with(Geometry::new());
    let solver = ProjectionSolver::new(&model, 0.01, SchurMethod::Cholesky).unwrap();
    assert!(!solver.needs_init(&model));
    let a = source(&model);
    let (gamma, f) = solver.solve(&model, &a, &BoundaryVector::zeros(0)).unwrap();
    assert_eq!(f.num_points(), 0);
    assert_eq!(gamma, solver.implicit_solve(&model, &a));
}

#[test]
fn solve_before_init_is_an_error() {
    let model = cylinder();
    let solver = ProjectionSolver::new(&model, 0.01, SchurMethod::Cholesky).unwrap();
    let err = solver
        .solve(&model, &source(&model), &model.boundary_target())
        .unwrap_err();
    assert!(matches!(err, SolverError::NotInitialized { .. }));
}

#[test]
fn exhausted_iteration_budget_is_fatal() {
    let model = cylinder();
    let method = SchurMethod::ConjugateGradient {
        tolerance: 1e-14,
        max_iterations: 1,
    };
    let solver = ProjectionSolver::new(&model, 0.01, method).unwrap();
    let err = solver
        .solve(&model, &source(&model), &model.boundary_target())
        .unwrap_err();
    assert!(matches!(err, SolverError::ConvergenceFailed { .. }));
}

#[test]
fn moving_geometry_switches_to_conjugate_gradient() {
    let body = RigidBody::circle("cyl", Point2::origin(), 0.5, 12)
        .unwrap()
        .with_motion(Motion::Velocity {
            xdot: 0.1,
            ydot: 0.0,
            thetadot: 0.0,
        });
    let model = model_with(Geometry::new().with_body(body));
    let solver = ProjectionSolver::new(&model, 0.01, SchurMethod::Cholesky).unwrap();
    assert!(matches!(
        solver.method(),
        SchurMethod::ConjugateGradient { .. }
    ));
    assert!(!solver.needs_init(&model));
}

#[test]
fn invalid_parameters_are_rejected() {
    let model = cylinder();
    assert!(ProjectionSolver::new(&model, 0.0, SchurMethod::Cholesky).is_err());
    let zero_budget = SchurMethod::ConjugateGradient {
        tolerance: 1e-8,
        max_iterations: 0,
    };
    assert!(ProjectionSolver::new(&model, 0.01, zero_budget).is_err());
}
