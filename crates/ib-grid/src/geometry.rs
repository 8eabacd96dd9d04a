//! Immersed bodies and their prescribed motion.

use crate::error::{GridError, GridResult};
use crate::fields::BoundaryVector;
use ib_core::Real;
use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Position, orientation and their rates at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub x: Real,
    pub y: Real,
    pub theta: Real,
    pub xdot: Real,
    pub ydot: Real,
    pub thetadot: Real,
}

/// Prescribed rigid-body motion, measured from the body's reference placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Motion {
    #[default]
    Fixed,
    /// Constant translational and angular velocity.
    Velocity {
        #[serde(default)]
        xdot: Real,
        #[serde(default)]
        ydot: Real,
        #[serde(default)]
        thetadot: Real,
    },
    /// Sinusoidal pitch about the body center plus vertical plunge.
    PitchPlunge {
        pitch_amplitude: Real,
        pitch_frequency: Real,
        plunge_amplitude: Real,
        plunge_frequency: Real,
    },
}

impl Motion {
    pub fn is_stationary(&self) -> bool {
        matches!(self, Motion::Fixed)
    }

    pub fn pose(&self, t: Real) -> Pose {
        match *self {
            Motion::Fixed => Pose::default(),
            Motion::Velocity {
                xdot,
                ydot,
                thetadot,
            } => Pose {
                x: xdot * t,
                y: ydot * t,
                theta: thetadot * t,
                xdot,
                ydot,
                thetadot,
            },
            Motion::PitchPlunge {
                pitch_amplitude,
                pitch_frequency,
                plunge_amplitude,
                plunge_frequency,
            } => {
                let wp = 2.0 * PI * pitch_frequency;
                let wh = 2.0 * PI * plunge_frequency;
                Pose {
                    x: 0.0,
                    y: plunge_amplitude * (wh * t).sin(),
                    theta: pitch_amplitude * (wp * t).sin(),
                    xdot: 0.0,
                    ydot: plunge_amplitude * wh * (wh * t).cos(),
                    thetadot: pitch_amplitude * wp * (wp * t).cos(),
                }
            }
        }
    }
}

/// A rigid body described by boundary points.
#[derive(Clone, Debug)]
pub struct RigidBody {
    name: String,
    reference: Vec<Point2<Real>>,
    center: Point2<Real>,
    motion: Motion,
    positions: Vec<Point2<Real>>,
    velocities: Vec<Vector2<Real>>,
}

impl RigidBody {
    /// Body from explicit points; rotation happens about `center`.
    pub fn from_points(
        name: impl Into<String>,
        points: Vec<Point2<Real>>,
        center: Point2<Real>,
    ) -> GridResult<Self> {
        let name = name.into();
        if points.is_empty() {
            return Err(GridError::InvalidGeometry {
                what: format!("body '{name}' has no points"),
            });
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GridError::InvalidGeometry {
                what: format!("body '{name}' has non-finite points"),
            });
        }
        let velocities = vec![Vector2::zeros(); points.len()];
        Ok(Self {
            name,
            positions: points.clone(),
            reference: points,
            center,
            motion: Motion::Fixed,
            velocities,
        })
    }

    /// `n` equally spaced points on a circle.
    pub fn circle(
        name: impl Into<String>,
        center: Point2<Real>,
        radius: Real,
        n: usize,
    ) -> GridResult<Self> {
        if radius <= 0.0 || n == 0 {
            return Err(GridError::InvalidGeometry {
                what: format!("circle needs positive radius and points, got r={radius}, n={n}"),
            });
        }
        let points = (0..n)
            .map(|k| {
                let phi = 2.0 * PI * k as Real / n as Real;
                Point2::new(center.x + radius * phi.cos(), center.y + radius * phi.sin())
            })
            .collect();
        Self::from_points(name, points, center)
    }

    /// `n ≥ 2` equally spaced points from `a` to `b` inclusive, rotating about the midpoint.
    pub fn line(
        name: impl Into<String>,
        a: Point2<Real>,
        b: Point2<Real>,
        n: usize,
    ) -> GridResult<Self> {
        if n < 2 {
            return Err(GridError::InvalidGeometry {
                what: format!("line needs at least 2 points, got {n}"),
            });
        }
        let points = (0..n)
            .map(|k| a + (b - a) * (k as Real / (n - 1) as Real))
            .collect();
        Self::from_points(name, points, nalgebra::center(&a, &b))
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn num_points(&self) -> usize {
        self.reference.len()
    }

    pub fn positions(&self) -> &[Point2<Real>] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vector2<Real>] {
        &self.velocities
    }

    /// Place the body at its pose for time `t`.
    pub fn move_to(&mut self, t: Real) {
        let pose = self.motion.pose(t);
        let rot = Rotation2::new(pose.theta);
        let offset = Vector2::new(pose.x, pose.y);
        let center = self.center + offset;
        for (k, p) in self.reference.iter().enumerate() {
            let r = rot * (p - self.center);
            self.positions[k] = center + r;
            self.velocities[k] =
                Vector2::new(pose.xdot - pose.thetadot * r.y, pose.ydot + pose.thetadot * r.x);
        }
    }
}

/// Collection of immersed bodies.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    bodies: Vec<RigidBody>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_body(&mut self, body: RigidBody) {
        self.bodies.push(body);
    }

    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.add_body(body);
        self
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn num_points(&self) -> usize {
        self.bodies.iter().map(RigidBody::num_points).sum()
    }

    pub fn is_stationary(&self) -> bool {
        self.bodies.iter().all(|b| b.motion().is_stationary())
    }

    /// Move every body to its placement at time `t`.
    pub fn move_bodies(&mut self, t: Real) {
        for body in &mut self.bodies {
            body.move_to(t);
        }
    }

    pub fn positions(&self) -> Vec<Point2<Real>> {
        self.bodies
            .iter()
            .flat_map(|b| b.positions().iter().copied())
            .collect()
    }

    /// Boundary point velocities, laid out like a boundary force.
    pub fn velocities(&self) -> BoundaryVector {
        let mut v = BoundaryVector::zeros(self.num_points());
        let all = self.bodies.iter().flat_map(|b| b.velocities().iter());
        for (k, vel) in all.enumerate() {
            v.set(k, vel.x, vel.y);
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_points_lie_on_circle() {
        let body = RigidBody::circle("c", Point2::new(1.0, -1.0), 0.5, 16).unwrap();
        assert_eq!(body.num_points(), 16);
        for p in body.positions() {
            let r = ((p.x - 1.0).powi(2) + (p.y + 1.0).powi(2)).sqrt();
            assert!((r - 0.5).abs() < 1e-14);
        }
    }

    #[test]
    fn fixed_geometry_is_stationary_with_zero_velocity() {
        let mut geom = Geometry::new()
            .with_body(RigidBody::line("plate", Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), 5).unwrap());
        assert!(geom.is_stationary());
        geom.move_bodies(3.0);
        assert_eq!(geom.velocities().norm_inf(), 0.0);
        assert_eq!(geom.positions()[4], Point2::new(1.0, 0.0));
    }

    #[test]
    fn translating_body_moves_and_reports_velocity() {
        let body = RigidBody::circle("c", Point2::origin(), 0.25, 8)
            .unwrap()
            .with_motion(Motion::Velocity {
                xdot: -1.0,
                ydot: 0.5,
                thetadot: 0.0,
            });
        let mut geom = Geometry::new().with_body(body);
        assert!(!geom.is_stationary());
        geom.move_bodies(2.0);
        let p = geom.positions()[0];
        assert!((p.x - (0.25 - 2.0)).abs() < 1e-14);
        assert!((p.y - 1.0).abs() < 1e-14);
        let v = geom.velocities();
        assert_eq!(v.x(3), -1.0);
        assert_eq!(v.y(3), 0.5);
    }

    #[test]
    fn rotation_velocity_is_tangential() {
        let body = RigidBody::line("plate", Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0), 3)
            .unwrap()
            .with_motion(Motion::Velocity {
                xdot: 0.0,
                ydot: 0.0,
                thetadot: 2.0,
            });
        let mut geom = Geometry::new().with_body(body);
        geom.move_bodies(0.0);
        let v = geom.velocities();
        // tip at (1, 0) moves in +y, tail at (-1, 0) in -y
        assert!((v.y(2) - 2.0).abs() < 1e-14);
        assert!((v.y(0) + 2.0).abs() < 1e-14);
        assert!(v.x(1).abs() < 1e-14 && v.y(1).abs() < 1e-14);
    }

    #[test]
    fn pitch_plunge_pose() {
        let m = Motion::PitchPlunge {
            pitch_amplitude: 0.1,
            pitch_frequency: 1.0,
            plunge_amplitude: 0.2,
            plunge_frequency: 0.5,
        };
        let p0 = m.pose(0.0);
        assert_eq!(p0.theta, 0.0);
        assert!((p0.thetadot - 0.2 * PI).abs() < 1e-14);
        assert!((p0.ydot - 0.2 * PI).abs() < 1e-14);
        let p1 = m.pose(1.0);
        assert!((p1.y - 0.0).abs() < 1e-14);
    }
}
