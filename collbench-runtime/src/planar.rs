//! Built-in scene: a planar serial arm among circle and box obstacles.
//!
//! Joint angles are relative, so link `i` points at the sum of angles
//! `0..=i`. Every link is a capsule of `link_radius` around its segment.

use crate::error::{ProviderError, QueryError};
use crate::geometry::{Aabb, Segment, DVec2};
use crate::scene::{CollisionRequest, CollisionResult, Contact, ContactTarget, Scene};
use rand::distr::Uniform;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One revolute joint and the link it drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub length: f64,
    pub min_angle: f64,
    pub max_angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Obstacle {
    Circle(Circle),
    Box(Aabb),
}

impl Obstacle {
    /// Distance between the obstacle surface and `segment`, 0 when they overlap.
    pub fn clearance(&self, segment: &Segment) -> f64 {
        match self {
            Obstacle::Circle(circle) => {
                (segment.distance_to_point(circle.center) - circle.radius).max(0.0)
            }
            Obstacle::Box(aabb) => aabb.distance_to_segment(segment),
        }
    }
}

/// Joint angles in radians, one per link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointState {
    pub positions: Vec<f64>,
}

impl JointState {
    pub fn new(positions: Vec<f64>) -> Self {
        Self { positions }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarArmScene {
    #[serde(default)]
    pub base: DVec2,
    pub link_radius: f64,
    pub links: Vec<Link>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl PlanarArmScene {
    /// Load and validate a scene description from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene: PlanarArmScene =
            toml::from_str(&contents).map_err(|source| ProviderError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.links.is_empty() {
            return Err(ProviderError::InvalidScene("arm has no links".to_string()));
        }
        if !(self.link_radius.is_finite() && self.link_radius > 0.0) {
            return Err(ProviderError::InvalidScene(format!(
                "link radius must be positive, got {}",
                self.link_radius
            )));
        }
        for (i, link) in self.links.iter().enumerate() {
            if !(link.length.is_finite() && link.length > 0.0) {
                return Err(ProviderError::InvalidScene(format!(
                    "link {} has non-positive length {}",
                    i, link.length
                )));
            }
            if !(link.min_angle.is_finite() && link.max_angle.is_finite())
                || link.min_angle > link.max_angle
            {
                return Err(ProviderError::InvalidScene(format!(
                    "link {} has invalid joint limits [{}, {}]",
                    i, link.min_angle, link.max_angle
                )));
            }
            // The sampler draws from this same distribution
            if Uniform::new_inclusive(link.min_angle, link.max_angle).is_err() {
                return Err(ProviderError::InvalidScene(format!(
                    "link {} joint range [{}, {}] is too wide to sample",
                    i, link.min_angle, link.max_angle
                )));
            }
        }
        for (i, obstacle) in self.obstacles.iter().enumerate() {
            let valid = match obstacle {
                Obstacle::Circle(c) => c.radius >= 0.0,
                Obstacle::Box(b) => b.min.x <= b.max.x && b.min.y <= b.max.y,
            };
            if !valid {
                return Err(ProviderError::InvalidScene(format!(
                    "obstacle {} has inverted extents",
                    i
                )));
            }
        }
        Ok(())
    }

    pub fn dof(&self) -> usize {
        self.links.len()
    }

    /// Link segments for `state`, base first.
    pub fn forward_kinematics(&self, state: &JointState) -> Result<Vec<Segment>, QueryError> {
        if state.positions.len() != self.links.len() {
            return Err(QueryError::DimensionMismatch {
                expected: self.links.len(),
                got: state.positions.len(),
            });
        }

        let mut segments = Vec::with_capacity(self.links.len());
        let mut origin = self.base;
        let mut heading = 0.0;
        for (joint, (link, &angle)) in self.links.iter().zip(&state.positions).enumerate() {
            if !angle.is_finite() {
                return Err(QueryError::NonFinite { joint, value: angle });
            }
            heading += angle;
            let tip = origin + DVec2::from_angle(heading) * link.length;
            segments.push(Segment::new(origin, tip));
            origin = tip;
        }
        Ok(segments)
    }
}

impl Scene for PlanarArmScene {
    type State = JointState;

    fn random_state<R: Rng>(&self, rng: &mut R) -> JointState {
        let positions = self
            .links
            .iter()
            .map(|link| rng.random_range(link.min_angle..=link.max_angle))
            .collect();
        JointState { positions }
    }

    fn check_collision(
        &self,
        request: &CollisionRequest,
        state: &JointState,
    ) -> Result<CollisionResult, QueryError> {
        let segments = self.forward_kinematics(state)?;
        let mut result = CollisionResult::default();

        for (link, segment) in segments.iter().enumerate() {
            for (index, obstacle) in self.obstacles.iter().enumerate() {
                if obstacle.clearance(segment) < self.link_radius {
                    result.add_contact(Contact {
                        link,
                        target: ContactTarget::Obstacle(index),
                    });
                    if result.contacts.len() >= request.max_contacts {
                        return Ok(result);
                    }
                }
            }
        }

        if request.self_collision {
            // Adjacent links share a joint and always touch.
            let min_gap = 2.0 * self.link_radius;
            for i in 0..segments.len() {
                for j in (i + 2)..segments.len() {
                    if segments[i].distance_to_segment(&segments[j]) < min_gap {
                        result.add_contact(Contact {
                            link: i,
                            target: ContactTarget::Link(j),
                        });
                        if result.contacts.len() >= request.max_contacts {
                            return Ok(result);
                        }
                    }
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::PI;
    use tempfile::NamedTempFile;

    fn three_link_arm(obstacles: Vec<Obstacle>) -> PlanarArmScene {
        let link = Link {
            length: 1.0,
            min_angle: -PI,
            max_angle: PI,
        };
        PlanarArmScene {
            base: DVec2::ZERO,
            link_radius: 0.05,
            links: vec![link.clone(), link.clone(), link],
            obstacles,
        }
    }

    #[test]
    fn test_forward_kinematics_straight_arm() {
        let scene = three_link_arm(vec![]);
        let segments = scene
            .forward_kinematics(&JointState::new(vec![0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(segments.len(), 3);
        assert!((segments[2].end.x - 3.0).abs() < 1e-12);
        assert!(segments[2].end.y.abs() < 1e-12);
    }

    #[test]
    fn test_forward_kinematics_accumulates_angles() {
        let scene = three_link_arm(vec![]);
        let segments = scene
            .forward_kinematics(&JointState::new(vec![PI / 2.0, -PI / 2.0, 0.0]))
            .unwrap();
        // Up one, then right two
        assert!((segments[2].end.x - 2.0).abs() < 1e-9);
        assert!((segments[2].end.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_free_configuration() {
        let scene = three_link_arm(vec![Obstacle::Circle(Circle {
            center: DVec2::new(0.0, 2.0),
            radius: 0.5,
        })]);
        let result = scene
            .check_collision(
                &CollisionRequest::default(),
                &JointState::new(vec![0.0, 0.0, 0.0]),
            )
            .unwrap();
        assert!(!result.collision);
        assert!(result.contacts.is_empty());
    }

    #[test]
    fn test_obstacle_contact() {
        let scene = three_link_arm(vec![Obstacle::Box(Aabb::new(
            DVec2::new(2.5, -0.5),
            DVec2::new(3.5, 0.5),
        ))]);
        let result = scene
            .check_collision(
                &CollisionRequest::default(),
                &JointState::new(vec![0.0, 0.0, 0.0]),
            )
            .unwrap();
        assert!(result.collision);
        assert_eq!(
            result.contacts,
            vec![Contact {
                link: 2,
                target: ContactTarget::Obstacle(0)
            }]
        );
    }

    #[test]
    fn test_self_collision_folded_arm() {
        let scene = three_link_arm(vec![]);
        // Second link folds back over the first, third continues past the base
        let folded = JointState::new(vec![0.0, PI, 0.0]);

        let result = scene
            .check_collision(&CollisionRequest::default(), &folded)
            .unwrap();
        assert!(result.collision);
        assert_eq!(result.contacts[0].target, ContactTarget::Link(2));

        let request = CollisionRequest {
            self_collision: false,
            max_contacts: 1,
        };
        let result = scene.check_collision(&request, &folded).unwrap();
        assert!(!result.collision);
    }

    #[test]
    fn test_max_contacts_stops_search() {
        let wall = Obstacle::Box(Aabb::new(DVec2::new(-10.0, -10.0), DVec2::new(10.0, 10.0)));
        let scene = three_link_arm(vec![wall]);
        let request = CollisionRequest {
            self_collision: true,
            max_contacts: 2,
        };
        let result = scene
            .check_collision(&request, &JointState::new(vec![0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(result.contacts.len(), 2);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scene = three_link_arm(vec![]);
        let err = scene
            .check_collision(&CollisionRequest::default(), &JointState::new(vec![0.0]))
            .unwrap_err();
        assert_eq!(err, QueryError::DimensionMismatch { expected: 3, got: 1 });
    }

    #[test]
    fn test_non_finite_joint() {
        let scene = three_link_arm(vec![]);
        let err = scene
            .check_collision(
                &CollisionRequest::default(),
                &JointState::new(vec![0.0, f64::NAN, 0.0]),
            )
            .unwrap_err();
        assert!(matches!(err, QueryError::NonFinite { joint: 1, .. }));
    }

    #[test]
    fn test_random_state_respects_limits() {
        let mut scene = three_link_arm(vec![]);
        scene.links[1].min_angle = 0.25;
        scene.links[1].max_angle = 0.5;
        scene.links[2].min_angle = 1.0;
        scene.links[2].max_angle = 1.0;

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let state = scene.random_state(&mut rng);
            assert_eq!(state.positions.len(), 3);
            assert!(state.positions[0] >= -PI && state.positions[0] <= PI);
            assert!(state.positions[1] >= 0.25 && state.positions[1] <= 0.5);
            assert_eq!(state.positions[2], 1.0);
        }
    }

    #[test]
    fn test_load_scene_file() {
        let toml_content = r#"
            base = [0.5, -0.5]
            link_radius = 0.1

            [[links]]
            length = 1.0
            min_angle = -1.5
            max_angle = 1.5

            [[links]]
            length = 0.5
            min_angle = -1.0
            max_angle = 1.0

            [[obstacles]]
            shape = "circle"
            center = [2.0, 1.0]
            radius = 0.25

            [[obstacles]]
            shape = "box"
            min = [-2.0, -2.0]
            max = [-1.0, -1.0]
        "#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).unwrap();

        let scene = PlanarArmScene::load(temp_file.path()).unwrap();
        assert_eq!(scene.dof(), 2);
        assert_eq!(scene.base, DVec2::new(0.5, -0.5));
        assert_eq!(scene.obstacles.len(), 2);
        assert!(matches!(scene.obstacles[1], Obstacle::Box(_)));
    }

    #[test]
    fn test_load_rejects_inverted_limits() {
        let toml_content = r#"
            link_radius = 0.1

            [[links]]
            length = 1.0
            min_angle = 1.0
            max_angle = -1.0
        "#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).unwrap();

        assert!(matches!(
            PlanarArmScene::load(temp_file.path()),
            Err(ProviderError::InvalidScene(_))
        ));
    }

    #[test]
    fn test_load_rejects_unsampleable_limits() {
        let toml_content = r#"
            link_radius = 0.1

            [[links]]
            length = 1.0
            min_angle = -1e308
            max_angle = 1e308
        "#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).unwrap();

        match PlanarArmScene::load(temp_file.path()) {
            Err(ProviderError::InvalidScene(msg)) => assert!(msg.contains("too wide")),
            other => panic!("expected InvalidScene, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_full_turn() {
        let mut scene = three_link_arm(vec![]);
        scene.links[0].min_angle = -2.0 * PI;
        scene.links[0].max_angle = 2.0 * PI;
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            PlanarArmScene::load("/nonexistent/collbench/scene.toml"),
            Err(ProviderError::Io { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_arm() {
        let scene = PlanarArmScene {
            base: DVec2::ZERO,
            link_radius: 0.1,
            links: vec![],
            obstacles: vec![],
        };
        assert!(scene.validate().is_err());
    }
}
