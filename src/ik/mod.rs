//! IK domain: weighted FABRIK chains and a minimal humanoid skeleton.
//!
//! Chains run away from the spine: the first bone is the fixed root, the last bone is
//! the end effector that is pulled toward the target.

use bevy::prelude::*;

use crate::core::EPSILON;


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkBone {
    pub position: Vec3,
    /// Influence of the solved pose on this bone, 0 to 1.
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IkChain {
    pub bones: Vec<IkBone>,
}

impl IkChain {
    pub fn new(bones: Vec<IkBone>) -> Self {
        Self { bones }
    }

    pub fn is_empty(&self) -> bool {
        self.bones.len() < 2
    }

    pub fn end(&self) -> Option<Vec3> {
        self.bones.last().map(|b| b.position)
    }

    pub fn reach(&self) -> f32 {
        self.bones
            .windows(2)
            .map(|pair| pair[0].position.distance(pair[1].position))
            .sum()
    }

    /// Bends the chain toward `target`.
    ///
    /// The solved pose is blended into the current one per bone by
    /// `intensity * weight`, so an intensity of 0 leaves the chain untouched.
    pub fn solve(&mut self, target: Vec3, intensity: f32, iterations: u32) {
        let intensity = intensity.clamp(0.0, 1.0);
        if self.is_empty() || iterations == 0 || intensity <= EPSILON {
            return;
        }

        let lengths: Vec<f32> = self
            .bones
            .windows(2)
            .map(|pair| pair[0].position.distance(pair[1].position))
            .collect();
        let root = self.bones[0].position;
        let mut solved: Vec<Vec3> = self.bones.iter().map(|b| b.position).collect();
        let last = solved.len() - 1;

        if root.distance(target) >= lengths.iter().sum::<f32>() {
            let Some(direction) = (target - root).try_normalize() else {
                return;
            };
            for i in 1..solved.len() {
                solved[i] = solved[i - 1] + direction * lengths[i - 1];
            }
        } else {
            for _ in 0..iterations {
                solved[last] = target;
                for i in (0..last).rev() {
                    let direction = (solved[i] - solved[i + 1])
                        .try_normalize()
                        .unwrap_or(Vec3::Y);
                    solved[i] = solved[i + 1] + direction * lengths[i];
                }

                solved[0] = root;
                for i in 1..solved.len() {
                    let direction = (solved[i] - solved[i - 1])
                        .try_normalize()
                        .unwrap_or(Vec3::NEG_Y);
                    solved[i] = solved[i - 1] + direction * lengths[i - 1];
                }
            }
        }

        for (bone, target) in self.bones.iter_mut().zip(solved) {
            let t = (intensity * bone.weight).clamp(0.0, 1.0);
            bone.position = bone.position.lerp(target, t);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Hips,
    Spine,
    Neck,
    Head,
    LeftShoulder,
    LeftElbow,
    LeftHand,
    RightShoulder,
    RightElbow,
    RightHand,
    LeftFoot,
    RightFoot,
}

impl Joint {
    pub const ALL: [Joint; 12] = [
        Joint::Hips,
        Joint::Spine,
        Joint::Neck,
        Joint::Head,
        Joint::LeftShoulder,
        Joint::LeftElbow,
        Joint::LeftHand,
        Joint::RightShoulder,
        Joint::RightElbow,
        Joint::RightHand,
        Joint::LeftFoot,
        Joint::RightFoot,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Chains used by the motor, with per-bone weights.
pub const LEFT_ARM: [(Joint, f32); 3] = [
    (Joint::LeftShoulder, 0.0),
    (Joint::LeftElbow, 0.7),
    (Joint::LeftHand, 1.0),
];
pub const RIGHT_ARM: [(Joint, f32); 3] = [
    (Joint::RightShoulder, 0.0),
    (Joint::RightElbow, 0.7),
    (Joint::RightHand, 1.0),
];
pub const UPPER_BODY: [(Joint, f32); 4] = [
    (Joint::Hips, 0.0),
    (Joint::Spine, 0.3),
    (Joint::Neck, 0.6),
    (Joint::Head, 1.0),
];

/// World-space joint positions of a humanoid rig.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    joints: [Vec3; 12],
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::rest(Vec3::ZERO, Quat::IDENTITY, 1.8)
    }
}

impl Skeleton {
    /// Standing pose for a body whose feet are at `feet`, facing `rotation * Z`.
    pub fn rest(feet: Vec3, rotation: Quat, height: f32) -> Self {
        let at = |side: f32, up: f32, forward: f32| {
            feet + rotation * Vec3::new(side * height, up * height, forward * height)
        };

        let mut joints = [Vec3::ZERO; 12];
        joints[Joint::Hips.index()] = at(0.0, 0.5, 0.0);
        joints[Joint::Spine.index()] = at(0.0, 0.65, 0.0);
        joints[Joint::Neck.index()] = at(0.0, 0.85, 0.0);
        joints[Joint::Head.index()] = at(0.0, 0.95, 0.0);
        joints[Joint::LeftShoulder.index()] = at(0.11, 0.82, 0.0);
        joints[Joint::LeftElbow.index()] = at(0.13, 0.66, 0.0);
        joints[Joint::LeftHand.index()] = at(0.14, 0.5, 0.02);
        joints[Joint::RightShoulder.index()] = at(-0.11, 0.82, 0.0);
        joints[Joint::RightElbow.index()] = at(-0.13, 0.66, 0.0);
        joints[Joint::RightHand.index()] = at(-0.14, 0.5, 0.02);
        joints[Joint::LeftFoot.index()] = at(0.06, 0.03, 0.0);
        joints[Joint::RightFoot.index()] = at(-0.06, 0.03, 0.0);

        Self { joints }
    }

    pub fn joint(&self, joint: Joint) -> Vec3 {
        self.joints[joint.index()]
    }

    pub fn set_joint(&mut self, joint: Joint, position: Vec3) {
        self.joints[joint.index()] = position;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Joint, Vec3)> + '_ {
        Joint::ALL.into_iter().map(|j| (j, self.joint(j)))
    }

    /// Moves the whole rig, which hangs from the hips.
    pub fn shift(&mut self, offset: Vec3) {
        for joint in self.joints.iter_mut() {
            *joint += offset;
        }
    }

    /// Solves one chain of the rig toward `target` and writes the result back.
    pub fn solve(&mut self, chain: &[(Joint, f32)], target: Vec3, intensity: f32, iterations: u32) {
        let mut ik = IkChain::new(
            chain
                .iter()
                .map(|&(joint, weight)| IkBone {
                    position: self.joint(joint),
                    weight,
                })
                .collect(),
        );

        ik.solve(target, intensity, iterations);

        for (&(joint, _), bone) in chain.iter().zip(ik.bones) {
            self.set_joint(joint, bone.position);
        }
    }
}
