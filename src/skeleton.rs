//! Skeleton building from the flat `.model` bone table
//!
//! The bone table guarantees nothing about ordering: parents may appear
//! after children, so the tree is assembled in a fixed-point pass keyed
//! on parent names rather than a single linear walk. World transforms
//! compose every ancestor's local transform root-to-node, then receive
//! the engine-to-target axis correction exactly once.

use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

use crate::error::{Error, Result};
use crate::formats::model::{Bone, SkinBone};

/// Caller-side knobs for skeleton building.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonOptions {
    /// Unit-scale factor applied to composed world translations only.
    pub scale: f32,
}

impl Default for SkeletonOptions {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// One bone of a built tree.
#[derive(Debug, Clone)]
pub struct SkeletonBone {
    pub name: String,
    /// Flag byte carried over from the bone table.
    pub flag: u8,
    /// Index of the parent in [`Skeleton::bones`], `None` for roots.
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Local translation-rotation transform, engine space.
    pub local: Mat4,
    /// Composed, scaled, axis-corrected world transform.
    pub world: Mat4,
}

/// A rooted bone tree built from a flat bone table.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub bones: Vec<SkeletonBone>,
}

impl Skeleton {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn bone(&self, name: &str) -> Option<&SkeletonBone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Indices of bones without a parent.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent.is_none())
            .map(|(i, _)| i)
    }

    /// Drop every bone without a same-named skin-bone entry, reparenting
    /// its children to its parent. World transforms were fixed when the
    /// full tree was built, so waypoint bones can be removed safely here
    /// but never during construction.
    pub fn pruned(mut self, skin_bones: &[SkinBone]) -> Skeleton {
        let keep: HashSet<&str> = skin_bones.iter().map(|s| s.name.as_str()).collect();
        while let Some(victim) = self
            .bones
            .iter()
            .position(|b| !keep.contains(b.name.as_str()))
        {
            self.remove_bone(victim);
        }
        self
    }

    fn remove_bone(&mut self, index: usize) {
        let removed = self.bones.remove(index);
        for bone in &mut self.bones {
            bone.children.retain(|&c| c != index);
            for child in &mut bone.children {
                if *child > index {
                    *child -= 1;
                }
            }
            match bone.parent {
                Some(p) if p == index => bone.parent = removed.parent.map(|p| shift(p, index)),
                Some(p) if p > index => bone.parent = Some(p - 1),
                _ => {}
            }
        }
        // adopted grandchildren join the grandparent's child list
        if let Some(grandparent) = removed.parent.map(|p| shift(p, index)) {
            for i in 0..self.bones.len() {
                if self.bones[i].parent == Some(grandparent)
                    && !self.bones[grandparent].children.contains(&i)
                {
                    self.bones[grandparent].children.push(i);
                }
            }
        }
    }
}

fn shift(index: usize, removed: usize) -> usize {
    if index > removed { index - 1 } else { index }
}

/// Build a bone tree from the flat table.
///
/// Roots (`parent_name == None`) are placed first; remaining bones attach
/// once their named parent exists in the tree, re-queueing until a full
/// pass attaches nothing. The wire format does not order parents before
/// children, so this is a fixed-point pass bounded by the bone count.
///
/// # Errors
///
/// Returns [`Error::DanglingBone`] when a bone's parent name matches no
/// bone in the table; the pass bound guarantees termination.
pub fn build_skeleton(bones: &[Bone], options: &SkeletonOptions) -> Result<Skeleton> {
    let mut skeleton = Skeleton::default();
    // composed transforms before scaling and axis correction, by name
    let mut raw = Vec::new();

    let mut pending = Vec::new();
    for bone in bones {
        if bone.parent_name.is_none() {
            let local = local_transform(bone);
            raw.push(local);
            skeleton.bones.push(SkeletonBone {
                name: bone.name.clone(),
                flag: bone.flag,
                parent: None,
                children: Vec::new(),
                local,
                world: corrected(local, options.scale),
            });
        } else {
            pending.push(bone);
        }
    }

    // one pass per remaining bone is the worst case (a fully reversed
    // table attaches exactly one bone per pass)
    let max_passes = pending.len();
    for _ in 0..=max_passes {
        if pending.is_empty() {
            break;
        }
        let mut still_pending = Vec::new();
        let mut attached = 0usize;
        for bone in pending {
            let parent_name = bone.parent_name.as_deref().unwrap_or_default();
            match skeleton.index_of(parent_name) {
                Some(parent) => {
                    let local = local_transform(bone);
                    let composed = raw[parent] * local;
                    raw.push(composed);
                    let index = skeleton.bones.len();
                    skeleton.bones.push(SkeletonBone {
                        name: bone.name.clone(),
                        flag: bone.flag,
                        parent: Some(parent),
                        children: Vec::new(),
                        local,
                        world: corrected(composed, options.scale),
                    });
                    skeleton.bones[parent].children.push(index);
                    attached += 1;
                }
                None => still_pending.push(bone),
            }
        }
        if attached == 0 {
            // nothing can attach anymore; the first leftover names the cycle
            let bone = still_pending[0];
            return Err(Error::DanglingBone {
                bone: bone.name.clone(),
                parent: bone.parent_name.clone().unwrap_or_default(),
            });
        }
        pending = still_pending;
    }

    Ok(skeleton)
}

fn local_transform(bone: &Bone) -> Mat4 {
    let [x, y, z, w] = bone.rotation;
    Mat4::from_translation(Vec3::from_array(bone.position)) * Mat4::from_quat(Quat::from_xyzw(x, y, z, w))
}

/// Apply the unit scale and the engine-to-target axis correction to a
/// composed transform. The engine is left-handed Y-up; the correction is
/// a constant mirror-and-rotation pair applied once per composed result,
/// never per ancestor step.
fn corrected(composed: Mat4, scale: f32) -> Mat4 {
    let mut m = composed;
    let t = m.w_axis.truncate() * scale;
    m.w_axis = t.extend(1.0);
    let pre = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)) * Mat4::from_rotation_x(FRAC_PI_2);
    let post = Mat4::from_rotation_z(FRAC_PI_2);
    pre * m * post
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bone(name: &str, parent: Option<&str>, position: [f32; 3]) -> Bone {
        Bone {
            name: name.to_string(),
            flag: 0,
            parent_index: -1,
            parent_name: parent.map(str::to_string),
            position,
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: None,
        }
    }

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn builds_parent_child_links() {
        let bones = vec![
            bone("Bip01", None, [0.0, 0.9, 0.0]),
            bone("Bip01 Spine", Some("Bip01"), [0.0, 0.1, 0.0]),
            bone("Bip01 Head", Some("Bip01 Spine"), [0.0, 0.4, 0.0]),
        ];
        let skeleton = build_skeleton(&bones, &SkeletonOptions::default()).unwrap();

        assert_eq!(skeleton.bones.len(), 3);
        let head = skeleton.bone("Bip01 Head").unwrap();
        assert_eq!(head.parent, skeleton.index_of("Bip01 Spine"));
        assert_eq!(skeleton.roots().count(), 1);
    }

    #[test]
    fn forward_references_resolve() {
        // children listed before their parents
        let bones = vec![
            bone("Bip01 Head", Some("Bip01 Spine"), [0.0, 0.4, 0.0]),
            bone("Bip01 Spine", Some("Bip01"), [0.0, 0.1, 0.0]),
            bone("Bip01", None, [0.0, 0.9, 0.0]),
        ];
        let skeleton = build_skeleton(&bones, &SkeletonOptions::default()).unwrap();
        let head = skeleton.bone("Bip01 Head").unwrap();
        assert_eq!(
            head.parent.map(|p| skeleton.bones[p].name.clone()),
            Some("Bip01 Spine".to_string())
        );
    }

    #[test]
    fn reversed_table_builds_an_identical_tree() {
        let forward = vec![
            bone("root", None, [0.0, 1.0, 0.0]),
            bone("spine", Some("root"), [0.0, 0.2, 0.0]),
            bone("arm_L", Some("spine"), [0.1, 0.1, 0.0]),
            bone("hand_L", Some("arm_L"), [0.2, 0.0, 0.0]),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = build_skeleton(&forward, &SkeletonOptions::default()).unwrap();
        let b = build_skeleton(&reversed, &SkeletonOptions::default()).unwrap();

        for bone_a in &a.bones {
            let bone_b = b.bone(&bone_a.name).unwrap();
            let parent_a = bone_a.parent.map(|p| a.bones[p].name.clone());
            let parent_b = bone_b.parent.map(|p| b.bones[p].name.clone());
            assert_eq!(parent_a, parent_b);
            assert_mat_eq(bone_a.world, bone_b.world);
        }
    }

    #[test]
    fn dangling_parent_fails_within_bounded_passes() {
        let bones = vec![
            bone("root", None, [0.0, 0.0, 0.0]),
            bone("a", Some("root"), [0.0, 0.1, 0.0]),
            bone("b", Some("a"), [0.0, 0.1, 0.0]),
            bone("orphan", Some("does_not_exist"), [0.0, 0.1, 0.0]),
            bone("c", Some("b"), [0.0, 0.1, 0.0]),
        ];
        match build_skeleton(&bones, &SkeletonOptions::default()) {
            Err(Error::DanglingBone { bone, parent }) => {
                assert_eq!(bone, "orphan");
                assert_eq!(parent, "does_not_exist");
            }
            other => panic!("expected DanglingBone, got {other:?}"),
        }
    }

    #[test]
    fn world_translation_is_scaled_and_axis_corrected() {
        let bones = vec![bone("root", None, [1.0, 2.0, 3.0])];
        let skeleton = build_skeleton(&bones, &SkeletonOptions { scale: 2.0 }).unwrap();

        // scale doubles (1,2,3); rot_x(90) sends (x,y,z) to (x,-z,y);
        // the X mirror flips the first component
        let t = skeleton.bones[0].world.w_axis.truncate();
        assert!((t.x - -2.0).abs() < 1e-5);
        assert!((t.y - -6.0).abs() < 1e-5);
        assert!((t.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn world_composes_ancestor_chain() {
        let bones = vec![
            bone("root", None, [0.0, 1.0, 0.0]),
            bone("tip", Some("root"), [0.0, 0.5, 0.0]),
        ];
        let skeleton = build_skeleton(&bones, &SkeletonOptions::default()).unwrap();
        let t = skeleton.bone("tip").unwrap().world.w_axis.truncate();
        // composed engine-space translation (0, 1.5, 0) maps to (0, 0, 1.5)
        assert!((t.x).abs() < 1e-5);
        assert!((t.y).abs() < 1e-5);
        assert!((t.z - 1.5).abs() < 1e-5);
    }

    #[test]
    fn pruning_keeps_weighted_bones_and_reparents() {
        let bones = vec![
            bone("root", None, [0.0, 1.0, 0.0]),
            bone("waypoint", Some("root"), [0.0, 0.2, 0.0]),
            bone("leaf", Some("waypoint"), [0.0, 0.3, 0.0]),
        ];
        let skeleton = build_skeleton(&bones, &SkeletonOptions::default()).unwrap();
        let leaf_world = skeleton.bone("leaf").unwrap().world;

        let skin = vec![
            SkinBone {
                name: "root".to_string(),
                bind_matrix: [[0.0; 4]; 4],
            },
            SkinBone {
                name: "leaf".to_string(),
                bind_matrix: [[0.0; 4]; 4],
            },
        ];
        let pruned = skeleton.pruned(&skin);

        assert_eq!(pruned.bones.len(), 2);
        assert!(pruned.bone("waypoint").is_none());
        let leaf = pruned.bone("leaf").unwrap();
        // reparented to the waypoint's parent; world fixed at build time
        assert_eq!(
            leaf.parent.map(|p| pruned.bones[p].name.clone()),
            Some("root".to_string())
        );
        assert_mat_eq(leaf.world, leaf_world);
        assert_eq!(
            pruned.bone("root").unwrap().children,
            vec![pruned.index_of("leaf").unwrap()]
        );
    }
}
