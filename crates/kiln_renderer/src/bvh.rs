//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to each other and to the shared
//! objects by index. The tree is built once and only read afterwards.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use kiln_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

/// Child slot of a node: another node or one of the wrapped objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    Node(u32),
    Object(u32),
}

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bbox: Aabb,
    left: Child,
    right: Child,
}

/// Binary BVH over shared hittables.
///
/// Each level splits on an axis picked at random, ordering objects by the
/// minimum of their bounding boxes on that axis and halving at the median.
/// A single object fills both child slots of its node.
pub struct Bvh {
    nodes: Vec<BvhNode>,
    objects: Vec<Arc<dyn Hittable>>,
    root: Option<u32>,
}

impl Bvh {
    /// Build a BVH over `objects`, drawing split axes from `rng`.
    pub fn new(objects: Vec<Arc<dyn Hittable>>, rng: &mut dyn RngCore) -> Self {
        let mut bvh = Self {
            nodes: Vec::with_capacity(objects.len()),
            objects,
            root: None,
        };

        if !bvh.objects.is_empty() {
            let mut order: Vec<u32> = (0..bvh.objects.len() as u32).collect();
            bvh.root = Some(bvh.build(&mut order, rng));
        }

        log::info!(
            "Built BVH over {} objects ({} nodes)",
            bvh.objects.len(),
            bvh.nodes.len()
        );
        bvh
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest node, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.node_depth(root))
    }

    fn node_depth(&self, index: u32) -> usize {
        let node = &self.nodes[index as usize];
        let child_depth = |child: Child| match child {
            Child::Node(i) => self.node_depth(i),
            Child::Object(_) => 0,
        };
        1 + child_depth(node.left).max(child_depth(node.right))
    }

    /// Recursively build the subtree over `span`, returning its node index.
    fn build(&mut self, span: &mut [u32], rng: &mut dyn RngCore) -> u32 {
        let axis = rng.gen_range(0..3);

        let (left, right) = match span.len() {
            1 => (Child::Object(span[0]), Child::Object(span[0])),
            2 => {
                let (a, b) = (span[0], span[1]);
                if self.box_compare(a, b, axis) == Ordering::Less {
                    (Child::Object(a), Child::Object(b))
                } else {
                    (Child::Object(b), Child::Object(a))
                }
            }
            _ => {
                span.sort_by(|&a, &b| self.box_compare(a, b, axis));
                let (lower, upper) = span.split_at_mut(span.len() / 2);
                let left = self.build(lower, rng);
                let right = self.build(upper, rng);
                (Child::Node(left), Child::Node(right))
            }
        };

        let bbox = Aabb::surrounding(&self.child_box(left), &self.child_box(right));
        self.nodes.push(BvhNode { bbox, left, right });
        (self.nodes.len() - 1) as u32
    }

    fn box_compare(&self, a: u32, b: u32, axis: usize) -> Ordering {
        let a_min = self.objects[a as usize].bounding_box().axis_interval(axis).min;
        let b_min = self.objects[b as usize].bounding_box().axis_interval(axis).min;
        a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
    }

    fn child_box(&self, child: Child) -> Aabb {
        match child {
            Child::Node(i) => self.nodes[i as usize].bbox,
            Child::Object(i) => self.objects[i as usize].bounding_box(),
        }
    }

    fn hit_child<'a>(
        &'a self,
        child: Child,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match child {
            Child::Node(i) => self.hit_node(i, ray, ray_t, rng),
            Child::Object(i) => self.objects[i as usize].hit(ray, ray_t, rng),
        }
    }

    fn hit_node<'a>(
        &'a self,
        index: u32,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let node = &self.nodes[index as usize];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        let left = self.hit_child(node.left, ray, ray_t, rng);

        // Only check right up to closest hit
        let right_max = left.map_or(ray_t.max, |rec| rec.t);
        let right = self.hit_child(node.right, ray, ray_t.with_max(right_max), rng);

        right.or(left)
    }
}

impl Hittable for Bvh {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let root = self.root?;
        self.hit_node(root, ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Aabb {
        self.root
            .map_or(Aabb::EMPTY, |root| self.nodes[root as usize].bbox)
    }
}
