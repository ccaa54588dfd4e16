use super::constraint::JointConstraint;
use crate::math::{heading, polar, Vec2};
use thiserror::Error;

/// Handle of a segment inside its [`Skeleton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(usize);

impl SegmentId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One rigid link. Its pose is derived from the parent on every update.
#[derive(Debug, Clone)]
pub struct Segment {
    pub position: Vec2,
    pub size: f32,
    pub rel_angle: f32,
    pub abs_angle: f32,
    pub joint: JointConstraint,
    parent: Option<SegmentId>,
    children: Vec<SegmentId>,
}

impl Segment {
    pub fn parent(&self) -> Option<SegmentId> {
        self.parent
    }

    pub fn children(&self) -> &[SegmentId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructureError {
    #[error("segment {0:?} has no parent but is not the root")]
    DetachedSegment(SegmentId),
    #[error("segment {child:?} points at missing parent {parent:?}")]
    MissingParent { child: SegmentId, parent: SegmentId },
    #[error("segment {child:?} is not listed among the children of {parent:?}")]
    NotAChild { child: SegmentId, parent: SegmentId },
    #[error("parent chain of {0:?} does not reach the root")]
    Cycle(SegmentId),
}

/// Arena-backed tree of segments. Index 0 is the root.
///
/// Children are always pushed after their parent, so arena order is a
/// valid parent-before-child order, but every walk below uses an explicit
/// stack so the order is depth-first pre-order regardless.
#[derive(Debug, Clone)]
pub struct Skeleton {
    segments: Vec<Segment>,
}

impl Skeleton {
    pub fn new(position: Vec2, angle: f32) -> Self {
        let root = Segment {
            position,
            size: 0.0,
            rel_angle: 0.0,
            abs_angle: angle,
            joint: JointConstraint::free(0.0),
            parent: None,
            children: Vec::new(),
        };
        Self {
            segments: vec![root],
        }
    }

    pub const ROOT: SegmentId = SegmentId(0);

    pub fn root(&self) -> &Segment {
        &self.segments[0]
    }

    pub fn root_mut(&mut self) -> &mut Segment {
        &mut self.segments[0]
    }

    pub fn get(&self, id: SegmentId) -> &Segment {
        &self.segments[id.0]
    }

    pub fn get_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id.0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SegmentId> {
        (0..self.segments.len()).map(SegmentId)
    }

    /// Attaches a new link under `parent`, posed at its rest angle.
    pub fn add(&mut self, parent: SegmentId, size: f32, joint: JointConstraint) -> SegmentId {
        let id = SegmentId(self.segments.len());
        let (parent_position, parent_angle) = {
            let p = self.get(parent);
            (p.position, p.abs_angle)
        };
        self.segments.push(Segment {
            position: parent_position,
            size,
            rel_angle: joint.default_angle,
            abs_angle: parent_angle + joint.default_angle,
            joint,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.get_mut(parent).children.push(id);
        self.update_relative(id, false, true);
        id
    }

    /// `id` followed by all of its descendants, depth-first, parents first.
    pub fn subtree(&self, id: SegmentId) -> Vec<SegmentId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.get(current).children.iter().rev().copied());
        }
        order
    }

    /// Re-derives the pose of `id` from its relative angle.
    ///
    /// The relative angle is first wrapped around the rest angle; with
    /// `flex` it is also relaxed and clamped by the joint constraint.
    pub fn update_relative(&mut self, id: SegmentId, iterate: bool, flex: bool) {
        let order = if iterate { self.subtree(id) } else { vec![id] };
        for current in order {
            self.pose_from_relative(current, flex);
        }
    }

    fn pose_from_relative(&mut self, id: SegmentId, flex: bool) {
        let Some(parent) = self.get(id).parent else {
            return;
        };
        let (parent_position, parent_angle) = {
            let p = self.get(parent);
            (p.position, p.abs_angle)
        };
        let segment = self.get_mut(id);
        segment.rel_angle = if flex {
            segment.joint.apply(segment.rel_angle)
        } else {
            segment.joint.wrap(segment.rel_angle)
        };
        segment.abs_angle = parent_angle + segment.rel_angle;
        segment.position = parent_position + polar(segment.abs_angle, segment.size);
    }

    /// Drags `id` to stay `size` away from its parent along the current
    /// displacement, then lets the joint spring relax.
    pub fn follow(&mut self, id: SegmentId, iterate: bool, flex: bool) {
        let order = if iterate { self.subtree(id) } else { vec![id] };
        for current in order {
            self.follow_one(current, flex);
        }
    }

    /// Propagates [`Skeleton::follow`] to every child of `id`.
    pub fn follow_children(&mut self, id: SegmentId, flex: bool) {
        let children = self.get(id).children.clone();
        for child in children {
            self.follow(child, true, flex);
        }
    }

    fn follow_one(&mut self, id: SegmentId, flex: bool) {
        let Some(parent) = self.get(id).parent else {
            return;
        };
        let (parent_position, parent_angle) = {
            let p = self.get(parent);
            (p.position, p.abs_angle)
        };
        let segment = self.get_mut(id);
        if let Some(angle) = heading(parent_position, segment.position) {
            segment.abs_angle = angle;
        }
        segment.rel_angle = segment.abs_angle - parent_angle;
        self.pose_from_relative(id, flex);
    }

    /// Sets the absolute pose of `id` from a solved position, keeping the
    /// previous angle when the position coincides with the parent.
    pub fn orient_towards(&mut self, id: SegmentId, position: Vec2) {
        let Some(parent) = self.get(id).parent else {
            self.get_mut(id).position = position;
            return;
        };
        let (parent_position, parent_angle) = {
            let p = self.get(parent);
            (p.position, p.abs_angle)
        };
        let segment = self.get_mut(id);
        if let Some(angle) = heading(parent_position, position) {
            segment.abs_angle = angle;
        }
        segment.rel_angle = segment.abs_angle - parent_angle;
        segment.position = parent_position + polar(segment.abs_angle, segment.size);
    }

    /// Largest deviation from the rod-rigidity invariant over all links.
    pub fn rigidity_error(&self) -> f32 {
        self.segments
            .iter()
            .filter_map(|s| {
                let parent = self.get(s.parent?);
                let expected = parent.position + polar(s.abs_angle, s.size);
                Some(expected.distance(s.position))
            })
            .fold(0.0, f32::max)
    }

    /// Checks that every segment's parent chain ends at the single root and
    /// that parent and child links agree.
    pub fn validate(&self) -> Result<(), StructureError> {
        for id in self.ids().skip(1) {
            let Some(parent) = self.get(id).parent else {
                return Err(StructureError::DetachedSegment(id));
            };
            if parent.0 >= self.segments.len() {
                return Err(StructureError::MissingParent { child: id, parent });
            }
            if !self.get(parent).children.contains(&id) {
                return Err(StructureError::NotAChild { child: id, parent });
            }

            let mut cursor = parent;
            let mut steps = 0;
            while let Some(next) = self.get(cursor).parent {
                steps += 1;
                if steps > self.segments.len() || next.0 >= self.segments.len() {
                    return Err(StructureError::Cycle(id));
                }
                cursor = next;
            }
            if cursor != Self::ROOT {
                return Err(StructureError::Cycle(id));
            }
        }
        if self.root().parent.is_some() {
            return Err(StructureError::Cycle(Self::ROOT));
        }
        Ok(())
    }
}
