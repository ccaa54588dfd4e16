use crate::math::{direction, heading, wrap_to_pi, Vec2};

/// A chain node. `size` is the body radius drawn around the node, not a
/// link length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainNode {
    pub position: Vec2,
    pub size: f32,
}

/// Non-branching chain whose head eases toward a target and whose other
/// nodes are dragged along at fixed link distances.
#[derive(Debug, Clone)]
pub struct Chain {
    pub(crate) nodes: Vec<ChainNode>,
    pub(crate) link_lengths: Vec<f32>,
    pub(crate) smoothing: f32,
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn nodes(&self) -> &[ChainNode] {
        &self.nodes
    }

    pub fn link_lengths(&self) -> &[f32] {
        &self.link_lengths
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn head(&self) -> Option<Vec2> {
        self.nodes.first().map(|n| n.position)
    }

    /// Eases the head toward `target` and re-snaps every link.
    pub fn follow(&mut self, target: Vec2) {
        let smoothing = self.smoothing;
        let Some(head) = self.nodes.first_mut() else {
            return;
        };
        let gap = target - head.position;
        head.position += gap * smoothing;
        self.constrain();
    }

    fn constrain(&mut self) {
        for i in 1..self.nodes.len() {
            let prev = self.nodes[i - 1].position;
            let link = self.link_lengths[i - 1];
            let node = &mut self.nodes[i];
            if let Some(dir) = direction(prev, node.position) {
                node.position = prev + dir * link;
            }
        }
    }

    /// Sum of the turn angles between consecutive links.
    pub fn curvature(&self) -> f32 {
        let headings: Vec<f32> = self
            .nodes
            .windows(2)
            .filter_map(|w| heading(w[0].position, w[1].position))
            .collect();
        headings
            .windows(2)
            .map(|w| wrap_to_pi(w[1] - w[0]))
            .sum()
    }
}

pub struct ChainBuilder {
    nodes: Vec<ChainNode>,
    link_lengths: Vec<f32>,
    default_link: f32,
    smoothing: f32,
    origin: Vec2,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            link_lengths: Vec::new(),
            default_link: 25.0,
            smoothing: 0.15,
            origin: Vec2::ZERO,
        }
    }

    /// Head position; later nodes are laid out along −x from it.
    pub fn origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn link_length(mut self, link: f32) -> Self {
        self.default_link = link;
        self
    }

    pub fn smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 1.0);
        self
    }

    pub fn add_node(self, size: f32) -> Self {
        let link = self.default_link;
        self.add_node_with_link(size, link)
    }

    /// Adds a node whose link to the previous node is `link` long.
    pub fn add_node_with_link(mut self, size: f32, link: f32) -> Self {
        if !self.nodes.is_empty() {
            self.link_lengths.push(link.max(0.0));
        }
        self.nodes.push(ChainNode {
            position: Vec2::ZERO,
            size,
        });
        self
    }

    pub fn build(mut self) -> Chain {
        let mut position = self.origin;
        for (i, node) in self.nodes.iter_mut().enumerate() {
            if i > 0 {
                position.x -= self.link_lengths[i - 1];
            }
            node.position = position;
        }
        Chain {
            nodes: self.nodes,
            link_lengths: self.link_lengths,
            smoothing: self.smoothing,
        }
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
