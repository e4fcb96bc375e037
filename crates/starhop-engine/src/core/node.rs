use glam::Vec2;
use crate::api::types::NodeId;
use crate::components::color::Color;
use crate::components::emitter::{EmitterConfig, ParticleEmitter};
use crate::components::graphics::Graphics;
use crate::components::sprite::{ImageSprite, TextLabel};

/// What a node draws.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Grouping node; draws its children in depth order.
    Container,
    /// Filled circle centred on the node position.
    Circle { radius: f32, color: Color },
    Graphics(Graphics),
    Emitter(ParticleEmitter),
    Text(TextLabel),
    Image(ImageSprite),
}

/// Fat node: transform + display state + one drawable kind.
/// Hierarchy is kept by the `Stage`; `parent`/`children` are read-only views.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Free-form tag for lookups and debugging.
    pub tag: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Position relative to the parent (or stage root).
    pub pos: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    pub scale: Vec2,
    /// Draw order among siblings; higher draws later (on top).
    pub depth: f32,
    pub alpha: f32,
    pub visible: bool,
    /// Multiplicative tint applied to whatever the node draws.
    pub tint: Option<Color>,
    pub kind: NodeKind,
}

impl Node {
    /// New node at the origin. The id is assigned by `Stage::add`.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId(0),
            tag: String::new(),
            parent: None,
            children: Vec::new(),
            pos: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            depth: 0.0,
            alpha: 1.0,
            visible: true,
            tint: None,
            kind,
        }
    }

    pub fn container() -> Self {
        Self::new(NodeKind::Container)
    }

    pub fn circle(radius: f32, color: Color) -> Self {
        Self::new(NodeKind::Circle { radius, color })
    }

    pub fn graphics() -> Self {
        Self::new(NodeKind::Graphics(Graphics::new()))
    }

    pub fn emitter(config: EmitterConfig) -> Self {
        Self::new(NodeKind::Emitter(ParticleEmitter::new(config)))
    }

    pub fn text(label: TextLabel) -> Self {
        Self::new(NodeKind::Text(label))
    }

    pub fn image(sprite: ImageSprite) -> Self {
        Self::new(NodeKind::Image(sprite))
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec2::splat(scale);
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = Some(tint);
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container)
    }

    /// Capture the state an overlay must put back after borrowing the node.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            parent: self.parent,
            pos: self.pos,
            scale: self.scale,
            depth: self.depth,
            alpha: self.alpha,
            visible: self.visible,
        }
    }
}

/// Restorable placement of a node: where it hangs and how it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSnapshot {
    pub parent: Option<NodeId>,
    pub pos: Vec2,
    pub scale: Vec2,
    pub depth: f32,
    pub alpha: f32,
    pub visible: bool,
}

/// Accumulated transform of a node through its ancestors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub pos: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub alpha: f32,
}

impl WorldTransform {
    pub const IDENTITY: Self = Self {
        pos: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::ONE,
        alpha: 1.0,
    };

    /// Compose a child's local transform onto this (parent) transform.
    pub fn then(&self, pos: Vec2, rotation: f32, scale: Vec2, alpha: f32) -> Self {
        let (sin_r, cos_r) = self.rotation.sin_cos();
        let rotated = Vec2::new(pos.x * cos_r - pos.y * sin_r, pos.x * sin_r + pos.y * cos_r);
        Self {
            pos: self.pos + rotated * self.scale,
            rotation: self.rotation + rotation,
            scale: self.scale * scale,
            alpha: self.alpha * alpha,
        }
    }

    /// Map a point from the node's local space into world space.
    pub fn apply(&self, local: Vec2) -> Vec2 {
        let (sin_r, cos_r) = self.rotation.sin_cos();
        let rotated = Vec2::new(local.x * cos_r - local.y * sin_r, local.x * sin_r + local.y * cos_r);
        self.pos + rotated * self.scale
    }
}
