use crate::light::Light;
use crate::procedural::PointCloud;
use crate::scene::object::{Geometry, Object, PointGeometry, PointsMaterial, StandardMaterial};
use glamx::{Mat4, Quat, Vec3};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

/// The data contained by a `SceneNode`.
pub struct SceneNodeData {
    name: Option<String>,
    position: Vec3,
    rotation: Vec3,
    visible: bool,
    object: Option<Object>,
    light: Option<Light>,
    children: Vec<SceneNode>,
    parent: Option<Weak<RefCell<SceneNodeData>>>,
}

/// A node of the scene graph.
///
/// This may represent a group of other nodes, and/or contain an object that can be rendered,
/// and/or a light. Cloning a `SceneNode` clones the handle, not the node.
#[derive(Clone)]
pub struct SceneNode {
    data: Rc<RefCell<SceneNodeData>>,
}

impl SceneNodeData {
    fn remove(&mut self, o: &SceneNode) {
        if let Some(i) = self
            .children
            .iter()
            .rposition(|e| Rc::ptr_eq(&o.data, &e.data))
        {
            let _ = self.children.remove(i);
        }
    }

    /// Whether this node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node contains an `Object`.
    #[inline]
    pub fn has_object(&self) -> bool {
        self.object.is_some()
    }

    /// The object held by this node, if any.
    #[inline]
    pub fn object(&self) -> Option<&Object> {
        self.object.as_ref()
    }

    /// The light held by this node, if any.
    #[inline]
    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    /// The children of this node.
    #[inline]
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// The transform from this node's space to its parent's: translation, then the
    /// `X`, `Y`, `Z` rotations (applied to points in reverse order).
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(euler_xyz(self.rotation), self.position)
    }
}

/// The rotation of intrinsic Euler angles in `X`, `Y`, `Z` order.
pub fn euler_xyz(angles: Vec3) -> Quat {
    Quat::from_rotation_x(angles.x) * Quat::from_rotation_y(angles.y) * Quat::from_rotation_z(angles.z)
}

impl SceneNode {
    fn new(object: Option<Object>, light: Option<Light>) -> SceneNode {
        let data = SceneNodeData {
            name: None,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            visible: true,
            object,
            light,
            children: Vec::new(),
            parent: None,
        };

        SceneNode {
            data: Rc::new(RefCell::new(data)),
        }
    }

    /// Creates a node without object, light or children.
    pub fn empty() -> SceneNode {
        SceneNode::new(None, None)
    }

    /// Returns a reference to this node's internal data.
    pub fn data(&self) -> Ref<'_, SceneNodeData> {
        self.data.borrow()
    }

    /// Returns a mutable reference to this node's internal data.
    pub fn data_mut(&mut self) -> RefMut<'_, SceneNodeData> {
        self.data.borrow_mut()
    }

    /// Whether both handles point to the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &SceneNode) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /*
     *
     * Methods to add objects.
     *
     */
    /// Adds an empty group node as a child of this node.
    pub fn add_group(&mut self) -> SceneNode {
        let node = SceneNode::empty();
        self.add_child(node.clone());
        node
    }

    /// Adds a node as a child of this node.
    ///
    /// # Panics
    /// If `node` already has a parent.
    pub fn add_child(&mut self, node: SceneNode) {
        assert!(
            node.data().is_root(),
            "The added node must not have a parent yet."
        );

        let mut node = node;
        node.data_mut().parent = Some(Rc::downgrade(&self.data));
        self.data_mut().children.push(node)
    }

    /// Adds a triangle mesh drawn with `material` as a child of this node.
    pub fn add_mesh(&mut self, geometry: Rc<Geometry>, material: StandardMaterial) -> SceneNode {
        let node = SceneNode::new(Some(Object::Mesh { geometry, material }), None);
        self.add_child(node.clone());
        node
    }

    /// Adds a point cloud drawn with `material` as a child of this node.
    pub fn add_points(&mut self, cloud: PointCloud, material: PointsMaterial) -> SceneNode {
        let geometry = PointGeometry::new(cloud);
        let node = SceneNode::new(Some(Object::Points { geometry, material }), None);
        self.add_child(node.clone());
        node
    }

    /// Adds a light as a child of this node.
    ///
    /// Point lights are placed by the position of the returned node.
    pub fn add_light(&mut self, light: Light) -> SceneNode {
        let node = SceneNode::new(None, Some(light));
        self.add_child(node.clone());
        node
    }

    /// Detaches this node from its parent.
    pub fn detach(&mut self) {
        let parent = self.data_mut().parent.take();

        if let Some(parent) = parent.and_then(|p| p.upgrade()) {
            parent.borrow_mut().remove(self);
        }
    }

    /*
     *
     * Accessors.
     *
     */
    /// The number of direct children of this node.
    #[inline]
    pub fn num_children(&self) -> usize {
        self.data().children.len()
    }

    /// Handles to the direct children of this node.
    pub fn children(&self) -> Vec<SceneNode> {
        self.data().children.clone()
    }

    /// The name of this node.
    pub fn name(&self) -> Option<String> {
        self.data().name.clone()
    }

    /// Sets the name of this node.
    pub fn set_name(&mut self, name: impl Into<String>) -> Self {
        self.data_mut().name = Some(name.into());
        self.clone()
    }

    /// Finds the first node named `name` in the subtree rooted by this node, depth first.
    pub fn find_by_name(&self, name: &str) -> Option<SceneNode> {
        if self.data().name.as_deref() == Some(name) {
            return Some(self.clone());
        }

        self.data()
            .children
            .iter()
            .find_map(|c| c.find_by_name(name))
    }

    /// Whether this node holds a drawable object.
    #[inline]
    pub fn has_object(&self) -> bool {
        self.data().has_object()
    }

    /// The object held by this node, if any.
    pub fn object(&self) -> Option<Ref<'_, Object>> {
        Ref::filter_map(self.data(), |d| d.object.as_ref()).ok()
    }

    /// The light held by this node, if any.
    pub fn light(&self) -> Option<Light> {
        self.data().light.clone()
    }

    /// Sets whether this node and its children are drawn.
    pub fn set_visible(&mut self, visible: bool) -> Self {
        self.data_mut().visible = visible;
        self.clone()
    }

    /// This node's position relative to its parent.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.data().position
    }

    /// Sets this node's position relative to its parent.
    pub fn set_position(&mut self, t: Vec3) -> Self {
        self.data_mut().position = t;
        self.clone()
    }

    /// This node's rotation relative to its parent, as `X`, `Y`, `Z` Euler angles in radians.
    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.data().rotation
    }

    /// Sets this node's rotation relative to its parent, as `X`, `Y`, `Z` Euler angles in
    /// radians.
    pub fn set_rotation(&mut self, angles: Vec3) -> Self {
        self.data_mut().rotation = angles;
        self.clone()
    }

    /// The transform from this node's space to its parent's.
    #[inline]
    pub fn local_transform(&self) -> Mat4 {
        self.data().local_transform()
    }

    /// The transform from this node's space to the root's.
    pub fn world_transform(&self) -> Mat4 {
        let local = self.local_transform();
        let parent = self.data().parent.as_ref().and_then(Weak::upgrade);

        match parent {
            Some(parent) => SceneNode { data: parent }.world_transform() * local,
            None => local,
        }
    }

    /// Calls `f` on every visible node of the subtree rooted by this node, with the
    /// node's transform relative to this node's parent.
    pub fn traverse(&self, f: &mut dyn FnMut(&SceneNodeData, Mat4)) {
        self.do_traverse(Mat4::IDENTITY, f)
    }

    fn do_traverse(&self, parent: Mat4, f: &mut dyn FnMut(&SceneNodeData, Mat4)) {
        let data = self.data();
        if !data.visible {
            return;
        }

        let world = parent * data.local_transform();
        f(&data, world);

        for child in &data.children {
            child.do_traverse(world, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn children_know_their_parent() {
        let mut root = SceneNode::empty();
        let mut child = root.add_group();
        let grandchild = child.add_group();

        assert!(root.data().is_root());
        assert!(!grandchild.data().is_root());
        assert_eq!(root.num_children(), 1);

        child.detach();
        assert_eq!(root.num_children(), 0);
        assert!(child.data().is_root());
    }

    #[test]
    fn world_transform_composes_parents() {
        let mut root = SceneNode::empty();
        let mut group = root.add_group().set_position(Vec3::new(1.0, 0.0, 0.0));
        group.set_rotation(Vec3::new(0.0, 0.0, FRAC_PI_2));
        let leaf = group.add_group().set_position(Vec3::new(1.0, 0.0, 0.0));

        let p = leaf.world_transform().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1.0e-6));
    }

    #[test]
    fn euler_order_is_xyz() {
        let q = euler_xyz(Vec3::new(FRAC_PI_2, FRAC_PI_2, 0.0));
        // The Y rotation applies first: X goes to -Z, then the X rotation sends -Z to Y.
        assert!((q * Vec3::X).abs_diff_eq(Vec3::Y, 1.0e-6));
    }

    #[test]
    fn rotation_is_stored_as_given() {
        let mut node = SceneNode::empty();
        node.set_rotation(Vec3::new(5.0, 5.0, 0.0));
        assert_eq!(node.rotation(), Vec3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn traverse_skips_hidden_subtrees() {
        let mut root = SceneNode::empty();
        let geometry = Geometry::new(procedural::unit_cuboid());
        root.add_mesh(geometry.clone(), StandardMaterial::default());
        let mut hidden = root.add_group().set_visible(false);
        hidden.add_mesh(geometry, StandardMaterial::default());

        let mut drawn = 0;
        root.traverse(&mut |data, _| drawn += data.has_object() as usize);
        assert_eq!(drawn, 1);
    }

    #[test]
    fn find_by_name_searches_depth_first() {
        let mut root = SceneNode::empty();
        let mut group = root.add_group();
        group.add_light(Light::point()).set_name("bulb");

        let found = root.find_by_name("bulb").unwrap();
        assert!(found.light().is_some());
        assert!(root.find_by_name("missing").is_none());
    }
}
