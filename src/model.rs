use crate::mesh::{ImportedGeometry, Mesh, MeshBounds, PointCloud};
use glam::{Mat4, Quat, Vec3};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Local point that rotation and scale happen around; it lands on `translation`.
    pub pivot: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, pivot: Vec3::ZERO, rotation: Vec3::ZERO, scale: 1.0 }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.translation)
            * Mat4::from_translation(-self.pivot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// 0xRRGGBB
    pub color: u32,
    pub emissive: u32,
    pub emissive_intensity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { color: 0xffffff, emissive: 0x000000, emissive_intensity: 0.0 }
    }
}

#[derive(Debug, Clone)]
pub enum Geometry {
    Mesh { mesh: Arc<Mesh>, material: Material },
    Points(PointCloud),
}

impl Geometry {
    pub fn bounds(&self) -> Option<MeshBounds> {
        match self {
            Geometry::Mesh { mesh, .. } => mesh.bounds,
            Geometry::Points(cloud) => cloud.bounds(),
        }
    }
}

impl From<ImportedGeometry> for Geometry {
    fn from(imported: ImportedGeometry) -> Self {
        match imported {
            ImportedGeometry::Mesh(mesh) => Geometry::Mesh { mesh: Arc::new(mesh), material: Material::default() },
            ImportedGeometry::Points(cloud) => Geometry::Points(cloud),
        }
    }
}

/// A renderable node as handed to the scene container.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub geometry: Geometry,
    pub transform: Transform,
    pub opacity: f32,
    pub visible: bool,
}

impl Model {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self { name: name.into(), geometry, transform: Transform::default(), opacity: 1.0, visible: true }
    }

    /// Placeholder sphere for a stage whose sources could not be loaded.
    pub fn placeholder_sphere(name: impl Into<String>, color: u32) -> Self {
        let material = Material { color, emissive: color, emissive_intensity: 0.4 };
        Self::new(name, Geometry::Mesh { mesh: Arc::new(Mesh::uv_sphere(1.0, 64, 64)), material })
    }

    pub fn local_bounds(&self) -> Option<MeshBounds> {
        self.geometry.bounds()
    }

    /// Centres the geometry on the origin and scales it so the bounding diagonal equals
    /// `display_size`. Returns `false` when the geometry has no extent; the model is then
    /// scaled by `display_size` directly.
    pub fn fit_to(&mut self, display_size: f32) -> bool {
        match self.local_bounds() {
            Some(bounds) if bounds.diagonal() > 0.0 => {
                let scale = display_size / bounds.diagonal();
                self.transform.scale = scale;
                self.transform.pivot = bounds.center;
                self.transform.translation = Vec3::ZERO;
                true
            }
            _ => {
                self.transform.scale = display_size;
                false
            }
        }
    }

    pub fn set_shown(&mut self, shown: bool) {
        self.visible = shown;
        self.opacity = if shown { 1.0 } else { 0.0 };
    }
}

/// Shared handle to a model. Cloning shares the same node; identity is pointer identity.
#[derive(Clone)]
pub struct ModelHandle(Rc<RefCell<Model>>);

impl ModelHandle {
    pub fn new(model: Model) -> Self {
        Self(Rc::new(RefCell::new(model)))
    }

    pub fn borrow(&self) -> Ref<'_, Model> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Model> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &ModelHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn rotation(&self) -> Vec3 {
        self.0.borrow().transform.rotation
    }

    pub fn rotate_by(&self, delta: Vec3) {
        self.0.borrow_mut().transform.rotation += delta;
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.0.borrow();
        f.debug_struct("ModelHandle")
            .field("name", &model.name)
            .field("visible", &model.visible)
            .field("rotation", &model.transform.rotation)
            .finish()
    }
}

/// Splits 0xRRGGBB into `[0, 1]` channels.
pub fn rgb(color: u32) -> Vec3 {
    Vec3::new(
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshVertex;
    use glam::Vec2;

    fn offset_box() -> Model {
        let vertices = [Vec3::new(2.0, 2.0, 2.0), Vec3::new(4.0, 4.0, 4.0)]
            .into_iter()
            .map(|p| MeshVertex::new(p, Vec3::Y, Vec2::ZERO))
            .collect();
        Model::new("box", Geometry::Mesh { mesh: Arc::new(Mesh::new(vertices, vec![])), material: Material::default() })
    }

    #[test]
    fn fit_centres_and_scales_to_display_size() {
        let mut model = offset_box();
        assert!(model.fit_to(1.5));
        let bounds = model.local_bounds().unwrap();
        let world_min = model.transform.matrix().transform_point3(bounds.min);
        let world_max = model.transform.matrix().transform_point3(bounds.max);
        assert!(((world_min + world_max) * 0.5).length() < 1e-5, "centre should sit on the origin");
        assert!(((world_max - world_min).length() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn fitted_model_spins_in_place() {
        let mut model = offset_box();
        model.fit_to(1.5);
        model.transform.rotation = Vec3::new(0.4, 2.1, 0.0);
        let bounds = model.local_bounds().unwrap();
        let centre = model.transform.matrix().transform_point3(bounds.center);
        assert!(centre.length() < 1e-5, "centre drifted to {centre}");
    }

    #[test]
    fn empty_geometry_falls_back_to_display_scale() {
        let mut model = Model::new(
            "empty",
            Geometry::Points(PointCloud { positions: Vec::new(), color: 0xffffff, point_size: 1.0 }),
        );
        assert!(!model.fit_to(4.0));
        assert_eq!(model.transform.scale, 4.0);
    }

    #[test]
    fn handles_share_identity() {
        let a = ModelHandle::new(Model::placeholder_sphere("nebula", 0x8844cc));
        let b = a.clone();
        let c = ModelHandle::new(Model::placeholder_sphere("nebula", 0x8844cc));
        b.rotate_by(Vec3::Y);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.rotation(), Vec3::Y);
    }

    #[test]
    fn rgb_splits_channels() {
        assert_eq!(rgb(0xff0000), Vec3::X);
        assert_eq!(rgb(0x0000ff), Vec3::Z);
    }
}
