//! Transform & lighting
//!
//! Moves one object's vertices and face normals into view space and
//! assigns each polygon its light intensity. Lighting is the ambient term
//! only: the object's ambient level is copied to every polygon unchanged.

use super::frame::TransformBuffer;
use super::model::Model;
use super::scalar::{Scalar, ViewTransform, ViewVec3};

/// Fill `buffer` with the view-space data for `model` under `view`.
///
/// Positions get rotation and translation; normals get rotation only. An
/// empty model leaves the buffer empty.
pub fn transform_and_light<S: Scalar>(
    model: &Model,
    view: &ViewTransform<S>,
    ambient: f32,
    buffer: &mut TransformBuffer<S>,
) {
    buffer.reset(model.vertex_count(), model.polygon_count());

    buffer.vertices.extend(
        model
            .vertices()
            .iter()
            .map(|v| view.apply(ViewVec3::from_vec3(*v))),
    );

    for polygon in model.polygons() {
        buffer.normals.push(view.rotate(ViewVec3::from_vec3(polygon.normal)));
        buffer.intensities.push(ambient);
    }
}
