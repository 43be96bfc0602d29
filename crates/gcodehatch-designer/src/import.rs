//! # DXF Import
//!
//! Walks the model-space entities of a DXF drawing in file order and turns
//! each supported curve into a flattened [`Primitive`]. The first closed
//! outline ends the walk; open curves are collected for stitching.
//!
//! Entities inside block definitions are not expanded.

use crate::flatten::{flatten_arc, flatten_circle, flatten_ellipse};
use crate::spline::BSpline;
use dxf::entities::EntityType;
use dxf::Drawing;
use gcodehatch_core::{ImportError, Point, Primitive, ToolpathError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Default maximum sagitta for circles and arcs
pub const DEFAULT_ARC_SAGITTA: f64 = 0.05;

/// Default maximum chordal deviation for ellipses and splines
pub const DEFAULT_CURVE_DISTANCE: f64 = 0.1;

/// Import options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Maximum sagitta when flattening circles and arcs
    pub arc_sagitta: f64,
    /// Maximum deviation when flattening ellipses and splines
    pub curve_distance: f64,
    /// Fail on entity types that cannot be flattened instead of skipping them
    pub strict: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            arc_sagitta: DEFAULT_ARC_SAGITTA,
            curve_distance: DEFAULT_CURVE_DISTANCE,
            strict: false,
        }
    }
}

impl ImportOptions {
    pub fn validate(&self) -> Result<(), ToolpathError> {
        for (name, value) in [
            ("arc_sagitta", self.arc_sagitta),
            ("curve_distance", self.curve_distance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ToolpathError::invalid_parameter(
                    name,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// DXF importer
#[derive(Debug, Clone, Default)]
pub struct DxfImporter {
    options: ImportOptions,
}

impl DxfImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Read a `.dxf` file and decode its outline primitives.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<Vec<Primitive>, ImportError> {
        let path = path.as_ref();
        validate_path(path)?;

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let drawing = Drawing::load(&mut reader).map_err(|e| ImportError::Parse(e.to_string()))?;

        info!(path = %path.display(), "Loaded DXF drawing");
        self.import_drawing(&drawing)
    }

    /// Decode the model-space entities of an in-memory drawing.
    ///
    /// Fails with [`ToolpathError::NoGeometryFound`] when no entity yields a
    /// usable primitive.
    pub fn import_drawing(&self, drawing: &Drawing) -> Result<Vec<Primitive>, ImportError> {
        self.options.validate()?;

        let mut primitives = Vec::new();
        let mut skipped = 0usize;

        for entity in drawing.entities() {
            let Some(primitive) = self.decode(&entity.specific)? else {
                skipped += 1;
                continue;
            };
            if primitive.points.is_empty() {
                skipped += 1;
                continue;
            }

            if primitive.is_closed() {
                debug!(
                    source = %primitive.source,
                    vertices = primitive.points.len(),
                    "Closed outline found, stopping entity walk"
                );
                return Ok(vec![primitive]);
            }
            primitives.push(primitive);
        }

        if primitives.is_empty() {
            return Err(ToolpathError::NoGeometryFound.into());
        }

        debug!(primitives = primitives.len(), skipped, "Decoded DXF entities");
        Ok(primitives)
    }

    fn decode(&self, entity: &EntityType) -> Result<Option<Primitive>, ToolpathError> {
        let primitive = match entity {
            EntityType::LwPolyline(polyline) => {
                let points = polyline
                    .vertices
                    .iter()
                    .map(|v| Point::new(v.x, v.y))
                    .collect();
                polyline_primitive(points, polyline.flags & 1 != 0).with_source("LWPOLYLINE")
            }
            EntityType::Polyline(polyline) => {
                let points = polyline
                    .vertices()
                    .map(|v| Point::new(v.location.x, v.location.y))
                    .collect();
                polyline_primitive(points, polyline.flags & 1 != 0).with_source("POLYLINE")
            }
            EntityType::Line(line) => Primitive::open(vec![
                Point::new(line.p1.x, line.p1.y),
                Point::new(line.p2.x, line.p2.y),
            ])
            .with_source("LINE"),
            EntityType::Circle(circle) => Primitive::closed(flatten_circle(
                Point::new(circle.center.x, circle.center.y),
                circle.radius,
                self.options.arc_sagitta,
            ))
            .with_source("CIRCLE"),
            EntityType::Arc(arc) => Primitive::open(flatten_arc(
                Point::new(arc.center.x, arc.center.y),
                arc.radius,
                arc.start_angle,
                arc.end_angle,
                self.options.arc_sagitta,
            ))
            .with_source("ARC"),
            EntityType::Ellipse(ellipse) => {
                let flattened = flatten_ellipse(
                    Point::new(ellipse.center.x, ellipse.center.y),
                    (ellipse.major_axis.x, ellipse.major_axis.y),
                    ellipse.minor_axis_ratio,
                    ellipse.start_parameter,
                    ellipse.end_parameter,
                    self.options.curve_distance,
                );
                let primitive = if flattened.full {
                    Primitive::closed(flattened.points)
                } else {
                    Primitive::open(flattened.points)
                };
                primitive.with_source("ELLIPSE")
            }
            EntityType::Spline(spline) => {
                let control: Vec<Point> = spline
                    .control_points
                    .iter()
                    .map(|p| Point::new(p.x, p.y))
                    .collect();
                let fit: Vec<Point> = spline
                    .fit_points
                    .iter()
                    .map(|p| Point::new(p.x, p.y))
                    .collect();
                let degree = usize::try_from(spline.degree_of_curve).unwrap_or(0);

                let points = match BSpline::new(
                    degree,
                    &spline.knot_values,
                    &control,
                    &spline.weight_values,
                ) {
                    Some(curve) => curve.flatten(self.options.curve_distance),
                    None if fit.len() >= 2 => fit,
                    None => {
                        return Err(ToolpathError::unsupported(format!(
                            "SPLINE (degree {}, {} control points, {} fit points)",
                            spline.degree_of_curve,
                            control.len(),
                            fit.len()
                        )))
                    }
                };
                Primitive::open(points).with_source("SPLINE")
            }
            other => {
                let kind = entity_kind(other);
                if self.options.strict {
                    return Err(ToolpathError::unsupported(kind));
                }
                debug!(kind, "Skipping entity that is not an outline curve");
                return Ok(None);
            }
        };

        Ok(Some(primitive))
    }
}

fn polyline_primitive(points: Vec<Point>, closed: bool) -> Primitive {
    if closed {
        Primitive::closed(points)
    } else {
        Primitive::open(points)
    }
}

/// DXF group name of an entity the importer does not flatten
fn entity_kind(entity: &EntityType) -> &'static str {
    match entity {
        EntityType::Text(_) => "TEXT",
        EntityType::MText(_) => "MTEXT",
        EntityType::Insert(_) => "INSERT",
        EntityType::Solid(_) => "SOLID",
        EntityType::Trace(_) => "TRACE",
        EntityType::Face3D(_) => "3DFACE",
        EntityType::Leader(_) => "LEADER",
        EntityType::Image(_) => "IMAGE",
        EntityType::ModelPoint(_) => "POINT",
        EntityType::Ray(_) => "RAY",
        EntityType::XLine(_) => "XLINE",
        _ => "unsupported entity",
    }
}

fn validate_path(path: &Path) -> Result<(), ImportError> {
    let is_dxf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dxf"));

    if !path.is_file() || !is_dxf {
        return Err(ImportError::InvalidFile {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxf::entities::{Circle, Entity, Line, LwPolyline, MText, Text};
    use dxf::LwPolylineVertex;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Entity {
        Entity::new(EntityType::Line(Line::new(
            dxf::Point::new(x1, y1, 0.0),
            dxf::Point::new(x2, y2, 0.0),
        )))
    }

    fn lwpolyline(points: &[(f64, f64)], closed: bool) -> Entity {
        let mut poly = LwPolyline::default();
        for &(x, y) in points {
            poly.vertices.push(LwPolylineVertex {
                x,
                y,
                ..Default::default()
            });
        }
        poly.set_is_closed(closed);
        Entity::new(EntityType::LwPolyline(poly))
    }

    fn text() -> Entity {
        Entity::new(EntityType::Text(Text::default()))
    }

    fn drawing(entities: Vec<Entity>) -> Drawing {
        let mut drawing = Drawing::new();
        for entity in entities {
            drawing.add_entity(entity);
        }
        drawing
    }

    #[test]
    fn test_closed_polyline_ends_walk() {
        let d = drawing(vec![
            line(0.0, 0.0, 1.0, 1.0),
            lwpolyline(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0)], true),
            line(2.0, 2.0, 3.0, 3.0),
        ]);
        let prims = DxfImporter::default().import_drawing(&d).unwrap();
        assert_eq!(prims.len(), 1);
        assert!(prims[0].is_closed());
        assert_eq!(prims[0].source, "LWPOLYLINE");
        assert_eq!(prims[0].points.len(), 4);
    }

    #[test]
    fn test_open_polyline_is_kept_for_stitching() {
        let d = drawing(vec![
            lwpolyline(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)], false),
            line(5.0, 5.0, 0.0, 0.0),
        ]);
        let prims = DxfImporter::default().import_drawing(&d).unwrap();
        assert_eq!(prims.len(), 2);
        assert!(prims.iter().all(|p| !p.is_closed()));
    }

    #[test]
    fn test_circle_is_closed_primitive() {
        let d = drawing(vec![Entity::new(EntityType::Circle(Circle::new(
            dxf::Point::new(10.0, 10.0, 0.0),
            5.0,
        )))]);
        let prims = DxfImporter::default().import_drawing(&d).unwrap();
        assert_eq!(prims.len(), 1);
        assert!(prims[0].is_closed());
        for p in &prims[0].points {
            assert!((p.distance_to(&Point::new(10.0, 10.0)) - 5.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_unsupported_entities_are_skipped() {
        let d = drawing(vec![text(), line(0.0, 0.0, 1.0, 0.0)]);
        let prims = DxfImporter::default().import_drawing(&d).unwrap();
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].source, "LINE");
    }

    #[test]
    fn test_strict_mode_rejects_unsupported_entities() {
        let d = drawing(vec![text(), line(0.0, 0.0, 1.0, 0.0)]);
        let importer = DxfImporter::new(ImportOptions {
            strict: true,
            ..Default::default()
        });
        match importer.import_drawing(&d) {
            Err(ImportError::Toolpath(ToolpathError::UnsupportedPrimitive { kind })) => {
                assert_eq!(kind, "TEXT");
            }
            other => panic!("expected unsupported primitive, got {other:?}"),
        }
    }

    #[test]
    fn test_entity_kind_uses_dxf_group_names() {
        assert_eq!(entity_kind(&EntityType::Text(Text::default())), "TEXT");
        assert_eq!(entity_kind(&EntityType::MText(MText::default())), "MTEXT");

        let d = drawing(vec![Entity::new(EntityType::MText(MText::default()))]);
        let importer = DxfImporter::new(ImportOptions {
            strict: true,
            ..Default::default()
        });
        match importer.import_drawing(&d) {
            Err(ImportError::Toolpath(ToolpathError::UnsupportedPrimitive { kind })) => {
                assert_eq!(kind, "MTEXT");
            }
            other => panic!("expected unsupported primitive, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_drawing_has_no_geometry() {
        let err = DxfImporter::default()
            .import_drawing(&drawing(vec![text()]))
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Toolpath(ToolpathError::NoGeometryFound)
        ));
    }

    #[test]
    fn test_invalid_tolerance() {
        let importer = DxfImporter::new(ImportOptions {
            arc_sagitta: 0.0,
            ..Default::default()
        });
        let err = importer
            .import_drawing(&drawing(vec![line(0.0, 0.0, 1.0, 0.0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::Toolpath(ToolpathError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_path_validation() {
        let err = DxfImporter::default()
            .import_file("/nonexistent/drawing.dxf")
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidFile { .. }));
    }
}
