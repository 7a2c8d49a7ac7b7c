//! Shrinkwrap tool conformance.
//!
//! Deforms the resection tool's wire and insulation meshes onto the anatomy
//! surface. Every vertex outside the no-clip anchor exclusion zones is moved
//! either along a fixed projection axis ([`ShrinkwrapType::Project`]) or to
//! the nearest surface point ([`ShrinkwrapType::NearestSurface`]), subject to
//! a maximum displacement and to the configured admissible surface side. A
//! candidate on the wrong side or beyond the distance cap leaves the vertex
//! at rest; that is a conformance miss, not an error.

use serde::{Deserialize, Serialize};

use endosynth_core::{
    GeometryEngine, Mesh, NoClipAnchor, Pt3, Real, ShrinkwrapType, ToolParams, Vec3, WrapMode,
};

/// Tolerance for the on-surface tie in the side classification.
const SIDE_TOL: Real = 1e-9;

/// Conformance settings shared by both tool meshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformSettings {
    pub wrap_mode: WrapMode,
    pub shrinkwrap_type: ShrinkwrapType,
    /// Maximum vertex displacement from rest.
    pub max_distance: Real,
    /// Cast axis for [`ShrinkwrapType::Project`]; both senses are tried.
    pub projection_axis: Vec3,
}

impl From<&ToolParams> for ConformSettings {
    fn from(tool: &ToolParams) -> Self {
        Self {
            wrap_mode: tool.wrap_mode,
            shrinkwrap_type: tool.shrinkwrap_type,
            max_distance: tool.max_distance,
            projection_axis: tool.projection_axis,
        }
    }
}

/// The rigid tool meshes in their rest frame.
#[derive(Debug, Clone)]
pub struct ToolMeshes {
    pub wire: Mesh,
    pub insulation: Mesh,
}

/// Result of conforming one mesh.
#[derive(Debug, Clone)]
pub struct ConformReport {
    pub mesh: Mesh,
    /// Vertices relocated onto the target surface.
    pub moved: usize,
    /// Vertices left at rest because the candidate was inadmissible.
    pub misses: usize,
    /// Vertices protected by a no-clip anchor.
    pub anchored: usize,
}

/// Wire and insulation conformed with identical settings and anchors.
#[derive(Debug, Clone)]
pub struct ConformedTool {
    pub wire: ConformReport,
    pub insulation: ConformReport,
}

fn inside_anchor(v: &Pt3, anchors: &[NoClipAnchor]) -> bool {
    anchors.iter().any(|a| {
        let c = Pt3::new(a.position[0], a.position[1], a.position[2]);
        (v - c).norm() <= a.radius
    })
}

/// Candidate surface point for one vertex, or `None` when the strategy has
/// nothing to offer (projection ray misses in both senses).
fn candidate(
    v: &Pt3,
    target: &Mesh,
    engine: &dyn GeometryEngine,
    settings: &ConformSettings,
) -> Option<(Pt3, Vec3)> {
    match settings.shrinkwrap_type {
        ShrinkwrapType::NearestSurface => {
            let sp = engine.nearest_point(target, v);
            Some((sp.point, sp.normal))
        }
        ShrinkwrapType::Project => {
            let axis = settings.projection_axis.normalize();
            let fwd = engine.ray_cast(target, v, &axis);
            let back = engine.ray_cast(target, v, &(-axis));
            match (fwd, back) {
                (Some(a), Some(b)) => {
                    let h = if a.t <= b.t { a } else { b };
                    Some((h.point, h.normal))
                }
                (Some(h), None) | (None, Some(h)) => Some((h.point, h.normal)),
                (None, None) => None,
            }
        }
    }
}

/// Conform one mesh onto the target surface.
pub fn conform(
    tool: &Mesh,
    target: &Mesh,
    engine: &dyn GeometryEngine,
    settings: &ConformSettings,
    anchors: &[NoClipAnchor],
) -> ConformReport {
    let mut mesh = tool.clone();
    let mut moved = 0;
    let mut misses = 0;
    let mut anchored = 0;

    for v in &mut mesh.vertices {
        if inside_anchor(v, anchors) {
            anchored += 1;
            continue;
        }

        let Some((point, normal)) = candidate(v, target, engine, settings) else {
            misses += 1;
            continue;
        };

        if (point - *v).norm() > settings.max_distance {
            misses += 1;
            continue;
        }

        // Which side of the surface the vertex approaches from.
        let side = (*v - point).dot(&normal);
        let admissible = match settings.wrap_mode {
            WrapMode::Inside => side <= SIDE_TOL,
            WrapMode::Outside => side >= -SIDE_TOL,
        };
        if !admissible {
            misses += 1;
            continue;
        }

        *v = point;
        moved += 1;
    }

    ConformReport {
        mesh,
        moved,
        misses,
        anchored,
    }
}

/// Conform wire and insulation with the same target, settings and anchors,
/// keeping the two meshes mutually consistent.
pub fn conform_tool(
    tool: &ToolMeshes,
    target: &Mesh,
    engine: &dyn GeometryEngine,
    settings: &ConformSettings,
    anchors: &[NoClipAnchor],
) -> ConformedTool {
    ConformedTool {
        wire: conform(&tool.wire, target, engine, settings, anchors),
        insulation: conform(&tool.insulation, target, engine, settings, anchors),
    }
}
