//! Voronoi cells around cluster centroids and point containment checks.
//!
//! Cells are derived from the Delaunay triangulation of the sites: the cell
//! of a site is the polygon through the circumcenters of its incident
//! triangles. Sites on the convex hull have unbounded cells, which are
//! excluded from containment checks since they have no finite polygon.


use std::collections::HashMap;

use glam::DVec2;
use serde::Serialize;
use spade::{DelaunayTriangulation, Point2, Triangulation};
use tracing::{debug, info};

use crate::bounds::Bounds;
use crate::error::{Error, Result};
use crate::geometry::{all_collinear, polygon_contains};

/// Fewest distinct sites that can produce a bounded cell.
pub const MIN_SITES: usize = 4;

/// Tolerance for merging circumcenters of cocircular triangles.
const MERGE_TOLERANCE: f64 = 1e-9;

/// A bounded Voronoi cell.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    /// Index into [`VoronoiDiagram::sites`].
    pub site_index: usize,
    pub site: DVec2,
    /// Convex polygon, counter-clockwise.
    pub polygon: Vec<DVec2>,
}

/// An edge of the diagram, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoronoiEdge {
    Segment(DVec2, DVec2),
    /// Infinite edge leaving the diagram; `direction` is unit length.
    Ray { origin: DVec2, direction: DVec2 },
}

impl VoronoiEdge {
    /// The visible part of this edge inside `bounds`.
    pub fn clipped(&self, bounds: &Bounds) -> Option<(DVec2, DVec2)> {
        match *self {
            VoronoiEdge::Segment(a, b) => clip_segment(a, b, bounds),
            VoronoiEdge::Ray { origin, direction } => {
                let reach = (bounds.size().length() + origin.distance(bounds.center())) * 2.0;
                clip_segment(origin, origin + direction * reach, bounds)
            }
        }
    }
}

#[derive(Debug)]
pub struct VoronoiDiagram {
    sites: Vec<DVec2>,
    cells: Vec<VoronoiCell>,
    edges: Vec<VoronoiEdge>,
}

/// Result of checking points against the bounded cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainmentReport {
    /// Per input point: inside some bounded cell (boundary inclusive).
    pub inside: Vec<bool>,
    pub inside_count: usize,
    pub total: usize,
    pub bounded_cells: usize,
}

impl ContainmentReport {
    /// Percentage of points inside a bounded cell; 0 for no points.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.inside_count as f64 * 100.0 / self.total as f64
        }
    }
}

impl VoronoiDiagram {
    /// Build the diagram over `centroids`.
    ///
    /// Exact duplicate positions are merged. Fewer than [`MIN_SITES`] distinct
    /// sites, or all sites on one line, is [`Error::InsufficientCentroids`].
    pub fn build(centroids: &[DVec2]) -> Result<Self> {
        let mut site_lookup: HashMap<(u64, u64), usize> = HashMap::new();
        let mut sites = Vec::with_capacity(centroids.len());
        for &c in centroids {
            site_lookup.entry(bits(c)).or_insert_with(|| {
                sites.push(c);
                sites.len() - 1
            });
        }

        if sites.len() < MIN_SITES || all_collinear(&sites) {
            return Err(Error::InsufficientCentroids { found: sites.len() });
        }

        let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
        for s in &sites {
            triangulation
                .insert(Point2::new(s.x, s.y))
                .map_err(|e| Error::Triangulation(format!("{e:?}")))?;
        }

        let mut cells = Vec::new();
        for vertex in triangulation.vertices() {
            if vertex.out_edges().any(|e| e.face().is_outer()) {
                continue;
            }
            let site = to_dvec(vertex.position());
            let Some(&site_index) = site_lookup.get(&bits(site)) else {
                continue;
            };

            let mut polygon: Vec<DVec2> = vertex
                .out_edges()
                .filter_map(|e| e.face().as_inner())
                .map(|face| to_dvec(face.circumcenter()))
                .collect();
            polygon.sort_by(|a, b| {
                let angle_a = (a.y - site.y).atan2(a.x - site.x);
                let angle_b = (b.y - site.y).atan2(b.x - site.x);
                angle_a.total_cmp(&angle_b)
            });
            merge_close_vertices(&mut polygon);

            if polygon.len() >= 3 {
                cells.push(VoronoiCell {
                    site_index,
                    site,
                    polygon,
                });
            }
        }
        cells.sort_by_key(|c| c.site_index);

        let mut edges = Vec::new();
        for edge in triangulation.undirected_edges() {
            let directed = edge.as_directed();
            let from = to_dvec(directed.from().position());
            let to = to_dvec(directed.to().position());
            let along = to - from;

            match (directed.face().as_inner(), directed.rev().face().as_inner()) {
                (Some(left), Some(right)) => {
                    let a = to_dvec(left.circumcenter());
                    let b = to_dvec(right.circumcenter());
                    if !a.abs_diff_eq(b, MERGE_TOLERANCE * a.length().max(1.0)) {
                        edges.push(VoronoiEdge::Segment(a, b));
                    }
                }
                // Hull edge: the ray leaves on the side of the outer face.
                (Some(inner), None) => edges.push(VoronoiEdge::Ray {
                    origin: to_dvec(inner.circumcenter()),
                    direction: DVec2::new(along.y, -along.x).normalize(),
                }),
                (None, Some(inner)) => edges.push(VoronoiEdge::Ray {
                    origin: to_dvec(inner.circumcenter()),
                    direction: DVec2::new(-along.y, along.x).normalize(),
                }),
                (None, None) => {}
            }
        }

        debug!(
            sites = sites.len(),
            bounded_cells = cells.len(),
            edges = edges.len(),
            "Voronoi diagram built"
        );

        Ok(Self {
            sites,
            cells,
            edges,
        })
    }

    /// Distinct sites in first-seen order.
    pub fn sites(&self) -> &[DVec2] {
        &self.sites
    }

    /// Bounded cells, ordered by site index.
    pub fn cells(&self) -> &[VoronoiCell] {
        &self.cells
    }

    pub fn edges(&self) -> &[VoronoiEdge] {
        &self.edges
    }

    pub fn bounded_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn unbounded_cell_count(&self) -> usize {
        self.sites.len() - self.cells.len()
    }

    /// The bounded cell containing `p`, if any.
    pub fn containing_cell(&self, p: DVec2) -> Option<&VoronoiCell> {
        self.cells.iter().find(|c| polygon_contains(&c.polygon, p))
    }

    pub fn check_containment(&self, points: &[DVec2]) -> ContainmentReport {
        let inside: Vec<bool> = points
            .iter()
            .map(|&p| self.containing_cell(p).is_some())
            .collect();
        let inside_count = inside.iter().filter(|&&i| i).count();
        ContainmentReport {
            inside,
            inside_count,
            total: points.len(),
            bounded_cells: self.cells.len(),
        }
    }
}

/// Build the diagram over `centroids` and check `points` against it.
pub fn validate_containment(centroids: &[DVec2], points: &[DVec2]) -> Result<ContainmentReport> {
    let diagram = VoronoiDiagram::build(centroids)?;
    let report = diagram.check_containment(points);
    info!(
        centroids = centroids.len(),
        bounded_cells = report.bounded_cells,
        inside = report.inside_count,
        total = report.total,
        percentage = format!("{:.2}", report.percentage()),
        "Voronoi containment"
    );
    Ok(report)
}

#[inline]
fn to_dvec(p: Point2<f64>) -> DVec2 {
    DVec2::new(p.x, p.y)
}

/// Hash key; `+ 0.0` folds negative zero into positive zero.
#[inline]
fn bits(p: DVec2) -> (u64, u64) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

/// Drop consecutive (cyclically) vertices closer than the merge tolerance.
fn merge_close_vertices(polygon: &mut Vec<DVec2>) {
    let scale = polygon
        .iter()
        .map(|p| p.abs().max_element())
        .fold(1.0, f64::max);
    let tol = MERGE_TOLERANCE * scale;
    polygon.dedup_by(|a, b| a.abs_diff_eq(*b, tol));
    while polygon.len() > 1 && polygon[0].abs_diff_eq(polygon[polygon.len() - 1], tol) {
        polygon.pop();
    }
}

/// Liang-Barsky clipping of segment `a..b` to `bounds`.
fn clip_segment(a: DVec2, b: DVec2, bounds: &Bounds) -> Option<(DVec2, DVec2)> {
    let d = b - a;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    let checks = [
        (-d.x, a.x - bounds.min.x),
        (d.x, bounds.max.x - a.x),
        (-d.y, a.y - bounds.min.y),
        (d.y, bounds.max.y - a.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + d * t0, a + d * t1))
}
