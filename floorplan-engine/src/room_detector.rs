//! Closed-room extraction from a wall set.
//!
//! The walls are turned into a planar graph (see [`crate::graph_builder`]),
//! and every face of that graph is traced by walking half-edges: from an
//! edge `u → v` the walk continues along the edge leaving `v` that is
//! immediately clockwise of `v → u`. Bounded faces come out counter-clockwise
//! with positive signed area. The unbounded face of each connected component
//! comes out clockwise and is used only to recognise holes. Walls that cross
//! away from any endpoint are not split, so rings whose sides cross are
//! discarded along with the other degenerate faces.

use crate::config::RoomConfig;
use crate::entities::Wall;
use crate::geometry::{
    point_in_polygon, polygon_area, polygon_centroid, segments_cross, Bounds, Point,
};
use crate::graph_builder::{build_graph, prune_filaments, EdgeType, FloorplanGraph};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// One side of a room polygon, from `points[i]` to `points[i + 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BoundarySegment {
    Wall {
        wall_id: String,
        start: Point,
        end: Point,
    },
    /// Closes an opening; not backed by any wall
    Pseudo { start: Point, end: Point },
}

impl BoundarySegment {
    pub fn start(&self) -> Point {
        match self {
            BoundarySegment::Wall { start, .. } | BoundarySegment::Pseudo { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            BoundarySegment::Wall { end, .. } | BoundarySegment::Pseudo { end, .. } => *end,
        }
    }

    pub fn wall_id(&self) -> Option<&str> {
        match self {
            BoundarySegment::Wall { wall_id, .. } => Some(wall_id),
            BoundarySegment::Pseudo { .. } => None,
        }
    }
}

/// A closed room, counter-clockwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPolygon {
    pub id: usize,
    pub points: Vec<Point>,
    pub segments: Vec<BoundarySegment>,
    /// Area enclosed by the outer boundary
    pub area: f64,
    pub centroid: Option<Point>,
    pub bounding_box: [f64; 4], // [min_x, min_y, max_x, max_y]
    /// Nested wall loops that are voids of this room
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Point>>,
}

impl RoomPolygon {
    /// Ids of the walls bounding this room, in boundary order, without repeats
    pub fn wall_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.segments
            .iter()
            .filter_map(BoundarySegment::wall_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// `[x0, y0, x1, y1, ...]` for renderers that take flat coordinate buffers
    pub fn flattened_points(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    pub fn has_openings(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, BoundarySegment::Pseudo { .. }))
    }
}

/// A traced face: half-edges in walk order, each given by its tail node and edge
struct Face {
    half_edges: Vec<(NodeIndex, EdgeIndex)>,
    component: usize,
    points: Vec<Point>,
    area: f64,
}

/// Extract every closed room enclosed by `walls`.
///
/// Returns rooms sorted by descending area with sequential ids. Never fails:
/// open wall sets simply produce no rooms.
pub fn extract_rooms(walls: &[Wall], config: &RoomConfig) -> Vec<RoomPolygon> {
    let mut graph = build_graph(walls, config);
    let pruned = prune_filaments(&mut graph);
    debug!(
        "Room graph: {} nodes, {} edges ({} filament nodes pruned)",
        graph.node_count(),
        graph.edge_count(),
        pruned
    );

    if graph.edge_count() == 0 {
        info!("No closed wall loops among {} walls", walls.len());
        return Vec::new();
    }

    let mut interiors = Vec::new();
    let mut exteriors = Vec::new();
    for face in trace_faces(&graph) {
        if face.area > 0.0 {
            match rejection_reason(&face, config) {
                Some(reason) => debug!(
                    "Discarding cycle of {} vertices: {}",
                    face.points.len(),
                    reason
                ),
                None => interiors.push(face),
            }
        } else {
            exteriors.push(face);
        }
    }

    // A component whose outline sits inside another component's room is a void
    let mut void_components = HashSet::new();
    let mut holes: HashMap<usize, Vec<Vec<Point>>> = HashMap::new();
    for exterior in &exteriors {
        if exterior.area.abs() < config.min_room_area {
            continue;
        }
        let container = interiors
            .iter()
            .enumerate()
            .filter(|(_, room)| room.component != exterior.component)
            .filter(|(_, room)| {
                exterior
                    .points
                    .iter()
                    .all(|p| point_in_polygon(p, &room.points))
            })
            .min_by(|(_, a), (_, b)| a.area.total_cmp(&b.area));

        if let Some((index, _)) = container {
            debug!(
                "Cycle of {} vertices is a hole of a larger room",
                exterior.points.len()
            );
            void_components.insert(exterior.component);
            holes
                .entry(index)
                .or_default()
                .push(exterior.points.clone());
        }
    }

    let mut rooms: Vec<RoomPolygon> = interiors
        .into_iter()
        .enumerate()
        .filter(|(_, face)| !void_components.contains(&face.component))
        .map(|(index, face)| {
            let room_holes = holes.remove(&index).unwrap_or_default();
            to_room(&graph, face, room_holes)
        })
        .collect();

    rooms.sort_by(|a, b| b.area.total_cmp(&a.area));
    for (id, room) in rooms.iter_mut().enumerate() {
        room.id = id;
    }

    info!("Extracted {} rooms from {} walls", rooms.len(), walls.len());
    rooms
}

/// Why a bounded face cannot be a room, if it can't
fn rejection_reason(face: &Face, config: &RoomConfig) -> Option<&'static str> {
    let mut distinct = HashSet::new();
    let repeated = face
        .half_edges
        .iter()
        .any(|(node, _)| !distinct.insert(*node));

    if distinct.len() < 3 {
        Some("fewer than 3 distinct vertices")
    } else if repeated {
        Some("self-touching boundary")
    } else if has_crossing_edges(&face.points) {
        Some("self-intersecting boundary")
    } else if face.area < config.min_room_area {
        Some("area below minimum")
    } else {
        None
    }
}

/// Do two non-adjacent sides of the closed ring cross each other?
/// Walls that cross without sharing an endpoint leave such rings in the graph.
fn has_crossing_edges(points: &[Point]) -> bool {
    let n = points.len();
    (0..n).any(|i| {
        let (a1, a2) = (&points[i], &points[(i + 1) % n]);
        (i + 2..n)
            // The last side shares a vertex with the first
            .filter(|&j| !(i == 0 && j == n - 1))
            .any(|j| segments_cross(a1, a2, &points[j], &points[(j + 1) % n]))
    })
}

/// Walk every half-edge exactly once, collecting the faces they bound
fn trace_faces(graph: &FloorplanGraph) -> Vec<Face> {
    // Outgoing half-edges per node, sorted counter-clockwise by angle
    let mut outgoing: HashMap<NodeIndex, Vec<(f64, NodeIndex, EdgeIndex)>> = HashMap::new();
    let mut components = UnionFind::new(graph.node_count());

    for edge in graph.edge_references() {
        let (a, b) = (edge.source(), edge.target());
        let (pa, pb) = (graph[a], graph[b]);
        outgoing
            .entry(a)
            .or_default()
            .push(((pb.y - pa.y).atan2(pb.x - pa.x), b, edge.id()));
        outgoing
            .entry(b)
            .or_default()
            .push(((pa.y - pb.y).atan2(pa.x - pb.x), a, edge.id()));
        components.union(a.index(), b.index());
    }
    for half_edges in outgoing.values_mut() {
        half_edges.sort_by(|x, y| x.0.total_cmp(&y.0));
    }

    let mut visited: HashSet<(NodeIndex, EdgeIndex)> = HashSet::new();
    let mut faces = Vec::new();

    for start in graph.node_indices() {
        let Some(leaving) = outgoing.get(&start) else {
            continue;
        };

        for &(_, first_head, first_edge) in leaving {
            if visited.contains(&(start, first_edge)) {
                continue;
            }

            let mut half_edges = Vec::new();
            let (mut tail, mut head, mut edge) = (start, first_head, first_edge);
            while visited.insert((tail, edge)) {
                half_edges.push((tail, edge));

                let Some((next_head, next_edge)) = next_clockwise(&outgoing, head, edge) else {
                    break;
                };
                tail = head;
                head = next_head;
                edge = next_edge;
            }

            let points: Vec<Point> = half_edges.iter().map(|(node, _)| graph[*node]).collect();
            let area = polygon_area(&points);
            faces.push(Face {
                half_edges,
                component: components.find(start.index()),
                points,
                area,
            });
        }
    }

    debug!("Traced {} faces", faces.len());
    faces
}

/// The half-edge leaving `node` immediately clockwise of the one that arrived via `arrived_by`
fn next_clockwise(
    outgoing: &HashMap<NodeIndex, Vec<(f64, NodeIndex, EdgeIndex)>>,
    node: NodeIndex,
    arrived_by: EdgeIndex,
) -> Option<(NodeIndex, EdgeIndex)> {
    let leaving = outgoing.get(&node)?;
    let back = leaving.iter().position(|&(_, _, edge)| edge == arrived_by)?;
    let (_, head, edge) = leaving[(back + leaving.len() - 1) % leaving.len()];
    Some((head, edge))
}

fn to_room(graph: &FloorplanGraph, face: Face, holes: Vec<Vec<Point>>) -> RoomPolygon {
    let count = face.half_edges.len();
    let segments = face
        .half_edges
        .iter()
        .enumerate()
        .map(|(i, &(tail, edge))| {
            let start = graph[tail];
            let end = graph[face.half_edges[(i + 1) % count].0];
            match &graph[edge] {
                EdgeType::Wall { wall_id } => BoundarySegment::Wall {
                    wall_id: wall_id.clone(),
                    start,
                    end,
                },
                EdgeType::Pseudo => BoundarySegment::Pseudo { start, end },
            }
        })
        .collect();

    let bounding_box = Bounds::from_points(&face.points)
        .map(|bounds| bounds.to_array())
        .unwrap_or_default();

    RoomPolygon {
        id: 0,
        centroid: polygon_centroid(&face.points),
        area: face.area,
        bounding_box,
        segments,
        points: face.points,
        holes,
    }
}
