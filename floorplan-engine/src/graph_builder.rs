use crate::config::RoomConfig;
use crate::entities::Wall;
use crate::geometry::{distance_to_segment, Point, PointKey};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet};
use tracing::debug;

// Undirected: a wall bounds the rooms on both of its sides
pub type FloorplanGraph = UnGraph<Point, EdgeType>;

/// Edge types in the floorplan graph
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeType {
    /// Piece of a real wall
    Wall { wall_id: String },
    /// Closes an opening between two dangling wall ends
    Pseudo,
}

impl EdgeType {
    pub fn is_pseudo(&self) -> bool {
        matches!(self, EdgeType::Pseudo)
    }

    pub fn wall_id(&self) -> Option<&str> {
        match self {
            EdgeType::Wall { wall_id } => Some(wall_id),
            EdgeType::Pseudo => None,
        }
    }
}

/// Merges endpoints closer than the tolerance into one node
struct NodeSnapper {
    tolerance: f64,
    cells: HashMap<PointKey, Vec<NodeIndex>>,
}

impl NodeSnapper {
    fn new(tolerance: f64) -> Self {
        Self {
            // The grid pitch divides coordinates, so it must stay positive
            tolerance: if tolerance > 0.0 { tolerance } else { 1e-9 },
            cells: HashMap::new(),
        }
    }

    fn node_for(&mut self, graph: &mut FloorplanGraph, point: &Point) -> NodeIndex {
        let key = PointKey::snapped(point, self.tolerance);

        for cell in key.neighborhood() {
            if let Some(nodes) = self.cells.get(&cell) {
                if let Some(&node) = nodes
                    .iter()
                    .find(|&&node| graph[node].distance_to(point) <= self.tolerance)
                {
                    return node;
                }
            }
        }

        let node = graph.add_node(*point);
        self.cells.entry(key).or_default().push(node);
        node
    }
}

/// Position of `p` projected onto the line through `a` and `b`, as a fraction of `a → b`
fn projection_parameter(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    ((p.x - a.x) * dx + (p.y - a.y) * dy) / (dx * dx + dy * dy)
}

fn add_edge_once(graph: &mut FloorplanGraph, a: NodeIndex, b: NodeIndex, edge: EdgeType) {
    if graph.find_edge(a, b).is_some() {
        debug!("Skipping duplicate edge {:?}-{:?} ({:?})", a, b, edge);
        return;
    }
    graph.add_edge(a, b, edge);
}

/// Build the planar adjacency graph for a wall set.
///
/// Endpoints within `snap_tolerance` share a node, a wall passing through
/// another wall's endpoint is split there (T-junctions), and when
/// `opening_bridge_distance` is positive nearby dangling ends are joined by
/// pseudo edges.
pub fn build_graph(walls: &[Wall], config: &RoomConfig) -> FloorplanGraph {
    let mut graph = UnGraph::new_undirected();
    let mut snapper = NodeSnapper::new(config.snap_tolerance);

    // Phase 1: nodes for every endpoint
    let mut spans = Vec::with_capacity(walls.len());
    for wall in walls {
        // Zero-length walls are rejected upstream; never let one into the graph
        if wall.start == wall.end {
            debug!("Skipping zero-length wall {}", wall.id);
            continue;
        }

        let start = snapper.node_for(&mut graph, &wall.start);
        let end = snapper.node_for(&mut graph, &wall.end);
        if start == end {
            debug!("Skipping wall {}: endpoints snap together", wall.id);
            continue;
        }
        spans.push((wall, start, end));
    }

    // Phase 2: wall edges, split wherever another endpoint lies on the wall
    let tolerance = snapper.tolerance;
    for (wall, start, end) in spans {
        let a = graph[start];
        let b = graph[end];

        let mut stops: Vec<(f64, NodeIndex)> = graph
            .node_indices()
            .filter(|&node| node != start && node != end)
            .filter(|&node| distance_to_segment(&graph[node], &a, &b) <= tolerance)
            .map(|node| (projection_parameter(&graph[node], &a, &b), node))
            .collect();
        stops.sort_by(|x, y| x.0.total_cmp(&y.0));

        if !stops.is_empty() {
            debug!("Splitting wall {} at {} junction(s)", wall.id, stops.len());
        }

        let mut chain = Vec::with_capacity(stops.len() + 2);
        chain.push(start);
        chain.extend(stops.into_iter().map(|(_, node)| node));
        chain.push(end);

        for pair in chain.windows(2) {
            add_edge_once(
                &mut graph,
                pair[0],
                pair[1],
                EdgeType::Wall {
                    wall_id: wall.id.clone(),
                },
            );
        }
    }

    // Phase 3: close openings
    if config.opening_bridge_distance > 0.0 {
        let bridged = bridge_openings(&mut graph, config.opening_bridge_distance);
        debug!("Bridged {} opening(s)", bridged);
    }

    graph
}

/// Pair dangling wall ends closer than `max_gap`, nearest pairs first.
/// Each dangling end takes part in at most one bridge.
fn bridge_openings(graph: &mut FloorplanGraph, max_gap: f64) -> usize {
    let dangling: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&node| graph.edges(node).count() == 1)
        .collect();

    let mut candidates = Vec::new();
    for (i, &a) in dangling.iter().enumerate() {
        for &b in &dangling[i + 1..] {
            // Skip if already connected
            if graph.find_edge(a, b).is_some() {
                continue;
            }

            let distance = graph[a].distance_to(&graph[b]);
            if distance > 0.0 && distance <= max_gap {
                candidates.push((distance, a, b));
            }
        }
    }
    candidates.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut used = HashSet::new();
    let mut bridged = 0;
    for (_, a, b) in candidates {
        if used.contains(&a) || used.contains(&b) {
            continue;
        }
        used.insert(a);
        used.insert(b);
        graph.add_edge(a, b, EdgeType::Pseudo);
        bridged += 1;
    }

    bridged
}

/// Repeatedly remove nodes of degree 0 or 1 so that only edges lying on some
/// cycle remain. Returns the number of nodes removed.
pub fn prune_filaments(graph: &mut FloorplanGraph) -> usize {
    let mut degree: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|node| (node, graph.edges(node).count()))
        .collect();
    let mut queue: Vec<NodeIndex> = degree
        .iter()
        .filter(|(_, d)| **d <= 1)
        .map(|(&node, _)| node)
        .collect();
    let mut removed = HashSet::new();

    while let Some(node) = queue.pop() {
        if !removed.insert(node) {
            continue;
        }
        for neighbor in graph.neighbors(node) {
            if removed.contains(&neighbor) {
                continue;
            }
            if let Some(d) = degree.get_mut(&neighbor) {
                *d = d.saturating_sub(1);
                if *d <= 1 {
                    queue.push(neighbor);
                }
            }
        }
    }

    let count = removed.len();
    if count > 0 {
        graph.retain_nodes(|_, node| !removed.contains(&node));
    }
    count
}
