//! Boundary ring tracing for labeled raster components
//!
//! Converts one connected component of a label grid into closed rings of
//! pixel-corner vertices in grid space. Each pixel contributes a directed
//! edge for every side not shared with a same-label neighbor; chaining the
//! directed edges end-to-start yields closed loops. Exterior rings come out
//! with positive shoelace area and hole rings negative, which is how the
//! zone assembler tells them apart.

use std::collections::HashMap;

/// A pixel-corner vertex in grid space: (x = column, y = row)
type Vertex = (u32, u32);

/// Trace all boundary rings of one labeled component
///
/// Every ring is closed (first vertex repeated at the end) and vertices sit
/// on integer pixel corners. Edge direction cycles top, right, bottom, left
/// around each pixel, so chaining is unambiguous except where two
/// diagonally-touching pixels of the same component pinch at a corner; there
/// the walk prefers the turn that keeps hugging the current pixel, which
/// splits the pinch into separate simple rings instead of a self-crossing
/// one.
pub(crate) fn trace_component_rings(
    labels: &[u32],
    width: usize,
    height: usize,
    label: u32,
) -> Vec<Vec<(f64, f64)>> {
    let has_label = |row: i64, col: i64| -> bool {
        row >= 0
            && col >= 0
            && (row as usize) < height
            && (col as usize) < width
            && labels[row as usize * width + col as usize] == label
    };

    // Directed boundary edges in row-major pixel discovery order
    let mut edges: Vec<(Vertex, Vertex)> = Vec::new();
    for row in 0..height {
        for col in 0..width {
            if labels[row * width + col] != label {
                continue;
            }
            let (r, c) = (row as i64, col as i64);
            let (x, y) = (col as u32, row as u32);
            if !has_label(r - 1, c) {
                edges.push(((x, y), (x + 1, y))); // top
            }
            if !has_label(r, c + 1) {
                edges.push(((x + 1, y), (x + 1, y + 1))); // right
            }
            if !has_label(r + 1, c) {
                edges.push(((x + 1, y + 1), (x, y + 1))); // bottom
            }
            if !has_label(r, c - 1) {
                edges.push(((x, y + 1), (x, y))); // left
            }
        }
    }

    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (i, (start, _)) in edges.iter().enumerate() {
        outgoing.entry(*start).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();

    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let ring_start = edges[first].0;
        let mut ring: Vec<(f64, f64)> = vec![
            (ring_start.0 as f64, ring_start.1 as f64),
            (edges[first].1 .0 as f64, edges[first].1 .1 as f64),
        ];
        let mut current = edges[first];

        while current.1 != ring_start {
            let next = pick_next_edge(&edges, &outgoing, &used, current);
            used[next] = true;
            ring.push((edges[next].1 .0 as f64, edges[next].1 .1 as f64));
            current = edges[next];
        }

        rings.push(ring);
    }

    rings
}

/// Choose the outgoing edge continuing a ring from the end of `current`
///
/// At most two unused outgoing edges can exist (a pinch vertex); the one
/// with the larger turn cross product continues around the same pixel.
fn pick_next_edge(
    edges: &[(Vertex, Vertex)],
    outgoing: &HashMap<Vertex, Vec<usize>>,
    used: &[bool],
    current: (Vertex, Vertex),
) -> usize {
    let candidates = outgoing
        .get(&current.1)
        .expect("boundary edges always chain into closed loops");

    let in_dir = direction(current.0, current.1);
    let mut best: Option<(i64, usize)> = None;
    for &i in candidates {
        if used[i] {
            continue;
        }
        let out_dir = direction(edges[i].0, edges[i].1);
        let turn = in_dir.0 * out_dir.1 - in_dir.1 * out_dir.0;
        if best.map_or(true, |(t, _)| turn > t) {
            best = Some((turn, i));
        }
    }
    best.expect("boundary edges always chain into closed loops").1
}

fn direction(from: Vertex, to: Vertex) -> (i64, i64) {
    (to.0 as i64 - from.0 as i64, to.1 as i64 - from.1 as i64)
}

/// Shoelace signed area of a closed ring in grid coordinates
///
/// Positive for exterior rings, negative for holes, given the per-pixel
/// edge orientation used by [`trace_component_rings`].
pub(crate) fn ring_signed_area(ring: &[(f64, f64)]) -> f64 {
    let mut sum = 0.0;
    for window in ring.windows(2) {
        let (x1, y1) = window[0];
        let (x2, y2) = window[1];
        sum += x1 * y2 - x2 * y1;
    }
    sum / 2.0
}

/// Ray-casting point-in-ring test
pub(crate) fn point_in_ring(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let n = ring.len();
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if ((yi > point.1) != (yj > point.1))
            && (point.0 < (xj - xi) * (point.1 - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
