use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::database::models::PrerequisiteEdge;

/// Directed "course requires prerequisite" graph loaded from the store.
#[derive(Debug, Clone, Default)]
pub struct PrerequisiteGraph {
    requires: HashMap<Uuid, Vec<Uuid>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl PrerequisiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = PrerequisiteEdge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge.course_id, edge.prerequisite_id);
        }
        graph
    }

    pub fn add_edge(&mut self, course_id: Uuid, prerequisite_id: Uuid) {
        let targets = self.requires.entry(course_id).or_default();
        if !targets.contains(&prerequisite_id) {
            targets.push(prerequisite_id);
        }
    }

    /// Courses `course_id` directly requires.
    pub fn prerequisites_of(&self, course_id: Uuid) -> &[Uuid] {
        self.requires.get(&course_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.requires.values().map(Vec::len).sum()
    }

    /// Would adding `course_id -> prerequisite_id` close a cycle?
    ///
    /// True when `prerequisite_id` already reaches `course_id` by following
    /// existing requirements, including the zero-hop case where both ids are
    /// equal. Each node is expanded at most once, so the walk is O(V + E).
    pub fn would_create_cycle(&self, course_id: Uuid, prerequisite_id: Uuid) -> bool {
        if course_id == prerequisite_id {
            return true;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![prerequisite_id];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            for &next in self.prerequisites_of(node) {
                if next == course_id {
                    return true;
                }
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }

        false
    }

    /// Find one cycle already present in the graph.
    ///
    /// Returns the course ids along the cycle with the first id repeated at
    /// the end (`[a, b, c, a]`). Roots are visited in id order so the answer
    /// is stable for a given graph.
    pub fn find_cycle(&self) -> Option<Vec<Uuid>> {
        let mut state: HashMap<Uuid, Visit> = HashMap::new();
        let mut path = Vec::new();

        let mut roots: Vec<Uuid> = self.requires.keys().copied().collect();
        roots.sort();

        for root in roots {
            if state.contains_key(&root) {
                continue;
            }
            if let Some(cycle) = self.visit(root, &mut state, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit(&self, node: Uuid, state: &mut HashMap<Uuid, Visit>, path: &mut Vec<Uuid>) -> Option<Vec<Uuid>> {
        state.insert(node, Visit::InProgress);
        path.push(node);

        for &next in self.prerequisites_of(node) {
            match state.get(&next) {
                Some(Visit::InProgress) => {
                    let start = path.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Some(Visit::Done) => {}
                None => {
                    if let Some(cycle) = self.visit(next, state, path) {
                        return Some(cycle);
                    }
                }
            }
        }

        path.pop();
        state.insert(node, Visit::Done);
        None
    }
}
