//! Closure queries over the subject graph.
//!
//! The `subject_child` edge table is loaded into a [`SubjectGraph`]: subject
//! ids live in a flat arena and every edge is a pair of arena indexes, kept
//! once per direction. Walks are breadth-first and never expand a node twice,
//! which is what bounds them when two subjects parent each other.

use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
  Up,
  Down,
}

/// Adjacency over subject ids, in both directions.
#[derive(Debug, Default, Clone)]
pub struct SubjectGraph {
  ids:      Vec<i64>,
  index:    HashMap<i64, usize>,
  parents:  Vec<Vec<usize>>,
  children: Vec<Vec<usize>>,
}

impl SubjectGraph {
  pub fn new() -> Self { Self::default() }

  /// Build from `(parent_id, child_id)` rows.
  pub fn from_edges(edges: impl IntoIterator<Item = (i64, i64)>) -> Self {
    let mut graph = Self::new();
    for (parent, child) in edges {
      graph.add_edge(parent, child);
    }
    graph
  }

  fn intern(&mut self, id: i64) -> usize {
    if let Some(&slot) = self.index.get(&id) {
      return slot;
    }
    let slot = self.ids.len();
    self.ids.push(id);
    self.parents.push(Vec::new());
    self.children.push(Vec::new());
    self.index.insert(id, slot);
    slot
  }

  pub fn add_edge(&mut self, parent: i64, child: i64) {
    let p = self.intern(parent);
    let c = self.intern(child);
    if !self.children[p].contains(&c) {
      self.children[p].push(c);
      self.parents[c].push(p);
    }
  }

  #[cfg(test)]
  fn edge_count(&self) -> usize {
    self.children.iter().map(Vec::len).sum()
  }

  /// `start` followed by every subject reachable by walking parent edges up
  /// from it. `start` appears exactly once, even on a cycle.
  pub fn ancestors(&self, start: i64) -> Vec<i64> {
    self.closure(start, Direction::Up)
  }

  /// `start` followed by every subject reachable by walking child edges down
  /// from it. `start` appears exactly once, even on a cycle.
  pub fn descendants(&self, start: i64) -> Vec<i64> {
    self.closure(start, Direction::Down)
  }

  fn closure(&self, start: i64, direction: Direction) -> Vec<i64> {
    let mut out = vec![start];
    out.extend(self.walk(start, direction).into_iter().filter(|&id| id != start));
    out
  }

  /// Breadth-first walk seeded with the neighbours of `start`. Output is in
  /// visit order, each id at most once.
  fn walk(&self, start: i64, direction: Direction) -> Vec<i64> {
    let Some(&origin) = self.index.get(&start) else {
      return Vec::new();
    };
    let neighbours = |slot: usize| match direction {
      Direction::Up => &self.parents[slot],
      Direction::Down => &self.children[slot],
    };

    let mut visited = vec![false; self.ids.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut out = Vec::new();

    for &next in neighbours(origin) {
      if !visited[next] {
        visited[next] = true;
        queue.push_back(next);
      }
    }
    while let Some(slot) = queue.pop_front() {
      out.push(self.ids[slot]);
      for &next in neighbours(slot) {
        if !visited[next] {
          visited[next] = true;
          queue.push_back(next);
        }
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sorted(mut v: Vec<i64>) -> Vec<i64> {
    v.sort_unstable();
    v
  }

  #[test]
  fn isolated_subject_is_its_own_ancestor_and_descendant() {
    let graph = SubjectGraph::from_edges([(1, 2)]);
    assert_eq!(graph.ancestors(99), vec![99]);
    assert_eq!(graph.descendants(99), vec![99]);
  }

  #[test]
  fn ancestors_are_transitive() {
    // who(1) -> staff(2) -> alice(3)
    let graph = SubjectGraph::from_edges([(1, 2), (2, 3)]);
    assert_eq!(graph.ancestors(3), vec![3, 2, 1]);
    assert_eq!(graph.ancestors(1), vec![1]);
  }

  #[test]
  fn descendants_include_root_once_in_breadth_first_order() {
    let graph = SubjectGraph::from_edges([(1, 2), (1, 3), (2, 4), (3, 4)]);
    assert_eq!(graph.descendants(1), vec![1, 2, 3, 4]);
    assert_eq!(graph.descendants(3), vec![3, 4]);
  }

  #[test]
  fn diamond_is_not_visited_twice() {
    let graph = SubjectGraph::from_edges([(1, 2), (1, 3), (2, 4), (3, 4)]);
    assert_eq!(sorted(graph.ancestors(4)), vec![1, 2, 3, 4]);
  }

  #[test]
  fn two_cycle_terminates() {
    let graph = SubjectGraph::from_edges([(1, 2), (2, 1)]);
    assert_eq!(graph.descendants(1), vec![1, 2]);
    assert_eq!(graph.ancestors(1), vec![1, 2]);
    assert_eq!(graph.ancestors(2), vec![2, 1]);
  }

  #[test]
  fn longer_cycle_with_tail_terminates() {
    let graph = SubjectGraph::from_edges([(1, 2), (2, 3), (3, 1), (3, 4)]);
    assert_eq!(sorted(graph.descendants(2)), vec![1, 2, 3, 4]);
    assert_eq!(graph.descendants(2).iter().filter(|&&id| id == 2).count(), 1);
    assert_eq!(sorted(graph.ancestors(4)), vec![1, 2, 3, 4]);
    assert_eq!(graph.ancestors(1).iter().filter(|&&id| id == 1).count(), 1);
  }

  #[test]
  fn duplicate_edges_collapse() {
    let graph = SubjectGraph::from_edges([(1, 2), (1, 2)]);
    assert_eq!(graph.edge_count(), 1);
  }
}
