//! Search a full graph for one table and cut out the part worth drawing.
//!
//! The result holds the target cell, every cell one link away from it, and
//! every cell reachable through exactly one join cell. A join cell is one that
//! declares MANY on its own side toward the target and toward at least one
//! other cell, which is how a many-to-many association looks once it has been
//! flattened into foreign keys.
//!
//! All traversal happens on indices into the full graph. Cells and links are
//! only copied out, and links only re-indexed, once the selection is final.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Cell, Graph, Link};

/// Cells and links of the full graph picked by one traversal step, as
/// positions into the full graph's lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub cells: Vec<usize>,
    pub links: Vec<usize>,
}

impl Selection {
    /// Append `other`, keeping first occurrences only.
    fn merge(&mut self, other: Selection) {
        push_unique_all(&mut self.cells, other.cells);
        push_unique_all(&mut self.links, other.links);
    }
}

/// Search `graph` for the table named `target` (exact, case-sensitive match)
/// and return the induced subgraph with links re-indexed into its cell list.
pub fn search_graph(target: &str, graph: &Graph) -> GraphResult<Graph> {
    let target_index = graph
        .cell_index(target)
        .ok_or_else(|| GraphError::TargetNotFound(target.to_string()))?;

    let mut selection = related_cells_and_links(target_index, &graph.cells, &graph.links)?;
    let direct_links: Vec<&Link> = selection
        .links
        .iter()
        .map(|&index| &graph.links[index])
        .collect();
    let joined = joined_cells_and_links(target_index, &direct_links, &graph.cells, &graph.links)?;
    selection.merge(joined);

    let cells: Vec<Cell> = selection
        .cells
        .iter()
        .map(|&index| graph.cells[index].clone())
        .collect();
    let links_to_relink: Vec<Link> = selection
        .links
        .iter()
        .map(|&index| graph.links[index].clone())
        .collect();
    let links = relink_links(&links_to_relink, &graph.cells, &cells)?;

    tracing::debug!(
        event = "graph_searched",
        target = %target,
        cells = cells.len(),
        links = links.len()
    );

    Ok(Graph { cells, links })
}

/// True when the side of `link` that is not `index` is MANY.
pub fn is_many_on_other_side(link: &Link, index: usize) -> bool {
    (link.destination_relationship_type.is_many() && link.destination != index)
        || (link.source_relationship_type.is_many() && link.source != index)
}

/// True iff `link` starts at `index` with MANY on that side and does not end
/// at `index_to_avoid`.
pub fn has_many_source_side_toward_other(link: &Link, index: usize, index_to_avoid: usize) -> bool {
    link.source == index
        && link.source_relationship_type.is_many()
        && link.destination != index_to_avoid
}

/// True iff `link` ends at `index` with MANY on that side and does not start
/// at `index_to_avoid`.
pub fn has_many_destination_side_toward_other(
    link: &Link,
    index: usize,
    index_to_avoid: usize,
) -> bool {
    link.destination == index
        && link.destination_relationship_type.is_many()
        && link.source != index_to_avoid
}

/// Every index touched by `links`, in first-seen order (source before
/// destination).
pub fn indices_of_links<'a>(links: impl IntoIterator<Item = &'a Link>) -> Vec<usize> {
    let mut indices = Vec::new();
    for link in links {
        push_unique(&mut indices, link.source);
        push_unique(&mut indices, link.destination);
    }
    indices
}

/// The target cell, the links touching it, and the cells at their other ends.
pub fn related_cells_and_links(
    target_index: usize,
    cells: &[Cell],
    links: &[Link],
) -> GraphResult<Selection> {
    check_bounds(target_index, cells.len())?;

    let link_indices: Vec<usize> = links
        .iter()
        .enumerate()
        .filter(|(_, link)| link.touches(target_index))
        .map(|(index, _)| index)
        .collect();

    let mut cell_indices = indices_of_links(link_indices.iter().map(|&index| &links[index]));
    push_unique(&mut cell_indices, target_index);
    for &index in &cell_indices {
        check_bounds(index, cells.len())?;
    }

    Ok(Selection {
        cells: cell_indices,
        links: link_indices,
    })
}

/// Cells joined to the target through a join cell, and the links from each
/// join cell to those far-side cells.
///
/// `target_links` are the links touching the target. Every qualifying
/// far-side link of a join cell is followed, in link-list order. A candidate
/// join cell with no qualifying far-side link contributes nothing.
pub fn joined_cells_and_links(
    target_index: usize,
    target_links: &[&Link],
    all_cells: &[Cell],
    all_links: &[Link],
) -> GraphResult<Selection> {
    check_bounds(target_index, all_cells.len())?;

    let join_indices: Vec<usize> = target_links
        .iter()
        .filter(|link| is_many_on_other_side(link, target_index))
        .map(|link| link.other_index(target_index))
        .collect();

    let mut selection = Selection::default();
    for join_index in join_indices {
        check_bounds(join_index, all_cells.len())?;

        for (link_index, link) in all_links.iter().enumerate() {
            if has_many_source_side_toward_other(link, join_index, target_index)
                || has_many_destination_side_toward_other(link, join_index, target_index)
            {
                let far_index = link.other_index(join_index);
                check_bounds(far_index, all_cells.len())?;
                push_unique(&mut selection.cells, far_index);
                push_unique(&mut selection.links, link_index);
            }
        }
    }

    Ok(selection)
}

/// Rewrite link endpoints from positions in `old_cells` to positions in
/// `new_cells`, matching cells by table name.
pub fn relink_links(
    links: &[Link],
    old_cells: &[Cell],
    new_cells: &[Cell],
) -> GraphResult<Vec<Link>> {
    let mut new_positions: BTreeMap<&str, usize> = BTreeMap::new();
    for (position, cell) in new_cells.iter().enumerate() {
        new_positions
            .entry(cell.table_name.as_str())
            .or_insert(position);
    }

    let resolve = |old_index: usize| -> GraphResult<usize> {
        let cell = old_cells.get(old_index).ok_or(GraphError::IndexOutOfBounds {
            index: old_index,
            len: old_cells.len(),
        })?;
        new_positions
            .get(cell.table_name.as_str())
            .copied()
            .ok_or_else(|| GraphError::UnresolvedLinkEndpoint(cell.table_name.clone()))
    };

    links
        .iter()
        .map(|link| {
            Ok(Link {
                source: resolve(link.source)?,
                destination: resolve(link.destination)?,
                ..link.clone()
            })
        })
        .collect()
}

fn check_bounds(index: usize, len: usize) -> GraphResult<()> {
    if index >= len {
        return Err(GraphError::IndexOutOfBounds { index, len });
    }
    Ok(())
}

fn push_unique(items: &mut Vec<usize>, item: usize) {
    if !items.contains(&item) {
        items.push(item);
    }
}

fn push_unique_all(items: &mut Vec<usize>, others: Vec<usize>) {
    let mut seen: BTreeSet<usize> = items.iter().copied().collect();
    for item in others {
        if seen.insert(item) {
            items.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::RelationshipType::{self, Many, One};

    fn cell(id: usize, name: &str) -> Cell {
        Cell {
            id,
            table_name: name.to_string(),
            columns: Vec::new(),
        }
    }

    fn cells(names: &[&str]) -> Vec<Cell> {
        names
            .iter()
            .enumerate()
            .map(|(id, name)| cell(id, name))
            .collect()
    }

    fn link(source: usize, destination: usize, s: RelationshipType, d: RelationshipType) -> Link {
        Link::new(source, destination, s, d)
    }

    fn names(graph: &Graph) -> BTreeSet<String> {
        graph.cells.iter().map(|c| c.table_name.clone()).collect()
    }

    #[test]
    fn source_side_predicate_boundaries() {
        let index = 100;
        let avoid = 10;
        assert!(!has_many_source_side_toward_other(
            &link(index + 1, 0, Many, One),
            index,
            avoid
        ));
        assert!(!has_many_source_side_toward_other(
            &link(index, 0, One, One),
            index,
            avoid
        ));
        assert!(!has_many_source_side_toward_other(
            &link(index, avoid, Many, One),
            index,
            avoid
        ));
        assert!(has_many_source_side_toward_other(
            &link(index, avoid + 1, Many, One),
            index,
            avoid
        ));
    }

    #[test]
    fn destination_side_predicate_boundaries() {
        let index = 100;
        let avoid = 1;
        assert!(!has_many_destination_side_toward_other(
            &link(0, index + 1, One, Many),
            index,
            avoid
        ));
        assert!(!has_many_destination_side_toward_other(
            &link(0, index, One, One),
            index,
            avoid
        ));
        assert!(!has_many_destination_side_toward_other(
            &link(avoid, index, One, Many),
            index,
            avoid
        ));
        assert!(has_many_destination_side_toward_other(
            &link(avoid + 1, index, One, Many),
            index,
            avoid
        ));
    }

    #[test]
    fn many_on_other_side_ignores_the_index_side() {
        let index = 100;
        assert!(is_many_on_other_side(&link(index, index + 1, One, Many), index));
        assert!(!is_many_on_other_side(&link(index + 1, index, One, Many), index));
        assert!(!is_many_on_other_side(&link(index, index, Many, Many), index));
        assert!(is_many_on_other_side(&link(index + 1, index, Many, One), index));
        assert!(!is_many_on_other_side(&link(index, index + 1, Many, One), index));
        assert!(is_many_on_other_side(&link(index + 1, index + 2, One, Many), index));
    }

    #[test]
    fn indices_keep_first_seen_order() {
        let links = vec![link(3, 1, Many, One), link(1, 2, Many, One), link(2, 3, Many, One)];
        assert_eq!(indices_of_links(&links), vec![3, 1, 2]);
        assert!(indices_of_links(&[]).is_empty());
    }

    #[test]
    fn unknown_target_is_not_found() {
        let graph = Graph::new(cells(&["person"]), Vec::new());
        assert_eq!(
            search_graph("Person", &graph),
            Err(GraphError::TargetNotFound("Person".to_string()))
        );
    }

    #[test]
    fn isolated_target_returns_only_itself() {
        let graph = Graph::new(cells(&["car", "person"]), Vec::new());
        let result = search_graph("person", &graph).unwrap();
        assert_eq!(result.cells, vec![cell(1, "person")]);
        assert!(result.links.is_empty());
    }

    #[test]
    fn direct_neighbours_are_included_and_relinked() {
        // person(0) <- car(1), unrelated(2), person(0) -> team(3)
        let graph = Graph::new(
            cells(&["person", "car", "unrelated", "team"]),
            vec![link(1, 0, One, One), link(0, 3, Many, One)],
        );
        let result = search_graph("car", &graph).unwrap();
        assert_eq!(names(&result), BTreeSet::from(["car".to_string(), "person".to_string()]));
        assert_eq!(result.links.len(), 1);
        let only = &result.links[0];
        assert_eq!(result.cells[only.source].table_name, "car");
        assert_eq!(result.cells[only.destination].table_name, "person");
        // ids keep their full-graph meaning
        assert!(result.cells.iter().any(|c| c.table_name == "car" && c.id == 1));
    }

    #[test]
    fn join_cell_pulls_in_the_far_side() {
        // a(0), b(1), join(2) with FKs join->a and join->b, both MANY on join's side
        let graph = Graph::new(
            cells(&["a", "b", "join"]),
            vec![link(2, 0, Many, One), link(2, 1, Many, One)],
        );
        let result = search_graph("a", &graph).unwrap();

        assert_eq!(
            names(&result),
            BTreeSet::from(["a".to_string(), "b".to_string(), "join".to_string()])
        );
        assert_eq!(result.links.len(), 2);
        let position = |name: &str| result.cells.iter().position(|c| c.table_name == name).unwrap();
        assert!(result
            .links
            .iter()
            .any(|l| l.source == position("join") && l.destination == position("a")));
        assert!(result
            .links
            .iter()
            .any(|l| l.source == position("join") && l.destination == position("b")));
    }

    #[test]
    fn join_with_several_far_sides_includes_all_of_them() {
        let graph = Graph::new(
            cells(&["a", "b", "c", "join"]),
            vec![
                link(3, 0, Many, One),
                link(3, 1, Many, One),
                link(3, 2, Many, One),
            ],
        );
        let result = search_graph("a", &graph).unwrap();
        assert_eq!(result.cells.len(), 4);
        assert_eq!(result.links.len(), 3);
    }

    #[test]
    fn candidate_join_without_far_side_adds_nothing() {
        let graph = Graph::new(cells(&["person", "car"]), vec![link(1, 0, Many, One)]);
        let result = search_graph("person", &graph).unwrap();
        assert_eq!(result.cells.len(), 2);
        assert_eq!(result.links.len(), 1);
    }

    #[test]
    fn two_links_to_the_same_join_do_not_duplicate_results() {
        let graph = Graph::new(
            cells(&["a", "b", "join"]),
            vec![link(2, 0, Many, One), link(2, 0, Many, One), link(2, 1, Many, One)],
        );
        let result = search_graph("a", &graph).unwrap();
        assert_eq!(result.cells.len(), 3);
        assert_eq!(result.links.len(), 3);
    }

    #[test]
    fn out_of_range_link_is_reported() {
        let graph = Graph::new(cells(&["a"]), vec![link(0, 5, Many, One)]);
        assert_eq!(
            search_graph("a", &graph),
            Err(GraphError::IndexOutOfBounds { index: 5, len: 1 })
        );
        assert_eq!(
            related_cells_and_links(1, &graph.cells, &graph.links),
            Err(GraphError::IndexOutOfBounds { index: 1, len: 1 })
        );
    }

    #[test]
    fn relink_maps_by_table_name() {
        let old = cells(&["a", "b", "c"]);
        let new = vec![cell(2, "c"), cell(0, "a")];
        let relinked = relink_links(&[link(0, 2, Many, One)], &old, &new).unwrap();
        assert_eq!(relinked, vec![link(1, 0, Many, One)]);

        assert_eq!(
            relink_links(&[link(1, 2, Many, One)], &old, &new),
            Err(GraphError::UnresolvedLinkEndpoint("b".to_string()))
        );
    }

    /// Small deterministic generator so the containment and relink properties
    /// can be checked across many graph shapes.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) % bound
        }
    }

    fn random_graph(rng: &mut Lcg) -> Graph {
        let base = 1 + rng.next(8) as usize;
        let mut names: Vec<String> = (0..base).map(|i| i.to_string()).collect();
        let mut links = Vec::new();
        for low in 0..base {
            for high in low + 1..base {
                match rng.next(10) {
                    0 | 1 => {
                        let join = names.len();
                        names.push(format!("{low}join{high}"));
                        links.push(link(join, low, Many, One));
                        links.push(link(join, high, Many, One));
                    }
                    2 | 3 | 4 => links.push(link(low, high, One, One)),
                    _ => {}
                }
            }
        }
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        Graph::new(cells(&refs), links)
    }

    #[test]
    fn results_stay_within_reach_and_relink_soundly() {
        let mut rng = Lcg(0x074e_9b5f_037a_8c21);
        for _ in 0..200 {
            let graph = random_graph(&mut rng);
            let target = rng.next(graph.cells.len() as u64) as usize;
            let name = graph.cells[target].table_name.clone();
            let result = search_graph(&name, &graph).unwrap();

            let many_at = |l: &Link, index: usize| {
                (l.source == index && l.source_relationship_type.is_many())
                    || (l.destination == index && l.destination_relationship_type.is_many())
            };
            let direct: BTreeSet<usize> = graph
                .links
                .iter()
                .filter(|l| l.touches(target))
                .map(|l| l.other_index(target))
                .collect();
            let joins: BTreeSet<usize> = graph
                .links
                .iter()
                .filter(|l| l.touches(target) && many_at(l, l.other_index(target)))
                .map(|l| l.other_index(target))
                .collect();
            for cell in &result.cells {
                let full = graph.cell_index(&cell.table_name).unwrap();
                let via_join = full != target
                    && graph.links.iter().any(|l| {
                        let join = l.other_index(full);
                        l.touches(full) && joins.contains(&join) && many_at(l, join)
                    });
                assert!(full == target || direct.contains(&full) || via_join);
            }

            for relinked in &result.links {
                assert!(relinked.source < result.cells.len());
                assert!(relinked.destination < result.cells.len());
            }
            let originals: Vec<(String, String)> = result
                .links
                .iter()
                .map(|l| {
                    (
                        result.cells[l.source].table_name.clone(),
                        result.cells[l.destination].table_name.clone(),
                    )
                })
                .collect();
            for pair in originals {
                assert!(graph.links.iter().any(|l| {
                    graph.cells[l.source].table_name == pair.0
                        && graph.cells[l.destination].table_name == pair.1
                }));
            }
        }
    }
}
