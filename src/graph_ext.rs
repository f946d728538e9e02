use crate::model::{Edge, Node};
use log::debug;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Подграф слоёв и активаций. Индексы узлов идут в порядке входного списка,
/// поэтому `ordinal(idx)` совпадает с 1-based позицией среди выбранных узлов.
pub struct ModelGraph<'a> {
    pub graph: DiGraph<&'a Node, ()>,
    pub node_map: HashMap<&'a str, NodeIndex>,
}

impl<'a> ModelGraph<'a> {
    pub fn build(nodes: &'a [Node], edges: &[Edge]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        // 1. Добавляем выбранные узлы в petgraph
        for node in nodes.iter().filter(|n| is_selected(n)) {
            let idx = graph.add_node(node);
            node_map.entry(node.id.as_str()).or_insert(idx);
        }

        // 2. Ребра: висячие пропускаем, ребра к невыбранным узлам не связывают модель
        let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in edges {
            if !known.contains(edge.source.as_str()) || !known.contains(edge.target.as_str()) {
                debug!("Ignoring dangling edge '{}' ({} -> {})", edge.id, edge.source, edge.target);
                continue;
            }
            if let (Some(&src), Some(&dst)) = (node_map.get(edge.source.as_str()), node_map.get(edge.target.as_str())) {
                graph.add_edge(src, dst, ());
            }
        }

        Self { graph, node_map }
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn ordinal(&self, idx: NodeIndex) -> usize {
        idx.index() + 1
    }

    // Узлы без выбранных предшественников, в порядке входного списка
    pub fn entry_nodes(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.edges_directed(idx, Direction::Incoming).next().is_none())
            .collect()
    }

    // petgraph отдаёт исходящие ребра от новых к старым, сортируем по индексу ребра
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<_> = self.graph.edges_directed(idx, Direction::Outgoing).collect();
        out.sort_by_key(|e| e.id());
        out.into_iter().map(|e| e.target()).collect()
    }
}

pub fn is_selected(node: &Node) -> bool {
    node.effective_category().is_some_and(|c| c.is_model_part())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ignores_non_model_predecessors() {
        let nodes = vec![
            Node::new("norm", "normalize"),
            Node::new("fc", "linear"),
            Node::new("act", "relu"),
        ];
        let edges = vec![Edge::new("norm", "fc"), Edge::new("fc", "act")];
        let mg = ModelGraph::build(&nodes, &edges);
        let entries: Vec<_> = mg.entry_nodes().iter().map(|&i| mg.graph[i].id.as_str()).collect();
        assert_eq!(entries, ["fc"]);
    }

    #[test]
    fn test_children_keep_edge_order() {
        let nodes = vec![
            Node::new("a", "linear"),
            Node::new("b", "relu"),
            Node::new("c", "tanh"),
        ];
        let edges = vec![Edge::new("a", "c"), Edge::new("a", "b")];
        let mg = ModelGraph::build(&nodes, &edges);
        let kids: Vec<_> = mg.children(mg.node_map["a"]).iter().map(|&i| mg.graph[i].id.as_str()).collect();
        assert_eq!(kids, ["c", "b"]);
    }

    #[test]
    fn test_dangling_edges_are_dropped() {
        let nodes = vec![Node::new("a", "linear")];
        let edges = vec![Edge::new("ghost", "a"), Edge::new("a", "ghost")];
        let mg = ModelGraph::build(&nodes, &edges);
        assert_eq!(mg.graph.edge_count(), 0);
        assert_eq!(mg.entry_nodes().len(), 1);
    }
}
