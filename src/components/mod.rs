pub mod relational_graph;
