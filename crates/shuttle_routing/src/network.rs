use serde::{Deserialize, Serialize};

use crate::{EnumerateIdx, define_index_newtype, error::RoutingError};

define_index_newtype!(NodeIdx, Node);
define_index_newtype!(LinkIdx, Link);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeIdx,
    x: f64,
    y: f64,
}

impl Node {
    pub fn id(&self) -> NodeIdx {
        self.id
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// A directed road segment. Vehicles are located on links and stops are
/// served on links, so every travel-time query is link to link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    id: LinkIdx,
    from_node: NodeIdx,
    to_node: NodeIdx,
    /// Meters
    length: f64,
    /// Meters per second
    freespeed: f64,
}

impl Link {
    pub fn id(&self) -> LinkIdx {
        self.id
    }

    pub fn from_node(&self) -> NodeIdx {
        self.from_node
    }

    pub fn to_node(&self) -> NodeIdx {
        self.to_node
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn freespeed(&self) -> f64 {
        self.freespeed
    }

    pub fn freespeed_travel_time(&self) -> f64 {
        self.length / self.freespeed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    out_links: Vec<Vec<LinkIdx>>,
}

impl Network {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node(&self, node: NodeIdx) -> &Node {
        &self.nodes[node]
    }

    pub fn link(&self, link: LinkIdx) -> &Link {
        &self.links[link]
    }

    pub fn try_link(&self, link: LinkIdx) -> Result<&Link, RoutingError> {
        self.links
            .get(link.get())
            .ok_or(RoutingError::UnknownLink(link))
    }

    pub fn out_links(&self, node: NodeIdx) -> impl Iterator<Item = &Link> {
        self.out_links[node.get()].iter().map(|&link| &self.links[link])
    }
}

#[derive(Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl NetworkBuilder {
    pub fn add_node(&mut self, x: f64, y: f64) -> NodeIdx {
        let id = NodeIdx::new(self.nodes.len());
        self.nodes.push(Node { id, x, y });
        id
    }

    pub fn add_link(
        &mut self,
        from_node: NodeIdx,
        to_node: NodeIdx,
        length: f64,
        freespeed: f64,
    ) -> Result<LinkIdx, RoutingError> {
        let id = LinkIdx::new(self.links.len());

        for node in [from_node, to_node] {
            if node.get() >= self.nodes.len() {
                return Err(RoutingError::UnknownNode(node));
            }
        }

        if freespeed.is_nan() || freespeed <= 0.0 {
            return Err(RoutingError::InvalidFreespeed {
                link: id,
                freespeed,
            });
        }

        if length.is_nan() || length < 0.0 {
            return Err(RoutingError::InvalidLength { link: id, length });
        }

        self.links.push(Link {
            id,
            from_node,
            to_node,
            length,
            freespeed,
        });

        Ok(id)
    }

    pub fn build(self) -> Network {
        let mut out_links = vec![Vec::new(); self.nodes.len()];
        for (link_id, link) in self.links.iter().enumerate_idx() {
            out_links[link.from_node.get()].push(link_id);
        }

        Network {
            nodes: self.nodes,
            links: self.links,
            out_links,
        }
    }
}
