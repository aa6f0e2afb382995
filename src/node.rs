/*!
# Node Representation

We choose `Node = u32` as request graphs practically never involve more than
`2^32` nodes. This (1) saves space compared to `usize`/`u64` and (2) allows
manipulating node values directly without abstracting over them.
*/

use stream_bitset::bitset::BitSetImpl;

/// Nodes can be any unsigned integer from `0` to `Node::MAX - 1`
pub type Node = u32;

/// Node-Value that is considered invalid
pub const INVALID_NODE: Node = Node::MAX;

/// There can be at most `2^32 - 1` nodes in a graph!
pub type NumNodes = Node;

/// BitSet for Nodes
pub type NodeBitSet = BitSetImpl<Node>;
