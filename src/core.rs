pub mod node;
pub mod oracle;
pub mod ss58;
pub mod types;

pub use node::Node;
