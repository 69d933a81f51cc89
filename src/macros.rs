/// Helper macro for entities that expose their tree link through a `node` field
///
/// ```rust, ignore
///  pub struct DexField { node: NodeRc, ... }
///  impl_tree_node!(DexField);
/// ```
macro_rules! impl_tree_node {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl crate::tree::TreeNode for $entity {
                fn key(&self) -> &str {
                    crate::tree::TreeNode::key(&*self.node)
                }

                fn parent(&self) -> Option<crate::tree::NodeRc> {
                    crate::tree::TreeNode::parent(&*self.node)
                }
            }

            impl $entity {
                /// Returns the tree link of this entity, for attaching children to it.
                #[must_use]
                pub fn node(&self) -> &crate::tree::NodeRc {
                    &self.node
                }
            }
        )+
    };
}
