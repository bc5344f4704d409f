//! Node accessor and dispatch macros
//!
//! These macros eliminate repetitive match code over the closed `Node` enum.
//! Each one expands to an exhaustive `match`, so adding a node kind is a
//! compile error in every generated method until the new variant is listed.

// =============================================================================
// Variant accessors
// =============================================================================

/// Generate is_xxx, as_xxx, as_xxx_mut methods for `Node` variants
///
/// Uses paste's `:snake` modifier to derive method names from variant names.
///
/// # Generated methods per variant:
/// - `is_xxx(&self) -> bool`
/// - `as_xxx(&self) -> Option<&Type>`
/// - `as_xxx_mut(&mut self) -> Option<&mut Type>`
///
/// # Example
/// ```ignore
/// impl Node {
///     // ListItem -> is_list_item / as_list_item / as_list_item_mut
///     impl_node_accessors!(Heading, ListItem);
/// }
/// ```
macro_rules! impl_node_accessors {
    ($($variant:ident),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = "Check if this is a `" $variant "` node"]
                #[inline]
                pub fn [<is_ $variant:snake>](&self) -> bool {
                    matches!(self, Self::$variant(_))
                }

                #[doc = "Try to get as `" $variant "` reference"]
                #[inline]
                pub fn [<as_ $variant:snake>](&self) -> Option<&$variant> {
                    match self { Self::$variant(v) => Some(v), _ => None }
                }

                #[doc = "Try to get as mutable `" $variant "` reference"]
                #[inline]
                pub fn [<as_ $variant:snake _mut>](&mut self) -> Option<&mut $variant> {
                    match self { Self::$variant(v) => Some(v), _ => None }
                }
            )*
        }
    };
}

// =============================================================================
// Kind and children dispatch
// =============================================================================

/// Generate `kind()` and `children()`/`children_mut()` for `Node`
///
/// Containers expose their `children` field; leaves and unit variants
/// report `None`.
///
/// # Example
/// ```ignore
/// impl_node_dispatch! {
///     containers: Root, Paragraph;
///     leaves: Text;
///     units: ThematicBreak;
/// }
/// ```
macro_rules! impl_node_dispatch {
    (
        containers: $($container:ident),* ;
        leaves: $($leaf:ident),* ;
        units: $($unit:ident),* $(;)?
    ) => {
        /// Schema kind of this node.
        pub fn kind(&self) -> NodeKind {
            match self {
                $(Self::$container(_) => NodeKind::$container,)*
                $(Self::$leaf(_) => NodeKind::$leaf,)*
                $(Self::$unit => NodeKind::$unit,)*
            }
        }

        /// Child nodes, or `None` for kinds that cannot have children.
        pub fn children(&self) -> Option<&[Node]> {
            match self {
                $(Self::$container(n) => Some(&n.children),)*
                $(Self::$leaf(_) => None,)*
                $(Self::$unit => None,)*
            }
        }

        /// Mutable child nodes, or `None` for kinds that cannot have children.
        pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
            match self {
                $(Self::$container(n) => Some(&mut n.children),)*
                $(Self::$leaf(_) => None,)*
                $(Self::$unit => None,)*
            }
        }
    };
}
