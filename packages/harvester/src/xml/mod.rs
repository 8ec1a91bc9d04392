//! XML utilities: namespace normalization and path-based lookups.

mod tree;
mod utils;

pub use tree::NormalizedTree;
pub use utils::{
    find_by_attribute, find_child, find_children, get_attribute, get_tag_name, get_text, select,
    select_all, text_content,
};
