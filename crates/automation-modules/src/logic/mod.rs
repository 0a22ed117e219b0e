//! Logic and data-shaping modules

mod apply_template;
mod conditional;
mod filter_items;
mod merge;

pub use apply_template::ApplyTemplateModule;
pub use conditional::ConditionalModule;
pub use filter_items::FilterItemsModule;
pub use merge::MergeModule;
