//! Post loading pipeline and the views built on its output.
//!
//! - `BlogPipeline`: Load posts from the primary sheet, the fallback file or the bundled samples
//! - `PostEvents`: Notify subscribers when a post set is published
//! - `SearchIndex` and `view`: Search, filter and order a loaded post set

pub mod events;
pub mod index;
pub mod load;
pub mod view;

pub use events::{PostEvents, Subscription};
pub use index::{IndexConfig, SearchIndex};
pub use load::BlogPipeline;
pub use view::{
    CategorySelection, browse, category_counts, featured_posts, sort_by_date_desc,
};
