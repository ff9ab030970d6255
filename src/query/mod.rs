// Submodules for separation of concerns
mod build;
mod encode;
mod eval;
mod parse;
mod types;

// Public API re-exports
pub use build::{
    average_price_by_genre, count_by_decade, delete_one_by_title, ensure_index, explain_find,
    find_by, top_author_by_book_count, update_one_price,
};
pub use encode::{
    command_doc, criteria_doc, index_key_doc, pipeline_docs, projection_doc, sort_doc, stage_doc,
};
pub use eval::{matches, run_find, run_pipeline};
pub use parse::parse_criteria_json;
pub use types::{
    Accumulator, CmpOp, Condition, Criteria, Expr, FindOptions, IndexKeys, Order, Query, SortSpec,
    Stage,
};
