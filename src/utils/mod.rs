pub mod db_utils;
pub mod overview_counts;
pub mod username_cache;
pub mod username_filter;
