pub mod enrichment;
pub mod pagination;
pub mod seed;
pub mod users;
pub mod videos;
