pub mod export;
pub mod star_map;
