pub mod aggregate;
pub mod components;
pub mod defs;
pub mod grouping;
pub mod host;
pub mod loading;
pub mod rng;
pub mod scan;
pub mod selection;
pub mod settings;
pub mod tile_map;
pub mod traversal;
pub mod ui;
pub mod view_filter;
pub mod window;
pub mod world;
