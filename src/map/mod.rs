pub mod geocoder;
pub mod idle;
pub mod mercator;
pub mod style;
pub mod tile_map;
pub mod tiles;
pub mod widget;

pub use idle::IdleWait;
pub use mercator::{LngLat, MapView};
pub use style::{BasemapStyle, StyleUrl};
pub use tile_map::TileMap;
pub use widget::{MapControl, MapWidget};
