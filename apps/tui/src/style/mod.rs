pub mod expr;
pub mod layers;
pub mod legend;
pub mod palette;

pub use expr::{abbreviate_count, capacity_color, line_color, voltage_color, voltage_tier};
pub use layers::{
    grid_layers, grid_sources, layer_ids, ColorRule, DataPaths, Filter, LayerKind, LayerSpec,
    LayoutProperty, PaintProperty, SizeRule, SourceData, SourceSpec, Visibility,
};
pub use palette::Rgb;
