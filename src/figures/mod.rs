// src/figures/mod.rs
pub mod derive;
pub mod format;
pub mod render;
pub mod theme;

pub use derive::{
    derive_all, closure_distribution, latest_operator_bars, national_trend, volume_vs_efficiency,
    ClosureDistribution, Figures, NationalTrend, OperatorBars, OperatorGroup, VolumeVsEfficiency,
};
pub use render::render;
pub use theme::Theme;
