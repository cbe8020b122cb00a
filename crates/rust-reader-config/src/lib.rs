pub mod color;
pub mod config;
pub mod font;
pub mod theme;

pub use color::HexColor;
pub use config::ReaderConfig;
pub use font::{FontConfig, FontUpdate, TextAlign, TextBaseline};
pub use theme::{ReaderColors, ThemeDefinition};
