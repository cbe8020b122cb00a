//! Text layout, virtualization, and search engine for the reader.
//!
//! Raw text is wrapped into a numbered line table ([`wrap`]), searched with
//! context ([`search`]), and drawn a viewport at a time ([`render`]) onto a
//! [`surface::Surface`] owned by the [`coordinator`] worker thread.

pub mod coordinator;
pub mod encoding;
pub mod line;
pub mod measure;
pub mod render;
pub mod scrollbar;
pub mod search;
pub mod session;
pub mod source;
pub mod surface;
pub mod wrap;

pub use coordinator::{
    Coordinator, CoordinatorHandle, CoordinatorOptions, InitRequest, Message, ReaderEvent,
    UpdateRequest,
};
pub use line::DisplayLine;
pub use measure::MeasureText;
pub use scrollbar::{DragState, PointerInput, ScrollState, Scrollbar};
pub use search::{MatchMode, SearchOutcome, SearchResult, Searcher};
pub use session::{Layout, Session, SessionStatus, Viewport};
pub use source::{load_text, DefaultSource, FileSource, HttpSource, MemorySource, TextSource};
pub use surface::{DrawCommand, Frame, RecordingSurface, Surface};
pub use wrap::wrap_text;
