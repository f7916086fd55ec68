//! # deck-core
//!
//! Presentation model for layered SVG documents.
//!
//! `Presentation::init` takes a parsed [`Document`], splits the children of
//! its root into [`Layer`]s (wrapping loose drawable elements into synthetic
//! groups owned by the auto layer) and then manages an ordered list of
//! [`Frame`]s, each holding one [`CameraState`] and one [`LayerProperty`] per
//! layer.
//!
//! ```
//! use deck_core::{Document, Presentation};
//!
//! let doc = Document::parse_svg(
//!     r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="title"/><rect/></svg>"#,
//! )?;
//! let mut pres = Presentation::init(doc)?;
//! assert_eq!(pres.layers().len(), 2);
//!
//! let index = pres.new_frame()?;
//! assert_eq!(pres.frame(index)?.camera_states().len(), 2);
//! # Ok::<(), deck_core::DeckError>(())
//! ```

pub mod camera;
pub mod config;
pub mod document;
pub mod error;
pub mod frame;
pub mod layer;
pub mod observe;
pub mod presentation;
pub mod style;
pub mod summary;
pub mod types;

pub use camera::CameraState;
pub use config::{DeckConfig, FrameDefaults};
pub use document::{Document, NodeKind, QName, INKSCAPE_NS, SVG_NS};
pub use error::{DeckError, Result};
pub use frame::{Frame, LayerProperty, TimingFunction};
pub use layer::Layer;
pub use observe::{ChangeEvent, Observers, SubscriptionId};
pub use presentation::{is_drawable, Presentation, DRAWABLE_TAGS};
pub use summary::{FrameSummary, LayerSummary, PresentationSummary};
pub use types::{LayerId, NodeId, PresentationId};
