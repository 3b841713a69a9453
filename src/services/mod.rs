//! Engine services.
//!
//! Each reconciliation pass composes the services here: the liveness
//! classifier, the edge resolver, the presence tracker, and the layout
//! engine, orchestrated by [`Reconciler`].

mod layout;
mod liveness;
mod presence;
mod reconcile;
mod resolver;

pub use layout::{LayoutEngine, PositionStore};
pub use liveness::classify;
pub use presence::SeenTracker;
pub use reconcile::{Reconciler, ViewOptions};
pub use resolver::{resolve, ResolverStats};
