//! Kinetic Core
//!
//! Foundational primitives shared by the Kinetic motion crates:
//!
//! - **Errors**: the [`MotionError`] taxonomy and config validation helpers
//! - **Geometry**: points, rectangles, normalization and visibility ratios
//! - **Pointer**: a single-writer broadcaster of the current pointer position
//! - **State Machines**: typed flat state machines for effect lifecycles
//!
//! # Example
//!
//! ```rust
//! use kinetic_core::pointer::PointerBroadcaster;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let pointer = PointerBroadcaster::new();
//! let last_x = Rc::new(Cell::new(0.0));
//! let sink = last_x.clone();
//!
//! let id = pointer.subscribe(move |p| sink.set(p.x));
//! pointer.publish(120.0, 40.0);
//! assert_eq!(last_x.get(), 120.0);
//!
//! pointer.unsubscribe(id);
//! ```

pub mod error;
pub mod fsm;
pub mod geometry;
pub mod pointer;

pub use error::{MotionError, Result};
pub use fsm::{StateMachine, Transition};
pub use geometry::{ElementGeometry, Point, Rect, Size};
pub use pointer::{PointerBroadcaster, PointerState, SubscriptionId};
